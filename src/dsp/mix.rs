//! Crossfade and blending primitives for parallel signal paths.

/*
Equal-Power Crossfading
=======================

Swapping a live amplifier path (channel switch, bypass toggle) by
disconnecting one chain and connecting another produces a click. Instead,
both paths stay built and running, and we fade between them.

Why not a linear fade? With weights (1-t) and t, two decorrelated paths
at the midpoint each sit at 50% amplitude. Power adds, amplitude does not:
0.5² + 0.5² = 0.5 of the original power, an audible dip right in the
middle of every channel switch.

Equal-power weights keep the summed power constant instead:

    outgoing = cos(t · π/2)
    incoming = sin(t · π/2)         t: 0 → 1

    cos²θ + sin²θ = 1 at every point of the fade.

    Level
      1.0 ──╲________          ___________
             ╲       ‾‾──╲ ╱──‾
      0.707          (×) ╳ (×)   ← both at √2/2, power still 1
                     ___╱ ╲__
      0.0 ──────────‾        ‾╲___________
          t=0       t=0.5        t=1

Dry/wet blending inside a single effect keeps the cheap linear form: dry
and wet are strongly correlated there, so the power argument does not
apply and linear sounds right.
*/

/// Equal-power weight pair for fade progress `t` in [0, 1].
///
/// Returns `(outgoing, incoming)`; the squares always sum to 1.
#[inline]
pub fn equal_power_weights(t: f32) -> (f32, f32) {
    let theta = t.clamp(0.0, 1.0) * std::f32::consts::FRAC_PI_2;
    (theta.cos(), theta.sin())
}

/// Crossfade two equal-length buffers into `out` at a fixed fade progress.
///
/// Block-rate fading is enough for the automation engine's use: progress
/// advances a little each block and the per-block step is inaudible.
#[inline]
pub fn crossfade(outgoing: &[f32], incoming: &[f32], t: f32, out: &mut [f32]) {
    debug_assert_eq!(outgoing.len(), incoming.len());
    debug_assert_eq!(outgoing.len(), out.len());

    let (w_out, w_in) = equal_power_weights(t);
    for ((&a, &b), o) in outgoing.iter().zip(incoming.iter()).zip(out.iter_mut()) {
        *o = a * w_out + b * w_in;
    }
}

/// Blend dry and wet samples linearly (single sample).
///
/// output = dry × (1-mix) + wet × mix
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Linear dry/wet blend over a buffer; modifies `wet` in place.
#[inline]
pub fn apply_dry_wet(dry: &[f32], wet: &mut [f32], mix: f32) {
    debug_assert_eq!(dry.len(), wet.len());

    if mix >= 1.0 {
        return; // 100% wet, nothing to do
    }

    let dry_amount = 1.0 - mix;
    for (wet_sample, &dry_sample) in wet.iter_mut().zip(dry.iter()) {
        *wet_sample = dry_sample * dry_amount + *wet_sample * mix;
    }
}
