/*
Decibels vs Linear Amplitude
============================

All user-facing thresholds in this crate are decibels (the unit people set
gates in), while the math inside every processor runs on linear amplitude
(the unit samples are in). The conversions:

    linear = 10^(dB / 20)
    dB     = 20 * log10(linear)

Reference points worth memorizing:

      0 dB  =  1.0      full scale
     -6 dB  ≈  0.5      half amplitude
    -20 dB  =  0.1
    -40 dB  =  0.01     quiet playing
    -60 dB  =  0.001    hiss territory
    -80 dB  =  0.0001   effectively silence

`lin_to_db(0.0)` is mathematically -infinity; we clamp at SILENCE_DB so the
value stays usable in comparisons and displays.
*/

/// Anything at or below this level is treated as silence.
pub const SILENCE_DB: f32 = -120.0;

/// Convert decibels to linear amplitude.
#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels, clamped at [`SILENCE_DB`].
#[inline]
pub fn lin_to_db(lin: f32) -> f32 {
    if lin <= db_to_lin(SILENCE_DB) {
        SILENCE_DB
    } else {
        20.0 * lin.log10()
    }
}
