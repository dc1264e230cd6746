use crate::dsp::mix::equal_power_weights;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

/*
Parameter Automation & Path Crossfades
======================================

Every knob turn, channel switch and bypass toggle in an amp model goes
through this engine; application code never writes a control value
directly. That single rule is what makes the whole system click-free: a
raw assignment to a live gain is a step discontinuity, and a step in a
gain is a click.

Two operations cover everything:

  schedule    Move one scalar control toward a new value with an
              exponential approach: each block the value covers a fixed
              fraction of the remaining distance, reaching ~95% of it
              within the requested time. Analog control circuits respond
              the same way, and unlike a linear ramp there is no audible
              corner where the ramp ends.

              Last write wins: a new schedule for the same control simply
              retargets from the current interpolated value, so
              superseding an in-flight change is continuous by
              construction.

  crossfade   Swap two parallel signal paths by fading their gain
              controls with equal-power weights, θ: 0 → π/2 (see
              [`crate::dsp::mix`] for why linear fading dips in the
              middle). Both endpoints ramp from their current values —
              outgoing · cos θ toward 0, incoming rising along sin θ
              toward 1 — so replacing or reversing a fade mid-flight is
              continuous, the same last-write-wins rule schedules obey.
              The fade record is transient: it dies the moment θ
              reaches π/2.

Threading
---------

The engine lives on the audio thread. UI/control threads talk to it
through a lock-free single-producer single-consumer queue
([`AutomationHandle`]): commands are enqueued from the control side and
drained at the top of every `process_block` call. The audio thread never
waits; if the queue is full the command is dropped (the knob value will
be re-sent on the next UI tick anyway).

Everything on the block path is allocation-free: controls are registered
up front, and the active-fade list is a fixed-capacity vector. If all
fade slots are busy a new crossfade completes instantly instead of
allocating - a hard path swap is still better than a missed deadline.
*/

/// Upper bound on simultaneously running crossfades.
pub const MAX_ACTIVE_FADES: usize = 8;

/// Exponential schedules cover this fraction of the distance within the
/// requested transition time (exp(-3) ≈ 5% remaining).
const SETTLE_FACTOR: f32 = 3.0;

/// Handle to one registered control. Only valid for the engine that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(usize);

#[derive(Debug)]
struct ControlTarget {
    name: String,
    value: f32,
    target: f32,
    /// Time to reach ~95% of the way to `target`.
    transition_seconds: f32,
}

/// Command sent from the control thread to the engine.
#[derive(Debug, Clone, Copy)]
pub enum AutomationCommand {
    Schedule {
        control: ControlId,
        value: f32,
        seconds: f32,
    },
    Crossfade {
        outgoing: ControlId,
        incoming: ControlId,
        seconds: f32,
    },
}

/// A transient equal-power fade between two path-gain controls.
#[derive(Debug)]
struct PathCrossfade {
    outgoing: ControlId,
    incoming: ControlId,
    outgoing_start: f32,
    incoming_start: f32,
    elapsed: f32,
    duration: f32,
}

/// Block-rate scheduler for every automatable scalar in an amp model.
pub struct AutomationEngine {
    sample_rate: f32,
    targets: Vec<ControlTarget>,
    fades: Vec<PathCrossfade>,
    #[cfg(feature = "rtrb")]
    rx: Option<Consumer<AutomationCommand>>,
}

impl AutomationEngine {
    pub fn new(sample_rate: f32) -> Self {
        debug_assert!(
            sample_rate > 0.0 && sample_rate.is_finite(),
            "sample rate must be positive, got {sample_rate}"
        );
        Self {
            sample_rate,
            targets: Vec::new(),
            fades: Vec::with_capacity(MAX_ACTIVE_FADES),
            #[cfg(feature = "rtrb")]
            rx: None,
        }
    }

    /// Create an engine together with a control-thread handle connected by
    /// a lock-free SPSC queue of the given capacity.
    #[cfg(feature = "rtrb")]
    pub fn with_queue(sample_rate: f32, queue_capacity: usize) -> (Self, AutomationHandle) {
        let (tx, rx) = RingBuffer::<AutomationCommand>::new(queue_capacity);
        let mut engine = Self::new(sample_rate);
        engine.rx = Some(rx);
        (engine, AutomationHandle { tx })
    }

    /// Register a control before audio starts. Allocates; never call this
    /// from the audio callback.
    pub fn register(&mut self, name: impl Into<String>, initial: f32) -> ControlId {
        let name = name.into();
        log::debug!("registering automation control '{name}' at {initial}");
        self.targets.push(ControlTarget {
            name,
            value: initial,
            target: initial,
            transition_seconds: 0.0,
        });
        ControlId(self.targets.len() - 1)
    }

    /// Current interpolated value of a control. Unknown ids read as 0.0
    /// rather than panicking on the audio thread.
    pub fn value(&self, control: ControlId) -> f32 {
        self.targets.get(control.0).map_or(0.0, |t| t.value)
    }

    /// Name a control was registered under.
    pub fn name(&self, control: ControlId) -> Option<&str> {
        self.targets.get(control.0).map(|t| t.name.as_str())
    }

    pub fn control_count(&self) -> usize {
        self.targets.len()
    }

    /// Retarget a control. `seconds` is the ~95%-settled transition time;
    /// zero or negative snaps immediately. Replaces any in-flight schedule
    /// for the same control and cancels any crossfade it is part of.
    pub fn schedule(&mut self, control: ControlId, value: f32, seconds: f32) {
        // A superseded fade must never write again; dropping the record is
        // continuous because the control keeps its current value.
        self.fades
            .retain(|f| f.outgoing != control && f.incoming != control);

        if let Some(target) = self.targets.get_mut(control.0) {
            target.target = value;
            if seconds > 0.0 {
                target.transition_seconds = seconds;
            } else {
                target.transition_seconds = 0.0;
                target.value = value;
            }
        }
    }

    /// Equal-power swap of two path gains over `seconds`: `outgoing` fades
    /// from its current value to 0.0, `incoming` rises from its current
    /// value to 1.0. Both starting points are sampled here, so replacing a
    /// fade mid-flight (including reversing it) picks up exactly where the
    /// old fade left the controls. Both controls are pinned by the fade
    /// until it completes; a later `schedule` on either one cancels it.
    pub fn crossfade(&mut self, outgoing: ControlId, incoming: ControlId, seconds: f32) {
        // Re-fading either path replaces the old fade.
        self.fades
            .retain(|f| {
                f.outgoing != outgoing
                    && f.incoming != incoming
                    && f.outgoing != incoming
                    && f.incoming != outgoing
            });

        let fade = PathCrossfade {
            outgoing,
            incoming,
            outgoing_start: self.value(outgoing),
            incoming_start: self.value(incoming),
            elapsed: 0.0,
            duration: seconds.max(crate::MIN_TIME),
        };

        if seconds <= 0.0 || self.fades.len() == MAX_ACTIVE_FADES {
            // No slot (or no duration): hard swap rather than allocating or
            // blocking on the audio thread.
            self.finish_fade(&fade);
        } else {
            self.fades.push(fade);
        }
    }

    /// Advance every control and fade by one block. Call once per audio
    /// block, before any stage reads its control values.
    pub fn process_block(&mut self, block_len: usize) {
        self.drain_queue();

        let dt = block_len as f32 / self.sample_rate;

        // Fades first: they pin their controls for this block.
        let mut i = 0;
        while i < self.fades.len() {
            self.fades[i].elapsed += dt;
            if self.fades[i].elapsed >= self.fades[i].duration {
                let fade = self.fades.swap_remove(i);
                self.finish_fade(&fade);
            } else {
                let t = self.fades[i].elapsed / self.fades[i].duration;
                let (outgoing, incoming, out_start, in_start) = (
                    self.fades[i].outgoing,
                    self.fades[i].incoming,
                    self.fades[i].outgoing_start,
                    self.fades[i].incoming_start,
                );
                let (w_out, w_in) = equal_power_weights(t);
                self.pin(outgoing, out_start * w_out);
                self.pin(incoming, in_start + (1.0 - in_start) * w_in);
                i += 1;
            }
        }

        for target in &mut self.targets {
            if target.value == target.target {
                continue;
            }
            if target.transition_seconds <= 0.0 {
                target.value = target.target;
                continue;
            }
            let alpha = (-SETTLE_FACTOR * dt / target.transition_seconds).exp();
            target.value = target.target + (target.value - target.target) * alpha;
        }
    }

    /// Set value and target together so the exponential step leaves the
    /// control exactly where the fade put it.
    fn pin(&mut self, control: ControlId, value: f32) {
        if let Some(target) = self.targets.get_mut(control.0) {
            target.value = value;
            target.target = value;
        }
    }

    fn finish_fade(&mut self, fade: &PathCrossfade) {
        self.pin(fade.outgoing, 0.0);
        self.pin(fade.incoming, 1.0);
    }

    #[cfg(feature = "rtrb")]
    fn drain_queue(&mut self) {
        let Some(mut rx) = self.rx.take() else {
            return;
        };
        while let Ok(command) = rx.pop() {
            match command {
                AutomationCommand::Schedule {
                    control,
                    value,
                    seconds,
                } => self.schedule(control, value, seconds),
                AutomationCommand::Crossfade {
                    outgoing,
                    incoming,
                    seconds,
                } => self.crossfade(outgoing, incoming, seconds),
            }
        }
        self.rx = Some(rx);
    }

    #[cfg(not(feature = "rtrb"))]
    fn drain_queue(&mut self) {}
}

/// Control-thread side of the SPSC command queue.
///
/// Pushes never block; a full queue drops the command.
#[cfg(feature = "rtrb")]
pub struct AutomationHandle {
    tx: Producer<AutomationCommand>,
}

#[cfg(feature = "rtrb")]
impl AutomationHandle {
    pub fn schedule(&mut self, control: ControlId, value: f32, seconds: f32) {
        let _ = self.tx.push(AutomationCommand::Schedule {
            control,
            value,
            seconds,
        });
    }

    pub fn crossfade(&mut self, outgoing: ControlId, incoming: ControlId, seconds: f32) {
        let _ = self.tx.push(AutomationCommand::Crossfade {
            outgoing,
            incoming,
            seconds,
        });
    }
}
