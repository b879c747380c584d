// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame scroll driver: eased programmatic animation and autoscroll.
//!
//! [`ScrollDriver`] holds no timer of its own. The owner starts a periodic
//! tick while [`ScrollDriver::needs_ticks`] is `true`, calls
//! [`ScrollDriver::tick`] with the current time on each firing, and applies the
//! returned [`TickOutcome`]. Times are in seconds on any monotonic clock.

/// Cubic ease-in-out over `t ∈ [0, 1]`.
///
/// `4t³` for the first half, `4(t − 1)³ + 1` for the second. Inputs outside
/// the unit interval are clamped.
#[must_use]
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = t - 1.0;
        4.0 * u * u * u + 1.0
    }
}

/// A programmatic scroll from one offset to another.
///
/// Offsets are raw (not wrapped); the owner maps sampled offsets through
/// [`IndexSpace::clamped_offset`](crate::IndexSpace::clamped_offset).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    /// Offset at the start of the animation.
    pub start_offset: f64,
    /// Offset at the end of the animation.
    pub end_offset: f64,
    /// Time the animation started.
    pub start_time: f64,
    /// Length of the animation. Must be positive.
    pub duration: f64,
}

impl ScrollAnimation {
    /// Linear progress in `[0, 1]` at time `now`.
    #[must_use]
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    /// Eased offset at time `now`.
    #[must_use]
    pub fn sample(&self, now: f64) -> f64 {
        let eased = ease_in_out(self.progress(now));
        self.start_offset + (self.end_offset - self.start_offset) * eased
    }

    /// Returns `true` once `now` has reached the end of the animation.
    #[must_use]
    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

/// What the driver is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverPhase {
    /// Nothing to do; ticking can stop.
    Idle,
    /// A programmatic animation is in flight.
    Animating(ScrollAnimation),
    /// Scrolling continuously at this many items per second.
    Autoscrolling(f64),
}

/// Result of one [`ScrollDriver::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The animation moved to `offset` (raw, not yet wrapped). When `finished`
    /// is set the driver has returned to idle or autoscroll.
    Animated {
        /// Sampled offset.
        offset: f64,
        /// The animation reached its end on this tick.
        finished: bool,
    },
    /// Autoscroll advanced the offset to this value (raw, not yet wrapped).
    Autoscrolled(f64),
    /// Autoscroll is paused while the user drags.
    Held,
    /// Nothing is active; the periodic tick should be stopped.
    Stop,
}

/// The animation/autoscroll state machine.
#[derive(Debug, Clone, Default)]
pub struct ScrollDriver {
    animation: Option<ScrollAnimation>,
    autoscroll: f64,
    last_time: Option<f64>,
}

impl ScrollDriver {
    /// Creates an idle driver.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            animation: None,
            autoscroll: 0.0,
            last_time: None,
        }
    }

    /// Current phase. A running animation takes precedence over autoscroll.
    #[must_use]
    pub fn phase(&self) -> DriverPhase {
        match self.animation {
            Some(animation) => DriverPhase::Animating(animation),
            None if self.autoscroll != 0.0 => DriverPhase::Autoscrolling(self.autoscroll),
            None => DriverPhase::Idle,
        }
    }

    /// The in-flight animation, if any.
    #[must_use]
    pub const fn animation(&self) -> Option<&ScrollAnimation> {
        self.animation.as_ref()
    }

    /// Returns `true` while a programmatic animation is in flight.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Returns `true` if the owner should keep a periodic tick running.
    #[must_use]
    pub fn needs_ticks(&self) -> bool {
        self.animation.is_some() || self.autoscroll != 0.0
    }

    /// Autoscroll rate in items per second.
    #[must_use]
    pub const fn autoscroll(&self) -> f64 {
        self.autoscroll
    }

    /// Sets the autoscroll rate in items per second; `0.0` disables it.
    pub fn set_autoscroll(&mut self, rate: f64) {
        self.autoscroll = rate;
    }

    /// Starts an animation, replacing any in flight.
    pub fn animate(&mut self, animation: ScrollAnimation) {
        debug_assert!(
            animation.duration > 0.0,
            "scroll animations need a positive duration"
        );
        self.animation = Some(animation);
    }

    /// Drops the in-flight animation without finishing it.
    ///
    /// Returns `true` if an animation was cancelled.
    pub fn cancel_animation(&mut self) -> bool {
        self.animation.take().is_some()
    }

    /// Records `now` as the reference time for autoscroll deltas.
    ///
    /// Call this when the periodic tick (re)starts so the first autoscroll step
    /// does not include the time spent idle.
    pub fn resume_at(&mut self, now: f64) {
        self.last_time = Some(now);
    }

    /// Advances the state machine to time `now`.
    ///
    /// `offset` is the owner's current scroll offset and `dragging` whether the
    /// user is currently dragging the surface.
    pub fn tick(&mut self, now: f64, offset: f64, dragging: bool) -> TickOutcome {
        let elapsed = self.last_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_time = Some(now);

        if let Some(animation) = self.animation {
            let finished = animation.is_finished(now);
            let offset = animation.sample(now);
            if finished {
                self.animation = None;
            }
            TickOutcome::Animated { offset, finished }
        } else if self.autoscroll != 0.0 {
            if dragging {
                TickOutcome::Held
            } else {
                TickOutcome::Autoscrolled(offset + elapsed * self.autoscroll)
            }
        } else {
            TickOutcome::Stop
        }
    }
}
