// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap recognition on a scrolling surface.
//!
//! A press only counts as a tap if the pointer stays close to where it went
//! down and, optionally, is released quickly enough. Anything else is a drag
//! and belongs to the scroll surface.
//!
//! ```
//! use kurbo::Point;
//! use understory_carousel::tap::{TapResult, TapState};
//!
//! let mut state: TapState<u32> = TapState::with_thresholds(Some(10.0), Some(500));
//! state.on_down(7, Point::new(10.0, 10.0), 1000);
//! assert_eq!(state.on_move(Point::new(14.0, 13.0)), None);
//! assert_eq!(state.on_up(Point::new(14.0, 13.0), 1100), TapResult::Tap(7));
//!
//! // Moving too far turns the press into a drag.
//! state.on_down(7, Point::new(10.0, 10.0), 2000);
//! assert_eq!(state.on_move(Point::new(40.0, 10.0)), Some(7));
//! assert_eq!(state.on_up(Point::new(40.0, 10.0), 2050), TapResult::Suppressed(Some(7)));
//! ```

use kurbo::Point;

/// An active press.
#[derive(Clone, Debug)]
pub struct Press<K> {
    /// What was under the pointer when it went down.
    pub target: K,
    /// Pointer position at press time.
    pub down_position: Point,
    /// Press timestamp, in milliseconds.
    pub down_time: u64,
    /// The pointer has travelled beyond the movement threshold.
    pub distance_exceeded: bool,
}

/// Outcome of releasing the pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapResult<K> {
    /// The press was a tap on this target.
    Tap(K),
    /// The press was not a tap; carries the pressed target, if there was a press.
    Suppressed(Option<K>),
}

/// Single-pointer tap recognizer.
#[derive(Clone, Debug)]
pub struct TapState<K> {
    press: Option<Press<K>>,
    /// Pointer travel beyond which the press is a drag. `None` allows any travel.
    pub total_pointer_moved_threshold: Option<f64>,
    /// Longest press (milliseconds) still counted as a tap. `None` allows any duration.
    pub time_threshold: Option<u64>,
}

impl<K: Clone> TapState<K> {
    /// Creates a recognizer with a 10-point movement tolerance and no time limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_thresholds(Some(10.0), None)
    }

    /// Creates a recognizer with custom thresholds.
    #[must_use]
    pub fn with_thresholds(
        total_pointer_moved_threshold: Option<f64>,
        time_threshold: Option<u64>,
    ) -> Self {
        Self {
            press: None,
            total_pointer_moved_threshold,
            time_threshold,
        }
    }

    /// Records a pointer down on `target`, replacing any earlier press.
    pub fn on_down(&mut self, target: K, position: Point, timestamp: u64) {
        self.press = Some(Press {
            target,
            down_position: position,
            down_time: timestamp,
            distance_exceeded: false,
        });
    }

    /// Tracks pointer movement.
    ///
    /// Returns the pressed target the first time the movement threshold is
    /// exceeded, `None` otherwise.
    pub fn on_move(&mut self, position: Point) -> Option<K> {
        let threshold = self.total_pointer_moved_threshold?;
        let press = self.press.as_mut()?;
        if press.distance_exceeded || press.down_position.distance(position) <= threshold {
            return None;
        }
        press.distance_exceeded = true;
        Some(press.target.clone())
    }

    /// Ends the press and decides whether it was a tap.
    pub fn on_up(&mut self, position: Point, timestamp: u64) -> TapResult<K> {
        let Some(press) = self.press.take() else {
            return TapResult::Suppressed(None);
        };
        if press.distance_exceeded {
            return TapResult::Suppressed(Some(press.target));
        }
        let distance_ok = self
            .total_pointer_moved_threshold
            .is_none_or(|threshold| press.down_position.distance(position) <= threshold);
        let time_ok = self
            .time_threshold
            .is_none_or(|threshold| timestamp.saturating_sub(press.down_time) <= threshold);
        if distance_ok && time_ok {
            TapResult::Tap(press.target)
        } else {
            TapResult::Suppressed(Some(press.target))
        }
    }

    /// Drops the active press. Returns `true` if there was one.
    pub fn cancel(&mut self) -> bool {
        self.press.take().is_some()
    }

    /// Returns `true` while a press is active.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// The active press, if any.
    #[must_use]
    pub fn press(&self) -> Option<&Press<K>> {
        self.press.as_ref()
    }
}

impl<K: Clone> Default for TapState<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_press_is_a_tap() {
        let mut state: TapState<u32> = TapState::new();
        state.on_down(1, Point::new(0.0, 0.0), 0);
        assert!(state.is_pressed());
        assert_eq!(state.on_up(Point::new(3.0, 4.0), 5000), TapResult::Tap(1));
        assert!(!state.is_pressed());
    }

    #[test]
    fn excessive_movement_is_a_drag() {
        let mut state: TapState<u32> = TapState::new();
        state.on_down(1, Point::new(0.0, 0.0), 0);
        assert_eq!(state.on_move(Point::new(6.0, 8.0)), None);
        assert_eq!(state.on_move(Point::new(20.0, 0.0)), Some(1));
        // Only reported once.
        assert_eq!(state.on_move(Point::new(30.0, 0.0)), None);
        // Coming back does not turn the drag into a tap.
        assert_eq!(
            state.on_up(Point::new(0.0, 0.0), 10),
            TapResult::Suppressed(Some(1))
        );
    }

    #[test]
    fn release_far_away_is_not_a_tap() {
        let mut state: TapState<u32> = TapState::new();
        state.on_down(1, Point::new(0.0, 0.0), 0);
        assert_eq!(
            state.on_up(Point::new(0.0, 11.0), 10),
            TapResult::Suppressed(Some(1))
        );
    }

    #[test]
    fn time_threshold_applies_when_configured() {
        let mut state: TapState<u32> = TapState::with_thresholds(None, Some(200));
        state.on_down(1, Point::new(0.0, 0.0), 100);
        // No movement threshold: any travel is fine.
        assert_eq!(state.on_move(Point::new(500.0, 0.0)), None);
        assert_eq!(state.on_up(Point::new(500.0, 0.0), 300), TapResult::Tap(1));

        state.on_down(2, Point::new(0.0, 0.0), 100);
        assert_eq!(
            state.on_up(Point::new(0.0, 0.0), 301),
            TapResult::Suppressed(Some(2))
        );
    }

    #[test]
    fn release_without_press_is_suppressed() {
        let mut state: TapState<u32> = TapState::default();
        assert_eq!(
            state.on_up(Point::new(0.0, 0.0), 0),
            TapResult::Suppressed(None)
        );
        state.on_down(1, Point::new(0.0, 0.0), 0);
        assert!(state.cancel());
        assert!(!state.cancel());
        assert_eq!(
            state.on_up(Point::new(0.0, 0.0), 0),
            TapResult::Suppressed(None)
        );
    }
}
