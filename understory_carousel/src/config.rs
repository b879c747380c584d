// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Carousel configuration and tuning constants.

use crate::{Alignment, Orientation};

/// Interval between ticks while an animation or autoscroll is running, in seconds.
pub const TICK_INTERVAL: f64 = 1.0 / 60.0;

/// Offsets this close to a whole item snap onto it when deceleration ends.
pub const SETTLE_SNAP_THRESHOLD: f64 = 0.01;

/// Scroll offset changes at or below this are ignored by
/// [`Carousel::set_scroll_offset`](crate::Carousel::set_scroll_offset).
pub const OFFSET_EPSILON: f64 = 0.0001;

/// Changes at or below this are ignored by the deceleration and autoscroll setters.
pub const SETTER_EPSILON: f64 = 0.001;

/// Item dimensions below this are replaced with `1.0`.
pub const MIN_ITEM_DIMENSION: f64 = 0.0001;

/// Duration of the re-snap to the current item after a layout pass with paging.
pub const PAGING_SNAP_DURATION: f64 = 0.25;

/// Initial settings for a [`Carousel`](crate::Carousel).
///
/// Every field can be changed later through the matching setter on the
/// carousel.
#[derive(Clone, Debug, PartialEq)]
pub struct CarouselConfig {
    /// Number of items that make up one page. Values below 1 are treated as 1.
    pub items_per_page: usize,
    /// Let the last page end at the last item instead of padding it out.
    pub truncate_final_page: bool,
    /// Placement of the paging viewport inside the carousel bounds.
    pub alignment: Alignment,
    /// Scroll axis.
    pub orientation: Orientation,
    /// Scroll page by page.
    pub paging_enabled: bool,
    /// Allow the user to scroll at all.
    pub scroll_enabled: bool,
    /// Circular mode: the item after the last one is the first one.
    pub wrap_enabled: bool,
    /// Let the surface bounce past its ends. Ignored in wrap mode.
    pub bounces: bool,
    /// Let the surface hold touches briefly to tell taps from drags.
    pub delays_content_touches: bool,
    /// Deceleration rate handed to the surface.
    pub deceleration_rate: f64,
    /// Autoscroll speed in items per second; `0.0` disables it.
    pub autoscroll: f64,
    /// Widen and debounce the visible window during continuous scrolling.
    pub defers_item_view_loading: bool,
    /// Pointer travel beyond which a press is a drag rather than a tap.
    pub tap_movement_threshold: Option<f64>,
    /// Press duration (milliseconds) beyond which a press is not a tap.
    pub tap_time_threshold: Option<u64>,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            items_per_page: 1,
            truncate_final_page: false,
            alignment: Alignment::Center,
            orientation: Orientation::Horizontal,
            paging_enabled: true,
            scroll_enabled: true,
            wrap_enabled: false,
            bounces: true,
            delays_content_touches: true,
            deceleration_rate: 0.998,
            autoscroll: 0.0,
            defers_item_view_loading: false,
            tap_movement_threshold: Some(10.0),
            tap_time_threshold: None,
        }
    }
}
