// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborators a host framework plugs into a [`Carousel`](crate::Carousel).
//!
//! - [`ScrollSurface`]: the host's scrollable container and its view tree.
//! - [`ItemSource`]: supplies the item count and builds or refreshes item views.
//! - [`CarouselDelegate`]: optional size preference, notifications, and
//!   selection hooks. Every method has a default.
//! - [`FrameScheduler`]: a clock plus a repeating task that calls
//!   [`Carousel::tick`](crate::Carousel::tick).

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Insets, Point, Rect, Size};

bitflags::bitflags! {
    /// Behaviour switches forwarded to the host scroll surface.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SurfaceFlags: u8 {
        /// Scrolling stops on page boundaries.
        const PAGING                  = 0b0000_0001;
        /// The surface bounces past its ends.
        const BOUNCES                 = 0b0000_0010;
        /// The surface bounces horizontally even when content fits.
        const ALWAYS_BOUNCE_HORIZONTAL = 0b0000_0100;
        /// The surface bounces vertically even when content fits.
        const ALWAYS_BOUNCE_VERTICAL  = 0b0000_1000;
        /// The user may scroll the surface.
        const SCROLL_ENABLED          = 0b0001_0000;
        /// Touches are held briefly before reaching item views.
        const DELAYS_CONTENT_TOUCHES  = 0b0010_0000;
    }
}

impl Default for SurfaceFlags {
    fn default() -> Self {
        Self::PAGING | Self::BOUNCES | Self::SCROLL_ENABLED | Self::DELAYS_CONTENT_TOUCHES
    }
}

/// Everything the carousel asks the surface to honor besides geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceBehavior {
    /// Behaviour switches.
    pub flags: SurfaceFlags,
    /// Deceleration rate after the user lifts their finger.
    pub deceleration_rate: f64,
}

/// The host's scrollable container.
///
/// The surface has a frame inside the carousel bounds, a content size, and a
/// content offset (the scroll position, in points). Item views are attached to
/// its content and positioned in content coordinates.
///
/// The carousel writes the content offset itself during animation and wrap
/// recentering. Those writes must not be reported back through
/// [`Carousel::surface_did_scroll`](crate::Carousel::surface_did_scroll); only
/// user-driven movement should be.
pub trait ScrollSurface {
    /// Handle to an item view. Handles are compared and hashed by identity.
    type View: Clone + Eq + Hash + Debug;

    /// Frame of the surface within the carousel bounds.
    fn frame(&self) -> Rect;

    /// Moves or resizes the surface.
    fn set_frame(&mut self, frame: Rect);

    /// Total scrollable content size.
    fn content_size(&self) -> Size;

    /// Sets the total scrollable content size.
    fn set_content_size(&mut self, size: Size);

    /// Current scroll position.
    fn content_offset(&self) -> Point;

    /// Sets the scroll position without animating.
    fn set_content_offset(&mut self, offset: Point);

    /// Insets applied around the content.
    fn content_insets(&self) -> Insets {
        Insets::ZERO
    }

    /// Returns `true` while the user is dragging the surface.
    fn is_dragging(&self) -> bool;

    /// Returns `true` while the surface coasts after a drag.
    fn is_decelerating(&self) -> bool;

    /// Applies behaviour switches and the deceleration rate.
    fn apply_behavior(&mut self, behavior: &SurfaceBehavior);

    /// Adds an item view to the surface content.
    fn attach(&mut self, view: &Self::View);

    /// Removes an item view from the surface content.
    fn detach(&mut self, view: &Self::View);

    /// Positions an item view. Must take effect immediately, with no implicit
    /// transition.
    fn place(&mut self, view: &Self::View, frame: Rect);

    /// Natural size of a view, used when no item size is configured.
    fn measured_size(&self, view: &Self::View) -> Size;

    /// Parent of `view` in the host tree, or `None` once the surface itself
    /// (or the tree root) is reached.
    fn parent_of(&self, view: &Self::View) -> Option<Self::View>;

    /// Returns `true` if `view` processes touches itself, in which case taps on
    /// it are not treated as item selection.
    fn handles_touches(&self, view: &Self::View) -> bool {
        let _ = view;
        false
    }
}

/// Supplies items to a carousel.
pub trait ItemSource<V> {
    /// Number of items.
    fn item_count(&self) -> usize;

    /// Returns the view for item `index`.
    ///
    /// `reusable` is a recycled handle that previously showed some other item;
    /// when it is provided, refresh all of its index-dependent content and
    /// return it. Returning a fresh handle is also valid.
    fn view_for_item(&mut self, index: usize, reusable: Option<V>) -> V;
}

/// Read-only snapshot of carousel state handed to [`CarouselDelegate`] methods.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarouselStatus {
    /// Number of items.
    pub item_count: usize,
    /// Continuous scroll position, in items.
    pub scroll_offset: f64,
    /// Index nearest to the scroll position.
    pub current_index: usize,
    /// Page containing the current index.
    pub current_page: usize,
    /// Number of pages.
    pub page_count: usize,
    /// Items per page.
    pub items_per_page: usize,
    /// A programmatic scroll animation is in flight.
    pub is_animating: bool,
}

/// Optional presentation hooks. Every method defaults to doing nothing.
pub trait CarouselDelegate {
    /// Preferred item size. `None` (or a zero size) means measure item 0.
    fn item_size(&mut self, status: &CarouselStatus) -> Option<Size> {
        let _ = status;
        None
    }

    /// The scroll position changed.
    fn did_scroll(&mut self, status: &CarouselStatus) {
        let _ = status;
    }

    /// The current index changed.
    fn current_index_did_change(&mut self, status: &CarouselStatus) {
        let _ = status;
    }

    /// The user started dragging.
    fn will_begin_dragging(&mut self, status: &CarouselStatus) {
        let _ = status;
    }

    /// The user stopped dragging.
    fn did_end_dragging(&mut self, status: &CarouselStatus, will_decelerate: bool) {
        let _ = (status, will_decelerate);
    }

    /// The surface started coasting.
    fn will_begin_decelerating(&mut self, status: &CarouselStatus) {
        let _ = status;
    }

    /// The surface stopped coasting.
    fn did_end_decelerating(&mut self, status: &CarouselStatus) {
        let _ = status;
    }

    /// A programmatic scroll animation reached its end.
    fn did_end_scrolling_animation(&mut self, status: &CarouselStatus) {
        let _ = status;
    }

    /// Whether a tap on item `index` should select it.
    fn should_select(&mut self, index: usize, status: &CarouselStatus) -> bool {
        let _ = (index, status);
        true
    }

    /// Item `index` was tapped.
    fn did_select(&mut self, index: usize, status: &CarouselStatus) {
        let _ = (index, status);
    }
}

/// A delegate that keeps every default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelegate;

impl CarouselDelegate for NoDelegate {}

/// Host clock and repeating task.
///
/// While started, the host calls [`Carousel::tick`](crate::Carousel::tick)
/// roughly every `interval` seconds.
pub trait FrameScheduler {
    /// Current time in seconds on a monotonic clock.
    fn now(&self) -> f64;

    /// Starts (or keeps) the repeating task.
    fn start(&mut self, interval: f64);

    /// Stops the repeating task.
    fn stop(&mut self);
}
