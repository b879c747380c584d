// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_carousel --heading-base-level=0

//! Understory Carousel: a headless, recycling, optionally circular carousel.
//!
//! This crate implements the state and geometry of a paged carousel on top of
//! a host-provided scroll surface. It does not draw anything and does not own
//! any widgets; host frameworks plug in their own views.
//!
//! The core concepts are:
//!
//! - [`IndexSpace`]: wrap-aware index and offset arithmetic over `0..len`,
//!   including the shortest signed distance between two positions.
//! - [`visible_window`] and [`ItemViews`]: which indices must be realized for a
//!   scroll position, and a reconciler that detaches the views that left the
//!   window, parks them in a LIFO reuse pool, and loads the ones that entered.
//! - [`surface_layout`], [`offset_for_item`], and [`item_frame`]: sizing of
//!   the paging viewport and placement of each realized item.
//! - [`ScrollDriver`]: the eased scroll animation and autoscroll state machine
//!   advanced on every frame tick.
//! - [`Carousel`]: the controller tying these together over a
//!   [`ScrollSurface`], an [`ItemSource`], a [`CarouselDelegate`], and a
//!   [`FrameScheduler`].
//!
//! Scroll positions are measured in items: an offset of `2.5` sits halfway
//! between item 2 and item 3. In wrap mode the surface content holds three
//! copies of the strip and is silently recentered so the user can scroll
//! forever in either direction.
//!
//! Host frameworks are responsible for:
//!
//! - Implementing [`ScrollSurface`] over their scroll container and view tree.
//! - Forwarding user scroll events to the `surface_*` methods.
//! - Calling [`Carousel::layout_if_needed`] during layout and
//!   [`Carousel::tick`] whenever the [`FrameScheduler`] fires.
//!
//! ## Minimal example
//!
//! The offset math is usable on its own:
//!
//! ```rust
//! use understory_carousel::{IndexSpace, WindowParams, visible_window};
//!
//! // Five items in a circle.
//! let space = IndexSpace::new(5, true);
//! assert_eq!(space.clamped_index(-1), 4);
//! assert_eq!(space.clamped_offset(6.5), 1.5);
//! // Going from item 0 to item 4 is one step backwards.
//! assert_eq!(space.min_index_distance(0, 4), -1);
//!
//! // A 300px wide carousel with 100px items, centered on item 0.
//! let window = visible_window(
//!     &WindowParams {
//!         scroll_offset: 0.0,
//!         item_extent: 100.0,
//!         viewport_length: 300.0,
//!         origin_offset: 100.0,
//!         deferred_anchor: None,
//!     },
//!     &space,
//! );
//! assert_eq!(window.as_slice(), &[4, 0, 1]);
//! ```
//!
//! Events are logged with [`tracing`]: lifecycle changes at `debug`, per-frame
//! detail (view reconciliation, wrap recentering) at `trace`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod carousel;
pub mod config;
mod driver;
mod host;
mod index_space;
mod layout;
mod pool;
pub mod tap;

pub use carousel::Carousel;
pub use config::CarouselConfig;
pub use driver::{DriverPhase, ScrollAnimation, ScrollDriver, TickOutcome, ease_in_out};
pub use host::{
    CarouselDelegate, CarouselStatus, FrameScheduler, ItemSource, NoDelegate, ScrollSurface,
    SurfaceBehavior, SurfaceFlags,
};
pub use index_space::IndexSpace;
pub use layout::{
    Alignment, AxisGeometry, LayoutParams, Orientation, SurfaceLayout, item_frame,
    offset_for_item, surface_layout,
};
pub use pool::{
    IndexWindow, ItemViews, Reconciled, ViewPool, VisibleViews, WindowParams, visible_window,
};
