// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The carousel controller.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size};
use tracing::{debug, trace};

use crate::config::{
    MIN_ITEM_DIMENSION, OFFSET_EPSILON, PAGING_SNAP_DURATION, SETTER_EPSILON,
    SETTLE_SNAP_THRESHOLD, TICK_INTERVAL,
};
use crate::driver::{ScrollAnimation, ScrollDriver, TickOutcome};
use crate::index_space::floor_to_isize;
use crate::layout::{AxisGeometry, LayoutParams, item_frame, offset_for_item, surface_layout};
use crate::pool::{ItemViews, WindowParams, visible_window};
use crate::tap::{TapResult, TapState};
use crate::{
    Alignment, CarouselConfig, CarouselDelegate, CarouselStatus, FrameScheduler, IndexSpace,
    ItemSource, NoDelegate, Orientation, ScrollSurface, SurfaceBehavior, SurfaceFlags,
};

/// A recycling, optionally circular carousel over a host [`ScrollSurface`].
///
/// The carousel owns the surface, the item source, the delegate, and the
/// scheduler. Hosts forward their events to it:
///
/// - geometry changes through [`Carousel::set_bounds`] and then
///   [`Carousel::layout_if_needed`] during their layout pass,
/// - user scrolling through the `surface_*` methods,
/// - scheduler firings through [`Carousel::tick`],
/// - pointer input through [`Carousel::pointer_down`],
///   [`Carousel::pointer_move`], and [`Carousel::pointer_up`].
///
/// Positions are measured in items: a scroll offset of `2.5` is halfway
/// between item 2 and item 3.
pub struct Carousel<S: ScrollSurface> {
    surface: S,
    source: Option<Box<dyn ItemSource<S::View>>>,
    delegate: Box<dyn CarouselDelegate>,
    scheduler: Box<dyn FrameScheduler>,
    config: CarouselConfig,

    bounds: Size,
    item_count: usize,
    item_size: Size,
    scroll_offset: f64,
    current_index: usize,
    previous_index: usize,
    last_update_offset: f64,
    previous_content_offset: Point,

    items: ItemViews<S::View>,
    driver: ScrollDriver,
    tap: TapState<S::View>,
    ticking: bool,
    needs_layout: bool,
}

impl<S: ScrollSurface> fmt::Debug for Carousel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("config", &self.config)
            .field("bounds", &self.bounds)
            .field("item_count", &self.item_count)
            .field("item_size", &self.item_size)
            .field("scroll_offset", &self.scroll_offset)
            .field("current_index", &self.current_index)
            .field("items", &self.items)
            .field("driver", &self.driver)
            .field("ticking", &self.ticking)
            .field("needs_layout", &self.needs_layout)
            .finish_non_exhaustive()
    }
}

impl<S: ScrollSurface> Carousel<S> {
    /// Creates a carousel with the default configuration and no item source.
    #[must_use]
    pub fn new(surface: S, scheduler: impl FrameScheduler + 'static) -> Self {
        Self::with_config(surface, scheduler, CarouselConfig::default())
    }

    /// Creates a carousel with the given configuration and no item source.
    #[must_use]
    pub fn with_config(
        surface: S,
        scheduler: impl FrameScheduler + 'static,
        config: CarouselConfig,
    ) -> Self {
        let previous_content_offset = surface.content_offset();
        let mut driver = ScrollDriver::new();
        driver.set_autoscroll(config.autoscroll);
        let tap = TapState::with_thresholds(config.tap_movement_threshold, config.tap_time_threshold);
        let mut carousel = Self {
            surface,
            source: None,
            delegate: Box::new(NoDelegate),
            scheduler: Box::new(scheduler),
            config,
            bounds: Size::ZERO,
            item_count: 0,
            item_size: Size::ZERO,
            scroll_offset: 0.0,
            current_index: 0,
            previous_index: 0,
            last_update_offset: 0.0,
            previous_content_offset,
            items: ItemViews::new(),
            driver,
            tap,
            ticking: false,
            needs_layout: true,
        };
        carousel.apply_behavior();
        if carousel.driver.needs_ticks() {
            carousel.start_ticking();
        }
        carousel
    }

    // --- Collaborators ---

    /// The scroll surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the scroll surface.
    ///
    /// Geometry written here is picked up by the next layout pass; scroll
    /// movement must still be reported through [`Carousel::surface_did_scroll`].
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Installs the item source and reloads.
    pub fn set_item_source(&mut self, source: impl ItemSource<S::View> + 'static) {
        self.source = Some(Box::new(source));
        self.reload();
    }

    /// Installs the delegate.
    pub fn set_delegate(&mut self, delegate: impl CarouselDelegate + 'static) {
        self.delegate = Box::new(delegate);
        self.needs_layout = true;
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    // --- Geometry and layout ---

    /// Size of the carousel itself.
    #[must_use]
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Resizes the carousel.
    pub fn set_bounds(&mut self, bounds: Size) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.needs_layout = true;
        }
    }

    /// Returns `true` if a setting changed since the last layout pass.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Requests a layout pass.
    pub fn set_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    /// Runs [`Carousel::layout`] if a layout pass was requested.
    pub fn layout_if_needed(&mut self) {
        if self.needs_layout {
            self.layout();
        }
    }

    /// The layout pass.
    ///
    /// Refreshes the item count and size, sizes the surface, recenters the
    /// wrap buffer, reconciles the visible views, and positions them. With
    /// paging enabled and no animation in flight, it then eases back onto the
    /// current item.
    pub fn layout(&mut self) {
        self.needs_layout = false;
        self.update_item_size_and_count();
        self.update_surface_dimensions();
        self.update_layout();
        if self.config.paging_enabled && !self.driver.is_animating() {
            self.scroll_to_index(self.current_index, PAGING_SNAP_DURATION);
        }
    }

    /// Discards every item view and re-reads the item source.
    ///
    /// Views are reloaded by the next layout pass.
    pub fn reload(&mut self) {
        for view in self.items.reset() {
            self.surface.detach(&view);
        }
        self.update_item_size_and_count();
        self.needs_layout = true;
        if self.item_count > 0 && self.scroll_offset < 0.0 {
            self.scroll_offset = 0.0;
        }
        debug!(
            item_count = self.item_count,
            item_width = self.item_size.width,
            item_height = self.item_size.height,
            "reloaded items"
        );
    }

    /// Reloads the view for `index` if it is visible.
    pub fn reload_item(&mut self, index: usize) {
        if !self.items.visible().contains(index) {
            return;
        }
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let surface = &mut self.surface;
        let view = self.items.replace(
            index,
            |old| surface.detach(old),
            |index, reusable| source.view_for_item(index, reusable),
        );
        self.surface.attach(&view);
        self.place_view(&view, index);
    }

    // --- State queries ---

    /// Number of items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Size of one item.
    #[must_use]
    pub fn item_size(&self) -> Size {
        self.item_size
    }

    /// Items per page (at least 1).
    #[must_use]
    pub fn items_per_page(&self) -> usize {
        self.config.items_per_page.max(1)
    }

    /// Continuous scroll position, in items.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Index nearest to the scroll position.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.item_count.div_ceil(self.items_per_page())
    }

    /// Page containing the current index.
    ///
    /// With a truncated final page, every index past the last full page start
    /// belongs to the last page.
    #[must_use]
    pub fn current_page(&self) -> usize {
        let per_page = self.items_per_page();
        if per_page > 1
            && self.config.truncate_final_page
            && !self.config.wrap_enabled
            && self.current_index > (self.item_count / per_page).saturating_sub(1) * per_page
        {
            return self.page_count().saturating_sub(1);
        }
        // Rounds half up.
        (self.current_index * 2 + per_page) / (per_page * 2)
    }

    /// Snapshot handed to delegate methods.
    #[must_use]
    pub fn status(&self) -> CarouselStatus {
        CarouselStatus {
            item_count: self.item_count,
            scroll_offset: self.scroll_offset,
            current_index: self.current_index,
            current_page: self.current_page(),
            page_count: self.page_count(),
            items_per_page: self.items_per_page(),
            is_animating: self.driver.is_animating(),
        }
    }

    /// Visible indices in ascending order.
    #[must_use]
    pub fn visible_indices(&self) -> Vec<usize> {
        self.items.visible().indices()
    }

    /// Visible views in ascending index order.
    #[must_use]
    pub fn visible_views(&self) -> Vec<S::View> {
        self.items
            .visible()
            .entries()
            .into_iter()
            .map(|(_, view)| view)
            .collect()
    }

    /// View shown for `index`, if it is visible.
    #[must_use]
    pub fn view_at(&self, index: usize) -> Option<&S::View> {
        self.items.visible().get(index)
    }

    /// View shown for the current index, if it is visible.
    #[must_use]
    pub fn current_view(&self) -> Option<&S::View> {
        self.view_at(self.current_index)
    }

    /// Index shown by `view`, if it is a visible item view.
    #[must_use]
    pub fn index_of_view(&self, view: &S::View) -> Option<usize> {
        self.items.visible().index_of(view)
    }

    /// Index of the item view that is `view` or one of its ancestors.
    #[must_use]
    pub fn index_of_view_or_ancestor(&self, view: &S::View) -> Option<usize> {
        let mut current = view.clone();
        loop {
            if let Some(index) = self.items.visible().index_of(&current) {
                return Some(index);
            }
            current = self.surface.parent_of(&current)?;
        }
    }

    /// Returns `true` while the user drags the surface.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.surface.is_dragging()
    }

    /// Returns `true` while the surface coasts after a drag.
    #[must_use]
    pub fn is_decelerating(&self) -> bool {
        self.surface.is_decelerating()
    }

    /// Returns `true` while a programmatic scroll animation is in flight.
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.driver.is_animating()
    }

    /// The in-flight scroll animation, if any.
    #[must_use]
    pub fn scroll_animation(&self) -> Option<&ScrollAnimation> {
        self.driver.animation()
    }

    /// Returns `true` while the scheduler is asked to tick.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    // --- Settings ---

    /// Sets the viewport placement.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        if self.config.alignment != alignment {
            self.config.alignment = alignment;
            self.needs_layout = true;
        }
    }

    /// Sets the number of items per page. Values below 1 are treated as 1.
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        let items_per_page = items_per_page.max(1);
        if self.config.items_per_page != items_per_page {
            self.config.items_per_page = items_per_page;
            self.needs_layout = true;
        }
    }

    /// Lets the last page end at the last item.
    pub fn set_truncate_final_page(&mut self, truncate: bool) {
        if self.config.truncate_final_page != truncate {
            self.config.truncate_final_page = truncate;
            self.needs_layout = true;
        }
    }

    /// Allows or forbids user scrolling.
    pub fn set_scroll_enabled(&mut self, enabled: bool) {
        if self.config.scroll_enabled != enabled {
            self.config.scroll_enabled = enabled;
            self.apply_behavior();
        }
    }

    /// Enables page-by-page scrolling.
    pub fn set_paging_enabled(&mut self, enabled: bool) {
        if self.config.paging_enabled != enabled {
            self.config.paging_enabled = enabled;
            self.apply_behavior();
            self.needs_layout = true;
        }
    }

    /// Switches circular mode, keeping the same logical position.
    pub fn set_wrap_enabled(&mut self, enabled: bool) {
        if self.config.wrap_enabled != enabled {
            let previous_offset = self.space().clamped_offset(self.scroll_offset);
            self.config.wrap_enabled = enabled;
            self.apply_behavior();
            self.needs_layout = true;
            self.scroll_offset = previous_offset;
        }
    }

    /// Lets the surface hold touches briefly before they reach item views.
    pub fn set_delays_content_touches(&mut self, delays: bool) {
        if self.config.delays_content_touches != delays {
            self.config.delays_content_touches = delays;
            self.apply_behavior();
        }
    }

    /// Lets the surface bounce past its ends.
    pub fn set_bounces(&mut self, bounces: bool) {
        if self.config.bounces != bounces {
            self.config.bounces = bounces;
            self.apply_behavior();
        }
    }

    /// Sets the deceleration rate handed to the surface.
    pub fn set_deceleration_rate(&mut self, rate: f64) {
        if (self.config.deceleration_rate - rate).abs() > SETTER_EPSILON {
            self.config.deceleration_rate = rate;
            self.apply_behavior();
        }
    }

    /// Sets the autoscroll speed in items per second; `0.0` disables it.
    pub fn set_autoscroll(&mut self, rate: f64) {
        if (self.config.autoscroll - rate).abs() > SETTER_EPSILON {
            self.config.autoscroll = rate;
            self.driver.set_autoscroll(rate);
            if rate != 0.0 {
                self.start_ticking();
            }
        }
    }

    /// Sets the scroll axis.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.config.orientation != orientation {
            self.config.orientation = orientation;
            self.apply_behavior();
            self.needs_layout = true;
        }
    }

    /// Widens and debounces the visible window during continuous scrolling.
    pub fn set_defers_item_view_loading(&mut self, defers: bool) {
        self.config.defers_item_view_loading = defers;
    }

    /// Behaviour the surface is asked to honor for the current settings.
    #[must_use]
    pub fn surface_behavior(&self) -> SurfaceBehavior {
        let config = &self.config;
        let vertical = config.orientation.is_vertical();
        let mut flags = SurfaceFlags::empty();
        flags.set(SurfaceFlags::PAGING, config.paging_enabled);
        flags.set(
            SurfaceFlags::BOUNCES,
            config.bounces && !config.wrap_enabled,
        );
        flags.set(
            SurfaceFlags::ALWAYS_BOUNCE_HORIZONTAL,
            !vertical && config.bounces,
        );
        flags.set(
            SurfaceFlags::ALWAYS_BOUNCE_VERTICAL,
            vertical && config.bounces,
        );
        flags.set(SurfaceFlags::SCROLL_ENABLED, config.scroll_enabled);
        flags.set(
            SurfaceFlags::DELAYS_CONTENT_TOUCHES,
            config.delays_content_touches,
        );
        SurfaceBehavior {
            flags,
            deceleration_rate: config.deceleration_rate,
        }
    }

    // --- Navigation ---

    /// Jumps to `offset` and refreshes everything.
    ///
    /// Cancels any animation in flight. Changes of at most
    /// [`OFFSET_EPSILON`](crate::config::OFFSET_EPSILON) are ignored.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        if (self.scroll_offset - offset).abs() <= OFFSET_EPSILON {
            return;
        }
        self.jump_to(offset);
    }

    /// Unguarded body of [`Carousel::set_scroll_offset`]; autoscroll steps can
    /// be smaller than the guard and must still accumulate.
    fn jump_to(&mut self, offset: f64) {
        self.driver.cancel_animation();
        self.update_item_size_and_count();
        self.scroll_offset = self.space().clamped_offset(offset);
        self.force_refresh();
        self.update_surface_dimensions();
        self.update_layout();
        let main = self.scroll_offset * self.item_extent();
        self.set_content_offset_silently(self.config.orientation.point(main, 0.0));
        self.did_scroll();
    }

    /// Jumps to `index`.
    pub fn set_current_index(&mut self, index: usize) {
        self.set_scroll_offset(index as f64);
    }

    /// Jumps to `page` unless it already starts at the current index.
    pub fn set_current_page(&mut self, page: usize) {
        if page.saturating_mul(self.items_per_page()) != self.current_index {
            self.scroll_to_page(page, 0.0);
        }
    }

    /// Scrolls by `delta` items, animating over `duration` seconds.
    ///
    /// A zero duration jumps immediately. Without wrapping the target is
    /// clamped to the item range. An animated scroll that would not move
    /// cancels any animation in flight instead of starting a new one.
    pub fn scroll_by_offset(&mut self, delta: f64, duration: f64) {
        if duration <= 0.0 {
            self.set_scroll_offset(self.scroll_offset + delta);
            return;
        }
        let start_offset = self.scroll_offset;
        let mut end_offset = start_offset + delta;
        if !self.config.wrap_enabled {
            end_offset = self.space().clamped_offset(end_offset);
        }
        if (end_offset - start_offset).abs() <= OFFSET_EPSILON {
            self.driver.cancel_animation();
            return;
        }
        let start_time = self.scheduler.now();
        self.driver.animate(ScrollAnimation {
            start_offset,
            end_offset,
            start_time,
            duration,
        });
        debug!(start_offset, end_offset, duration, "scroll animation started");
        self.start_ticking();
    }

    /// Scrolls to `offset` the short way around.
    pub fn scroll_to_offset(&mut self, offset: f64, duration: f64) {
        let delta = self.space().min_offset_distance(self.scroll_offset, offset);
        self.scroll_by_offset(delta, duration);
    }

    /// Scrolls to `index` the short way around.
    pub fn scroll_to_index(&mut self, index: usize, duration: f64) {
        self.scroll_to_offset(index as f64, duration);
    }

    /// Scrolls to the first item of `page`.
    ///
    /// With a truncated final page the target never leaves fewer than a full
    /// page of items after it, unless there are fewer items than that.
    pub fn scroll_to_page(&mut self, page: usize, duration: f64) {
        let per_page = self.items_per_page();
        let mut index = page.saturating_mul(per_page);
        if self.config.truncate_final_page {
            index = index.min(self.item_count.saturating_sub(per_page));
        }
        self.scroll_to_index(index, duration);
    }

    /// Scrolls by whole items.
    ///
    /// Animated scrolls stop on the next whole item in the direction of
    /// travel (the nearest one for `count == 0`). Immediate scrolls move
    /// `count` items from the last reported current index.
    pub fn scroll_by_items(&mut self, count: isize, duration: f64) {
        if duration > 0.0 {
            let offset = self.scroll_offset;
            let steps = count as f64;
            let delta = match count {
                1.. => offset.floor() + steps - offset,
                ..0 => offset.ceil() + steps - offset,
                0 => offset.round() - offset,
            };
            self.scroll_by_offset(delta, duration);
        } else {
            let from = isize::try_from(self.previous_index).unwrap_or(isize::MAX);
            let index = self.space().clamped_index(from.saturating_add(count));
            self.set_scroll_offset(index as f64);
        }
    }

    // --- Frame ticks ---

    /// Advances animation and autoscroll. Call on every scheduler firing.
    pub fn tick(&mut self) {
        let now = self.scheduler.now();
        let dragging = self.surface.is_dragging();
        match self.driver.tick(now, self.scroll_offset, dragging) {
            TickOutcome::Animated { offset, finished } => {
                self.scroll_offset = self.space().clamped_offset(offset);
                let main = self.scroll_offset * self.item_extent();
                self.set_content_offset_silently(self.config.orientation.point(main, 0.0));
                self.did_scroll();
                if finished {
                    debug!(scroll_offset = self.scroll_offset, "scroll animation finished");
                    self.notify(|delegate, status| delegate.did_end_scrolling_animation(status));
                }
            }
            TickOutcome::Autoscrolled(offset) => self.jump_to(offset),
            TickOutcome::Held => {}
            TickOutcome::Stop => self.stop_ticking(),
        }
    }

    /// Tells the carousel it was added to (`true`) or removed from (`false`)
    /// a display.
    pub fn did_move_to_display(&mut self, attached: bool) {
        if attached {
            self.needs_layout = true;
            if self.driver.needs_ticks() {
                self.start_ticking();
            }
        } else {
            self.stop_ticking();
        }
    }

    // --- Surface callbacks ---

    /// The user moved the surface's content offset.
    ///
    /// Every internal write records the position it set, so a host echoing
    /// that write reports no movement. Events with no movement along the
    /// scroll axis are therefore dropped without refreshing or notifying the
    /// delegate, including genuine ones that only moved across the axis.
    pub fn surface_did_scroll(&mut self) {
        let o = self.config.orientation;
        let offset = self.surface.content_offset();
        let delta = o.main_of(offset) - o.main_of(self.previous_content_offset);
        self.previous_content_offset = offset;
        let extent = self.item_extent();
        // Echoes of the carousel's own writes carry no movement.
        if delta == 0.0 || extent <= 0.0 {
            return;
        }
        self.driver.cancel_animation();
        self.scroll_offset += delta / extent;
        self.did_scroll();
    }

    /// The user started dragging.
    pub fn surface_will_begin_dragging(&mut self) {
        self.notify(|delegate, status| delegate.will_begin_dragging(status));
        self.force_refresh();
        self.did_scroll();
    }

    /// The user stopped dragging.
    pub fn surface_did_end_dragging(&mut self, will_decelerate: bool) {
        if !will_decelerate {
            self.force_refresh();
            self.did_scroll();
        }
        self.notify(|delegate, status| delegate.did_end_dragging(status, will_decelerate));
    }

    /// The surface started coasting.
    pub fn surface_will_begin_decelerating(&mut self) {
        self.notify(|delegate, status| delegate.will_begin_decelerating(status));
    }

    /// The surface stopped coasting. Snaps onto a whole item when very close.
    pub fn surface_did_end_decelerating(&mut self) {
        let nearest = self.scroll_offset.round();
        if (self.scroll_offset - nearest).abs() < SETTLE_SNAP_THRESHOLD {
            trace!(from = self.scroll_offset, to = nearest, "settle snap");
            self.scroll_offset = nearest;
        }
        self.force_refresh();
        self.did_scroll();
        self.notify(|delegate, status| delegate.did_end_decelerating(status));
    }

    // --- Taps ---

    /// Whether a touch on `touched` may become an item selection.
    ///
    /// The touch must land inside a visible item view, the delegate must allow
    /// selecting that item, and neither `touched` nor any of its ancestors may
    /// handle touches itself.
    pub fn should_receive_tap(&mut self, touched: &S::View) -> bool {
        let Some(index) = self.index_of_view_or_ancestor(touched) else {
            return false;
        };
        let status = self.status();
        if !self.delegate.should_select(index, &status) {
            return false;
        }
        !self.view_or_ancestor_handles_touches(touched)
    }

    /// A pointer went down on `touched` at `position` (surface content
    /// coordinates, milliseconds). Returns `true` if the press may become a tap.
    pub fn pointer_down(&mut self, touched: &S::View, position: Point, timestamp: u64) -> bool {
        if !self.should_receive_tap(touched) {
            self.tap.cancel();
            return false;
        }
        self.tap.on_down(touched.clone(), position, timestamp);
        true
    }

    /// The pointer moved. Returns `true` when the press just turned into a drag.
    pub fn pointer_move(&mut self, position: Point) -> bool {
        self.tap.on_move(position).is_some()
    }

    /// The pointer went up. Returns the selected index if the press was a tap
    /// on an item.
    pub fn pointer_up(&mut self, position: Point, timestamp: u64) -> Option<usize> {
        match self.tap.on_up(position, timestamp) {
            TapResult::Tap(_) => self.tap_at(position),
            TapResult::Suppressed(_) => None,
        }
    }

    /// The pointer interaction was cancelled by the host.
    pub fn pointer_cancel(&mut self) {
        self.tap.cancel();
    }

    /// Selects the item under `point` (surface content coordinates).
    ///
    /// Returns the index passed to
    /// [`CarouselDelegate::did_select`], or `None` if the point is outside the
    /// items.
    pub fn tap_at(&mut self, point: Point) -> Option<usize> {
        let extent = self.item_extent();
        if extent <= 0.0 || self.item_count == 0 {
            return None;
        }
        let mut raw = floor_to_isize(self.config.orientation.main_of(point) / extent);
        if self.config.wrap_enabled {
            raw = isize::try_from(self.space().clamped_index(raw)).unwrap_or(isize::MAX);
        }
        let index = usize::try_from(raw)
            .ok()
            .filter(|&index| index < self.item_count)?;
        debug!(index, "item selected");
        self.notify(|delegate, status| delegate.did_select(index, status));
        Some(index)
    }

    // --- Internals ---

    fn space(&self) -> IndexSpace {
        IndexSpace::new(self.item_count, self.config.wrap_enabled)
    }

    fn item_extent(&self) -> f64 {
        self.config.orientation.main(self.item_size)
    }

    fn axis(&self) -> AxisGeometry {
        let o = self.config.orientation;
        AxisGeometry {
            item_extent: self.item_extent(),
            viewport_length: o.main(self.bounds),
            origin_offset: o.main_of(self.surface.frame().origin()),
        }
    }

    fn notify(&mut self, event: impl FnOnce(&mut dyn CarouselDelegate, &CarouselStatus)) {
        let status = self.status();
        event(self.delegate.as_mut(), &status);
    }

    fn apply_behavior(&mut self) {
        let behavior = self.surface_behavior();
        self.surface.apply_behavior(&behavior);
    }

    /// Makes the next scroll pass refresh the current index even when deferred
    /// loading would skip it.
    fn force_refresh(&mut self) {
        self.last_update_offset = self.scroll_offset - 1.0;
    }

    fn start_ticking(&mut self) {
        if !self.ticking {
            self.ticking = true;
            self.driver.resume_at(self.scheduler.now());
            self.scheduler.start(TICK_INTERVAL);
            debug!("tick started");
        }
    }

    fn stop_ticking(&mut self) {
        if self.ticking {
            self.ticking = false;
            self.scheduler.stop();
            debug!("tick stopped");
        }
    }

    /// Writes the content offset without treating it as user movement.
    fn set_content_offset_silently(&mut self, offset: Point) {
        if self.surface.content_offset() == offset {
            return;
        }
        self.surface.set_content_offset(offset);
        self.previous_content_offset = offset;
    }

    fn update_item_size_and_count(&mut self) {
        self.item_count = self.source.as_ref().map_or(0, |source| source.item_count());

        let status = self.status();
        let preferred = self
            .delegate
            .item_size(&status)
            .filter(|size| *size != Size::ZERO);
        if let Some(size) = preferred {
            self.item_size = size;
        } else if self.item_count > 0
            && self.items.visible().is_empty()
            && let Some(size) = self.measure_first_item()
        {
            self.item_size = size;
        }

        if self.item_size.width < MIN_ITEM_DIMENSION {
            self.item_size.width = 1.0;
        }
        if self.item_size.height < MIN_ITEM_DIMENSION {
            self.item_size.height = 1.0;
        }
    }

    /// Loads item 0 to learn its natural size, then parks it in the pool.
    fn measure_first_item(&mut self) -> Option<Size> {
        let source = self.source.as_mut()?;
        let view = source.view_for_item(0, self.items.dequeue());
        let size = self.surface.measured_size(&view);
        self.items.enqueue(view);
        Some(size)
    }

    fn update_surface_dimensions(&mut self) {
        let layout = surface_layout(&LayoutParams {
            bounds: self.bounds,
            insets: self.surface.content_insets(),
            item_size: self.item_size,
            item_count: self.item_count,
            items_per_page: self.items_per_page(),
            orientation: self.config.orientation,
            alignment: self.config.alignment,
            wrap: self.config.wrap_enabled,
            paging: self.config.paging_enabled,
            truncate_final_page: self.config.truncate_final_page,
        });
        if self.surface.frame() != layout.frame {
            self.surface.set_frame(layout.frame);
        }
        if self.surface.content_size() != layout.content_size {
            self.surface.set_content_size(layout.content_size);
        }
    }

    /// Keeps the surface inside the middle third of the wrap buffer and on axis.
    fn update_scroll_offset(&mut self) {
        let o = self.config.orientation;
        if self.config.wrap_enabled {
            let segments = if self.item_count == 1 { 1.0 } else { 3.0 };
            let segment = o.main(self.surface.content_size()) / segments;
            let position = o.main_of(self.surface.content_offset());
            let shift = if segment <= 0.0 {
                0.0
            } else if position < segment {
                segment
            } else if position >= segment * 2.0 {
                -segment
            } else {
                0.0
            };
            if shift != 0.0 {
                trace!(position, shift, "recentering wrap buffer");
                self.set_content_offset_silently(o.point(position + shift, 0.0));
            }
            self.scroll_offset = self.space().clamped_offset(self.scroll_offset);
        }
        let offset = self.surface.content_offset();
        if o.cross_of(offset).abs() > OFFSET_EPSILON {
            self.set_content_offset_silently(o.point(o.main_of(offset), 0.0));
        }
    }

    fn update_layout(&mut self) {
        self.update_scroll_offset();
        self.load_unload_views();
        self.lay_out_item_views();
    }

    fn frame_for(&self, index: usize) -> Rect {
        let o = self.config.orientation;
        let offset = offset_for_item(
            index,
            self.scroll_offset,
            &self.space(),
            self.config.alignment,
            &self.axis(),
        );
        item_frame(
            offset,
            o,
            self.item_size,
            o.main_of(self.surface.content_offset()),
            self.surface.frame().size(),
        )
    }

    fn place_view(&mut self, view: &S::View, index: usize) {
        let frame = self.frame_for(index);
        self.surface.place(view, frame);
    }

    fn lay_out_item_views(&mut self) {
        for (index, view) in self.items.visible().entries() {
            self.place_view(&view, index);
        }
    }

    fn load_unload_views(&mut self) {
        let axis = self.axis();
        let window = visible_window(
            &WindowParams {
                scroll_offset: self.scroll_offset,
                item_extent: axis.item_extent,
                viewport_length: axis.viewport_length,
                origin_offset: axis.origin_offset,
                deferred_anchor: self
                    .config
                    .defers_item_view_loading
                    .then_some(self.current_index),
            },
            &self.space(),
        );

        let Some(source) = self.source.as_mut() else {
            for view in self.items.reset() {
                self.surface.detach(&view);
            }
            return;
        };
        let surface = &mut self.surface;
        let reconciled = self.items.reconcile(
            &window,
            |view| surface.detach(view),
            |index, reusable| source.view_for_item(index, reusable),
        );

        for &index in &reconciled.loaded {
            if let Some(view) = self.items.visible().get(index).cloned() {
                self.surface.attach(&view);
                self.place_view(&view, index);
            }
        }
        if !reconciled.loaded.is_empty() || !reconciled.recycled.is_empty() {
            trace!(
                loaded = reconciled.loaded.len(),
                recycled = reconciled.recycled.len(),
                pooled = self.items.pool().len(),
                "reconciled item views"
            );
        }
    }

    fn did_scroll(&mut self) {
        self.update_scroll_offset();
        self.lay_out_item_views();
        self.notify(|delegate, status| delegate.did_scroll(status));

        let space = self.space();
        let moved = space
            .min_offset_distance(self.last_update_offset, self.scroll_offset)
            .abs();
        if !self.config.defers_item_view_loading || moved >= 1.0 {
            self.current_index = space.nearest_index(self.scroll_offset);
            self.last_update_offset = self.current_index as f64;
            self.load_unload_views();
            if self.previous_index != self.current_index {
                self.previous_index = self.current_index;
                self.notify(|delegate, status| delegate.current_index_did_change(status));
            }
        }
    }

    fn view_or_ancestor_handles_touches(&self, view: &S::View) -> bool {
        let mut current = view.clone();
        loop {
            if self.surface.handles_touches(&current) {
                return true;
            }
            match self.surface.parent_of(&current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

impl<S: ScrollSurface> Drop for Carousel<S> {
    fn drop(&mut self) {
        self.stop_ticking();
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use kurbo::{Point, Rect, Size};

    use super::Carousel;
    use crate::{
        CarouselConfig, CarouselDelegate, CarouselStatus, FrameScheduler, ItemSource, Orientation,
        ScrollSurface, SurfaceBehavior, SurfaceFlags,
    };

    const ITEM: Size = Size::new(100.0, 100.0);

    #[derive(Debug, Default)]
    struct FakeSurface {
        frame: Rect,
        content_size: Size,
        content_offset: Point,
        dragging: bool,
        behavior: Option<SurfaceBehavior>,
        attached: Vec<u32>,
        detached: Vec<u32>,
        placed: BTreeMap<u32, Rect>,
        parents: BTreeMap<u32, u32>,
        touch_handlers: Vec<u32>,
    }

    impl ScrollSurface for FakeSurface {
        type View = u32;

        fn frame(&self) -> Rect {
            self.frame
        }

        fn set_frame(&mut self, frame: Rect) {
            self.frame = frame;
        }

        fn content_size(&self) -> Size {
            self.content_size
        }

        fn set_content_size(&mut self, size: Size) {
            self.content_size = size;
        }

        fn content_offset(&self) -> Point {
            self.content_offset
        }

        fn set_content_offset(&mut self, offset: Point) {
            self.content_offset = offset;
        }

        fn is_dragging(&self) -> bool {
            self.dragging
        }

        fn is_decelerating(&self) -> bool {
            false
        }

        fn apply_behavior(&mut self, behavior: &SurfaceBehavior) {
            self.behavior = Some(*behavior);
        }

        fn attach(&mut self, view: &u32) {
            self.attached.push(*view);
        }

        fn detach(&mut self, view: &u32) {
            self.attached.retain(|v| v != view);
            self.detached.push(*view);
        }

        fn place(&mut self, view: &u32, frame: Rect) {
            self.placed.insert(*view, frame);
        }

        fn measured_size(&self, _: &u32) -> Size {
            ITEM
        }

        fn parent_of(&self, view: &u32) -> Option<u32> {
            self.parents.get(view).copied()
        }

        fn handles_touches(&self, view: &u32) -> bool {
            self.touch_handlers.contains(view)
        }
    }

    #[derive(Debug, Default)]
    struct SourceLog {
        count: usize,
        requests: Vec<(usize, Option<u32>)>,
        next_id: u32,
    }

    struct Source(Rc<RefCell<SourceLog>>);

    impl ItemSource<u32> for Source {
        fn item_count(&self) -> usize {
            self.0.borrow().count
        }

        fn view_for_item(&mut self, index: usize, reusable: Option<u32>) -> u32 {
            let mut log = self.0.borrow_mut();
            log.requests.push((index, reusable));
            reusable.unwrap_or_else(|| {
                log.next_id += 1;
                log.next_id
            })
        }
    }

    #[derive(Clone, Default)]
    struct Clock {
        now: Rc<Cell<f64>>,
        running: Rc<Cell<bool>>,
        starts: Rc<Cell<usize>>,
    }

    impl FrameScheduler for Clock {
        fn now(&self) -> f64 {
            self.now.get()
        }

        fn start(&mut self, interval: f64) {
            assert!(interval > 0.0, "tick interval must be positive");
            self.running.set(true);
            self.starts.set(self.starts.get() + 1);
        }

        fn stop(&mut self) {
            self.running.set(false);
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Event {
        DidScroll,
        IndexChanged(usize),
        WillBeginDragging,
        DidEndDragging(bool),
        WillBeginDecelerating,
        DidEndDecelerating,
        AnimationEnded(usize),
        Selected(usize),
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<Event>>>,
        declined: Rc<Cell<Option<usize>>>,
    }

    impl Recorder {
        fn push(&self, event: Event) {
            self.events.borrow_mut().push(event);
        }

        /// Recorded events other than the (very chatty) scroll notifications.
        fn take(&self) -> Vec<Event> {
            let events = core::mem::take(&mut *self.events.borrow_mut());
            events
                .into_iter()
                .filter(|event| *event != Event::DidScroll)
                .collect()
        }
    }

    impl CarouselDelegate for Recorder {
        fn did_scroll(&mut self, _: &CarouselStatus) {
            self.push(Event::DidScroll);
        }

        fn current_index_did_change(&mut self, status: &CarouselStatus) {
            self.push(Event::IndexChanged(status.current_index));
        }

        fn will_begin_dragging(&mut self, _: &CarouselStatus) {
            self.push(Event::WillBeginDragging);
        }

        fn did_end_dragging(&mut self, _: &CarouselStatus, will_decelerate: bool) {
            self.push(Event::DidEndDragging(will_decelerate));
        }

        fn will_begin_decelerating(&mut self, _: &CarouselStatus) {
            self.push(Event::WillBeginDecelerating);
        }

        fn did_end_decelerating(&mut self, _: &CarouselStatus) {
            self.push(Event::DidEndDecelerating);
        }

        fn did_end_scrolling_animation(&mut self, status: &CarouselStatus) {
            self.push(Event::AnimationEnded(status.current_index));
        }

        fn should_select(&mut self, index: usize, _: &CarouselStatus) -> bool {
            self.declined.get() != Some(index)
        }

        fn did_select(&mut self, index: usize, _: &CarouselStatus) {
            self.push(Event::Selected(index));
        }
    }

    struct Harness {
        source: Rc<RefCell<SourceLog>>,
        clock: Clock,
        delegate: Recorder,
    }

    /// A 300×100 carousel over `count` measured 100×100 items, laid out once.
    fn setup(count: usize, config: CarouselConfig) -> (Carousel<FakeSurface>, Harness) {
        let clock = Clock::default();
        let mut carousel = Carousel::with_config(FakeSurface::default(), clock.clone(), config);
        let delegate = Recorder::default();
        carousel.set_delegate(delegate.clone());
        let source = Rc::new(RefCell::new(SourceLog {
            count,
            ..SourceLog::default()
        }));
        carousel.set_item_source(Source(source.clone()));
        carousel.set_bounds(Size::new(300.0, 100.0));
        carousel.layout();
        delegate.take();
        (
            carousel,
            Harness {
                source,
                clock,
                delegate,
            },
        )
    }

    fn wrapping() -> CarouselConfig {
        CarouselConfig {
            wrap_enabled: true,
            ..CarouselConfig::default()
        }
    }

    #[test]
    fn initial_layout_centers_the_page_and_places_items() {
        let (carousel, _) = setup(5, CarouselConfig::default());
        let surface = carousel.surface();
        assert_eq!(surface.frame, Rect::new(100.0, 0.0, 200.0, 100.0));
        assert_eq!(surface.content_size, Size::new(500.0, 100.0));
        assert_eq!(carousel.item_size(), ITEM);
        assert_eq!(carousel.visible_indices(), vec![0, 1, 2]);

        let first = *carousel.view_at(0).unwrap();
        let third = *carousel.view_at(2).unwrap();
        assert_eq!(surface.placed[&first], Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(surface.placed[&third], Rect::new(200.0, 0.0, 300.0, 100.0));
        assert!(!carousel.is_scrolling(), "already on a whole item");
    }

    #[test]
    fn measured_item_view_is_reused() {
        let (carousel, h) = setup(3, CarouselConfig::default());
        let log = h.source.borrow();
        assert_eq!(log.requests[0], (0, None));
        // The view loaded for measuring went back to the pool and now shows item 0.
        assert_eq!(carousel.view_at(0), Some(&1));
        let mut attached = carousel.surface().attached.clone();
        attached.sort_unstable();
        assert_eq!(attached, vec![1, 2, 3]);
    }

    #[test]
    fn immediate_scroll_to_last_index() {
        let (mut carousel, h) = setup(5, CarouselConfig::default());
        carousel.scroll_to_index(4, 0.0);

        assert_eq!(carousel.current_index(), 4);
        assert_eq!(carousel.scroll_offset(), 4.0);
        assert_eq!(carousel.visible_indices(), vec![3, 4]);
        assert_eq!(carousel.surface().content_offset, Point::new(400.0, 0.0));
        assert_eq!(h.delegate.take(), vec![Event::IndexChanged(4)]);

        // Items 0..=2 were detached once each and two of them were reused.
        assert_eq!(carousel.surface().detached, vec![1, 2, 3]);
        let log = h.source.borrow();
        let tail = &log.requests[log.requests.len() - 2..];
        assert_eq!(tail, &[(3, Some(3)), (4, Some(2))]);

        let view = *carousel.view_at(4).unwrap();
        assert_eq!(
            carousel.surface().placed[&view],
            Rect::new(400.0, 0.0, 500.0, 100.0)
        );
    }

    #[test]
    fn wrapped_animation_takes_the_short_way() {
        let (mut carousel, h) = setup(5, wrapping());
        assert_eq!(carousel.surface().content_size, Size::new(1500.0, 100.0));
        // The wrap buffer starts out recentered on its middle copy.
        assert_eq!(carousel.surface().content_offset, Point::new(500.0, 0.0));
        assert_eq!(carousel.visible_indices(), vec![0, 1, 4]);

        h.clock.now.set(10.0);
        carousel.scroll_to_index(4, 1.0);
        let animation = *carousel.scroll_animation().unwrap();
        assert_eq!(animation.end_offset - animation.start_offset, -1.0);
        assert!(carousel.is_ticking());
        assert!(h.clock.running.get());

        h.clock.now.set(10.5);
        carousel.tick();
        assert_eq!(carousel.scroll_offset(), 4.5);
        assert_eq!(carousel.surface().content_offset, Point::new(950.0, 0.0));
        // The host echoing the carousel's own write is not a user scroll.
        carousel.surface_did_scroll();
        assert!(carousel.is_scrolling());

        h.clock.now.set(11.0);
        carousel.tick();
        assert!(!carousel.is_scrolling());
        assert_eq!(carousel.current_index(), 4);
        assert_eq!(carousel.scroll_offset(), 4.0);
        assert_eq!(carousel.surface().content_offset, Point::new(900.0, 0.0));
        assert_eq!(
            h.delegate.take(),
            vec![Event::IndexChanged(4), Event::AnimationEnded(4)]
        );

        h.clock.now.set(11.1);
        carousel.tick();
        assert!(!carousel.is_ticking());
        assert!(!h.clock.running.get());
    }

    #[test]
    fn truncated_final_page() {
        let config = CarouselConfig {
            items_per_page: 3,
            truncate_final_page: true,
            ..CarouselConfig::default()
        };
        let (mut carousel, _) = setup(7, config);
        assert_eq!(carousel.page_count(), 3);

        carousel.set_current_index(6);
        assert_eq!(carousel.current_index(), 6);
        assert_eq!(carousel.current_page(), carousel.page_count() - 1);

        // The last page starts early enough to stay full.
        carousel.scroll_to_page(2, 0.0);
        assert_eq!(carousel.current_index(), 4);
        assert_eq!(carousel.current_page(), 2);

        carousel.set_current_page(0);
        assert_eq!(carousel.current_index(), 0);
        assert_eq!(carousel.current_page(), 0);

        carousel.set_truncate_final_page(false);
        carousel.set_current_index(5);
        assert_eq!(carousel.current_page(), 2);
        carousel.set_current_index(4);
        assert_eq!(carousel.current_page(), 1);
    }

    #[test]
    fn deceleration_end_snaps_only_when_close() {
        let (mut carousel, h) = setup(5, CarouselConfig::default());
        carousel.set_scroll_offset(2.995);
        carousel.surface_did_end_decelerating();
        assert_eq!(carousel.scroll_offset(), 3.0);

        carousel.set_scroll_offset(2.9);
        carousel.surface_did_end_decelerating();
        assert_eq!(carousel.scroll_offset(), 2.9);

        let events = h.delegate.take();
        assert_eq!(
            events
                .iter()
                .filter(|event| **event == Event::DidEndDecelerating)
                .count(),
            2
        );
    }

    #[test]
    fn reload_is_idempotent() {
        let (mut carousel, _) = setup(10, CarouselConfig::default());
        carousel.set_current_index(3);

        carousel.reload();
        assert!(carousel.visible_indices().is_empty());
        assert!(carousel.surface().attached.is_empty());
        carousel.layout();
        let first = carousel.visible_indices();

        carousel.reload();
        carousel.layout();
        let second = carousel.visible_indices();

        assert_eq!(first, vec![2, 3, 4]);
        assert_eq!(first, second);
        assert_eq!(carousel.surface().attached.len(), 3);
        assert_eq!(carousel.current_index(), 3);
    }

    #[test]
    fn user_drag_moves_offset_and_cancels_animation() {
        let (mut carousel, h) = setup(5, CarouselConfig::default());
        carousel.scroll_to_index(3, 1.0);
        assert!(carousel.is_scrolling());

        carousel.surface_will_begin_dragging();
        carousel.surface_mut().dragging = true;
        carousel.surface_mut().content_offset = Point::new(150.0, 0.0);
        carousel.surface_did_scroll();
        assert!(!carousel.is_scrolling());
        assert_eq!(carousel.scroll_offset(), 1.5);
        assert_eq!(carousel.current_index(), 2);
        assert!(carousel.is_dragging());

        carousel.surface_did_end_dragging(true);
        carousel.surface_will_begin_decelerating();
        assert_eq!(
            h.delegate.take(),
            vec![
                Event::WillBeginDragging,
                Event::IndexChanged(2),
                Event::DidEndDragging(true),
                Event::WillBeginDecelerating,
            ]
        );
    }

    #[test]
    fn deferred_loading_debounces_index_updates() {
        let config = CarouselConfig {
            defers_item_view_loading: true,
            ..CarouselConfig::default()
        };
        let (mut carousel, h) = setup(10, config);
        assert_eq!(carousel.visible_indices(), vec![0, 1, 2, 3]);

        carousel.surface_mut().content_offset = Point::new(60.0, 0.0);
        carousel.surface_did_scroll();
        assert_eq!(carousel.current_index(), 0, "moved less than one item");

        carousel.surface_mut().content_offset = Point::new(120.0, 0.0);
        carousel.surface_did_scroll();
        assert_eq!(carousel.current_index(), 1);
        assert_eq!(carousel.visible_indices(), vec![0, 1, 2, 3, 4]);
        assert_eq!(h.delegate.take(), vec![Event::IndexChanged(1)]);
    }

    #[test]
    fn taps_select_items() {
        let (mut carousel, h) = setup(5, CarouselConfig::default());
        let view = *carousel.view_at(1).unwrap();

        assert!(carousel.pointer_down(&view, Point::new(150.0, 50.0), 0));
        assert_eq!(carousel.pointer_up(Point::new(153.0, 52.0), 40), Some(1));
        assert_eq!(h.delegate.take(), vec![Event::Selected(1)]);

        // Touches inside an item's subtree resolve through its ancestors.
        carousel.surface_mut().parents.insert(900, view);
        assert!(carousel.should_receive_tap(&900));
        carousel.surface_mut().touch_handlers.push(900);
        assert!(!carousel.pointer_down(&900, Point::new(150.0, 50.0), 0));
        assert!(!carousel.should_receive_tap(&777), "not an item view");

        let declined = *carousel.view_at(2).unwrap();
        h.delegate.declined.set(Some(2));
        assert!(!carousel.should_receive_tap(&declined));

        // A press that turns into a drag never selects.
        assert!(carousel.pointer_down(&view, Point::new(150.0, 50.0), 0));
        assert!(carousel.pointer_move(Point::new(190.0, 50.0)));
        assert_eq!(carousel.pointer_up(Point::new(190.0, 50.0), 60), None);

        assert_eq!(carousel.tap_at(Point::new(-50.0, 0.0)), None);
        assert_eq!(carousel.tap_at(Point::new(720.0, 0.0)), None);
        assert!(h.delegate.take().is_empty());
    }

    #[test]
    fn wrapped_taps_reduce_modulo_count() {
        let (mut carousel, _) = setup(5, wrapping());
        assert_eq!(carousel.tap_at(Point::new(720.0, 0.0)), Some(2));
        assert_eq!(carousel.tap_at(Point::new(-50.0, 0.0)), Some(4));
    }

    #[test]
    fn autoscroll_advances_unless_dragging() {
        let (mut carousel, h) = setup(5, CarouselConfig::default());
        carousel.set_autoscroll(2.0);
        assert!(carousel.is_ticking());

        h.clock.now.set(0.5);
        carousel.tick();
        assert_eq!(carousel.scroll_offset(), 1.0);
        assert_eq!(carousel.current_index(), 1);

        carousel.surface_mut().dragging = true;
        h.clock.now.set(1.0);
        carousel.tick();
        assert_eq!(carousel.scroll_offset(), 1.0);

        carousel.surface_mut().dragging = false;
        h.clock.now.set(1.25);
        carousel.tick();
        assert_eq!(carousel.scroll_offset(), 1.5);

        carousel.set_autoscroll(0.0);
        carousel.tick();
        assert!(!carousel.is_ticking());
        assert!(!h.clock.running.get());
    }

    #[test]
    fn slow_autoscroll_accumulates() {
        let config = CarouselConfig {
            paging_enabled: false,
            ..CarouselConfig::default()
        };
        let (mut carousel, h) = setup(5, config);
        carousel.set_autoscroll(0.005);
        for frame in 1..=600 {
            h.clock.now.set(f64::from(frame) / 60.0);
            carousel.tick();
        }
        // Each step is far below the jump threshold of `set_scroll_offset`.
        assert!((carousel.scroll_offset() - 0.05).abs() < 1e-9);
        assert_eq!(carousel.current_index(), 0);
        assert!(carousel.is_ticking());
    }

    #[test]
    fn wrapped_drag_recenters_the_buffer() {
        let (mut carousel, _) = setup(5, wrapping());
        assert_eq!(carousel.surface().content_offset, Point::new(500.0, 0.0));

        // Past the middle copy, and slightly off axis.
        carousel.surface_mut().dragging = true;
        carousel.surface_mut().content_offset = Point::new(1020.0, 7.0);
        carousel.surface_did_scroll();
        assert_eq!(carousel.surface().content_offset, Point::new(520.0, 0.0));
        assert!((carousel.scroll_offset() - 0.2).abs() < 1e-9);
        assert_eq!(carousel.current_index(), 0);

        // Back before the middle copy.
        carousel.surface_mut().content_offset = Point::new(430.0, -3.0);
        carousel.surface_did_scroll();
        assert_eq!(carousel.surface().content_offset, Point::new(930.0, 0.0));
        assert!((carousel.scroll_offset() - 4.3).abs() < 1e-9);
        assert_eq!(carousel.current_index(), 4);

        // The recentering write is not reported back as movement.
        carousel.surface_did_scroll();
        assert!((carousel.scroll_offset() - 4.3).abs() < 1e-9);
    }

    #[test]
    fn drag_off_axis_is_pulled_back() {
        let (mut carousel, _) = setup(5, CarouselConfig::default());
        carousel.surface_mut().content_offset = Point::new(150.0, 9.0);
        carousel.surface_did_scroll();
        assert_eq!(carousel.surface().content_offset, Point::new(150.0, 0.0));
        assert_eq!(carousel.scroll_offset(), 1.5);
    }

    #[test]
    fn layout_resnaps_when_paging() {
        let (mut carousel, _) = setup(5, CarouselConfig::default());
        carousel.surface_mut().content_offset = Point::new(140.0, 0.0);
        carousel.surface_did_scroll();
        assert_eq!(carousel.current_index(), 1);

        carousel.layout();
        let animation = *carousel.scroll_animation().unwrap();
        assert!((animation.end_offset - 1.0).abs() < 1e-9);
        assert_eq!(animation.duration, 0.25);

        carousel.set_scroll_offset(2.4);
        carousel.set_paging_enabled(false);
        assert!(carousel.needs_layout());
        carousel.layout_if_needed();
        assert!(!carousel.is_scrolling());
        assert!(!carousel.needs_layout());
    }

    #[test]
    fn settings_reach_the_surface() {
        let (mut carousel, _) = setup(5, CarouselConfig::default());
        let behavior = carousel.surface().behavior.unwrap();
        assert_eq!(
            behavior.flags,
            SurfaceFlags::PAGING
                | SurfaceFlags::BOUNCES
                | SurfaceFlags::ALWAYS_BOUNCE_HORIZONTAL
                | SurfaceFlags::SCROLL_ENABLED
                | SurfaceFlags::DELAYS_CONTENT_TOUCHES
        );
        assert_eq!(behavior.deceleration_rate, 0.998);

        carousel.set_wrap_enabled(true);
        let flags = carousel.surface().behavior.unwrap().flags;
        assert!(!flags.contains(SurfaceFlags::BOUNCES), "wrap never bounces");

        carousel.set_orientation(Orientation::Vertical);
        let flags = carousel.surface().behavior.unwrap().flags;
        assert!(flags.contains(SurfaceFlags::ALWAYS_BOUNCE_VERTICAL));
        assert!(!flags.contains(SurfaceFlags::ALWAYS_BOUNCE_HORIZONTAL));

        carousel.set_deceleration_rate(0.9985);
        assert_eq!(carousel.surface().behavior.unwrap().deceleration_rate, 0.998);
        carousel.set_deceleration_rate(0.99);
        assert_eq!(carousel.surface().behavior.unwrap().deceleration_rate, 0.99);

        carousel.set_scroll_enabled(false);
        let flags = carousel.surface().behavior.unwrap().flags;
        assert!(!flags.contains(SurfaceFlags::SCROLL_ENABLED));
    }

    #[test]
    fn wrap_toggle_keeps_logical_offset() {
        let (mut carousel, _) = setup(5, CarouselConfig::default());
        carousel.set_current_index(3);
        carousel.set_wrap_enabled(true);
        assert!(carousel.needs_layout());
        assert_eq!(carousel.scroll_offset(), 3.0);
        carousel.layout();
        assert_eq!(carousel.current_index(), 3);
        assert_eq!(carousel.surface().content_size, Size::new(1500.0, 100.0));
        assert_eq!(carousel.visible_indices(), vec![2, 3, 4]);
    }

    #[test]
    fn vertical_layout_uses_the_other_axis() {
        let config = CarouselConfig {
            orientation: Orientation::Vertical,
            ..CarouselConfig::default()
        };
        let (mut carousel, _) = setup(5, config);
        carousel.set_bounds(Size::new(100.0, 300.0));
        carousel.layout();
        let surface = carousel.surface();
        assert_eq!(surface.frame, Rect::new(0.0, 100.0, 100.0, 200.0));
        assert_eq!(surface.content_size, Size::new(100.0, 500.0));
        let second = *carousel.view_at(1).unwrap();
        assert_eq!(
            carousel.surface().placed[&second],
            Rect::new(0.0, 100.0, 100.0, 200.0)
        );
    }

    #[test]
    fn reload_item_swaps_the_visible_view() {
        let (mut carousel, h) = setup(5, CarouselConfig::default());
        let old = *carousel.view_at(1).unwrap();
        carousel.reload_item(1);
        let new = *carousel.view_at(1).unwrap();
        assert_ne!(old, new);
        assert_eq!(carousel.index_of_view(&old), None);
        assert_eq!(carousel.index_of_view(&new), Some(1));
        assert!(carousel.surface().detached.contains(&old));
        assert!(carousel.surface().attached.contains(&new));
        assert!(!carousel.surface().attached.contains(&old));

        let requests = h.source.borrow().requests.len();
        carousel.reload_item(4);
        assert_eq!(h.source.borrow().requests.len(), requests, "item 4 is not visible");
    }

    #[test]
    fn degenerate_item_size_is_replaced() {
        struct FixedSize(Size);
        impl CarouselDelegate for FixedSize {
            fn item_size(&mut self, _: &CarouselStatus) -> Option<Size> {
                Some(self.0)
            }
        }

        let (mut carousel, _) = setup(5, CarouselConfig::default());
        carousel.set_delegate(FixedSize(Size::new(0.000_01, 50.0)));
        carousel.layout();
        assert_eq!(carousel.item_size(), Size::new(1.0, 50.0));
    }

    #[test]
    fn empty_source_clamps_everything() {
        let (mut carousel, _) = setup(0, CarouselConfig::default());
        assert!(carousel.visible_indices().is_empty());
        assert_eq!(carousel.item_size(), Size::new(1.0, 1.0));
        carousel.scroll_to_index(3, 0.0);
        assert_eq!(carousel.scroll_offset(), 0.0);
        assert_eq!(carousel.current_index(), 0);
        assert_eq!(carousel.page_count(), 0);
        assert_eq!(carousel.current_page(), 0);
        assert_eq!(carousel.tap_at(Point::new(10.0, 0.0)), None);
    }

    #[test]
    fn display_attachment_controls_ticking() {
        let (mut carousel, h) = setup(5, CarouselConfig::default());
        carousel.scroll_to_index(3, 1.0);
        assert!(h.clock.running.get());

        carousel.did_move_to_display(false);
        assert!(!carousel.is_ticking());
        assert!(!h.clock.running.get());

        carousel.did_move_to_display(true);
        assert!(carousel.is_ticking());
        assert!(carousel.needs_layout());
        assert_eq!(h.clock.starts.get(), 2);

        drop(carousel);
        assert!(!h.clock.running.get(), "dropping stops the tick");
    }
}
