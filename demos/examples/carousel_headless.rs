// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless circular carousel of 100 labelled pages.
//!
//! This example drives `understory_carousel` without any UI toolkit:
//! - a `HashMap`-backed surface stands in for the host scroll container,
//! - a label source recycles views and rewrites their text and color,
//! - a manual clock plays the role of the display-link scheduler.
//!
//! Run:
//! - `cargo run -p understory_demos --example carousel_headless`
//! - `RUST_LOG=understory_carousel=trace cargo run -p understory_demos --example carousel_headless`

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use kurbo::{Point, Rect, Size};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use understory_carousel::{
    Carousel, CarouselConfig, CarouselDelegate, CarouselStatus, FrameScheduler, ItemSource,
    ScrollSurface, SurfaceBehavior,
};

const PAGE: Size = Size::new(320.0, 480.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ViewId(u32);

#[derive(Clone, Debug, Default)]
struct Label {
    text: String,
    hue: u16,
}

type Labels = Rc<RefCell<HashMap<ViewId, Label>>>;

/// Scroll container that only records what it is told.
#[derive(Debug, Default)]
struct HeadlessSurface {
    frame: Rect,
    content_size: Size,
    content_offset: Point,
    dragging: bool,
    attached: Vec<ViewId>,
    frames: HashMap<ViewId, Rect>,
}

impl ScrollSurface for HeadlessSurface {
    type View = ViewId;

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
        println!("surface behavior: {:?}", behavior.flags);
    }

    fn attach(&mut self, view: &ViewId) {
        self.attached.push(*view);
    }

    fn detach(&mut self, view: &ViewId) {
        self.attached.retain(|v| v != view);
        self.frames.remove(view);
    }

    fn place(&mut self, view: &ViewId, frame: Rect) {
        self.frames.insert(*view, frame);
    }

    fn measured_size(&self, _: &ViewId) -> Size {
        PAGE
    }

    fn parent_of(&self, _: &ViewId) -> Option<ViewId> {
        None
    }
}

/// Colored labels, one per item, reusing recycled views.
struct LabelSource {
    count: usize,
    next_id: u32,
    labels: Labels,
}

impl ItemSource<ViewId> for LabelSource {
    fn item_count(&self) -> usize {
        self.count
    }

    fn view_for_item(&mut self, index: usize, reusable: Option<ViewId>) -> ViewId {
        let view = reusable.unwrap_or_else(|| {
            self.next_id += 1;
            ViewId(self.next_id)
        });
        let hue = u16::try_from(index * 37 % 360).unwrap_or(0);
        self.labels.borrow_mut().insert(
            view,
            Label {
                text: format!("This is view #{index}."),
                hue,
            },
        );
        view
    }
}

/// Pages fill the carousel; index changes are printed.
struct PageDelegate;

impl CarouselDelegate for PageDelegate {
    fn item_size(&mut self, _: &CarouselStatus) -> Option<Size> {
        Some(PAGE)
    }

    fn current_index_did_change(&mut self, status: &CarouselStatus) {
        info!(
            index = status.current_index,
            page = status.current_page,
            pages = status.page_count,
            "current index changed"
        );
    }

    fn did_end_scrolling_animation(&mut self, status: &CarouselStatus) {
        println!("animation ended at offset {:.3}", status.scroll_offset);
    }

    fn did_select(&mut self, index: usize, _: &CarouselStatus) {
        info!(index, "item selected by tap");
    }
}

/// Clock advanced by hand, one frame at a time.
#[derive(Clone, Default)]
struct ManualClock {
    now: Rc<Cell<f64>>,
    running: Rc<Cell<bool>>,
}

impl FrameScheduler for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn start(&mut self, _interval: f64) {
        self.running.set(true);
    }

    fn stop(&mut self) {
        self.running.set(false);
    }
}

fn print_visible(carousel: &Carousel<HeadlessSurface>, labels: &Labels) {
    let labels = labels.borrow();
    for index in carousel.visible_indices() {
        let Some(view) = carousel.view_at(index) else {
            continue;
        };
        let label = labels.get(view).cloned().unwrap_or_default();
        let frame = carousel.surface().frames.get(view).copied().unwrap_or_default();
        println!(
            "  [{index:>2}] {:?} hue={:>3} x={:>7.1} {}",
            view, label.hue, frame.x0, label.text
        );
    }
}

fn run_frames(carousel: &mut Carousel<HeadlessSurface>, clock: &ManualClock) {
    let frame = 1.0 / 60.0;
    while clock.running.get() {
        clock.now.set(clock.now.get() + frame);
        carousel.tick();
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,understory_carousel=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let labels: Labels = Rc::default();
    let clock = ManualClock::default();
    let config = CarouselConfig {
        wrap_enabled: true,
        ..CarouselConfig::default()
    };
    let mut carousel = Carousel::with_config(HeadlessSurface::default(), clock.clone(), config);
    carousel.set_delegate(PageDelegate);
    carousel.set_item_source(LabelSource {
        count: 100,
        next_id: 0,
        labels: labels.clone(),
    });
    carousel.set_bounds(PAGE);
    carousel.layout_if_needed();

    info!("Initial layout");
    print_visible(&carousel, &labels);

    info!("Animate to the last item (one step backwards)");
    carousel.scroll_to_index(99, 0.4);
    run_frames(&mut carousel, &clock);
    print_visible(&carousel, &labels);

    info!("Jump forward ten items");
    carousel.scroll_by_items(10, 0.0);
    print_visible(&carousel, &labels);

    info!("Drag past half a page and let paging settle");
    carousel.surface_will_begin_dragging();
    carousel.surface_mut().dragging = true;
    let offset = carousel.surface().content_offset;
    carousel.surface_mut().content_offset = Point::new(offset.x + PAGE.width * 0.6, offset.y);
    carousel.surface_did_scroll();
    carousel.surface_mut().dragging = false;
    carousel.surface_did_end_dragging(false);
    carousel.set_needs_layout();
    carousel.layout_if_needed();
    run_frames(&mut carousel, &clock);
    print_visible(&carousel, &labels);

    info!("Tap the current page");
    if let Some(view) = carousel.current_view().copied() {
        let center = carousel
            .surface()
            .frames
            .get(&view)
            .map(Rect::center)
            .unwrap_or_default();
        if carousel.pointer_down(&view, center, 0) {
            carousel.pointer_up(center, 80);
        }
    }

    println!(
        "\n{} views attached, {} label entries",
        carousel.surface().attached.len(),
        labels.borrow().len()
    );
}
