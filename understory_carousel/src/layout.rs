// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface extent and per-item frame computation.
//!
//! Everything here is pure: callers pass the current geometry in and apply the
//! returned frames to their own views.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Insets, Point, Rect, Size};

use crate::IndexSpace;

/// Scroll axis of a carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Items are laid out left to right.
    #[default]
    Horizontal,
    /// Items are laid out top to bottom.
    Vertical,
}

impl Orientation {
    /// Returns `true` for [`Orientation::Vertical`].
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical)
    }

    /// Length of `size` along the scroll axis.
    #[must_use]
    pub const fn main(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Length of `size` across the scroll axis.
    #[must_use]
    pub const fn cross(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    /// Coordinate of `point` along the scroll axis.
    #[must_use]
    pub const fn main_of(self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Coordinate of `point` across the scroll axis.
    #[must_use]
    pub const fn cross_of(self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.y,
            Self::Vertical => point.x,
        }
    }

    /// Builds a point from scroll-axis and cross-axis coordinates.
    #[must_use]
    pub const fn point(self, main: f64, cross: f64) -> Point {
        match self {
            Self::Horizontal => Point::new(main, cross),
            Self::Vertical => Point::new(cross, main),
        }
    }

    /// Builds a size from scroll-axis and cross-axis lengths.
    #[must_use]
    pub const fn size(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }
}

/// Where the paging viewport sits inside the carousel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    /// The viewport starts at the leading edge of the bounds.
    Edge,
    /// The viewport is centered along the scroll axis.
    #[default]
    Center,
}

/// Inputs to [`surface_layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Bounds of the carousel itself.
    pub bounds: Size,
    /// Content insets of the scroll surface.
    pub insets: Insets,
    /// Size of one item.
    pub item_size: Size,
    /// Number of items.
    pub item_count: usize,
    /// Items per page (at least 1).
    pub items_per_page: usize,
    /// Scroll axis.
    pub orientation: Orientation,
    /// Viewport placement.
    pub alignment: Alignment,
    /// Circular mode.
    pub wrap: bool,
    /// Page-by-page scrolling.
    pub paging: bool,
    /// Let the last page end at the last item instead of padding it out.
    pub truncate_final_page: bool,
}

/// Frame and content size for the scroll surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLayout {
    /// Frame of the surface within the carousel bounds.
    pub frame: Rect,
    /// Total scrollable content size.
    pub content_size: Size,
}

/// Computes the scroll surface frame and content size.
///
/// The surface is one page long (`item extent × items_per_page`) on the scroll
/// axis and spans the bounds on the cross axis. With [`Alignment::Center`] it
/// is centered in the bounds; with [`Alignment::Edge`] it starts at the origin
/// and the content is shortened so the last item can reach the trailing edge of
/// the bounds.
///
/// In wrap mode the content holds three copies of the strip (one for a single
/// item), which lets the scroll position be recentered silently. Otherwise,
/// with paging and no final-page truncation, the content is rounded up to a
/// whole number of pages.
#[must_use]
pub fn surface_layout(params: &LayoutParams) -> SurfaceLayout {
    let o = params.orientation;
    let bounds_main = o.main(params.bounds);
    let bounds_cross = o.cross(params.bounds);
    let item_main = o.main(params.item_size);
    let count = params.item_count as f64;
    let page = item_main * params.items_per_page.max(1) as f64;

    let cross_insets = match o {
        Orientation::Horizontal => params.insets.y0 + params.insets.y1,
        Orientation::Vertical => params.insets.x0 + params.insets.x1,
    };
    let content_cross = bounds_cross - cross_insets;

    let (frame_origin, mut content_main) = match params.alignment {
        Alignment::Center => ((bounds_main - page) / 2.0, item_main * count),
        Alignment::Edge => (0.0, item_main * count - (bounds_main - page)),
    };

    if params.wrap {
        let copies = if params.item_count == 1 {
            1.0
        } else {
            count * 3.0
        };
        content_main = item_main * copies;
    } else if params.paging && !params.truncate_final_page && page > 0.0 {
        content_main = (content_main / page).ceil() * page;
    }

    SurfaceLayout {
        frame: Rect::from_origin_size(o.point(frame_origin, 0.0), o.size(page, bounds_cross)),
        content_size: o.size(content_main, content_cross),
    }
}

/// Scroll-axis geometry shared by placement queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisGeometry {
    /// Length of one item.
    pub item_extent: f64,
    /// Length of the carousel bounds.
    pub viewport_length: f64,
    /// Position of the scroll surface's origin within the carousel bounds.
    pub origin_offset: f64,
}

/// Signed distance, in items, from the scroll position to item `index`.
///
/// In wrap mode the distance is rotated by a full turn when the item would
/// otherwise sit on the far side of the strip: centered carousels keep it
/// within half a turn, edge-aligned ones keep the item inside (or just before)
/// the visible bounds.
#[must_use]
pub fn offset_for_item(
    index: usize,
    scroll_offset: f64,
    space: &IndexSpace,
    alignment: Alignment,
    axis: &AxisGeometry,
) -> f64 {
    let mut offset = index as f64 - scroll_offset;
    if !space.wraps() {
        return offset;
    }
    let count = space.len() as f64;
    match alignment {
        Alignment::Center => {
            if offset > count / 2.0 {
                offset -= count;
            } else if offset < -count / 2.0 {
                offset += count;
            }
        }
        Alignment::Edge => {
            let leading = offset * axis.item_extent + axis.origin_offset;
            if leading > axis.viewport_length {
                offset -= count;
            } else if leading < -axis.item_extent {
                offset += count;
            }
        }
    }
    offset
}

/// Frame of an item inside the scroll surface's content.
///
/// `offset` comes from [`offset_for_item`]; `surface_position` is the surface's
/// current content position along the scroll axis. The item is centered on the
/// cross axis of the surface frame.
#[must_use]
pub fn item_frame(
    offset: f64,
    orientation: Orientation,
    item_size: Size,
    surface_position: f64,
    surface_size: Size,
) -> Rect {
    let main = (offset + 0.5) * orientation.main(item_size) + surface_position;
    let cross = orientation.cross(surface_size) / 2.0;
    Rect::from_center_size(orientation.point(main, cross), item_size)
}

#[cfg(test)]
mod tests {
    use kurbo::{Insets, Point, Rect, Size};

    use super::{
        Alignment, AxisGeometry, LayoutParams, Orientation, item_frame, offset_for_item,
        surface_layout,
    };
    use crate::IndexSpace;

    fn params() -> LayoutParams {
        LayoutParams {
            bounds: Size::new(300.0, 200.0),
            insets: Insets::ZERO,
            item_size: Size::new(100.0, 200.0),
            item_count: 5,
            items_per_page: 1,
            orientation: Orientation::Horizontal,
            alignment: Alignment::Center,
            wrap: false,
            paging: false,
            truncate_final_page: false,
        }
    }

    #[test]
    fn centered_surface_sits_mid_bounds() {
        let layout = surface_layout(&params());
        assert_eq!(layout.frame, Rect::new(100.0, 0.0, 200.0, 200.0));
        assert_eq!(layout.content_size, Size::new(500.0, 200.0));
    }

    #[test]
    fn edge_surface_shortens_content_to_reach_trailing_edge() {
        let mut p = params();
        p.alignment = Alignment::Edge;
        let layout = surface_layout(&p);
        assert_eq!(layout.frame, Rect::new(0.0, 0.0, 100.0, 200.0));
        assert_eq!(layout.content_size.width, 300.0);
    }

    #[test]
    fn wrap_triples_content() {
        let mut p = params();
        p.wrap = true;
        assert_eq!(surface_layout(&p).content_size.width, 1500.0);
        p.item_count = 1;
        assert_eq!(surface_layout(&p).content_size.width, 100.0);
    }

    #[test]
    fn paging_rounds_content_to_whole_pages() {
        let mut p = params();
        p.alignment = Alignment::Edge;
        p.bounds = Size::new(200.0, 200.0);
        p.items_per_page = 2;
        p.paging = true;
        assert_eq!(surface_layout(&p).content_size.width, 600.0);
        p.truncate_final_page = true;
        assert_eq!(surface_layout(&p).content_size.width, 500.0);
    }

    #[test]
    fn cross_axis_insets_shrink_content() {
        let mut p = params();
        p.insets = Insets::new(5.0, 10.0, 5.0, 20.0);
        assert_eq!(surface_layout(&p).content_size.height, 170.0);

        p.orientation = Orientation::Vertical;
        p.bounds = Size::new(200.0, 300.0);
        p.item_size = Size::new(200.0, 100.0);
        let layout = surface_layout(&p);
        assert_eq!(layout.frame, Rect::new(0.0, 100.0, 200.0, 200.0));
        assert_eq!(layout.content_size, Size::new(190.0, 500.0));
    }

    #[test]
    fn centered_wrap_offsets_stay_within_half_a_turn() {
        let space = IndexSpace::new(5, true);
        let axis = AxisGeometry {
            item_extent: 100.0,
            viewport_length: 300.0,
            origin_offset: 100.0,
        };
        assert_eq!(offset_for_item(4, 0.0, &space, Alignment::Center, &axis), -1.0);
        assert_eq!(offset_for_item(2, 0.0, &space, Alignment::Center, &axis), 2.0);
        assert_eq!(offset_for_item(0, 4.0, &space, Alignment::Center, &axis), 1.0);

        let no_wrap = IndexSpace::new(5, false);
        assert_eq!(offset_for_item(4, 0.0, &no_wrap, Alignment::Center, &axis), 4.0);
    }

    #[test]
    fn edge_wrap_offsets_follow_visible_bounds() {
        let space = IndexSpace::new(5, true);
        let axis = AxisGeometry {
            item_extent: 100.0,
            viewport_length: 300.0,
            origin_offset: 0.0,
        };
        assert_eq!(offset_for_item(4, 0.0, &space, Alignment::Edge, &axis), -1.0);
        assert_eq!(offset_for_item(3, 0.0, &space, Alignment::Edge, &axis), 3.0);
        assert_eq!(offset_for_item(0, 4.5, &space, Alignment::Edge, &axis), 0.5);
    }

    #[test]
    fn item_frames_follow_offset_and_surface_position() {
        let size = Size::new(100.0, 200.0);
        let surface = Size::new(100.0, 200.0);
        let frame = item_frame(1.0, Orientation::Horizontal, size, 250.0, surface);
        assert_eq!(frame.center(), Point::new(400.0, 100.0));
        assert_eq!(frame.size(), size);

        let size = Size::new(200.0, 100.0);
        let frame = item_frame(-1.0, Orientation::Vertical, size, 0.0, Size::new(200.0, 100.0));
        assert_eq!(frame, Rect::new(0.0, -100.0, 200.0, 0.0));
    }
}
