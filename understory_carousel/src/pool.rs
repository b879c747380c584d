// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible-window computation and view recycling.
//!
//! [`ItemViews`] pairs a [`VisibleViews`] association (logical index ⇄ view
//! handle) with a [`ViewPool`] of detached handles. [`visible_window`] computes
//! which indices should be realized for the current geometry, and
//! [`ItemViews::reconcile`] moves handles between the two so that the visible
//! set matches that window.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::IndexSpace;
use crate::index_space::{ceil_to_isize, floor_to_isize};

/// Inline capacity for visible-index windows.
///
/// A carousel usually shows a page plus one or two partially visible items.
pub type IndexWindow = SmallVec<[usize; 8]>;

/// A last-in-first-out stack of detached, reusable view handles.
///
/// Handles in the pool carry no index association; whoever pops one must
/// refresh all of its index-dependent content.
#[derive(Clone, Debug)]
pub struct ViewPool<V> {
    stack: Vec<V>,
}

impl<V> ViewPool<V> {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Returns a handle to the pool.
    pub fn push(&mut self, view: V) {
        self.stack.push(view);
    }

    /// Takes the most recently returned handle, if any.
    pub fn pop(&mut self) -> Option<V> {
        self.stack.pop()
    }

    /// Number of pooled handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` if no handles are pooled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drops every pooled handle.
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Iterates pooled handles from the bottom of the stack to the top.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.stack.iter()
    }
}

impl<V> Default for ViewPool<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Bidirectional association between logical indices and visible view handles.
///
/// Each index maps to at most one handle and each handle to at most one index,
/// so both directions are O(1) lookups.
#[derive(Clone, Debug)]
pub struct VisibleViews<V> {
    by_index: HashMap<usize, V>,
    by_view: HashMap<V, usize>,
}

impl<V: Clone + Eq + Hash> VisibleViews<V> {
    /// Creates an empty association.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_index: HashMap::new(),
            by_view: HashMap::new(),
        }
    }

    /// Associates `view` with `index`, returning the handle previously shown at
    /// `index`, if any.
    ///
    /// The same handle must not be visible at two indices at once.
    pub fn insert(&mut self, index: usize, view: V) -> Option<V> {
        debug_assert!(
            self.by_view.get(&view).is_none_or(|&i| i == index),
            "a view handle may only be visible at one index"
        );
        let previous = self.by_index.insert(index, view.clone());
        if let Some(old) = &previous {
            self.by_view.remove(old);
        }
        self.by_view.insert(view, index);
        previous
    }

    /// Removes and returns the handle at `index`.
    pub fn remove(&mut self, index: usize) -> Option<V> {
        let view = self.by_index.remove(&index)?;
        self.by_view.remove(&view);
        Some(view)
    }

    /// Handle shown at `index`, if it is visible.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&V> {
        self.by_index.get(&index)
    }

    /// Index currently shown by `view`, if it is visible.
    #[must_use]
    pub fn index_of(&self, view: &V) -> Option<usize> {
        self.by_view.get(view).copied()
    }

    /// Returns `true` if `index` has a visible handle.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.by_index.contains_key(&index)
    }

    /// Number of visible handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    /// Returns `true` if nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Visible indices in ascending order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.by_index.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Visible `(index, handle)` pairs in ascending index order.
    #[must_use]
    pub fn entries(&self) -> Vec<(usize, V)> {
        let mut entries: Vec<(usize, V)> = self
            .by_index
            .iter()
            .map(|(&i, v)| (i, v.clone()))
            .collect();
        entries.sort_unstable_by_key(|&(i, _)| i);
        entries
    }

    /// Removes every association, yielding the handles in ascending index order.
    pub fn drain(&mut self) -> Vec<V> {
        let entries = self.entries();
        self.by_index.clear();
        self.by_view.clear();
        entries.into_iter().map(|(_, v)| v).collect()
    }
}

impl<V: Clone + Eq + Hash> Default for VisibleViews<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry needed to decide which indices are visible.
///
/// All lengths are measured along the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowParams {
    /// Current scroll offset, in items.
    pub scroll_offset: f64,
    /// Length of one item.
    pub item_extent: f64,
    /// Length of the area in which items may be seen (the carousel bounds).
    pub viewport_length: f64,
    /// Position of the scroll surface's origin within the carousel bounds.
    pub origin_offset: f64,
    /// When set, compute the widened window used by deferred item loading,
    /// anchored on this current index.
    pub deferred_anchor: Option<usize>,
}

/// Computes the indices that should be realized for the given geometry.
///
/// Raw window positions are passed through [`IndexSpace::clamped_index`], so in
/// wrap mode the window continues past the last item to the first one, and
/// without wrap positions outside the strip collapse onto its ends. Repeated
/// indices are kept once, in first-seen order. The window never holds more
/// than `space.len()` entries and is empty for a non-positive item extent.
#[must_use]
pub fn visible_window(params: &WindowParams, space: &IndexSpace) -> IndexWindow {
    let mut window = IndexWindow::new();
    let extent = params.item_extent;
    if extent <= 0.0 || space.is_empty() {
        return window;
    }

    let (start, count) = match params.deferred_anchor {
        None => {
            let start_offset =
                space.clamped_offset(params.scroll_offset - params.origin_offset / extent);
            let start = floor_to_isize(start_offset);
            let fraction = start_offset - start as f64;
            (start, ceil_to_isize(params.viewport_length / extent + fraction))
        }
        Some(anchor) => {
            let anchor = isize::try_from(anchor).unwrap_or(isize::MAX);
            let start = anchor - ceil_to_isize(params.origin_offset / extent) - 1;
            (start, ceil_to_isize(params.viewport_length / extent) + 3)
        }
    };

    let count = usize::try_from(count).unwrap_or(0).min(space.len());
    for i in 0..count {
        let raw = start.saturating_add_unsigned(i);
        let index = space.clamped_index(raw);
        if !window.contains(&index) {
            window.push(index);
        }
    }
    window
}

/// What a [`ItemViews::reconcile`] pass changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Indices that left the window; their handles were moved to the pool.
    pub recycled: IndexWindow,
    /// Indices that entered the window and received a handle.
    pub loaded: IndexWindow,
}

/// The visible set and the recycling pool, managed together.
#[derive(Clone, Debug)]
pub struct ItemViews<V> {
    visible: VisibleViews<V>,
    pool: ViewPool<V>,
}

impl<V: Clone + Eq + Hash + Debug> ItemViews<V> {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: VisibleViews::new(),
            pool: ViewPool::new(),
        }
    }

    /// The visible association.
    #[must_use]
    pub fn visible(&self) -> &VisibleViews<V> {
        &self.visible
    }

    /// The recycling pool.
    #[must_use]
    pub fn pool(&self) -> &ViewPool<V> {
        &self.pool
    }

    /// Takes a handle from the pool for reuse.
    pub fn dequeue(&mut self) -> Option<V> {
        self.pool.pop()
    }

    /// Returns a handle that is not visible to the pool.
    pub fn enqueue(&mut self, view: V) {
        debug_assert!(
            self.visible.index_of(&view).is_none(),
            "only detached views may be pooled"
        );
        self.pool.push(view);
    }

    /// Synchronizes the visible set with `window`.
    ///
    /// For every visible index not in `window`, `detach` is called with its
    /// handle and the handle is moved to the pool. Then, for every index in
    /// `window` without a handle, `load` is called with the index and a pooled
    /// handle (if one is available) and the returned handle becomes visible.
    pub fn reconcile(
        &mut self,
        window: &[usize],
        mut detach: impl FnMut(&V),
        mut load: impl FnMut(usize, Option<V>) -> V,
    ) -> Reconciled {
        let mut result = Reconciled::default();

        for index in self.visible.indices() {
            if window.contains(&index) {
                continue;
            }
            if let Some(view) = self.visible.remove(index) {
                detach(&view);
                self.pool.push(view);
                result.recycled.push(index);
            }
        }

        for &index in window {
            if self.visible.contains(index) {
                continue;
            }
            let reusable = self.pool.pop();
            let view = load(index, reusable);
            self.visible.insert(index, view);
            result.loaded.push(index);
        }

        result
    }

    /// Replaces the handle at `index` with a freshly loaded one.
    ///
    /// `load` receives a pooled handle if one is available. The handle that was
    /// previously visible at `index`, if any, is passed to `detach` and pooled
    /// unless `load` handed the same handle back. Returns the new handle.
    pub fn replace(
        &mut self,
        index: usize,
        detach: impl FnOnce(&V),
        load: impl FnOnce(usize, Option<V>) -> V,
    ) -> V {
        let reusable = self.pool.pop();
        let view = load(index, reusable);
        if let Some(old) = self.visible.insert(index, view.clone())
            && old != view
        {
            detach(&old);
            self.pool.push(old);
        }
        view
    }

    /// Drops every association and pooled handle, returning the handles that
    /// were visible so the caller can detach them.
    pub fn reset(&mut self) -> Vec<V> {
        self.pool.clear();
        self.visible.drain()
    }
}

impl<V: Clone + Eq + Hash + Debug> Default for ItemViews<V> {
    fn default() -> Self {
        Self::new()
    }
}
