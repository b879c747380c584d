// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clamped and wrapped offset/index arithmetic.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// The logical index space of a carousel: `len` items, optionally circular.
///
/// Offsets are continuous positions measured in items (`2.5` is halfway between
/// item 2 and item 3). Indices are discrete. With wrapping disabled both are
/// clamped into the valid range; with wrapping enabled both are reduced with a
/// floored modulo so negative inputs land in `0..len` as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexSpace {
    len: usize,
    wrap: bool,
}

impl IndexSpace {
    /// Creates an index space over `len` items.
    #[must_use]
    pub const fn new(len: usize, wrap: bool) -> Self {
        Self { len, wrap }
    }

    /// Number of items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if offsets and indices wrap around.
    #[must_use]
    pub const fn wraps(&self) -> bool {
        self.wrap
    }

    /// Maps an arbitrary index into the valid range.
    ///
    /// Without wrapping this is `clamp(0, len - 1)`; with wrapping it is the
    /// floored modulo by `len`. An empty space always yields `0`.
    #[must_use]
    pub fn clamped_index(&self, index: isize) -> usize {
        let len = self.signed_len();
        if self.wrap {
            if len == 0 {
                0
            } else {
                index.rem_euclid(len).unsigned_abs()
            }
        } else {
            index.clamp(0, (len - 1).max(0)).unsigned_abs()
        }
    }

    /// Maps an arbitrary offset into the valid range.
    ///
    /// Without wrapping the result lies in `[0, len - 1]` (or is `0` for fewer
    /// than two items); with wrapping it lies in `[0, len)`.
    #[must_use]
    pub fn clamped_offset(&self, offset: f64) -> f64 {
        let len = self.len as f64;
        if self.wrap {
            if self.len == 0 {
                0.0
            } else {
                offset - (offset / len).floor() * len
            }
        } else {
            offset.max(0.0).min((len - 1.0).max(0.0))
        }
    }

    /// Signed number of items to travel from `from` to `to`.
    ///
    /// Returns the direct distance `to - from`, unless wrapping is enabled and
    /// going around the other way is strictly shorter. Ties keep the direct
    /// distance.
    #[must_use]
    pub fn min_index_distance(&self, from: isize, to: isize) -> isize {
        let direct = to - from;
        if !self.wrap {
            return direct;
        }
        let mut wrapped = from.min(to) + self.signed_len() - from.max(to);
        if from < to {
            wrapped = -wrapped;
        }
        if direct.abs() <= wrapped.abs() {
            direct
        } else {
            wrapped
        }
    }

    /// Signed offset distance from `from` to `to`, with the same wrap policy as
    /// [`IndexSpace::min_index_distance`].
    #[must_use]
    pub fn min_offset_distance(&self, from: f64, to: f64) -> f64 {
        let direct = to - from;
        if !self.wrap {
            return direct;
        }
        let mut wrapped = from.min(to) + self.len as f64 - from.max(to);
        if from < to {
            wrapped = -wrapped;
        }
        if direct.abs() <= wrapped.abs() {
            direct
        } else {
            wrapped
        }
    }

    /// Index nearest to `offset`, mapped into the valid range.
    #[must_use]
    pub fn nearest_index(&self, offset: f64) -> usize {
        self.clamped_index(round_to_isize(offset))
    }

    #[allow(
        clippy::cast_possible_wrap,
        reason = "Item counts beyond isize::MAX cannot be allocated"
    )]
    const fn signed_len(&self) -> isize {
        self.len as isize
    }
}

/// Rounds half away from zero and converts to an index.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Offsets are bounded by the item count, which fits in isize"
)]
pub(crate) fn round_to_isize(value: f64) -> isize {
    value.round() as isize
}

/// Rounds towards negative infinity and converts to an index.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Offsets are bounded by the item count, which fits in isize"
)]
pub(crate) fn floor_to_isize(value: f64) -> isize {
    value.floor() as isize
}

/// Rounds towards positive infinity and converts to an index.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Offsets are bounded by the item count, which fits in isize"
)]
pub(crate) fn ceil_to_isize(value: f64) -> isize {
    value.ceil() as isize
}
