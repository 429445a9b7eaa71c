//! Linearization of the ghost-padded 3D grid into a flat buffer.
//!
//! One [`GridLayout`] is shared by `current`, `next` and `rhs`, and by both the
//! ghost exchange and the stencil, so every component addresses a cell the
//! same way.

use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::DomainConfig;

/// Which axis varies fastest in memory. Fixed for the whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisOrder {
    /// `a1 + ext1 * (a2 + ext2 * local)`: each decomposed-axis plane is one
    /// contiguous run, so ghost planes move without packing.
    #[default]
    DecomposedSlowest,
    /// `local + ghost * (a2 + ext2 * a1)`: planes are strided and are packed
    /// into a scratch buffer before transfer.
    DecomposedFastest,
}

/// Shape and ordering of one partition's ghost-inclusive field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    ext1: usize,
    ext2: usize,
    ghost: usize,
    order: AxisOrder,
}

impl GridLayout {
    /// Layout for a slab of `ghost_extent` local planes of `domain`.
    pub fn new(domain: &DomainConfig, ghost_extent: usize, order: AxisOrder) -> Self {
        Self {
            ext1: domain.ext1(),
            ext2: domain.ext2(),
            ghost: ghost_extent,
            order,
        }
    }

    pub fn ext1(&self) -> usize {
        self.ext1
    }

    pub fn ext2(&self) -> usize {
        self.ext2
    }

    /// Number of local planes including both ghosts.
    pub fn ghost_extent(&self) -> usize {
        self.ghost
    }

    /// Total element count, `ext1 * ext2 * ghost_extent`.
    pub fn len(&self) -> usize {
        self.plane_len() * self.ghost
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in one plane of the decomposed axis.
    pub fn plane_len(&self) -> usize {
        self.ext1 * self.ext2
    }

    #[inline]
    pub fn index(&self, a1: usize, a2: usize, local: usize) -> usize {
        debug_assert!(a1 < self.ext1 && a2 < self.ext2 && local < self.ghost);
        match self.order {
            AxisOrder::DecomposedSlowest => a1 + self.ext1 * (a2 + self.ext2 * local),
            AxisOrder::DecomposedFastest => local + self.ghost * (a2 + self.ext2 * a1),
        }
    }

    /// Flat range of plane `local` when the plane is contiguous.
    pub fn plane_range(&self, local: usize) -> Option<Range<usize>> {
        match self.order {
            AxisOrder::DecomposedSlowest => {
                let start = self.plane_len() * local;
                Some(start..start + self.plane_len())
            }
            AxisOrder::DecomposedFastest => None,
        }
    }

    /// Flat indices of plane `local`, `a2`-major then `a1`.
    ///
    /// Every partition walks a plane in this order, so a packed plane sent by
    /// one partition unpacks cell-for-cell on its neighbour.
    pub fn plane_indices(&self, local: usize) -> impl Iterator<Item = usize> + '_ {
        iproduct!(0..self.ext2, 0..self.ext1).map(move |(a2, a1)| self.index(a1, a2, local))
    }
}
