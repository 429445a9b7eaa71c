//! Partition planner: how many decomposed-axis cells each ordinal owns.
//!
//! The padded extent `G` is divided evenly; the remainder is folded entirely
//! into ordinal 0. Each slab is then widened by one ghost plane per side.

use serde::{Deserialize, Serialize};

use crate::config::DomainConfig;
use crate::debug_invariants::DebugInvariants;
use crate::sor_error::SorError;

/// Sizing of every slab for a fixed `(parts, G)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabPlan {
    parts: usize,
    global_extent: usize,
    base: usize,
    remainder: usize,
}

/// The slab owned by one ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slab {
    pub ordinal: usize,
    /// Owned decomposed-axis cells, ghosts excluded.
    pub owned_extent: usize,
    /// `owned_extent + 2`.
    pub ghost_extent: usize,
    /// Global decomposed index stored at local index 1.
    pub offset: usize,
}

impl SlabPlan {
    /// Plan `parts` slabs over a padded extent of `global_extent` cells.
    ///
    /// # Errors
    /// `NoPartitions` for `parts == 0`, `TooManyPartitions` when some slab
    /// would own no cells.
    pub fn new(parts: usize, global_extent: usize) -> Result<Self, SorError> {
        if parts == 0 {
            return Err(SorError::NoPartitions);
        }
        if parts > global_extent {
            return Err(SorError::TooManyPartitions {
                parts,
                extent: global_extent,
            });
        }
        let plan = Self {
            parts,
            global_extent,
            base: global_extent / parts,
            remainder: global_extent % parts,
        };
        crate::debug_invariants!(plan.validate_invariants(), "SlabPlan::new");
        Ok(plan)
    }

    /// Plan over the domain's decomposed axis (`G = km + 2`).
    pub fn for_domain(domain: &DomainConfig, parts: usize) -> Result<Self, SorError> {
        Self::new(parts, domain.global_extent())
    }

    pub fn parts(&self) -> usize {
        self.parts
    }

    pub fn global_extent(&self) -> usize {
        self.global_extent
    }

    /// Uniform quotient `G / parts`.
    pub fn base(&self) -> usize {
        self.base
    }

    /// `G % parts`, all of it owned by ordinal 0.
    pub fn remainder(&self) -> usize {
        self.remainder
    }

    pub fn owned_extent(&self, ordinal: usize) -> usize {
        if ordinal == 0 {
            self.base + self.remainder
        } else {
            self.base
        }
    }

    pub fn ghost_extent(&self, ordinal: usize) -> usize {
        self.owned_extent(ordinal) + 2
    }

    /// First global decomposed index owned by `ordinal`.
    pub fn offset(&self, ordinal: usize) -> usize {
        if ordinal == 0 {
            0
        } else {
            self.remainder + ordinal * self.base
        }
    }

    pub fn slab(&self, ordinal: usize) -> Result<Slab, SorError> {
        if ordinal >= self.parts {
            return Err(SorError::InvalidOrdinal {
                ordinal,
                parts: self.parts,
            });
        }
        Ok(self.slab_unchecked(ordinal))
    }

    /// All slabs in ordinal order.
    pub fn slabs(&self) -> impl Iterator<Item = Slab> + '_ {
        (0..self.parts).map(move |ordinal| self.slab_unchecked(ordinal))
    }

    fn slab_unchecked(&self, ordinal: usize) -> Slab {
        let owned_extent = self.owned_extent(ordinal);
        Slab {
            ordinal,
            owned_extent,
            ghost_extent: self.ghost_extent(ordinal),
            offset: self.offset(ordinal),
        }
    }
}

impl DebugInvariants for SlabPlan {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "SlabPlan");
    }

    fn validate_invariants(&self) -> Result<(), SorError> {
        let total: usize = self.slabs().map(|s| s.owned_extent).sum();
        if total != self.global_extent {
            return Err(SorError::Config(format!(
                "slabs cover {total} cells, expected {}",
                self.global_extent
            )));
        }
        let mut expected_offset = 0;
        for slab in self.slabs() {
            if slab.owned_extent == 0 || slab.offset != expected_offset {
                return Err(SorError::Config(format!(
                    "slab {} is empty or not contiguous",
                    slab.ordinal
                )));
            }
            expected_offset += slab.owned_extent;
        }
        Ok(())
    }
}

impl Slab {
    /// Global decomposed index of a ghost-inclusive local index.
    ///
    /// `None` for the ghost plane below global index 0 and for anything past
    /// the upper ghost plane.
    pub fn global_index(&self, local: usize) -> Option<usize> {
        if local >= self.ghost_extent {
            return None;
        }
        (self.offset + local).checked_sub(1)
    }

    /// Local indices of the owned planes, `1..=owned_extent`.
    pub fn owned_planes(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.owned_extent
    }
}
