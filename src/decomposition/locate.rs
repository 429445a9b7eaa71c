//! Global coordinate → (owning ordinal, ghost-inclusive local index).
//!
//! Mirrors the planner's remainder folding exactly: the remainder is
//! subtracted before dividing by the uniform quotient, so every one of
//! ordinal 0's `base + remainder` cells resolves to ordinal 0.

use crate::config::{DomainConfig, GlobalCoord};
use crate::decomposition::planner::SlabPlan;
use crate::sor_error::SorError;

/// Where a global cell lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub ordinal: usize,
    /// Ghost-inclusive local index along the decomposed axis.
    pub local: usize,
}

impl SlabPlan {
    /// Resolve a global decomposed-axis index.
    ///
    /// # Errors
    /// `OutOfDomain` if `k >= G`.
    pub fn locate(&self, k: usize) -> Result<Location, SorError> {
        if k >= self.global_extent() {
            return Err(SorError::OutOfDomain {
                axis: 3,
                index: k,
                extent: self.global_extent(),
            });
        }
        let ordinal = (k.saturating_sub(self.remainder()) / self.base()).min(self.parts() - 1);
        Ok(Location {
            ordinal,
            local: k - self.offset(ordinal) + 1,
        })
    }

    /// Resolve a full coordinate, checking the two undecomposed axes as well.
    pub fn locate_coord(
        &self,
        domain: &DomainConfig,
        coord: GlobalCoord,
    ) -> Result<Location, SorError> {
        for (axis, index, extent) in [(1, coord.a1, domain.ext1()), (2, coord.a2, domain.ext2())] {
            if index >= extent {
                return Err(SorError::OutOfDomain {
                    axis,
                    index,
                    extent,
                });
            }
        }
        self.locate(coord.k)
    }
}
