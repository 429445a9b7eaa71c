//! Linear neighbour topology along the decomposed axis.

/// The two partitions adjacent to an ordinal; `None` marks the ends of the
/// ordinal range, where the matching half of the ghost exchange is a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborLinks {
    pub down: Option<usize>,
    pub up: Option<usize>,
}

impl NeighborLinks {
    pub fn new(ordinal: usize, parts: usize) -> Self {
        Self {
            down: ordinal.checked_sub(1),
            up: (ordinal + 1 < parts).then_some(ordinal + 1),
        }
    }

    /// No neighbour on either side (a single-partition run).
    pub fn is_isolated(&self) -> bool {
        self.down.is_none() && self.up.is_none()
    }
}
