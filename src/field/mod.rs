//! Ghost-padded scalar fields: layout, storage and the per-partition buffers.

pub mod layout;
pub mod scalar_field;
pub mod storage;

use bytemuck::Pod;
use num_traits::Float;
use std::fmt::Debug;

pub use layout::{AxisOrder, GridLayout};
pub use scalar_field::{PartitionFields, ScalarField};
pub use storage::{Storage, VecStorage};

/// Floating-point element type of a field; `f32` reproduces the reference
/// runs, `f64` is available for tighter comparisons.
pub trait Scalar: Float + Pod + Debug + Send + Sync + 'static {}

impl<T> Scalar for T where T: Float + Pod + Debug + Send + Sync + 'static {}
