//! Pluggable storage for scalar field buffers.
//!
//! Fields only need a flat, fixed-length, slice-addressable buffer. `VecStorage`
//! is the default; other backends (pinned or shared memory) can implement the
//! same trait without touching the exchanger or the stencil.

use core::fmt::{self, Debug};

use crate::sor_error::SorError;

/// Contiguous, fixed-length storage for `V` with slice access.
pub trait Storage<V>: Debug {
    /// Allocate a buffer of `len` elements, every one set to `fill`.
    ///
    /// # Errors
    /// `SorError::Allocation` if the memory cannot be reserved.
    fn try_with_len(len: usize, fill: V) -> Result<Self, SorError>
    where
        Self: Sized,
        V: Clone;

    /// Current length in elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entire read-only buffer.
    fn as_slice(&self) -> &[V];

    /// Entire mutable buffer.
    fn as_mut_slice(&mut self) -> &mut [V];

    /// Copy `src` into `[offset .. offset + src.len())`.
    fn write_at(&mut self, offset: usize, src: &[V]) -> Result<(), SorError>
    where
        V: Copy,
    {
        let len = self.len();
        let dst = offset
            .checked_add(src.len())
            .and_then(|end| self.as_mut_slice().get_mut(offset..end))
            .ok_or(SorError::PlaneLengthMismatch {
                expected: len.saturating_sub(offset),
                found: src.len(),
            })?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Read `[offset .. offset + dst.len())` into `dst`.
    fn read_into(&self, offset: usize, dst: &mut [V]) -> Result<(), SorError>
    where
        V: Copy,
    {
        let src = offset
            .checked_add(dst.len())
            .and_then(|end| self.as_slice().get(offset..end))
            .ok_or(SorError::PlaneLengthMismatch {
                expected: self.len().saturating_sub(offset),
                found: dst.len(),
            })?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// `Vec`-backed storage (default).
#[derive(Clone, PartialEq)]
pub struct VecStorage<V>(pub(crate) Vec<V>);

impl<V> Debug for VecStorage<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecStorage")
            .field("len", &self.0.len())
            .finish()
    }
}

impl<V> Storage<V> for VecStorage<V> {
    fn try_with_len(len: usize, fill: V) -> Result<Self, SorError>
    where
        V: Clone,
    {
        let mut v = Vec::new();
        v.try_reserve_exact(len)
            .map_err(|_| SorError::Allocation { len })?;
        v.resize(len, fill);
        Ok(Self(v))
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn as_slice(&self) -> &[V] {
        &self.0
    }

    fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.0
    }
}
