//! Ghost-padded scalar field and the per-partition triple of fields.

use std::marker::PhantomData;

use crate::debug_invariants::DebugInvariants;
use crate::field::Scalar;
use crate::field::layout::GridLayout;
use crate::field::storage::{Storage, VecStorage};
use crate::sor_error::SorError;

/// A flat scalar field addressed through a [`GridLayout`].
#[derive(Clone, Debug)]
pub struct ScalarField<T, S = VecStorage<T>> {
    layout: GridLayout,
    data: S,
    _marker: PhantomData<T>,
}

impl<T, S> ScalarField<T, S>
where
    T: Scalar,
    S: Storage<T>,
{
    /// Allocate a field with every cell, ghosts included, set to `fill`.
    pub fn filled(layout: GridLayout, fill: T) -> Result<Self, SorError> {
        let data = S::try_with_len(layout.len(), fill)?;
        Ok(Self {
            layout,
            data,
            _marker: PhantomData,
        })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[inline]
    pub fn get(&self, a1: usize, a2: usize, local: usize) -> T {
        self.data.as_slice()[self.layout.index(a1, a2, local)]
    }

    #[inline]
    pub fn set(&mut self, a1: usize, a2: usize, local: usize, value: T) {
        let i = self.layout.index(a1, a2, local);
        self.data.as_mut_slice()[i] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    fn check_plane(&self, local: usize, len: usize) -> Result<(), SorError> {
        if local >= self.layout.ghost_extent() {
            return Err(SorError::OutOfDomain {
                axis: 3,
                index: local,
                extent: self.layout.ghost_extent(),
            });
        }
        if len != self.layout.plane_len() {
            return Err(SorError::PlaneLengthMismatch {
                expected: self.layout.plane_len(),
                found: len,
            });
        }
        Ok(())
    }

    /// Pack plane `local` into `dst` in the layout's plane order.
    pub fn copy_plane_out(&self, local: usize, dst: &mut [T]) -> Result<(), SorError> {
        self.check_plane(local, dst.len())?;
        match self.layout.plane_range(local) {
            Some(range) => self.data.read_into(range.start, dst),
            None => {
                let src = self.data.as_slice();
                for (d, i) in dst.iter_mut().zip(self.layout.plane_indices(local)) {
                    *d = src[i];
                }
                Ok(())
            }
        }
    }

    /// Unpack `src` into plane `local`; inverse of [`Self::copy_plane_out`].
    pub fn copy_plane_in(&mut self, local: usize, src: &[T]) -> Result<(), SorError> {
        self.check_plane(local, src.len())?;
        match self.layout.plane_range(local) {
            Some(range) => self.data.write_at(range.start, src),
            None => {
                let layout = self.layout;
                let dst = self.data.as_mut_slice();
                for (&s, i) in src.iter().zip(layout.plane_indices(local)) {
                    dst[i] = s;
                }
                Ok(())
            }
        }
    }

    /// Plane `local` as an owned vector.
    pub fn plane(&self, local: usize) -> Result<Vec<T>, SorError> {
        let mut out = vec![T::zero(); self.layout.plane_len()];
        self.copy_plane_out(local, &mut out)?;
        Ok(out)
    }
}

/// The three buffers one partition owns for a solve.
///
/// `current` is read and `next` written by a sweep; [`PartitionFields::swap`]
/// exchanges their roles afterwards. `rhs` is never written after seeding.
#[derive(Clone, Debug)]
pub struct PartitionFields<T, S = VecStorage<T>> {
    current: ScalarField<T, S>,
    next: ScalarField<T, S>,
    rhs: ScalarField<T, S>,
}

impl<T, S> PartitionFields<T, S>
where
    T: Scalar,
    S: Storage<T>,
{
    /// `rhs` and `current` set to `seed` everywhere, `next` zeroed.
    pub fn seeded(layout: GridLayout, seed: T) -> Result<Self, SorError> {
        let fields = Self {
            current: ScalarField::filled(layout, seed)?,
            next: ScalarField::filled(layout, T::zero())?,
            rhs: ScalarField::filled(layout, seed)?,
        };
        crate::debug_invariants!(fields.validate_invariants(), "PartitionFields::seeded");
        Ok(fields)
    }

    pub fn layout(&self) -> &GridLayout {
        self.current.layout()
    }

    /// Buffer holding the latest sweep result.
    pub fn current(&self) -> &ScalarField<T, S> {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut ScalarField<T, S> {
        &mut self.current
    }

    pub fn next(&self) -> &ScalarField<T, S> {
        &self.next
    }

    pub fn rhs(&self) -> &ScalarField<T, S> {
        &self.rhs
    }

    /// Borrow `(current, next, rhs)` for one sweep; `next` is the only
    /// mutable one, so a sweep cannot read and write the same buffer.
    pub fn split_mut(
        &mut self,
    ) -> (&ScalarField<T, S>, &mut ScalarField<T, S>, &ScalarField<T, S>) {
        (&self.current, &mut self.next, &self.rhs)
    }

    /// Hand the freshly written `next` over as `current`.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

impl<T, S> DebugInvariants for PartitionFields<T, S>
where
    T: Scalar,
    S: Storage<T>,
{
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "PartitionFields");
    }

    fn validate_invariants(&self) -> Result<(), SorError> {
        let layout = self.current.layout();
        for field in [&self.current, &self.next, &self.rhs] {
            if field.layout() != layout {
                return Err(SorError::Config("fields disagree on layout".into()));
            }
            if field.as_slice().len() != layout.len() {
                return Err(SorError::PlaneLengthMismatch {
                    expected: layout.len(),
                    found: field.as_slice().len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomainConfig;
    use crate::field::layout::AxisOrder;

    fn layout(order: AxisOrder) -> GridLayout {
        GridLayout::new(&DomainConfig::new(2, 2, 4), 5, order)
    }

    #[test]
    fn seeding_covers_ghosts() {
        let f = PartitionFields::<f32>::seeded(layout(AxisOrder::default()), 1.0).unwrap();
        assert!(f.current().as_slice().iter().all(|&v| v == 1.0));
        assert!(f.rhs().as_slice().iter().all(|&v| v == 1.0));
        assert!(f.next().as_slice().iter().all(|&v| v == 0.0));
        f.validate_invariants().unwrap();
    }

    #[test]
    fn swap_exchanges_roles() {
        let mut f = PartitionFields::<f64>::seeded(layout(AxisOrder::default()), 1.0).unwrap();
        {
            let (_, next, _) = f.split_mut();
            next.set(1, 1, 2, 7.0);
        }
        f.swap();
        assert_eq!(f.current().get(1, 1, 2), 7.0);
        assert_eq!(f.next().get(1, 1, 2), 1.0);
    }

    #[test]
    fn plane_copy_round_trips_in_both_orders() {
        for order in [AxisOrder::DecomposedSlowest, AxisOrder::DecomposedFastest] {
            let mut field = ScalarField::<f32>::filled(layout(order), 0.0).unwrap();
            let plane: Vec<f32> = (0..16).map(|v| v as f32).collect();
            field.copy_plane_in(3, &plane).unwrap();
            assert_eq!(field.plane(3).unwrap(), plane);
            assert_eq!(field.get(1, 0, 3), 1.0);
            assert_eq!(field.get(0, 1, 3), 4.0);
            assert!(field.plane(2).unwrap().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn plane_copy_checks_shape() {
        let mut field = ScalarField::<f32>::filled(layout(AxisOrder::default()), 0.0).unwrap();
        assert!(matches!(
            field.copy_plane_in(0, &[1.0; 3]),
            Err(SorError::PlaneLengthMismatch { expected: 16, found: 3 })
        ));
        assert!(matches!(
            field.copy_plane_in(5, &[1.0; 16]),
            Err(SorError::OutOfDomain { axis: 3, index: 5, .. })
        ));
    }
}
