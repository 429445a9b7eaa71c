//! Serial, undecomposed reference solver.
//!
//! Runs the same cell rules over the whole padded domain with two plain
//! buffers and no ghost planes. Decomposed runs are checked against it.

use crate::algs::stencil::{CellClass, Weights, classify};
use crate::config::{GlobalCoord, SolverConfig};
use crate::field::Scalar;
use crate::sor_error::SorError;

/// Whole-domain solver with `a1`-fastest, `k`-slowest storage.
#[derive(Clone, Debug)]
pub struct ReferenceSolver<T> {
    config: SolverConfig,
    weights: Weights<T>,
    current: Vec<T>,
    next: Vec<T>,
    rhs: Vec<T>,
}

impl<T: Scalar> ReferenceSolver<T> {
    /// Seed exactly like a partition: `rhs = current = seed`, `next = 0`.
    pub fn new(config: SolverConfig) -> Result<Self, SorError> {
        config.domain.validate()?;
        let d = config.domain;
        let len = d.ext1() * d.ext2() * d.global_extent();
        let seed = <T as num_traits::NumCast>::from(config.seed)
            .ok_or_else(|| SorError::Config("seed not representable".into()))?;
        let weights = config.coeffs.weights::<T>()?;
        Ok(Self {
            config,
            weights,
            current: vec![seed; len],
            next: vec![T::zero(); len],
            rhs: vec![seed; len],
        })
    }

    #[inline]
    fn at(&self, a1: usize, a2: usize, k: usize) -> usize {
        let d = &self.config.domain;
        a1 + d.ext1() * (a2 + d.ext2() * k)
    }

    /// One sweep over every cell of the padded domain, then swap buffers.
    pub fn step(&mut self) {
        let d = self.config.domain;
        let c = &self.current;
        for k in 0..d.global_extent() {
            for a2 in 0..d.ext2() {
                for a1 in 0..d.ext1() {
                    let i = self.at(a1, a2, k);
                    let value = match classify(a1, a2, k, &d) {
                        CellClass::PeriodicWrapHigh => c[self.at(a1 - d.im, a2, k)],
                        CellClass::PeriodicWrapLow => c[self.at(a1 + d.im, a2, k)],
                        CellClass::NeumannEdge => c[self.at(a1, a2 - 1, k)],
                        CellClass::FrozenEdge => c[i],
                        CellClass::GlobalEdge => continue,
                        CellClass::Interior => self.weights.relax(
                            c[i],
                            [
                                c[self.at(a1 + 1, a2, k)],
                                c[self.at(a1 - 1, a2, k)],
                                c[self.at(a1, a2 + 1, k)],
                                c[self.at(a1, a2 - 1, k)],
                                c[self.at(a1, a2, k + 1)],
                                c[self.at(a1, a2, k - 1)],
                            ],
                            self.rhs[i],
                        ),
                    };
                    self.next[i] = value;
                }
            }
        }
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Run the configured number of sweeps.
    pub fn run(&mut self) {
        for _ in 0..self.config.iterations {
            self.step();
        }
    }

    /// Latest sweep result, indexed `a1 + ext1 * (a2 + ext2 * k)`.
    pub fn current(&self) -> &[T] {
        &self.current
    }

    pub fn value(&self, coord: GlobalCoord) -> T {
        self.current[self.at(coord.a1, coord.a2, coord.k)]
    }
}
