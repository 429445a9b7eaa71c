//! One Jacobi relaxation sweep over a partition's owned planes.
//!
//! Every cell is first tagged with a [`CellClass`] and then updated by the
//! rule for that class. Classes are checked in a fixed priority order, so a
//! corner cell on both the axis-1 and axis-2 boundaries is always treated as
//! an axis-1 cell.
//!
//! All reads come from `current` and all writes go to `next`; the sweep is
//! independent of visiting order.

use num_traits::NumCast;
use serde::{Deserialize, Serialize};

use crate::config::DomainConfig;
use crate::decomposition::planner::Slab;
use crate::field::Scalar;
use crate::field::scalar_field::ScalarField;
use crate::field::storage::Storage;
use crate::sor_error::SorError;

/// Constants of the relaxation update.
///
/// `cn2*`, `cn3*`, `cn4*` weight the large/small neighbour along axes 1, 2
/// and the decomposed axis respectively.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StencilCoeffs {
    pub cn1: f64,
    pub cn2l: f64,
    pub cn2s: f64,
    pub cn3l: f64,
    pub cn3s: f64,
    pub cn4l: f64,
    pub cn4s: f64,
    pub omega: f64,
}

impl Default for StencilCoeffs {
    fn default() -> Self {
        Self {
            cn1: 1.0 / 3.0,
            cn2l: 0.5,
            cn2s: 0.5,
            cn3l: 0.5,
            cn3s: 0.5,
            cn4l: 0.5,
            cn4s: 0.5,
            omega: 1.0,
        }
    }
}

/// The coefficients converted once to the field's scalar type.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Weights<T> {
    pub cn1: T,
    pub cn2l: T,
    pub cn2s: T,
    pub cn3l: T,
    pub cn3s: T,
    pub cn4l: T,
    pub cn4s: T,
    pub omega: T,
}

impl StencilCoeffs {
    pub(crate) fn weights<T: Scalar>(&self) -> Result<Weights<T>, SorError> {
        let cast = |v: f64| {
            <T as NumCast>::from(v)
                .ok_or_else(|| SorError::Config(format!("coefficient {v} not representable")))
        };
        Ok(Weights {
            cn1: cast(self.cn1)?,
            cn2l: cast(self.cn2l)?,
            cn2s: cast(self.cn2s)?,
            cn3l: cast(self.cn3l)?,
            cn3s: cast(self.cn3s)?,
            cn4l: cast(self.cn4l)?,
            cn4s: cast(self.cn4s)?,
            omega: cast(self.omega)?,
        })
    }
}

impl<T: Scalar> Weights<T> {
    /// The relaxed value of a cell from its own value, its six neighbours
    /// (axis-1 high/low, axis-2 high/low, decomposed high/low) and `rhs`.
    #[inline]
    pub(crate) fn relax(&self, center: T, n: [T; 6], rhs: T) -> T {
        let rel = self.omega
            * (self.cn1
                * (self.cn2l * n[0]
                    + self.cn2s * n[1]
                    + self.cn3l * n[2]
                    + self.cn3s * n[3]
                    + self.cn4l * n[4]
                    + self.cn4s * n[5]
                    - rhs)
                - center);
        center + rel
    }
}

/// Update rule selected for a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellClass {
    /// `a1 == im + 1`: copy from `a1 - im`.
    PeriodicWrapHigh,
    /// `a1 == 0`: copy from `a1 + im`.
    PeriodicWrapLow,
    /// `a2 == jm + 1`: copy from `a2 - 1`.
    NeumannEdge,
    /// `a2 == 0`: keep the current value.
    FrozenEdge,
    /// First or last global plane of the decomposed axis: `next` is not written.
    GlobalEdge,
    Interior,
}

impl CellClass {
    pub const ALL: [CellClass; 6] = [
        CellClass::PeriodicWrapHigh,
        CellClass::PeriodicWrapLow,
        CellClass::NeumannEdge,
        CellClass::FrozenEdge,
        CellClass::GlobalEdge,
        CellClass::Interior,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Tag a cell by padded axis indices and global decomposed index `k`.
pub fn classify(a1: usize, a2: usize, k: usize, domain: &DomainConfig) -> CellClass {
    if a1 == domain.im + 1 {
        CellClass::PeriodicWrapHigh
    } else if a1 == 0 {
        CellClass::PeriodicWrapLow
    } else if a2 == domain.jm + 1 {
        CellClass::NeumannEdge
    } else if a2 == 0 {
        CellClass::FrozenEdge
    } else if k == 0 || k == domain.global_extent() - 1 {
        CellClass::GlobalEdge
    } else {
        CellClass::Interior
    }
}

/// Cells visited per class during one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    counts: [usize; 6],
}

impl SweepStats {
    pub fn count(&self, class: CellClass) -> usize {
        self.counts[class.slot()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Apply one sweep: read `current` and `rhs`, write `next`.
///
/// Visits the owned planes `1..=slab.owned_extent`; ghost planes are left to
/// the exchanger.
///
/// # Errors
/// `Config` if the three fields do not share the slab's layout or a
/// coefficient cannot be represented in `T`.
pub fn sweep<T, S>(
    current: &ScalarField<T, S>,
    next: &mut ScalarField<T, S>,
    rhs: &ScalarField<T, S>,
    slab: &Slab,
    domain: &DomainConfig,
    coeffs: &StencilCoeffs,
) -> Result<SweepStats, SorError>
where
    T: Scalar,
    S: Storage<T>,
{
    let layout = *current.layout();
    if next.layout() != &layout
        || rhs.layout() != &layout
        || layout.ghost_extent() != slab.ghost_extent
        || layout.ext1() != domain.ext1()
        || layout.ext2() != domain.ext2()
    {
        return Err(SorError::Config(format!(
            "fields do not match slab {} layout",
            slab.ordinal
        )));
    }
    let w = coeffs.weights::<T>()?;
    let im = domain.im;
    let c = current.as_slice();
    let r = rhs.as_slice();
    let n = next.as_mut_slice();
    let at = |a1: usize, a2: usize, l: usize| layout.index(a1, a2, l);

    let mut stats = SweepStats::default();
    for l in slab.owned_planes() {
        let k = slab.offset + l - 1;
        for a2 in 0..layout.ext2() {
            for a1 in 0..layout.ext1() {
                let i = at(a1, a2, l);
                let class = classify(a1, a2, k, domain);
                stats.counts[class.slot()] += 1;
                match class {
                    CellClass::PeriodicWrapHigh => n[i] = c[at(a1 - im, a2, l)],
                    CellClass::PeriodicWrapLow => n[i] = c[at(a1 + im, a2, l)],
                    CellClass::NeumannEdge => n[i] = c[at(a1, a2 - 1, l)],
                    CellClass::FrozenEdge => n[i] = c[i],
                    CellClass::GlobalEdge => {}
                    CellClass::Interior => {
                        let nbrs = [
                            c[at(a1 + 1, a2, l)],
                            c[at(a1 - 1, a2, l)],
                            c[at(a1, a2 + 1, l)],
                            c[at(a1, a2 - 1, l)],
                            c[at(a1, a2, l + 1)],
                            c[at(a1, a2, l - 1)],
                        ];
                        n[i] = w.relax(c[i], nbrs, r[i]);
                    }
                }
            }
        }
    }
    Ok(stats)
}
