//! Run configuration: domain extents, sweep count, seed and stencil constants.
//!
//! Every component receives these values explicitly; nothing is read from
//! ambient global state. Defaults reproduce the reference runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::algs::stencil::StencilCoeffs;
use crate::field::layout::AxisOrder;
use crate::sor_error::SorError;

/// Un-padded extents of the three grid axes.
///
/// Each axis carries one boundary cell on either side, so the padded extent of
/// an axis is `count + 2`. `km` is the decomposed axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub im: usize,
    pub jm: usize,
    pub km: usize,
}

impl DomainConfig {
    pub fn new(im: usize, jm: usize, km: usize) -> Self {
        Self { im, jm, km }
    }

    /// Padded extent along axis 1.
    pub fn ext1(&self) -> usize {
        self.im + 2
    }

    /// Padded extent along axis 2.
    pub fn ext2(&self) -> usize {
        self.jm + 2
    }

    /// Padded extent `G` of the decomposed axis.
    pub fn global_extent(&self) -> usize {
        self.km + 2
    }

    pub fn validate(&self) -> Result<(), SorError> {
        for (axis, n) in [(1, self.im), (2, self.jm), (3, self.km)] {
            if n == 0 {
                return Err(SorError::EmptyAxis { axis });
            }
        }
        Ok(())
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            im: 128,
            jm: 128,
            km: 64,
        }
    }
}

/// A cell in padded global coordinates; `k` runs along the decomposed axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalCoord {
    pub a1: usize,
    pub a2: usize,
    pub k: usize,
}

impl GlobalCoord {
    pub fn new(a1: usize, a2: usize, k: usize) -> Self {
        Self { a1, a2, k }
    }
}

/// Full solver configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub domain: DomainConfig,
    /// Number of partitions along the decomposed axis.
    pub parts: usize,
    /// Fixed number of sweeps; there is no convergence test.
    pub iterations: usize,
    /// Initial value of `rhs` and `current`, ghosts included.
    pub seed: f64,
    pub coeffs: StencilCoeffs,
    pub axis_order: AxisOrder,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            domain: DomainConfig::default(),
            parts: 1,
            iterations: 5,
            seed: 1.0,
            coeffs: StencilCoeffs::default(),
            axis_order: AxisOrder::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_domain(domain: DomainConfig) -> Self {
        Self {
            domain,
            ..Default::default()
        }
    }

    pub fn parts(mut self, parts: usize) -> Self {
        self.parts = parts;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Checks everything that must hold before a buffer is allocated.
    pub fn validate(&self) -> Result<(), SorError> {
        self.domain.validate()?;
        if self.parts == 0 {
            return Err(SorError::NoPartitions);
        }
        let extent = self.domain.global_extent();
        if self.parts > extent {
            return Err(SorError::TooManyPartitions {
                parts: self.parts,
                extent,
            });
        }
        if !self.seed.is_finite() || !self.coeffs.omega.is_finite() {
            return Err(SorError::Config("seed and omega must be finite".into()));
        }
        Ok(())
    }

    /// Coordinate read out at the end of a run: the approximate domain centre.
    pub fn probe_coord(&self) -> GlobalCoord {
        GlobalCoord::new(self.domain.im / 2, self.domain.jm / 2, self.domain.km / 2)
    }

    pub fn from_json_str(s: &str) -> Result<Self, SorError> {
        let cfg: SolverConfig =
            serde_json::from_str(s).map_err(|e| SorError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SorError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}
