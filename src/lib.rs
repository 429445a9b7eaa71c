#![cfg_attr(docsrs, feature(doc_cfg))]
//! # slab-sor
//!
//! slab-sor is a distributed-memory relaxation solver for a 3D scalar field on a
//! structured, ghost-padded grid. One grid axis is decomposed into contiguous
//! slabs, one per partition; neighbouring partitions exchange a one-plane ghost
//! layer before every sweep.
//!
//! ## Features
//! - Slab planning with the division remainder folded into partition 0
//! - Global→local location lookup that mirrors the planner exactly
//! - Pluggable transports (serial, in-process threads, MPI) behind one
//!   blocking send/receive primitive
//! - A Jacobi stencil with explicit per-cell boundary classification
//! - A serial whole-domain reference solver for cross-checking decompositions
//!
//! ## Determinism
//!
//! Sweeps read only `current` and write only `next`, and every partition runs
//! the same arithmetic in the same order, so the result does not depend on the
//! number of partitions.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! slab-sor = "0.1"
//! # features = ["mpi-support"]
//! ```
//!
//! ```
//! use slab_sor::prelude::*;
//!
//! let cfg = SolverConfig::with_domain(DomainConfig::new(8, 8, 8)).parts(2);
//! let run = run_local::<f32>(&cfg).unwrap();
//! assert!(run.probe(cfg.probe_coord()).unwrap().is_some());
//! ```

pub mod algs;
pub mod config;
pub mod debug_invariants;
pub mod decomposition;
pub mod field;
pub mod reference;
pub mod solver;
pub mod sor_error;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{CommTag, Communicator, LocalComm, NoComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::halo::{HaloScratch, exchange_halo};
    pub use crate::algs::stencil::{CellClass, StencilCoeffs, classify, sweep};
    pub use crate::config::{DomainConfig, GlobalCoord, SolverConfig};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::decomposition::{Location, NeighborLinks, Slab, SlabPlan};
    pub use crate::field::{AxisOrder, GridLayout, PartitionFields, ScalarField};
    pub use crate::reference::ReferenceSolver;
    pub use crate::solver::{LocalRun, Partition, RunReport, run_local, run_local_with};
    pub use crate::sor_error::SorError;
}
