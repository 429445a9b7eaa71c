//! Driver: one partition's solve, and in-process multi-partition runs.
//!
//! A [`Partition`] owns its slab, its three fields and its end of the
//! transport. Each sweep exchanges ghost planes on `current`, relaxes into
//! `next`, then swaps the two.

use std::thread;
use std::time::{Duration, Instant};

use crate::algs::communicator::{Communicator, LocalComm};
use crate::algs::halo::{HaloScratch, HaloStats, exchange_halo};
use crate::algs::stencil::{CellClass, SweepStats, sweep};
use crate::config::{GlobalCoord, SolverConfig};
use crate::decomposition::neighbors::NeighborLinks;
use crate::decomposition::planner::{Slab, SlabPlan};
use crate::field::Scalar;
use crate::field::layout::GridLayout;
use crate::field::scalar_field::PartitionFields;
use crate::sor_error::SorError;

/// Outcome of [`Partition::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub iterations: usize,
    pub elapsed: Duration,
}

/// One partition of a distributed solve.
#[derive(Debug)]
pub struct Partition<T: Scalar, C: Communicator> {
    config: SolverConfig,
    plan: SlabPlan,
    slab: Slab,
    links: NeighborLinks,
    fields: PartitionFields<T>,
    scratch: HaloScratch<T>,
    comm: C,
    sweeps_done: usize,
}

impl<T: Scalar, C: Communicator> Partition<T, C> {
    /// Plan, allocate and seed this rank's slab.
    ///
    /// # Errors
    /// Invalid configuration, a transport whose size differs from
    /// `config.parts`, or allocation failure. All are raised before any sweep.
    pub fn new(config: SolverConfig, comm: C) -> Result<Self, SorError> {
        config.validate()?;
        if comm.size() != config.parts {
            return Err(SorError::WorldSizeMismatch {
                expected: config.parts,
                found: comm.size(),
            });
        }
        let plan = SlabPlan::for_domain(&config.domain, config.parts)?;
        let slab = plan.slab(comm.rank())?;
        let layout = GridLayout::new(&config.domain, slab.ghost_extent, config.axis_order);
        let seed = <T as num_traits::NumCast>::from(config.seed)
            .ok_or_else(|| SorError::Config("seed not representable".into()))?;
        let fields = PartitionFields::seeded(layout, seed)?;
        log::debug!(
            "[rank {}] allocated slab: ghost_extent = {}, {} cells per field",
            slab.ordinal,
            slab.ghost_extent,
            layout.len()
        );
        Ok(Self {
            links: NeighborLinks::new(slab.ordinal, config.parts),
            scratch: HaloScratch::new(layout.plane_len()),
            config,
            plan,
            slab,
            fields,
            comm,
            sweeps_done: 0,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn slab(&self) -> &Slab {
        &self.slab
    }

    pub fn links(&self) -> &NeighborLinks {
        &self.links
    }

    pub fn fields(&self) -> &PartitionFields<T> {
        &self.fields
    }

    /// Direct access to the buffers, e.g. to impose a non-uniform initial state.
    pub fn fields_mut(&mut self) -> &mut PartitionFields<T> {
        &mut self.fields
    }

    pub fn sweeps_done(&self) -> usize {
        self.sweeps_done
    }

    /// Refresh the ghost planes of `current` without sweeping.
    pub fn exchange(&mut self) -> Result<HaloStats, SorError> {
        exchange_halo(
            self.fields.current_mut(),
            &self.links,
            &self.comm,
            &mut self.scratch,
        )
    }

    /// Exchange, relax `current` into `next`, then swap roles.
    pub fn sweep(&mut self) -> Result<SweepStats, SorError> {
        self.exchange()?;
        let (current, next, rhs) = self.fields.split_mut();
        let stats = sweep(
            current,
            next,
            rhs,
            &self.slab,
            &self.config.domain,
            &self.config.coeffs,
        )?;
        self.fields.swap();
        self.sweeps_done += 1;
        Ok(stats)
    }

    /// Run `config.iterations` sweeps and time them.
    pub fn run(&mut self) -> Result<RunReport, SorError> {
        let total = self.config.iterations;
        let start = Instant::now();
        for iter in 1..=total {
            log::info!(
                "iteration {iter} / {total} (rank {}, size {})",
                self.comm.rank(),
                self.comm.size()
            );
            let stats = self.sweep()?;
            if log::log_enabled!(log::Level::Trace) {
                for class in CellClass::ALL {
                    log::trace!("[rank {}] {class:?}: {}", self.slab.ordinal, stats.count(class));
                }
            }
        }
        Ok(RunReport {
            iterations: total,
            elapsed: start.elapsed(),
        })
    }

    /// Value at a global coordinate if this partition owns it, else `None`.
    ///
    /// Reads the buffer holding the latest sweep result.
    pub fn probe(&self, coord: GlobalCoord) -> Result<Option<T>, SorError> {
        let loc = self.plan.locate_coord(&self.config.domain, coord)?;
        if loc.ordinal != self.slab.ordinal {
            return Ok(None);
        }
        Ok(Some(self.fields.current().get(coord.a1, coord.a2, loc.local)))
    }
}

/// Final state of an in-process run.
#[derive(Debug)]
pub struct LocalRun<T: Scalar> {
    pub partitions: Vec<Partition<T, LocalComm>>,
    pub reports: Vec<RunReport>,
}

impl<T: Scalar> LocalRun<T> {
    /// Value at `coord` from whichever partition owns it.
    pub fn probe(&self, coord: GlobalCoord) -> Result<Option<T>, SorError> {
        for p in &self.partitions {
            if let Some(v) = p.probe(coord)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    /// Longest wall time over all partitions.
    pub fn elapsed(&self) -> Duration {
        self.reports
            .iter()
            .map(|r| r.elapsed)
            .max()
            .unwrap_or_default()
    }

    /// Owned planes of every partition stitched into one padded global field,
    /// indexed `a1 + ext1 * (a2 + ext2 * k)`.
    pub fn gather_global(&self) -> Vec<T> {
        gather_global(&self.partitions)
    }
}

/// Run `config.parts` partitions on scoped threads over a [`LocalComm`] world.
pub fn run_local<T: Scalar>(config: &SolverConfig) -> Result<LocalRun<T>, SorError> {
    run_local_with(config, |_| Ok(()))
}

/// Like [`run_local`], but `init` sees every partition after seeding and
/// before the first sweep, e.g. to impose a non-uniform initial state.
///
/// A failure on any partition aborts the world, so peers blocked on a ghost
/// exchange return [`SorError::Aborted`]. The error reported is the one that
/// caused the abort.
pub fn run_local_with<T, F>(config: &SolverConfig, init: F) -> Result<LocalRun<T>, SorError>
where
    T: Scalar,
    F: Fn(&mut Partition<T, LocalComm>) -> Result<(), SorError> + Sync,
{
    config.validate()?;
    let init = &init;
    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = LocalComm::world(config.parts)
            .into_iter()
            .map(|comm| {
                let config = config.clone();
                s.spawn(move || {
                    let world = comm.clone();
                    let result = (|| -> Result<_, SorError> {
                        let mut part = Partition::<T, _>::new(config, comm)?;
                        init(&mut part)?;
                        let report = part.run()?;
                        Ok((part, report))
                    })();
                    if let Err(e) = &result {
                        if !matches!(e, SorError::Aborted { .. }) {
                            log::error!("[rank {}] {e}", world.rank());
                            world.abort(1);
                        }
                    }
                    result
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });
    let mut run = LocalRun {
        partitions: Vec::with_capacity(results.len()),
        reports: Vec::with_capacity(results.len()),
    };
    let mut aborted = None;
    for result in results {
        match result {
            Ok((part, report)) => {
                run.partitions.push(part);
                run.reports.push(report);
            }
            Err(e @ SorError::Aborted { .. }) => {
                aborted.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    match aborted {
        Some(e) => Err(e),
        None => Ok(run),
    }
}

/// Stitch the owned planes of `partitions` into one global field.
pub fn gather_global<T: Scalar, C: Communicator>(partitions: &[Partition<T, C>]) -> Vec<T> {
    let Some(first) = partitions.first() else {
        return Vec::new();
    };
    let d = first.config.domain;
    let mut out = vec![T::zero(); d.ext1() * d.ext2() * d.global_extent()];
    for p in partitions {
        let current = p.fields.current();
        for l in p.slab.owned_planes() {
            let k = p.slab.offset + l - 1;
            for a2 in 0..d.ext2() {
                for a1 in 0..d.ext1() {
                    out[a1 + d.ext1() * (a2 + d.ext2() * k)] = current.get(a1, a2, l);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;
    use crate::config::DomainConfig;

    #[test]
    fn single_partition_runs_with_no_comm() {
        let cfg = SolverConfig::with_domain(DomainConfig::new(4, 4, 4)).iterations(3);
        let mut p = Partition::<f32, _>::new(cfg, NoComm).unwrap();
        assert!(p.links().is_isolated());
        let report = p.run().unwrap();
        assert_eq!(report.iterations, 3);
        assert_eq!(p.sweeps_done(), 3);
        assert!(p.probe(p.config().probe_coord()).unwrap().is_some());
    }

    #[test]
    fn world_size_must_match_parts() {
        let cfg = SolverConfig::with_domain(DomainConfig::new(4, 4, 4)).parts(2);
        assert!(matches!(
            Partition::<f32, _>::new(cfg, NoComm),
            Err(SorError::WorldSizeMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn only_the_owner_answers_a_probe() {
        let cfg = SolverConfig::with_domain(DomainConfig::new(3, 3, 6))
            .parts(2)
            .iterations(2);
        let run = run_local::<f64>(&cfg).unwrap();
        let coord = GlobalCoord::new(1, 1, 6);
        let answers: Vec<_> = run
            .partitions
            .iter()
            .map(|p| p.probe(coord).unwrap())
            .collect();
        assert!(answers[0].is_none());
        assert!(answers[1].is_some());
        assert_eq!(run.probe(coord).unwrap(), answers[1]);
    }

    #[test]
    fn failing_partition_releases_its_peers() {
        let cfg = SolverConfig::with_domain(DomainConfig::new(3, 3, 8))
            .parts(3)
            .iterations(4);
        let res = run_local_with::<f32, _>(&cfg, |p| {
            if p.slab().ordinal == 1 {
                return Err(SorError::Config("rank 1 failed to start".into()));
            }
            Ok(())
        });
        assert!(matches!(res, Err(SorError::Config(msg)) if msg.contains("rank 1")));
    }
}
