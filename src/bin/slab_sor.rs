//! slab_sor [config.json]
//!
//! With `--features mpi-support`, run under `mpirun -n <parts>`; the partition
//! count is taken from the MPI world. Without it, `config.parts` partitions run
//! on threads in this process.
//!
//! Prints the value at the domain centre (from the owning partition only) and
//! the elapsed wall time.

use slab_sor::config::SolverConfig;
use slab_sor::sor_error::SorError;
use std::process;

fn load_config() -> Result<SolverConfig, SorError> {
    match std::env::args().nth(1) {
        Some(path) => SolverConfig::from_json_file(path),
        None => Ok(SolverConfig::default()),
    }
}

#[cfg(feature = "mpi-support")]
fn run(config: SolverConfig) -> Result<(), SorError> {
    use slab_sor::algs::communicator::{Communicator, MpiComm};
    use slab_sor::solver::Partition;

    let comm = MpiComm::new()?;
    let config = SolverConfig {
        parts: comm.size(),
        ..config
    };
    let coord = config.probe_coord();
    let solve = || -> Result<(), SorError> {
        let mut part = Partition::<f32, _>::new(config, &comm)?;
        let report = part.run()?;
        if let Some(value) = part.probe(coord)? {
            println!("{value}");
        }
        println!("Total: {}", report.elapsed.as_secs_f64());
        Ok(())
    };
    if let Err(e) = solve() {
        eprintln!("slab_sor: rank {}: {e}", comm.rank());
        comm.abort(1);
    }
    Ok(())
}

#[cfg(not(feature = "mpi-support"))]
fn run(config: SolverConfig) -> Result<(), SorError> {
    use slab_sor::solver::run_local;

    let run = run_local::<f32>(&config)?;
    if let Some(value) = run.probe(config.probe_coord())? {
        println!("{value}");
    }
    println!("Total: {}", run.elapsed().as_secs_f64());
    Ok(())
}

fn main() {
    if let Err(e) = load_config().and_then(run) {
        eprintln!("slab_sor: {e}");
        process::exit(1);
    }
}
