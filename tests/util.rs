#![allow(dead_code)]
use slab_sor::prelude::*;

pub fn cube(n: usize) -> DomainConfig {
    DomainConfig::new(n, n, n)
}

/// Global field after an in-process run with `parts` partitions.
pub fn decomposed(cfg: &SolverConfig, parts: usize) -> Vec<f32> {
    let cfg = cfg.clone().parts(parts);
    run_local::<f32>(&cfg)
        .expect("local run failed")
        .gather_global()
}

/// Global field from the serial reference solver.
pub fn reference(cfg: &SolverConfig) -> Vec<f32> {
    let mut r = ReferenceSolver::<f32>::new(cfg.clone()).expect("reference setup failed");
    r.run();
    r.current().to_vec()
}

/// Flat index in the gathered global layout.
pub fn gidx(d: &DomainConfig, a1: usize, a2: usize, k: usize) -> usize {
    a1 + d.ext1() * (a2 + d.ext2() * k)
}
