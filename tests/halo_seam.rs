mod util;
use util::*;

use slab_sor::prelude::*;
use std::thread;

/// Fill each partition's owned planes with `global k + 100 * a1 + 1000 * a2`,
/// exchange once, and return `(slab, plane 0, plane ghost-1, plane 1, plane ghost-2)`.
fn exchange_once(cfg: SolverConfig) -> Vec<(Slab, [Vec<f64>; 4])> {
    let handles: Vec<_> = LocalComm::world(cfg.parts)
        .into_iter()
        .map(|comm| {
            let cfg = cfg.clone();
            thread::spawn(move || {
                let mut p = Partition::<f64, _>::new(cfg, comm).unwrap();
                let slab = *p.slab();
                let d = p.config().domain;
                let cur = p.fields_mut().current_mut();
                for l in slab.owned_planes() {
                    let k = slab.offset + l - 1;
                    for a2 in 0..d.ext2() {
                        for a1 in 0..d.ext1() {
                            cur.set(a1, a2, l, (k + 100 * a1 + 1000 * a2) as f64);
                        }
                    }
                }
                p.exchange().unwrap();
                let cur = p.fields().current();
                let g = slab.ghost_extent;
                let planes = [0, g - 1, 1, g - 2].map(|l| cur.plane(l).unwrap());
                (slab, planes)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn two_partitions_see_each_others_interior_planes() {
    let out = exchange_once(SolverConfig::with_domain(cube(4)).parts(2));
    let (s0, p0) = &out[0];
    let (s1, p1) = &out[1];
    // partition 0's upper ghost is partition 1's first owned plane and vice versa
    assert_eq!(p0[1], p1[2]);
    assert_eq!(p1[0], p0[3]);
    // seam ghosts carry the neighbour's global k
    assert_eq!(p0[1][0], (s1.offset) as f64);
    assert_eq!(p1[0][0], (s0.offset + s0.owned_extent - 1) as f64);
    // global-edge ghosts keep their seed
    assert!(p0[0].iter().all(|&v| v == 1.0));
    assert!(p1[1].iter().all(|&v| v == 1.0));
}

#[test]
fn middle_partition_exchanges_both_sides() {
    let out = exchange_once(SolverConfig::with_domain(DomainConfig::new(2, 3, 9)).parts(3));
    for pair in out.windows(2) {
        let (_, lower) = &pair[0];
        let (_, upper) = &pair[1];
        assert_eq!(lower[1], upper[2]);
        assert_eq!(upper[0], lower[3]);
    }
}

#[test]
fn single_partition_exchange_is_a_no_op() {
    let mut p = Partition::<f32, _>::new(SolverConfig::with_domain(cube(3)), NoComm).unwrap();
    let before = p.fields().current().as_slice().to_vec();
    let stats = p.exchange().unwrap();
    assert_eq!((stats.sent_planes, stats.received_planes), (0, 0));
    assert_eq!(p.fields().current().as_slice(), &before[..]);
}
