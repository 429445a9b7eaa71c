use proptest::prelude::*;
use slab_sor::prelude::*;

proptest! {
    #[test]
    fn owned_extents_sum_to_global(g in 1usize..400, parts_seed in 1usize..400) {
        let parts = 1 + (parts_seed - 1) % g;
        let plan = SlabPlan::new(parts, g).unwrap();
        let owned: Vec<_> = plan.slabs().map(|s| s.owned_extent).collect();
        prop_assert_eq!(owned.iter().sum::<usize>(), g);
        prop_assert!(owned[1..].iter().all(|&n| n == g / parts));
        prop_assert_eq!(owned[0], g / parts + g % parts);
        prop_assert!(plan.slabs().all(|s| s.ghost_extent == s.owned_extent + 2));
        prop_assert!(plan.validate_invariants().is_ok());
    }

    #[test]
    fn locate_round_trips(g in 1usize..300, parts_seed in 1usize..300, k_seed in 0usize..300) {
        let parts = 1 + (parts_seed - 1) % g;
        let k = k_seed % g;
        let plan = SlabPlan::new(parts, g).unwrap();
        let loc = plan.locate(k).unwrap();
        let slab = plan.slab(loc.ordinal).unwrap();
        prop_assert!(slab.owned_planes().contains(&loc.local));
        prop_assert_eq!(plan.offset(loc.ordinal) + loc.local - 1, k);
        prop_assert_eq!(slab.global_index(loc.local), Some(k));
    }

    #[test]
    fn neighbors_are_adjacent_ordinals(parts in 1usize..64, ord_seed in 0usize..64) {
        let ordinal = ord_seed % parts;
        let links = NeighborLinks::new(ordinal, parts);
        prop_assert_eq!(links.down.is_none(), ordinal == 0);
        prop_assert_eq!(links.up.is_none(), ordinal == parts - 1);
        if let Some(up) = links.up {
            prop_assert_eq!(NeighborLinks::new(up, parts).down, Some(ordinal));
        }
    }
}

#[test]
fn every_coordinate_has_exactly_one_owner() {
    let plan = SlabPlan::new(5, 23).unwrap();
    let mut owned = vec![0usize; 23];
    for slab in plan.slabs() {
        for l in slab.owned_planes() {
            owned[slab.global_index(l).unwrap()] += 1;
        }
    }
    assert!(owned.iter().all(|&n| n == 1));
}
