//! The reference scenario: one generator, one conduit, one consumer.
//!
//! S (1000/1000) -- C -- K (0/500), base rate 40, penalty 0.05.
//! Total distance is 2, so every tick moves floor(40 * 0.9) = 36 until K
//! has less than 36 headroom left.

mod common;

use common::*;
use resonance_conduit::ConduitEvent;
use resonance_core::grid::CellGrid;
use resonance_core::test_utils::*;

#[test]
fn sink_fills_to_exactly_capacity_in_fourteen_ticks() {
    init_tracing();
    let mut grid = CellGrid::new();
    let (s, _, k) = straight_link(&mut grid, full_generator(1000), empty_consumer(500), 1);
    let mut module = module_for(&mut grid, rate_40());

    let mut per_tick = Vec::new();
    for _ in 0..14 {
        per_tick.push(transferred(&module.tick(&mut grid)));
    }

    assert_eq!(per_tick[..13], [36; 13]);
    assert_eq!(per_tick[13], 32);
    assert_eq!(stored(&grid, k), 500);
    assert_eq!(stored(&grid, s), 500);

    // K is full: no longer a valid sink.
    for _ in 0..5 {
        assert_eq!(transferred(&module.tick(&mut grid)), 0);
    }
    assert_eq!(stored(&grid, s), 500);
}

#[test]
fn first_tick_state() {
    let mut grid = CellGrid::new();
    let (s, conduits, k) = straight_link(&mut grid, full_generator(1000), empty_consumer(500), 1);
    let mut module = module_for(&mut grid, rate_40());

    let events = module.tick(&mut grid);
    assert_eq!(
        events.last(),
        Some(&ConduitEvent::EnergyTransferred {
            node: conduits[0],
            source: s,
            sink: k,
            amount: 36,
            tick: 1,
        })
    );
    assert_eq!(stored(&grid, s), 964);
    assert_eq!(stored(&grid, k), 36);
}

#[test]
fn full_cache_refresh_does_not_disturb_the_sequence() {
    // A refresh every 3 ticks rebuilds repeatedly without changing amounts.
    let mut grid = CellGrid::new();
    let (_, _, k) = straight_link(&mut grid, full_generator(1000), empty_consumer(500), 1);
    let mut module = module_for(
        &mut grid,
        resonance_conduit::ConduitConfig {
            refresh_interval: 3,
            ..rate_40()
        },
    );

    let mut total_rebuilds = 0;
    for _ in 0..14 {
        let events = module.tick(&mut grid);
        total_rebuilds += rebuilds(&events);
    }
    assert_eq!(stored(&grid, k), 500);
    // Ticks 1, 4, 7, 10, 13.
    assert_eq!(total_rebuilds, 5);
}
