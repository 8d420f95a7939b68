use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::model::{NationId, ResourceCatalog, World};
use crate::sim::{Signal, SignalKind, TickContext, TickStage, WeeklySystem};

// ---------------------------------------------------------------------------
// Tick execution helpers
// ---------------------------------------------------------------------------

/// Run a single system tick without committing. Returns the stage and the
/// emitted signals so tests can inspect deltas before they land.
pub fn tick_system(world: &mut World, system: &mut dyn WeeklySystem) -> (TickStage, Vec<Signal>) {
    let mut stage = TickStage::default();
    let mut signals = Vec::new();
    let mut ctx = TickContext {
        world,
        stage: &mut stage,
        signals: &mut signals,
        inbox: &[],
    };
    system.tick(&mut ctx).expect("tick failed");
    (stage, signals)
}

/// Run a single system tick and commit the stage. Returns emitted signals.
pub fn tick_and_commit(world: &mut World, system: &mut dyn WeeklySystem) -> Vec<Signal> {
    let (stage, signals) = tick_system(world, system);
    stage.commit(world);
    signals
}

/// Run a system's handle_signals with the given inbox. Returns the stage so
/// tests can inspect queued alerts; reaction signals are dropped, as in the
/// full dispatch.
pub fn deliver_signals(
    world: &mut World,
    system: &mut dyn WeeklySystem,
    inbox: &[Signal],
) -> TickStage {
    let mut stage = TickStage::default();
    let mut dropped = Vec::new();
    let mut ctx = TickContext {
        world,
        stage: &mut stage,
        signals: &mut dropped,
        inbox,
    };
    system.handle_signals(&mut ctx).expect("handle_signals failed");
    stage
}

// ---------------------------------------------------------------------------
// Signal helpers
// ---------------------------------------------------------------------------

/// Check if any signal matches the predicate.
pub fn has_signal(signals: &[Signal], predicate: impl Fn(&SignalKind) -> bool) -> bool {
    signals.iter().any(|s| predicate(&s.kind))
}

/// Count signals matching the predicate.
pub fn count_signals(signals: &[Signal], predicate: impl Fn(&SignalKind) -> bool) -> usize {
    signals.iter().filter(|s| predicate(&s.kind)).count()
}

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

/// Assert a float is approximately equal, with a named context message.
pub fn assert_approx(actual: f64, expected: f64, tolerance: f64, msg: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{msg}: expected ~{expected} (+-{tolerance}), got {actual}"
    );
}

// ---------------------------------------------------------------------------
// World fabrication
// ---------------------------------------------------------------------------

/// Build a world of `nations` AI nations with randomized but internally
/// consistent ledgers over the standard catalog. Deterministic per seed.
pub fn random_world(seed: u64, nations: usize) -> World {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut world = World::new(ResourceCatalog::standard());
    let resources: Vec<String> = world.catalog.ids().map(str::to_string).collect();

    for i in 0..nations {
        let id = world.add_nation(format!("Nation {i}"));
        let province = world.add_province(format!("Province {i}"), id);
        world
            .provinces
            .get_mut(&province)
            .expect("province just added")
            .population = rng.random_range(100_000..10_000_000);

        let nation = world.nation_mut(id);
        for resource in &resources {
            let consumption = rng.random_range(1.0..50.0);
            let production = consumption * rng.random_range(0.5..2.0);
            let weeks = rng.random_range(1.0..30.0);
            nation.consumption.insert(resource.clone(), consumption);
            nation.production.insert(resource.clone(), production);
            nation
                .stockpiles
                .insert(resource.clone(), consumption * weeks);
        }
    }
    world
}

/// IDs paired with [`random_world`] output for convenience.
pub fn random_world_ids(seed: u64, nations: usize) -> (World, Vec<NationId>) {
    let world = random_world(seed, nations);
    let ids = world.nations.keys().copied().collect();
    (world, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_world_is_deterministic() {
        let a = random_world(7, 4);
        let b = random_world(7, 4);
        assert_eq!(a.nations.len(), 4);
        for (id, nation) in &a.nations {
            assert_eq!(nation.stockpiles, b.nations[id].stockpiles);
        }
    }
}
