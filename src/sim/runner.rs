use std::collections::BTreeMap;

use serde::Serialize;

use super::EngineError;
use super::agreements::AgreementSystem;
use super::alerts::{AlertDecision, AlertSystem};
use super::context::TickContext;
use super::effects::{EffectSystem, ShortageEffect};
use super::ledger::LedgerSystem;
use super::shortage::ShortageSystem;
use super::signal::Signal;
use super::stage::{NationDelta, ProvinceDelta, TickStage};
use super::system::WeeklySystem;
use super::trade::TradeSystem;
use crate::model::{DAYS_PER_WEEK, NationId, ProvinceId, World};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub weeks: u32,
}

impl SimConfig {
    pub fn new(weeks: u32) -> Self {
        Self { weeks }
    }
}

/// Everything that happened in one week, for export and inspection.
#[derive(Debug, Clone, Serialize)]
pub struct WeekReport {
    pub week: u32,
    pub nations: BTreeMap<NationId, NationDelta>,
    pub provinces: BTreeMap<ProvinceId, ProvinceDelta>,
    pub effects: BTreeMap<NationId, Vec<ShortageEffect>>,
    pub alerts: Vec<AlertDecision>,
    pub signals: Vec<Signal>,
}

/// The standard weekly pipeline, in execution order.
pub fn default_systems() -> Vec<Box<dyn WeeklySystem>> {
    vec![
        Box::new(LedgerSystem),
        Box::new(ShortageSystem),
        Box::new(EffectSystem),
        Box::new(TradeSystem),
        Box::new(AgreementSystem),
        Box::new(AlertSystem::new()),
    ]
}

/// Run one week over the given systems and commit the staged result.
///
/// Two phases: every system ticks in order and may raise signals, then, if
/// any were raised, every system sees the full batch once. Signals raised
/// while handling signals are dropped; reactions that need another pass
/// belong in the next week's tick.
pub fn dispatch_week(
    world: &mut World,
    systems: &mut [Box<dyn WeeklySystem>],
) -> Result<WeekReport, EngineError> {
    let week = world.current_time.week();
    let mut stage = TickStage::default();
    let mut signals: Vec<Signal> = Vec::new();

    for system in systems.iter_mut() {
        let span = tracing::debug_span!("tick", week, system = system.name());
        let _guard = span.enter();
        let mut ctx = TickContext {
            world,
            stage: &mut stage,
            signals: &mut signals,
            inbox: &[],
        };
        system.tick(&mut ctx)?;
    }

    if !signals.is_empty() {
        let mut discarded: Vec<Signal> = Vec::new();
        for system in systems.iter_mut() {
            let mut ctx = TickContext {
                world,
                stage: &mut stage,
                signals: &mut discarded,
                inbox: &signals,
            };
            system.handle_signals(&mut ctx)?;
        }
        if !discarded.is_empty() {
            tracing::debug!(count = discarded.len(), "signals raised during delivery dropped");
        }
    }

    stage.commit(world);
    Ok(WeekReport {
        week,
        nations: stage.nations,
        provinces: stage.provinces,
        effects: stage.effects,
        alerts: stage.alerts,
        signals,
    })
}

/// Validate the world, then run the configured number of weeks, advancing
/// the clock seven days after each.
pub fn run(
    world: &mut World,
    systems: &mut [Box<dyn WeeklySystem>],
    config: &SimConfig,
) -> Result<Vec<WeekReport>, EngineError> {
    world.validate()?;
    let mut reports = Vec::with_capacity(config.weeks as usize);
    for _ in 0..config.weeks {
        let report = dispatch_week(world, systems)?;
        tracing::debug!(
            week = report.week,
            alerts = report.alerts.len(),
            signals = report.signals.len(),
            "week complete"
        );
        reports.push(report);
        world.current_time = world.current_time.plus_days(DAYS_PER_WEEK);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceCatalog;

    #[test]
    fn dispatch_advances_nothing_on_empty_world() {
        let mut world = World::new(ResourceCatalog::standard());
        let mut systems = default_systems();
        let report = dispatch_week(&mut world, &mut systems).unwrap();
        assert!(report.nations.is_empty());
        assert!(report.alerts.is_empty());
        assert!(report.signals.is_empty());
    }

    #[test]
    fn run_advances_the_clock_weekly() {
        let mut world = World::new(ResourceCatalog::standard());
        let mut systems = default_systems();
        let reports = run(&mut world, &mut systems, &SimConfig::new(3)).unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(
            reports.iter().map(|r| r.week).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(world.current_time.week(), 3);
    }
}
