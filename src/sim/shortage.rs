use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::EngineError;
use super::context::TickContext;
use super::signal::{Signal, SignalKind};
use super::system::WeeklySystem;
use crate::model::Nation;

/// Below this many weeks of supply a resource is critical.
pub const CRITICAL_WEEKS: f64 = 2.0;
/// Below this many weeks of supply (and above critical) a resource is short.
pub const SHORTAGE_WEEKS: f64 = 8.0;
/// Net production must exceed this share of consumption to count as surplus.
pub const SURPLUS_NET_RATIO: f64 = 0.3;
/// Stockpile must cover this many weeks of consumption to count as surplus.
pub const SURPLUS_STOCK_WEEKS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Stable,
    Shortage,
    Critical,
    Surplus,
}

/// Derived supply status for one resource of one nation. Pure data; the
/// analyzer never touches the world.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShortageReport {
    pub resource: String,
    pub status: ResourceStatus,
    /// Normalized 0–1. How critically stock fails to cover consumption,
    /// or for surpluses, how far net production outruns demand.
    pub severity: f64,
    /// Stockpile divided by weekly consumption; infinite when nothing is
    /// consumed.
    pub weeks_of_supply: f64,
    /// Weekly production minus weekly consumption.
    pub net: f64,
}

/// Analyze one resource from a nation's ledger. Negative and missing ledger
/// values count as zero.
pub fn analyze_resource(nation: &Nation, resource: &str) -> ShortageReport {
    let stockpile = nation.stockpile(resource);
    let production = nation.production_of(resource);
    let consumption = nation.consumption_of(resource);
    let net = production - consumption;

    if consumption <= 0.0 {
        // Nothing consumed: never short, and surplus is meaningless.
        return ShortageReport {
            resource: resource.to_string(),
            status: ResourceStatus::Stable,
            severity: 0.0,
            weeks_of_supply: f64::INFINITY,
            net,
        };
    }

    let weeks_of_supply = stockpile / consumption;
    let (status, severity) = if weeks_of_supply < CRITICAL_WEEKS {
        (
            ResourceStatus::Critical,
            1.0 - weeks_of_supply / CRITICAL_WEEKS,
        )
    } else if weeks_of_supply < SHORTAGE_WEEKS {
        (
            ResourceStatus::Shortage,
            1.0 - weeks_of_supply / SHORTAGE_WEEKS,
        )
    } else if net > SURPLUS_NET_RATIO * consumption && stockpile > SURPLUS_STOCK_WEEKS * consumption
    {
        (ResourceStatus::Surplus, (net / consumption).min(1.0))
    } else {
        (ResourceStatus::Stable, 0.0)
    };

    ShortageReport {
        resource: resource.to_string(),
        status,
        severity: severity.clamp(0.0, 1.0),
        weeks_of_supply,
        net,
    }
}

/// Analyze every resource a nation's ledger references.
pub fn analyze_nation(nation: &Nation) -> BTreeMap<String, ShortageReport> {
    nation
        .ledger_resources()
        .into_iter()
        .map(|resource| (resource.to_string(), analyze_resource(nation, resource)))
        .collect()
}

/// Rewrites each nation's shortage map from the current ledger and raises
/// critical-shortage signals. Runs before the effect and trade passes so
/// their consumers see this week's severities once committed.
pub struct ShortageSystem;

impl WeeklySystem for ShortageSystem {
    fn name(&self) -> &str {
        "shortage"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), EngineError> {
        let week = ctx.world.current_time.week();
        let ids: Vec<_> = ctx.world.nations.keys().copied().collect();
        for id in ids {
            let reports = analyze_nation(ctx.world.nation(id));
            let mut shortages = BTreeMap::new();
            for report in reports.values() {
                match report.status {
                    ResourceStatus::Shortage | ResourceStatus::Critical => {
                        shortages.insert(report.resource.clone(), report.severity);
                    }
                    ResourceStatus::Stable | ResourceStatus::Surplus => {}
                }
                if report.status == ResourceStatus::Critical {
                    ctx.signals.push(Signal {
                        week,
                        kind: SignalKind::ShortageCritical {
                            nation: id,
                            resource: report.resource.clone(),
                            severity: report.severity,
                        },
                    });
                }
            }
            ctx.stage.nation(id).shortages = Some(shortages);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nation_with(stockpile: f64, production: f64, consumption: f64) -> Nation {
        let mut nation = Nation::new(1, "Test");
        nation.stockpiles.insert("steel".to_string(), stockpile);
        nation.production.insert("steel".to_string(), production);
        nation
            .consumption
            .insert("steel".to_string(), consumption);
        nation
    }

    #[test]
    fn zero_consumption_is_stable_regardless_of_stockpile() {
        let report = analyze_resource(&nation_with(1_000_000.0, 50.0, 0.0), "steel");
        assert_eq!(report.status, ResourceStatus::Stable);
        assert_eq!(report.severity, 0.0);
        assert!(report.weeks_of_supply.is_infinite());
    }

    #[test]
    fn one_week_of_supply_is_critical_at_half_severity() {
        let report = analyze_resource(&nation_with(10.0, 0.0, 10.0), "steel");
        assert_eq!(report.status, ResourceStatus::Critical);
        assert!((report.severity - 0.5).abs() < 1e-9);
        assert!((report.weeks_of_supply - 1.0).abs() < 1e-9);
    }

    #[test]
    fn four_weeks_of_supply_is_shortage() {
        let report = analyze_resource(&nation_with(40.0, 0.0, 10.0), "steel");
        assert_eq!(report.status, ResourceStatus::Shortage);
        assert!((report.severity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn high_net_but_thin_stockpile_is_not_surplus() {
        // net = 5 = 0.5·consumption, but stockpile 100 ≤ 12·10.
        let report = analyze_resource(&nation_with(100.0, 15.0, 10.0), "steel");
        assert_eq!(report.status, ResourceStatus::Stable);
        assert_eq!(report.severity, 0.0);
        assert!((report.weeks_of_supply - 10.0).abs() < 1e-9);
    }

    #[test]
    fn deep_stockpile_and_net_is_surplus() {
        let report = analyze_resource(&nation_with(200.0, 15.0, 10.0), "steel");
        assert_eq!(report.status, ResourceStatus::Surplus);
        assert!((report.severity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn surplus_severity_caps_at_one() {
        let report = analyze_resource(&nation_with(500.0, 40.0, 10.0), "steel");
        assert_eq!(report.status, ResourceStatus::Surplus);
        assert_eq!(report.severity, 1.0);
    }

    #[test]
    fn negative_ledger_values_clamp_to_zero() {
        let report = analyze_resource(&nation_with(-20.0, 0.0, 10.0), "steel");
        assert_eq!(report.status, ResourceStatus::Critical);
        assert_eq!(report.severity, 1.0);
    }

    #[test]
    fn severity_always_in_unit_range() {
        for stockpile in [0.0, 1.0, 10.0, 100.0, 1000.0] {
            for production in [0.0, 5.0, 50.0] {
                for consumption in [0.0, 3.0, 30.0] {
                    let report =
                        analyze_resource(&nation_with(stockpile, production, consumption), "steel");
                    assert!((0.0..=1.0).contains(&report.severity));
                }
            }
        }
    }
}
