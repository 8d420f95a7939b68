use serde::Serialize;

use super::EngineError;
use super::context::TickContext;
use super::shortage::{ResourceStatus, analyze_nation};
use super::system::WeeklySystem;

/// Severities at or below this produce no gameplay effect.
pub const EFFECT_SEVERITY_FLOOR: f64 = 0.1;
/// Fraction of the readiness gap closed per tick.
const READINESS_CONVERGENCE: f64 = 0.1;
/// Population changes smaller than one whole unit are dropped.
const POPULATION_GROWTH_SCALE: f64 = 0.01;

/// Gameplay deltas caused by one resource shortage. Multiplier fields are
/// modifiers in [0,1] with per-resource floors; `province_stability` is an
/// additive unrest delta and `population_growth` a signed growth rate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShortageEffect {
    pub resource: String,
    pub severity: f64,
    pub building_efficiency: Option<f64>,
    pub military_readiness: Option<f64>,
    pub province_stability: Option<f64>,
    pub population_growth: Option<f64>,
}

impl ShortageEffect {
    fn new(resource: &str, severity: f64) -> Self {
        Self {
            resource: resource.to_string(),
            severity,
            building_efficiency: None,
            military_readiness: None,
            province_stability: None,
            population_growth: None,
        }
    }
}

/// Map a shortage severity to its gameplay effect.
///
/// Returns `None` for severities at or below the floor, and for uranium
/// when the nation has no nuclear programme to starve.
pub fn shortage_effect(resource: &str, severity: f64, nuclear_capable: bool) -> Option<ShortageEffect> {
    if severity <= EFFECT_SEVERITY_FLOOR {
        return None;
    }
    let s = severity.clamp(0.0, 1.0);
    let mut effect = ShortageEffect::new(resource, s);
    match resource {
        "electricity" => {
            effect.building_efficiency = Some((1.0 - 0.8 * s).max(0.3));
            effect.province_stability = Some(0.5 * s);
        }
        "oil" => {
            effect.military_readiness = Some((1.0 - 0.9 * s).max(0.2));
            effect.building_efficiency = Some((1.0 - 0.5 * s).max(0.5));
        }
        "steel" => {
            effect.building_efficiency = Some((1.0 - 0.8 * s).max(0.2));
            effect.military_readiness = Some((1.0 - 0.6 * s).max(0.4));
        }
        "food" => {
            effect.province_stability = Some(1.5 * s);
            effect.population_growth = Some((-0.02 * s).max(-0.02));
            effect.military_readiness = Some((1.0 - 0.5 * s).max(0.5));
        }
        "consumer_goods" => {
            effect.province_stability = Some(0.8 * s);
            effect.population_growth = Some((1.0 - 0.3 * s).max(0.0));
        }
        "manpower" => {
            effect.military_readiness = Some((1.0 - 0.9 * s).max(0.1));
            effect.building_efficiency = Some((1.0 - 0.4 * s).max(0.6));
        }
        "rare_earth" => {
            effect.building_efficiency = Some((1.0 - 0.6 * s).max(0.4));
        }
        "semiconductors" => {
            effect.building_efficiency = Some((1.0 - 0.7 * s).max(0.3));
        }
        "uranium" => {
            if !nuclear_capable {
                return None;
            }
            effect.military_readiness = Some((1.0 - 0.4 * s).max(0.6));
        }
        _ => {
            effect.building_efficiency = Some((1.0 - 0.5 * s).max(0.5));
        }
    }
    Some(effect)
}

/// Cascades shortage severities into province unrest, population drift,
/// building efficiency, and military readiness. A nation with no
/// qualifying severities is left completely untouched.
pub struct EffectSystem;

impl WeeklySystem for EffectSystem {
    fn name(&self) -> &str {
        "effects"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), EngineError> {
        let ids: Vec<_> = ctx.world.nations.keys().copied().collect();
        for id in ids {
            let nation = ctx.world.nation(id);
            let effects: Vec<ShortageEffect> = analyze_nation(nation)
                .values()
                .filter(|r| {
                    matches!(
                        r.status,
                        ResourceStatus::Shortage | ResourceStatus::Critical
                    )
                })
                .filter_map(|r| {
                    shortage_effect(&r.resource, r.severity, nation.military.nuclear_capable)
                })
                .collect();
            if effects.is_empty() {
                continue;
            }

            // Province-level application.
            let provinces: Vec<_> = ctx
                .world
                .provinces_of(id)
                .map(|p| (p.id, p.unrest, p.population, p.buildings.clone()))
                .collect();
            for (province_id, unrest, population, buildings) in provinces {
                let delta = ctx.stage.province(province_id);

                let mut new_unrest = unrest;
                let mut touched_unrest = false;
                for effect in &effects {
                    if let Some(stability) = effect.province_stability {
                        new_unrest = (new_unrest + stability * effect.severity).min(10.0);
                        touched_unrest = true;
                    }
                }
                if touched_unrest {
                    delta.unrest = Some(new_unrest);
                }

                for effect in &effects {
                    if let Some(growth) = effect.population_growth {
                        let raw = population as f64 * growth * POPULATION_GROWTH_SCALE;
                        if raw.abs() >= 1.0 {
                            delta.population += raw.floor() as i64;
                        }
                    }
                }

                for (index, building) in buildings.iter().enumerate() {
                    let mut efficiency = building.efficiency;
                    let mut touched = false;
                    for effect in &effects {
                        if let Some(modifier) = effect.building_efficiency {
                            efficiency = (efficiency * modifier).min(1.0);
                            touched = true;
                        }
                    }
                    if touched {
                        delta.building_efficiency.push((index, efficiency));
                    }
                }
            }

            // Nation-level application.
            let min_military = effects
                .iter()
                .filter_map(|e| e.military_readiness)
                .fold(None::<f64>, |acc, m| Some(acc.map_or(m, |a| a.min(m))));
            let min_building = effects
                .iter()
                .filter_map(|e| e.building_efficiency)
                .fold(None::<f64>, |acc, m| Some(acc.map_or(m, |a| a.min(m))));

            if let Some(min_military) = min_military {
                let readiness = ctx.world.nation(id).military.readiness;
                let target = 100.0 * min_military;
                ctx.stage.nation(id).readiness =
                    Some(readiness + READINESS_CONVERGENCE * (target - readiness));
            }
            if let Some(min_building) = min_building {
                ctx.stage.nation(id).overall_efficiency = Some(min_building);
            }
            for effect in &effects {
                if let Some(modifier) = effect.building_efficiency {
                    ctx.stage
                        .nation(id)
                        .resource_efficiency
                        .insert(effect.resource.clone(), modifier);
                }
            }

            ctx.stage.effects.insert(id, effects);
        }
        Ok(())
    }
}
