use std::collections::BTreeMap;

use serde::Serialize;

use super::alerts::AlertDecision;
use super::effects::ShortageEffect;
use crate::model::{NationId, ProvinceId, World};

/// Staged changes to one nation, merged into the record at commit.
///
/// Stockpile entries are additive deltas; the remaining fields are absolute
/// replacement values (the effect pass computes final values, not diffs).
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NationDelta {
    pub stockpiles: BTreeMap<String, f64>,
    pub readiness: Option<f64>,
    pub overall_efficiency: Option<f64>,
    pub resource_efficiency: BTreeMap<String, f64>,
    pub shortages: Option<BTreeMap<String, f64>>,
}

impl NationDelta {
    pub fn is_empty(&self) -> bool {
        self.stockpiles.is_empty()
            && self.readiness.is_none()
            && self.overall_efficiency.is_none()
            && self.resource_efficiency.is_empty()
            && self.shortages.is_none()
    }
}

/// Staged changes to one province. `population` is an additive delta,
/// `unrest` a replacement value, `building_efficiency` replacement values
/// keyed by building index.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProvinceDelta {
    pub unrest: Option<f64>,
    pub population: i64,
    pub building_efficiency: Vec<(usize, f64)>,
}

/// All deltas computed within one tick, committed atomically at its end.
///
/// Systems never write stockpiles or effect outcomes to the world directly;
/// they stage them here. `stocked` exposes the effective stockpile (base
/// plus staged delta) so that settlements later in the same tick see the
/// movements of earlier ones and can never overdraw.
#[derive(Debug, Default)]
pub struct TickStage {
    pub nations: BTreeMap<NationId, NationDelta>,
    pub provinces: BTreeMap<ProvinceId, ProvinceDelta>,
    /// Shortage effects computed this tick, per nation, for the caller.
    pub effects: BTreeMap<NationId, Vec<ShortageEffect>>,
    /// Alert decisions queued this tick for the presentation layer.
    pub alerts: Vec<AlertDecision>,
}

impl TickStage {
    pub fn nation(&mut self, id: NationId) -> &mut NationDelta {
        self.nations.entry(id).or_default()
    }

    pub fn province(&mut self, id: ProvinceId) -> &mut ProvinceDelta {
        self.provinces.entry(id).or_default()
    }

    pub fn add_stock(&mut self, nation: NationId, resource: &str, delta: f64) {
        *self
            .nation(nation)
            .stockpiles
            .entry(resource.to_string())
            .or_insert(0.0) += delta;
    }

    /// Effective stockpile: clamped ledger value plus staged delta.
    pub fn stocked(&self, world: &World, nation: NationId, resource: &str) -> f64 {
        let base = world.nation(nation).stockpile(resource);
        let staged = self
            .nations
            .get(&nation)
            .and_then(|d| d.stockpiles.get(resource))
            .copied()
            .unwrap_or(0.0);
        base + staged
    }

    /// Merge every staged delta into the world. Stockpiles floor at zero:
    /// transfer feasibility is checked before staging, so only consumption
    /// overdraw (a ledger running dry) can hit the floor.
    pub fn commit(&self, world: &mut World) {
        for (&id, delta) in &self.nations {
            let nation = world.nation_mut(id);
            for (resource, change) in &delta.stockpiles {
                let updated = (nation.stockpile(resource) + change).max(0.0);
                nation.stockpiles.insert(resource.clone(), updated);
            }
            if let Some(readiness) = delta.readiness {
                nation.military.readiness = readiness.clamp(0.0, 100.0);
            }
            if let Some(overall) = delta.overall_efficiency {
                nation.overall_efficiency = overall.clamp(0.0, 1.0);
            }
            for (resource, modifier) in &delta.resource_efficiency {
                nation
                    .resource_efficiency
                    .insert(resource.clone(), modifier.clamp(0.0, 1.0));
            }
            if let Some(shortages) = &delta.shortages {
                nation.shortages = shortages.clone();
            }
        }
        for (&id, delta) in &self.provinces {
            let Some(province) = world.provinces.get_mut(&id) else {
                continue;
            };
            if let Some(unrest) = delta.unrest {
                province.unrest = unrest.clamp(0.0, 10.0);
            }
            province.population = (province.population + delta.population).max(0);
            for &(index, efficiency) in &delta.building_efficiency {
                if let Some(building) = province.buildings.get_mut(index) {
                    building.efficiency = efficiency.clamp(0.0, 1.0);
                }
            }
        }
    }
}
