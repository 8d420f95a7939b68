use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub type NationId = u64;

/// Military snapshot consumed and updated by the effect propagator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MilitaryPosture {
    /// Combat readiness, 0–100.
    pub readiness: f64,
    /// Gates uranium-shortage effects.
    #[serde(default)]
    pub nuclear_capable: bool,
}

impl Default for MilitaryPosture {
    fn default() -> Self {
        Self {
            readiness: 100.0,
            nuclear_capable: false,
        }
    }
}

/// Diplomatic stance toward other nations, by nation id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiplomaticRelations {
    #[serde(default)]
    pub allies: BTreeSet<NationId>,
    #[serde(default)]
    pub enemies: BTreeSet<NationId>,
    #[serde(default)]
    pub embargoes: BTreeSet<NationId>,
    #[serde(default)]
    pub sanctions: BTreeSet<NationId>,
}

/// One nation's resource ledger plus the derived state the engine maintains.
///
/// Ledger maps are keyed by resource id. Missing entries mean zero;
/// negative values (possible after external merges) are clamped to zero by
/// the read accessors before any computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    #[serde(default)]
    pub stockpiles: BTreeMap<String, f64>,
    /// Weekly output per resource.
    #[serde(default)]
    pub production: BTreeMap<String, f64>,
    /// Weekly demand per resource.
    #[serde(default)]
    pub consumption: BTreeMap<String, f64>,
    /// Severity (0–1) per resource currently in shortage or critical state.
    /// Rewritten by the shortage system each tick.
    #[serde(default)]
    pub shortages: BTreeMap<String, f64>,
    /// Building-efficiency modifier per resource from the last effect pass.
    #[serde(default)]
    pub resource_efficiency: BTreeMap<String, f64>,
    /// Minimum building-efficiency modifier across the last effect pass.
    #[serde(default = "default_efficiency")]
    pub overall_efficiency: f64,
    #[serde(default)]
    pub military: MilitaryPosture,
    #[serde(default)]
    pub diplomacy: DiplomaticRelations,
    /// Whether the trade system negotiates on this nation's behalf.
    /// The player's nation is the one exception in a normal session.
    #[serde(default = "default_true")]
    pub ai_controlled: bool,
}

fn default_efficiency() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Nation {
    pub fn new(id: NationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            stockpiles: BTreeMap::new(),
            production: BTreeMap::new(),
            consumption: BTreeMap::new(),
            shortages: BTreeMap::new(),
            resource_efficiency: BTreeMap::new(),
            overall_efficiency: 1.0,
            military: MilitaryPosture::default(),
            diplomacy: DiplomaticRelations::default(),
            ai_controlled: true,
        }
    }

    pub fn stockpile(&self, resource: &str) -> f64 {
        clamped(&self.stockpiles, resource)
    }

    pub fn production_of(&self, resource: &str) -> f64 {
        clamped(&self.production, resource)
    }

    pub fn consumption_of(&self, resource: &str) -> f64 {
        clamped(&self.consumption, resource)
    }

    /// Severity of the current shortage for a resource, zero when stable.
    pub fn shortage_severity(&self, resource: &str) -> f64 {
        clamped(&self.shortages, resource)
    }

    /// Every resource id the ledger references, across all three maps.
    pub fn ledger_resources(&self) -> BTreeSet<&str> {
        self.stockpiles
            .keys()
            .chain(self.production.keys())
            .chain(self.consumption.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn is_ally(&self, other: NationId) -> bool {
        self.diplomacy.allies.contains(&other)
    }

    pub fn is_enemy(&self, other: NationId) -> bool {
        self.diplomacy.enemies.contains(&other)
    }

    pub fn embargoes(&self, other: NationId) -> bool {
        self.diplomacy.embargoes.contains(&other)
    }

    /// An embargo in either direction blocks all trade between two nations.
    pub fn trade_blocked_with(&self, other: &Nation) -> bool {
        self.embargoes(other.id) || other.embargoes(self.id)
    }
}

fn clamped(map: &BTreeMap<String, f64>, resource: &str) -> f64 {
    map.get(resource).copied().unwrap_or(0.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_reads_clamp_missing_and_negative() {
        let mut nation = Nation::new(1, "Arvenia");
        nation.stockpiles.insert("steel".to_string(), -5.0);
        assert_eq!(nation.stockpile("steel"), 0.0);
        assert_eq!(nation.stockpile("oil"), 0.0);
    }

    #[test]
    fn embargo_blocks_either_direction() {
        let mut a = Nation::new(1, "A");
        let b = Nation::new(2, "B");
        assert!(!a.trade_blocked_with(&b));
        a.diplomacy.embargoes.insert(2);
        assert!(a.trade_blocked_with(&b));

        let a2 = Nation::new(1, "A");
        let mut b2 = Nation::new(2, "B");
        b2.diplomacy.embargoes.insert(1);
        assert!(a2.trade_blocked_with(&b2));
    }

    #[test]
    fn ledger_resources_unions_all_maps() {
        let mut nation = Nation::new(1, "A");
        nation.stockpiles.insert("steel".to_string(), 1.0);
        nation.production.insert("oil".to_string(), 1.0);
        nation.consumption.insert("food".to_string(), 1.0);
        let resources = nation.ledger_resources();
        assert_eq!(resources.len(), 3);
        assert!(resources.contains("oil"));
    }
}
