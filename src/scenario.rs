use std::collections::BTreeMap;

use crate::model::{
    AgreementStatus, Building, NationId, ProvinceId, ResourceCatalog, SimTimestamp,
    TradeAgreement, TradeSide, World,
};
use crate::sim::{SimConfig, WeekReport, WeeklySystem, calculate_trade_value, run};

/// Convert a slice of `(resource, amount)` pairs into a ledger bundle.
pub fn bundle(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(resource, amount)| (resource.to_string(), *amount))
        .collect()
}

// -- Builder-style ref types --

/// Typed reference to a nation in a [`Scenario`], enabling chained field
/// mutation. Call [`.id()`](NationRef::id) to terminate the chain.
pub struct NationRef<'a> {
    scenario: &'a mut Scenario,
    id: NationId,
}

impl<'a> NationRef<'a> {
    fn data_mut(&mut self) -> &mut crate::model::Nation {
        self.scenario.world.nation_mut(self.id)
    }

    pub fn stockpile(mut self, resource: &str, v: f64) -> Self {
        self.data_mut().stockpiles.insert(resource.to_string(), v);
        self
    }
    pub fn production(mut self, resource: &str, v: f64) -> Self {
        self.data_mut().production.insert(resource.to_string(), v);
        self
    }
    pub fn consumption(mut self, resource: &str, v: f64) -> Self {
        self.data_mut().consumption.insert(resource.to_string(), v);
        self
    }
    pub fn readiness(mut self, v: f64) -> Self {
        self.data_mut().military.readiness = v;
        self
    }
    pub fn nuclear(mut self, v: bool) -> Self {
        self.data_mut().military.nuclear_capable = v;
        self
    }
    pub fn ai(mut self, v: bool) -> Self {
        self.data_mut().ai_controlled = v;
        self
    }

    /// Escape hatch: apply an arbitrary closure to the nation.
    pub fn with(mut self, f: impl FnOnce(&mut crate::model::Nation)) -> Self {
        f(self.data_mut());
        self
    }

    /// Terminate the chain and return the nation ID.
    pub fn id(self) -> NationId {
        self.id
    }
}

/// Typed reference to a province in a [`Scenario`], enabling chained field
/// mutation. Call [`.id()`](ProvinceRef::id) to terminate the chain.
pub struct ProvinceRef<'a> {
    scenario: &'a mut Scenario,
    id: ProvinceId,
}

impl<'a> ProvinceRef<'a> {
    fn data_mut(&mut self) -> &mut crate::model::Province {
        self.scenario
            .world
            .provinces
            .get_mut(&self.id)
            .expect("province exists")
    }

    pub fn unrest(mut self, v: f64) -> Self {
        self.data_mut().unrest = v;
        self
    }
    pub fn population(mut self, v: i64) -> Self {
        self.data_mut().population = v;
        self
    }
    pub fn building(mut self, kind: &str) -> Self {
        self.data_mut().buildings.push(Building::new(kind));
        self
    }

    /// Escape hatch: apply an arbitrary closure to the province.
    pub fn with(mut self, f: impl FnOnce(&mut crate::model::Province)) -> Self {
        f(self.data_mut());
        self
    }

    /// Terminate the chain and return the province ID.
    pub fn id(self) -> ProvinceId {
        self.id
    }
}

/// Fluent builder for constructing world state.
///
/// Used by tests for deterministic setup; new nations default to
/// AI-controlled with full readiness and an empty ledger.
pub struct Scenario {
    world: World,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Create a new scenario starting at week 0 with the standard catalog.
    pub fn new() -> Self {
        Self::at_week(0)
    }

    /// Create a new scenario starting at the given week.
    pub fn at_week(week: u32) -> Self {
        let mut world = World::new(ResourceCatalog::standard());
        world.current_time = SimTimestamp::from_week(week);
        Self { world }
    }

    /// Create a scenario with a custom catalog, starting at week 0.
    pub fn with_catalog(catalog: ResourceCatalog) -> Self {
        Self {
            world: World::new(catalog),
        }
    }

    // -- Entity creation --

    /// Add a nation with default data.
    pub fn add_nation(&mut self, name: &str) -> NationId {
        self.world.add_nation(name)
    }

    /// Create a nation and return a builder ref for chaining field mutations.
    pub fn nation(&mut self, name: &str) -> NationRef<'_> {
        let id = self.add_nation(name);
        NationRef { scenario: self, id }
    }

    /// Return a builder ref for an existing nation.
    pub fn nation_mut(&mut self, id: NationId) -> NationRef<'_> {
        assert!(
            self.world.nations.contains_key(&id),
            "nation {id} not found"
        );
        NationRef { scenario: self, id }
    }

    /// Add a province with default data.
    pub fn add_province(&mut self, name: &str, owner: NationId) -> ProvinceId {
        self.world.add_province(name, owner)
    }

    /// Create a province and return a builder ref for chaining field mutations.
    pub fn province(&mut self, name: &str, owner: NationId) -> ProvinceRef<'_> {
        let id = self.add_province(name, owner);
        ProvinceRef { scenario: self, id }
    }

    // -- Relationship helpers --

    /// Make two nations allies (bidirectional).
    pub fn make_allies(&mut self, a: NationId, b: NationId) {
        self.world.nation_mut(a).diplomacy.allies.insert(b);
        self.world.nation_mut(b).diplomacy.allies.insert(a);
    }

    /// Make two nations enemies (bidirectional).
    pub fn make_enemies(&mut self, a: NationId, b: NationId) {
        self.world.nation_mut(a).diplomacy.enemies.insert(b);
        self.world.nation_mut(b).diplomacy.enemies.insert(a);
    }

    /// Have `a` embargo `b` (one direction).
    pub fn make_embargo(&mut self, a: NationId, b: NationId) {
        self.world.nation_mut(a).diplomacy.embargoes.insert(b);
    }

    /// Lift an embargo previously placed by `a` on `b`.
    pub fn lift_embargo(&mut self, a: NationId, b: NationId) {
        self.world.nation_mut(a).diplomacy.embargoes.remove(&b);
    }

    // -- Trade helpers --

    /// Add an active agreement where `a` ships `a_exports` and `b` ships
    /// `b_exports` each week, for the given duration.
    pub fn add_agreement(
        &mut self,
        a: NationId,
        b: NationId,
        a_exports: BTreeMap<String, f64>,
        b_exports: BTreeMap<String, f64>,
        weeks: u32,
    ) -> u64 {
        let valuation = calculate_trade_value(&self.world.catalog, &a_exports, &b_exports)
            .expect("agreement resources must be in the catalog");
        let mut terms = BTreeMap::new();
        terms.insert(
            a,
            TradeSide {
                exports: a_exports.clone(),
                imports: b_exports.clone(),
            },
        );
        terms.insert(
            b,
            TradeSide {
                exports: b_exports,
                imports: a_exports,
            },
        );
        let nations = if a < b { (a, b) } else { (b, a) };
        let id = self.world.id_gen.next_id();
        self.world.agreements.insert(
            id,
            TradeAgreement {
                id,
                nations,
                terms,
                weeks_remaining: weeks,
                status: AgreementStatus::Active,
                value: valuation.offering_value,
            },
        );
        id
    }

    // -- Output --

    /// Consume the scenario and return the constructed world.
    pub fn build(self) -> World {
        self.world
    }

    /// Build the world and run the given systems for `weeks` weeks.
    pub fn run(self, systems: &mut [Box<dyn WeeklySystem>], weeks: u32) -> (World, Vec<WeekReport>) {
        let mut world = self.build();
        let reports =
            run(&mut world, systems, &SimConfig::new(weeks)).expect("scenario run failed");
        (world, reports)
    }

    /// Borrow the world for inspection.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Borrow the world mutably for additional modifications.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

// -- Composite scenarios --

pub struct TradePairSetup {
    pub world: World,
    pub exporter: NationId,
    pub importer: NationId,
}

/// Two AI nations with complementary ledgers: the exporter sits on an oil
/// surplus and needs steel, the importer is the mirror image. Tuned so a
/// generated exporter offer values out at fairness 1.0.
pub fn trade_pair_scenario() -> TradePairSetup {
    let mut s = Scenario::new();
    let exporter = s
        .nation("Veldova")
        .stockpile("oil", 180.0)
        .production("oil", 30.0)
        .consumption("oil", 10.0)
        .stockpile("steel", 20.0)
        .consumption("steel", 8.0)
        .id();
    let importer = s
        .nation("Khemsa")
        .stockpile("oil", 30.0)
        .consumption("oil", 10.0)
        .stockpile("steel", 200.0)
        .production("steel", 40.0)
        .consumption("steel", 10.0)
        .id();
    TradePairSetup {
        world: s.build(),
        exporter,
        importer,
    }
}
