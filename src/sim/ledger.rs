use super::EngineError;
use super::context::TickContext;
use super::system::WeeklySystem;

/// Weekly production and consumption pass.
///
/// Stages `production - consumption` for every resource a nation's ledger
/// references. Runs first so that every later system sees this week's
/// throughput in the staged balance. Overdraw is allowed here; the commit
/// floors stockpiles at zero.
pub struct LedgerSystem;

impl WeeklySystem for LedgerSystem {
    fn name(&self) -> &str {
        "ledger"
    }

    fn tick(&mut self, ctx: &mut TickContext) -> Result<(), EngineError> {
        let ids: Vec<_> = ctx.world.nations.keys().copied().collect();
        for id in ids {
            let nation = ctx.world.nation(id);
            let deltas: Vec<(String, f64)> = nation
                .ledger_resources()
                .into_iter()
                .map(|resource| {
                    let net = nation.production_of(resource) - nation.consumption_of(resource);
                    (resource.to_string(), net)
                })
                .filter(|(_, net)| *net != 0.0)
                .collect();
            for (resource, net) in deltas {
                ctx.stage.add_stock(id, &resource, net);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResourceCatalog, World};
    use crate::sim::TickStage;

    #[test]
    fn stages_net_production() {
        let mut world = World::new(ResourceCatalog::standard());
        let id = world.add_nation("Arvenia");
        let nation = world.nation_mut(id);
        nation.stockpiles.insert("steel".to_string(), 100.0);
        nation.production.insert("steel".to_string(), 12.0);
        nation.consumption.insert("steel".to_string(), 10.0);
        nation.consumption.insert("food".to_string(), 5.0);

        let mut stage = TickStage::default();
        let mut signals = Vec::new();
        let mut ctx = TickContext {
            world: &mut world,
            stage: &mut stage,
            signals: &mut signals,
            inbox: &[],
        };
        LedgerSystem.tick(&mut ctx).unwrap();

        assert_eq!(stage.nations[&id].stockpiles["steel"], 2.0);
        assert_eq!(stage.nations[&id].stockpiles["food"], -5.0);

        stage.commit(&mut world);
        assert_eq!(world.nation(id).stockpile("steel"), 102.0);
        // Nothing stocked, commit floors at zero.
        assert_eq!(world.nation(id).stockpile("food"), 0.0);
    }
}
