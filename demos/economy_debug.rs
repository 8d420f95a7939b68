use statecraft::model::World;
use statecraft::sim::{SimConfig, default_systems, run};
use statecraft::testutil::random_world;

fn main() {
    let mut world: World = random_world(42, 8);
    let mut systems = default_systems();
    let reports = run(&mut world, &mut systems, &SimConfig::new(52)).expect("run failed");

    // Final ledger health per nation
    for nation in world.nations.values() {
        let shortages = nation.shortages.len();
        let worst = nation
            .shortages
            .values()
            .copied()
            .fold(0.0_f64, f64::max);
        eprintln!(
            "Nation {} ({}): shortages={} worst={:.3} readiness={:.1} efficiency={:.3}",
            nation.id, nation.name, shortages, worst, nation.military.readiness,
            nation.overall_efficiency
        );
    }

    // Trade volume over the run
    let offers_created = world.offers.len();
    let agreements = world.agreements.len();
    let active = world
        .agreements
        .values()
        .filter(|a| a.is_active())
        .count();
    eprintln!("Offers: {offers_created} Agreements: {agreements} (active: {active})");

    // Alert stream
    let total_alerts: usize = reports.iter().map(|r| r.alerts.len()).sum();
    eprintln!("Alerts over {} weeks: {total_alerts}", reports.len());
    for report in &reports {
        for alert in &report.alerts {
            let line = serde_json::to_string(alert).expect("alert serializes");
            println!("{line}");
        }
    }
}
