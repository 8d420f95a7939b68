use statecraft::model::AgreementStatus;
use statecraft::scenario::{Scenario, bundle};
use statecraft::sim::{SignalKind, SimConfig, default_systems, dispatch_week, run};
use statecraft::testutil::has_signal;

fn barter_scenario() -> (Scenario, u64, u64) {
    let mut s = Scenario::new();
    let a = s
        .nation("Arvenia")
        .stockpile("steel", 100.0)
        .stockpile("oil", 0.0)
        .ai(false)
        .id();
    let b = s
        .nation("Borland")
        .stockpile("oil", 50.0)
        .ai(false)
        .id();
    (s, a, b)
}

#[test]
fn weekly_settlement_moves_both_sides() {
    let (mut s, a, b) = barter_scenario();
    let id = s.add_agreement(a, b, bundle(&[("steel", 10.0)]), bundle(&[("oil", 5.0)]), 10);
    let mut world = s.build();

    let mut systems = default_systems();
    let report = dispatch_week(&mut world, &mut systems).unwrap();

    assert_eq!(world.nation(a).stockpile("steel"), 90.0);
    assert_eq!(world.nation(a).stockpile("oil"), 5.0);
    assert_eq!(world.nation(b).stockpile("steel"), 10.0);
    assert_eq!(world.nation(b).stockpile("oil"), 45.0);
    assert_eq!(world.agreements[&id].weeks_remaining, 9);
    assert!(has_signal(
        &report.signals,
        |k| matches!(k, SignalKind::AgreementExecuted { agreement_id, .. } if *agreement_id == id)
    ));
}

#[test]
fn failed_transfer_moves_nothing_for_either_party() {
    let mut s = Scenario::new();
    // Exporter short by 6 steel; counterpart fully stocked.
    let a = s.nation("Arvenia").stockpile("steel", 4.0).ai(false).id();
    let b = s.nation("Borland").stockpile("oil", 50.0).ai(false).id();
    let id = s.add_agreement(a, b, bundle(&[("steel", 10.0)]), bundle(&[("oil", 5.0)]), 10);
    let mut world = s.build();

    let mut systems = default_systems();
    let report = dispatch_week(&mut world, &mut systems).unwrap();

    // No partial commit: both ledgers exactly as before.
    assert_eq!(world.nation(a).stockpile("steel"), 4.0);
    assert_eq!(world.nation(a).stockpile("oil"), 0.0);
    assert_eq!(world.nation(b).stockpile("oil"), 50.0);
    assert_eq!(world.nation(b).stockpile("steel"), 0.0);
    assert!(has_signal(&report.signals, |k| matches!(
        k,
        SignalKind::TransferFailed { agreement_id, nation, missing }
            if *agreement_id == id && *nation == a && missing == &[("steel".to_string(), 6.0)]
    )));
    // The clock still ran.
    assert_eq!(world.agreements[&id].weeks_remaining, 9);
}

#[test]
fn embargo_suspends_without_countdown() {
    let (mut s, a, b) = barter_scenario();
    let id = s.add_agreement(a, b, bundle(&[("steel", 10.0)]), bundle(&[("oil", 5.0)]), 10);
    s.make_embargo(a, b);
    let mut world = s.build();

    let mut systems = default_systems();
    let report = dispatch_week(&mut world, &mut systems).unwrap();

    assert_eq!(world.agreements[&id].status, AgreementStatus::Suspended);
    assert_eq!(world.agreements[&id].weeks_remaining, 10);
    assert_eq!(world.nation(a).stockpile("steel"), 100.0);
    assert_eq!(world.nation(b).stockpile("oil"), 50.0);
    assert!(has_signal(
        &report.signals,
        |k| matches!(k, SignalKind::AgreementSuspended { agreement_id, .. } if *agreement_id == id)
    ));
}

#[test]
fn lifted_embargo_resumes_settlement() {
    let (mut s, a, b) = barter_scenario();
    let id = s.add_agreement(a, b, bundle(&[("steel", 10.0)]), bundle(&[("oil", 5.0)]), 10);
    s.make_embargo(a, b);
    let mut world = s.build();
    let mut systems = default_systems();

    dispatch_week(&mut world, &mut systems).unwrap();
    assert_eq!(world.agreements[&id].status, AgreementStatus::Suspended);

    world.nation_mut(a).diplomacy.embargoes.remove(&b);
    let report = dispatch_week(&mut world, &mut systems).unwrap();

    assert_eq!(world.agreements[&id].status, AgreementStatus::Active);
    assert_eq!(world.agreements[&id].weeks_remaining, 9);
    assert_eq!(world.nation(a).stockpile("steel"), 90.0);
    assert!(has_signal(
        &report.signals,
        |k| matches!(k, SignalKind::AgreementResumed { agreement_id } if *agreement_id == id)
    ));
}

#[test]
fn agreement_expires_when_weeks_run_out() {
    let (mut s, a, b) = barter_scenario();
    let id = s.add_agreement(a, b, bundle(&[("steel", 10.0)]), bundle(&[("oil", 5.0)]), 2);
    let mut world = s.build();

    let mut systems = default_systems();
    let reports = run(&mut world, &mut systems, &SimConfig::new(3)).unwrap();

    assert_eq!(world.agreements[&id].status, AgreementStatus::Expired);
    // Two settlements happened, then nothing.
    assert_eq!(world.nation(a).stockpile("steel"), 80.0);
    assert_eq!(world.nation(b).stockpile("oil"), 40.0);
    assert!(has_signal(
        &reports[1].signals,
        |k| matches!(k, SignalKind::AgreementExpired { agreement_id } if *agreement_id == id)
    ));
    assert!(!has_signal(&reports[2].signals, |k| matches!(
        k,
        SignalKind::AgreementExecuted { .. }
    )));
}
