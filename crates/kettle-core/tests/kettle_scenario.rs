//! End-to-end kettle sessions against a file-backed message store.

use kettle_core::{
    ConsoleNotifier, Database, Kettle, KettleSpec, KettleState, PourOutcome, TurnOnOutcome,
    AMBIENT_TEMP,
};

fn open_kettle(
    dir: &tempfile::TempDir,
    spec: KettleSpec,
) -> Kettle<ConsoleNotifier<Vec<u8>>, Database> {
    let db = Database::open_at(&dir.path().join("kettle_logs.sqlite")).unwrap();
    Kettle::new(spec, ConsoleNotifier::new(Vec::new()), db)
}

fn output(kettle: &Kettle<ConsoleNotifier<Vec<u8>>, Database>) -> Vec<String> {
    String::from_utf8(kettle.notifier().get_ref().clone())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_half_litre_boil_session() {
    let dir = tempfile::tempdir().unwrap();
    let spec = KettleSpec::new(100.0, 1.0, 5).unwrap();
    let mut kettle = open_kettle(&dir, spec);

    assert_eq!(
        kettle.pour_water_input("0.5").unwrap(),
        PourOutcome::Accepted { total: 0.5 }
    );
    assert_eq!(kettle.pour_water_input("0.6").unwrap(), PourOutcome::Rejected);
    assert_eq!(kettle.water_amount(), 0.5);

    assert_eq!(kettle.turn_on(), TurnOnOutcome::Cycled { steps: 5 });
    assert_eq!(kettle.water_amount(), 0.0);
    assert_eq!(kettle.current_temp(), AMBIENT_TEMP);
    assert_eq!(kettle.state(), KettleState::Idle);

    assert_eq!(
        output(&kettle),
        vec![
            "There is 0.5 l of water in the kettle.",
            "Too much water.",
            "Kettle is on.",
            "Temperature: 24.0",
            "Temperature: 39.2",
            "Temperature: 54.4",
            "Temperature: 69.6",
            "Temperature: 84.8",
            "Kettle has boiled.",
            "Kettle used. Water is used up.",
        ]
    );

    // The rejection is shown but not stored.
    let stored = kettle.recorder().messages(None).unwrap();
    assert_eq!(stored.len(), 9);
    assert_eq!(stored[0].message, "Kettle used. Water is used up.");
    assert_eq!(stored[8].message, "There is 0.5 l of water in the kettle.");
    assert!(stored
        .iter()
        .all(|row| row.date.as_deref().map(str::len) == Some(19)));
}

#[test]
fn test_turn_off_after_pour_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut kettle = open_kettle(&dir, KettleSpec::default());
    kettle.pour_water(0.3).unwrap();
    assert!(kettle.turn_off().is_break());
    assert_eq!(kettle.water_amount(), 0.3);
    assert_eq!(kettle.state(), KettleState::Off);
    drop(kettle);

    let reopened = Database::open_at(&dir.path().join("kettle_logs.sqlite")).unwrap();
    let stored = reopened.messages(None).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].message, "Kettle is off.");
}

#[test]
fn test_empty_kettle_and_bad_input_store_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut kettle = open_kettle(&dir, KettleSpec::default());

    assert_eq!(kettle.turn_on(), TurnOnOutcome::NoWater);
    assert!(kettle.pour_water_input("a cup").is_err());
    assert!(kettle.pour_water(-1.0).is_err());

    assert_eq!(
        output(&kettle),
        vec![
            "Pour some water into the kettle.",
            "Amount of water must be a positive number.",
            "Amount of water must be a positive number.",
        ]
    );
    assert_eq!(kettle.recorder().message_count().unwrap(), 0);
}

#[test]
fn test_kettle_can_be_reused_after_a_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let spec = KettleSpec::new(100.0, 1.0, 4).unwrap();
    let mut kettle = open_kettle(&dir, spec);

    for _ in 0..3 {
        kettle.pour_water(1.0).unwrap();
        assert_eq!(kettle.turn_on(), TurnOnOutcome::Cycled { steps: 4 });
    }
    // pour + on + 4 readings + boiled + used up, three times
    assert_eq!(kettle.recorder().message_count().unwrap(), 3 * 8);
}
