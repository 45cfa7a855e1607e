use rivolib::model::{Profile, RunInput};
use rivolib::storage::{HistoryEntry, Store};
use rust_decimal::Decimal;
use uuid::Uuid;

fn temp_store() -> (Store, std::path::PathBuf) {
    let dir = std::env::temp_dir().join(format!("rivo-store-{}", Uuid::new_v4()));
    (Store::new(&dir), dir)
}

#[test]
fn missing_profile_falls_back_to_default() {
    let (store, dir) = temp_store();
    assert_eq!(store.load_profile(), Profile::default());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn profile_round_trip() {
    let (store, dir) = temp_store();

    let mut profile = Profile::default();
    profile.sender_id = "556677-8899".into();
    profile.debtor_iban = "SE4550000000058398257466".into();
    profile.employees[0].clearing_account = "5491-0000003".into();

    store.save_profile(&profile).expect("save profile");
    assert_eq!(store.load_profile(), profile);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn history_is_newest_first() {
    let (store, dir) = temp_store();
    assert!(store.load_history().is_empty());

    let mut run = RunInput::new("2025-07-25".parse().unwrap());
    run.vat = Decimal::from_str_exact("1000").unwrap();
    store
        .push_history(HistoryEntry::new(run, None, Some("<x/>".into()), None))
        .expect("push");

    let run2 = RunInput::new("2025-08-25".parse().unwrap());
    store
        .push_history(HistoryEntry::new(
            run2,
            Some("<y/>".into()),
            None,
            Some("202508".into()),
        ))
        .expect("push");

    let history = store.load_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].run.execution_date.to_string(), "2025-08-25");
    assert_eq!(history[0].agi_period.as_deref(), Some("202508"));
    assert_eq!(history[1].run.execution_date.to_string(), "2025-07-25");

    store.clear_history().expect("clear");
    assert!(store.load_history().is_empty());

    std::fs::remove_dir_all(dir).ok();
}
