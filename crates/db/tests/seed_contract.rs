use chrono::NaiveDate;

use newsdesk_db::stores::{EventStore, SqlEventStore, SqlTrafficStore, TrafficStore};
use newsdesk_db::{connect_with_settings, migrations, DemoSeedDataset};
use newsdesk_core::domain::{DateWindow, NoteId};

async fn seeded_pool() -> sqlx::SqlitePool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    DemoSeedDataset::load(&pool).await.expect("seed");
    pool
}

#[tokio::test]
async fn seed_passes_its_own_verification() {
    let pool = seeded_pool().await;
    let verification = DemoSeedDataset::verify(&pool).await.expect("verify");
    assert!(
        verification.is_success(),
        "failed checks: {:?}",
        verification.failed_checks(),
    );
}

#[tokio::test]
async fn seeded_log_supports_the_fallback_creator_scenario() {
    let pool = seeded_pool().await;
    let store = SqlEventStore::new(pool);

    let create_ever = store.note_ids_with_create().await.expect("scan");
    assert!(create_ever.contains(&NoteId("note-1".to_string())));
    assert!(!create_ever.contains(&NoteId("note-2".to_string())));

    let window = DateWindow::new(
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"),
        NaiveDate::from_ymd_opt(2026, 3, 7).expect("date"),
    )
    .expect("window");
    let events = store.events_in_window(&window).await.expect("load");
    assert_eq!(events.len(), 8);
}

#[tokio::test]
async fn seeded_traffic_exposes_both_grains_and_latest_date() {
    let pool = seeded_pool().await;
    let store = SqlTrafficStore::new(pool);

    let window = DateWindow::new(
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"),
        NaiveDate::from_ymd_opt(2026, 3, 7).expect("date"),
    )
    .expect("window");

    let daily = store.daily_in_window(&window).await.expect("daily");
    assert_eq!(daily.len(), 4);

    let sessions = store.sessions_in_window(&window).await.expect("sessions");
    assert_eq!(sessions.len(), 4);

    let latest = store.latest_date().await.expect("latest");
    assert_eq!(latest, NaiveDate::from_ymd_opt(2026, 3, 5));
}
