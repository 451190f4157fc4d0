//! Statistics Tests - daily table, monthly roll-up and role permissions
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::{TimeZone, Utc};
use taxi_stand_core_rs::roles::{can_perform_action, Role};
use taxi_stand_core_rs::{
    AppState, DailyArchive, DailyStatistics, Engine, MonthlySummary, QueueKind, StandConfig,
};

fn day_with(fares: &[(&str, QueueKind, i64)]) -> AppState {
    let engine = Engine::new(&StandConfig::default()).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
    let mut state = AppState::new();
    for (id, kind, amount) in fares {
        if state.unit(id).is_none() {
            state = engine.add_mobile(&state, id).unwrap();
        }
        state = engine.assign_fare(&state, id, *kind, *amount, now).unwrap();
    }
    state
}

#[test]
fn test_daily_rows_sorted_numerically() {
    let state = day_with(&[
        ("12", QueueKind::Local, 1_000),
        ("3", QueueKind::Long, 9_000),
        ("100", QueueKind::Medium, 4_000),
    ]);

    let stats = DailyStatistics::from_state("2026-03-10", &state);
    let ids: Vec<&str> = stats.rows.iter().map(|r| r.mobile_id.as_str()).collect();
    assert_eq!(ids, vec!["3", "12", "100"]);
}

#[test]
fn test_daily_lane_totals() {
    let state = day_with(&[
        ("1", QueueKind::Local, 1_000),
        ("1", QueueKind::Local, 1_500),
        ("2", QueueKind::Medium, 4_000),
        ("2", QueueKind::Long, 12_000),
    ]);

    let stats = DailyStatistics::from_state("2026-03-10", &state);

    assert_eq!(stats.lane(QueueKind::Local).fares, 2);
    assert_eq!(stats.lane(QueueKind::Local).amount, 2_500);
    assert_eq!(stats.lane(QueueKind::Medium).amount, 4_000);
    assert_eq!(stats.lane(QueueKind::Long).amount, 12_000);
    assert_eq!(stats.total_fares, 4);
    assert_eq!(stats.cash_total, 18_500);
    assert_eq!(stats.tracked_mobiles, 2);
    assert_eq!(stats.active_mobiles, 2);

    let row = &stats.rows[0];
    assert_eq!(row.counts_local, 2);
    assert_eq!(row.total_amount, 2_500);
}

#[test]
fn test_removed_mobile_stays_in_table() {
    let engine = Engine::new(&StandConfig::default()).unwrap();
    let state = day_with(&[("5", QueueKind::Local, 2_000), ("6", QueueKind::Local, 2_000)]);
    let state = engine.remove_mobile(&state, "5").unwrap();

    let stats = DailyStatistics::from_state("2026-03-10", &state);
    assert_eq!(stats.tracked_mobiles, 2);
    assert_eq!(stats.active_mobiles, 1);
    assert!(!stats.rows[0].active_in_queues);
    assert_eq!(stats.cash_total, 4_000);
}

#[test]
fn test_daily_statistics_json_shape() {
    let state = day_with(&[("1", QueueKind::Medium, 3_000)]);
    let json = serde_json::to_value(DailyStatistics::from_state("2026-03-10", &state)).unwrap();

    assert_eq!(json["cashTotal"], 3_000);
    assert_eq!(json["medium"]["fares"], 1);
    assert_eq!(json["rows"][0]["mobileId"], "1");
    assert_eq!(json["rows"][0]["countsMedium"], 1);
}

#[test]
fn test_monthly_summary_newest_first() {
    let mut archive = DailyArchive::new();
    archive.record("2026-02-28", 1, day_with(&[("1", QueueKind::Local, 50_000)]));
    archive.record("2026-03-02", 2, day_with(&[("1", QueueKind::Local, 10_000)]));
    archive.record(
        "2026-03-05",
        3,
        day_with(&[("1", QueueKind::Local, 5_000), ("2", QueueKind::Long, 15_001)]),
    );

    let summary = MonthlySummary::from_archive(&archive, "2026-03");

    let dates: Vec<&str> = summary.days.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(dates, vec!["2026-03-05", "2026-03-02"]);
    assert_eq!(summary.days_worked, 2);
    assert_eq!(summary.cash_total, 30_001);
    assert_eq!(summary.total_fares, 3);
    // Truncated to whole cents
    assert_eq!(summary.average_per_day, 15_000);
}

#[test]
fn test_role_table() {
    assert!(can_perform_action(Role::Admin, "manage_roles"));
    assert!(can_perform_action(Role::Supervisor, "view_all_data"));
    assert!(!can_perform_action(Role::Supervisor, "edit_all_data"));
    assert!(!can_perform_action(Role::Operator, "view_all_data"));
    assert!(!can_perform_action(Role::Operator, "unknown"));
}
