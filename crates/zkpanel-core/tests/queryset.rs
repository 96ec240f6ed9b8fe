#![allow(clippy::unwrap_used)]
// Integration tests for `QuerySet` against the in-memory mock gateway.

mod support;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use pretty_assertions::assert_eq;

use support::{MockGateway, row};
use zkpanel_core::{Error, FieldKind, Model, QuerySet, User};

// ── Helpers ─────────────────────────────────────────────────────────

fn seeded_gateway() -> Arc<MockGateway> {
    let gateway = Arc::new(MockGateway::new());
    gateway.seed(
        "user",
        [
            row(&[("CardNo", "100001"), ("Pin", "1"), ("Group", "3")]),
            row(&[("CardNo", "100002"), ("Pin", "2"), ("Group", "3")]),
            row(&[("CardNo", "100003"), ("Pin", "3"), ("Group", "4")]),
        ],
    );
    gateway
}

fn users(gateway: &Arc<MockGateway>) -> QuerySet<User> {
    QuerySet::new(Arc::clone(gateway) as Arc<dyn zkpanel_core::TableGateway>)
}

// ── Laziness and caching ────────────────────────────────────────────

#[tokio::test]
async fn building_a_chain_never_touches_the_device() {
    let gateway = seeded_gateway();
    let _chain = users(&gateway)
        .filter(User::GROUP.eq("3"))
        .select(&[&User::CARD])
        .unread();
    assert_eq!(gateway.read_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn materialization_happens_at_most_once_per_queryset() {
    let gateway = seeded_gateway();
    let qs = users(&gateway);

    assert_eq!(qs.len().await.unwrap(), 3);
    assert_eq!(qs.len().await.unwrap(), 3);
    assert!(!qs.is_empty().await.unwrap());
    assert_eq!(qs.iter().await.unwrap().count(), 3);
    assert!(qs.get(1).await.unwrap().is_some());

    assert_eq!(gateway.read_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn each_builder_call_gets_its_own_cache() {
    let gateway = seeded_gateway();
    let base = users(&gateway);
    let filtered = base.filter(User::GROUP.eq("3"));

    assert_eq!(filtered.len().await.unwrap(), 2);
    assert_eq!(base.len().await.unwrap(), 3);
    assert_eq!(gateway.read_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn builder_calls_leave_the_receiver_untouched() {
    let gateway = seeded_gateway();
    let base = users(&gateway);
    let _filtered = base.filter(User::GROUP.eq("3")).unread();

    assert!(base.filters().is_empty());
    assert!(!base.is_unread_only());
}

// ── Filter semantics ────────────────────────────────────────────────

#[tokio::test]
async fn refiltering_a_field_replaces_its_condition() {
    let gateway = seeded_gateway();
    let qs = users(&gateway)
        .filter(User::GROUP.eq("4"))
        .filter(User::GROUP.eq("3"))
        .filter(User::SUPER_AUTHORIZE.eq(true));

    let group: Vec<&str> = qs.filters()["Group"].iter().map(String::as_str).collect();
    let authorize: Vec<&str> = qs.filters()["SuperAuthorize"]
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(group, ["3"]);
    assert_eq!(authorize, ["1"]);
}

#[tokio::test]
async fn set_equivalent_conditions_build_identical_state() {
    let gateway = seeded_gateway();
    let a = users(&gateway).filter(User::GROUP.is_in(["3", "4"]));
    let b = users(&gateway).filter(User::GROUP.is_in(["4", "3"]));
    assert_eq!(a.filters(), b.filters());
}

#[tokio::test]
async fn filters_reach_the_gateway_and_narrow_results() {
    let gateway = seeded_gateway();
    let qs = users(&gateway).filter(User::GROUP.eq("3"));

    let rows = qs.all().await.unwrap();
    assert_eq!(rows.len(), 2);

    let request = gateway.last_read().unwrap();
    assert_eq!(request.table, "user");
    assert_eq!(
        request.filters["Group"],
        BTreeSet::from(["3".to_owned()])
    );
}

#[tokio::test]
async fn empty_membership_condition_matches_nothing_without_a_round_trip() {
    let gateway = seeded_gateway();
    let qs = users(&gateway).filter(User::GROUP.is_in(Vec::<String>::new()));

    assert_eq!(qs.len().await.unwrap(), 0);
    assert_eq!(gateway.read_calls.load(Ordering::SeqCst), 0);
}

// ── Projection ──────────────────────────────────────────────────────

#[tokio::test]
async fn projection_is_additive_and_unselected_fields_decode_absent() {
    let gateway = seeded_gateway();
    let qs = users(&gateway)
        .select(&[&User::CARD])
        .select(&[&User::GROUP]);

    let rows = qs.all().await.unwrap();
    let request = gateway.last_read().unwrap();
    assert_eq!(request.fields, ["CardNo", "Group"]);

    assert_eq!(rows[0].card(), Some("100001"));
    assert_eq!(rows[0].pin(), None);
}

#[tokio::test]
async fn select_names_validates_against_the_registry() {
    let gateway = seeded_gateway();
    let qs = users(&gateway).select_names(["card", "pin"]).unwrap();
    qs.all().await.unwrap();
    assert_eq!(gateway.last_read().unwrap().fields, ["CardNo", "Pin"]);

    let err = users(&gateway).select_names(["shoe_size"]).unwrap_err();
    assert!(matches!(err, Error::UnknownField { model: "User", .. }));
}

// ── Unread flag ─────────────────────────────────────────────────────

#[tokio::test]
async fn unread_flag_is_forwarded() {
    let gateway = seeded_gateway();
    users(&gateway).unread().all().await.unwrap();
    assert!(gateway.last_read().unwrap().unread);

    users(&gateway).all().await.unwrap();
    assert!(!gateway.last_read().unwrap().unread);
}

// ── count() ─────────────────────────────────────────────────────────

#[tokio::test]
async fn count_ignores_filters_and_always_costs_a_round_trip() {
    let gateway = seeded_gateway();
    let qs = users(&gateway).filter(User::GROUP.eq("4"));

    assert_eq!(qs.len().await.unwrap(), 1);
    assert_eq!(qs.count().await.unwrap(), 3);
    assert_eq!(qs.count().await.unwrap(), 3);

    assert_eq!(gateway.read_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.count_calls.load(Ordering::SeqCst), 2);
}

// ── Row binding ─────────────────────────────────────────────────────

#[tokio::test]
async fn materialized_rows_come_back_bound_to_the_gateway() {
    let gateway = seeded_gateway();
    let first = users(&gateway).first().await.unwrap().unwrap();

    first.save().await.unwrap();
    assert_eq!(gateway.write_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn standalone_records_fail_with_not_bound() {
    let user = User::new().with(User::PIN, "1");
    assert!(matches!(user.save().await, Err(Error::NotBound)));
    assert!(matches!(user.delete().await, Err(Error::NotBound)));
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_writes_each_record() {
    let gateway = seeded_gateway();
    let qs = users(&gateway);

    qs.upsert([
        User::new().with(User::PIN, "10").with(User::CARD, "200001"),
        User::new().with(User::PIN, "11").with(User::CARD, "200002"),
    ])
    .await
    .unwrap();

    assert_eq!(gateway.write_calls.load(Ordering::SeqCst), 2);
    let written = gateway.written();
    assert_eq!(written[0].get("Pin").unwrap(), "10");
    assert_eq!(written[1].get("Pin").unwrap(), "11");
}

#[tokio::test]
async fn upsert_fields_validates_before_writing_anything() {
    let gateway = seeded_gateway();
    let qs = users(&gateway);

    let err = qs
        .upsert_fields([
            vec![("pin", "10")],
            vec![("pin", "11"), ("first_name", "Ada")],
        ])
        .await
        .unwrap_err();

    match err {
        Error::Batch { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(*source, Error::UnknownField { .. }));
        }
        other => panic!("expected batch error, got {other:?}"),
    }
    assert_eq!(gateway.write_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn mid_batch_transport_failure_names_the_record() {
    let gateway = seeded_gateway();
    gateway.fail_write_at(1);
    let qs = users(&gateway);

    let err = qs
        .upsert([
            User::new().with(User::PIN, "10"),
            User::new().with(User::PIN, "11"),
            User::new().with(User::PIN, "12"),
        ])
        .await
        .unwrap_err();

    match err {
        Error::Batch { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(*source, Error::Transport(_)));
        }
        other => panic!("expected batch error, got {other:?}"),
    }
    // First record written, failing one not, third never attempted.
    assert_eq!(gateway.written().len(), 1);
}

#[tokio::test]
async fn delete_sends_natural_keys() {
    let gateway = seeded_gateway();
    let qs = users(&gateway);

    qs.delete([
        User::new()
            .with(User::PIN, "1")
            .with(User::CARD, "100001")
            .with(User::PASSWORD, "hunter2"),
    ])
    .await
    .unwrap();

    let deleted = gateway.deleted();
    assert_eq!(deleted.len(), 1);
    let pairs: Vec<(&str, &str)> = deleted[0]
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(pairs, [("Pin", "1")]);
}

#[tokio::test]
async fn delete_all_removes_every_matching_row() {
    let gateway = seeded_gateway();
    let qs = users(&gateway).filter(User::GROUP.eq("3"));

    let removed = qs.delete_all().await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(gateway.read_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.delete_calls.load(Ordering::SeqCst), 2);
}

// ── Transport failures ──────────────────────────────────────────────

#[tokio::test]
async fn transport_errors_propagate_unmodified() {
    let gateway = seeded_gateway();
    gateway.fail_reads();
    let qs = users(&gateway);

    match qs.all().await.unwrap_err() {
        Error::Transport(err) => {
            assert_eq!(err.code, -2);
            assert_eq!(
                err.to_string(),
                "GetDeviceData failed: error -2: The command has no response"
            );
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}
