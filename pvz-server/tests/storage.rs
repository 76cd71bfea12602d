//! Storage engine behaviour against a real PostgreSQL instance

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::TestDb;
use futures::future::join_all;
use pvz_server::db::{PgStore, PvzStore, RepoError};
use pvz_server::read_model::{ListingWindow, fold_rows};
use shared::models::{ReceptionStatus, Role};
use uuid::Uuid;

async fn in_progress_count(db: &TestDb, pvz_id: Uuid) -> i64 {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM receptions WHERE pickup_point_id = $1 AND status = 'in_progress'",
    )
    .bind(pvz_id)
    .fetch_one(&db.pool)
    .await
    .unwrap();
    count
}

async fn product_types(db: &TestDb, reception_id: Uuid) -> Vec<String> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT type::text FROM products WHERE reception_id = $1 ORDER BY created_at",
    )
    .bind(reception_id)
    .fetch_all(&db.pool)
    .await
    .unwrap();
    rows.into_iter().map(|(t,)| t).collect()
}

#[tokio::test]
async fn test_create_pickup_point() {
    let db = TestDb::start().await;
    let store = db.store();

    let before = Utc::now() - Duration::seconds(1);
    let point = store.create_pickup_point("Saint Petersburg").await.unwrap();
    assert!(!point.id.is_nil());
    assert!(point.registration_date >= before);
    assert_eq!(point.city, "Saint Petersburg");

    let err = store.create_pickup_point("Novosibirsk").await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidCity));

    let all = store.list_all_pickup_points().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].city, "Saint Petersburg");
}

#[tokio::test]
async fn test_list_all_empty() {
    let db = TestDb::start().await;
    assert!(db.store().list_all_pickup_points().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_open_twice_fails_until_closed() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Moscow").await.unwrap();

    let first = store.open_reception(pvz.id).await.unwrap();
    assert_eq!(first.status, ReceptionStatus::InProgress);
    assert_eq!(first.pvz_id, pvz.id);

    let err = store.open_reception(pvz.id).await.unwrap_err();
    assert!(matches!(err, RepoError::ReceptionStillOpen));

    let closed = store.close_reception(pvz.id).await.unwrap();
    assert_eq!(closed.id, first.id);
    assert_eq!(closed.status, ReceptionStatus::Closed);
    assert!(closed.closed_at.is_some());

    let second = store.open_reception(pvz.id).await.unwrap();
    assert_ne!(second.id, first.id);
}

#[tokio::test]
async fn test_open_for_unknown_pickup_point() {
    let db = TestDb::start().await;
    let err = db.store().open_reception(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, RepoError::PickupPointNotFound));
}

#[tokio::test]
async fn test_concurrent_opens_admit_exactly_one() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Kazan").await.unwrap();

    let attempts = (0..10).map(|_| {
        let store: Arc<PgStore> = store.clone();
        async move { store.open_reception(pvz.id).await }
    });
    let results = join_all(attempts).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in &results {
        if let Err(e) = result {
            assert!(matches!(e, RepoError::ReceptionStillOpen), "unexpected: {e:?}");
        }
    }
    assert_eq!(in_progress_count(&db, pvz.id).await, 1);
}

#[tokio::test]
async fn test_concurrent_closes_admit_exactly_one() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Kazan").await.unwrap();
    store.open_reception(pvz.id).await.unwrap();

    let attempts = (0..5).map(|_| {
        let store = store.clone();
        async move { store.close_reception(pvz.id).await }
    });
    let results = join_all(attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in &results {
        if let Err(e) = result {
            assert!(matches!(e, RepoError::ReceptionAlreadyClosed), "unexpected: {e:?}");
        }
    }
    assert_eq!(in_progress_count(&db, pvz.id).await, 0);
}

#[tokio::test]
async fn test_adds_racing_a_close_never_outlive_it() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Moscow").await.unwrap();
    let reception = store.open_reception(pvz.id).await.unwrap();

    let adds = (0..20).map(|_| {
        let store = store.clone();
        async move { store.add_product(pvz.id, "clothes").await }
    });
    let (added, closed) = tokio::join!(join_all(adds), store.close_reception(pvz.id));

    let closed = closed.unwrap();
    assert_eq!(closed.id, reception.id);
    assert_eq!(closed.status, ReceptionStatus::Closed);

    let mut successes = 0;
    for result in &added {
        match result {
            Ok(product) => {
                assert_eq!(product.reception_id, reception.id);
                successes += 1;
            }
            Err(e) => assert!(matches!(e, RepoError::NoActiveReception), "unexpected: {e:?}"),
        }
    }
    assert_eq!(product_types(&db, reception.id).await.len(), successes);

    let err = store.add_product(pvz.id, "clothes").await.unwrap_err();
    assert!(matches!(err, RepoError::NoActiveReception));
    assert_eq!(product_types(&db, reception.id).await.len(), successes);
}

#[tokio::test]
async fn test_cancelled_open_leaves_no_reception() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Kazan").await.unwrap();

    // Hold the pickup point row so the open blocks inside its transaction
    let mut blocker = db.pool.begin().await.unwrap();
    sqlx::query("SELECT id FROM pickup_points WHERE id = $1 FOR UPDATE")
        .bind(pvz.id)
        .execute(&mut *blocker)
        .await
        .unwrap();

    let attempt = tokio::time::timeout(
        std::time::Duration::from_millis(300),
        store.open_reception(pvz.id),
    )
    .await;
    assert!(attempt.is_err(), "open should still be waiting on the lock");

    blocker.rollback().await.unwrap();
    assert_eq!(in_progress_count(&db, pvz.id).await, 0);

    store.open_reception(pvz.id).await.unwrap();
    assert_eq!(in_progress_count(&db, pvz.id).await, 1);
}

#[tokio::test]
async fn test_close_without_open_reception() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Moscow").await.unwrap();

    let err = store.close_reception(pvz.id).await.unwrap_err();
    assert!(matches!(err, RepoError::ReceptionAlreadyClosed));
}

#[tokio::test]
async fn test_add_product_requires_active_reception() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Moscow").await.unwrap();

    let err = store.add_product(pvz.id, "shoes").await.unwrap_err();
    assert!(matches!(err, RepoError::NoActiveReception));

    let reception = store.open_reception(pvz.id).await.unwrap();
    let err = store.add_product(pvz.id, "furniture").await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidType));

    let product = store.add_product(pvz.id, "shoes").await.unwrap();
    assert_eq!(product.reception_id, reception.id);
    assert_eq!(product.product_type, "shoes");

    store.close_reception(pvz.id).await.unwrap();
    let err = store.add_product(pvz.id, "shoes").await.unwrap_err();
    assert!(matches!(err, RepoError::NoActiveReception));
}

#[tokio::test]
async fn test_delete_until_no_items() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Moscow").await.unwrap();

    let err = store.delete_last_product(pvz.id).await.unwrap_err();
    assert!(matches!(err, RepoError::NoActiveReception));

    store.open_reception(pvz.id).await.unwrap();
    store.add_product(pvz.id, "clothes").await.unwrap();
    store.delete_last_product(pvz.id).await.unwrap();

    let err = store.delete_last_product(pvz.id).await.unwrap_err();
    assert!(matches!(err, RepoError::NoItems));
}

#[tokio::test]
async fn test_delete_is_lifo() {
    let db = TestDb::start().await;
    let store = db.store();
    let pvz = store.create_pickup_point("Moscow").await.unwrap();
    let reception = store.open_reception(pvz.id).await.unwrap();

    for kind in ["electronics", "clothes", "shoes"] {
        store.add_product(pvz.id, kind).await.unwrap();
    }
    store.delete_last_product(pvz.id).await.unwrap();
    assert_eq!(product_types(&db, reception.id).await, vec!["electronics", "clothes"]);
    store.delete_last_product(pvz.id).await.unwrap();
    assert_eq!(product_types(&db, reception.id).await, vec!["electronics"]);
}

#[tokio::test]
async fn test_paged_listing() {
    let db = TestDb::start().await;
    let store = db.store();

    let moscow = store.create_pickup_point("Moscow").await.unwrap();
    let kazan = store.create_pickup_point("Kazan").await.unwrap();

    let first = store.open_reception(moscow.id).await.unwrap();
    store.add_product(moscow.id, "electronics").await.unwrap();
    store.add_product(moscow.id, "shoes").await.unwrap();
    store.close_reception(moscow.id).await.unwrap();
    let second = store.open_reception(moscow.id).await.unwrap();

    let until = Utc::now() + Duration::hours(1);
    let window = ListingWindow::new(None, None, None, Some(until));
    let listing = fold_rows(store.list_pickup_points_paged(&window).await.unwrap());

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].pvz.id, moscow.id);
    assert_eq!(listing[0].pvz.city, "Moscow");
    let receptions = &listing[0].receptions;
    assert_eq!(receptions.len(), 2);
    assert_eq!(receptions[0].reception.id, first.id);
    assert_eq!(receptions[0].reception.status, ReceptionStatus::Closed);
    let types: Vec<&str> = receptions[0]
        .products
        .iter()
        .map(|p| p.product_type.as_str())
        .collect();
    assert_eq!(types, vec!["electronics", "shoes"]);
    assert_eq!(receptions[1].reception.id, second.id);
    assert!(receptions[1].products.is_empty());

    assert_eq!(listing[1].pvz.id, kazan.id);
    assert_eq!(listing[1].pvz.city, "Kazan");
    assert!(listing[1].receptions.is_empty());

    let page_two = ListingWindow::new(Some(2), Some(1), None, Some(until));
    let listing = fold_rows(store.list_pickup_points_paged(&page_two).await.unwrap());
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].pvz.id, kazan.id);
}

#[tokio::test]
async fn test_listing_with_empty_window_keeps_pickup_points() {
    let db = TestDb::start().await;
    let store = db.store();

    let pvz = store.create_pickup_point("Moscow").await.unwrap();
    store.open_reception(pvz.id).await.unwrap();
    store.add_product(pvz.id, "shoes").await.unwrap();

    let long_ago = Utc::now() - Duration::days(365);
    let window = ListingWindow::new(None, None, Some(long_ago), Some(long_ago + Duration::days(1)));
    let listing = fold_rows(store.list_pickup_points_paged(&window).await.unwrap());

    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].pvz.id, pvz.id);
    assert!(listing[0].receptions.is_empty());
}

#[tokio::test]
async fn test_users() {
    let db = TestDb::start().await;
    let store = db.store();

    let id = store
        .create_user("mod@example.com", "$argon2id$hash", Role::Moderator)
        .await
        .unwrap();
    let user = store.get_user_by_email("mod@example.com").await.unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.role, Role::Moderator);
    assert_eq!(user.password_hash, "$argon2id$hash");

    let err = store
        .create_user("mod@example.com", "other", Role::Employee)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail));

    let err = store.get_user_by_email("ghost@example.com").await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn test_schema_rejects_second_open_reception() {
    let db = TestDb::start().await;
    let pvz = db.store().create_pickup_point("Moscow").await.unwrap();
    db.store().open_reception(pvz.id).await.unwrap();

    let err = sqlx::query("INSERT INTO receptions (pickup_point_id) VALUES ($1)")
        .bind(pvz.id)
        .execute(&db.pool)
        .await
        .unwrap_err();
    assert_eq!(
        pvz_server::db::classify(&err),
        Some(pvz_server::db::ConstraintKind::UniqueViolation)
    );
}
