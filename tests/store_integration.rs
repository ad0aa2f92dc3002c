// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Store integration tests against a live MongoDB.
//!
//! Gated on `TEST_MONGO_URI`; each test works in its own collection of the
//! `ride_test` database.

use mongodb::bson::{doc, oid::ObjectId, Document};
use ride_intake::intake::{canonicalize, RideRequestIn, StartPointIn};
use ride_intake::models::RideRequest;

mod common;

fn unique_collection() -> String {
    format!("requests_{}", ObjectId::new().to_hex())
}

fn submission(name: &str, phone: &str, people: i64) -> RideRequestIn {
    RideRequestIn {
        name: name.to_string(),
        phone: phone.to_string(),
        tg: Some("@rider".to_string()),
        day: "30".to_string(),
        earliest_time: "09:00".to_string(),
        people,
        start_point: StartPointIn {
            address: "Main St 1".to_string(),
            lat: 55.0,
            lon: 37.0,
        },
    }
}

fn record_created_at(name: &str, people: i64, created_at: &str) -> RideRequest {
    let mut record = canonicalize(submission(name, "89161234567", people))
        .unwrap()
        .into_record(chrono::Utc::now());
    record.created_at = created_at.to_string();
    record
}

/// Raw collection handle for fixtures the typed API cannot produce.
async fn raw_collection(name: &str) -> mongodb::Collection<Document> {
    let uri = std::env::var("TEST_MONGO_URI").expect("TEST_MONGO_URI not set");
    let client = mongodb::Client::with_uri_str(&uri)
        .await
        .expect("Failed to connect to test MongoDB");
    client.database("ride_test").collection(name)
}

#[tokio::test]
async fn test_insert_assigns_id_and_roundtrips_geo() {
    require_mongo!();
    let name = unique_collection();
    let store = common::test_store(&name).await;

    // The canonical scenario: domestic trunk prefix in, international out.
    let record = canonicalize(submission("A", "89161234567", 1))
        .unwrap()
        .into_record(chrono::Utc::now());
    let id = store.insert(&record).await.unwrap();

    let stored = store.find_recent(5).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, Some(id));
    assert_eq!(stored[0].phone, "+79161234567");
    assert_eq!(stored[0].start_point.geo.kind, "Point");
    assert_eq!(stored[0].start_point.geo.coordinates, [37.0, 55.0]);

    raw_collection(&name).await.drop().await.ok();
}

#[tokio::test]
async fn test_find_recent_orders_most_recent_first() {
    require_mongo!();
    let name = unique_collection();
    let store = common::test_store(&name).await;

    for (i, created) in [
        "2026-08-01T08:00:00Z",
        "2026-08-01T10:00:00Z",
        "2026-08-01T09:00:00Z",
    ]
    .iter()
    .enumerate()
    {
        store
            .insert(&record_created_at(&format!("r{}", i), 1, created))
            .await
            .unwrap();
    }

    let recent = store.find_recent(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].created_at, "2026-08-01T10:00:00Z");
    assert_eq!(recent[1].created_at, "2026-08-01T09:00:00Z");

    raw_collection(&name).await.drop().await.ok();
}

#[tokio::test]
async fn test_delete_twice_reports_not_found() {
    require_mongo!();
    let name = unique_collection();
    let store = common::test_store(&name).await;

    let record = canonicalize(submission("A", "89161234567", 1))
        .unwrap()
        .into_record(chrono::Utc::now());
    let id = store.insert(&record).await.unwrap();

    assert!(store.delete_by_id(&id).await.unwrap());
    // Second delete is a clean not-found, never an error.
    assert!(!store.delete_by_id(&id).await.unwrap());

    raw_collection(&name).await.drop().await.ok();
}

#[tokio::test]
async fn test_sum_people_counts_legacy_records_as_one() {
    require_mongo!();
    let name = unique_collection();
    let store = common::test_store(&name).await;

    store
        .insert(&record_created_at("a", 3, "2026-08-01T08:00:00Z"))
        .await
        .unwrap();

    // A record from before the `people` field existed.
    raw_collection(&name)
        .await
        .insert_one(doc! {
            "name": "legacy",
            "phone": "+79161234567",
            "day": "31",
            "earliest_time": "10:00",
            "start_point": {
                "address": "Old St 2",
                "lat": 55.0,
                "lon": 37.0,
                "geo": {"type": "Point", "coordinates": [37.0, 55.0]},
            },
            "created_at": "2026-07-01T08:00:00Z",
        })
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(store.sum_people().await.unwrap(), 4);

    raw_collection(&name).await.drop().await.ok();
}

#[tokio::test]
async fn test_sum_people_empty_collection_is_zero() {
    require_mongo!();
    let name = unique_collection();
    let store = common::test_store(&name).await;

    assert_eq!(store.count().await.unwrap(), 0);
    assert_eq!(store.sum_people().await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_inserts_sum_up() {
    require_mongo!();
    let name = unique_collection();
    let store = common::test_store(&name).await;

    let people: Vec<i64> = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let expected: i64 = people.iter().sum();

    let mut handles = Vec::new();
    for (i, p) in people.into_iter().enumerate() {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let record = canonicalize(submission(&format!("r{}", i), "89161234567", p))
                .unwrap()
                .into_record(chrono::Utc::now());
            store.insert(&record).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.count().await.unwrap(), 8);
    assert_eq!(store.sum_people().await.unwrap(), expected);

    raw_collection(&name).await.drop().await.ok();
}

#[tokio::test]
async fn test_ensure_indexes_is_idempotent() {
    require_mongo!();
    let name = unique_collection();
    let store = common::test_store(&name).await;

    store.ensure_indexes().await.unwrap();
    store.ensure_indexes().await.unwrap();

    let raw = raw_collection(&name).await;
    let indexes = raw.list_index_names().await.unwrap();
    // _id plus the three secondary indexes, with no duplicates.
    assert_eq!(indexes.len(), 4);
    assert!(indexes.iter().any(|n| n.contains("created_at")));
    assert!(indexes.iter().any(|n| n.contains("day")));
    assert!(indexes.iter().any(|n| n.contains("geo")));

    raw.drop().await.ok();
}
