// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MongoDB collection wrapper with typed operations.
//!
//! Provides the full persistence surface for ride requests:
//! - insert / delete of single records
//! - count and participant-sum aggregates
//! - recency queries for the admin bot
//! - idempotent index creation at startup
//!
//! The store performs no submission validation; that is the intake layer's
//! job. Identifier format checks happen at the call boundaries via
//! [`parse_object_id`].

use crate::error::AppError;
use crate::models::RideRequest;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use mongodb::{Client, Collection, IndexModel};

/// MongoDB-backed store for ride requests.
#[derive(Clone)]
pub struct RideStore {
    collection: Option<Collection<RideRequest>>,
}

impl RideStore {
    /// Connect to MongoDB and select the configured collection.
    pub async fn connect(uri: &str, db: &str, collection: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        tracing::info!(db, collection, "Connected to MongoDB");

        Ok(Self {
            collection: Some(client.database(db).collection(collection)),
        })
    }

    /// Create a mock store for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { collection: None }
    }

    /// Helper to get the collection or return an error if offline.
    fn collection(&self) -> Result<&Collection<RideRequest>, AppError> {
        self.collection
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Create the secondary indexes. Idempotent; called once at API-server
    /// startup.
    ///
    /// - `created_at` descending for recency queries
    /// - `(day, earliest_time)` for scheduling lookups (declared, unqueried)
    /// - 2dsphere on `start_point.geo` for proximity queries
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let collection = self.collection()?;

        let indexes = [
            IndexModel::builder().keys(doc! { "created_at": -1 }).build(),
            IndexModel::builder()
                .keys(doc! { "day": 1, "earliest_time": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "start_point.geo": "2dsphere" })
                .build(),
        ];

        for index in indexes {
            collection
                .create_index(index)
                .await
                .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
        }

        tracing::info!("Indexes ensured");
        Ok(())
    }

    /// Insert a record and return its store-assigned id.
    pub async fn insert(&self, record: &RideRequest) -> Result<ObjectId, AppError> {
        let result = self
            .collection()?
            .insert_one(record)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Database("Insert returned a non-ObjectId id".to_string()))
    }

    /// Total number of stored requests.
    pub async fn count(&self) -> Result<u64, AppError> {
        self.collection()?
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum of the `people` field across all records.
    ///
    /// Records persisted before the field existed count as 1, matching the
    /// intake default.
    pub async fn sum_people(&self) -> Result<i64, AppError> {
        let pipeline = vec![doc! {
            "$group": {
                "_id": null,
                "total": { "$sum": { "$ifNull": ["$people", 1] } },
            }
        }];

        let mut cursor = self
            .collection()?
            .aggregate(pipeline)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let total = match cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(group) => match group.get("total") {
                Some(Bson::Int32(n)) => i64::from(*n),
                Some(Bson::Int64(n)) => *n,
                Some(Bson::Double(n)) => *n as i64,
                _ => 0,
            },
            // Empty collection produces no group at all.
            None => 0,
        };

        Ok(total)
    }

    /// The `limit` most recently created records, most recent first.
    pub async fn find_recent(&self, limit: i64) -> Result<Vec<RideRequest>, AppError> {
        self.collection()?
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a record by id. Returns false when no record matched.
    pub async fn delete_by_id(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection()?
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }
}

/// Parse a caller-supplied identifier. `None` means the value does not have
/// the ObjectId format; callers decide whether that is a 400 or a "not
/// found"-style reply.
pub fn parse_object_id(raw: &str) -> Option<ObjectId> {
    ObjectId::parse_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        assert!(parse_object_id("64b7a9f1c2a4e12345678901").is_some());
        assert!(parse_object_id("not-an-id").is_none());
        assert!(parse_object_id("").is_none());
        // Right length, invalid hex
        assert!(parse_object_id("zzb7a9f1c2a4e12345678901").is_none());
    }

    #[tokio::test]
    async fn test_mock_store_is_offline() {
        let store = RideStore::new_mock();
        assert!(matches!(store.count().await, Err(AppError::Database(_))));
        assert!(matches!(
            store.delete_by_id(&ObjectId::new()).await,
            Err(AppError::Database(_))
        ));
    }
}
