//! Maintains the dense `order_number` sequence of one collection.
//!
//! The record store only offers single-row reads and writes, so every
//! operation here is a sequence of individual round-trips. A failure partway
//! through leaves the collection transiently inconsistent; no rollback is
//! attempted. The renumbering passes (`delete`, `permute`,
//! `set_explicit_order`) recompute ranks from a fresh sorted fetch, so the
//! next successful one restores density regardless of what the previous
//! operation left behind. Inserts assume the collection is already dense.
//!
//! There is deliberately no in-process cache of collection order: handlers
//! run as independent invocations and re-derive order from the store on
//! every request.

use std::{collections::HashMap, future::Future};

use db::ordering::{OrderEntry, OrderedRows, StoreError};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("record {id} not found in {collection}")]
    NotFound { collection: &'static str, id: Uuid },
    #[error("record {id} in {collection} was changed by another session, re-fetch and retry")]
    Conflict { collection: &'static str, id: Uuid },
    #[error("invalid order payload for {collection}: {reason}")]
    MalformedInput {
        collection: &'static str,
        reason: String,
    },
    #[error("order write failed in {collection} after {applied} of {total} writes: {source}")]
    StoreWriteFailure {
        collection: &'static str,
        applied: usize,
        total: usize,
        #[source]
        source: StoreError,
    },
    #[error("order read failed in {collection}: {source}")]
    StoreReadFailure {
        collection: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Where a freshly created record lands. News and client cards go to the
/// front of the dashboard; the other collections append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum InsertPosition {
    Front,
    End,
}

/// One element of a drag-and-drop reorder request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ReorderEntry {
    pub id: Uuid,
    pub order_number: i64,
    /// Version the caller last saw. When present, a mismatch against the
    /// stored row rejects the whole request before any write.
    #[serde(default)]
    pub version: Option<i64>,
}

/// Drives the order-maintenance protocol for one named collection over
/// per-row store primitives.
pub struct OrderedCollection<S: OrderedRows> {
    name: &'static str,
    rows: S,
}

impl<S: OrderedRows> OrderedCollection<S> {
    pub fn new(name: &'static str, rows: S) -> Self {
        Self { name, rows }
    }

    /// Shifts every existing record one slot down, then runs `insert` with
    /// slot 0.
    pub async fn insert_at_front<R, F, Fut>(&self, insert: F) -> Result<R, OrderingError>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = Result<R, StoreError>>,
    {
        self.insert_with(InsertPosition::Front, insert).await
    }

    /// Runs `insert` with slot N, where N is the current record count.
    pub async fn insert_at_end<R, F, Fut>(&self, insert: F) -> Result<R, OrderingError>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = Result<R, StoreError>>,
    {
        self.insert_with(InsertPosition::End, insert).await
    }

    pub async fn insert_with<R, F, Fut>(
        &self,
        position: InsertPosition,
        insert: F,
    ) -> Result<R, OrderingError>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = Result<R, StoreError>>,
    {
        let (slot, shifted) = match position {
            InsertPosition::Front => {
                let entries = self.fetch().await?;
                let total = entries.len() + 1;
                let mut applied = 0;
                for entry in &entries {
                    self.rows
                        .write_order(entry.id, entry.order_number + 1)
                        .await
                        .map_err(|source| self.write_failure(applied, total, source))?;
                    applied += 1;
                }
                (0, applied)
            }
            InsertPosition::End => (self.rows.count().await.map_err(|e| self.read_failure(e))?, 0),
        };

        let record = insert(slot)
            .await
            .map_err(|source| self.write_failure(shifted, shifted + 1, source))?;
        info!(
            collection = self.name,
            %position,
            order_number = slot,
            "inserted record"
        );
        Ok(record)
    }

    /// Removes the record and closes the gap by renumbering every survivor
    /// to its rank in a fresh sorted fetch.
    pub async fn delete(&self, id: Uuid) -> Result<(), OrderingError> {
        let removed = self
            .rows
            .delete_row(id)
            .await
            .map_err(|source| self.write_failure(0, 1, source))?;
        if removed == 0 {
            return Err(OrderingError::NotFound {
                collection: self.name,
                id,
            });
        }
        info!(collection = self.name, %id, "deleted record");
        self.renumber_by_rank().await
    }

    /// Applies a caller-supplied permutation. The request must cover the
    /// stored id set exactly once with a dense order assignment; any stale
    /// supplied version rejects the whole request. Nothing is written until
    /// validation passes.
    pub async fn permute(&self, requested: &[ReorderEntry]) -> Result<(), OrderingError> {
        let current = self.fetch().await?;
        self.validate_permutation(requested, &current)?;

        let positions: HashMap<Uuid, i64> =
            current.iter().map(|e| (e.id, e.order_number)).collect();
        let pending: Vec<&ReorderEntry> = requested
            .iter()
            .filter(|r| positions.get(&r.id) != Some(&r.order_number))
            .collect();

        let total = pending.len();
        let mut applied = 0;
        for entry in pending {
            self.rows
                .write_order(entry.id, entry.order_number)
                .await
                .map_err(|source| self.write_failure(applied, total, source))?;
            applied += 1;
        }
        info!(
            collection = self.name,
            records = requested.len(),
            writes = applied,
            "applied manual reorder"
        );
        Ok(())
    }

    /// Repositions a single record: its new `order_number` is written
    /// directly, then the whole collection is renumbered by rank. The write
    /// bumps the moved row's version and the sorted fetch breaks ties by
    /// version descending, so the moved row sorts before the incumbent of a
    /// contested slot: it reaches the slot exactly when moving toward the
    /// front, and lands immediately before the incumbent when moving toward
    /// the end.
    pub async fn set_explicit_order(
        &self,
        id: Uuid,
        order_number: i64,
        expected_version: Option<i64>,
    ) -> Result<(), OrderingError> {
        if order_number < 0 {
            return Err(OrderingError::MalformedInput {
                collection: self.name,
                reason: format!("order_number must be non-negative, got {order_number}"),
            });
        }
        let current = self.fetch().await?;
        let entry = current
            .iter()
            .find(|e| e.id == id)
            .ok_or(OrderingError::NotFound {
                collection: self.name,
                id,
            })?;
        if let Some(expected) = expected_version {
            if entry.version != expected {
                return Err(OrderingError::Conflict {
                    collection: self.name,
                    id,
                });
            }
        }

        self.rows
            .write_order(id, order_number)
            .await
            .map_err(|source| self.write_failure(0, 1, source))?;
        info!(collection = self.name, %id, order_number, "repositioned record");
        self.renumber_by_rank().await
    }

    /// Rewrites every record's `order_number` to its zero-based rank in a
    /// fresh sorted fetch. Records already holding their rank are skipped,
    /// so running this twice in a row performs no writes the second time.
    pub async fn renumber_by_rank(&self) -> Result<(), OrderingError> {
        let entries = self.fetch().await?;
        let pending: Vec<(Uuid, i64)> = entries
            .iter()
            .enumerate()
            .map(|(rank, entry)| (entry.id, rank as i64, entry.order_number))
            .filter(|(_, rank, order)| rank != order)
            .map(|(id, rank, _)| (id, rank))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let total = pending.len();
        let mut applied = 0;
        for (id, rank) in pending {
            self.rows
                .write_order(id, rank)
                .await
                .map_err(|source| self.write_failure(applied, total, source))?;
            applied += 1;
        }
        warn!(
            collection = self.name,
            rewritten = applied,
            "renumbered records to restore a dense order sequence"
        );
        Ok(())
    }

    fn validate_permutation(
        &self,
        requested: &[ReorderEntry],
        current: &[OrderEntry],
    ) -> Result<(), OrderingError> {
        let malformed = |reason: String| OrderingError::MalformedInput {
            collection: self.name,
            reason,
        };

        if requested.len() != current.len() {
            return Err(malformed(format!(
                "expected {} records, got {}",
                current.len(),
                requested.len()
            )));
        }

        let stored: HashMap<Uuid, i64> = current.iter().map(|e| (e.id, e.version)).collect();
        let mut seen_ids = Vec::with_capacity(requested.len());
        let mut orders: Vec<i64> = Vec::with_capacity(requested.len());
        for entry in requested {
            if seen_ids.contains(&entry.id) {
                return Err(malformed(format!("duplicate record id {}", entry.id)));
            }
            seen_ids.push(entry.id);
            orders.push(entry.order_number);

            let Some(version) = stored.get(&entry.id) else {
                return Err(malformed(format!("unknown record id {}", entry.id)));
            };
            if let Some(expected) = entry.version {
                if *version != expected {
                    return Err(OrderingError::Conflict {
                        collection: self.name,
                        id: entry.id,
                    });
                }
            }
        }

        orders.sort_unstable();
        if orders.iter().enumerate().any(|(i, o)| i as i64 != *o) {
            return Err(malformed(
                "order numbers must form a dense 0..N-1 sequence".to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch(&self) -> Result<Vec<OrderEntry>, OrderingError> {
        self.rows.entries().await.map_err(|e| self.read_failure(e))
    }

    fn read_failure(&self, source: StoreError) -> OrderingError {
        OrderingError::StoreReadFailure {
            collection: self.name,
            source,
        }
    }

    fn write_failure(&self, applied: usize, total: usize, source: StoreError) -> OrderingError {
        OrderingError::StoreWriteFailure {
            collection: self.name,
            applied,
            total,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;

    /// In-memory stand-in for one ordered table, with injectable write
    /// failures. Mirrors the store contract: `entries` sorts by order
    /// ascending with ties broken by version descending, `write_order`
    /// bumps the row's version.
    #[derive(Clone, Default)]
    struct MemoryRows {
        rows: Arc<Mutex<Vec<OrderEntry>>>,
        fail_after_writes: Arc<Mutex<Option<usize>>>,
        writes: Arc<Mutex<usize>>,
    }

    impl MemoryRows {
        fn seeded(count: usize) -> (Self, Vec<Uuid>) {
            let store = Self::default();
            let ids: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
            for (i, id) in ids.iter().enumerate() {
                store.insert_row(*id, i as i64);
            }
            (store, ids)
        }

        fn insert_row(&self, id: Uuid, order_number: i64) {
            self.rows.lock().unwrap().push(OrderEntry {
                id,
                order_number,
                version: 0,
            });
        }

        fn set_order(&self, id: Uuid, order_number: i64) {
            let mut rows = self.rows.lock().unwrap();
            rows.iter_mut().find(|r| r.id == id).unwrap().order_number = order_number;
        }

        fn fail_after(&self, writes: usize) {
            *self.fail_after_writes.lock().unwrap() = Some(writes);
        }

        fn write_count(&self) -> usize {
            *self.writes.lock().unwrap()
        }

        /// Ids in display order, with their order numbers.
        fn snapshot(&self) -> Vec<(Uuid, i64)> {
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by(|a, b| {
                a.order_number
                    .cmp(&b.order_number)
                    .then(b.version.cmp(&a.version))
            });
            rows.iter().map(|r| (r.id, r.order_number)).collect()
        }

        fn is_dense(&self) -> bool {
            self.snapshot()
                .iter()
                .enumerate()
                .all(|(i, (_, order))| i as i64 == *order)
        }
    }

    #[async_trait]
    impl OrderedRows for MemoryRows {
        async fn entries(&self) -> Result<Vec<OrderEntry>, StoreError> {
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by(|a, b| {
                a.order_number
                    .cmp(&b.order_number)
                    .then(b.version.cmp(&a.version))
            });
            Ok(rows)
        }

        async fn count(&self) -> Result<i64, StoreError> {
            Ok(self.rows.lock().unwrap().len() as i64)
        }

        async fn write_order(&self, id: Uuid, order_number: i64) -> Result<(), StoreError> {
            let mut writes = self.writes.lock().unwrap();
            if let Some(limit) = *self.fail_after_writes.lock().unwrap() {
                if *writes >= limit {
                    return Err(StoreError::Unavailable("injected write failure".into()));
                }
            }
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| StoreError::Unavailable(format!("no row {id}")))?;
            row.order_number = order_number;
            row.version += 1;
            *writes += 1;
            Ok(())
        }

        async fn delete_row(&self, id: Uuid) -> Result<u64, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok((before - rows.len()) as u64)
        }
    }

    fn collection(rows: &MemoryRows) -> OrderedCollection<MemoryRows> {
        OrderedCollection::new("clients", rows.clone())
    }

    async fn insert(
        collection: &OrderedCollection<MemoryRows>,
        rows: &MemoryRows,
        position: InsertPosition,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let store = rows.clone();
        collection
            .insert_with(position, |slot| {
                let store = store.clone();
                async move {
                    store.insert_row(id, slot);
                    Ok(id)
                }
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_at_front_shifts_existing_records() {
        let (rows, ids) = MemoryRows::seeded(3);
        let new_id = insert(&collection(&rows), &rows, InsertPosition::Front).await;

        let snapshot = rows.snapshot();
        assert!(rows.is_dense());
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot[0], (new_id, 0));
        // Prior relative order is preserved, one slot down.
        assert_eq!(
            snapshot[1..].iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            ids
        );
    }

    #[tokio::test]
    async fn insert_at_end_on_empty_collection_takes_slot_zero() {
        let (rows, _) = MemoryRows::seeded(0);
        let new_id = insert(&collection(&rows), &rows, InsertPosition::End).await;
        assert_eq!(rows.snapshot(), vec![(new_id, 0)]);
    }

    #[tokio::test]
    async fn insert_at_end_appends_without_touching_others() {
        let (rows, ids) = MemoryRows::seeded(2);
        let new_id = insert(&collection(&rows), &rows, InsertPosition::End).await;

        assert_eq!(
            rows.snapshot(),
            vec![(ids[0], 0), (ids[1], 1), (new_id, 2)]
        );
        // No shift writes happened.
        assert_eq!(rows.write_count(), 0);
    }

    #[tokio::test]
    async fn delete_compacts_and_preserves_relative_order() {
        let (rows, ids) = MemoryRows::seeded(3);
        collection(&rows).delete(ids[1]).await.unwrap();
        assert_eq!(rows.snapshot(), vec![(ids[0], 0), (ids[2], 1)]);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let (rows, _) = MemoryRows::seeded(2);
        let err = collection(&rows).delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, OrderingError::NotFound { .. }));
        assert_eq!(rows.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn delete_self_heals_a_gapped_collection() {
        let (rows, ids) = MemoryRows::seeded(3);
        // Simulate a previous interrupted pass: orders 0, 4, 7.
        rows.set_order(ids[1], 4);
        rows.set_order(ids[2], 7);

        collection(&rows).delete(ids[0]).await.unwrap();
        assert_eq!(rows.snapshot(), vec![(ids[1], 0), (ids[2], 1)]);
    }

    #[tokio::test]
    async fn permute_applies_requested_order_exactly() {
        let (rows, ids) = MemoryRows::seeded(3);
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        let request = vec![
            ReorderEntry { id: c, order_number: 0, version: None },
            ReorderEntry { id: a, order_number: 1, version: None },
            ReorderEntry { id: b, order_number: 2, version: None },
        ];
        collection(&rows).permute(&request).await.unwrap();
        assert_eq!(rows.snapshot(), vec![(c, 0), (a, 1), (b, 2)]);
    }

    #[tokio::test]
    async fn permute_rejects_incomplete_or_unknown_ids_before_writing() {
        let (rows, ids) = MemoryRows::seeded(3);
        let short = vec![ReorderEntry {
            id: ids[0],
            order_number: 0,
            version: None,
        }];
        let err = collection(&rows).permute(&short).await.unwrap_err();
        assert!(matches!(err, OrderingError::MalformedInput { .. }));

        let unknown = vec![
            ReorderEntry { id: ids[0], order_number: 0, version: None },
            ReorderEntry { id: ids[1], order_number: 1, version: None },
            ReorderEntry { id: Uuid::new_v4(), order_number: 2, version: None },
        ];
        let err = collection(&rows).permute(&unknown).await.unwrap_err();
        assert!(matches!(err, OrderingError::MalformedInput { .. }));

        assert_eq!(rows.write_count(), 0);
    }

    #[tokio::test]
    async fn permute_rejects_gapped_order_numbers() {
        let (rows, ids) = MemoryRows::seeded(2);
        let request = vec![
            ReorderEntry { id: ids[0], order_number: 0, version: None },
            ReorderEntry { id: ids[1], order_number: 2, version: None },
        ];
        let err = collection(&rows).permute(&request).await.unwrap_err();
        assert!(matches!(err, OrderingError::MalformedInput { .. }));
        assert_eq!(rows.write_count(), 0);
    }

    #[tokio::test]
    async fn permute_rejects_stale_versions() {
        let (rows, ids) = MemoryRows::seeded(2);
        // Another session repositions the first record, bumping its version.
        rows.write_order(ids[0], 1).await.unwrap();
        rows.write_order(ids[1], 0).await.unwrap();

        let request = vec![
            ReorderEntry { id: ids[0], order_number: 0, version: Some(0) },
            ReorderEntry { id: ids[1], order_number: 1, version: Some(0) },
        ];
        let err = collection(&rows).permute(&request).await.unwrap_err();
        assert!(matches!(err, OrderingError::Conflict { .. }));
    }

    #[tokio::test]
    async fn permute_without_versions_is_last_write_wins() {
        let (rows, ids) = MemoryRows::seeded(2);
        rows.write_order(ids[0], 1).await.unwrap();
        rows.write_order(ids[1], 0).await.unwrap();

        let request = vec![
            ReorderEntry { id: ids[0], order_number: 0, version: None },
            ReorderEntry { id: ids[1], order_number: 1, version: None },
        ];
        collection(&rows).permute(&request).await.unwrap();
        assert_eq!(rows.snapshot(), vec![(ids[0], 0), (ids[1], 1)]);
    }

    #[tokio::test]
    async fn renumber_by_rank_twice_writes_nothing_the_second_time() {
        let (rows, ids) = MemoryRows::seeded(3);
        rows.set_order(ids[1], 5);
        rows.set_order(ids[2], 9);

        let ordering = collection(&rows);
        ordering.renumber_by_rank().await.unwrap();
        assert!(rows.is_dense());

        let writes = rows.write_count();
        ordering.renumber_by_rank().await.unwrap();
        assert_eq!(rows.write_count(), writes);
    }

    #[tokio::test]
    async fn insert_then_delete_restores_original_assignment() {
        let (rows, _) = MemoryRows::seeded(3);
        let before = rows.snapshot();

        let ordering = collection(&rows);
        let new_id = insert(&ordering, &rows, InsertPosition::Front).await;
        ordering.delete(new_id).await.unwrap();

        assert_eq!(rows.snapshot(), before);
    }

    #[tokio::test]
    async fn partial_failure_reports_applied_write_count() {
        let (rows, _) = MemoryRows::seeded(4);
        rows.fail_after(2);

        let ordering = collection(&rows);
        let err = ordering
            .insert_with(InsertPosition::Front, |_slot| async move {
                Ok(Uuid::new_v4())
            })
            .await
            .unwrap_err();

        // Four shift writes plus the insert were due; the third shift failed.
        match err {
            OrderingError::StoreWriteFailure { applied, total, .. } => {
                assert_eq!(applied, 2);
                assert_eq!(total, 5);
            }
            other => panic!("expected StoreWriteFailure, got {other:?}"),
        }
        // The collection is now transiently inconsistent; the next
        // renumbering pass repairs it.
        rows.fail_after(usize::MAX);
        ordering.renumber_by_rank().await.unwrap();
        assert!(rows.is_dense());
    }

    #[tokio::test]
    async fn set_explicit_order_moves_a_record_to_the_front() {
        let (rows, ids) = MemoryRows::seeded(3);
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        collection(&rows).set_explicit_order(c, 0, None).await.unwrap();
        assert_eq!(rows.snapshot(), vec![(c, 0), (a, 1), (b, 2)]);
    }

    #[tokio::test]
    async fn set_explicit_order_tie_break_favors_the_moved_record() {
        let (rows, ids) = MemoryRows::seeded(3);
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        // Moving a toward the end contests slot 2 with c. The moved row
        // sorts before the incumbent, so it lands immediately before c.
        collection(&rows).set_explicit_order(a, 2, None).await.unwrap();
        assert_eq!(rows.snapshot(), vec![(b, 0), (a, 1), (c, 2)]);
    }

    #[tokio::test]
    async fn set_explicit_order_checks_version_and_existence() {
        let (rows, ids) = MemoryRows::seeded(2);
        let ordering = collection(&rows);

        let err = ordering
            .set_explicit_order(Uuid::new_v4(), 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderingError::NotFound { .. }));

        let err = ordering
            .set_explicit_order(ids[0], 1, Some(7))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderingError::Conflict { .. }));

        let err = ordering
            .set_explicit_order(ids[0], -1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderingError::MalformedInput { .. }));
    }
}
