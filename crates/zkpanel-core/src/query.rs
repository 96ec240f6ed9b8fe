// ── Lazy table queries ──
//
// A `QuerySet` accumulates filter/projection state without touching the
// device. Builder calls return a new value and leave the receiver intact;
// the receiver's cache is never shared forward. The first read access
// issues exactly one gateway round trip and memoizes the decoded rows for
// the lifetime of that QuerySet instance.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::Error;
use crate::gateway::{RawRow, TableFilters, TableGateway};
use crate::model::{Condition, Model, TableField};

/// A lazy, immutable query over one device table.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use zkpanel_core::{FieldKind, QuerySet, User};
/// # async fn example(gateway: Arc<dyn zkpanel_core::TableGateway>) -> Result<(), zkpanel_core::Error> {
/// let admins = QuerySet::<User>::new(gateway)
///     .filter(User::GROUP.eq("3"))
///     .filter(User::SUPER_AUTHORIZE.eq(true));
/// for user in admins.iter().await? {
///     println!("{:?}", user.card());
/// }
/// # Ok(())
/// # }
/// ```
pub struct QuerySet<M: Model> {
    gateway: Arc<dyn TableGateway>,
    filters: TableFilters,
    projection: BTreeSet<&'static str>,
    unread: bool,
    cache: OnceCell<Vec<M>>,
}

impl<M: Model> QuerySet<M> {
    /// A query over `M`'s table with no filters, full projection, and an
    /// empty cache.
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self {
            gateway,
            filters: TableFilters::new(),
            projection: BTreeSet::new(),
            unread: false,
            cache: OnceCell::new(),
        }
    }

    /// Copy of this query's builder state with a fresh, empty cache.
    fn derived(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            filters: self.filters.clone(),
            projection: self.projection.clone(),
            unread: self.unread,
            cache: OnceCell::new(),
        }
    }

    // ── Builder chain ────────────────────────────────────────────────

    /// Add an equality/membership condition. Conditions on different
    /// fields AND together; re-filtering a field replaces its previous
    /// condition entirely (last write wins per field).
    ///
    /// Never triggers a device call.
    pub fn filter(&self, condition: Condition) -> Self {
        let mut qs = self.derived();
        qs.filters
            .insert(condition.raw_field.to_owned(), condition.accepted);
        qs
    }

    /// Restrict the fields fetched from the device. Additive across
    /// calls; fields never selected decode as absent in the results.
    /// Selecting nothing at all means "all fields".
    pub fn select(&self, fields: &[&dyn TableField]) -> Self {
        let mut qs = self.derived();
        qs.projection.extend(fields.iter().map(|f| f.raw_name()));
        qs
    }

    /// [`select`](Self::select) by accessor name, for string-keyed
    /// callers. Unknown names fail with [`Error::UnknownField`].
    pub fn select_names<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, Error> {
        let mut qs = self.derived();
        for name in names {
            let def = M::field_defs()
                .iter()
                .find(|def| def.name == name)
                .ok_or_else(|| Error::unknown_field(M::MODEL_NAME, name))?;
            qs.projection.insert(def.raw_name);
        }
        Ok(qs)
    }

    /// Fetch only rows inserted since the table's read cursor. The cursor
    /// advances on the device when the query materializes; there is no
    /// way back to "all rows" on the same chain.
    pub fn unread(&self) -> Self {
        let mut qs = self.derived();
        qs.unread = true;
        qs
    }

    // ── Builder state inspection ─────────────────────────────────────

    pub fn filters(&self) -> &TableFilters {
        &self.filters
    }

    pub fn projection(&self) -> &BTreeSet<&'static str> {
        &self.projection
    }

    pub fn is_unread_only(&self) -> bool {
        self.unread
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Total row count of the table, straight from the device. Ignores
    /// every filter on this chain and does not touch the cache — this is
    /// *not* the filtered result size, and it always costs one round trip.
    pub async fn count(&self) -> Result<u64, Error> {
        Ok(self.gateway.count_table(M::TABLE_NAME).await?)
    }

    /// Materialize at most once: the first call issues one gateway read,
    /// decodes every row, and caches; later calls return the cache.
    async fn force(&self) -> Result<&Vec<M>, Error> {
        self.cache
            .get_or_try_init(|| async {
                // An empty accepted-value set can match no row; skip the
                // round trip entirely.
                if self.filters.values().any(BTreeSet::is_empty) {
                    debug!(
                        table = M::TABLE_NAME,
                        "query has an empty membership condition; returning no rows"
                    );
                    return Ok(Vec::new());
                }

                let fields: Vec<String> = self
                    .projection
                    .iter()
                    .map(|name| (*name).to_owned())
                    .collect();
                debug!(
                    table = M::TABLE_NAME,
                    filters = self.filters.len(),
                    unread = self.unread,
                    "materializing query"
                );
                let rows = self
                    .gateway
                    .read_table(M::TABLE_NAME, &self.filters, &fields, self.unread)
                    .await?;
                Ok(rows
                    .into_iter()
                    .map(|row| M::from_raw(row).bind(Arc::clone(&self.gateway)))
                    .collect())
            })
            .await
    }

    /// All matching rows, cloned out of the cache.
    pub async fn all(&self) -> Result<Vec<M>, Error> {
        Ok(self.force().await?.clone())
    }

    /// Iterate over the cached rows, materializing first if needed.
    pub async fn iter(&self) -> Result<std::slice::Iter<'_, M>, Error> {
        Ok(self.force().await?.iter())
    }

    /// Number of matching rows. Materializes; contrast with
    /// [`count`](Self::count).
    pub async fn len(&self) -> Result<usize, Error> {
        Ok(self.force().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.force().await?.is_empty())
    }

    /// Row at `index` within the materialized results.
    pub async fn get(&self, index: usize) -> Result<Option<M>, Error> {
        Ok(self.force().await?.get(index).cloned())
    }

    pub async fn first(&self) -> Result<Option<M>, Error> {
        self.get(0).await
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Upsert rows (insert, or update by the table's primary key).
    ///
    /// Ignores the filter state of this chain. Rows are written in order,
    /// one device call each; the first failure aborts the batch with
    /// [`Error::Batch`] naming the failing record. The device has no
    /// transactions, so earlier rows stay written.
    pub async fn upsert(&self, records: impl IntoIterator<Item = M>) -> Result<(), Error> {
        let rows: Vec<RawRow> = records.into_iter().map(|r| r.to_raw()).collect();
        self.write_rows(rows).await
    }

    /// [`upsert`](Self::upsert) from `(field name, raw value)` pairs.
    /// Every record is validated against the model registry before
    /// anything is sent.
    pub async fn upsert_fields<'a, I>(&self, records: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let rows = self.encode_field_records(records)?;
        self.write_rows(rows).await
    }

    /// Delete rows by natural key.
    ///
    /// Same batching and failure semantics as [`upsert`](Self::upsert).
    pub async fn delete(&self, records: impl IntoIterator<Item = M>) -> Result<(), Error> {
        let rows: Vec<RawRow> = records.into_iter().map(|r| r.key_row()).collect();
        self.delete_rows(rows).await
    }

    /// [`delete`](Self::delete) from `(field name, raw value)` pairs.
    pub async fn delete_fields<'a, I>(&self, records: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let rows = self.encode_field_records(records)?;
        let keyed = rows
            .into_iter()
            .map(|row| M::from_raw(row).key_row())
            .collect();
        self.delete_rows(keyed).await
    }

    /// Delete every row matching this query: materialize (if not already
    /// done), then delete each cached row by natural key. The device has
    /// no delete-by-filter primitive. Returns the number of rows deleted.
    pub async fn delete_all(&self) -> Result<usize, Error> {
        let rows: Vec<RawRow> = self.force().await?.iter().map(|row| row.key_row()).collect();
        let count = rows.len();
        self.delete_rows(rows).await?;
        Ok(count)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn encode_field_records<'a, I>(&self, records: I) -> Result<Vec<RawRow>, Error>
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = (&'a str, &'a str)>,
    {
        records
            .into_iter()
            .enumerate()
            .map(|(index, pairs)| {
                M::from_fields(pairs)
                    .map(|record| record.to_raw())
                    .map_err(|source| Error::batch(index, source))
            })
            .collect()
    }

    async fn write_rows(&self, rows: Vec<RawRow>) -> Result<(), Error> {
        for (index, row) in rows.into_iter().enumerate() {
            self.gateway
                .write_table(M::TABLE_NAME, vec![row])
                .await
                .map_err(|source| Error::batch(index, source.into()))?;
        }
        Ok(())
    }

    async fn delete_rows(&self, rows: Vec<RawRow>) -> Result<(), Error> {
        for (index, row) in rows.into_iter().enumerate() {
            self.gateway
                .delete_table(M::TABLE_NAME, vec![row])
                .await
                .map_err(|source| Error::batch(index, source.into()))?;
        }
        Ok(())
    }
}

impl<M: Model> std::fmt::Debug for QuerySet<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySet")
            .field("table", &M::TABLE_NAME)
            .field("filters", &self.filters)
            .field("projection", &self.projection)
            .field("unread", &self.unread)
            .field("cached", &self.cache.initialized())
            .finish()
    }
}
