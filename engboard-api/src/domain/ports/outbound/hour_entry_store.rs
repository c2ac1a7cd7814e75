use async_trait::async_trait;

use crate::domain::{
    models::{HourEntry, HourEntryId, NewHourEntry, RecordFilter},
    StoreError,
};

/// Sort order for hour entry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrder {
    /// Newest date first, ties broken by newest creation time.
    Latest,
    /// Oldest date first.
    Chronological,
}

#[async_trait]
pub trait HourEntryStore: Send + Sync + 'static {
    /// Entries matching `filter` with project, task and engineer names embedded.
    async fn list_hour_entries(
        &self,
        filter: &RecordFilter,
        order: EntryOrder,
    ) -> Result<Vec<HourEntry>, StoreError>;

    async fn get_hour_entry(&self, id: &HourEntryId) -> Result<Option<HourEntry>, StoreError>;

    async fn insert_hour_entry(&self, entry: &NewHourEntry) -> Result<HourEntry, StoreError>;

    async fn delete_hour_entry(&self, id: &HourEntryId) -> Result<(), StoreError>;
}
