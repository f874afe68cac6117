//! Draft persistence collaborators
//!
//! The session never talks to storage directly during editing; it produces a
//! [`SaveDraftRequest`] and consumes the results. Anything implementing
//! [`DraftStore`] can back it: the in-process [`MemoryDraftStore`], the
//! filesystem [`FileDraftStore`], or a host's remote client.

mod file;
mod memory;

pub use file::FileDraftStore;
pub use memory::MemoryDraftStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::PersistenceError;

/// Fallback name for a published map when neither request nor draft has one
pub const UNTITLED_MAP_NAME: &str = "Untitled Contributor Map";

/// A stored draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub draft_id: Uuid,
    pub name: String,
    pub description: String,
    pub biome: String,
    pub difficulty: String,
    /// The map payload as produced by `MapDraft::to_value`
    pub map_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub published_map_id: Option<Uuid>,
}

impl DraftRecord {
    /// Apply a save request on top of the existing record (if any).
    ///
    /// Creation time and publish state survive re-saves; text fields are trimmed.
    pub fn from_save(
        draft_id: Uuid,
        request: &SaveDraftRequest,
        existing: Option<&DraftRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            draft_id,
            name: request.name.trim().to_string(),
            description: request.description.trim().to_string(),
            biome: request.biome.trim().to_string(),
            difficulty: request.difficulty.trim().to_string(),
            map_data: request.map_data.clone(),
            created_at: existing.map_or(now, |r| r.created_at),
            updated_at: now,
            published: existing.is_some_and(|r| r.published),
            published_map_id: existing.and_then(|r| r.published_map_id),
        }
    }

    /// Mark this draft published, reusing its map id on republish
    pub fn publish(&mut self, request: &PublishRequest, now: DateTime<Utc>) -> PublishedMap {
        let map_id = self.published_map_id.unwrap_or_else(Uuid::new_v4);
        let name = non_blank(&request.name).unwrap_or(self.name.trim());
        let description = non_blank(&request.description).unwrap_or(self.description.trim());

        self.published = true;
        self.published_map_id = Some(map_id);
        self.updated_at = now;

        PublishedMap {
            map_id,
            draft_id: self.draft_id,
            name: if name.is_empty() {
                UNTITLED_MAP_NAME.to_string()
            } else {
                name.to_string()
            },
            description: description.to_string(),
        }
    }

    pub fn summary(&self) -> DraftSummary {
        DraftSummary {
            draft_id: self.draft_id,
            name: self.name.clone(),
            description: self.description.clone(),
            updated_at: self.updated_at,
            published: self.published,
            published_map_id: self.published_map_id,
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Listing entry for a stored draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub draft_id: Uuid,
    pub name: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
    pub published: bool,
    pub published_map_id: Option<Uuid>,
}

/// Save a new draft (`draft_id: None`) or overwrite an existing one
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    pub draft_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub biome: String,
    pub difficulty: String,
    pub map_data: Value,
}

/// Metadata for publishing a draft; blank fields fall back to the draft's own
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublishRequest {
    pub name: String,
    pub description: String,
}

/// Result of publishing a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedMap {
    pub map_id: Uuid,
    pub draft_id: Uuid,
    pub name: String,
    pub description: String,
}

/// Draft storage collaborator
pub trait DraftStore: Send + Sync {
    /// Create or overwrite a draft and return the stored record
    fn save(&mut self, request: &SaveDraftRequest) -> Result<DraftRecord, PersistenceError>;

    fn load(&self, draft_id: Uuid) -> Result<DraftRecord, PersistenceError>;

    /// All drafts, most recently updated first
    fn list(&self) -> Result<Vec<DraftSummary>, PersistenceError>;

    fn publish(
        &mut self,
        draft_id: Uuid,
        request: &PublishRequest,
    ) -> Result<PublishedMap, PersistenceError>;

    /// Map payload of a published map, for play hosts that only know the map id
    fn published_map_data(&self, map_id: Uuid) -> Result<Value, PersistenceError> {
        let summary = self
            .list()?
            .into_iter()
            .find(|s| s.published_map_id == Some(map_id))
            .ok_or(PersistenceError::NotFound(map_id))?;
        Ok(self.load(summary.draft_id)?.map_data)
    }
}

/// Sort summaries most recently updated first
pub(crate) fn sort_summaries(summaries: &mut [DraftSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
