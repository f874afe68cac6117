//! Filesystem draft store: one pretty-printed `<draftId>.json` per draft

use std::path::{Path, PathBuf};

use chrono::Utc;
use directories::ProjectDirs;
use uuid::Uuid;

use super::{
    sort_summaries, DraftRecord, DraftStore, DraftSummary, PublishRequest, PublishedMap,
    SaveDraftRequest,
};
use crate::error::PersistenceError;

#[derive(Debug, Clone)]
pub struct FileDraftStore {
    root: PathBuf,
}

impl FileDraftStore {
    /// Store drafts under `root`, created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store drafts in the user data directory
    pub fn in_data_dir() -> Result<Self, PersistenceError> {
        Self::default_root().map(Self::new).ok_or(PersistenceError::NoStorageDir)
    }

    /// `<data dir>/drafts` for the editor
    pub fn default_root() -> Option<PathBuf> {
        ProjectDirs::from("com", "tile_forge", "tile_forge")
            .map(|dirs| dirs.data_dir().join("drafts"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, draft_id: Uuid) -> PathBuf {
        self.root.join(format!("{}.json", draft_id))
    }

    fn ensure_dir(&self) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.root).map_err(|e| PersistenceError::Io(e.to_string()))
    }

    fn read(path: &Path) -> Result<DraftRecord, PersistenceError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PersistenceError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| PersistenceError::Parse(e.to_string()))
    }

    fn read_if_exists(&self, draft_id: Uuid) -> Result<Option<DraftRecord>, PersistenceError> {
        let path = self.path_for(draft_id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn write(&self, record: &DraftRecord) -> Result<(), PersistenceError> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        let path = self.path_for(record.draft_id);
        std::fs::write(&path, content).map_err(|e| PersistenceError::Io(e.to_string()))?;

        bevy::log::debug!("Wrote draft {} to {:?}", record.draft_id, path);
        Ok(())
    }
}

impl DraftStore for FileDraftStore {
    fn save(&mut self, request: &SaveDraftRequest) -> Result<DraftRecord, PersistenceError> {
        let draft_id = request.draft_id.unwrap_or_else(Uuid::new_v4);
        let existing = self.read_if_exists(draft_id)?;
        let record = DraftRecord::from_save(draft_id, request, existing.as_ref(), Utc::now());
        self.write(&record)?;
        Ok(record)
    }

    fn load(&self, draft_id: Uuid) -> Result<DraftRecord, PersistenceError> {
        self.read_if_exists(draft_id)?
            .ok_or(PersistenceError::NotFound(draft_id))
    }

    fn list(&self) -> Result<Vec<DraftSummary>, PersistenceError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| PersistenceError::Io(e.to_string()))?;

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path) {
                Ok(record) => summaries.push(record.summary()),
                Err(e) => bevy::log::warn!("Skipping unreadable draft {:?}: {}", path, e),
            }
        }

        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    fn publish(
        &mut self,
        draft_id: Uuid,
        request: &PublishRequest,
    ) -> Result<PublishedMap, PersistenceError> {
        let mut record = self.load(draft_id)?;
        let published = record.publish(request, Utc::now());
        self.write(&record)?;
        Ok(published)
    }
}
