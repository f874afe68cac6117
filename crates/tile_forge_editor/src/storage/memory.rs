//! In-process draft store

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{
    sort_summaries, DraftRecord, DraftStore, DraftSummary, PublishRequest, PublishedMap,
    SaveDraftRequest,
};
use crate::error::PersistenceError;

/// Drafts kept in a map for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    drafts: HashMap<Uuid, DraftRecord>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&mut self, request: &SaveDraftRequest) -> Result<DraftRecord, PersistenceError> {
        let draft_id = request.draft_id.unwrap_or_else(Uuid::new_v4);
        let record =
            DraftRecord::from_save(draft_id, request, self.drafts.get(&draft_id), Utc::now());
        self.drafts.insert(draft_id, record.clone());
        Ok(record)
    }

    fn load(&self, draft_id: Uuid) -> Result<DraftRecord, PersistenceError> {
        self.drafts
            .get(&draft_id)
            .cloned()
            .ok_or(PersistenceError::NotFound(draft_id))
    }

    fn list(&self) -> Result<Vec<DraftSummary>, PersistenceError> {
        let mut summaries: Vec<_> = self.drafts.values().map(DraftRecord::summary).collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    fn publish(
        &mut self,
        draft_id: Uuid,
        request: &PublishRequest,
    ) -> Result<PublishedMap, PersistenceError> {
        let record = self
            .drafts
            .get_mut(&draft_id)
            .ok_or(PersistenceError::NotFound(draft_id))?;
        Ok(record.publish(request, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(draft_id: Option<Uuid>, name: &str) -> SaveDraftRequest {
        SaveDraftRequest {
            draft_id,
            name: name.to_string(),
            map_data: json!({ "width": 2 }),
            ..Default::default()
        }
    }

    #[test]
    fn test_save_assigns_id_and_overwrites() {
        let mut store = MemoryDraftStore::new();
        let first = store.save(&request(None, "One")).unwrap();
        let again = store.save(&request(Some(first.draft_id), "Two")).unwrap();

        assert_eq!(again.draft_id, first.draft_id);
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(first.draft_id).unwrap().name, "Two");
    }

    #[test]
    fn test_load_missing() {
        let store = MemoryDraftStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.load(id), Err(PersistenceError::NotFound(id)));
    }

    #[test]
    fn test_list_newest_first() {
        let mut store = MemoryDraftStore::new();
        let old = store.save(&request(None, "old")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let new = store.save(&request(None, "new")).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|s| s.draft_id).collect();
        assert_eq!(ids, vec![new.draft_id, old.draft_id]);
    }

    #[test]
    fn test_publish_and_lookup_by_map_id() {
        let mut store = MemoryDraftStore::new();
        let draft = store.save(&request(None, "Pub")).unwrap();

        let published = store.publish(draft.draft_id, &PublishRequest::default()).unwrap();
        assert!(store.load(draft.draft_id).unwrap().published);
        assert_eq!(
            store.published_map_data(published.map_id).unwrap(),
            json!({ "width": 2 })
        );

        let missing = Uuid::new_v4();
        assert_eq!(
            store.publish(missing, &PublishRequest::default()),
            Err(PersistenceError::NotFound(missing))
        );
    }
}
