//! Lifecycle recording for API calls
//!
//! A call is opened with [`DebugRecorder::begin`], which files a
//! [`PendingEntry`] under a fresh correlation id. Completion looks the record
//! up by that id and commits the finalized entry to the store, so concurrent
//! calls never share mutable state.

use std::sync::Arc;

use dashmap::DashMap;

use crate::debug::store::DebugStore;
use crate::debug::types::{DebugEntry, HttpMethod, PendingEntry};
use crate::logging::generate_correlation_id;

#[derive(Clone)]
pub struct DebugRecorder {
    store: Arc<DebugStore>,
    in_flight: Arc<DashMap<String, PendingEntry>>,
}

impl DebugRecorder {
    pub fn new(store: Arc<DebugStore>) -> Self {
        Self {
            store,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<DebugStore> {
        &self.store
    }

    /// Open a record for a call being dispatched. Returns its correlation id.
    pub fn begin(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        request_body: Option<serde_json::Value>,
    ) -> String {
        let id = generate_correlation_id();
        let pending = PendingEntry::new(id.clone(), method, url.into(), request_body);
        self.in_flight.insert(id.clone(), pending);
        id
    }

    /// Commit a successful call.
    pub fn complete(
        &self,
        id: &str,
        status: u16,
        response_body: Option<serde_json::Value>,
    ) -> Option<DebugEntry> {
        self.commit(id, status, response_body, None)
    }

    /// Commit a failed call. A missing status is recorded as 0.
    pub fn fail(
        &self,
        id: &str,
        status: Option<u16>,
        response_body: Option<serde_json::Value>,
        error: impl Into<String>,
    ) -> Option<DebugEntry> {
        self.commit(id, status.unwrap_or(0), response_body, Some(error.into()))
    }

    /// Calls dispatched but not yet completed.
    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    fn commit(
        &self,
        id: &str,
        status: u16,
        response_body: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Option<DebugEntry> {
        let Some((_, pending)) = self.in_flight.remove(id) else {
            tracing::warn!(correlation_id = %id, "No in-flight debug record for completed call");
            return None;
        };

        let entry = pending.finish(status, response_body, error);
        self.store.add_entry(entry.clone());
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(cap: usize) -> DebugRecorder {
        DebugRecorder::new(Arc::new(DebugStore::new(cap)))
    }

    #[test]
    fn test_begin_does_not_touch_store() {
        let recorder = recorder(10);
        recorder.begin(HttpMethod::Get, "http://kb/api/teams", None);

        assert_eq!(recorder.pending_count(), 1);
        assert!(recorder.store().is_empty());
    }

    #[test]
    fn test_complete_commits_one_entry() {
        let recorder = recorder(10);
        let id = recorder.begin(
            HttpMethod::Post,
            "http://kb/api/teams",
            Some(json!({"name": "x"})),
        );

        let entry = recorder
            .complete(&id, 201, Some(json!({"success": true})))
            .unwrap();

        assert_eq!(entry.id, id);
        assert_eq!(entry.status, Some(201));
        assert!(entry.error.is_none());
        assert_eq!(recorder.pending_count(), 0);
        assert_eq!(recorder.store().entries(), vec![entry]);
    }

    #[test]
    fn test_fail_defaults_status_to_zero() {
        let recorder = recorder(10);
        let id = recorder.begin(HttpMethod::Get, "http://kb/api/teams", None);

        let entry = recorder.fail(&id, None, None, "connection refused").unwrap();
        assert_eq!(entry.status, Some(0));
        assert_eq!(entry.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let recorder = recorder(10);
        assert!(recorder.complete("missing", 200, None).is_none());
        assert!(recorder.store().is_empty());
    }

    #[test]
    fn test_second_completion_is_ignored() {
        let recorder = recorder(10);
        let id = recorder.begin(HttpMethod::Delete, "http://kb/api/teams/t1", None);

        assert!(recorder.complete(&id, 200, None).is_some());
        assert!(recorder.fail(&id, Some(500), None, "late").is_none());
        assert_eq!(recorder.store().len(), 1);
    }

    #[test]
    fn test_interleaved_calls_pair_by_id() {
        let recorder = recorder(10);
        let a = recorder.begin(HttpMethod::Get, "http://kb/api/a", None);
        let b = recorder.begin(HttpMethod::Get, "http://kb/api/b", None);

        recorder.complete(&b, 200, None);
        recorder.fail(&a, Some(404), None, "not found");

        let entries = recorder.store().entries();
        assert_eq!(entries[0].url, "http://kb/api/a");
        assert_eq!(entries[0].status, Some(404));
        assert_eq!(entries[1].url, "http://kb/api/b");
        assert_eq!(entries[1].status, Some(200));
    }
}
