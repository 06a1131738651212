//! Optimistic completion toggles.
//!
//! A toggle flips the marker locally first, then asks the server. On success the
//! server's record wins, on failure the flip is undone.
//!
//! The selected marker is stored as an id and always read back out of the list, so the
//! detail card and the map can never disagree about a completed flag.
use std::collections::HashMap;

use catalog::{marker::Marker, payloads::CompletionRecord};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ClientError, TrackerApi};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No marker with id {0}")]
    UnknownMarker(u32),

    #[error(transparent)]
    Api(#[from] ClientError),
}

/// A local flip waiting for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PendingToggle {
    location_id: u32,
    previous: bool,
}

impl PendingToggle {
    pub fn location_id(&self) -> u32 {
        self.location_id
    }

    fn predicted(&self) -> bool {
        !self.previous
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkerSync {
    markers: Vec<Marker>,
    selected: Option<u32>,
    in_flight: HashMap<u32, usize>,
    confirmed: HashMap<u32, bool>,
}

impl MarkerSync {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self {
            markers,
            ..Self::default()
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: u32) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id() == id)
    }

    fn marker_mut(&mut self, id: u32) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|marker| marker.id() == id)
    }

    /// Returns the newly selected marker, `None` (and no selection) for unknown ids.
    pub fn select(&mut self, id: u32) -> Option<&Marker> {
        self.selected = self.marker(id).map(Marker::id);
        self.selected()
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Marker> {
        self.selected.and_then(|id| self.marker(id))
    }

    pub fn is_pending(&self, id: u32) -> bool {
        self.in_flight.get(&id).is_some_and(|&count| count > 0)
    }

    pub fn begin_toggle(&mut self, location_id: u32) -> Option<PendingToggle> {
        let idle = !self.is_pending(location_id);
        let marker = self.marker_mut(location_id)?;
        let previous = marker.completed;
        marker.completed = !previous;

        // With nothing in flight the displayed value is what the server has.
        if idle {
            self.confirmed.insert(location_id, previous);
        }
        *self.in_flight.entry(location_id).or_default() += 1;

        Some(PendingToggle {
            location_id,
            previous,
        })
    }

    /// Records the server's value and returns it. The marker only shows it once no newer
    /// toggle of the same marker is outstanding.
    pub fn confirm(&mut self, pending: PendingToggle, record: &CompletionRecord) -> bool {
        if record.completed != pending.predicted() {
            debug!(
                "Server disagreed on location {}: completed {}",
                pending.location_id, record.completed
            );
        }

        self.confirmed.insert(pending.location_id, record.completed);
        if self.settle(pending.location_id) > 0 {
            return record.completed;
        }

        if let Some(marker) = self.marker_mut(pending.location_id) {
            marker.completed = record.completed;
        }

        record.completed
    }

    /// Once the last outstanding toggle of a marker is settled, it shows the last value
    /// the server confirmed.
    pub fn revert(&mut self, pending: PendingToggle) {
        if self.settle(pending.location_id) > 0 {
            return;
        }

        let confirmed = self
            .confirmed
            .get(&pending.location_id)
            .copied()
            .unwrap_or(pending.previous);

        if let Some(marker) = self.marker_mut(pending.location_id) {
            marker.completed = confirmed;
        }
    }

    /// Returns how many toggles of the marker are still outstanding.
    fn settle(&mut self, location_id: u32) -> usize {
        match self.in_flight.get_mut(&location_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                *count
            }
            _ => {
                self.in_flight.remove(&location_id);
                0
            }
        }
    }

    pub async fn toggle(&mut self, api: &dyn TrackerApi, location_id: u32) -> Result<bool, SyncError> {
        let pending = self
            .begin_toggle(location_id)
            .ok_or(SyncError::UnknownMarker(location_id))?;

        match api.toggle(location_id).await {
            Ok(record) => Ok(self.confirm(pending, &record)),
            Err(e) => {
                warn!("Failed to toggle location {location_id}: {e}");
                self.revert(pending);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::{BTreeSet, HashMap},
        sync::{
            Mutex,
            atomic::{AtomicBool, Ordering},
        },
    };

    use async_trait::async_trait;
    use catalog::{Category, Group, Location, payloads::Registration};
    use reqwest::StatusCode;

    use super::*;

    /// Server stand-in with the same flip semantics as the real store. Until `register`
    /// is called, per-user calls answer 404 like the server does.
    #[derive(Default)]
    pub struct FakeApi {
        pub records: Mutex<HashMap<u32, bool>>,
        pub registered: AtomicBool,
        pub fail: bool,
        pub force: Option<bool>,
    }

    impl FakeApi {
        pub fn registered() -> Self {
            Self {
                registered: AtomicBool::new(true),
                ..Self::default()
            }
        }

        fn check_registered(&self) -> Result<(), ClientError> {
            if self.registered.load(Ordering::SeqCst) {
                return Ok(());
            }

            Err(ClientError::Status {
                status: StatusCode::NOT_FOUND,
                message: "User not found".to_string(),
            })
        }
    }

    pub fn location(id: u32, category_id: u32, title: &str) -> Location {
        Location {
            id,
            title: title.to_string(),
            description: None,
            latitude: 0.7,
            longitude: -0.7,
            category_id,
        }
    }

    #[async_trait]
    impl TrackerApi for FakeApi {
        async fn register(&self) -> Result<Registration, ClientError> {
            let created = !self.registered.swap(true, Ordering::SeqCst);

            Ok(Registration { user_id: 1, created })
        }

        async fn groups(&self) -> Result<Vec<Group>, ClientError> {
            Ok(vec![Group {
                id: 1,
                title: "Collectibles".to_string(),
                color: "#FFD700".to_string(),
            }])
        }

        async fn categories(&self) -> Result<Vec<Category>, ClientError> {
            Ok(vec![
                Category {
                    id: 5,
                    title: "Chest".to_string(),
                    icon: "chest".to_string(),
                    template: None,
                    group_id: 1,
                },
                Category {
                    id: 6,
                    title: "Lost Gestral".to_string(),
                    icon: "gestral".to_string(),
                    template: None,
                    group_id: 1,
                },
            ])
        }

        async fn locations(&self) -> Result<Vec<Location>, ClientError> {
            Ok(vec![
                location(1, 5, "Chest"),
                location(2, 5, "Golden Chest"),
                location(3, 6, "Lost Gestral"),
            ])
        }

        async fn completed_ids(&self) -> Result<BTreeSet<u32>, ClientError> {
            self.check_registered()?;
            let records = self.records.lock().unwrap();

            Ok(records
                .iter()
                .filter(|&(_, &completed)| completed)
                .map(|(&id, _)| id)
                .collect())
        }

        async fn toggle(&self, location_id: u32) -> Result<CompletionRecord, ClientError> {
            if self.fail {
                return Err(ClientError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal Server Error".to_string(),
                });
            }
            self.check_registered()?;

            let mut records = self.records.lock().unwrap();
            let completed = records.get(&location_id).map_or(true, |completed| !completed);
            let completed = self.force.unwrap_or(completed);
            records.insert(location_id, completed);

            Ok(CompletionRecord {
                user_id: 1,
                location_id,
                completed,
            })
        }
    }

    fn sync() -> MarkerSync {
        MarkerSync::new(vec![
            Marker {
                location: location(1, 5, "Chest"),
                completed: false,
            },
            Marker {
                location: location(2, 5, "Golden Chest"),
                completed: true,
            },
        ])
    }

    #[test]
    fn test_flip_is_immediate() {
        let mut sync = sync();

        let pending = sync.begin_toggle(1).unwrap();

        assert_eq!(pending.location_id(), 1);
        assert!(sync.marker(1).unwrap().completed);
        assert!(sync.begin_toggle(99).is_none());
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let mut sync = sync();
        let api = FakeApi::registered();

        assert!(sync.toggle(&api, 1).await.unwrap());
        assert!(sync.marker(1).unwrap().completed);

        assert!(!sync.toggle(&api, 1).await.unwrap());
        assert!(!sync.marker(1).unwrap().completed);
    }

    #[tokio::test]
    async fn test_server_value_wins() {
        let mut sync = sync();
        let api = FakeApi {
            force: Some(false),
            ..FakeApi::registered()
        };

        assert!(!sync.toggle(&api, 1).await.unwrap());
        assert!(!sync.marker(1).unwrap().completed);
    }

    #[tokio::test]
    async fn test_failure_reverts() {
        let mut sync = sync();
        sync.select(2);
        let api = FakeApi {
            fail: true,
            ..FakeApi::default()
        };

        let result = sync.toggle(&api, 2).await;

        assert!(matches!(result, Err(SyncError::Api(ClientError::Status { .. }))));
        assert!(sync.marker(2).unwrap().completed);
        assert!(sync.selected().unwrap().completed);
    }

    #[tokio::test]
    async fn test_unknown_marker() {
        let mut sync = sync();

        let result = sync.toggle(&FakeApi::default(), 42).await;

        assert!(matches!(result, Err(SyncError::UnknownMarker(42))));
    }

    #[tokio::test]
    async fn test_selection_follows_toggle() {
        let mut sync = sync();
        let api = FakeApi::registered();

        assert_eq!(sync.select(1).map(Marker::id), Some(1));
        assert!(!sync.selected().unwrap().completed);

        let pending = sync.begin_toggle(1).unwrap();
        assert!(sync.selected().unwrap().completed);
        sync.revert(pending);
        assert!(!sync.selected().unwrap().completed);

        sync.toggle(&api, 1).await.unwrap();
        assert_eq!(sync.selected(), sync.marker(1));

        assert!(sync.select(77).is_none());
        assert!(sync.selected().is_none());

        sync.select(2);
        sync.deselect();
        assert!(sync.selected().is_none());
    }

    #[test]
    fn test_overlapping_failures_restore_server_value() {
        let mut sync = sync();

        let first = sync.begin_toggle(1).unwrap();
        let second = sync.begin_toggle(1).unwrap();
        assert!(!sync.marker(1).unwrap().completed);
        assert!(sync.is_pending(1));

        sync.revert(first);
        assert!(!sync.marker(1).unwrap().completed);

        sync.revert(second);
        assert!(!sync.marker(1).unwrap().completed);
        assert!(!sync.is_pending(1));
    }

    #[test]
    fn test_failure_after_confirm_keeps_confirmed_value() {
        let mut sync = sync();
        let record = |completed| CompletionRecord {
            user_id: 1,
            location_id: 1,
            completed,
        };

        let first = sync.begin_toggle(1).unwrap();
        let second = sync.begin_toggle(1).unwrap();

        assert!(sync.confirm(first, &record(true)));
        assert!(!sync.marker(1).unwrap().completed);

        sync.revert(second);
        assert!(sync.marker(1).unwrap().completed);
        assert!(!sync.is_pending(1));
    }

    #[test]
    fn test_older_confirm_keeps_newer_flip() {
        let mut sync = sync();
        let record = |completed| CompletionRecord {
            user_id: 1,
            location_id: 1,
            completed,
        };

        let first = sync.begin_toggle(1).unwrap();
        let second = sync.begin_toggle(1).unwrap();
        assert!(!sync.marker(1).unwrap().completed);

        sync.confirm(first, &record(true));
        assert!(!sync.marker(1).unwrap().completed);
        assert!(sync.is_pending(1));

        assert!(!sync.confirm(second, &record(false)));
        assert!(!sync.marker(1).unwrap().completed);
        assert!(!sync.is_pending(1));
    }

    #[tokio::test]
    async fn test_unregistered_toggle_reverts() {
        let mut sync = sync();

        let result = sync.toggle(&FakeApi::default(), 1).await;

        assert!(matches!(
            result,
            Err(SyncError::Api(ClientError::Status { status: StatusCode::NOT_FOUND, .. }))
        ));
        assert!(!sync.marker(1).unwrap().completed);
    }
}
