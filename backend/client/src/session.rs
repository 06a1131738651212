//! One map session: catalog loaded once, the caller's completions merged in, then
//! filtered and drawn on every change.
use catalog::{
    Category, Group,
    marker::{MapMarker, Marker, MarkerType, build_markers, categories_to_marker_types},
};
use tracing::info;

use crate::{
    api::{ClientError, TrackerApi},
    filter::{Visibility, filter_markers, map_markers},
    sync::{MarkerSync, SyncError},
};

pub struct Session {
    groups: Vec<Group>,
    categories: Vec<Category>,
    marker_types: Vec<MarkerType>,
    visibility: Visibility,
    query: String,
    sync: MarkerSync,
}

impl Session {
    /// Registers the caller before reading its completions, so a first visit starts
    /// with every marker incomplete.
    pub async fn load(api: &dyn TrackerApi) -> Result<Self, ClientError> {
        let registration = api.register().await?;
        if registration.created {
            info!("Registered as user {}", registration.user_id);
        }

        let groups = api.groups().await?;
        let categories = api.categories().await?;
        let locations = api.locations().await?;
        let completed = api.completed_ids().await?;

        info!(
            "Loaded {} locations, {} completed",
            locations.len(),
            completed.len()
        );

        Ok(Self::new(groups, categories, build_markers(&locations, &completed)))
    }

    pub fn new(groups: Vec<Group>, categories: Vec<Category>, markers: Vec<Marker>) -> Self {
        Self {
            marker_types: categories_to_marker_types(&categories, &groups),
            visibility: Visibility::new(&categories),
            groups,
            categories,
            query: String::new(),
            sync: MarkerSync::new(markers),
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Categories of one group, for the sidebar.
    pub fn categories_of(&self, group_id: u32) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |category| category.group_id == group_id)
    }

    pub fn marker_types(&self) -> &[MarkerType] {
        &self.marker_types
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn toggle_category(&mut self, category_id: u32) -> bool {
        self.visibility.toggle(category_id)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn markers(&self) -> &MarkerSync {
        &self.sync
    }

    pub fn markers_mut(&mut self) -> &mut MarkerSync {
        &mut self.sync
    }

    pub fn visible_markers(&self) -> Vec<&Marker> {
        filter_markers(self.sync.markers(), &self.visibility, &self.query)
    }

    pub fn map_markers(&self) -> Vec<MapMarker> {
        map_markers(&self.visible_markers(), &self.marker_types)
    }

    /// Map click.
    pub fn select(&mut self, id: u32) -> Option<&Marker> {
        self.sync.select(id)
    }

    pub async fn toggle_completed(&mut self, api: &dyn TrackerApi, id: u32) -> Result<bool, SyncError> {
        self.sync.toggle(api, id).await
    }
}
