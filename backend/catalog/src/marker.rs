//! # Markers
//!
//! Derived, per-user views over the catalog. Nothing here is persisted.
//!
//! - Marker: a location plus the caller's completed flag
//! - Marker type: display info for a category, color taken from its group
//! - Map marker: the flat shape a map renderer draws and reports clicks for
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{Category, Group, Location};

pub const DEFAULT_MARKER_COLOR: &str = "#DDA0DD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(flatten)]
    pub location: Location,
    pub completed: bool,
}

impl Marker {
    pub fn id(&self) -> u32 {
        self.location.id
    }

    pub fn category_id(&self) -> u32 {
        self.location.category_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerType {
    pub id: u32,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub group_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: u32,
    #[serde(rename = "type")]
    pub marker_type: u32,
    pub lng: f64,
    pub lat: f64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub color: String,
    pub icon: String,
}

impl MapMarker {
    pub fn new(marker: &Marker, marker_type: &MarkerType) -> Self {
        Self {
            id: marker.id(),
            marker_type: marker_type.id,
            lng: marker.location.longitude,
            lat: marker.location.latitude,
            title: marker.location.title.clone(),
            description: marker.location.description.clone(),
            completed: marker.completed,
            color: marker_type.color.clone(),
            icon: marker_type.icon.clone(),
        }
    }
}

/// Recomputed from its inputs on every call.
pub fn categories_to_marker_types(categories: &[Category], groups: &[Group]) -> Vec<MarkerType> {
    let colors: HashMap<u32, &str> = groups
        .iter()
        .map(|group| (group.id, group.color.as_str()))
        .collect();

    categories
        .iter()
        .map(|category| MarkerType {
            id: category.id,
            title: category.title.clone(),
            icon: category.icon.clone(),
            color: colors
                .get(&category.group_id)
                .copied()
                .unwrap_or(DEFAULT_MARKER_COLOR)
                .to_string(),
            group_id: category.group_id,
        })
        .collect()
}

/// Locations without an id in `completed` come out incomplete.
pub fn build_markers(locations: &[Location], completed: &BTreeSet<u32>) -> Vec<Marker> {
    locations
        .iter()
        .map(|location| Marker {
            location: location.clone(),
            completed: completed.contains(&location.id),
        })
        .collect()
}
