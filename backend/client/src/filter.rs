//! Which markers are on screen.
//!
//! A marker is shown when its category is switched on and the search text is empty or
//! found in its title or description, ignoring case.
use std::collections::HashMap;

use catalog::{
    Category,
    marker::{MapMarker, Marker, MarkerType},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    categories: HashMap<u32, bool>,
}

impl Visibility {
    /// Every category starts visible.
    pub fn new(categories: &[Category]) -> Self {
        Self {
            categories: categories.iter().map(|category| (category.id, true)).collect(),
        }
    }

    /// Categories never seen before count as visible.
    pub fn is_visible(&self, category_id: u32) -> bool {
        self.categories.get(&category_id).copied().unwrap_or(true)
    }

    /// Flips one category and returns its new state. Other categories are untouched.
    pub fn toggle(&mut self, category_id: u32) -> bool {
        let visible = !self.is_visible(category_id);
        self.categories.insert(category_id, visible);
        visible
    }
}

pub fn matches_search(marker: &Marker, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let query = query.to_lowercase();

    marker.location.title.to_lowercase().contains(&query)
        || marker
            .location
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&query))
}

pub fn filter_markers<'a>(markers: &'a [Marker], visibility: &Visibility, query: &str) -> Vec<&'a Marker> {
    markers
        .iter()
        .filter(|marker| visibility.is_visible(marker.category_id()) && matches_search(marker, query))
        .collect()
}

/// Markers whose category has no marker type are dropped.
pub fn map_markers(markers: &[&Marker], marker_types: &[MarkerType]) -> Vec<MapMarker> {
    let types: HashMap<u32, &MarkerType> = marker_types
        .iter()
        .map(|marker_type| (marker_type.id, marker_type))
        .collect();

    markers
        .iter()
        .filter_map(|marker| {
            types
                .get(&marker.category_id())
                .map(|marker_type| MapMarker::new(marker, marker_type))
        })
        .collect()
}
