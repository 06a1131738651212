//! # Reference Data
//!
//! Groups, categories and locations. Written once by the seeding tool, read-only afterwards.
//!
//! The snapshot is protobuf encoded. Messages are declared with the prost derive directly
//! instead of a `.proto` file so no `protoc` is needed at build time.
//!
//! ## Ownership
//! - Group: top level bucket, owns a display color
//! - Category: one group, owns an icon and an optional description template
//! - Location: one category, a point on the map
use prost::Message;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
pub struct Group {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, tag = "3")]
    pub color: String,
}

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, tag = "3")]
    pub icon: String,
    #[prost(string, optional, tag = "4")]
    pub template: Option<String>,
    #[prost(uint32, tag = "5")]
    pub group_id: u32,
}

#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, optional, tag = "3")]
    pub description: Option<String>,
    #[prost(double, tag = "4")]
    pub latitude: f64,
    #[prost(double, tag = "5")]
    pub longitude: f64,
    #[prost(uint32, tag = "6")]
    pub category_id: u32,
}

/// Full reference snapshot.
///
/// `next_group_id` and `next_category_id` hand out ids to new titles during seeding.
/// Location ids come from the source data.
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[prost(message, repeated, tag = "1")]
    pub groups: Vec<Group>,
    #[prost(message, repeated, tag = "2")]
    pub categories: Vec<Category>,
    #[prost(message, repeated, tag = "3")]
    pub locations: Vec<Location>,
    #[prost(uint32, tag = "4")]
    pub next_group_id: u32,
    #[prost(uint32, tag = "5")]
    pub next_category_id: u32,
}

impl Catalog {
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Requires `locations` sorted by id, see [`Catalog::sort`].
    pub fn location(&self, id: u32) -> Option<&Location> {
        self.locations
            .binary_search_by_key(&id, |location| location.id)
            .ok()
            .map(|index| &self.locations[index])
    }

    pub fn group(&self, id: u32) -> Option<&Group> {
        self.groups
            .binary_search_by_key(&id, |group| group.id)
            .ok()
            .map(|index| &self.groups[index])
    }

    pub fn category(&self, id: u32) -> Option<&Category> {
        self.categories
            .binary_search_by_key(&id, |category| category.id)
            .ok()
            .map(|index| &self.categories[index])
    }

    pub fn sort(&mut self) {
        self.groups.sort_by_key(|group| group.id);
        self.categories.sort_by_key(|category| category.id);
        self.locations.sort_by_key(|location| location.id);
    }

    /// Every category must point at a group, every location at a category.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for category in &self.categories {
            if self.group(category.group_id).is_none() {
                return Err(CatalogError::DanglingGroup {
                    category: category.id,
                    group: category.group_id,
                });
            }
        }

        for location in &self.locations {
            if self.category(location.category_id).is_none() {
                return Err(CatalogError::DanglingCategory {
                    location: location.id,
                    category: location.category_id,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn sample() -> Catalog {
        let mut catalog = Catalog {
            groups: vec![
                Group {
                    id: 2,
                    title: "Enemies".to_string(),
                    color: "#FF6347".to_string(),
                },
                Group {
                    id: 1,
                    title: "Collectibles".to_string(),
                    color: "#FFD700".to_string(),
                },
            ],
            categories: vec![
                Category {
                    id: 5,
                    title: "Chest".to_string(),
                    icon: "chest".to_string(),
                    template: None,
                    group_id: 1,
                },
                Category {
                    id: 6,
                    title: "World Boss".to_string(),
                    icon: "skull".to_string(),
                    template: Some("Level {level}".to_string()),
                    group_id: 2,
                },
            ],
            locations: vec![
                Location {
                    id: 3,
                    title: "Chroma Catalyst".to_string(),
                    description: None,
                    latitude: 0.68,
                    longitude: -0.73,
                    category_id: 5,
                },
                Location {
                    id: 1,
                    title: "Chest".to_string(),
                    description: Some("Behind the waterfall".to_string()),
                    latitude: 0.7,
                    longitude: -0.7,
                    category_id: 5,
                },
                Location {
                    id: 2,
                    title: "Chromatic Troubadour".to_string(),
                    description: Some("Guards the bridge".to_string()),
                    latitude: 0.65,
                    longitude: -0.71,
                    category_id: 6,
                },
            ],
            next_group_id: 3,
            next_category_id: 7,
        };
        catalog.sort();
        catalog
    }

    #[test]
    fn test_sorted_lookup() {
        let catalog = sample();

        let ids: Vec<u32> = catalog.locations().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(catalog.groups()[0].title, "Collectibles");

        assert_eq!(catalog.location(2).map(|l| l.title.as_str()), Some("Chromatic Troubadour"));
        assert!(catalog.location(42).is_none());
    }

    #[test]
    fn test_validate_references() {
        let mut catalog = sample();
        assert!(catalog.validate().is_ok());

        catalog.locations[0].category_id = 99;
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DanglingCategory { location: 1, category: 99 })
        ));

        let mut catalog = sample();
        catalog.categories[0].group_id = 77;
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DanglingGroup { category: 5, group: 77 })
        ));
    }

    #[test]
    fn test_json_field_names() {
        let catalog = sample();
        let json = serde_json::to_value(&catalog.categories()[0]).unwrap();

        assert_eq!(json["groupId"], 1);
        assert!(json["template"].is_null());
    }
}
