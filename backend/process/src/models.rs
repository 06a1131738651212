use serde::Deserialize;

pub const GROUPS_FILE: &str = "groups.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const LOCATIONS_FILE: &str = "locations.json";

#[derive(Deserialize)]
pub struct GroupSeed {
    pub title: String,
    pub color: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySeed {
    pub title: String,
    pub icon: String,
    #[serde(default)]
    pub template: Option<String>,
    pub group_id: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSeed {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category_id: u32,
}

pub struct Seeds {
    pub groups: Vec<GroupSeed>,
    pub categories: Vec<CategorySeed>,
    pub locations: Vec<LocationSeed>,
}

impl Seeds {
    pub fn len(&self) -> usize {
        self.groups.len() + self.categories.len() + self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub new_groups: usize,
    pub new_categories: usize,
    pub new_locations: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.new_groups == 0 && self.new_categories == 0 && self.new_locations == 0
    }
}
