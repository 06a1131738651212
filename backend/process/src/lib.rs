//! # Catalog Seeding
//!
//! Turns the hand-maintained JSON files into the catalog snapshot the server loads.
//!
//! ## Inputs
//! - `groups.json`: `[{title, color}]`
//! - `categories.json`: `[{title, icon, template?, groupId}]`
//! - `locations.json`: `[{id, title, description?, latitude, longitude, categoryId}]`
//!
//! ## Upserts
//! - Groups and categories are matched by title, ignoring case and extra whitespace.
//!   A new title gets the next free id, an existing one is left untouched.
//! - Locations are matched by their explicit id, existing ones are left untouched.
//! - Running twice over the same files changes nothing.
//!
//! ## Notes
//! - Category `groupId` and location `categoryId` must point at ids present after the
//!   upsert, otherwise nothing is written.
//! - The snapshot is sorted by id before writing so the server can binary search it.
use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    path::Path,
};

use catalog::{Catalog, CatalogError, Category, Group, Location, get_catalog, write_catalog};
use indicatif::{ProgressBar, ProgressStyle, style::TemplateError};
use thiserror::Error;

pub mod models;
pub mod utils;

use models::{CATEGORIES_FILE, GROUPS_FILE, LOCATIONS_FILE, SeedReport, Seeds};
use utils::{clean_title, read_json, title_key};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Invalid progress template: {0}")]
    Template(#[from] TemplateError),
}

pub fn load_seeds(data_dir: &Path) -> Result<Seeds, SeedError> {
    Ok(Seeds {
        groups: read_json(&data_dir.join(GROUPS_FILE))?,
        categories: read_json(&data_dir.join(CATEGORIES_FILE))?,
        locations: read_json(&data_dir.join(LOCATIONS_FILE))?,
    })
}

/// Seeds `output` in place. An existing snapshot is extended unless `fresh` is set.
pub fn load_catalog(data_dir: &Path, output: &Path, fresh: bool) -> Result<SeedReport, SeedError> {
    let mut catalog = if !fresh && output.exists() {
        get_catalog(output)?
    } else {
        Catalog::default()
    };

    println!("Loaded Groups: {}", catalog.groups().len());
    println!("Loaded Categories: {}", catalog.categories().len());
    println!("Loaded Locations: {}\n", catalog.locations().len());

    let seeds = load_seeds(data_dir)?;

    let pb = ProgressBar::new(seeds.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let report = seed_catalog(&mut catalog, seeds, &pb)?;
    pb.finish_with_message("Done");

    if report.is_empty() {
        println!("No new groups, categories or locations found.");
    } else {
        println!("New Groups: {}", report.new_groups);
        println!("New Categories: {}", report.new_categories);
        println!("New Locations: {}\n", report.new_locations);
    }

    println!("Group Verification: {}", catalog.groups().len());
    println!("Category Verification: {}", catalog.categories().len());
    println!("Location Verification: {}", catalog.locations().len());

    write_catalog(output, &catalog)?;

    Ok(report)
}

/// Leaves `catalog` sorted and validated. On a dangling reference the error is returned
/// and the caller must not write the catalog.
pub fn seed_catalog(catalog: &mut Catalog, seeds: Seeds, pb: &ProgressBar) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    catalog.next_group_id = catalog.next_group_id.max(1);
    catalog.next_category_id = catalog.next_category_id.max(1);

    pb.set_message("Seeding groups");
    let mut groups: HashMap<String, u32> = catalog
        .groups
        .iter()
        .map(|group| (title_key(&group.title), group.id))
        .collect();

    for seed in seeds.groups {
        if let Entry::Vacant(entry) = groups.entry(title_key(&seed.title)) {
            #[cfg(feature = "verbose")]
            println!("New group! {}", entry.key());

            entry.insert(catalog.next_group_id);
            catalog.groups.push(Group {
                id: catalog.next_group_id,
                title: clean_title(&seed.title),
                color: seed.color,
            });

            catalog.next_group_id += 1;
            report.new_groups += 1;
        }
        pb.inc(1);
    }

    pb.set_message("Seeding categories");
    let mut categories: HashMap<String, u32> = catalog
        .categories
        .iter()
        .map(|category| (title_key(&category.title), category.id))
        .collect();

    for seed in seeds.categories {
        if let Entry::Vacant(entry) = categories.entry(title_key(&seed.title)) {
            #[cfg(feature = "verbose")]
            println!("New category! {}", entry.key());

            entry.insert(catalog.next_category_id);
            catalog.categories.push(Category {
                id: catalog.next_category_id,
                title: clean_title(&seed.title),
                icon: seed.icon,
                template: seed.template,
                group_id: seed.group_id,
            });

            catalog.next_category_id += 1;
            report.new_categories += 1;
        }
        pb.inc(1);
    }

    pb.set_message("Seeding locations");
    let mut locations: HashSet<u32> = catalog.locations.iter().map(|location| location.id).collect();

    for seed in seeds.locations {
        if locations.insert(seed.id) {
            catalog.locations.push(Location {
                id: seed.id,
                title: seed.title.trim().to_string(),
                description: seed.description,
                latitude: seed.latitude,
                longitude: seed.longitude,
                category_id: seed.category_id,
            });

            report.new_locations += 1;
        }
        pb.inc(1);
    }

    catalog.sort();
    catalog.validate()?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_data(dir: &Path, groups: &str, categories: &str, locations: &str) {
        fs::write(dir.join(GROUPS_FILE), groups).unwrap();
        fs::write(dir.join(CATEGORIES_FILE), categories).unwrap();
        fs::write(dir.join(LOCATIONS_FILE), locations).unwrap();
    }

    const GROUPS: &str = r##"[
        {"title": "Collectibles", "color": "#FFD700"},
        {"title": "Enemies", "color": "#FF6347"}
    ]"##;

    const CATEGORIES: &str = r#"[
        {"title": "Chest", "icon": "chest", "groupId": 1},
        {"title": "World Boss", "icon": "skull", "template": "Level {level}", "groupId": 2}
    ]"#;

    const LOCATIONS: &str = r#"[
        {"id": 10, "title": "Chest", "description": "Behind the waterfall", "latitude": 0.7, "longitude": -0.7, "categoryId": 1},
        {"id": 4, "title": "Chromatic Troubadour", "latitude": 0.65, "longitude": -0.71, "categoryId": 2}
    ]"#;

    #[test]
    fn test_seed_fresh() {
        let dir = tempfile::tempdir().unwrap();
        write_data(dir.path(), GROUPS, CATEGORIES, LOCATIONS);
        let output = dir.path().join("catalog.bin");

        let report = load_catalog(dir.path(), &output, false).unwrap();
        assert_eq!(
            report,
            SeedReport {
                new_groups: 2,
                new_categories: 2,
                new_locations: 2,
            }
        );

        let catalog = get_catalog(&output).unwrap();
        assert_eq!(catalog.groups()[0].id, 1);
        assert_eq!(catalog.groups()[1].title, "Enemies");
        assert_eq!(catalog.categories()[1].template.as_deref(), Some("Level {level}"));

        let ids: Vec<u32> = catalog.locations().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![4, 10]);
        assert!(catalog.location(4).unwrap().description.is_none());
    }

    #[test]
    fn test_seed_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_data(dir.path(), GROUPS, CATEGORIES, LOCATIONS);
        let output = dir.path().join("catalog.bin");

        load_catalog(dir.path(), &output, false).unwrap();
        let first = get_catalog(&output).unwrap();

        let report = load_catalog(dir.path(), &output, false).unwrap();
        assert!(report.is_empty());
        assert_eq!(get_catalog(&output).unwrap(), first);
    }

    #[test]
    fn test_upsert_keeps_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_data(dir.path(), GROUPS, CATEGORIES, LOCATIONS);
        let output = dir.path().join("catalog.bin");
        load_catalog(dir.path(), &output, false).unwrap();

        write_data(
            dir.path(),
            r##"[{"title": "  collectibles ", "color": "#000000"}, {"title": "Merchants", "color": "#00FF00"}]"##,
            r#"[{"title": "Merchant", "icon": "coin", "groupId": 3}]"#,
            r#"[{"id": 10, "title": "Renamed", "latitude": 0, "longitude": 0, "categoryId": 1},
                {"id": 11, "title": "Grandis", "latitude": 0.1, "longitude": 0.2, "categoryId": 3}]"#,
        );

        let report = load_catalog(dir.path(), &output, false).unwrap();
        assert_eq!(
            report,
            SeedReport {
                new_groups: 1,
                new_categories: 1,
                new_locations: 1,
            }
        );

        let catalog = get_catalog(&output).unwrap();
        assert_eq!(catalog.group(1).unwrap().color, "#FFD700");
        assert_eq!(catalog.group(3).unwrap().title, "Merchants");
        assert_eq!(catalog.location(10).unwrap().title, "Chest");
        assert_eq!(catalog.location(11).unwrap().category_id, 3);
    }

    #[test]
    fn test_dangling_reference_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_data(
            dir.path(),
            GROUPS,
            CATEGORIES,
            r#"[{"id": 1, "title": "Lost", "latitude": 0, "longitude": 0, "categoryId": 99}]"#,
        );
        let output = dir.path().join("catalog.bin");

        let result = load_catalog(dir.path(), &output, false);

        assert!(matches!(
            result,
            Err(SeedError::Catalog(CatalogError::DanglingCategory { location: 1, category: 99 }))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_seeds(dir.path());

        assert!(matches!(result, Err(SeedError::Read { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        write_data(dir.path(), "{not json", CATEGORIES, LOCATIONS);

        assert!(matches!(load_seeds(dir.path()), Err(SeedError::Parse { .. })));
    }
}
