//! # Catalog
//!
//! Reference data for the map plus the payloads exchanged with the server.
//!
//! The catalog is produced offline by `process` and stored as a protobuf snapshot,
//! either next to the server or behind a URL.
use std::{fs, path::Path};

use prost::Message;
use reqwest::get;

pub mod error;
pub mod marker;
pub mod models;
pub mod payloads;

pub use error::CatalogError;
pub use models::{Catalog, Category, Group, Location};

pub fn get_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let data = fs::read(path)?;

    decode_catalog(&data)
}

pub async fn get_catalog_remote(url: &str) -> Result<Catalog, CatalogError> {
    let response = get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    decode_catalog(&bytes)
}

pub fn write_catalog(path: impl AsRef<Path>, catalog: &Catalog) -> Result<(), CatalogError> {
    fs::write(path, catalog.encode_to_vec())?;

    Ok(())
}

fn decode_catalog(bytes: &[u8]) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::decode(bytes)?;
    catalog.sort();
    catalog.validate()?;

    Ok(catalog)
}
