use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode catalog: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Failed to fetch catalog: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("Category {category} references missing group {group}")]
    DanglingGroup { category: u32, group: u32 },

    #[error("Location {location} references missing category {category}")]
    DanglingCategory { location: u32, category: u32 },
}
