use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::SeedError;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SeedError> {
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Display form: trimmed, inner whitespace collapsed.
pub fn clean_title(input: &str) -> String {
    WHITESPACE.replace_all(input.trim(), " ").into_owned()
}

/// Upsert key for groups and categories.
pub fn title_key(input: &str) -> String {
    clean_title(input).to_lowercase()
}
