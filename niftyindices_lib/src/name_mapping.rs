//! Index list and trading-name mapping.
//!
//! The index list names indices by their long internal identifier. The
//! history endpoint only accepts the trading name for some of them, so a
//! mapping table translates one into the other. Lookups are case-insensitive
//! and fall back to the identifier itself.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level structure of the index list file: `{"d": [{"indextype": ..}, ..]}`.
#[derive(Deserialize, Debug)]
struct IndexListFile {
    #[serde(default)]
    d: Vec<IndexListEntry>,
}

/// One index list row. Only `indextype` is used; other columns are ignored.
#[derive(Deserialize, Debug)]
struct IndexListEntry {
    #[serde(default)]
    indextype: Option<String>,
}

/// One mapping table row.
#[derive(Deserialize, Debug)]
struct MappingEntry {
    #[serde(rename = "Index_long_name", default)]
    index_long_name: Option<String>,
    #[serde(rename = "Trading_Index_Name", default)]
    trading_index_name: Option<String>,
}

/// An index as known to the mapping table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub internal_name: String,
    pub display_name: Option<String>,
}

/// Case-insensitive internal-name to trading-name lookup.
#[derive(Clone, Debug, Default)]
pub struct NameMapper {
    by_key: HashMap<String, String>,
}

impl NameMapper {
    /// A mapper with no entries; every name resolves to itself.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the lookup. Descriptors without a display name are ignored;
    /// when two rows fold to the same key the later one wins.
    pub fn new(descriptors: impl IntoIterator<Item = IndexDescriptor>) -> Self {
        let mut by_key = HashMap::new();
        for descriptor in descriptors {
            let Some(display) = descriptor.display_name else {
                continue;
            };
            let key = fold_key(&descriptor.internal_name);
            if let Some(previous) = by_key.insert(key, display) {
                tracing::warn!(
                    "Duplicate mapping for '{}', replacing '{}'",
                    descriptor.internal_name,
                    previous
                );
            }
        }
        Self { by_key }
    }

    /// Resolves an internal identifier to the name the backend expects.
    /// Total: unknown identifiers come back unchanged.
    pub fn resolve<'a>(&'a self, internal_name: &'a str) -> &'a str {
        self.by_key
            .get(&fold_key(internal_name))
            .map(String::as_str)
            .unwrap_or(internal_name)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

fn fold_key(name: &str) -> String {
    name.trim().to_uppercase()
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Parses the index list, keeping file order. Identifiers are kept exactly
/// as written, since they also name the output files; rows with a missing or
/// blank identifier are skipped.
pub fn parse_index_list(json: &str) -> Result<Vec<String>, serde_json::Error> {
    let file: IndexListFile = serde_json::from_str(strip_bom(json))?;
    let mut names = Vec::with_capacity(file.d.len());
    for (pos, entry) in file.d.into_iter().enumerate() {
        match entry.indextype {
            Some(name) if !name.trim().is_empty() => names.push(name),
            _ => tracing::warn!("Skipping index list row {} without an indextype", pos + 1),
        }
    }
    Ok(names)
}

/// Parses the mapping table into descriptors. Rows without a long name are
/// skipped; a blank trading name counts as no alias.
pub fn parse_index_mapping(json: &str) -> Result<Vec<IndexDescriptor>, serde_json::Error> {
    let rows: Vec<MappingEntry> = serde_json::from_str(strip_bom(json))?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let internal_name = row.index_long_name?.trim().to_string();
            if internal_name.is_empty() {
                return None;
            }
            let display_name = row
                .trading_index_name
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            Some(IndexDescriptor {
                internal_name,
                display_name,
            })
        })
        .collect())
}

fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the index list. An empty list is a configuration error.
pub fn load_index_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = read_config_file(path)?;
    let names = parse_index_list(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if names.is_empty() {
        return Err(ConfigError::EmptyIndexList {
            path: path.to_path_buf(),
        });
    }
    Ok(names)
}

/// Loads the mapping table into a [`NameMapper`].
pub fn load_name_mapper(path: &Path) -> Result<NameMapper, ConfigError> {
    let content = read_config_file(path)?;
    let descriptors = parse_index_mapping(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(NameMapper::new(descriptors))
}
