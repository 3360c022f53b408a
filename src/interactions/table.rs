//! File-backed interaction table
//!
//! A small local knowledge base: a JSON array of pair entries, matched
//! case-insensitively and in either order.

use super::{DatabaseFinding, InteractionDatabase, LookupError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One row of the table file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read interaction table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse interaction table {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Symmetric, case-insensitive pair table
#[derive(Debug, Default, Clone)]
pub struct InteractionTable {
    entries: HashMap<(String, String), DatabaseFinding>,
}

impl InteractionTable {
    /// A table that knows nothing; every lookup is "no data"
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TableEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            let key = pair_key(&entry.drug_a, &entry.drug_b);
            if table.entries.contains_key(&key) {
                tracing::warn!(
                    drug_a = %entry.drug_a,
                    drug_b = %entry.drug_b,
                    "Duplicate interaction table entry, keeping the last one"
                );
            }
            table.entries.insert(
                key,
                DatabaseFinding {
                    severity: entry.severity,
                    description: entry.description,
                },
            );
        }
        table
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<TableEntry> =
            serde_json::from_str(&raw).map_err(|source| TableError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let table = Self::from_entries(entries);
        tracing::info!(path = %path.display(), pairs = table.len(), "Loaded interaction table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, drug_a: &str, drug_b: &str) -> Option<&DatabaseFinding> {
        self.entries.get(&pair_key(drug_a, drug_b))
    }
}

fn pair_key(drug_a: &str, drug_b: &str) -> (String, String) {
    let a = drug_a.trim().to_lowercase();
    let b = drug_b.trim().to_lowercase();
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[async_trait]
impl InteractionDatabase for InteractionTable {
    async fn check_interaction(
        &self,
        drug_a: &str,
        drug_b: &str,
    ) -> Result<Option<DatabaseFinding>, LookupError> {
        if drug_a.trim().is_empty() || drug_b.trim().is_empty() {
            return Err(LookupError::new("Drug names must not be empty"));
        }
        Ok(self.lookup(drug_a, drug_b).cloned())
    }
}
