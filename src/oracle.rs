//! Relatedness between entities.
//!
//! The engines only ever ask one question: are these two entities
//! biologically related (do they share a pathway)? Anything that can answer
//! it implements [`RelatednessOracle`]. Unknown ids are never an error, they
//! are simply unrelated to everything.
//!
//! # Example
//!
//! ```ignore
//! let mut pathways = PathwayTable::new();
//! pathways.add("p53 signaling", ["TP53", "MDM2", "CDKN1A"]);
//!
//! assert!(pathways.are_related("TP53", "MDM2"));
//! assert!(!pathways.are_related("TP53", "GAPDH"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Symmetric relatedness predicate over entity ids.
///
/// Implementations must satisfy `are_related(a, b) == are_related(b, a)` and
/// must not panic on ids they have never seen.
pub trait RelatednessOracle {
    /// Whether `a` and `b` belong to a common group.
    fn are_related(&self, a: &str, b: &str) -> bool;
}

impl<F> RelatednessOracle for F
where
    F: Fn(&str, &str) -> bool,
{
    fn are_related(&self, a: &str, b: &str) -> bool {
        self(a, b)
    }
}

/// Oracle that relates nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrelated;

impl RelatednessOracle for Unrelated {
    fn are_related(&self, _a: &str, _b: &str) -> bool {
        false
    }
}

/// Named pathways, each a set of member entity ids.
///
/// Serialized as `{ "pathways": { "name": ["ID", ...] } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "PathwayFile", into = "PathwayFile")]
pub struct PathwayTable {
    names: Vec<String>,
    members: Vec<Vec<String>>,
    /// Entity id -> indices of the pathways containing it.
    index: HashMap<String, Vec<usize>>,
}

#[derive(Serialize, Deserialize)]
struct PathwayFile {
    pathways: BTreeMap<String, Vec<String>>,
}

impl From<PathwayFile> for PathwayTable {
    fn from(file: PathwayFile) -> Self {
        let mut table = PathwayTable::new();
        for (name, ids) in file.pathways {
            table.add(name, ids);
        }
        table
    }
}

impl From<PathwayTable> for PathwayFile {
    fn from(table: PathwayTable) -> Self {
        Self {
            pathways: table.names.into_iter().zip(table.members).collect(),
        }
    }
}

impl PathwayTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pathway. Duplicate member ids are collapsed.
    pub fn add<N, I, S>(&mut self, name: N, ids: I) -> &mut Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slot = self.names.len();
        let mut seen = HashSet::new();
        let members: Vec<String> = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        for id in &members {
            self.index.entry(id.clone()).or_default().push(slot);
        }
        self.names.push(name.into());
        self.members.push(members);
        self
    }

    /// Number of pathways.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table has no pathways.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names of the pathways containing `id`.
    pub fn pathways_of(&self, id: &str) -> Vec<&str> {
        self.index
            .get(id)
            .map(|slots| slots.iter().map(|&s| self.names[s].as_str()).collect())
            .unwrap_or_default()
    }

    /// Members of the named pathway.
    pub fn members(&self, name: &str) -> Option<&[String]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|slot| self.members[slot].as_slice())
    }

    /// Load a table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let table = serde_json::from_str(&json)?;
        Ok(table)
    }
}

impl RelatednessOracle for PathwayTable {
    fn are_related(&self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        match (self.index.get(a), self.index.get(b)) {
            (Some(left), Some(right)) => left.iter().any(|slot| right.contains(slot)),
            _ => false,
        }
    }
}
