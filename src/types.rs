use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one repository on the code-hosting service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryCoordinate {
    pub owner: String,
    pub name: String,
}

impl RepositoryCoordinate {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an `owner/name` pair
    pub fn parse(value: &str) -> Option<Self> {
        let (owner, name) = value.trim().split_once('/')?;
        let coordinate = Self::new(owner, name);
        coordinate.is_valid().then_some(coordinate)
    }

    /// Both parts must be non-empty
    pub fn is_valid(&self) -> bool {
        !self.owner.trim().is_empty() && !self.name.trim().is_empty()
    }
}

impl fmt::Display for RepositoryCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Kind of directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One item in a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Display label
    pub name: String,
    /// Full slash-separated path from the repository root
    pub path: String,
    pub kind: EntryKind,
    /// Directory: URL listing its children. File: URL of its raw content.
    pub fetch_url: String,
    /// Stable identifier, unique within a listing
    pub id: String,
}

impl Entry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Ordered entries found at a single path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// The path that was listed, `""` for the root
    pub path: String,
    pub entries: Vec<Entry>,
}

impl DirectoryListing {
    pub fn new(path: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether `entry` is one of this listing's entries
    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries
            .iter()
            .any(|e| e.path == entry.path && e.id == entry.id)
    }
}

/// A repository returned by a user search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub owner: String,
    pub avatar_url: String,
    pub description: Option<String>,
}

impl RepositorySummary {
    pub fn coordinate(&self) -> RepositoryCoordinate {
        RepositoryCoordinate::new(self.owner.clone(), self.name.clone())
    }
}
