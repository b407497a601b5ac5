//! Location directory snapshot used to resolve display names

use indexmap::IndexMap;

use crate::models::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_active: bool,
}

/// Read-only view of the location table at one point in time
#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    entries: IndexMap<String, DirectoryEntry>,
}

impl LocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>, is_active: bool) {
        self.entries.insert(
            code.into(),
            DirectoryEntry {
                name: name.into(),
                is_active,
            },
        );
    }

    pub fn with(mut self, code: &str, name: &str, is_active: bool) -> Self {
        self.insert(code, name, is_active);
        self
    }

    pub fn get(&self, code: &str) -> Option<&DirectoryEntry> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn is_active(&self, code: &str) -> bool {
        self.entries.get(code).map(|e| e.is_active).unwrap_or(false)
    }

    /// Display name, falling back to the code for unknown locations
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.entries
            .get(code)
            .map(|e| e.name.as_str())
            .unwrap_or(code)
    }

    pub fn active_codes(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.is_active)
            .map(|(code, _)| code.as_str())
    }

    pub fn active_count(&self) -> usize {
        self.active_codes().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<&'a Location> for LocationDirectory {
    fn from_iter<I: IntoIterator<Item = &'a Location>>(iter: I) -> Self {
        let mut directory = LocationDirectory::new();
        for location in iter {
            directory.insert(location.code.clone(), location.name.clone(), location.is_active);
        }
        directory
    }
}
