use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

const DESCRIPTION_SEPARATOR: &str = "\n*******\n";

/// Uppercases and trims a region name so it can be used as an [`OutageTable`] key.
pub fn normalize_region(region: &str) -> String {
    region.trim().to_uppercase()
}

/// Water interruptions announced on one fetch of the page, grouped by region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutageTable {
    regions: BTreeMap<String, Vec<String>>,
}

impl OutageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh entry for `region`, replacing any descriptions collected
    /// for it by an earlier table.
    pub(crate) fn start_region(&mut self, region: String) {
        self.regions.insert(region, Vec::new());
    }

    pub(crate) fn push_description(&mut self, region: &str, description: String) {
        if let Some(descriptions) = self.regions.get_mut(region) {
            descriptions.push(description);
        }
    }

    pub fn get(&self, region: &str) -> Option<&[String]> {
        self.regions
            .get(&normalize_region(region))
            .map(Vec::as_slice)
    }

    /// Exact, case-insensitive lookup. Returns `None` when the region has no
    /// announced interruption.
    pub fn find(&self, region: &str) -> Option<OutageNotice> {
        let region = normalize_region(region);
        self.regions
            .get(&region)
            .map(|descriptions| OutageNotice::new(region, descriptions.clone()))
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// A matched region together with its interruption descriptions. Its
/// [`Display`] output is the text message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutageNotice {
    pub region: String,
    pub descriptions: Vec<String>,
}

impl OutageNotice {
    pub fn new(region: String, descriptions: Vec<String>) -> Self {
        Self {
            region,
            descriptions,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl Display for OutageNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let underline = "#".repeat(self.region.chars().count());
        write!(f, "*\n{}\n{}\n\n", self.region, underline)?;
        write!(f, "{}", self.descriptions.join(DESCRIPTION_SEPARATOR))
    }
}
