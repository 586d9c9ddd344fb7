// Chart/legend tables keyed by a closed set of point-of-interest categories
use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

pub const FALLBACK_CATEGORY: &str = "Others";

pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Entertainment",
    "Business",
    "Retail",
    "Parking",
    "Residential",
    "Education",
    "Healthcare",
];

const DEFAULT_COLORS: [&str; 7] = [
    "#F97316", "#3B82F6", "#EC4899", "#64748B", "#22C55E", "#EAB308", "#EF4444",
];
const FALLBACK_COLOR: &str = "#9CA3AF";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Unknown category: {0}")]
    Unknown(String),

    #[error("Category defined more than once: {0}")]
    Duplicate(String),
}

fn check_unique<'a, I>(names: I) -> Result<(), CategoryError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if name == FALLBACK_CATEGORY || seen.contains(&name) {
            return Err(CategoryError::Duplicate(name.to_string()));
        }
        seen.push(name);
    }
    Ok(())
}

/// Counts per category. The key set and its order are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts {
    entries: Vec<(String, u64)>,
}

impl CategoryCounts {
    pub fn new<I, S>(names: I) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<(String, u64)> = names.into_iter().map(|n| (n.into(), 0)).collect();
        check_unique(entries.iter().map(|(name, _)| name.as_str()))?;
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }

    pub fn increment(&mut self, name: &str) -> Result<u64, CategoryError> {
        let slot = self.slot_mut(name)?;
        *slot += 1;
        Ok(*slot)
    }

    pub fn set(&mut self, name: &str, count: u64) -> Result<(), CategoryError> {
        *self.slot_mut(name)? = count;
        Ok(())
    }

    pub fn reset(&mut self) {
        for (_, count) in &mut self.entries {
            *count = 0;
        }
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Counts in definition order, as a bar chart series.
    pub fn values(&self) -> Vec<u64> {
        self.entries.iter().map(|(_, c)| *c).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut u64, CategoryError> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| CategoryError::Unknown(name.to_string()))
    }
}

impl Default for CategoryCounts {
    fn default() -> Self {
        Self {
            entries: DEFAULT_CATEGORIES.iter().map(|n| (n.to_string(), 0)).collect(),
        }
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// Colour per category plus the trailing `Others` fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryColors {
    entries: Vec<(String, String)>,
    fallback: String,
}

impl CategoryColors {
    pub fn new<I, N, C>(entries: I, fallback: impl Into<String>) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(n, c)| (n.into(), c.into()))
            .collect();
        check_unique(entries.iter().map(|(name, _)| name.as_str()))?;
        Ok(Self {
            entries,
            fallback: fallback.into(),
        })
    }

    /// Number of entries including the fallback; never zero.
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn color_for(&self, name: &str) -> &str {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map_or(self.fallback.as_str(), |(_, c)| c.as_str())
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Colours in definition order without the fallback: always `len() - 1` long.
    pub fn ordered_colors(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, c)| c.as_str()).collect()
    }
}

impl Default for CategoryColors {
    fn default() -> Self {
        Self {
            entries: DEFAULT_CATEGORIES
                .iter()
                .zip(DEFAULT_COLORS.iter())
                .map(|(n, c)| (n.to_string(), c.to_string()))
                .collect(),
            fallback: FALLBACK_COLOR.to_string(),
        }
    }
}

impl Serialize for CategoryColors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, color) in &self.entries {
            map.serialize_entry(name, color)?;
        }
        map.serialize_entry(FALLBACK_CATEGORY, &self.fallback)?;
        map.end()
    }
}
