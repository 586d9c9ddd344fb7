use super::categories::{CategoryColors, CategoryCounts};
use super::error::FetchError;
use super::geo::Coordinate;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Bumped whenever the shape of [`ClientState`] changes.
pub const STATE_VERSION: u32 = 1;
pub const DEFAULT_DISTANCE: u32 = 5;

/// Session state read by the map and chart layers.
#[derive(Debug, Clone, Serialize)]
pub struct ClientState {
    version: u32,
    isochrone: Option<Value>,
    category_counts: CategoryCounts,
    category_colors: CategoryColors,
    distance: u32,
    selected: Option<Coordinate>,
}

pub type SharedState = Arc<RwLock<ClientState>>;

impl Default for ClientState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            isochrone: None,
            category_counts: CategoryCounts::default(),
            category_colors: CategoryColors::default(),
            distance: DEFAULT_DISTANCE,
            selected: None,
        }
    }
}

impl ClientState {
    pub fn new(category_counts: CategoryCounts, category_colors: CategoryColors) -> Self {
        Self {
            category_counts,
            category_colors,
            ..Self::default()
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn isochrone(&self) -> Option<&Value> {
        self.isochrone.as_ref()
    }

    /// Replaces the isochrone slot; earlier results are dropped.
    pub fn set_isochrone(&mut self, isochrone: Value) {
        self.isochrone = Some(isochrone);
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn set_distance(&mut self, distance: u32) -> Result<(), FetchError> {
        if distance == 0 {
            return Err(FetchError::InvalidParameter(
                "distance must be positive".to_string(),
            ));
        }
        self.distance = distance;
        Ok(())
    }

    pub fn selected(&self) -> Option<Coordinate> {
        self.selected
    }

    pub fn select(&mut self, coordinate: Coordinate) {
        self.selected = Some(coordinate);
    }

    pub fn category_counts(&self) -> &CategoryCounts {
        &self.category_counts
    }

    pub fn category_counts_mut(&mut self) -> &mut CategoryCounts {
        &mut self.category_counts
    }

    pub fn category_colors(&self) -> &CategoryColors {
        &self.category_colors
    }
}

pub fn read(state: &SharedState) -> Result<RwLockReadGuard<'_, ClientState>, FetchError> {
    state.read().map_err(|_| FetchError::StatePoisoned)
}

pub fn write(state: &SharedState) -> Result<RwLockWriteGuard<'_, ClientState>, FetchError> {
    state.write().map_err(|_| FetchError::StatePoisoned)
}
