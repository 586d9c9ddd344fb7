// Minimal GeoJSON output types, enough for polygon layers on a map
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Position = Vec<f64>;
pub type Ring = Vec<Position>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Ring>,
}

impl Geometry {
    pub fn polygon(rings: Vec<Ring>) -> Self {
        Self {
            kind: "Polygon".to_string(),
            coordinates: rings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    pub fn new(properties: Map<String, Value>, geometry: Geometry) -> Self {
        Self {
            kind: "Feature".to_string(),
            properties,
            geometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A ring is closed when its first and last positions coincide.
pub fn ring_is_closed(ring: &[Position]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => ring.len() >= 4 && first == last,
        _ => false,
    }
}
