// Esri JSON as returned by ArcGIS feature-service `query` with `f=json`
use crate::sdk::geo::feature::{ring_is_closed, Feature, FeatureCollection, Geometry, Ring};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct EsriQueryResponse {
    pub features: Vec<EsriFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsriFeature {
    pub attributes: Map<String, Value>,
    pub geometry: EsriPolygon,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsriPolygon {
    pub rings: Vec<Ring>,
}

/// One `Polygon` feature per record, in input order. Rings are copied as-is.
pub fn reshape_parcels(response: EsriQueryResponse) -> FeatureCollection {
    let features = response
        .features
        .into_iter()
        .map(|record| {
            if let Some(open) = record.geometry.rings.iter().position(|r| !ring_is_closed(r)) {
                log::debug!(
                    "Parcel {} has an unclosed ring at index {}",
                    record.attributes.get("BBL").unwrap_or(&Value::Null),
                    open
                );
            }
            Feature::new(record.attributes, Geometry::polygon(record.geometry.rings))
        })
        .collect();
    FeatureCollection::new(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> EsriQueryResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn reshapes_each_record_in_order() {
        let response = parse(json!({
            "features": [
                {
                    "attributes": {"BBL": 1000010010u64, "LotArea": 7200, "Borough": "MN"},
                    "geometry": {"rings": [[[-74.0, 40.7], [-74.0, 40.8], [-73.9, 40.8], [-74.0, 40.7]]]}
                },
                {
                    "attributes": {"BBL": 1000010020u64, "YearBuilt": 1931, "CD": 101},
                    "geometry": {"rings": [[[-73.5, 40.1], [-73.5, 40.2], [-73.4, 40.2]], [[0.0, 0.0]]]}
                }
            ]
        }));
        let expected_props: Vec<Map<String, Value>> =
            response.features.iter().map(|f| f.attributes.clone()).collect();
        let expected_rings: Vec<Vec<Ring>> =
            response.features.iter().map(|f| f.geometry.rings.clone()).collect();

        let collection = reshape_parcels(response);

        assert_eq!(collection.kind, "FeatureCollection");
        assert_eq!(collection.len(), 2);
        for (i, feature) in collection.features.iter().enumerate() {
            assert_eq!(feature.kind, "Feature");
            assert_eq!(feature.geometry.kind, "Polygon");
            assert_eq!(feature.properties, expected_props[i]);
            assert_eq!(feature.geometry.coordinates, expected_rings[i]);
        }
    }

    #[test]
    fn empty_features_give_an_empty_collection() {
        let collection = reshape_parcels(parse(json!({"features": []})));
        assert_eq!(
            serde_json::to_value(collection).unwrap(),
            json!({"type": "FeatureCollection", "features": []})
        );
    }

    #[test]
    fn missing_features_does_not_parse() {
        let result = serde_json::from_value::<EsriQueryResponse>(json!({"fields": []}));
        assert!(result.is_err());
    }

    #[test]
    fn record_without_rings_does_not_parse() {
        let result = serde_json::from_value::<EsriQueryResponse>(json!({
            "features": [{"attributes": {}, "geometry": {"x": 1.0, "y": 2.0}}]
        }));
        assert!(result.is_err());
    }
}
