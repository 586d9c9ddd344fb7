use super::esri::{reshape_parcels, EsriQueryResponse};
use crate::sdk::config::ClientConfig;
use crate::sdk::error::{EsriErrorPayload, FetchError};
use crate::sdk::geo::{Coordinate, FeatureCollection};
use crate::sdk::transport::HttpTransport;
use crate::sdk::util::rate_limit::{self, Limiter};
use crate::sdk::util::retry::RetryPolicy;
use serde_json::Value;
use std::sync::Arc;

pub const PARCEL_FIELDS: &str = "YearBuilt,Latitude,Longitude,BBL,LotArea,CD,Borough";

pub struct ParcelAreaClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    limiter: Limiter,
    retry: RetryPolicy,
}

impl ParcelAreaClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            base_url: config.parcel_url.clone(),
            limiter: rate_limit::parcel_limiter(),
            retry: config.retry_policy(),
        }
    }

    pub fn with_limiter(mut self, limiter: Limiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn request_url(&self, coordinate: Coordinate, radius_meters: f64) -> String {
        format!(
            "{}?where=1=1&geometry={},{}&geometryType=esriGeometryPoint&inSR=4326\
             &spatialRel=esriSpatialRelIntersects&distance={}&units=esriSRUnit_Meter\
             &outSR=4326&f=json&outFields={}",
            self.base_url,
            coordinate.lat(),
            coordinate.lng(),
            radius_meters,
            PARCEL_FIELDS
        )
    }

    /// Parcels intersecting a `radius_meters` circle around `coordinate`,
    /// as a GeoJSON polygon collection. Nothing is stored; the caller owns
    /// the result.
    pub fn fetch_parcels(
        &self,
        coordinate: Coordinate,
        radius_meters: f64,
    ) -> Result<FeatureCollection, FetchError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(FetchError::InvalidParameter(format!(
                "search radius must be a positive number of meters, got {}",
                radius_meters
            )));
        }

        let url = self.request_url(coordinate, radius_meters);
        log::debug!(
            "[PARCELS] Querying parcels within {} m of {}",
            radius_meters,
            coordinate
        );

        let body = self.retry.run("parcel query", || {
            rate_limit::wait(&self.limiter);
            let response = self.transport.get(&url)?;
            if !response.is_success() {
                log::error!(
                    "Parcel API returned non-success status: {}. Body: {}",
                    response.status,
                    response.body_lossy()
                );
                return Err(FetchError::from_status(response.status, &response.body));
            }
            Ok(response.body)
        })?;

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            log::error!(
                "Failed to parse parcel response. URL: {}\nError: {}. Body: {}",
                url,
                e,
                String::from_utf8_lossy(&body)
            );
            e
        })?;

        // ArcGIS reports query errors with a 200 status
        if value.get("error").is_some() {
            if let Ok(payload) = serde_json::from_value::<EsriErrorPayload>(value.clone()) {
                log::error!(
                    "Parcel API error {}: {} {:?}",
                    payload.error.code,
                    payload.error.message,
                    payload.error.details
                );
                return Err(FetchError::Api {
                    code: payload.error.code,
                    message: payload.error.message,
                });
            }
        }

        let response: EsriQueryResponse =
            serde_json::from_value(value).map_err(|e| FetchError::Shape(e.to_string()))?;
        let collection = reshape_parcels(response);
        log::info!("Found {} parcels near {}", collection.len(), coordinate);

        Ok(collection)
    }
}
