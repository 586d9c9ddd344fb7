use crate::sdk::config::{ClientConfig, TravelProfile};
use crate::sdk::error::FetchError;
use crate::sdk::geo::Coordinate;
use crate::sdk::state::{self, SharedState};
use crate::sdk::transport::HttpTransport;
use crate::sdk::util::rate_limit::{self, Limiter};
use crate::sdk::util::retry::RetryPolicy;
use serde_json::Value;
use std::sync::Arc;

// Mapbox rejects contours above one hour
pub const MAX_CONTOUR_MINUTES: u32 = 60;

pub struct IsochroneClient {
    transport: Arc<dyn HttpTransport>,
    access_token: String,
    base_url: String,
    profile: TravelProfile,
    polygons: bool,
    limiter: Limiter,
    retry: RetryPolicy,
}

impl IsochroneClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            access_token: config.access_token.clone(),
            base_url: config.isochrone_url.trim_end_matches('/').to_string(),
            profile: config.profile,
            polygons: config.polygons,
            limiter: rate_limit::isochrone_limiter(),
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

    pub fn request_url(&self, coordinate: Coordinate, minutes: u32) -> String {
        let mut url = format!(
            "{}/{}/{},{}?contours_minutes={}",
            self.base_url,
            self.profile,
            coordinate.lng(),
            coordinate.lat(),
            minutes
        );
        if self.polygons {
            url.push_str("&polygons=true");
        }
        url.push_str("&access_token=");
        url.push_str(&self.access_token);
        url
    }

    /// Fetches the isochrone around `coordinate` and stores it in `state`.
    ///
    /// `travel_minutes` falls back to the state's selected distance. The
    /// decoded body is returned as-is; concurrent calls each overwrite the
    /// slot when they complete.
    pub fn fetch_isochrone(
        &self,
        state: &SharedState,
        coordinate: Coordinate,
        travel_minutes: Option<u32>,
    ) -> Result<Value, FetchError> {
        let minutes = match travel_minutes {
            Some(minutes) => minutes,
            None => state::read(state)?.distance(),
        };
        if minutes == 0 || minutes > MAX_CONTOUR_MINUTES {
            return Err(FetchError::InvalidParameter(format!(
                "contour minutes must be between 1 and {}, got {}",
                MAX_CONTOUR_MINUTES, minutes
            )));
        }

        let url = self.request_url(coordinate, minutes);
        log::debug!(
            "[ISOCHRONE] Requesting {} min {} isochrone at {}",
            minutes,
            self.profile,
            coordinate
        );

        let body = self.retry.run("isochrone request", || {
            rate_limit::wait(&self.limiter);
            let response = self.transport.get(&url)?;
            if !response.is_success() {
                log::error!(
                    "Isochrone API returned non-success status: {}. Body: {}",
                    response.status,
                    response.body_lossy()
                );
                return Err(FetchError::from_status(response.status, &response.body));
            }
            Ok(response.body)
        })?;

        let isochrone: Value = serde_json::from_slice(&body).map_err(|e| {
            log::error!(
                "Failed to parse isochrone response.\nError: {}. Body: {}",
                e,
                String::from_utf8_lossy(&body)
            );
            e
        })?;

        let mut guard = state::write(state)?;
        guard.set_isochrone(isochrone.clone());
        guard.select(coordinate);
        log::info!("Stored {} min isochrone for {}", minutes, coordinate);

        Ok(isochrone)
    }
}
