pub mod sdk;

pub use sdk::categories::{CategoryColors, CategoryCounts};
pub use sdk::config::{ClientConfig, ConfigError, TravelProfile};
pub use sdk::error::FetchError;
pub use sdk::geo::{Coordinate, FeatureCollection};
pub use sdk::isochrone::IsochroneClient;
pub use sdk::parcels::ParcelAreaClient;
pub use sdk::state::{ClientState, SharedState};
pub use sdk::transport::{HttpTransport, ReqwestTransport};
