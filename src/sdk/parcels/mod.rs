pub mod client;
pub mod esri;

pub use client::{ParcelAreaClient, PARCEL_FIELDS};
pub use esri::{reshape_parcels, EsriQueryResponse};
