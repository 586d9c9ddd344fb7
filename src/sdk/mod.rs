pub mod categories;
pub mod config;
pub mod error;
pub mod geo;
pub mod isochrone;
pub mod parcels;
pub mod state;
pub mod transport;
pub mod util;
