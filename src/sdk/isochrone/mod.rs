pub mod client;

pub use client::{IsochroneClient, MAX_CONTOUR_MINUTES};
