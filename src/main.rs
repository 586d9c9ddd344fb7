use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf, sync::Arc};
use walkshed::{
    sdk::util::log::init_logging, ClientConfig, ClientState, Coordinate, IsochroneClient,
    ParcelAreaClient, ReqwestTransport,
};

/// Fetch walking isochrones and nearby parcels for a map view
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// [Optional] TOML config file; environment variables take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// [Optional] Write the JSON result here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Area reachable from a point within a travel time
    Isochrone {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Contour in minutes; defaults to the selected distance
        #[arg(short, long)]
        minutes: Option<u32>,
        /// Selected distance used when --minutes is omitted
        #[arg(long, default_value_t = walkshed::sdk::state::DEFAULT_DISTANCE)]
        distance: u32,
        /// Print the whole client state instead of only the isochrone
        #[arg(long)]
        state: bool,
    },
    /// Parcels intersecting a circle around a point
    Parcels {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Search radius in meters
        #[arg(short, long, default_value_t = f64::from(walkshed::sdk::state::DEFAULT_DISTANCE))]
        radius: f64,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging("info");

    let cli = Cli::parse();

    // --- Composition root ---
    let config = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let transport = Arc::new(ReqwestTransport::new(config.timeout())?);

    let json = match cli.command {
        Command::Isochrone {
            lat,
            lng,
            minutes,
            distance,
            state: print_state,
        } => {
            let coordinate = Coordinate::new(lat, lng)?;
            let mut initial = ClientState::default();
            initial.set_distance(distance)?;
            let state = initial.into_shared();

            let client = IsochroneClient::new(transport, &config);
            let isochrone = client
                .fetch_isochrone(&state, coordinate, minutes)
                .with_context(|| format!("Isochrone request failed for {}", coordinate))?;

            if print_state {
                let snapshot = walkshed::sdk::state::read(&state)?;
                serde_json::to_string_pretty(&*snapshot)?
            } else {
                serde_json::to_string_pretty(&isochrone)?
            }
        }
        Command::Parcels { lat, lng, radius } => {
            let coordinate = Coordinate::new(lat, lng)?;
            let client = ParcelAreaClient::new(transport, &config);
            let parcels = client
                .fetch_parcels(coordinate, radius)
                .with_context(|| format!("Parcel query failed for {}", coordinate))?;
            log::info!("{} parcels within {} m", parcels.len(), radius);
            serde_json::to_string_pretty(&parcels)?
        }
    };

    match cli.output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Result written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkshed::sdk::state::DEFAULT_DISTANCE;

    #[test]
    fn parcel_radius_defaults_to_the_selected_distance() {
        let cli = Cli::try_parse_from(["walkshed", "parcels", "--lat", "40.7", "--lng", "-74.0"]).unwrap();
        match cli.command {
            Command::Parcels { radius, .. } => assert_eq!(radius, f64::from(DEFAULT_DISTANCE)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn isochrone_distance_defaults_to_the_selected_distance() {
        let cli = Cli::try_parse_from(["walkshed", "isochrone", "--lat", "40.7", "--lng", "-74.0"]).unwrap();
        match cli.command {
            Command::Isochrone { distance, minutes, .. } => {
                assert_eq!(distance, DEFAULT_DISTANCE);
                assert_eq!(minutes, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
