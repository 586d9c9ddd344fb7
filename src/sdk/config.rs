use serde::Deserialize;
use std::{env, fmt, fs, path::Path, str::FromStr, time::Duration};
use thiserror::Error;

use super::util::retry::RetryPolicy;

pub const DEFAULT_ISOCHRONE_URL: &str = "https://api.mapbox.com/isochrone/v1/mapbox";
// NYC Department of City Planning MapPLUTO layer
pub const DEFAULT_PARCEL_URL: &str =
    "https://services5.arcgis.com/GfwWNkhOj9bNBqoJ/arcgis/rest/services/MAPPLUTO/FeatureServer/0/query";

pub const ENV_ACCESS_TOKEN: &str = "MAPBOX_ACCESS_TOKEN";
pub const ENV_ISOCHRONE_URL: &str = "WALKSHED_ISOCHRONE_URL";
pub const ENV_PROFILE: &str = "WALKSHED_PROFILE";
pub const ENV_PARCEL_URL: &str = "WALKSHED_PARCEL_URL";
pub const ENV_TIMEOUT_SECS: &str = "WALKSHED_TIMEOUT_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "WALKSHED_MAX_ATTEMPTS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No access token configured; set MAPBOX_ACCESS_TOKEN or `access_token` in the config file")]
    MissingAccessToken,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Mapbox routing profile used for the isochrone request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    #[default]
    Walking,
    Cycling,
    Driving,
}

impl TravelProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelProfile::Walking => "walking",
            TravelProfile::Cycling => "cycling",
            TravelProfile::Driving => "driving",
        }
    }
}

impl fmt::Display for TravelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walking" => Ok(TravelProfile::Walking),
            "cycling" => Ok(TravelProfile::Cycling),
            "driving" => Ok(TravelProfile::Driving),
            _ => Err(ConfigError::InvalidValue {
                key: "profile".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub access_token: String,
    pub isochrone_url: String,
    pub profile: TravelProfile,
    /// Ask Mapbox for polygons instead of linestring contours.
    pub polygons: bool,
    pub parcel_url: String,
    pub timeout_secs: u64,
    /// Total tries per request, the first one included.
    pub max_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            isochrone_url: DEFAULT_ISOCHRONE_URL.to_string(),
            profile: TravelProfile::Walking,
            polygons: false,
            parcel_url: DEFAULT_PARCEL_URL.to_string(),
            timeout_secs: 15,
            max_attempts: 3,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default()
            .with_overrides(|key| env::var(key).ok())?
            .validated()
    }

    /// Reads an optional TOML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| env::var(key).ok())?.validated()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: ClientConfig = toml::from_str(&data)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Applies any overrides `lookup` knows about. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.access_token = token;
        }
        if let Some(url) = get(ENV_ISOCHRONE_URL) {
            self.isochrone_url = url;
        }
        if let Some(profile) = get(ENV_PROFILE) {
            self.profile = profile.parse()?;
        }
        if let Some(url) = get(ENV_PARCEL_URL) {
            self.parcel_url = url;
        }
        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_number(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = get(ENV_MAX_ATTEMPTS) {
            self.max_attempts = parse_number(ENV_MAX_ATTEMPTS, &value)?;
        }
        Ok(self)
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_attempts".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_attempts(self.max_attempts)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = ClientConfig::default()
            .with_overrides(lookup(&[]))
            .unwrap()
            .validated()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingAccessToken));
    }

    #[test]
    fn env_values_override_defaults() {
        let config = ClientConfig::default()
            .with_overrides(lookup(&[
                (ENV_ACCESS_TOKEN, "pk.test"),
                (ENV_PROFILE, "Cycling"),
                (ENV_TIMEOUT_SECS, "30"),
                (ENV_MAX_ATTEMPTS, "5"),
                (ENV_PARCEL_URL, ""),
            ]))
            .unwrap()
            .validated()
            .unwrap();
        assert_eq!(config.access_token, "pk.test");
        assert_eq!(config.profile, TravelProfile::Cycling);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_policy().max_attempts, 5);
        assert_eq!(config.parcel_url, DEFAULT_PARCEL_URL);
    }

    #[test]
    fn max_attempts_counts_the_first_request() {
        let config = ClientConfig::default()
            .with_overrides(lookup(&[(ENV_ACCESS_TOKEN, "pk.test"), (ENV_MAX_ATTEMPTS, "1")]))
            .unwrap()
            .validated()
            .unwrap();
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.retry_policy().max_attempts, 1);

        assert_eq!(ClientConfig::default().retry_policy().max_attempts, 3);
    }

    #[test]
    fn zero_attempts_or_timeout_are_rejected() {
        for (key, value) in [(ENV_MAX_ATTEMPTS, "0"), (ENV_TIMEOUT_SECS, "0")] {
            let err = ClientConfig::default()
                .with_overrides(lookup(&[(ENV_ACCESS_TOKEN, "pk.test"), (key, value)]))
                .unwrap()
                .validated()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref value, .. } if value == "0"),
                "{key}: {err:?}"
            );
        }
    }

    #[test]
    fn bad_numbers_are_reported_with_their_key() {
        let err = ClientConfig::default()
            .with_overrides(lookup(&[(ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, ENV_TIMEOUT_SECS);
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn file_values_are_loaded_and_env_wins() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "access_token = \"pk.file\"\nprofile = \"driving\"\npolygons = true\ntimeout_secs = 5"
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.access_token, "pk.file");
        assert_eq!(config.profile, TravelProfile::Driving);
        assert!(config.polygons);
        assert_eq!(config.isochrone_url, DEFAULT_ISOCHRONE_URL);

        let config = config
            .with_overrides(lookup(&[(ENV_ACCESS_TOKEN, "pk.env")]))
            .unwrap();
        assert_eq!(config.access_token, "pk.env");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = \"fifteen\"").unwrap();
        assert!(matches!(
            ClientConfig::from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
