use serde::Deserialize;
use std::path::PathBuf;

use recommender::{DEFAULT_CACHE_CAPACITY, DEFAULT_RECOMMENDATIONS};

/// Settings for the HTTP service
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding movie_list.dat and similarity.dat
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum number of (title, count) keys kept in the recommendation cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Recommendations returned when a request doesn't ask for a count
    #[serde(default = "default_count")]
    pub default_count: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_count() -> usize {
    DEFAULT_RECOMMENDATIONS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            cache_capacity: default_cache_capacity(),
            default_count: default_count(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
