//! studydesk-client: HTTP backend and configuration.
//!
//! Implements the `StudyApi` trait against the study backend's REST API and
//! loads the client configuration from TOML.

pub mod config;
pub mod http;

pub use config::{create_api, load_config_from, StudydeskConfig};
pub use http::HttpApi;
