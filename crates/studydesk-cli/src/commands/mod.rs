//! Subcommand implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use studydesk_client::config::{create_api, load_config_from, StudydeskConfig};
use studydesk_core::traits::StudyApi;

pub mod courses;
pub mod dashboard;
pub mod init;
pub mod notes;
pub mod quiz;

/// Loaded configuration plus the backend it points at.
pub struct Session {
    pub config: StudydeskConfig,
    pub api: Arc<dyn StudyApi>,
}

pub fn connect(config_path: Option<PathBuf>) -> Result<Session> {
    let config = load_config_from(config_path.as_deref())?;
    tracing::debug!(base_url = %config.api.base_url, "using backend");
    let api = create_api(&config)?;
    Ok(Session { config, api })
}
