use campus_server::get_configuration;
use campus_server::startup::{AppState, run_server};
use std::{net::IpAddr, time::Instant};

use crate::CliError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ServerOverrides {
    pub interface: Option<IpAddr>,
    pub port: Option<u16>,
}

impl ServerOverrides {
    #[must_use]
    pub fn new(interface: Option<IpAddr>, port: Option<u16>) -> Self {
        Self { interface, port }
    }
}

pub fn start_server(overrides: ServerOverrides) -> Result<(), CliError> {
    let start = Instant::now();
    let mut settings = get_configuration()?;

    if let Some(interface) = overrides.interface {
        settings.app_settings.host = interface;
    }
    if let Some(port) = overrides.port {
        settings.app_settings.port = port;
    }

    tracing::debug!(?settings, "configuration loaded");

    let state = AppState::new(settings.db_settings.connect());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_server(settings.app_settings, state, start))?;

    Ok(())
}
