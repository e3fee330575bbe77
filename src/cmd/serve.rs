//! Board server command: `taskboard serve`.

use anyhow::Result;
use taskboard::config::TaskboardConfig;
use taskboard::web::server::{self, ServerConfig};

/// CLI flags win over the file and environment.
pub fn resolve_server_config(
    config: TaskboardConfig,
    host: Option<String>,
    port: Option<u16>,
    dev: bool,
    no_seed: bool,
) -> ServerConfig {
    let mut server = config.server_config();
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }
    server.dev_mode |= dev;
    if no_seed {
        server.seed = false;
    }
    server
}

pub async fn cmd_serve(
    config: TaskboardConfig,
    host: Option<String>,
    port: Option<u16>,
    dev: bool,
    no_seed: bool,
) -> Result<()> {
    let server_config = resolve_server_config(config, host, port, dev, no_seed);
    server::start_server(server_config).await?;
    Ok(())
}
