//! `fisibot serve`: Start the HTTP tutor server.

use fisibot_agent::AGENT_NAME;
use tracing::warn;

use crate::runtime;

pub async fn run(port: Option<u16>, host: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = runtime::load_config()?;
    if let Some(port) = port {
        config.gateway.port = port;
    }
    if let Some(host) = host {
        config.gateway.host = host;
    }

    for warning in config.credential_warnings() {
        warn!("{warning}");
    }

    println!();
    println!("  ╔═══════════════════════════════════════════════════════╗");
    println!("  ║   Asistente de Física I - UBA                         ║");
    println!("  ╠═══════════════════════════════════════════════════════╣");
    println!("  ║   Servidor:       http://{}:{}", config.gateway.host, config.gateway.port);
    println!("  ║   Agente:         {AGENT_NAME}");
    println!("  ║   Modelo:         {}", config.model.name);
    println!("  ║   Base de datos:  Qdrant ({})", config.qdrant.collection);
    println!("  ╚═══════════════════════════════════════════════════════╝");
    println!();

    let agent = runtime::build_agent(&config).await?;
    fisibot_gateway::start(&config, agent).await?;

    Ok(())
}
