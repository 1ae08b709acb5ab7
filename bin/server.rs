// Offsets Pendientes - Web Server
// Upload a PDF export, review Datos / Pendientes, download the xlsx

use anyhow::{Context, Result};
use offsets_pendientes::config::{init_logging, ServerConfig};
use offsets_pendientes::server::router;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&["offsets_pendientes=info", "tower_http=debug"]);

    let config = ServerConfig::from_env();
    let app = router(&config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.addr))?;

    info!(
        addr = %config.addr,
        max_upload_bytes = config.max_upload_bytes,
        "🚀 Offsets server running"
    );
    println!("\n   UI:  http://{}", config.addr);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server terminated with an error")?;

    Ok(())
}
