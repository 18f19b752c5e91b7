use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tribeca::session::{BridgeSession, SETUP_RETRY_SECS};
use tribeca::starlink::StarlinkClient;
use tribeca::{Config, SubaruClient};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    tribeca::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Tribeca Subaru vehicle bridge starting up");

    // Connect failures are not-ready conditions; keep retrying until the
    // cloud lets us in
    let session = loop {
        let client: Arc<dyn SubaruClient> = Arc::new(
            StarlinkClient::new(config.account.clone())
                .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?,
        );
        match BridgeSession::start(&config, client).await {
            Ok(session) => break Arc::new(session),
            Err(e) => {
                warn!(
                    "Setup not ready ({}), retrying in {}s",
                    e, SETUP_RETRY_SECS
                );
                tokio::time::sleep(Duration::from_secs(SETUP_RETRY_SECS)).await;
            }
        }
    };

    // Spawn web server
    let web_session = session.clone();
    let host = config.web.host.clone();
    let port = config.web.port;
    let web_task = tokio::spawn(async move {
        if let Err(e) = tribeca::web::serve(web_session, &host, port).await {
            error!("Web server error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    session.shutdown();
    web_task.abort();
    info!("Bridge shutdown complete");
    Ok(())
}
