//! Session Clock - A 25 + 5 session/break countdown clock
//!
//! This is the main entry point for the session-clock server.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{info, warn};

use session_clock::{
    api::create_router,
    config::Config,
    services::{AlertSound, CommandSound, TerminalBell},
    state::AppState,
    tasks::{announcer_task, audio_failure_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("session_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting session-clock server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, sound={:?}, player={}",
          config.host, config.port, config.sound, config.player);

    // Pick the alert sound; a failed load is shown to the user but never stops the clock
    let (failure_tx, failure_rx) = mpsc::unbounded_channel();
    let (sound, load_result) = match &config.sound {
        Some(path) => {
            let sound = Arc::new(CommandSound::new(config.player.clone(), path.clone(), failure_tx));
            let load_result = sound.load().await;
            (sound as Arc<dyn AlertSound>, load_result)
        }
        None => {
            info!("No sound file configured, using the terminal bell");
            (Arc::new(TerminalBell) as Arc<dyn AlertSound>, Ok(()))
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(sound, config.port, config.host.clone()));

    if let Err(e) = load_result {
        warn!("{}", e);
        if let Err(e) = state.report_audio_error(&e) {
            tracing::error!("Failed to record audio error: {}", e);
        }
    }

    // Start the background listeners
    tokio::spawn(audio_failure_task(Arc::clone(&state), failure_rx));
    tokio::spawn(announcer_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /break/increment   - Lengthen the break");
    info!("  POST /break/decrement   - Shorten the break");
    info!("  POST /session/increment - Lengthen the session");
    info!("  POST /session/decrement - Shorten the session");
    info!("  POST /start_stop        - Start or pause the countdown");
    info!("  POST /reset             - Restore the initial clock");
    info!("  GET  /status            - Current clock and server status");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to install signal handler: {}", e),
            }
        }
    }

    // Release the tick resource before exiting
    if let Err(e) = state.stop() {
        warn!("Failed to stop clock on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
