//! services/client/src/bin/readr.rs

use client_lib::{
    adapters::{BackendHttp, FileSessionStore, LoggingEmbed, WsProgressChannel},
    app::{auth_flow::AuthFlow, catalog::Catalog, AppState, ProgressTracker},
    config::Config,
    error::ClientError,
    session::SessionContext,
};
use readr_core::ports::{AuthApi, ProgressChannel};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Backend at {}", config.backend_url);

    // --- 2. Restore the Session ---
    let store = Arc::new(FileSessionStore::new(config.session_path.clone()));
    let session = SessionContext::restore(store);

    // --- 3. Initialize Service Adapters & Build the Shared AppState ---
    let backend = Arc::new(BackendHttp::new(config.backend_url.clone(), session.clone()));
    let state = AppState {
        config: config.clone(),
        session: session.clone(),
        auth_api: backend.clone(),
        file_api: backend,
        embed: Arc::new(LoggingEmbed),
    };

    // --- 4. Log In If Needed ---
    if !state.session.is_authenticated() {
        login_over_stdin(state.auth_api.clone(), state.session.clone()).await?;
    }
    let user_email = state.session.user_email()?;
    info!("Signed in as {user_email}");

    // --- 5. Load the Catalog & Track Processing ---
    let mut catalog = Catalog::new(state.file_api.clone());
    let channel: Arc<dyn ProgressChannel> = Arc::new(WsProgressChannel::connect(
        state.config.progress_ws_url.clone(),
    ));
    let (tracker, mut completions) = ProgressTracker::new(channel);

    catalog.refresh(&tracker).await;
    if let Some(notice) = catalog.notice() {
        warn!("{notice}");
    }
    print_catalog(&catalog, &tracker);
    tracker.track_catalog(&user_email, catalog.files()).await?;

    // --- 6. Follow Completions Until Interrupted ---
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            finished = completions.recv() => {
                let Some(file_id) = finished else { break };
                info!("Processing complete for {file_id}");
                catalog.refresh(&tracker).await;
                print_catalog(&catalog, &tracker);
            }
        }
    }

    tracker.teardown().await;
    info!("Shutting down");
    Ok(())
}

/// Minimal email/OTP prompt loop over stdin.
async fn login_over_stdin(
    auth_api: Arc<dyn AuthApi>,
    session: SessionContext,
) -> Result<(), ClientError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut flow = AuthFlow::new(auth_api, session);

    loop {
        println!("Email:");
        let Some(email) = lines.next_line().await? else {
            return Err(ClientError::Internal("stdin closed during login".to_string()));
        };
        if let Err(e) = flow.request_code(email.trim()).await {
            warn!("{e}");
            continue;
        }
        println!("A verification code was sent to {}.", email.trim());

        println!("Code:");
        let Some(code) = lines.next_line().await? else {
            return Err(ClientError::Internal("stdin closed during login".to_string()));
        };
        match flow.verify(code.trim()).await {
            Ok(()) => return Ok(()),
            Err(e) => warn!("{e}"),
        }
    }
}

fn print_catalog(catalog: &Catalog, tracker: &ProgressTracker) {
    for file in catalog.files() {
        match tracker.state_of(&file.id) {
            Some(state) => println!(
                "  {}  {}  [{} {}%]",
                file.id,
                file.file_name,
                state.phase,
                state.display_percent()
            ),
            None => println!("  {}  {}  [ready]", file.id, file.file_name),
        }
    }
}
