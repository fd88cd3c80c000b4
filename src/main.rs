use dotenvy::dotenv;
use tracing::info;

use hadir::infra::{
    app::create_app,
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let app_state = init_app_state()?;

    // Read bind address from config before moving app_state
    let bind_addr = app_state.config.bind_addr.clone();

    let headcount_poll = spawn_headcount_poll(app_state.clone());

    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app).await?;

    // The poll is advisory and read-only; stop it with the server.
    if let Some(handle) = headcount_poll {
        handle.abort();
    }

    Ok(())
}

fn spawn_headcount_poll(
    app_state: hadir::adapters::http::app_state::AppState,
) -> Option<tokio::task::JoinHandle<()>> {
    let poll_every = app_state.config.count_poll_seconds;
    if poll_every == 0 {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(poll_every));
        loop {
            interval.tick().await;
            match app_state.registration_use_cases.headcount().await {
                Some(count) => info!(count, "attendance headcount"),
                None => tracing::warn!("attendance headcount unavailable"),
            }
        }
    }))
}
