use tracing::info;

use sessionvault::{db, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let app_state = AppState::init().await?;
    db::migrate(&app_state.db).await?;

    info!(
        issuer = %app_state.credentials.signer().issuer(),
        "credential service ready"
    );
    Ok(())
}
