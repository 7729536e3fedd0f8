//! Bluesky Session Check
//!
//! Creates a session with the configured credentials and prints who it
//! belongs to. Useful for checking an app password before wiring up the
//! webhooks.

use log::{error, info};
use skysync::{build_client, create_session, init_logging, SyncConfig, SyncError};
use std::process::ExitCode;

async fn check_session() -> Result<(), SyncError> {
    let config = SyncConfig::from_env()?;
    let client = build_client()?;

    let session = create_session(&client, &config, &config.credentials).await?;

    println!("✅ Session created successfully:");
    println!("   Handle: @{}", session.handle);
    println!("   DID:    {}", session.did);
    if let Some(email) = &session.email {
        println!("   Email:  {}", email);
    }
    if let Some(active) = session.active {
        println!("   Active: {}", active);
    }
    info!("Access and refresh tokens were issued and discarded");

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match check_session().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to create session: {}", e);
            ExitCode::FAILURE
        }
    }
}
