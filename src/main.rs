// src/main.rs

//! # DID Registry and Signed NFT Minter - Main Entry Point
//!
//! Loads configuration, initializes logging, builds the identity ledger and
//! starts the API server.
//!
//! ## Environment Variables
//! - `RUST_LOG`: (Optional) overrides `log_level`
//! - `DID_NFT__SERVER__HOST` / `DID_NFT__SERVER__PORT`: (Optional) bind address
//! - `DID_NFT__MINT__MODE`: (Optional) `did` (default) or `fixed`
//! - `DID_NFT__MINT__VERIFIER_ADDRESS`: required in `fixed` mode
//! - `DID_NFT__REGISTRY__DELETE_POLICY`: (Optional) `explicit` or `legacy`

use anyhow::Context;
use did_signed_nft::config::Settings;
use did_signed_nft::services::api_server::ApiServer;
use did_signed_nft::services::identity_ledger::IdentityLedger;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let settings = Settings::load().context("failed to load configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.as_str()),
    )
    .init();

    let mode = settings.mint_mode().context("invalid mint configuration")?;
    let registry_config = settings.registry_config();
    log::info!(
        "starting with mint authority {:?}, registry policies {:?}",
        mode,
        registry_config
    );

    let ledger = IdentityLedger::new(registry_config, mode);
    let addr = settings.socket_addr().context("invalid server address")?;

    log::info!("Available endpoints:");
    log::info!("- POST   /create-did");
    log::info!("- PUT    /update-did");
    log::info!("- DELETE /delete-did/:did");
    log::info!("- GET    /did-documents/:did, /did/:id, /did-document/:id");
    log::info!("- POST   /mint-nft");
    log::info!("- GET    /token-uri/:token_id, /owner-of/:token_id");

    ApiServer::new(ledger)
        .run(addr)
        .await
        .with_context(|| format!("API server on {} failed", addr))
}
