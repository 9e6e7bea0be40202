use std::sync::Arc;

use alloy::providers::ProviderBuilder;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use bridge_funder::chain::rpc::{RpcChainClient, WsLogSubscriber};
use bridge_funder::chain::ChainClient;
use bridge_funder::config::Config;
use bridge_funder::funding::dispatcher::Dispatcher;
use bridge_funder::funding::engine::FundingEngine;
use bridge_funder::notify::webhook::WebhookNotifier;
use bridge_funder::notify::{LogNotifier, Notifier};
use bridge_funder::pipeline::{FundingPipeline, SummaryFormat};
use bridge_funder::watcher::stream::StreamManager;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=info for output, LOG_FORMAT=json for JSON lines)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    tracing::info!("Bridge funder starting");

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!("Configuration loaded from {}", config_path);

    let contract = config.watch.contract()?;
    let handler = config.watch.handler()?;
    let signer = config.funding.signer()?;
    let limit = config.funding.limit()?;
    let amount = config.funding.amount()?;

    tracing::info!(
        sender = %signer.address(),
        contract = %contract,
        handler = %handler,
        limit_wei = %limit,
        amount_wei = %amount,
        "Funding parameters"
    );

    let provider = ProviderBuilder::new().connect_http(
        config
            .chain
            .rpc_http
            .parse()
            .map_err(|e| eyre::eyre!("Invalid RPC URL: {}", e))?,
    );
    let client: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(provider));

    let notifier: Arc<dyn Notifier> = match &config.notifier.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.clone(),
            &config.notifier,
            &config.chain.explorer_tx_url,
        )?),
        None => {
            tracing::warn!("No webhook configured, funding reports go to the log only");
            Arc::new(LogNotifier)
        }
    };

    let pipeline = FundingPipeline::new(
        handler,
        FundingEngine::new(client.clone(), limit),
        Dispatcher::new(client, signer, amount),
        notifier,
        SummaryFormat {
            symbol: config.funding.asset_symbol.clone(),
            native_decimals: config.funding.native_decimals,
            places: config.funding.summary_decimals,
        },
    );

    // Create shutdown signal
    let shutdown = CancellationToken::new();

    let (sender, receiver) = mpsc::channel(config.watch.channel_capacity);
    let manager = StreamManager::new(
        Arc::new(WsLogSubscriber::new(config.chain.rpc_ws.clone())),
        contract,
        config.watch.subscribe_timeout(),
        config.watch.reconnect_delay(),
    );
    let stream_handle = tokio::spawn(manager.run(sender, shutdown.clone()));

    tracing::info!("Watching for bridge transfers. Press Ctrl+C to stop.");

    let result = tokio::select! {
        res = pipeline.run(receiver) => res,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown signal received, stopping...");
            Ok(())
        }
    };

    shutdown.cancel();
    let _ = stream_handle.await;

    tracing::info!("Bridge funder stopped");
    result
}
