//! CLI commands and handlers
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::services::PumpFunClient;
use crate::config::Config;
use crate::domain::events::{DomainEvent, EventHandler, EventKind};
use crate::exchanges::pumpfun::constants::DEFAULT_DECIMALS;
use crate::shared::types::{BroadcastOutcome, CreateTokenMetadata};
use crate::shared::utils::{
    format_amount, format_sol, format_timestamp, sol_to_lamports, solscan_url,
};

#[derive(Parser)]
#[command(name = "pumpfun-client")]
#[command(version, about = "Create, buy, sell and watch tokens on the pump.fun bonding curve")]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// RPC endpoint URL, repeat for broadcast relays (first is primary)
    #[arg(long = "rpc-url", global = true)]
    pub rpc_urls: Vec<String>,

    /// WebSocket endpoint for event subscriptions
    #[arg(long, global = true)]
    pub ws_url: Option<String>,

    /// Path to keypair file (overrides config)
    #[arg(long, global = true)]
    pub keypair: Option<String>,

    /// Slippage tolerance in basis points (overrides config)
    #[arg(long, global = true)]
    pub slippage_bps: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Buy tokens from a bonding curve
    Buy {
        /// Token mint address
        mint: String,

        /// SOL to spend
        #[arg(long)]
        sol: f64,
    },

    /// Sell tokens back to a bonding curve
    Sell {
        /// Token mint address
        mint: String,

        /// Raw token amount (6 decimals)
        #[arg(long)]
        amount: u64,
    },

    /// Upload metadata and create a new token
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        symbol: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Image file uploaded with the metadata
        #[arg(long)]
        image: PathBuf,

        /// SOL spent on the creator's initial buy
        #[arg(long, default_value_t = 0.0)]
        buy_sol: f64,

        #[arg(long)]
        twitter: Option<String>,

        #[arg(long)]
        telegram: Option<String>,

        #[arg(long)]
        website: Option<String>,
    },

    /// Print program events as JSON
    Listen {
        /// Event names: createEvent, tradeEvent, completeEvent, setParamsEvent
        #[arg(long, value_delimiter = ',', default_value = "tradeEvent")]
        events: Vec<String>,

        /// Stop after this many seconds (runs until Ctrl-C otherwise)
        #[arg(long)]
        duration: Option<u64>,
    },
}

pub struct CommandExecutor {
    config: Config,
    client: PumpFunClient,
    keypair_override: Option<String>,
    slippage_bps: u64,
}

impl CommandExecutor {
    /// Resolve configuration with priority: CLI args > config file > defaults
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::from_file(path)?,
            None => {
                if cli.rpc_urls.is_empty() {
                    return Err(anyhow!("--rpc-url is required when not using --config"));
                }
                let ws_url = cli
                    .ws_url
                    .clone()
                    .unwrap_or_else(|| derive_ws_url(&cli.rpc_urls[0]));
                Config::from_cli(cli.rpc_urls.clone(), ws_url)
            }
        };

        if cli.config.is_some() && !cli.rpc_urls.is_empty() {
            config.rpc.endpoints = cli.rpc_urls.clone();
        }
        if let Some(ws_url) = &cli.ws_url {
            config.rpc.ws_url = ws_url.clone();
        }
        let slippage_bps = cli.slippage_bps.unwrap_or(config.trade.slippage_bps);
        if slippage_bps > 10_000 {
            return Err(anyhow!("--slippage-bps must be at most 10000"));
        }

        let client = PumpFunClient::from_urls(
            &config.rpc.endpoints,
            config.rpc.ws_url.clone(),
            config.client_config(),
        )?;

        Ok(Self {
            config,
            client,
            keypair_override: cli.keypair.clone(),
            slippage_bps,
        })
    }

    fn wallet(&self) -> Result<Keypair> {
        match &self.keypair_override {
            Some(path) => solana_sdk::signature::read_keypair_file(path)
                .map_err(|e| anyhow!("read keypair {}: {}", path, e)),
            None => self.config.load_keypair(),
        }
    }

    /// Execute the selected command
    pub async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Buy { mint, sol } => self.execute_buy(&mint, sol).await,
            Commands::Sell { mint, amount } => self.execute_sell(&mint, amount).await,
            Commands::Create {
                name,
                symbol,
                description,
                image,
                buy_sol,
                twitter,
                telegram,
                website,
            } => {
                let file = std::fs::read(&image)
                    .with_context(|| format!("read image {}", image.display()))?;
                let file_name = image
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                let metadata = CreateTokenMetadata {
                    name,
                    symbol,
                    description,
                    file_name,
                    file,
                    twitter,
                    telegram,
                    website,
                };
                self.execute_create(&metadata, buy_sol).await
            }
            Commands::Listen { events, duration } => self.execute_listen(&events, duration).await,
        }
    }

    async fn execute_buy(&self, mint: &str, sol: f64) -> Result<()> {
        let lamports = parse_sol_amount(sol, "--sol")?;
        let wallet = self.wallet()?;
        let mint = Pubkey::from_str(mint).context("invalid mint address")?;

        let options = self.config.tx_options();
        if let Some(curve) = self
            .client
            .get_bonding_curve_account(&mint, options.commitment)
            .await?
        {
            info!("📈 {} market cap {}", mint, format_sol(curve.market_cap_sol()));
        }
        info!("🛒 Buying {} of {}", format_sol(lamports), mint);
        let outcome = self
            .client
            .buy(&wallet, &mint, lamports, self.slippage_bps, &options)
            .await?;
        report(&outcome)
    }

    async fn execute_sell(&self, mint: &str, amount: u64) -> Result<()> {
        let wallet = self.wallet()?;
        let mint = Pubkey::from_str(mint).context("invalid mint address")?;

        info!(
            "💰 Selling {} tokens of {}",
            format_amount(amount, DEFAULT_DECIMALS),
            mint
        );
        let outcome = self
            .client
            .sell(&wallet, &mint, amount, self.slippage_bps, &self.config.tx_options())
            .await?;
        report(&outcome)
    }

    async fn execute_create(&self, metadata: &CreateTokenMetadata, buy_sol: f64) -> Result<()> {
        let buy_amount_sol = parse_sol_amount(buy_sol, "--buy-sol")?;
        let wallet = self.wallet()?;
        let mint = Keypair::new();
        info!("🪙 New mint: {}", mint.pubkey());

        let outcome = self
            .client
            .create_and_buy(
                &wallet,
                &mint,
                metadata,
                buy_amount_sol,
                self.slippage_bps,
                &self.config.tx_options(),
            )
            .await?;
        report(&outcome)
    }

    async fn execute_listen(&self, events: &[String], duration: Option<u64>) -> Result<()> {
        let kinds = events
            .iter()
            .map(|name| {
                EventKind::from_name(name.trim()).ok_or_else(|| anyhow!("unknown event: {}", name))
            })
            .collect::<Result<Vec<_>>>()?;

        let handler: EventHandler = Arc::new(|event: DomainEvent, _slot: u64, _signature: &str| {
            if let DomainEvent::Traded(trade) = &event {
                info!(
                    "{} {} {} for {} at {}",
                    if trade.is_buy { "🟢" } else { "🔴" },
                    trade.user,
                    trade.mint,
                    format_sol(trade.sol_amount),
                    format_timestamp(trade.timestamp)
                );
            }
            match serde_json::to_string(&event) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("⚠️ Failed to serialize event: {}", e),
            }
        });

        let mut ids = Vec::with_capacity(kinds.len());
        for kind in kinds {
            ids.push(self.client.add_event_listener(kind, handler.clone()).await?);
        }

        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                tokio::signal::ctrl_c().await?;
            }
        }

        for id in ids {
            self.client.remove_event_listener(id).await;
        }
        info!("👋 Listeners stopped");
        Ok(())
    }
}

/// Lamports for a SOL amount given on the command line
fn parse_sol_amount(sol: f64, flag: &str) -> Result<u64> {
    if !sol.is_finite() || sol < 0.0 {
        return Err(anyhow!("{} must be a non-negative number of SOL, got {}", flag, sol));
    }
    Ok(sol_to_lamports(sol))
}

/// `https://host` -> `wss://host`, `http://host` -> `ws://host`
fn derive_ws_url(rpc_url: &str) -> String {
    if let Some(rest) = rpc_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = rpc_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        rpc_url.to_string()
    }
}

fn report(outcome: &BroadcastOutcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    match (&outcome.signature, outcome.success) {
        (Some(signature), true) => info!("✅ Confirmed: {}", solscan_url(signature)),
        (Some(signature), false) if outcome.is_ambiguous() => warn!(
            "⚠️ Unconfirmed, transaction may still land: {}",
            solscan_url(signature)
        ),
        _ => warn!("❌ {}", outcome.error.as_deref().unwrap_or("Transaction failed")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_ws_url() {
        assert_eq!(derive_ws_url("https://api.mainnet-beta.solana.com"), "wss://api.mainnet-beta.solana.com");
        assert_eq!(derive_ws_url("http://127.0.0.1:8899"), "ws://127.0.0.1:8899");
    }

    #[test]
    fn test_parse_buy_command() {
        let cli = Cli::try_parse_from([
            "pumpfun-client",
            "--rpc-url",
            "https://a.example",
            "--rpc-url",
            "https://b.example",
            "buy",
            "So11111111111111111111111111111111111111112",
            "--sol",
            "0.5",
        ])
        .unwrap();

        assert_eq!(cli.rpc_urls.len(), 2);
        assert!(matches!(cli.command, Commands::Buy { sol, .. } if sol == 0.5));
    }

    #[test]
    fn test_parse_listen_events() {
        let cli = Cli::try_parse_from([
            "pumpfun-client",
            "listen",
            "--events",
            "createEvent,completeEvent",
        ])
        .unwrap();

        match cli.command {
            Commands::Listen { events, duration } => {
                assert_eq!(events, vec!["createEvent", "completeEvent"]);
                assert!(duration.is_none());
            }
            _ => panic!("expected listen"),
        }
    }

    #[test]
    fn test_parse_sol_amount_rejects_negative_and_nan() {
        assert_eq!(parse_sol_amount(0.5, "--sol").unwrap(), 500_000_000);
        assert_eq!(parse_sol_amount(0.0, "--buy-sol").unwrap(), 0);
        assert!(parse_sol_amount(-1.0, "--sol").is_err());
        assert!(parse_sol_amount(f64::NAN, "--sol").is_err());
        assert!(parse_sol_amount(f64::INFINITY, "--sol").is_err());
    }

    #[test]
    fn test_negative_sol_is_parsed_then_rejected() {
        let cli = Cli::try_parse_from([
            "pumpfun-client",
            "--rpc-url",
            "https://a.example",
            "buy",
            "So11111111111111111111111111111111111111112",
            "--sol=-1",
        ])
        .unwrap();

        match cli.command {
            Commands::Buy { sol, .. } => assert!(parse_sol_amount(sol, "--sol").is_err()),
            _ => panic!("expected buy"),
        }
    }
}
