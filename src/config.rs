use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    signature::{read_keypair_file, Keypair},
};
use std::{fs, path::Path, time::Duration};

use crate::exchanges::pumpfun::constants::{DEFAULT_METADATA_UPLOAD_URL, DEFAULT_SLIPPAGE_BPS};
use crate::shared::config::ClientConfig;
use crate::shared::types::{PriorityFee, TxOptions};

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    /// First entry is the primary endpoint
    pub endpoints: Vec<String>,
    pub ws_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletCfg {
    /// Path to a JSON keypair file
    pub keypair: Option<String>,
    /// Base58 secret key, used when no keypair file is given
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u64,
    #[serde(default = "default_commitment")]
    pub commitment: CommitmentLevel,
    #[serde(default = "default_commitment")]
    pub finality: CommitmentLevel,
    #[serde(default = "default_poll_interval_ms")]
    pub confirm_poll_interval_ms: u64,
    pub priority_fee: Option<PriorityFee>,
}

impl Default for TradeCfg {
    fn default() -> Self {
        Self {
            slippage_bps: default_slippage_bps(),
            commitment: default_commitment(),
            finality: default_commitment(),
            confirm_poll_interval_ms: default_poll_interval_ms(),
            priority_fee: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataCfg {
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
}

impl Default for MetadataCfg {
    fn default() -> Self {
        Self {
            upload_url: default_upload_url(),
        }
    }
}

fn default_slippage_bps() -> u64 {
    DEFAULT_SLIPPAGE_BPS
}

fn default_commitment() -> CommitmentLevel {
    CommitmentLevel::Finalized
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_upload_url() -> String {
    DEFAULT_METADATA_UPLOAD_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcCfg,
    #[serde(default)]
    pub wallet: WalletCfg,
    #[serde(default)]
    pub trade: TradeCfg,
    #[serde(default)]
    pub metadata: MetadataCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        if cfg.rpc.endpoints.is_empty() {
            return Err(anyhow!("[rpc] endpoints must list at least one URL"));
        }
        if cfg.trade.slippage_bps > 10_000 {
            return Err(anyhow!("slippage_bps must be at most 10000"));
        }
        Ok(cfg)
    }

    /// Config built from command line values only
    pub fn from_cli(endpoints: Vec<String>, ws_url: String) -> Self {
        Self {
            rpc: RpcCfg { endpoints, ws_url },
            wallet: WalletCfg::default(),
            trade: TradeCfg::default(),
            metadata: MetadataCfg::default(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            confirm_poll_interval: Duration::from_millis(self.trade.confirm_poll_interval_ms),
            metadata_upload_url: self.metadata.upload_url.clone(),
            ..ClientConfig::default()
        }
    }

    pub fn tx_options(&self) -> TxOptions {
        let options = TxOptions::default()
            .with_commitment(CommitmentConfig {
                commitment: self.trade.commitment,
            })
            .with_finality(CommitmentConfig {
                commitment: self.trade.finality,
            });
        match self.trade.priority_fee {
            Some(fee) => options.with_priority_fee(fee),
            None => options,
        }
    }

    pub fn load_keypair(&self) -> Result<Keypair> {
        if let Some(path) = &self.wallet.keypair {
            return read_keypair_file(path).map_err(|e| anyhow!("read keypair {}: {}", path, e));
        }
        if let Some(secret) = &self.wallet.private_key {
            return keypair_from_base58(secret);
        }
        Err(anyhow!("no wallet configured: set [wallet] keypair or private_key"))
    }
}

pub fn keypair_from_base58(secret: &str) -> Result<Keypair> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .context("decode base58 secret key")?;
    Keypair::from_bytes(&bytes).map_err(|e| anyhow!("invalid secret key: {}", e))
}
