//! Client facade over the builder, the broadcast manager and the listeners

use std::sync::Arc;

use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use tracing::info;

use crate::domain::curve::{BondingCurveAccount, ConstantProductPricing, CurvePricing, GlobalAccount};
use crate::domain::events::{EventHandler, EventKind};
use crate::domain::execution::SwapInstructionBuilder;
use crate::infrastructure::blockchain::{
    EventListenerRegistry, LedgerRpc, ListenerId, MetadataUploadResponse, SolanaRpcClient,
    TokenMetadataUploader, TransactionExecutor,
};
use crate::shared::config::ClientConfig;
use crate::shared::errors::ClientError;
use crate::shared::types::{BroadcastOutcome, CreateTokenMetadata, SwapIntent, TxOptions};

/// pump.fun bonding curve client.
///
/// Endpoint 0 is the primary: account reads, blockhashes and confirmation go
/// through it, every endpoint receives each transaction.
pub struct PumpFunClient {
    config: ClientConfig,
    ws_url: String,
    builder: SwapInstructionBuilder,
    executor: TransactionExecutor,
    listeners: EventListenerRegistry,
    uploader: TokenMetadataUploader,
}

impl PumpFunClient {
    pub fn new(
        endpoints: Vec<Arc<dyn LedgerRpc>>,
        ws_url: String,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        Self::with_pricing(endpoints, ws_url, config, Arc::new(ConstantProductPricing))
    }

    pub fn with_pricing(
        endpoints: Vec<Arc<dyn LedgerRpc>>,
        ws_url: String,
        config: ClientConfig,
        pricing: Arc<dyn CurvePricing>,
    ) -> Result<Self, ClientError> {
        let executor = TransactionExecutor::new(endpoints, config.confirm_poll_interval)?;
        let builder =
            SwapInstructionBuilder::new(Arc::clone(executor.primary()), pricing, config.program_id);
        let uploader = TokenMetadataUploader::new(config.metadata_upload_url.clone());

        info!(
            "🔗 Client ready: {} endpoint(s), primary {}",
            executor.endpoint_count(),
            executor.primary().url()
        );

        Ok(Self {
            config,
            ws_url,
            builder,
            executor,
            listeners: EventListenerRegistry::new(),
            uploader,
        })
    }

    /// Connect to Solana RPC endpoints by URL; the first one is the primary
    pub fn from_urls(
        rpc_urls: &[String],
        ws_url: String,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let endpoints: Vec<Arc<dyn LedgerRpc>> = rpc_urls
            .iter()
            .map(|url| Arc::new(SolanaRpcClient::new(url.clone())) as Arc<dyn LedgerRpc>)
            .collect();
        Self::new(endpoints, ws_url, config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Upload metadata, then create the token with an optional initial buy.
    /// Both `creator` and `mint` sign.
    pub async fn create_and_buy(
        &self,
        creator: &Keypair,
        mint: &Keypair,
        metadata: &CreateTokenMetadata,
        buy_amount_sol: u64,
        slippage_bps: u64,
        options: &TxOptions,
    ) -> Result<BroadcastOutcome, ClientError> {
        let uploaded = self.create_token_metadata(metadata).await?;
        let instructions = self
            .make_create_and_buy_instructions(
                &creator.pubkey(),
                &mint.pubkey(),
                &metadata.name,
                &metadata.symbol,
                &uploaded.metadata_uri,
                buy_amount_sol,
                slippage_bps,
                options.commitment,
            )
            .await?;

        info!("🚀 Creating token {} ({})", metadata.symbol, mint.pubkey());
        Ok(self
            .executor
            .send_transaction(instructions, &[creator, mint], options, false)
            .await)
    }

    pub async fn buy(
        &self,
        buyer: &Keypair,
        mint: &Pubkey,
        buy_amount_sol: u64,
        slippage_bps: u64,
        options: &TxOptions,
    ) -> Result<BroadcastOutcome, ClientError> {
        self.swap(buyer, mint, SwapIntent::buy(buy_amount_sol, slippage_bps), options)
            .await
    }

    pub async fn sell(
        &self,
        seller: &Keypair,
        mint: &Pubkey,
        token_amount: u64,
        slippage_bps: u64,
        options: &TxOptions,
    ) -> Result<BroadcastOutcome, ClientError> {
        self.swap(seller, mint, SwapIntent::sell(token_amount, slippage_bps), options)
            .await
    }

    pub async fn swap(
        &self,
        owner: &Keypair,
        mint: &Pubkey,
        intent: SwapIntent,
        options: &TxOptions,
    ) -> Result<BroadcastOutcome, ClientError> {
        let instructions = self
            .builder
            .build_swap(&owner.pubkey(), mint, intent, options.commitment)
            .await?;

        info!(
            "💱 {:?} {} on {} ({} bps slippage)",
            intent.direction, intent.principal_amount, mint, intent.slippage_bps
        );
        Ok(self
            .executor
            .send_transaction(instructions, &[owner], options, false)
            .await)
    }

    /// Broadcast prebuilt buy instructions without preflight simulation
    pub async fn buy_fixed(
        &self,
        instructions: Vec<Instruction>,
        buyer: &Keypair,
        options: &TxOptions,
    ) -> BroadcastOutcome {
        self.executor
            .send_transaction(instructions, &[buyer], options, true)
            .await
    }

    pub async fn add_event_listener(
        &self,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<ListenerId, ClientError> {
        self.listeners
            .subscribe(
                &self.ws_url,
                self.config.program_id,
                kind,
                handler,
                self.config.event_commitment,
            )
            .await
    }

    pub async fn remove_event_listener(&self, id: ListenerId) {
        self.listeners.remove(id).await;
    }

    pub fn listeners(&self) -> &EventListenerRegistry {
        &self.listeners
    }

    pub async fn get_global_account(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<GlobalAccount, ClientError> {
        self.builder.get_global_account(commitment).await
    }

    pub async fn get_bonding_curve_account(
        &self,
        mint: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<Option<BondingCurveAccount>, ClientError> {
        self.builder.get_bonding_curve_account(mint, commitment).await
    }

    pub async fn make_buy_instructions(
        &self,
        buyer: &Pubkey,
        mint: &Pubkey,
        buy_amount_sol: u64,
        slippage_bps: u64,
        commitment: CommitmentConfig,
    ) -> Result<Vec<Instruction>, ClientError> {
        self.builder
            .buy_instructions(buyer, mint, buy_amount_sol, slippage_bps, commitment)
            .await
    }

    pub async fn make_sell_instructions(
        &self,
        seller: &Pubkey,
        mint: &Pubkey,
        token_amount: u64,
        slippage_bps: u64,
        commitment: CommitmentConfig,
    ) -> Result<Vec<Instruction>, ClientError> {
        self.builder
            .sell_instructions(seller, mint, token_amount, slippage_bps, commitment)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn make_create_and_buy_instructions(
        &self,
        creator: &Pubkey,
        mint: &Pubkey,
        name: &str,
        symbol: &str,
        uri: &str,
        buy_amount_sol: u64,
        slippage_bps: u64,
        commitment: CommitmentConfig,
    ) -> Result<Vec<Instruction>, ClientError> {
        self.builder
            .create_and_buy_instructions(
                creator,
                mint,
                name,
                symbol,
                uri,
                buy_amount_sol,
                slippage_bps,
                commitment,
            )
            .await
    }

    pub fn buy_instructions_fixed(
        &self,
        buyer: &Pubkey,
        mint: &Pubkey,
        fee_recipient: &Pubkey,
        token_amount: u64,
        max_sol_cost: u64,
    ) -> Result<Vec<Instruction>, ClientError> {
        self.builder
            .buy_instructions_fixed(buyer, mint, fee_recipient, token_amount, max_sol_cost)
    }

    pub fn sell_instructions_fixed(
        &self,
        seller: &Pubkey,
        mint: &Pubkey,
        fee_recipient: &Pubkey,
        token_amount: u64,
        min_sol_output: u64,
    ) -> Result<Vec<Instruction>, ClientError> {
        self.builder
            .sell_instructions_fixed(seller, mint, fee_recipient, token_amount, min_sol_output)
    }

    pub async fn create_token_metadata(
        &self,
        metadata: &CreateTokenMetadata,
    ) -> Result<MetadataUploadResponse, ClientError> {
        self.uploader.upload(metadata).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::curve::accounts::fixtures::{bonding_curve_data, global_data};
    use crate::exchanges::pumpfun::{constants::PUMPFUN_PROGRAM_ID, pda};
    use crate::infrastructure::blockchain::mock_rpc::MockRpc;
    use std::time::Duration;

    fn test_config(upload_url: Option<String>) -> ClientConfig {
        ClientConfig {
            confirm_poll_interval: Duration::from_millis(1),
            metadata_upload_url: upload_url.unwrap_or_default(),
            ..ClientConfig::default()
        }
    }

    fn primary_with_curve(mint: &Pubkey) -> Arc<MockRpc> {
        Arc::new(
            MockRpc::new("primary")
                .with_account(
                    pda::global_pda(&PUMPFUN_PROGRAM_ID),
                    global_data(Pubkey::new_unique(), 100),
                )
                .with_account(
                    pda::bonding_curve_pda(mint, &PUMPFUN_PROGRAM_ID),
                    bonding_curve_data(false),
                ),
        )
    }

    #[test]
    fn test_rejects_empty_endpoint_list() {
        let result = PumpFunClient::new(vec![], "ws://localhost".to_string(), test_config(None));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_buy_end_to_end() {
        let mint = Pubkey::new_unique();
        let primary = primary_with_curve(&mint);
        let client = PumpFunClient::new(
            vec![primary.clone()],
            "ws://localhost".to_string(),
            test_config(None),
        )
        .unwrap();
        let buyer = Keypair::new();

        let outcome = client
            .buy(&buyer, &mint, 100_000_000, 500, &TxOptions::default())
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(primary.sent_count(), 1);
        let sent = primary.sent.lock().unwrap()[0].clone();
        assert_eq!(sent.message.static_account_keys()[0], buyer.pubkey());
        assert_eq!(sent.message.instructions().len(), 2);
    }

    #[tokio::test]
    async fn test_sell_of_unknown_mint_is_an_error() {
        let primary = Arc::new(MockRpc::new("primary"));
        let client = PumpFunClient::new(
            vec![primary.clone()],
            "ws://localhost".to_string(),
            test_config(None),
        )
        .unwrap();

        let result = client
            .sell(&Keypair::new(), &Pubkey::new_unique(), 1_000, 500, &TxOptions::default())
            .await;

        assert!(matches!(result, Err(ClientError::BondingCurveNotFound(_))));
        assert_eq!(primary.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_buy_fixed_with_priority_fee() {
        let primary = Arc::new(MockRpc::new("primary"));
        let client = PumpFunClient::new(
            vec![primary.clone()],
            "ws://localhost".to_string(),
            test_config(None),
        )
        .unwrap();
        let buyer = Keypair::new();
        let instructions = client
            .buy_instructions_fixed(
                &buyer.pubkey(),
                &Pubkey::new_unique(),
                &Pubkey::new_unique(),
                1_000,
                2_000,
            )
            .unwrap();
        let options = TxOptions::default().with_priority_fee(crate::shared::types::PriorityFee {
            unit_limit: 100_000,
            unit_price: 1_000,
        });

        let outcome = client.buy_fixed(instructions, &buyer, &options).await;

        assert!(outcome.success);
        let sent = primary.sent.lock().unwrap()[0].clone();
        assert_eq!(sent.message.instructions().len(), 4);
    }

    #[tokio::test]
    async fn test_create_and_buy_signs_with_mint() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/ipfs")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"metadataUri":"https://ipfs.io/ipfs/QmXyz","metadata":{}}"#)
            .create_async()
            .await;

        let primary = Arc::new(MockRpc::new("primary").with_account(
            pda::global_pda(&PUMPFUN_PROGRAM_ID),
            global_data(Pubkey::new_unique(), 100),
        ));
        let client = PumpFunClient::new(
            vec![primary.clone()],
            "ws://localhost".to_string(),
            test_config(Some(format!("{}/api/ipfs", server.url()))),
        )
        .unwrap();
        let creator = Keypair::new();
        let mint = Keypair::new();
        let metadata = CreateTokenMetadata {
            name: "Test".to_string(),
            symbol: "TST".to_string(),
            description: "test".to_string(),
            file_name: "logo.png".to_string(),
            file: vec![1, 2, 3],
            twitter: None,
            telegram: None,
            website: None,
        };

        let outcome = client
            .create_and_buy(&creator, &mint, &metadata, 10_000_000, 100, &TxOptions::default())
            .await
            .unwrap();

        assert!(outcome.success);
        let sent = primary.sent.lock().unwrap()[0].clone();
        assert_eq!(sent.signatures.len(), 2);
        assert_eq!(sent.message.instructions().len(), 3);
        assert!(sent.verify_with_results().iter().all(|ok| *ok));
    }
}
