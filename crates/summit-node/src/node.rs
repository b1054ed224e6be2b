//! Summit node - the main application entry point.
//!
//! Architecture:
//! - Single process with shared RocksDB storage
//! - One store per collection (demons, completions, accounts), each with
//!   its own lock so list mutations serialize without blocking account
//!   reads
//! - HTTP API for clients and the moderation frontend

use crate::api;
use crate::error::Result;
use crate::storage::Storage;
use crate::store::{AccountStore, CompletionStore, ListStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a Summit node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory for storage
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Directory served under /public (frontend assets)
    pub public_dir: PathBuf,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl NodeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(
            std::env::var("SUMMIT_DATA_DIR").unwrap_or_else(|_| "./summit-data".to_string()),
        );

        let api_addr = std::env::var("SUMMIT_API_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8040".to_string())
            .parse()
            .expect("Invalid SUMMIT_API_ADDR");

        let public_dir = std::env::var("SUMMIT_PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./public"));

        Self {
            data_dir,
            api_addr,
            public_dir,
        }
    }
}

/// Shared state for the node - one store per collection over a single
/// storage instance.
pub struct NodeState {
    pub demons: ListStore,
    pub completions: CompletionStore,
    pub accounts: AccountStore,
    pub config: NodeConfig,
}

/// A Summit node instance.
pub struct SummitNode {
    state: Arc<NodeState>,
    config: NodeConfig,
}

impl SummitNode {
    /// Create a new node, loading all collections from storage.
    pub fn new(config: NodeConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let storage = Arc::new(Storage::open(&config.data_dir)?);

        let state = Arc::new(NodeState {
            demons: ListStore::load(Arc::clone(&storage))?,
            completions: CompletionStore::load(Arc::clone(&storage))?,
            accounts: AccountStore::load(storage)?,
            config: config.clone(),
        });

        Ok(Self { state, config })
    }

    /// Get the shared state (for API handlers).
    pub fn state(&self) -> Arc<NodeState> {
        Arc::clone(&self.state)
    }

    /// Run the node's HTTP server until shutdown.
    pub async fn run(self) -> Result<()> {
        tracing::info!("Summit node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Data: {:?}", self.config.data_dir);
        tracing::info!("  Public: {:?}", self.config.public_dir);

        let app = api::build_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
