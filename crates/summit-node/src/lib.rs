//! Summit Node - demon list server
//!
//! HTTP server around the `summit-core` ranked-list engine. Provides
//! persistent storage for demons, completions, and accounts, and exposes
//! the list, moderation workflow, and leaderboard over a JSON API.
//!
//! # Architecture
//!
//! - **Storage**: RocksDB-backed persistence, one JSON blob per record
//! - **Stores**: per-collection locks bridging core mutations to storage
//!   with persist-then-confirm semantics
//! - **API**: axum HTTP endpoints plus static frontend serving
//!
//! # Example
//!
//! ```no_run
//! use summit_node::{NodeConfig, SummitNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::default();
//!     let node = SummitNode::new(config)?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod api;
pub mod error;
pub mod node;
pub mod storage;
pub mod store;

pub use account::Account;
pub use error::{Error, Result};
pub use node::{NodeConfig, NodeState, SummitNode};
pub use storage::Storage;
pub use store::{AccountStore, CompletionStore, ListStore};
