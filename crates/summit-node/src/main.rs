//! Summit Node binary
//!
//! The demon list server process.

use summit_node::{NodeConfig, SummitNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "summit_node=info,summit_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Summit Node");

    let config = NodeConfig::from_env();

    let node = SummitNode::new(config)?;
    node.run().await?;

    Ok(())
}
