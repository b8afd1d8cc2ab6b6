//! Orderdesk CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! orderdesk-cli migrate
//!
//! # Seed the store with a test order
//! orderdesk-cli seed
//! orderdesk-cli seed --order-uid my-order-1
//!
//! # Publish an order document to the ingest topic
//! orderdesk-cli publish
//! orderdesk-cli publish --file order.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert a test order directly into the store
//! - `publish` - Produce an order document onto the Kafka topic

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orderdesk-cli")]
#[command(author, version, about = "Orderdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert a test order directly into the store
    Seed {
        /// UID for the seeded order
        #[arg(short, long, default_value = "test-order-123")]
        order_uid: String,
    },
    /// Publish an order document to the ingest topic
    Publish {
        /// JSON file holding the order document; a generated test order is
        /// published when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Kafka broker list
        #[arg(long, default_value = "localhost:9092")]
        brokers: String,

        /// Topic to publish to
        #[arg(long, default_value = "orders")]
        topic: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { order_uid } => commands::seed::run(order_uid).await?,
        Commands::Publish {
            file,
            brokers,
            topic,
        } => commands::publish::run(file.as_deref(), &brokers, &topic).await?,
    }
    Ok(())
}
