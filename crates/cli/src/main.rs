//! Shop Shop CLI - browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List every product, or one category
//! shop catalog
//! shop catalog --category 5f1a
//!
//! # Manage the cart
//! shop cart add 5f2b
//! shop cart set 5f2b 3
//! shop cart show
//!
//! # Pay, then record the order
//! shop checkout
//! shop order complete
//! ```
//!
//! Every invocation loads the catalog through the sync policy, so the CLI
//! keeps working from the local cache when `SHOP_API_URL` is unset or the
//! shop is unreachable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use clap::{Parser, Subcommand};
use shop_shop_core::{CategoryId, ProductId};
use shop_shop_storefront::config::ShopConfig;
use shop_shop_storefront::remote::{HttpRemote, OfflineRemote, RemoteSource};
use shop_shop_storefront::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Shop Shop storefront")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally filtered by category
    Catalog {
        /// Category ID to filter by
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show a single product
    Product {
        /// Product ID
        id: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Start payment for the cart
    Checkout,
    /// Record orders after payment
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: String,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        id: String,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        /// Product ID
        id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Open or close the cart drawer
    Toggle,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Submit the saved cart as an order
    Complete,
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shop_shop_storefront=info,shop_shop_cli=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "Loaded configuration");

    let result = match config.api_url.clone() {
        Some(endpoint) => {
            let remote = HttpRemote::new(endpoint, config.auth_token.clone());
            tracing::debug!(endpoint = %remote.endpoint(), "Using remote shop");
            run(cli.command, config, remote).await
        }
        None => {
            tracing::info!("SHOP_API_URL not set, running offline");
            run(cli.command, config, OfflineRemote).await
        }
    };

    if let Err(e) = result {
        if e.is_user_error() {
            tracing::warn!("{}", e.user_message());
        } else {
            tracing::error!(error = %e, "Command failed: {}", e.user_message());
        }
        std::process::exit(1);
    }
}

async fn run<R: RemoteSource>(
    command: Commands,
    config: ShopConfig,
    remote: R,
) -> Result<(), CommandError> {
    let state = AppState::open(config, remote);

    let mut out = std::io::stdout().lock();
    let result = execute(command, &state, &mut out).await;
    out.flush()?;

    state.shutdown().await;
    result
}

async fn execute<R: RemoteSource>(
    command: Commands,
    state: &AppState<R>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    match command {
        Commands::Catalog { category } => {
            commands::catalog::list(state, category.map(CategoryId::new), out).await
        }
        Commands::Product { id } => commands::catalog::show(state, &ProductId::new(id), out).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state, out).await,
            CartAction::Add { id } => commands::cart::add(state, &ProductId::new(id), out).await,
            CartAction::Remove { id } => {
                commands::cart::remove(state, &ProductId::new(id), out).await
            }
            CartAction::Set { id, quantity } => {
                commands::cart::set(state, &ProductId::new(id), quantity, out).await
            }
            CartAction::Clear => commands::cart::clear(state, out).await,
            CartAction::Toggle => commands::cart::toggle(state, out).await,
        },
        Commands::Checkout => commands::cart::checkout(state, out).await,
        Commands::Order {
            action: OrderAction::Complete,
        } => commands::order::complete(state, out).await,
    }
}
