//! QKart CLI - a terminal storefront for the QKart backend.
//!
//! # Usage
//!
//! ```bash
//! # Browse and search the catalog
//! qkart products
//! qkart search "leather"
//!
//! # Log in (prompts for the password if not given)
//! qkart login -u crio.do
//!
//! # Manage the cart
//! qkart add BW0jAAeDJmlZCF8i --qty 2
//! qkart set-qty BW0jAAeDJmlZCF8i 0
//! qkart cart
//! qkart checkout
//!
//! # Interactive storefront with live, debounced search
//! qkart shop
//! ```
//!
//! # Environment Variables
//!
//! - `QKART_API_ENDPOINT` - backend base URL (default `http://localhost:8082/api/v1`)
//! - `QKART_SESSION_FILE` - where the login token is kept (default `.qkart/session.json`)
//! - `QKART_SEARCH_DEBOUNCE_MS` - search debounce window in `shop` (default 500)
//! - `QKART_CATALOG_CACHE_TTL_SECS` - enable the in-memory catalog cache
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - error reporting
//! - `RUST_LOG` - log filter (logs go to stderr)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use qkart_core::ProductId;
use qkart_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::Layer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CommandError, Context};

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart storefront in the terminal")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog
    Products,
    /// Search the catalog by name or category
    Search {
        /// Search text
        text: String,
    },
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,

        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        /// Prompted for (twice) when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the cart
    Cart,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set the quantity of a product in the cart (0 removes it)
    SetQty {
        /// Product ID
        product_id: String,

        qty: u32,
    },
    /// Proceed to checkout
    Checkout,
    /// Interactive storefront
    Shop,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart=warn,qkart_storefront=warn".into());

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let fmt_layer = if json {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = StorefrontConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    init_tracing(cli.log_json);
    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        // process::exit skips destructors; flush Sentry first
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), CommandError> {
    let ctx = Context::new(config)?;

    let result = match command {
        Commands::Products => commands::catalog::list(&ctx).await,
        Commands::Search { text } => commands::catalog::search(&ctx, &text).await,
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, &username, password).await
        }
        Commands::Register { username, password } => {
            commands::auth::register(&ctx, &username, password).await
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Cart => commands::cart::show(&ctx).await,
        Commands::Add { product_id, qty } => {
            commands::cart::add(&ctx, &ProductId::new(product_id), qty).await
        }
        Commands::SetQty { product_id, qty } => {
            commands::cart::set_quantity(&ctx, &ProductId::new(product_id), qty).await
        }
        Commands::Checkout => commands::cart::checkout(&ctx).await,
        Commands::Shop => commands::shop::run(&ctx).await,
    };

    // Notifications are shown even when the command failed
    ctx.flush()?;
    result
}
