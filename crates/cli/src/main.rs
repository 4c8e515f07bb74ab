//! Hazel Lab CLI - RUT checks and scripted storefront access.
//!
//! # Usage
//!
//! ```bash
//! # Validate and format RUTs
//! hl-cli rut check 12.345.678-5
//! hl-cli rut format 123456785
//! hl-cli rut check-digit 12345678
//!
//! # Browse the catalog
//! hl-cli products
//! hl-cli products --featured
//!
//! # Work with a customer's cart
//! hl-cli cart -e ana@duoc.cl -p secreto show
//! hl-cli cart -e ana@duoc.cl -p secreto add 12 -q 2
//! ```
//!
//! The backend address comes from `HAZEL_API_URL` (default
//! `http://localhost:8080/api`).
//!
//! # Exit codes
//!
//! - `0` - success
//! - `1` - rejected input (invalid RUT, failed form validation)
//! - `2` - any other failure

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hazel_lab_storefront::config::StorefrontConfig;

mod commands;

use commands::CliError;
use commands::cart::CartOp;

#[derive(Parser)]
#[command(name = "hl-cli")]
#[command(author, version, about = "Hazel Lab CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and format Chilean RUTs
    Rut {
        #[command(subcommand)]
        action: RutAction,
    },
    /// List catalog products
    Products {
        /// Only featured products
        #[arg(short, long)]
        featured: bool,
    },
    /// Log in and operate on the user's cart
    Cart {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum RutAction {
    /// Check a RUT and print its canonical form
    Check { rut: String },
    /// Format a RUT as `12.345.678-5`
    Format { rut: String },
    /// Compute the check character for a RUT body
    CheckDigit { body: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product: i64,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Add one unit to a cart line
    Increase { item: i64 },
    /// Remove one unit from a cart line
    Decrease { item: i64 },
    /// Set a cart line's quantity
    Set { item: i64, quantity: u32 },
    /// Remove a cart line
    Remove { item: i64 },
}

impl From<CartAction> for CartOp {
    fn from(action: CartAction) -> Self {
        match action {
            CartAction::Show => Self::Show,
            CartAction::Add { product, quantity } => Self::Add { product, quantity },
            CartAction::Increase { item } => Self::Increase { item },
            CartAction::Decrease { item } => Self::Decrease { item },
            CartAction::Set { item, quantity } => Self::Set { item, quantity },
            CartAction::Remove { item } => Self::Remove { item },
        }
    }
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
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A broken config only matters to commands that talk to the backend
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hazel_lab_storefront=warn,hazel_lab_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.report();
        #[allow(clippy::print_stderr)]
        {
            eprintln!("error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(
    cli: Cli,
    config: Result<StorefrontConfig, hazel_lab_storefront::config::ConfigError>,
) -> Result<(), CliError> {
    match cli.command {
        Commands::Rut { action } => match action {
            RutAction::Check { rut } => commands::rut::check(&rut)?,
            RutAction::Format { rut } => commands::rut::format(&rut),
            RutAction::CheckDigit { body } => commands::rut::check_digit(&body)?,
        },
        Commands::Products { featured } => commands::products::list(config?, featured).await?,
        Commands::Cart {
            email,
            password,
            action,
        } => {
            let password = SecretString::from(password);
            commands::cart::run(config?, &email, password, action.into()).await?;
        }
    }
    Ok(())
}
