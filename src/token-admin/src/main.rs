//! One-time credential bootstrap for the bid manager.
//!
//! Prints the Login with Amazon consent URL, then exchanges the
//! authorization code from the redirect for a refresh token that the
//! other tools can use.

use bidpilot_ads::{exchange_authorization_code, login_url};
use bidpilot_core::config::AppConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "token-admin")]
#[command(about = "BidPilot credential bootstrap", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the consent URL to open in a browser
    LoginUrl {
        /// Redirect URI registered with the LWA application; overrides config
        #[arg(long, env = "BIDPILOT__AUTH__REDIRECT_URI")]
        redirect_uri: Option<String>,
    },

    /// Exchange the ?code=... value from the redirect for tokens
    Exchange {
        /// Authorization code taken from the redirect URL
        #[arg(long)]
        code: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_admin=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let result = match cli.command {
        Commands::LoginUrl { redirect_uri } => cmd_login_url(&config, redirect_uri),
        Commands::Exchange { code } => cmd_exchange(&config, &code),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn cmd_login_url(config: &AppConfig, redirect_uri: Option<String>) -> anyhow::Result<()> {
    let mut auth = config.auth.clone();
    if let Some(uri) = redirect_uri {
        auth.redirect_uri = uri;
    }
    let url = login_url(&auth)?;

    println!("Open this URL, sign in, and approve access:");
    println!();
    println!("{url}");
    println!();
    println!(
        "The browser lands on {} with a ?code=... parameter.",
        auth.redirect_uri
    );
    println!("Run `token-admin exchange --code <value>` with it.");
    Ok(())
}

fn cmd_exchange(config: &AppConfig, code: &str) -> anyhow::Result<()> {
    let grant = exchange_authorization_code(&config.auth, code.trim())?;

    println!("Token exchange succeeded.");
    println!("  access_token: {}", grant.access_token);
    println!("  expires_in:   {}s", grant.expires_in);
    println!();

    match grant.refresh_token {
        Some(refresh_token) => {
            println!("Add this line to the environment:");
            println!("BIDPILOT__AUTH__REFRESH_TOKEN={refresh_token}");
        }
        None => {
            println!("No refresh token returned. The code may be expired or already used.");
        }
    }
    Ok(())
}
