//! Operator CLI for the Amazon Ads bid manager.
//!
//! Every subcommand reads credentials from `BIDPILOT__*` environment
//! variables (see `AppConfig`) and talks to the Ads API synchronously.

use bidpilot_ads::{AdsClient, DEFAULT_CAMPAIGN_STATES};
use bidpilot_core::config::AppConfig;
use bidpilot_core::region::{infer_region, Region};
use bidpilot_core::types::BidChange;
use bidpilot_engine::adjust::{compute_updates, AdjustmentParams};
use bidpilot_engine::links::review_link_url;
use clap::{Parser, Subcommand};

const PREVIEW_ROWS: usize = 20;

#[derive(Parser)]
#[command(name = "bidpilot")]
#[command(about = "Amazon Ads bid manager", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which credentials are configured and check API reachability
    Status,

    /// List advertiser profiles visible to the manager account
    Profiles,

    /// List Sponsored Products campaigns for a profile
    Campaigns {
        /// Profile id that scopes the request
        #[arg(long)]
        profile: u64,

        /// Comma-separated state filter; defaults to enabled,paused, and an
        /// empty string disables filtering
        #[arg(long)]
        state: Option<String>,
    },

    /// Count the targets in a campaign and preview the first rows
    Targets {
        /// Profile id that scopes the request
        #[arg(long)]
        profile: u64,

        /// Campaign id to inspect
        #[arg(long)]
        campaign: u64,

        /// Maximum preview rows to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Raise or lower every target bid in a campaign by a fixed amount
    AdjustBids {
        /// Profile id that scopes the request
        #[arg(long)]
        profile: u64,

        /// Campaign id whose targets get adjusted
        #[arg(long)]
        campaign: u64,

        /// Bid change amount in the account currency, must be positive
        #[arg(long)]
        delta: f64,

        /// Either "up" or "down"
        #[arg(long)]
        direction: String,

        /// Clamp every new bid to at least this value
        #[arg(long)]
        min_bid: Option<f64>,

        /// Clamp every new bid to at most this value
        #[arg(long)]
        max_bid: Option<f64>,

        /// Compute and print the changes without submitting them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Ask the platform for a manager-access approval link to a client profile
    LinkRequest {
        /// Client profile id to request access to
        #[arg(long)]
        profile: u64,

        /// Manager account entity id; defaults to the configured one
        #[arg(long, env = "BIDPILOT__MANAGER_ENTITY_ID")]
        manager_entity: Option<String>,

        /// Marketplace country code used to infer the regional endpoint
        #[arg(long)]
        country: Option<String>,

        /// Regional endpoint override: NA, EU or FE
        #[arg(long)]
        region: Option<String>,
    },

    /// Print the console review link a client can open to grant access
    ReviewLink {
        /// Client account entity id
        #[arg(long)]
        client_entity: String,

        /// Manager account entity id; defaults to the configured one
        #[arg(long, env = "BIDPILOT__MANAGER_ENTITY_ID")]
        manager_entity: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bidpilot=warn,bidpilot_ads=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let result = match cli.command {
        Commands::Status => cmd_status(&config),
        Commands::Profiles => cmd_profiles(&config),
        Commands::Campaigns { profile, state } => cmd_campaigns(&config, profile, state.as_deref()),
        Commands::Targets {
            profile,
            campaign,
            limit,
        } => cmd_targets(&config, profile, campaign, limit),
        Commands::AdjustBids {
            profile,
            campaign,
            delta,
            direction,
            min_bid,
            max_bid,
            dry_run,
        } => cmd_adjust_bids(
            &config, profile, campaign, delta, &direction, min_bid, max_bid, dry_run,
        ),
        Commands::LinkRequest {
            profile,
            manager_entity,
            country,
            region,
        } => cmd_link_request(&config, profile, manager_entity, country, region),
        Commands::ReviewLink {
            client_entity,
            manager_entity,
        } => cmd_review_link(&config, &client_entity, manager_entity),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

// ----------------------------------------------------------------------------
// Commands
// ----------------------------------------------------------------------------

fn cmd_status(config: &AppConfig) -> anyhow::Result<()> {
    println!("=== BidPilot Status ===");
    println!();
    println!("  Client id:       {}", presence(&config.auth.client_id));
    println!("  Client secret:   {}", presence(&config.auth.client_secret));
    println!("  Refresh token:   {}", presence(&config.auth.refresh_token));
    println!("  Manager entity:  {}", presence(&config.manager_entity_id));
    println!("  API base:        {}", config.api.base_url);
    println!();

    let client = AdsClient::from_config(config)?;
    match client.list_profiles() {
        Ok(profiles) => println!("  API check: OK ({} profiles visible)", profiles.len()),
        Err(e) => println!("  API check: FAILED ({e})"),
    }
    Ok(())
}

fn cmd_profiles(config: &AppConfig) -> anyhow::Result<()> {
    let client = AdsClient::from_config(config)?;
    let profiles = client.list_profiles()?;

    if profiles.is_empty() {
        println!("No profiles visible to these credentials.");
        return Ok(());
    }

    println!(
        "  {:<12} {:<24} {:<16} {:<8} Region",
        "Profile", "Account", "Entity", "Country"
    );
    println!("  {}", "-".repeat(72));
    for profile in &profiles {
        let region = infer_region(&profile.country_code)
            .map(|r| r.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {:<12} {:<24} {:<16} {:<8} {}",
            profile.profile_id,
            truncate(profile.account_name(), 22),
            truncate(profile.entity_id(), 14),
            profile.country_code,
            region,
        );
    }
    println!();
    println!("  Total: {} profiles", profiles.len());
    Ok(())
}

fn cmd_campaigns(config: &AppConfig, profile: u64, state: Option<&str>) -> anyhow::Result<()> {
    let states = match state {
        Some(csv) => parse_states(csv)?,
        None => DEFAULT_CAMPAIGN_STATES.to_vec(),
    };
    let client = AdsClient::from_config(config)?;
    let campaigns = client.list_campaigns(profile, &states)?;

    if campaigns.is_empty() {
        println!("No Sponsored Products campaigns matched.");
        return Ok(());
    }

    println!(
        "  {:<14} {:<32} {:<10} {:>10}  Type",
        "Campaign", "Name", "State", "Budget"
    );
    println!("  {}", "-".repeat(80));
    for campaign in &campaigns {
        let budget = campaign
            .daily_budget
            .map(|b| format!("{b:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<14} {:<32} {:<10} {:>10}  {}",
            campaign.campaign_id,
            truncate(&campaign.name, 30),
            campaign.state,
            budget,
            campaign.campaign_type.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("  Total: {} campaigns", campaigns.len());
    Ok(())
}

fn cmd_targets(config: &AppConfig, profile: u64, campaign: u64, limit: usize) -> anyhow::Result<()> {
    let client = AdsClient::from_config(config)?;
    let targets = client.list_targets(profile, campaign)?;

    println!("Targets in campaign {campaign}: {}", targets.len());
    if targets.is_empty() {
        return Ok(());
    }

    println!();
    println!("  {:<14} {:<10} Bid", "Target", "State");
    println!("  {}", "-".repeat(36));
    for target in targets.iter().take(limit) {
        let id = target
            .id()
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        let state = target
            .state
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let bid = target
            .bid
            .map(|b| format!("{b:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<14} {:<10} {}", id, state, bid);
    }
    if targets.len() > limit {
        println!("  ... and {} more", targets.len() - limit);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_adjust_bids(
    config: &AppConfig,
    profile: u64,
    campaign: u64,
    delta: f64,
    direction: &str,
    min_bid: Option<f64>,
    max_bid: Option<f64>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let params = AdjustmentParams {
        delta,
        direction: direction.parse()?,
        min_bid,
        max_bid,
    };
    params.validate()?;

    let client = AdsClient::from_config(config)?;

    if dry_run {
        let targets = client.list_targets(profile, campaign)?;
        let computation = compute_updates(&targets, &params)?;
        println!(
            "Dry run: {} of {} targets would change.",
            computation.updates.len(),
            targets.len()
        );
        print_preview(&computation.preview);
        return Ok(());
    }

    let adjustment = client.adjust_campaign_bids(profile, campaign, &params)?;
    println!("Updated {} targets in campaign {campaign}.", adjustment.updated);
    print_preview(&adjustment.preview);
    Ok(())
}

fn cmd_link_request(
    config: &AppConfig,
    profile: u64,
    manager_entity: Option<String>,
    country: Option<String>,
    region: Option<String>,
) -> anyhow::Result<()> {
    let manager_entity = resolve_manager_entity(config, manager_entity)?;

    let region = match (region, country) {
        (Some(r), _) => r.parse::<Region>()?,
        (None, Some(cc)) => infer_region(&cc).ok_or_else(|| {
            anyhow::anyhow!(
                "cannot infer a region for country '{cc}'; pass --region NA|EU|FE explicitly"
            )
        })?,
        (None, None) => {
            anyhow::bail!("pass either --country or --region to pick the API endpoint")
        }
    };

    let client = AdsClient::from_config(config)?;
    let link = client.create_account_link(profile, &manager_entity, region)?;

    if link.is_empty() {
        println!("Link request accepted, but the platform returned no approval link.");
        println!("Ask the client to check their Ads console notifications.");
    } else {
        println!("Approval link for the client:");
        println!("{link}");
    }
    Ok(())
}

fn cmd_review_link(
    config: &AppConfig,
    client_entity: &str,
    manager_entity: Option<String>,
) -> anyhow::Result<()> {
    let manager_entity = resolve_manager_entity(config, manager_entity)?;
    let url = review_link_url(client_entity.trim(), &manager_entity);
    println!("Send this link to the client to request editor access:");
    println!("{url}");
    Ok(())
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn presence(value: &str) -> &'static str {
    if value.trim().is_empty() {
        "MISSING"
    } else {
        "configured"
    }
}

fn parse_states(csv: &str) -> anyhow::Result<Vec<bidpilot_core::types::EntityState>> {
    let mut states = Vec::new();
    for part in csv.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        states.push(part.parse()?);
    }
    Ok(states)
}

fn resolve_manager_entity(config: &AppConfig, flag: Option<String>) -> anyhow::Result<String> {
    let value = flag.unwrap_or_else(|| config.manager_entity_id.clone());
    if value.trim().is_empty() {
        anyhow::bail!(
            "no manager entity id; pass --manager-entity or set BIDPILOT__MANAGER_ENTITY_ID"
        );
    }
    Ok(value.trim().to_string())
}

fn print_preview(preview: &[BidChange]) {
    if preview.is_empty() {
        return;
    }
    println!();
    println!("  {:<14} {:>10} {:>10}", "Target", "Old bid", "New bid");
    println!("  {}", "-".repeat(38));
    for change in preview.iter().take(PREVIEW_ROWS) {
        println!(
            "  {:<14} {:>10.2} {:>10.2}",
            change.target_id, change.old_bid, change.new_bid
        );
    }
    if preview.len() > PREVIEW_ROWS {
        println!("  ... and {} more", preview.len() - PREVIEW_ROWS);
    }
}

fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(2)).collect();
    format!("{kept}..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidpilot_core::types::EntityState;

    #[test]
    fn test_presence_classifies_blank_values() {
        assert_eq!(presence(""), "MISSING");
        assert_eq!(presence("   "), "MISSING");
        assert_eq!(presence("amzn1.application-oa2-client.abc"), "configured");
    }

    #[test]
    fn test_parse_states_handles_csv_and_blanks() {
        let states = parse_states("enabled, paused").unwrap();
        assert_eq!(states, vec![EntityState::Enabled, EntityState::Paused]);
        assert!(parse_states("").unwrap().is_empty());
        assert!(parse_states("bogus").is_err());
    }

    #[test]
    fn test_resolve_manager_entity_falls_back_to_config() {
        let config = AppConfig {
            manager_entity_id: "ENTITY_MGR".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(resolve_manager_entity(&config, None).unwrap(), "ENTITY_MGR");
        assert_eq!(
            resolve_manager_entity(&config, Some("ENTITY_OVERRIDE".to_string())).unwrap(),
            "ENTITY_OVERRIDE"
        );
        assert!(resolve_manager_entity(&AppConfig::default(), None).is_err());
    }

    #[test]
    fn test_truncate_cuts_long_names() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-account-name", 10), "a-very-l..");
    }
}
