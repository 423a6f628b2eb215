// ============================================================================
// cryb-access — CLI evaluation tool for the CRYB access engine
// ============================================================================
// Usage:
//   cryb-access level --facts facts.json --user ADDR
//   cryb-access check --facts facts.json --communities comms.json \
//                     --user ADDR --community ID
//   cryb-access explain --communities comms.json [--community ID]
// ============================================================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use access_core::{
    level_icon, AccessEngine, CommunityAccessConfig, FactSnapshot, StaticFactProvider,
};

/// CRYB token-gated access evaluation tool
#[derive(Parser)]
#[command(name = "cryb-access", version, about = "Evaluate token-gated access offline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a user's global access level
    Level {
        /// JSON file mapping user addresses to fact snapshots
        #[arg(long)]
        facts: PathBuf,

        /// User address to evaluate
        #[arg(long)]
        user: String,
    },

    /// Check a user's access to a community
    Check {
        /// JSON file mapping user addresses to fact snapshots
        #[arg(long)]
        facts: PathBuf,

        /// JSON file with an array of community access configs
        #[arg(long)]
        communities: PathBuf,

        /// User address to evaluate
        #[arg(long)]
        user: String,

        /// Community id to check against
        #[arg(long)]
        community: String,
    },

    /// Print the requirements a community's gate demands
    Explain {
        /// JSON file with an array of community access configs
        #[arg(long)]
        communities: PathBuf,

        /// Restrict output to one community id
        #[arg(long)]
        community: Option<String>,
    },
}

fn load_facts(path: &PathBuf) -> Result<HashMap<String, FactSnapshot>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading facts file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing facts file {}", path.display()))
}

fn load_communities(path: &PathBuf) -> Result<Vec<CommunityAccessConfig>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading communities file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing communities file {}", path.display()))
}

fn provider_from_facts(facts: HashMap<String, FactSnapshot>) -> StaticFactProvider {
    facts
        .into_iter()
        .fold(StaticFactProvider::new(), |provider, (user, snapshot)| {
            provider.with_snapshot(&user, snapshot)
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Level { facts, user } => cmd_level(&facts, &user).await,
        Commands::Check {
            facts,
            communities,
            user,
            community,
        } => cmd_check(&facts, &communities, &user, &community).await,
        Commands::Explain { communities, community } => cmd_explain(&communities, community.as_deref()),
    }
}

async fn cmd_level(facts_path: &PathBuf, user: &str) -> Result<()> {
    let provider = provider_from_facts(load_facts(facts_path)?);
    let engine = AccessEngine::new(provider, vec![]);

    let level = engine.get_user_global_access_level(user).await?;

    println!("=== Global Access Level ===");
    println!("User:     {}", user);
    println!("Level:    {} ({})", level.level, level.name);
    println!("Icon:     {}", level_icon(level.level));
    println!("Color:    {}", level.color);
    if !level.benefits.is_empty() {
        println!("Benefits:");
        for benefit in &level.benefits {
            println!("  - {}", benefit);
        }
    }

    Ok(())
}

async fn cmd_check(
    facts_path: &PathBuf,
    communities_path: &PathBuf,
    user: &str,
    community: &str,
) -> Result<()> {
    let provider = provider_from_facts(load_facts(facts_path)?);
    let communities = load_communities(communities_path)?;
    let engine = AccessEngine::new(provider, communities);

    let decision = engine.get_user_community_access(user, community).await?;

    println!("=== Community Access ===");
    println!("User:      {}", user);
    println!("Community: {}", community);
    println!("Granted:   {}", if decision.granted { "yes" } else { "no" });

    if let Some(level) = &decision.access_level {
        println!("Tier:      {} — {}", level.name, level.description);
    }
    if !decision.permissions.is_empty() {
        let names: Vec<_> = decision
            .permissions
            .iter()
            .map(|p| p.display_name())
            .collect();
        println!("Permissions: {}", names.join(", "));
    }
    if !decision.failed_requirements.is_empty() {
        println!("Unmet requirements:");
        for reason in &decision.failed_requirements {
            println!("  - {}", reason);
        }
    }

    Ok(())
}

fn cmd_explain(communities_path: &PathBuf, only: Option<&str>) -> Result<()> {
    let communities = load_communities(communities_path)?;

    for config in communities
        .iter()
        .filter(|c| only.map_or(true, |id| id == c.community_id))
    {
        println!("{} ({})", config.name, config.community_id);
        if config.requirements.is_empty() {
            println!("  Open to everyone");
        } else {
            for requirement in &config.requirements {
                println!("  - {}", requirement.describe());
            }
        }
        println!();
    }

    Ok(())
}
