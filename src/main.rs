//! trendscope CLI - diagnostic harness for the proxy-aware social client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use trendscope::{
    ClientConfig, ConnectivityProbe, ConnectivityResult, ProxyConfig, ProxyResolver, SearchClient,
    TrendAggregator,
};

/// trendscope - proxy-aware social data client
#[derive(Parser)]
#[command(name = "trendscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Proxy URL override (e.g. http://127.0.0.1:7890 or socks5://127.0.0.1:1080)
    #[arg(short, long, global = true)]
    proxy: Option<String>,

    /// API base URL override
    #[arg(long, global = true)]
    api_base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full diagnostic sequence: proxy detection, connectivity,
    /// user search, trend aggregation
    Diag(DiagArgs),

    /// List detected proxy candidates
    Proxies,

    /// Search users matching a query
    Search(SearchArgs),

    /// Build a trending feed for a seed query
    Trending(TrendingArgs),
}

#[derive(Parser)]
struct DiagArgs {
    /// Seed query used for the search and trending steps
    #[arg(default_value = "tesla")]
    query: String,

    /// Trending items to request
    #[arg(short, long, default_value = "10")]
    limit: usize,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of users to return
    #[arg(short, long, default_value = "5")]
    count: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Parser)]
struct TrendingArgs {
    /// Seed query
    query: String,

    /// Maximum number of content items
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let config = build_config(&cli);

    match &cli.command {
        Commands::Diag(args) => run_diag(&cli, &config, args).await,
        Commands::Proxies => list_proxies(&cli),
        Commands::Search(args) => run_search(&cli, &config, args).await,
        Commands::Trending(args) => run_trending(&cli, &config, args).await,
    }
}

fn build_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(base) = &cli.api_base {
        config.api_base = base.clone();
    }
    if let Ok(token) = std::env::var("TWITTER_BEARER_TOKEN") {
        if !token.trim().is_empty() {
            config.bearer_token = Some(token);
        }
    }
    config
}

fn proxy_candidates(cli: &Cli) -> Result<Vec<ProxyConfig>> {
    match &cli.proxy {
        Some(url) => Ok(vec![ProxyConfig::from_url(url)?]),
        None => Ok(ProxyResolver::new().detect_proxy_settings()),
    }
}

async fn probe_connectivity(
    config: &ClientConfig,
    candidates: &[ProxyConfig],
) -> ConnectivityResult {
    let probe = ConnectivityProbe::new(format!("{}/help/configuration.json", config.api_base))
        .with_user_agent(config.user_agent.as_str())
        .with_timeout(Duration::from_secs(config.timeout));
    probe.test_connection(candidates).await
}

/// Picks a working configuration and builds the search client with it.
async fn connect(cli: &Cli, config: &ClientConfig) -> Result<SearchClient> {
    let candidates = proxy_candidates(cli)?;
    let connectivity = probe_connectivity(config, &candidates).await;

    if !connectivity.reachable {
        anyhow::bail!(
            "API host is unreachable: {}",
            connectivity.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    match &connectivity.proxy_used {
        Some(p) => eprintln!("Using proxy: {}", p.sanitized_url()),
        None => eprintln!("Using direct connection"),
    }

    Ok(SearchClient::new(config.clone(), connectivity.proxy_used)?)
}

fn list_proxies(cli: &Cli) -> Result<()> {
    let candidates = proxy_candidates(cli)?;
    if candidates.is_empty() {
        println!("No proxy candidates found; a direct connection will be used.");
        return Ok(());
    }
    println!("Proxy candidates in preference order:\n");
    for (i, candidate) in candidates.iter().enumerate() {
        println!("  {}. {}", i + 1, candidate.sanitized_url());
    }
    Ok(())
}

async fn run_diag(cli: &Cli, config: &ClientConfig, args: &DiagArgs) -> Result<()> {
    println!("1. Detecting proxy settings...");
    let candidates = proxy_candidates(cli)?;
    if candidates.is_empty() {
        println!("   No proxy configured; will try a direct connection");
    }
    for candidate in &candidates {
        println!("   Candidate: {}", candidate.sanitized_url());
    }

    println!("2. Testing connectivity...");
    let connectivity = probe_connectivity(config, &candidates).await;
    if !connectivity.reachable {
        eprintln!(
            "   Connection test failed: {}",
            connectivity.error.unwrap_or_else(|| "unknown error".to_string())
        );
        eprintln!("   Suggestions:");
        eprintln!("     - make sure your VPN or proxy is running");
        eprintln!("     - export HTTP_PROXY/HTTPS_PROXY (e.g. http://127.0.0.1:7890)");
        eprintln!("     - or configure a proxy in .env.proxy");
        anyhow::bail!("connectivity check failed");
    }
    match &connectivity.proxy_used {
        Some(p) => println!(
            "   Connected via {} in {}ms",
            p.sanitized_url(),
            connectivity.latency_ms.unwrap_or(0)
        ),
        None => println!(
            "   Connected directly in {}ms",
            connectivity.latency_ms.unwrap_or(0)
        ),
    }

    println!("3. Searching users for \"{}\"...", args.query);
    let client = SearchClient::new(config.clone(), connectivity.proxy_used)?;
    let users = client.search_users(&args.query, 5).await?;
    if users.is_empty() {
        anyhow::bail!("user search returned no results");
    }
    println!("   Found {} users", users.len());
    for (i, user) in users.iter().take(3).enumerate() {
        println!(
            "   {}. @{} - {} followers",
            i + 1,
            user.handle,
            user.follower_count
        );
    }

    println!("4. Building trending content...");
    let aggregator = TrendAggregator::new(Arc::new(client));
    let items = aggregator
        .get_trending_content_via_users(&args.query, args.limit)
        .await?;
    if items.is_empty() {
        anyhow::bail!("trend aggregation returned no content");
    }
    println!("   Generated {} trending items", items.len());
    for (i, item) in items.iter().take(3).enumerate() {
        println!(
            "   {}. @{}: {}",
            i + 1,
            item.author_handle,
            preview(&item.text, 100)
        );
    }

    println!("\nAll checks passed");
    Ok(())
}

async fn run_search(cli: &Cli, config: &ClientConfig, args: &SearchArgs) -> Result<()> {
    let client = connect(cli, config).await?;
    let users = client.search_users(&args.query, args.count).await?;

    match args.format {
        OutputFormat::Text => {
            println!("{} users for \"{}\":\n", users.len(), args.query);
            for (i, user) in users.iter().enumerate() {
                println!(
                    "{}. @{} ({}) - {} followers",
                    i + 1,
                    user.handle,
                    user.display_name,
                    user.follower_count
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
    }
    Ok(())
}

async fn run_trending(cli: &Cli, config: &ClientConfig, args: &TrendingArgs) -> Result<()> {
    let client = connect(cli, config).await?;
    let aggregator = TrendAggregator::new(Arc::new(client));
    let items = aggregator
        .get_trending_content_via_users(&args.query, args.limit)
        .await?;

    match args.format {
        OutputFormat::Text => {
            println!("{} trending items for \"{}\":\n", items.len(), args.query);
            for (i, item) in items.iter().enumerate() {
                println!(
                    "{}. @{} at {}\n   {}",
                    i + 1,
                    item.author_handle,
                    item.posted_at.format("%Y-%m-%d %H:%M:%S"),
                    preview(&item.text, 100)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }
    Ok(())
}

/// Display-side truncation; the core never shortens post text.
fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
