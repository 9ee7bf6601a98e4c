// relaypost: post articles to relays from the command line
//
// Cross-platform (macOS, Linux, Windows). Settings live in config.json,
// the logged-in key in the local data directory.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use relaypost_core::relay::FanOutPublisher;
use relaypost_core::{post_article, Article, DeliveryReport, IdentityManager, KeyStore};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relaypost")]
#[command(about = "Share articles as signed long-form events on relays", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an nsec or hex secret key
    Login { secret: String },
    /// Forget the stored key
    Logout,
    /// Show the logged-in public key
    Whoami,
    /// Manage relays
    Relay {
        #[command(subcommand)]
        action: RelayAction,
    },
    /// Manage hashtags for the next post
    Topic {
        #[command(subcommand)]
        action: TopicAction,
    },
    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Post a Markdown article to every configured relay
    Post {
        /// Source URL of the article
        #[arg(long)]
        url: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        byline: Option<String>,
        /// Markdown body; read from stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum RelayAction {
    Add { url: String },
    Remove { url: String },
    List,
    Reset,
}

#[derive(Subcommand)]
enum TopicAction {
    Add { topic: String },
    Remove { topic: String },
    List,
    Reset,
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Login { secret } => cmd_login(secret),
        Commands::Logout => cmd_logout(),
        Commands::Whoami => cmd_whoami(),
        Commands::Relay { action } => cmd_relay(action),
        Commands::Topic { action } => cmd_topic(action),
        Commands::Config { action } => cmd_config(action),
        Commands::Post {
            url,
            title,
            byline,
            file,
        } => cmd_post(url, title, byline, file).await,
    }
}

fn identity() -> Result<IdentityManager> {
    let mut identity = IdentityManager::with_store(KeyStore::file(config::Config::key_file()?));
    identity.initialize()?;
    Ok(identity)
}

fn cmd_login(secret: String) -> Result<()> {
    let mut identity = identity()?;
    let keys = identity.login(&secret).context("Invalid secret key")?;

    println!("{} Logged in", "✓".green());
    println!("  {} {}", "npub:".bold(), keys.npub());
    Ok(())
}

fn cmd_logout() -> Result<()> {
    let mut identity = identity()?;
    if !identity.is_logged_in() {
        println!("{}", "Not logged in.".dimmed());
        return Ok(());
    }
    identity.logout()?;
    println!("{} Logged out", "✓".green());
    Ok(())
}

fn cmd_whoami() -> Result<()> {
    let identity = identity()?;
    match identity.keys() {
        Some(keys) => {
            println!("{}", "Identity".bold());
            println!("  {} {}", "npub:".bold(), keys.npub());
            println!("  {} {}", "hex: ".bold(), keys.public_key_hex());
        }
        None => {
            println!("{}", "Not logged in.".dimmed());
            println!("Run {} first.", "relaypost login <nsec>".bright_cyan());
        }
    }
    Ok(())
}

fn cmd_relay(action: RelayAction) -> Result<()> {
    let mut config = config::Config::load()?;

    match action {
        RelayAction::Add { url } => {
            if config.add_relay(&url)? {
                println!("{} Added relay: {}", "✓".green(), url);
            } else {
                println!("{} Already configured: {}", "•".yellow(), url);
            }
        }
        RelayAction::Remove { url } => {
            if config.remove_relay(&url)? {
                println!("{} Removed relay: {}", "✓".green(), url);
            } else {
                println!("{} Not configured: {}", "✗".red(), url);
            }
        }
        RelayAction::List => {
            if config.relays.is_empty() {
                println!("{}", "No relays configured.".dimmed());
            } else {
                println!("{} ({})", "Relays".bold(), config.relays.len());
                for relay in config.relays.iter() {
                    println!("  {}", relay);
                }
            }
        }
        RelayAction::Reset => {
            config.reset_relays()?;
            println!("{} Restored {} default relays", "✓".green(), config.relays.len());
        }
    }

    Ok(())
}

fn cmd_topic(action: TopicAction) -> Result<()> {
    let mut config = config::Config::load()?;

    match action {
        TopicAction::Add { topic } => {
            if config.add_topic(&topic)? {
                println!("{} Added topic: #{}", "✓".green(), topic.trim());
            } else {
                println!("{} Skipped: {:?}", "•".yellow(), topic);
            }
        }
        TopicAction::Remove { topic } => {
            if config.remove_topic(&topic)? {
                println!("{} Removed topic: #{}", "✓".green(), topic);
            } else {
                println!("{} Not configured: #{}", "✗".red(), topic);
            }
        }
        TopicAction::List => {
            if config.topics.is_empty() {
                println!("{}", "No topics.".dimmed());
            } else {
                let tags: Vec<String> = config.topics.iter().map(|t| format!("#{}", t)).collect();
                println!("{}", tags.join(" "));
            }
        }
        TopicAction::Reset => {
            config.reset_topics()?;
            println!("{} Restored default topics", "✓".green());
        }
    }

    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut config = config::Config::load()?;

    match action {
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("{} Set {} = {}", "✓".green(), key.bright_cyan(), value);
        }
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("Unknown config key: {}", key),
        },
        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            for (key, value) in config.list() {
                println!("  {} = {}", key.bright_cyan(), value);
            }
        }
    }

    Ok(())
}

async fn cmd_post(
    url: String,
    title: String,
    byline: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let mut config = config::Config::load()?;
    let identity = identity()?;
    let keys = identity
        .keys()
        .context("Not logged in. Run `relaypost login <nsec>` first.")?;

    if config.relays.is_empty() {
        anyhow::bail!("No relays configured. Add one with `relaypost relay add <url>`.");
    }

    let body = read_body(file.as_ref())?;
    tracing::debug!(bytes = body.len(), relays = config.relays.len(), "Read article body");
    let mut article = Article::new(&url, &title, body)?;
    if let Some(byline) = byline {
        article = article.with_byline(&byline);
    }

    println!(
        "Posting {} to {} relays...",
        article.title().bold(),
        config.relays.len()
    );

    let publisher = FanOutPublisher::websocket();
    let report = post_article(
        &article,
        &config.topics,
        keys,
        &publisher,
        config.relays.as_slice(),
        config.publish.timing_policy(),
    )
    .await?;

    print_report(&report);

    // Topics apply to one post only
    config.reset_topics()?;
    Ok(())
}

fn read_body(file: Option<&PathBuf>) -> Result<String> {
    let body = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read article from stdin")?;
            body
        }
    };

    if body.trim().is_empty() {
        anyhow::bail!("Article body is empty");
    }
    Ok(body)
}

fn print_report(report: &DeliveryReport) {
    let summary = report.summary();
    if report.all_succeeded() {
        println!("{} {}", "✓".green(), summary.bold());
    } else if report.success_count() > 0 {
        println!("{} {}", "•".yellow(), summary.bold());
    } else {
        println!("{} {}", "✗".red(), summary.bold());
    }

    println!("  {} {}", "Event:".bold(), report.event_id());
    println!("  {} {}", "View: ".bold(), njump_link(report.event_id()).bright_cyan());
    println!(
        "  {} {}",
        "At:   ".bold(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    if !report.failures().is_empty() {
        println!();
        println!("{}", "Failed relays".bold());
        for failure in report.failures() {
            println!("  {} {}: {}", "✗".red(), failure.endpoint, failure.reason);
        }
    }
}

fn njump_link(event_id: &str) -> String {
    format!("https://njump.me/{}", event_id)
}
