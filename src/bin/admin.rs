//! CLI administration tool for slinky.
//!
//! Provides commands for inspecting and seeding links, viewing statistics,
//! and performing database checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List every link, or one owner's links
//! cargo run --bin admin -- links list
//! cargo run --bin admin -- links list --owner user_2abc
//!
//! # Insert the sample links for an owner
//! cargo run --bin admin -- links seed --owner user_2abc
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use slinky::application::services::{CreateLink, LinkService};
use slinky::domain::entities::Link;
use slinky::error::AppError;
use slinky::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// Sample links inserted by `links seed`.
const SAMPLE_LINKS: &[(&str, &str)] = &[
    ("github-prof", "https://github.com/johndoe"),
    ("portfolio", "https://johndoe.dev"),
    ("linkedin", "https://www.linkedin.com/in/johndoe"),
    ("blog-post", "https://medium.com/@johndoe/my-first-article"),
    ("youtube", "https://www.youtube.com/@johndoecodes"),
    ("twitter", "https://twitter.com/johndoe"),
    ("docs-page", "https://docs.myproject.com/getting-started"),
    ("demo-app", "https://demo.myapp.com"),
    ("meeting", "https://meet.google.com/abc-defg-hij"),
    ("calendar", "https://calendly.com/johndoe/30min"),
];

/// CLI tool for managing slinky.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect and seed links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinksAction {
    /// List links, newest first
    List {
        /// Only show links created by this owner
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Insert sample links for an owner, skipping slugs that are taken
    Seed {
        /// Owner id the sample links are created for
        #[arg(short, long)]
        owner: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Links { action } => handle_links_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_links_action(action: LinksAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let service = LinkService::new(repo);

    match action {
        LinksAction::List { owner: Some(owner) } => {
            let links = service
                .list_links(&owner)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;
            print_links(&links);
        }
        LinksAction::List { owner: None } => list_all_links(pool).await?,
        LinksAction::Seed { owner, yes } => seed_links(&service, &owner, yes).await?,
    }

    Ok(())
}

/// Prints a table of links.
///
/// ```text
/// 🔗 Links
///
///   ID    Slug         Clicks      Expires            URL
///   ────────────────────────────────────────────────────────────────────
///   1     portfolio    3/10        -                  https://johndoe.dev/
/// ```
fn print_links(links: &[Link]) {
    println!("{}", "🔗 Links".bright_blue().bold());
    println!();

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return;
    }

    print_header();

    let now = Utc::now();
    for link in links {
        print_row(
            link.id,
            &link.slug,
            &link.url,
            link.click_count,
            link.max_clicks,
            link.expires_at,
            link.is_exhausted_at(now),
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();
}

fn print_header() {
    println!(
        "  {:<5} {:<12} {:<11} {:<18} {}",
        "ID".bright_white().bold(),
        "Slug".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Expires".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());
}

fn print_row(
    id: i64,
    slug: &str,
    url: &str,
    click_count: i64,
    max_clicks: Option<i64>,
    expires_at: Option<DateTime<Utc>>,
    exhausted: bool,
) {
    let clicks = match max_clicks {
        Some(max) => format!("{}/{}", click_count, max),
        None => click_count.to_string(),
    };
    let expires = expires_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let slug = if exhausted { slug.red() } else { slug.cyan() };

    println!(
        "  {:<5} {:<12} {:<11} {:<18} {}",
        id.to_string().bright_black(),
        slug,
        clicks,
        expires.bright_black(),
        url
    );
}

type LinkSummaryRow = (i64, String, String, i64, Option<i64>, Option<DateTime<Utc>>, bool);

async fn list_all_links(pool: &PgPool) -> Result<()> {
    let rows: Vec<LinkSummaryRow> = sqlx::query_as(
        r#"
        SELECT id, slug, url, click_count, max_clicks, expires_at,
               (expires_at IS NOT NULL AND expires_at < NOW())
                 OR (max_clicks IS NOT NULL AND click_count >= max_clicks) AS exhausted
        FROM links
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    println!("{}", "🔗 Links".bright_blue().bold());
    println!();

    if rows.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    print_header();

    for (id, slug, url, click_count, max_clicks, expires_at, exhausted) in &rows {
        print_row(
            *id,
            slug,
            url,
            *click_count,
            *max_clicks,
            *expires_at,
            *exhausted,
        );
    }

    println!();
    println!("  Total: {}", rows.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Creates the sample links through [`LinkService`], so they pass the same
/// validation as API-created links.
async fn seed_links(service: &LinkService, owner: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🌱 Seed Links".bright_blue().bold());
    println!();
    println!(
        "  {} sample links for owner {}",
        SAMPLE_LINKS.len().to_string().bright_white().bold(),
        owner.cyan()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Insert sample links?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let mut created = 0;
    for (slug, url) in SAMPLE_LINKS {
        let input = CreateLink {
            url: (*url).to_string(),
            custom_slug: Some((*slug).to_string()),
            ..Default::default()
        };

        match service.create_link(owner, input).await {
            Ok(link) => {
                created += 1;
                println!("  {} /{} → {}", "✅".green(), link.slug.cyan(), link.url);
            }
            Err(AppError::Conflict { .. }) => {
                println!("  {} /{} already taken", "⚠️ ".yellow(), slug);
            }
            Err(e) => return Err(anyhow::anyhow!("Failed to seed /{}: {}", slug, e)),
        }
    }

    println!();
    println!(
        "{}",
        format!("✨ Created {} of {} links", created, SAMPLE_LINKS.len())
            .green()
            .bold()
    );
    println!();

    Ok(())
}

/// Displays link counts, total clicks, and links that no longer redirect.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links_count, clicks_count, exhausted_count): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(click_count), 0)::BIGINT,
               COUNT(*) FILTER (
                 WHERE (expires_at IS NOT NULL AND expires_at < NOW())
                    OR (max_clicks IS NOT NULL AND click_count >= max_clicks)
               )
        FROM links
        "#,
    )
    .fetch_one(pool)
    .await?;

    println!(
        "  Links:           {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:          {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!(
        "  Exhausted links: {}",
        exhausted_count.to_string().bright_yellow().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Applied migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
