//! Command surface: argument definitions and one handler per subcommand.
//!
//! Everything here is thin plumbing over the storage layer; the only command
//! with real machinery behind it is `agg`, which hands off to the scrape
//! scheduler.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use url::Url;

use crate::config::Config;
use crate::feed::FeedFetcher;
use crate::scrape::{Scheduler, Scraper};
use crate::storage::{Database, User};

#[derive(Parser, Debug)]
#[command(name = "gator", about = "CLI RSS aggregator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a user and log in as them
    Register { name: String },
    /// Switch to an existing user
    Login { name: String },
    /// List all registered users
    Users,
    /// Add a feed (and follow it)
    Addfeed { name: String, url: String },
    /// List all feeds
    Feeds,
    /// Follow an existing feed by URL
    Follow { url: String },
    /// List the feeds you follow
    Following,
    /// Unfollow a feed by URL
    Unfollow { url: String },
    /// Start the aggregation loop (e.g. `gator agg 1m`); Ctrl+C stops it
    Agg { interval: String },
    /// Show the latest posts from your followed feeds
    Browse {
        #[arg(default_value_t = 2)]
        limit: i64,
    },
    /// Delete all users (and with them every feed, follow, and post)
    Reset,
}

/// Dispatches one parsed command.
pub async fn dispatch(
    command: Command,
    db: &Database,
    config: &mut Config,
    config_path: &Path,
) -> Result<()> {
    match command {
        Command::Register { name } => register(db, config, config_path, &name).await,
        Command::Login { name } => login(db, config, config_path, &name).await,
        Command::Users => users(db, config).await,
        Command::Addfeed { name, url } => addfeed(db, config, &name, &url).await,
        Command::Feeds => feeds(db).await,
        Command::Follow { url } => follow(db, config, &url).await,
        Command::Following => following(db, config).await,
        Command::Unfollow { url } => unfollow(db, config, &url).await,
        Command::Agg { interval } => agg(db, &interval).await,
        Command::Browse { limit } => browse(db, config, limit).await,
        Command::Reset => reset(db, config, config_path).await,
    }
}

/// Resolves the logged-in user or fails with a hint.
async fn current_user(db: &Database, config: &Config) -> Result<User> {
    let Some(name) = &config.current_user_name else {
        bail!("no user logged in; run `gator register <name>` or `gator login <name>` first");
    };
    db.user_by_name(name)
        .await?
        .with_context(|| format!("user {name:?} does not exist"))
}

async fn register(db: &Database, config: &mut Config, config_path: &Path, name: &str) -> Result<()> {
    if db.user_by_name(name).await?.is_some() {
        bail!("user {name:?} already exists");
    }
    let user = db.insert_user(name).await?;

    config.current_user_name = Some(user.name.clone());
    config.store(config_path)?;

    println!("User {:?} created and logged in.", user.name);
    Ok(())
}

async fn login(db: &Database, config: &mut Config, config_path: &Path, name: &str) -> Result<()> {
    let user = db
        .user_by_name(name)
        .await?
        .with_context(|| format!("user {name:?} does not exist"))?;

    config.current_user_name = Some(user.name.clone());
    config.store(config_path)?;

    println!("Logged in as {:?}.", user.name);
    Ok(())
}

async fn users(db: &Database, config: &Config) -> Result<()> {
    let all = db.all_users().await?;
    if all.is_empty() {
        println!("No users registered.");
        return Ok(());
    }
    for user in all {
        if config.current_user_name.as_deref() == Some(user.name.as_str()) {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}

async fn addfeed(db: &Database, config: &Config, name: &str, url: &str) -> Result<()> {
    let user = current_user(db, config).await?;
    Url::parse(url).with_context(|| format!("invalid feed URL: {url}"))?;

    let feed = db
        .insert_feed(name, url, user.id)
        .await
        .context("failed to add feed (the URL may already be registered)")?;
    // Adding a feed implies following it
    db.insert_follow(user.id, feed.id).await?;

    println!("Feed {:?} added and followed.", feed.name);
    Ok(())
}

async fn feeds(db: &Database) -> Result<()> {
    let all = db.all_feeds().await?;
    if all.is_empty() {
        println!("No feeds added yet.");
        return Ok(());
    }
    for feed in all {
        println!("* {} ({}) added by {}", feed.name, feed.url, feed.user_name);
    }
    Ok(())
}

async fn follow(db: &Database, config: &Config, url: &str) -> Result<()> {
    let user = current_user(db, config).await?;
    let feed = db
        .feed_by_url(url)
        .await?
        .with_context(|| format!("no feed registered with URL {url}"))?;

    db.insert_follow(user.id, feed.id).await?;
    println!("{} is now following {:?}.", user.name, feed.name);
    Ok(())
}

async fn following(db: &Database, config: &Config) -> Result<()> {
    let user = current_user(db, config).await?;
    let followed = db.follows_for_user(user.id).await?;
    if followed.is_empty() {
        println!("You are not following any feeds.");
        return Ok(());
    }
    for feed in followed {
        println!("* {} ({})", feed.name, feed.url);
    }
    Ok(())
}

async fn unfollow(db: &Database, config: &Config, url: &str) -> Result<()> {
    let user = current_user(db, config).await?;
    let feed = db
        .feed_by_url(url)
        .await?
        .with_context(|| format!("no feed registered with URL {url}"))?;

    if db.delete_follow(user.id, feed.id).await? {
        println!("Unfollowed {:?}.", feed.name);
    } else {
        println!("You were not following {:?}.", feed.name);
    }
    Ok(())
}

async fn agg(db: &Database, interval: &str) -> Result<()> {
    let fetcher = FeedFetcher::new().context("failed to build HTTP client")?;
    let scraper = Scraper::new(db.clone(), fetcher);
    let scheduler = Scheduler::new(scraper);

    // A malformed interval aborts here; once the loop is running, nothing
    // short of Ctrl+C stops it.
    scheduler.start(interval).await?;
    Ok(())
}

async fn reset(db: &Database, config: &mut Config, config_path: &Path) -> Result<()> {
    db.reset_users().await?;

    // The logged-in user no longer exists; clear it so the next command gets
    // the "no user logged in" hint instead of a lookup failure.
    if config.current_user_name.take().is_some() {
        config.store(config_path)?;
    }

    println!("Database reset: all users, feeds, follows, and posts removed.");
    Ok(())
}

async fn browse(db: &Database, config: &Config, limit: i64) -> Result<()> {
    if limit < 0 {
        bail!("limit must be a non-negative number");
    }
    let user = current_user(db, config).await?;
    let posts = db.posts_for_user(user.id, limit).await?;

    if posts.is_empty() {
        println!("No posts found for your followed feeds.");
        return Ok(());
    }

    println!("Showing the latest {} posts for {}:", posts.len(), user.name);
    for post in posts {
        let published = chrono::DateTime::from_timestamp(post.published_at, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        println!("* [{}] {} ({}) published {}", post.feed_name, post.title, post.url, published);
    }
    Ok(())
}
