//! Command-line admin for the cafe website

use anyhow::{Context, Result};
use cafe_client::{
    ApiClient, AuthGate, CafeApi, FileStore, KeyValueStore, NotificationQueue, PublicSite,
    SnapshotCache,
    admin::{CategoryReorder, MenuAdmin, NewsAdmin},
};
use cafe_core::{Config, init_logging};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "cafe-admin", version, about = "Manage the cafe menu and news")]
struct Cli {
    /// API server root, overriding the configuration
    #[arg(long, env = "CAFE_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in with the admin password (read from stdin when omitted)
    Login {
        /// Admin password
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show whether a token is stored
    Status,
    /// Menu items
    #[command(subcommand)]
    Menu(MenuCommand),
    /// News items
    #[command(subcommand)]
    News(NewsCommand),
    /// Menu categories
    #[command(subcommand)]
    Categories(CategoryCommand),
}

#[derive(Debug, Subcommand)]
enum MenuCommand {
    /// List menu items
    List {
        /// Case-insensitive search over title, description and category
        #[arg(long)]
        search: Option<String>,
        /// Only this category key
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete menu items
    Delete {
        /// Item ids
        #[arg(required = true)]
        ids: Vec<i32>,
    },
}

#[derive(Debug, Subcommand)]
enum NewsCommand {
    /// List news
    List {
        /// Include scheduled items (requires login)
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    /// List categories in display order
    List,
    /// Move the category at one position to another (zero-based)
    Move {
        /// Current position
        from: usize,
        /// New position
        to: usize,
    },
    /// Delete a category
    Delete {
        /// Category id
        id: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config ({e}), using defaults");
        Config::default()
    });
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("{e}"))?;

    let base_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.client.api_base_url.clone());
    let api: Arc<dyn CafeApi> =
        Arc::new(ApiClient::new(base_url).context("Failed to build HTTP client")?);
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.client.storage_path));
    let gate = AuthGate::new(Arc::clone(&api), Arc::clone(&store));
    let mut notes = NotificationQueue::new();

    let outcome = run(cli.command, &api, &store, &gate, &mut notes).await;

    notes.expire(
        Utc::now(),
        Duration::seconds(config.client.notification_ttl_secs),
    );
    let now = Utc::now();
    for note in notes.iter() {
        println!("[{}] {} ({})", note.kind, note.message, note.format_elapsed(now));
    }
    outcome
}

async fn run(
    command: Command,
    api: &Arc<dyn CafeApi>,
    store: &Arc<dyn KeyValueStore>,
    gate: &AuthGate,
    notes: &mut NotificationQueue,
) -> Result<()> {
    match command {
        Command::Login { password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            match gate.login(&password).await {
                Ok(()) => {
                    notes.success("Logged in");
                }
                Err(e) => {
                    warn!("Login failed: {}", e);
                    notes.error("Invalid password");
                }
            }
        }
        Command::Logout => {
            gate.logout().await?;
            notes.info("Logged out");
        }
        Command::Status => {
            if gate.is_authenticated() {
                println!("Logged in");
            } else {
                println!("Not logged in");
            }
        }
        Command::Menu(MenuCommand::List { search, category }) => {
            let token = gate.require_admin()?;
            let mut admin = MenuAdmin::new(Arc::clone(api));
            if admin.load(&token, notes).await {
                admin.set_search(search.unwrap_or_default());
                admin.set_category_filter(category);
                for item in admin.filtered() {
                    println!(
                        "{:>4}  {:<30} {:>6} ₽  {}",
                        item.id, item.title, item.price, item.category
                    );
                }
            }
        }
        Command::Menu(MenuCommand::Delete { ids }) => {
            let token = gate.require_admin()?;
            let mut admin = MenuAdmin::new(Arc::clone(api));
            if admin.load(&token, notes).await {
                for id in ids {
                    admin.toggle_selection(id);
                }
                admin.bulk_delete(&token, notes).await;
            }
        }
        Command::News(NewsCommand::List { all: true }) => {
            let token = gate.require_admin()?;
            let mut admin = NewsAdmin::new(Arc::clone(api));
            if admin.load(&token, notes).await {
                let now = Utc::now();
                for item in admin.items() {
                    let marker = if item.is_published(now) { " " } else { "*" };
                    println!(
                        "{:>4} {} {}  {}",
                        item.id,
                        marker,
                        item.posted_at.format("%Y-%m-%d %H:%M"),
                        item.title
                    );
                }
            }
        }
        Command::News(NewsCommand::List { all: false }) => {
            let site = PublicSite::new(Arc::clone(api), SnapshotCache::new(Arc::clone(store)));
            let view = site.news(Utc::now()).await;
            if let Some(message) = view.message {
                notes.error(message);
            }
            for item in view.items {
                println!(
                    "{:>4}  {}  {}",
                    item.id,
                    item.posted_at.format("%Y-%m-%d %H:%M"),
                    item.title
                );
            }
        }
        Command::Categories(CategoryCommand::List) => {
            let mut categories = CategoryReorder::new(Arc::clone(api));
            if categories.load(notes).await {
                print_categories(&categories);
            }
        }
        Command::Categories(CategoryCommand::Move { from, to }) => {
            let token = gate.require_admin()?;
            let mut categories = CategoryReorder::new(Arc::clone(api));
            if categories.load(notes).await {
                categories.move_category(&token, from, to, notes).await;
                print_categories(&categories);
            }
        }
        Command::Categories(CategoryCommand::Delete { id }) => {
            let token = gate.require_admin()?;
            let mut categories = CategoryReorder::new(Arc::clone(api));
            categories.delete_category(&token, id, notes).await;
        }
    }
    Ok(())
}

fn print_categories(categories: &CategoryReorder) {
    for (position, category) in categories.categories().iter().enumerate() {
        println!(
            "{position:>3}  #{:<4} {:<20} {}",
            category.id, category.name_ru, category.name_en
        );
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
