//! Opendoorz admin CLI.
//!
//! One-shot subcommands over the shared database: manage listings, category
//! names, and the admin contact list, and run the inquiry pipeline (`link`,
//! `chat`) the site invokes per request.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sqlx::SqlitePool;

use opendoorz::config::{OpendoorzConfig, RotatorBackend};
use opendoorz::directory::{self, AdminNumber};
use opendoorz::inquiry::InquiryService;
use opendoorz::listings::categories::{self, CategoryKind};
use opendoorz::listings::{self, Property};
use opendoorz::rotator::store::{CursorStore, FileCursorStore, SqliteCursorStore};
use opendoorz::rotator::RoundRobinSelector;
use opendoorz::{db, logging};

#[derive(Parser)]
#[command(name = "opendoorz", version, about = "Opendoorz back-end admin CLI")]
struct Cli {
    /// Also write JSON logs to the configured logs directory.
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a WhatsApp inquiry link for a property, advancing the rotation.
    Link {
        /// Property ID the inquiry is about.
        property_id: i64,
    },
    /// Show the composed inquiry message without consuming a rotation slot.
    Chat {
        /// Property ID the inquiry is about.
        property_id: i64,
    },
    /// Manage the admin contact list the rotator cycles through.
    Numbers {
        #[command(subcommand)]
        action: NumbersAction,
    },
    /// Manage property listings.
    Properties {
        #[command(subcommand)]
        action: PropertiesAction,
    },
    /// Manage category name tables (type and location).
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
    /// Reset the rotation cursor so the next inquiry goes to the first admin.
    ResetCursor,
}

#[derive(Subcommand)]
enum NumbersAction {
    /// List admin numbers, optionally filtered by keyword.
    List {
        /// Keyword matched against username and phone.
        #[arg(long)]
        search: Option<String>,
        /// Emit JSON instead of the table view.
        #[arg(long)]
        json: bool,
    },
    /// Add an admin number at the end of the rotation.
    Add {
        /// Display name of the admin.
        #[arg(long)]
        username: String,
        /// Phone number in international digits form.
        #[arg(long)]
        phone: String,
    },
    /// Remove an admin number by ID.
    Remove {
        /// Admin number ID.
        id: i64,
    },
}

#[derive(Subcommand)]
enum PropertiesAction {
    /// List properties, optionally filtered by keyword.
    List {
        /// Keyword matched against title, description, address, and status.
        #[arg(long)]
        search: Option<String>,
        /// Emit JSON instead of the table view.
        #[arg(long)]
        json: bool,
    },
    /// Add a property listing.
    Add(PropertyArgs),
    /// Remove a property by ID.
    Remove {
        /// Property ID.
        id: i64,
    },
}

#[derive(Args)]
struct PropertyArgs {
    /// Listing title.
    #[arg(long)]
    title: String,
    /// Free-form description.
    #[arg(long)]
    description: String,
    /// Price in whole rupiah.
    #[arg(long)]
    price: i64,
    /// Bedroom count.
    #[arg(long, default_value_t = 1)]
    bedrooms: i64,
    /// Bathroom count.
    #[arg(long, default_value_t = 0)]
    bathrooms: i64,
    /// Building area in square metres.
    #[arg(long, default_value_t = 0)]
    area: i64,
    /// Number of floors.
    #[arg(long, default_value_t = 1)]
    floor: i64,
    /// Street address.
    #[arg(long)]
    address: String,
    /// Parking capacity.
    #[arg(long, default_value_t = 0)]
    parking: i64,
    /// Sale status (e.g. available, sold).
    #[arg(long, default_value = "available")]
    status: String,
    /// Category type ID.
    #[arg(long)]
    type_id: Option<i64>,
    /// Category location ID.
    #[arg(long)]
    location_id: Option<i64>,
}

#[derive(Subcommand)]
enum CategoriesAction {
    /// List categories of one kind.
    List {
        /// Which table: type or location.
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Keyword matched against the name.
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a category.
    Add {
        /// Which table: type or location.
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Display name.
        name: String,
    },
    /// Remove a category by ID.
    Remove {
        /// Which table: type or location.
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Category ID.
        id: i64,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum KindArg {
    /// Property type (house, apartment, …).
    Type,
    /// Property location (city or district).
    Location,
}

impl From<KindArg> for CategoryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Type => CategoryKind::Type,
            KindArg::Location => CategoryKind::Location,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = OpendoorzConfig::load().context("failed to load configuration")?;
    let logs_dir = cli.log_file.then(|| Path::new(&config.paths.logs_dir));
    let _logging = logging::init(logs_dir).context("failed to initialise logging")?;

    let pool = db::open(Path::new(&config.paths.database))
        .await
        .context("failed to open database")?;

    let store: Box<dyn CursorStore> = match config.rotator.backend {
        RotatorBackend::File => Box::new(FileCursorStore::new(&config.rotator.state_file)),
        RotatorBackend::Database => Box::new(SqliteCursorStore::new(pool.clone())),
    };
    let service = InquiryService::new(
        pool.clone(),
        RoundRobinSelector::new(store),
        config.site.base_url.clone(),
        config.site.wa_send_base.clone(),
    );

    match cli.command {
        Command::Link { property_id } => {
            let generated = service.generate_link(property_id).await?;
            println!("{}", generated.url);
        }
        Command::Chat { property_id } => {
            let text = service.chat_preview(property_id).await?;
            println!("{text}");
        }
        Command::Numbers { action } => run_numbers(&pool, action).await?,
        Command::Properties { action } => run_properties(&pool, action).await?,
        Command::Categories { action } => run_categories(&pool, action).await?,
        Command::ResetCursor => {
            service.reset_cursor().await?;
            println!("rotation cursor reset");
        }
    }

    pool.close().await;
    Ok(())
}

async fn run_numbers(pool: &SqlitePool, action: NumbersAction) -> Result<()> {
    match action {
        NumbersAction::List { search, json } => {
            let numbers = directory::list_numbers(pool, search.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&numbers)?);
            } else {
                for number in numbers {
                    println!(
                        "{:>4}  {}  {}",
                        number.id.unwrap_or_default(),
                        number.phone,
                        number.username
                    );
                }
            }
        }
        NumbersAction::Add { username, phone } => {
            let id = directory::upsert_number(
                pool,
                &AdminNumber {
                    id: None,
                    username,
                    phone,
                },
            )
            .await?;
            println!("admin number {id} added");
        }
        NumbersAction::Remove { id } => {
            directory::delete_number(pool, id).await?;
            println!("admin number {id} removed");
        }
    }
    Ok(())
}

async fn run_properties(pool: &SqlitePool, action: PropertiesAction) -> Result<()> {
    match action {
        PropertiesAction::List { search, json } => {
            let properties = listings::list_properties(pool, search.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&properties)?);
            } else {
                for property in properties {
                    println!(
                        "{:>4}  {:<10}  {}  ({})",
                        property.id.unwrap_or_default(),
                        property.status,
                        property.title,
                        property.address
                    );
                }
            }
        }
        PropertiesAction::Add(args) => {
            let id = listings::upsert_property(
                pool,
                &Property {
                    id: None,
                    title: args.title,
                    description: args.description,
                    price: args.price,
                    bedrooms: args.bedrooms,
                    bathrooms: args.bathrooms,
                    area: args.area,
                    floor: args.floor,
                    address: args.address,
                    parking: args.parking,
                    status: args.status,
                    category_type_id: args.type_id,
                    category_location_id: args.location_id,
                },
            )
            .await?;
            println!("property {id} added");
        }
        PropertiesAction::Remove { id } => {
            listings::delete_property(pool, id).await?;
            println!("property {id} removed");
        }
    }
    Ok(())
}

async fn run_categories(pool: &SqlitePool, action: CategoriesAction) -> Result<()> {
    match action {
        CategoriesAction::List { kind, search } => {
            for category in
                categories::list_categories(pool, kind.into(), search.as_deref()).await?
            {
                println!("{:>4}  {}", category.id, category.name);
            }
        }
        CategoriesAction::Add { kind, name } => {
            let id = categories::add_category(pool, kind.into(), &name).await?;
            println!("category {id} added");
        }
        CategoriesAction::Remove { kind, id } => {
            categories::delete_category(pool, kind.into(), id).await?;
            println!("category {id} removed");
        }
    }
    Ok(())
}
