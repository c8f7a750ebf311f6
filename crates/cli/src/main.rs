//! Ashok Asthmi CLI - migrations, catalog seeding and offline carts.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! asthmi-cli migrate
//!
//! # Validate a catalog file without writing
//! asthmi-cli seed catalog catalog.yaml --dry-run
//!
//! # Seed the catalog
//! asthmi-cli seed catalog catalog.yaml
//!
//! # Work with a cart file
//! asthmi-cli cart add --catalog catalog.yaml agarbatti --variant small -q 2
//! asthmi-cli cart show
//! asthmi-cli cart order --name Ravi --phone 9876543210 --address "12 Temple Road"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use asthmi_storefront::cart::DEFAULT_CART_KEY;
use asthmi_storefront::checkout::DeliveryDetails;
use asthmi_storefront::config::{DEFAULT_STORE_NAME, WhatsAppConfig};
use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "asthmi-cli")]
#[command(author, version, about = "Ashok Asthmi CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Inspect and edit cart files
    Cart {
        #[command(flatten)]
        location: CartLocation,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert categories and products from a YAML file
    Catalog {
        /// Path to the catalog YAML file
        file: String,

        /// Validate the file without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct CartLocation {
    /// Directory holding cart files
    #[arg(long, global = true, default_value = ".carts")]
    dir: PathBuf,

    /// Storage key of the cart
    #[arg(long, global = true, default_value = DEFAULT_CART_KEY)]
    key: String,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart lines, count and total
    Show,
    /// Add a product from a catalog file
    Add {
        /// Catalog YAML file to look the product up in
        #[arg(long)]
        catalog: String,

        /// Product id
        product_id: String,

        /// Variant id
        #[arg(long)]
        variant: Option<String>,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity by a delta
    Update {
        /// Line id (`productId` or `productId-variantId`)
        item_id: String,

        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Remove a line
    Remove {
        /// Line id (`productId` or `productId-variantId`)
        item_id: String,
    },
    /// Empty the cart
    Clear,
    /// Print the WhatsApp order message and link
    Order {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        pincode: String,

        /// WhatsApp number receiving orders (digits, optional leading `+`)
        #[arg(long, env = "WHATSAPP_ORDER_NUMBER")]
        number: String,

        #[arg(long, env = "STOREFRONT_STORE_NAME", default_value = DEFAULT_STORE_NAME)]
        store_name: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, dry_run } => {
                commands::seed::catalog(&file, dry_run).await?;
            }
        },
        Commands::Cart { location, action } => {
            let CartLocation { dir, key } = location;
            match action {
                CartAction::Show => commands::cart::show(&dir, &key),
                CartAction::Add {
                    catalog,
                    product_id,
                    variant,
                    quantity,
                } => {
                    commands::cart::add(
                        &dir,
                        &key,
                        &catalog,
                        &product_id,
                        variant.as_deref(),
                        quantity,
                    )
                    .await?;
                }
                CartAction::Update { item_id, delta } => {
                    commands::cart::update(&dir, &key, &item_id, delta);
                }
                CartAction::Remove { item_id } => commands::cart::remove(&dir, &key, &item_id),
                CartAction::Clear => commands::cart::clear(&dir, &key),
                CartAction::Order {
                    name,
                    phone,
                    address,
                    city,
                    pincode,
                    number,
                    store_name,
                } => {
                    let whatsapp = WhatsAppConfig::new(&number)?;
                    let details = DeliveryDetails {
                        name,
                        phone,
                        address,
                        city,
                        pincode,
                    };
                    commands::cart::order(
                        &dir,
                        &key,
                        &store_name,
                        &whatsapp.order_number,
                        details,
                    )?;
                }
            }
        }
    }
    Ok(())
}
