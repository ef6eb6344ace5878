//! Storefront command line
//!
//! Browses a catalogue fixture and drives the local store (favorites, cart,
//! discount wheel) from the terminal.
//!
//! # Usage
//!
//! ```bash
//! storefront --fixture catalog.json catalogue --search juice --sort price
//! storefront --fixture catalog.json categories --width 800
//! storefront --fixture catalog.json deal --offer 1
//! storefront wheel spin
//! storefront wheel status
//! storefront favorite 3
//! storefront --fixture catalog.json favorites
//! storefront --fixture catalog.json cart add 3 --quantity 2 --via 2
//! storefront cart show
//! ```

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use storefront::app::catalogue::{self, CatalogueView};
use storefront::app::deals::{self, DealTracker};
use storefront::app::helpers::{format_percentage, format_price, format_time_remaining, truncate};
use storefront::app::product::{self, ProductDetail};
use storefront::config;
use storefront::core::cart::Cart;
use storefront::core::catalogue::{NumericRange, SortField, SortOrder};
use storefront::core::discount;
use storefront::core::entity::{find_by_id, root_categories, subcategories_of};
use storefront::core::slides::group_slides;
use storefront::core::source::{DataSource, FixtureSource, ViewBranch};
use storefront::core::store::{self, FileStore};
use storefront::utils;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Browse a storefront catalogue and manage the local cart", long_about = None)]
struct Cli {
    /// Catalogue fixture (defaults to catalog.json in the data directory)
    #[arg(long, global = true, value_name = "PATH")]
    fixture: Option<PathBuf>,
    /// Local store file (defaults to store.json in the data directory)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with search, price range, sort and pagination
    Catalogue {
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
        /// Sort field: name, price or id
        #[arg(long, default_value = "name")]
        sort: SortField,
        #[arg(long)]
        desc: bool,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        per_page: Option<usize>,
        /// Only list one sub-category
        #[arg(long)]
        sub_category: Option<u64>,
    },
    /// Show the category carousel slides for a viewport width
    Categories {
        #[arg(short, long, default_value_t = 1280)]
        width: u32,
    },
    /// Show progress on one offer for the signed-in client
    Deal {
        #[arg(short, long)]
        offer: u64,
    },
    /// Spin the discount wheel or show the running discount
    Wheel {
        #[command(subcommand)]
        action: WheelAction,
    },
    /// Toggle a product in the favorites list
    Favorite { id: u64 },
    /// List favorite products
    Favorites,
    /// Add to or show the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum WheelAction {
    Spin,
    Status,
}

#[derive(Subcommand)]
enum CartAction {
    Add {
        id: u64,
        #[arg(short, long, default_value = "1")]
        quantity: String,
        /// Sub-category the product was reached from
        #[arg(long)]
        via: Option<u64>,
    },
    Show,
}

fn main() -> ExitCode {
    let _ = utils::ensure_dirs();
    init_logging();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(handle_cli(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    if let Some(log_path) = utils::log_path()
        && let Ok(file) = std::fs::File::create(log_path)
    {
        tracing_subscriber::fmt().with_writer(file).init();
    } else {
        tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    }
}

async fn load_source(path: Option<&Path>) -> Result<FixtureSource, Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => utils::get_data_dir()
            .map(|dir| dir.join("catalog.json"))
            .ok_or("no data directory; pass --fixture")?,
    };
    Ok(FixtureSource::load(&path).await?)
}

fn open_store(path: Option<&Path>) -> Result<FileStore, Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => utils::store_path().ok_or("no data directory; pass --store")?,
    };
    Ok(FileStore::open(path))
}

async fn handle_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config().await;
    let now = Utc::now();
    let fixture = cli.fixture.as_deref();

    match cli.command {
        Commands::Catalogue {
            search,
            min,
            max,
            sort,
            desc,
            page,
            per_page,
            sub_category,
        } => {
            let source = load_source(fixture).await?;
            let settings = config.catalogue_settings();
            let mut view = match sub_category {
                Some(id) => CatalogueView::for_sub_category(settings, id)?,
                None => CatalogueView::new(settings)?,
            };
            let mut store = open_store(cli.store.as_deref())?;
            let grant = discount::active_grant(&mut store, now)?;

            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            let range = NumericRange::new(
                min.unwrap_or(NumericRange::UNBOUNDED.min),
                max.unwrap_or(NumericRange::UNBOUNDED.max),
            );
            for message in [
                catalogue::Message::Loaded(source.products().await),
                catalogue::Message::GrantChanged(grant),
                catalogue::Message::SearchChanged(search),
                catalogue::Message::RangeChanged(range),
                catalogue::Message::SortChanged(sort, order),
            ] {
                view.update(message);
            }
            if let Some(per_page) = per_page {
                view.update(catalogue::Message::PerPageChanged(per_page));
            }
            view.update(catalogue::Message::PageChanged(page));

            match view.branch() {
                ViewBranch::Loading => {}
                ViewBranch::Error(t) => return Err(t.user_message.into()),
                ViewBranch::Empty => println!("No products match."),
                ViewBranch::Ready(_) => {
                    for p in view.page_items() {
                        let name = truncate(p.display_name(), 32);
                        let price = p.price.value();
                        match view.discounted_price(p) {
                            Some(d) => println!(
                                "{:>5}  {:<32} {} (was {})",
                                p.id,
                                name,
                                format_price(d),
                                format_price(price)
                            ),
                            None => println!(
                                "{:>5}  {:<32} {}",
                                p.id,
                                name,
                                format_price(price)
                            ),
                        }
                    }
                    println!(
                        "Page {}/{} ({} results)",
                        view.pager().page(),
                        view.total_pages(),
                        view.result_len()
                    );
                }
            }
        }
        Commands::Categories { width } => {
            let source = load_source(fixture).await?;
            let categories = source.categories().await?;
            let roots = root_categories(&categories, &config.hidden_root_ids);
            let per_slide = config.category_breakpoints.items_for(width);
            for (i, slide) in group_slides(&roots, per_slide)?.iter().enumerate() {
                let titles: Vec<&str> = slide.iter().map(|c| c.title.as_str()).collect();
                println!("Slide {}: {}", i + 1, titles.join(", "));
                for root in *slide {
                    let subs = subcategories_of(&categories, root.id);
                    if !subs.is_empty() {
                        let names: Vec<&str> = subs.iter().map(|c| c.title.as_str()).collect();
                        println!("    {}: {}", root.title, names.join(", "));
                    }
                }
            }
        }
        Commands::Deal { offer } => {
            let source = load_source(fixture).await?;
            let profile = source.profile().await?;
            let mut tracker = DealTracker::new(profile.client_id, offer);
            tracker.update(deals::Message::Loaded(source.deals(profile.client_id).await));
            match tracker.branch() {
                ViewBranch::Error(t) => return Err(t.user_message.into()),
                ViewBranch::Empty => println!("No progress on offer {offer} yet."),
                ViewBranch::Loading | ViewBranch::Ready(_) => {}
            }
            if let Some(card) = tracker.card() {
                println!("{} deal #{}", card.kind.label(), card.key.deal_id);
                if card.is_ended() {
                    println!("Deal ended");
                } else {
                    println!("Progress: {}", format_percentage(card.progress.percentage));
                }
                if let Some(reward) = card.progress.reward {
                    println!("Reward: {}", format_price(reward));
                }
                for marker in &card.progress.markers {
                    let tick = if marker.achieved { "x" } else { " " };
                    println!("  [{tick}] {} -> {}", marker.threshold, format_price(marker.reward));
                }
            }
        }
        Commands::Wheel { action } => {
            let mut store = open_store(cli.store.as_deref())?;
            match action {
                WheelAction::Spin => {
                    let spin = discount::spin(&config.wheel_options, &mut rand::rng())?;
                    let grant =
                        discount::grant(&mut store, spin.percent, now, config.grant_lifetime())?;
                    println!(
                        "You won {}% off! Valid for {}.",
                        grant.percent,
                        format_time_remaining(grant.remaining(now))
                    );
                }
                WheelAction::Status => match discount::active_grant(&mut store, now)? {
                    Some(grant) => println!(
                        "{}% off, {} left",
                        grant.percent,
                        format_time_remaining(grant.remaining(now))
                    ),
                    None => println!("No discount running."),
                },
            }
        }
        Commands::Favorite { id } => {
            let mut store = open_store(cli.store.as_deref())?;
            if store::toggle_favorite(&mut store, id)? {
                println!("Added product {id} to favorites.");
            } else {
                println!("Removed product {id} from favorites.");
            }
        }
        Commands::Favorites => {
            let store = open_store(cli.store.as_deref())?;
            let ids = store::favorites(&store);
            if ids.is_empty() {
                println!("No favorites yet.");
                return Ok(());
            }
            let products = match load_source(fixture).await {
                Ok(source) => source.products().await?,
                Err(e) => {
                    tracing::warn!("Listing favorites without names: {e}");
                    Arc::from(Vec::new())
                }
            };
            for id in ids {
                match find_by_id(&products, id) {
                    Some(p) => println!("{:>5}  {}", id, p.display_name()),
                    None => println!("{id:>5}"),
                }
            }
        }
        Commands::Cart { action } => {
            let mut store = open_store(cli.store.as_deref())?;
            match action {
                CartAction::Add { id, quantity, via } => {
                    let source = load_source(fixture).await?;
                    let mut detail = ProductDetail::new(id, via, config.product_settings(), &store);
                    detail.update(
                        product::Message::Loaded(source.products().await),
                        &mut store,
                        now,
                    );
                    if let ViewBranch::Error(t) = detail.branch() {
                        return Err(t.user_message.into());
                    }
                    detail.update(product::Message::QuantityInput(quantity), &mut store, now);
                    match detail.update(product::Message::AddToCart, &mut store, now) {
                        product::Outcome::AddedToCart { item_count, total } => {
                            println!("{item_count} item(s) in cart, {}", format_price(total));
                        }
                        _ => {
                            return Err(detail.notice().unwrap_or("Could not add to cart").into());
                        }
                    }
                }
                CartAction::Show => {
                    let cart = Cart::load(&mut store, now)?;
                    if cart.is_empty() {
                        println!("Your cart is empty.");
                    }
                    for item in &cart.items {
                        let badge = if item.has_discount { " (discounted)" } else { "" };
                        println!(
                            "{:>3} x {:<32} {}{badge}",
                            item.quantity,
                            item.name,
                            format_price(item.total)
                        );
                    }
                    if !cart.is_empty() {
                        println!("Total: {}", format_price(cart.total()));
                    }
                }
            }
        }
    }
    Ok(())
}
