use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use realty_desk::listing::{ListingFilter, ListingQuery, ListingView, PossessionStatus, PriceBand};
use realty_desk::models::entities::{
    Banner, Document, Lead, Meeting, ProfilePicture, PropertyRecord, PropertyType, ReferenceSource, Role, Sale,
    Testimonial, User,
};
use realty_desk::models::{ListingType, Resource, Validate};
use realty_desk::settings::LocalSettings;
use realty_desk::store::notify::LogNotifier;
use realty_desk::{Config, RestClient, Session};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "realty-desk", version, about = "Property listings and back-office records from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the property catalogue
    Listings(ListingArgs),
    /// List the cities present in the catalogue
    Cities,
    /// Manage back-office records
    Entity {
        #[arg(value_enum)]
        resource: ResourceKind,
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Show or change the persisted demo-mode flag
    DemoMode {
        #[arg(value_enum)]
        state: Option<Toggle>,
    },
}

#[derive(clap::Args)]
struct ListingArgs {
    /// Exact city name (case-sensitive)
    #[arg(long)]
    city: Option<String>,
    /// Property type display name
    #[arg(long = "type")]
    property_type: Option<String>,
    /// e.g. "Under 50L", "50L - 1Cr", "Above 5Cr"
    #[arg(long, value_parser = parse_price_band)]
    price_band: Option<PriceBand>,
    /// e.g. "Ready to Move", "New Launch", "After 1 Yr Possession"
    #[arg(long, value_parser = parse_possession)]
    possession: Option<PossessionStatus>,
    #[arg(long, value_enum)]
    listing_type: Option<ListingKind>,
    /// Free text matched against name, address and description
    #[arg(long, short)]
    query: Option<String>,
    /// Ask the backend to narrow by city, type and listing type as well
    #[arg(long)]
    server_side: bool,
    /// Print matching listings as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum EntityAction {
    List,
    Add {
        /// Record as a JSON object
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Remove {
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResourceKind {
    Leads,
    Users,
    Roles,
    Documents,
    Meetings,
    PropertyTypes,
    Properties,
    Sales,
    ReferenceSources,
    Testimonials,
    Banners,
    ProfilePictures,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListingKind {
    Sale,
    Rent,
}

impl From<ListingKind> for ListingType {
    fn from(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Sale => ListingType::Sale,
            ListingKind::Rent => ListingType::Rent,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn parse_price_band(raw: &str) -> Result<PriceBand, String> {
    PriceBand::from_label(raw).ok_or_else(|| {
        let labels: Vec<&str> = PriceBand::ALL.iter().map(|b| b.label()).collect();
        format!("unknown price band, expected one of: {}", labels.join(", "))
    })
}

fn parse_possession(raw: &str) -> Result<PossessionStatus, String> {
    PossessionStatus::from_label(raw).ok_or_else(|| {
        let labels: Vec<&str> = PossessionStatus::ALL.iter().map(|s| s.label()).collect();
        format!("unknown possession status, expected one of: {}", labels.join(", "))
    })
}

/// Indian-style price, e.g. `₹1.25 Cr` or `₹48.00 L`
fn format_price(price: f64) -> String {
    if price >= 10_000_000.0 {
        format!("₹{:.2} Cr", price / 10_000_000.0)
    } else if price >= 100_000.0 {
        format!("₹{:.2} L", price / 100_000.0)
    } else {
        format!("₹{:.0}", price)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let settings = LocalSettings::load(&config.settings_path).await?;

    let session = || -> Result<Session> {
        let transport = RestClient::new(&config)?;
        Ok(Session::new(Arc::new(transport), Arc::new(LogNotifier)).with_demo_mode(settings.demo_mode))
    };

    match cli.command {
        Command::Listings(args) => listings(session()?, args).await,
        Command::Cities => cities(session()?).await,
        Command::Entity { resource, action } => entity(&session()?, resource, action).await,
        Command::DemoMode { state } => demo_mode(&config, settings.clone(), state).await,
    }
}

async fn listings(session: Session, args: ListingArgs) -> Result<()> {
    let now = Utc::now();
    let listing_type = args.listing_type.map(ListingType::from);

    let query = if args.server_side {
        ListingQuery {
            city: args.city.clone(),
            property_type: args.property_type.clone(),
            listing_type,
        }
    } else {
        ListingQuery::default()
    };

    let mut view = ListingView::new(session);
    view.refresh(query, now).await?;
    view.filter = ListingFilter {
        city: args.city,
        property_type: args.property_type,
        price_band: args.price_band,
        possession: args.possession,
        listing_type,
        query: args.query,
    };

    let cards = view.visible(now);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    info!("✅ {} of {} properties match\n", cards.len(), view.properties().len());
    for (i, card) in cards.iter().enumerate() {
        let property = card.property;
        println!("{}. {} ({})", i + 1, property.name, format_price(property.price));
        println!("   {}, {}", property.address, property.city);
        if !property.property_type.is_empty() {
            println!("   Type: {}", property.property_type);
        }
        if let Some(listing_type) = property.listing_type {
            println!("   For: {}", listing_type);
        }
        if let (Some(bedrooms), Some(area)) = (property.bedrooms, property.area) {
            println!("   {} BHK, {} sq ft", bedrooms, area);
        }
        println!("   Possession: {}", card.possession_status);
        println!("   ID: {}", property.id);
        println!();
    }

    Ok(())
}

async fn cities(session: Session) -> Result<()> {
    let mut view = ListingView::new(session);
    view.refresh(ListingQuery::default(), Utc::now()).await?;
    for city in view.cities() {
        println!("{}", city);
    }
    Ok(())
}

async fn entity(session: &Session, resource: ResourceKind, action: EntityAction) -> Result<()> {
    match resource {
        ResourceKind::Leads => run_entity::<Lead>(session, action).await,
        ResourceKind::Users => run_entity::<User>(session, action).await,
        ResourceKind::Roles => run_entity::<Role>(session, action).await,
        ResourceKind::Documents => run_entity::<Document>(session, action).await,
        ResourceKind::Meetings => run_entity::<Meeting>(session, action).await,
        ResourceKind::PropertyTypes => run_entity::<PropertyType>(session, action).await,
        ResourceKind::Properties => run_entity::<PropertyRecord>(session, action).await,
        ResourceKind::Sales => run_entity::<Sale>(session, action).await,
        ResourceKind::ReferenceSources => run_entity::<ReferenceSource>(session, action).await,
        ResourceKind::Testimonials => run_entity::<Testimonial>(session, action).await,
        ResourceKind::Banners => run_entity::<Banner>(session, action).await,
        ResourceKind::ProfilePictures => run_entity::<ProfilePicture>(session, action).await,
    }
}

fn parse_draft<T: Resource>(data: &str) -> Result<T> {
    serde_json::from_str(data).with_context(|| format!("--data is not a valid {} record", T::LABEL.to_lowercase()))
}

async fn run_entity<T: Resource + Validate>(session: &Session, action: EntityAction) -> Result<()> {
    let mut store = session.store::<T>();

    match action {
        EntityAction::List => {
            let items = store.get_all().await?;
            println!("{}", serde_json::to_string_pretty(items)?);
            if let Some(count) = store.count() {
                info!("{} total {} records", count, T::LABEL.to_lowercase());
            }
        }
        EntityAction::Add { data } => {
            let record = store.add(parse_draft::<T>(&data)?).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        EntityAction::Update { id, data } => {
            let record = store.update(&id, parse_draft::<T>(&data)?).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        EntityAction::Remove { id } => {
            store.remove(&id).await?;
        }
    }

    Ok(())
}

async fn demo_mode(config: &Config, mut settings: LocalSettings, state: Option<Toggle>) -> Result<()> {
    if let Some(state) = state {
        settings.demo_mode = matches!(state, Toggle::On);
        settings.save(&config.settings_path).await?;
        info!("💾 Saved settings to {}", config.settings_path.display());
    }
    println!("Demo mode is {}", if settings.demo_mode { "on" } else { "off" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_use_lakh_and_crore() {
        assert_eq!(format_price(12_500_000.0), "₹1.25 Cr");
        assert_eq!(format_price(4_800_000.0), "₹48.00 L");
        assert_eq!(format_price(95_000.0), "₹95000");
    }

    #[test]
    fn cli_parses_listing_filters() {
        let cli = Cli::try_parse_from([
            "realty-desk",
            "listings",
            "--city",
            "Pune",
            "--price-band",
            "50L - 1Cr",
            "--possession",
            "new launch",
            "--listing-type",
            "rent",
        ])
        .unwrap();

        let Command::Listings(args) = cli.command else {
            panic!("expected listings command");
        };
        assert_eq!(args.city.as_deref(), Some("Pune"));
        assert_eq!(args.price_band, Some(PriceBand::From50LTo1Cr));
        assert_eq!(args.possession, Some(PossessionStatus::NewLaunch));
        assert!(matches!(args.listing_type, Some(ListingKind::Rent)));
    }

    #[test]
    fn cli_rejects_unknown_band() {
        assert!(Cli::try_parse_from(["realty-desk", "listings", "--price-band", "cheap"]).is_err());
    }
}
