//! Lensbook CLI

use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lensbook::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lensbook", about = "Event photography and live-stream booking", long_about = None)]
struct Cli {
    /// Booking config file (YAML)
    #[arg(long, env = "LENSBOOK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding package catalogs
    #[arg(long, env = "LENSBOOK_FIXTURES", default_value = "./fixtures", global = true)]
    fixtures: PathBuf,

    /// Catalog name under `packages/`
    #[arg(long, default_value = "default", global = true)]
    catalog: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the price of a package selection
    Quote(SelectionArgs),

    /// Book a package and pay for it
    Book(BookArgs),
}

#[derive(Debug, Args)]
struct SelectionArgs {
    /// Package id
    #[arg(long)]
    package: String,

    /// Extra photos
    #[arg(long)]
    photos: Option<String>,

    /// Extra videos
    #[arg(long)]
    videos: Option<String>,

    /// Number of people, for group packages
    #[arg(long)]
    people: Option<String>,
}

#[derive(Debug, Args)]
struct BookArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Event date
    #[arg(long)]
    date: String,

    /// Start time
    #[arg(long)]
    start: String,

    /// End time
    #[arg(long)]
    end: String,

    /// Event type
    #[arg(long = "type")]
    event_type: String,

    /// Location
    #[arg(long)]
    location: String,

    /// Event title
    #[arg(long)]
    title: Option<String>,

    /// Event description
    #[arg(long)]
    description: Option<String>,

    /// Organizer
    #[arg(long)]
    organizer: Option<String>,

    /// Hide the event from public listings
    #[arg(long)]
    private: bool,

    /// Payment method
    #[arg(long, value_enum)]
    method: MethodArg,

    /// Mobile money phone number
    #[arg(long)]
    phone: Option<String>,

    /// Card number
    #[arg(long)]
    card_number: Option<String>,

    /// Card expiry (MM/YY)
    #[arg(long)]
    expiry: Option<String>,

    /// Card security code
    #[arg(long)]
    cvv: Option<String>,

    /// Name on the card
    #[arg(long)]
    holder: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Mtn,
    Airtel,
    Card,
}

impl From<MethodArg> for PaymentMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Mtn => PaymentMethod::MtnMobileMoney,
            MethodArg::Airtel => PaymentMethod::AirtelMoney,
            MethodArg::Card => PaymentMethod::Card,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _env = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if session().begin_preloader() {
        info!(catalog = %cli.catalog, "loading packages");
    }

    let catalog = FixtureSource::new(Fixture::with_base_path(&cli.fixtures), cli.catalog.as_str())
        .fetch_catalog()
        .await
        .context("failed to load package catalog")?;

    let config = match &cli.config {
        Some(path) => BookingConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => BookingConfig::for_currency(catalog.currency())?,
    };

    if config.currency != catalog.currency() {
        bail!(
            "config currency {} does not match catalog currency {}",
            config.currency.iso_alpha_code,
            catalog.currency().iso_alpha_code
        );
    }

    match cli.command {
        Commands::Quote(args) => quote(&catalog, &config, &args),
        Commands::Book(args) => book(&catalog, &config, &args).await,
    }
}

fn select<'a>(
    catalog: &Catalog<'a>,
    config: &BookingConfig,
    args: &SelectionArgs,
) -> anyhow::Result<BookingFlow<'a>> {
    let package = catalog.require(&PackageId::new(args.package.as_str()))?;

    let mut flow = BookingFlow::from_config(config);
    flow.load_catalog(catalog);
    flow.select_package(package);

    for (kind, raw) in [
        (ExtraKind::Photos, &args.photos),
        (ExtraKind::Videos, &args.videos),
    ] {
        if let Some(raw) = raw {
            flow.input_extra(kind, raw)?;
        }
    }

    if let Some(message) = flow.extras().error(&package.id) {
        bail!(message);
    }

    if let Some(raw) = &args.people {
        flow.input_people(raw)?;
    }

    if let Some(message) = flow.people_error() {
        bail!(message);
    }

    Ok(flow)
}

fn quote(catalog: &Catalog<'_>, config: &BookingConfig, args: &SelectionArgs) -> anyhow::Result<()> {
    let flow = select(catalog, config, args)?;
    let package = flow.package().context("no package selected")?;
    let price = flow.price()?;
    let extras = flow.selected_extras()?;

    Quote::new(package, &price, extras).write_to(io::stdout().lock())?;

    Ok(())
}

async fn book(catalog: &Catalog<'_>, config: &BookingConfig, args: &BookArgs) -> anyhow::Result<()> {
    let mut flow = select(catalog, config, &args.selection)?;

    for (field, value) in [
        (DetailField::Date, Some(&args.date)),
        (DetailField::StartTime, Some(&args.start)),
        (DetailField::EndTime, Some(&args.end)),
        (DetailField::EventType, Some(&args.event_type)),
        (DetailField::Location, Some(&args.location)),
        (DetailField::Title, args.title.as_ref()),
        (DetailField::Description, args.description.as_ref()),
        (DetailField::Organizer, args.organizer.as_ref()),
    ] {
        if let Some(value) = value {
            flow.set_detail(field, value.as_str());
        }
    }

    if args.private {
        flow.set_visibility(Visibility::Private);
    }

    flow.select_payment(args.method.into());

    for (field, value) in [
        (PaymentField::Phone, &args.phone),
        (PaymentField::CardNumber, &args.card_number),
        (PaymentField::Expiry, &args.expiry),
        (PaymentField::Cvv, &args.cvv),
        (PaymentField::HolderName, &args.holder),
    ] {
        if let Some(value) = value {
            flow.input_payment(field, value);
        }
    }

    flow.validate()?;

    let controller = SubmissionController::from_config(OfflineCollaborator::new(), config);
    let total = flow.total()?;

    let mut out = io::stdout().lock();

    writeln!(out, "Submitting booking for {total}...")?;

    match controller.submit(&mut flow).await? {
        SubmissionOutcome::Redirect { route } => {
            writeln!(out, "Booking confirmed. Watch the live stream at {route}")?;
        }
        SubmissionOutcome::ShareLink(link) => {
            writeln!(out, "Booking confirmed. Share this link with your group: {link}")?;
        }
    }

    session().end();

    Ok(())
}
