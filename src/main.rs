use clap::{Parser, ValueEnum};
use freightdesk::application::lifecycle::ShipmentLifecycle;
use freightdesk::application::metrics::MetricsAggregator;
use freightdesk::application::pricing::PricingEngine;
use freightdesk::domain::directory::{Customer, Employee, Office};
use freightdesk::domain::ports::{DirectoryRef, PricingConfigStoreRef, ShipmentStoreRef};
use freightdesk::infrastructure::in_memory::{
    InMemoryDirectory, InMemoryPricingConfigStore, InMemoryShipmentStore,
};
use freightdesk::interfaces::csv::command_reader::{Command, CommandOp, CommandReader};
use freightdesk::interfaces::csv::directory_reader::DirectoryReader;
use freightdesk::interfaces::csv::report_writer::ReportWriter;
use miette::{IntoDiagnostic, Result, bail};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    /// List all shipments.
    Shipments,
    /// Fleet counts and lifetime delivered revenue.
    Dashboard,
    /// Delivered revenue over a date window (requires --from and --to).
    Revenue,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Shipment commands CSV file
    input: PathBuf,

    /// Customers seed CSV (id,name)
    #[arg(long)]
    customers: PathBuf,

    /// Employees seed CSV (id,name)
    #[arg(long)]
    employees: PathBuf,

    /// Offices seed CSV (id,address)
    #[arg(long)]
    offices: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Base price applied to every shipment
    #[arg(long, default_value = "5.00")]
    base_price: Decimal,

    /// Price per kilogram
    #[arg(long, default_value = "2.00")]
    price_per_kg: Decimal,

    /// Surcharge for address (non-office) delivery
    #[arg(long, default_value = "10.00")]
    address_fee: Decimal,

    /// Report to print after replaying the commands
    #[arg(long, value_enum, default_value = "shipments")]
    report: ReportKind,

    /// Revenue window start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<chrono::NaiveDate>,

    /// Revenue window end date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<chrono::NaiveDate>,
}

struct Stores {
    shipments: ShipmentStoreRef,
    configs: PricingConfigStoreRef,
    directory: DirectoryRef,
}

struct Seed {
    customers: Vec<Customer>,
    employees: Vec<Employee>,
    offices: Vec<Office>,
}

fn read_seed(cli: &Cli) -> Result<Seed> {
    let customers = DirectoryReader::new(File::open(&cli.customers).into_diagnostic()?)
        .customers()
        .collect::<freightdesk::error::Result<_>>()
        .into_diagnostic()?;
    let employees = DirectoryReader::new(File::open(&cli.employees).into_diagnostic()?)
        .employees()
        .collect::<freightdesk::error::Result<_>>()
        .into_diagnostic()?;
    let offices = DirectoryReader::new(File::open(&cli.offices).into_diagnostic()?)
        .offices()
        .collect::<freightdesk::error::Result<_>>()
        .into_diagnostic()?;
    Ok(Seed {
        customers,
        employees,
        offices,
    })
}

async fn in_memory_stores(seed: Seed) -> Stores {
    let directory = InMemoryDirectory::new();
    for customer in seed.customers {
        directory.insert_customer(customer).await;
    }
    for employee in seed.employees {
        directory.insert_employee(employee).await;
    }
    for office in seed.offices {
        directory.insert_office(office).await;
    }
    Stores {
        shipments: Arc::new(InMemoryShipmentStore::new()),
        configs: Arc::new(InMemoryPricingConfigStore::new()),
        directory: Arc::new(directory),
    }
}

#[cfg(feature = "storage-rocksdb")]
async fn rocksdb_stores(path: &std::path::Path, seed: Seed) -> Result<Stores> {
    use freightdesk::infrastructure::rocksdb::RocksDbStore;

    let store = RocksDbStore::open(path).into_diagnostic()?;
    for customer in seed.customers {
        store.put_customer(customer).await.into_diagnostic()?;
    }
    for employee in seed.employees {
        store.put_employee(employee).await.into_diagnostic()?;
    }
    for office in seed.offices {
        store.put_office(office).await.into_diagnostic()?;
    }
    Ok(Stores {
        shipments: Arc::new(store.clone()),
        configs: Arc::new(store.clone()),
        directory: Arc::new(store),
    })
}

async fn build_stores(cli: &Cli) -> Result<Stores> {
    let seed = read_seed(cli)?;

    #[cfg(feature = "storage-rocksdb")]
    if let Some(path) = &cli.db_path {
        return rocksdb_stores(path, seed).await;
    }

    Ok(in_memory_stores(seed).await)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stores = build_stores(&cli).await?;

    let pricing = PricingEngine::new(stores.configs.clone());
    // A reopened database may already carry an active config; keep it.
    if stores.configs.active().await.into_diagnostic()?.is_none() {
        pricing
            .update_config(cli.base_price, cli.price_per_kg, cli.address_fee)
            .await
            .into_diagnostic()?;
    }

    let lifecycle = ShipmentLifecycle::new(
        stores.shipments.clone(),
        stores.directory.clone(),
        pricing,
    );

    let file = File::open(&cli.input).into_diagnostic()?;
    for command_result in CommandReader::new(file).commands() {
        let command = match command_result {
            Ok(command) => command,
            Err(e) => {
                warn!("skipping unreadable command row: {e}");
                continue;
            }
        };
        if let Err(e) = apply_command(&lifecycle, &command).await {
            warn!("command failed: {e}");
        }
    }

    run_report(&cli, &stores).await
}

async fn apply_command(
    lifecycle: &ShipmentLifecycle,
    command: &Command,
) -> freightdesk::error::Result<()> {
    match command.op {
        CommandOp::Register => {
            lifecycle.register_shipment(command.draft()?).await?;
        }
        CommandOp::Update => {
            lifecycle
                .update_shipment(command.shipment_id()?, command.patch()?)
                .await?;
        }
        CommandOp::Status => {
            lifecycle
                .update_status(command.shipment_id()?, command.requested_status()?)
                .await?;
        }
        CommandOp::Delete => {
            lifecycle.delete_shipment(command.shipment_id()?).await?;
        }
    }
    Ok(())
}

async fn run_report(cli: &Cli, stores: &Stores) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    let metrics = MetricsAggregator::new(stores.shipments.clone(), stores.directory.clone());

    match cli.report {
        ReportKind::Shipments => {
            let shipments = stores.shipments.all().await.into_diagnostic()?;
            writer.write_shipments(&shipments).into_diagnostic()?;
        }
        ReportKind::Dashboard => {
            let dashboard = metrics.dashboard_metrics().await.into_diagnostic()?;
            writer.write_dashboard(&dashboard).into_diagnostic()?;
        }
        ReportKind::Revenue => {
            let (Some(from), Some(to)) = (cli.from, cli.to) else {
                bail!("--report revenue requires --from and --to");
            };
            let report = metrics.revenue_report(from, to).await.into_diagnostic()?;
            writer.write_revenue(&report).into_diagnostic()?;
        }
    }
    Ok(())
}
