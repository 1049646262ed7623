use clap::Parser;
use miette::{IntoDiagnostic, Result};
use motorent::application::fleet::FleetService;
use motorent::application::lifecycle::RentalEngine;
use motorent::application::recorder::EventRecorder;
use motorent::config::Config;
use motorent::domain::ports::{SharedClock, SharedRecordStore};
use motorent::infrastructure::clock::{FixedClock, SystemClock};
use motorent::infrastructure::in_memory::InMemoryStore;
use motorent::infrastructure::notifier::ChannelNotifier;
use motorent::interfaces::batch::BatchProcessor;
use motorent::interfaces::csv::command_reader::CommandReader;
use motorent::interfaces::csv::rental_writer::RentalWriter;
use motorent::telemetry;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Configuration file (defaults to ./motorent.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Date used as "today" when opening rentals (YYYY-MM-DD)
    #[arg(long)]
    today: Option<chrono::NaiveDate>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<SharedRecordStore> {
    use motorent::infrastructure::rocksdb::RocksDbStore;

    match db_path {
        Some(path) => Ok(Arc::new(RocksDbStore::open(path).into_diagnostic()?)),
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<SharedRecordStore> {
    if db_path.is_some() {
        warn!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Arc::new(InMemoryStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).into_diagnostic()?;
    if cli.db_path.is_some() {
        config.db_path = cli.db_path;
    }
    if cli.today.is_some() {
        config.today = cli.today;
    }

    telemetry::init(&config.log_filter);

    let store = open_store(config.db_path.clone())?;
    let clock: SharedClock = match config.today {
        Some(today) => Arc::new(FixedClock(today)),
        None => Arc::new(SystemClock),
    };

    let (notifier, events) = ChannelNotifier::new();
    let recorder = EventRecorder::new(store.clone(), clock.clone()).spawn(events);

    let engine =
        RentalEngine::new(store.clone(), clock).with_max_attempts(config.max_commit_attempts);
    let fleet = FleetService::new(store, Arc::new(notifier));
    let processor = BatchProcessor::new(engine, fleet);

    // Process commands
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = processor.apply(command).await {
                    warn!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                warn!("Error reading command: {}", e);
            }
        }
    }

    // Dropping the processor closes the event channel and lets the recorder finish
    let rentals = processor.into_results().await.into_diagnostic()?;
    let recorded = recorder.await.into_diagnostic()?;
    info!(recorded, "fleet events recorded");

    let stdout = io::stdout();
    let mut writer = RentalWriter::new(stdout.lock());
    writer.write_rentals(&rentals).into_diagnostic()?;

    Ok(())
}
