//! # Cash Transfer Node
//!
//! Runs one ledger and serves it over stdin/stdout, one JSON command per
//! input line and one JSON response per output line. Logs go to stderr.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `CT_*` environment variables
//! 2. Initialize logging
//! 3. Create the ledger with a broadcast event sink
//! 4. Spawn the event logger task
//! 5. Serve commands until EOF or Ctrl+C

use anyhow::{Context, Result};
use cash_transfer::adapters::{handle_line, BroadcastEventSink};
use cash_transfer::config::CashTransferConfig;
use cash_transfer::ports::outbound::SystemTimeSource;
use cash_transfer::service::CashTransferService;
use cash_transfer::VERSION;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = CashTransferConfig::from_env().context("loading configuration")?;

    // Initialize logging (stderr keeps stdout a clean response stream)
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("invalid log level {:?}", config.log_level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(version = VERSION, owner = %config.owner, "Starting cash transfer node");

    let sink = BroadcastEventSink::with_capacity(config.event_channel_capacity);
    let mut events = sink.subscribe();
    let ledger = CashTransferService::new(&config, sink, SystemTimeSource);

    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(record) => info!(
                    topic = record.topic(),
                    sequence = record.sequence,
                    event_id = %record.event_id,
                    "Ledger event"
                ),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else {
            debug!("End of input");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&ledger, &line);
        let mut out = response.to_json_line();
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    let stats = ledger.stats();
    info!(
        succeeded = stats.operations_succeeded,
        rejected = stats.operations_rejected,
        events = stats.events_emitted,
        "Shutting down"
    );

    // Dropping the ledger closes the channel and ends the logger task.
    drop(ledger);
    event_logger.await?;

    Ok(())
}
