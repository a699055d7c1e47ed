//! ANTSDR DMA UDP receiver.
//!
//! Listens for the board's data stream and prints throughput statistics
//! until interrupted.
//!
//! Usage:
//!   antsdr-recv [-p PORT] [-b BUFFER_SIZE] [-v]

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use antsdr_remote::{
    DEFAULT_DATA_PORT, ListenerConfig, StopReason, StopSignal, StreamListener, final_summary, ui,
};

#[derive(Parser, Debug)]
#[command(name = "antsdr-recv")]
#[command(about = "ANTSDR DMA UDP Receiver")]
struct Args {
    /// UDP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_DATA_PORT)]
    port: u16,

    /// Receive buffer size
    #[arg(short, long, default_value_t = 4096)]
    buffer_size: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ListenerConfig {
        port: args.port,
        buffer_size: args.buffer_size,
        verbose: args.verbose,
        ..ListenerConfig::default()
    };

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\nReceived interrupt, stopping...");
        handler_stop.stop();
    }) {
        error!("Failed to install signal handler: {e}");
    }

    let mut listener = StreamListener::new(config);
    if let Err(e) = listener.bind() {
        error!("Failed to start receiver: {e}");
        return ExitCode::FAILURE;
    }

    println!("Waiting for data from ANTSDR DMA driver...");
    println!("Press Ctrl+C to stop\n");

    match listener.run(&stop) {
        Ok(StopReason::Cancelled) => info!("receiver stopped by user"),
        Ok(StopReason::TransportError(e)) => error!("receiver stopped after socket error: {e}"),
        Err(e) => error!("receiver did not run: {e}"),
    }

    if let Some(counters) = listener.counters() {
        ui::print_final_summary(&final_summary(&counters, Instant::now()));
    }

    ExitCode::SUCCESS
}
