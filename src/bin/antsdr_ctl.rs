//! ANTSDR remote control client.
//!
//! Usage:
//!   antsdr-ctl <board_ip> [command] [args...] [--port P] [--timeout T]
//!
//! Examples:
//!   antsdr-ctl 192.168.1.12 info
//!   antsdr-ctl 192.168.1.12 set_mode 1
//!   antsdr-ctl 192.168.1.12 set_dac_bypass 1
//!   antsdr-ctl 192.168.1.12 monitor 30

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use antsdr_remote::{
    ControllerConfig, DEFAULT_CONTROL_PORT, DeviceController, Operation, SdrError, StatsMonitor,
    response_text, run_test_sequence, ui,
};

const MONITOR_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "antsdr-ctl")]
#[command(about = "ANTSDR Remote Control Client")]
struct Args {
    /// IP address of ANTSDR board
    board_ip: String,

    /// Command to execute
    #[arg(default_value = "info")]
    command: String,

    /// Command arguments
    #[arg(allow_negative_numbers = true)]
    args: Vec<String>,

    /// Control port
    #[arg(long, default_value_t = DEFAULT_CONTROL_PORT)]
    port: u16,

    /// Response timeout in seconds
    #[arg(long, default_value_t = 5.0)]
    timeout: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let (operation, mut controller) = match prepare(&args) {
        Ok(ready) => ready,
        Err(e) => {
            if matches!(e, SdrError::UnknownCommand(_)) {
                ui::print_usage();
            }
            println!("{}", e.to_response());
            return Ok(());
        }
    };

    match operation {
        Operation::Device(command) => {
            println!("{}", response_text(controller.execute(&command)));
        }
        Operation::Monitor { duration } => {
            println!("Monitoring statistics for {} seconds...", duration.as_secs());
            StatsMonitor::new(&mut controller).monitor(duration, MONITOR_INTERVAL, ui::print_monitor_sample);
        }
        Operation::TestSequence => {
            run_test_sequence(
                &mut controller,
                Duration::from_secs(10),
                MONITOR_INTERVAL,
                |line| println!("{line}"),
            );
        }
    }

    Ok(())
}

/// Parses the requested operation, then opens the control channel.
///
/// The command is checked first so usage and argument errors are reported
/// whether or not the board address resolves.
fn prepare(args: &Args) -> Result<(Operation, DeviceController), SdrError> {
    let operation = Operation::parse(&args.command, &args.args)?;

    if !(args.timeout.is_finite() && args.timeout > 0.0) {
        return Err(SdrError::InvalidArgument(
            "Timeout must be a positive number of seconds".into(),
        ));
    }

    let config = ControllerConfig {
        host: args.board_ip.clone(),
        port: args.port,
        timeout: Duration::from_secs_f64(args.timeout),
    };
    let controller = DeviceController::connect(&config)?;

    Ok((operation, controller))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A host with an interior NUL fails to resolve without touching DNS.
    const BAD_HOST: &str = "bad\0host";

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("antsdr-ctl").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_unknown_command_reported_before_connecting() {
        let result = prepare(&args(&[BAD_HOST, "bogus"]));
        assert!(matches!(result, Err(SdrError::UnknownCommand(name)) if name == "bogus"));
    }

    #[test]
    fn test_argument_errors_reported_before_connecting() {
        let err = prepare(&args(&[BAD_HOST, "set_buffer", "500"])).err().unwrap();
        assert_eq!(
            err.to_response(),
            "ERROR: Buffer size must be 512-65536 bytes, 4-byte aligned"
        );
    }

    #[test]
    fn test_unresolvable_host_is_an_error_line() {
        let err = prepare(&args(&[BAD_HOST, "info"])).err().unwrap();
        assert!(matches!(err, SdrError::InvalidAddress(_)));
        assert!(err.to_response().starts_with("ERROR: "));
    }

    #[test]
    fn test_non_positive_timeout_is_rejected() {
        let err = prepare(&args(&["127.0.0.1", "info", "--timeout", "0"]))
            .err()
            .unwrap();
        assert!(matches!(err, SdrError::InvalidArgument(_)));
    }

    #[test]
    fn test_valid_request_connects() {
        let (operation, controller) = prepare(&args(&["127.0.0.1", "set_mode", "1"])).unwrap();
        assert_eq!(operation, Operation::Device(antsdr_remote::Command::SetMode(1)));
        assert_eq!(controller.transport().target().port(), DEFAULT_CONTROL_PORT);
    }
}
