//! Periodic status/stats polling and the scripted bring-up sequence.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::info;

use crate::client::CommandTransport;
use crate::controller::DeviceController;
use crate::errors::response_text;

/// One monitor tick: both replies, or their error strings.
#[derive(Debug, Clone)]
pub struct MonitorSample {
    pub timestamp: DateTime<Local>,
    pub status: String,
    pub stats: String,
}

/// Polls the device for status and statistics at a fixed cadence.
pub struct StatsMonitor<'a, T: CommandTransport> {
    controller: &'a mut DeviceController<T>,
}

impl<'a, T: CommandTransport> StatsMonitor<'a, T> {
    pub fn new(controller: &'a mut DeviceController<T>) -> Self {
        Self { controller }
    }

    /// Blocks for `duration`, querying every `interval` and handing each sample to `emit`.
    ///
    /// Query failures are recorded as `ERROR: ...` text and the loop carries on.
    /// Returns the number of samples taken.
    pub fn monitor<F>(&mut self, duration: Duration, interval: Duration, mut emit: F) -> usize
    where
        F: FnMut(&MonitorSample),
    {
        info!(?duration, ?interval, "monitoring device statistics");
        let start = Instant::now();
        let mut samples = 0;

        while start.elapsed() < duration {
            let stats = response_text(self.controller.get_stats());
            let status = response_text(self.controller.get_status());

            emit(&MonitorSample {
                timestamp: Local::now(),
                status,
                stats,
            });
            samples += 1;

            thread::sleep(interval);
        }

        samples
    }
}

/// Runs the full bring-up script: configure, start, watch, stop, report.
///
/// Each step's outcome is written to `emit` as a human-readable line.
pub fn run_test_sequence<T, F>(
    controller: &mut DeviceController<T>,
    monitor_duration: Duration,
    monitor_interval: Duration,
    mut emit: F,
) where
    T: CommandTransport,
    F: FnMut(&str),
{
    emit("Running test sequence...");

    emit("1. Getting device info...");
    emit(&indent(controller.get_info()));

    emit("2. Setting mode to 1...");
    emit(&indent(controller.set_mode(1)));

    emit("3. Setting buffer size to 4096...");
    emit(&indent(controller.set_buffer_size(4096)));

    emit("4. Setting destination to 192.168.1.100:12345...");
    emit(&indent(controller.set_destination("192.168.1.100", 12345)));

    emit("5. Starting streaming...");
    emit(&indent(controller.start_streaming()));

    emit(&format!(
        "6. Monitoring for {} seconds...",
        monitor_duration.as_secs()
    ));
    StatsMonitor::new(controller).monitor(monitor_duration, monitor_interval, |sample| {
        for line in crate::ui::monitor_lines(sample) {
            emit(&line);
        }
    });

    emit("7. Stopping streaming...");
    emit(&indent(controller.stop_streaming()));

    emit("8. Final statistics...");
    emit(&indent(controller.get_stats()));
}

fn indent(result: Result<String, crate::errors::SdrError>) -> String {
    format!("   {}", response_text(result))
}
