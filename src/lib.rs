//! Remote control and stream telemetry for the ANTSDR DMA streaming firmware.
//!
//! The board exposes two UDP flows:
//!
//! - a **control channel** (default port 12346) where every request is one
//!   text line and every reply is one text line, and
//! - a **data stream** (default port 12345) of opaque datagrams pushed by the
//!   board's DMA engine to whatever destination it was configured with.
//!
//! # Details
//!
//! - Use [`DeviceController`] to validate and send typed commands through a
//!   [`CommandChannel`]:
//!
//! ```no_run
//! use std::time::Duration;
//! use antsdr_remote::{CommandChannel, DeviceController};
//!
//! let channel = CommandChannel::new("192.168.1.12", 12346, Duration::from_secs(5))?;
//! let mut controller = DeviceController::new(channel);
//!
//! controller.set_mode(1)?;
//! controller.set_buffer_size(4096)?;
//! controller.set_destination("192.168.1.100", 12345)?;
//! println!("{}", controller.start_streaming()?);
//! # Ok::<(), antsdr_remote::SdrError>(())
//! ```
//!
//! - Use [`StreamListener`] to count what arrives on the data port, and stop it
//!   from anywhere through a [`StopSignal`]:
//!
//! ```no_run
//! use antsdr_remote::{ListenerConfig, StopSignal, StreamListener, final_summary};
//!
//! let stop = StopSignal::new();
//! let mut listener = StreamListener::new(ListenerConfig::default());
//! let (_reason, counters) = listener.listen(&stop)?;
//! let summary = final_summary(&counters, std::time::Instant::now());
//! println!("{} packets, {:.2} Mbps", summary.packets, summary.mbps);
//! # Ok::<(), antsdr_remote::SdrError>(())
//! ```
//!
//! - Rates are pure functions of a counter snapshot:
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use antsdr_remote::{StreamCounters, final_summary};
//!
//! let start = Instant::now();
//! let mut counters = StreamCounters::new(start);
//! for _ in 0..250 {
//!     counters.record(1024, start);
//! }
//!
//! let summary = final_summary(&counters, start + Duration::from_secs(5));
//! assert_eq!(summary.packets_per_sec, 50.0);
//! assert!((summary.mbps - 0.39).abs() < 0.01);
//! ```

mod client;
pub use client::{CommandChannel, CommandTransport};

pub mod command;
pub use command::{Command, Operation};

mod config;
pub use config::{ControllerConfig, ListenerConfig};

mod controller;
pub use controller::DeviceController;

mod errors;
pub use errors::{SdrError, response_text};

mod monitor;
pub use monitor::{MonitorSample, StatsMonitor, run_test_sequence};

mod result;
pub use result::{FinalSummary, InstantRates, StreamCounters, final_summary, instant_rates};

mod server;
pub use server::{ListenerState, StopReason, StreamListener};

mod utils;
pub use utils::net_utils::{StopSignal, hex_prefix};
pub use utils::ui;

// async part
mod async_client;
pub use async_client::AsyncCommandChannel;

/// Default UDP port of the device control channel.
pub const DEFAULT_CONTROL_PORT: u16 = 12346;

/// Default UDP port the data stream is sent to.
pub const DEFAULT_DATA_PORT: u16 = 12345;
