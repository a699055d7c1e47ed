use std::io::{Write, stdout};
use std::net::SocketAddr;

use crate::monitor::MonitorSample;
use crate::result::{FinalSummary, InstantRates, StreamCounters};

pub fn print_first_packet(from: SocketAddr, len: usize, preview_hex: &str) {
    println!("First packet received from {from}");
    println!("Packet size: {len} bytes");
    println!("First 16 bytes: {preview_hex}");
    println!();
}

/// Rewrites the current terminal line with the running totals.
pub fn print_progress(counters: &StreamCounters, rates: &InstantRates) {
    print!(
        "\rPackets: {:6} | Bytes: {:8} | Rate: {:6.1} pkt/s | Throughput: {:6.2} Mbps",
        counters.packets_received, counters.bytes_received, rates.packets_per_sec, rates.mbps
    );
    let _ = stdout().flush();
}

pub fn print_final_summary(summary: &FinalSummary) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("Final Statistics:");
    println!("{rule}");
    println!("Total packets received: {}", summary.packets);
    println!("Total bytes received:   {}", summary.bytes);
    println!("Test duration:          {:.2} seconds", summary.elapsed_sec);

    if summary.elapsed_sec > 0.0 {
        println!(
            "Average packet rate:    {:.1} packets/second",
            summary.packets_per_sec
        );
        println!("Average throughput:     {:.2} Mbps", summary.mbps);
        println!("Average packet size:    {:.1} bytes", summary.mean_packet_size);
    }
}

pub fn monitor_lines(sample: &MonitorSample) -> [String; 3] {
    let ts = sample.timestamp.format("%H:%M:%S");
    [
        format!("[{ts}] {}", sample.status),
        format!("[{ts}] {}", sample.stats),
        "-".repeat(50),
    ]
}

pub fn print_monitor_sample(sample: &MonitorSample) {
    for line in monitor_lines(sample) {
        println!("{line}");
    }
}

pub fn print_usage() {
    println!("\nAvailable commands:");
    println!("  info                    - Get device information");
    println!("  status                  - Get current status");
    println!("  set_mode <0|1>          - Set operation mode");
    println!("  get_mode                - Get current mode");
    println!("  set_dac_bypass <0|1>    - Enable/disable PL DAC bypass");
    println!("  get_dac_bypass          - Get DAC bypass status");
    println!("  set_buffer <size>       - Set buffer size");
    println!("  set_dest <ip> <port>    - Set destination");
    println!("  start                   - Start streaming");
    println!("  stop                    - Stop streaming");
    println!("  stats                   - Get statistics");
    println!("  reset                   - Reset and stop");
    println!("  monitor [duration]      - Monitor stats");
    println!("  test_sequence           - Run full test");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_monitor_lines_are_timestamped() {
        let sample = MonitorSample {
            timestamp: Local.with_ymd_and_hms(2024, 5, 1, 13, 4, 5).unwrap(),
            status: "STATUS: streaming".into(),
            stats: "ERROR: Timeout - no response from 10.0.0.2:12346".into(),
        };

        let lines = monitor_lines(&sample);
        assert_eq!(lines[0], "[13:04:05] STATUS: streaming");
        assert_eq!(
            lines[1],
            "[13:04:05] ERROR: Timeout - no response from 10.0.0.2:12346"
        );
        assert_eq!(lines[2].len(), 50);
    }
}
