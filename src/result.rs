//! Running stream counters and the rates derived from them.

use std::time::{Duration, Instant};

const BYTES_PER_MEGABIT: f64 = 1024.0 * 1024.0;

/// Aggregate of everything the receive loop has seen since it started listening.
#[derive(Debug, Clone, Copy)]
pub struct StreamCounters {
    /// Datagrams received, one per successful receive.
    pub packets_received: u64,
    /// Sum of received datagram lengths (after any truncation by the receive buffer).
    pub bytes_received: u64,
    /// When the listener bound its socket.
    pub start_time: Instant,
    /// Arrival time of the most recent datagram.
    pub last_packet_time: Option<Instant>,
}

impl StreamCounters {
    pub fn new(start_time: Instant) -> Self {
        Self {
            packets_received: 0,
            bytes_received: 0,
            start_time,
            last_packet_time: None,
        }
    }

    pub fn record(&mut self, len: usize, at: Instant) {
        self.packets_received += 1;
        self.bytes_received += len as u64;
        self.last_packet_time = Some(at);
    }

    /// Time since the listener started, clamped at zero.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InstantRates {
    pub packets_per_sec: f64,
    pub bytes_per_sec: f64,
    pub mbps: f64,
}

/// Final report of a listening session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalSummary {
    pub packets: u64,
    pub bytes: u64,
    pub elapsed_sec: f64,
    pub packets_per_sec: f64,
    pub mbps: f64,
    pub mean_packet_size: f64,
}

/// Average rates from `start_time` up to `now`.
///
/// Everything is zero until at least one packet has arrived and some time has passed.
pub fn instant_rates(counters: &StreamCounters, now: Instant) -> InstantRates {
    let elapsed = counters.elapsed(now).as_secs_f64();
    if elapsed <= 0.0 || counters.packets_received == 0 {
        return InstantRates::default();
    }

    let bytes_per_sec = counters.bytes_received as f64 / elapsed;
    InstantRates {
        packets_per_sec: counters.packets_received as f64 / elapsed,
        bytes_per_sec,
        mbps: bytes_per_sec * 8.0 / BYTES_PER_MEGABIT,
    }
}

pub fn final_summary(counters: &StreamCounters, now: Instant) -> FinalSummary {
    let rates = instant_rates(counters, now);
    let mean_packet_size = if counters.packets_received > 0 {
        counters.bytes_received as f64 / counters.packets_received as f64
    } else {
        0.0
    };

    FinalSummary {
        packets: counters.packets_received,
        bytes: counters.bytes_received,
        elapsed_sec: counters.elapsed(now).as_secs_f64(),
        packets_per_sec: rates.packets_per_sec,
        mbps: rates.mbps,
        mean_packet_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters_with(packets: u64, packet_size: usize, start: Instant) -> StreamCounters {
        let mut counters = StreamCounters::new(start);
        for _ in 0..packets {
            counters.record(packet_size, start);
        }
        counters
    }

    #[test]
    fn test_five_second_stream_summary() {
        let start = Instant::now();
        let counters = counters_with(250, 1024, start);

        let summary = final_summary(&counters, start + Duration::from_secs(5));

        assert_eq!(summary.packets, 250);
        assert_eq!(summary.bytes, 256_000);
        assert_eq!(summary.elapsed_sec, 5.0);
        assert_eq!(summary.packets_per_sec, 50.0);
        assert!((summary.mbps - 0.390625).abs() < 1e-9);
        assert_eq!(summary.mean_packet_size, 1024.0);
    }

    #[test]
    fn test_rates_zero_without_elapsed_time() {
        let start = Instant::now();
        let counters = counters_with(10, 100, start);
        assert_eq!(instant_rates(&counters, start), InstantRates::default());
    }

    #[test]
    fn test_rates_zero_without_packets() {
        let start = Instant::now();
        let counters = StreamCounters::new(start);
        let rates = instant_rates(&counters, start + Duration::from_secs(3));
        assert_eq!(rates, InstantRates::default());
    }

    #[test]
    fn test_now_before_start_is_not_negative() {
        let start = Instant::now() + Duration::from_secs(1);
        let counters = counters_with(5, 100, start);
        let now = start - Duration::from_millis(500);

        assert_eq!(counters.elapsed(now), Duration::ZERO);
        assert_eq!(instant_rates(&counters, now), InstantRates::default());
    }

    #[test]
    fn test_summary_without_packets_has_zero_mean() {
        let start = Instant::now();
        let counters = StreamCounters::new(start);
        let summary = final_summary(&counters, start + Duration::from_secs(2));

        assert_eq!(summary.packets, 0);
        assert_eq!(summary.mean_packet_size, 0.0);
        assert!(!summary.mean_packet_size.is_nan());
        assert_eq!(summary.mbps, 0.0);
        assert_eq!(summary.elapsed_sec, 2.0);
    }

    #[test]
    fn test_record_accumulates_sizes() {
        let start = Instant::now();
        let mut counters = StreamCounters::new(start);
        let later = start + Duration::from_millis(10);
        for size in [100, 200, 300] {
            counters.record(size, later);
        }
        assert_eq!(counters.packets_received, 3);
        assert_eq!(counters.bytes_received, 600);
        assert_eq!(counters.last_packet_time, Some(later));
    }
}
