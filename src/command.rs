//! Control protocol commands.
//!
//! [`Command`] is the closed set of requests the device understands, and its
//! [`Display`](std::fmt::Display) impl is the exact wire line. [`Operation`] is
//! what the command line can ask for: a device command, or one of the local
//! orchestration routines built on top of it.

use std::fmt;
use std::time::Duration;

use crate::errors::SdrError;

/// Smallest DMA buffer the device accepts, in bytes.
pub const MIN_BUFFER_SIZE: u32 = 512;
/// Largest DMA buffer the device accepts, in bytes.
pub const MAX_BUFFER_SIZE: u32 = 65536;
/// Buffer sizes must be a whole number of 32-bit words.
pub const BUFFER_ALIGNMENT: u32 = 4;

/// Monitor duration used when `monitor` is given no usable argument.
pub const DEFAULT_MONITOR_DURATION: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Info,
    GetStatus,
    SetMode(u8),
    GetMode,
    SetDacBypass(bool),
    GetDacBypass,
    SetBuffer(u32),
    SetDest { ip: String, port: u16 },
    Start,
    Stop,
    GetStats,
    Reset,
}

impl Command {
    /// Checks the arguments the device would reject anyway, so they never hit the wire.
    pub fn validate(&self) -> Result<(), SdrError> {
        match self {
            Command::SetMode(mode) if *mode > 1 => Err(SdrError::invalid("Mode must be 0 or 1")),
            Command::SetBuffer(size) if !is_valid_buffer_size(*size) => Err(SdrError::invalid(
                "Buffer size must be 512-65536 bytes, 4-byte aligned",
            )),
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Info => "info",
            Command::GetStatus => "get_status",
            Command::SetMode(_) => "set_mode",
            Command::GetMode => "get_mode",
            Command::SetDacBypass(_) => "set_dac_bypass",
            Command::GetDacBypass => "get_dac_bypass",
            Command::SetBuffer(_) => "set_buffer",
            Command::SetDest { .. } => "set_dest",
            Command::Start => "start",
            Command::Stop => "stop",
            Command::GetStats => "get_stats",
            Command::Reset => "reset",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Command::SetMode(mode) => write!(f, "{name} {mode}"),
            Command::SetDacBypass(enable) => write!(f, "{name} {}", u8::from(*enable)),
            Command::SetBuffer(size) => write!(f, "{name} {size}"),
            Command::SetDest { ip, port } => write!(f, "{name} {ip} {port}"),
            _ => f.write_str(name),
        }
    }
}

pub fn is_valid_buffer_size(size: u32) -> bool {
    (MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&size) && size % BUFFER_ALIGNMENT == 0
}

/// Everything the controller CLI can be asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Device(Command),
    Monitor { duration: Duration },
    TestSequence,
}

impl Operation {
    /// Parses a command word and its arguments as typed on the command line.
    ///
    /// Numeric arguments are parsed here; range checks are left to
    /// [`Command::validate`] so the messages stay identical whichever way a
    /// command is built.
    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> Result<Self, SdrError> {
        let arg = |i: usize| args.get(i).map(|a| a.as_ref());

        let command = match name.to_ascii_lowercase().as_str() {
            "info" => Command::Info,
            "status" => Command::GetStatus,
            "get_mode" => Command::GetMode,
            "get_dac_bypass" => Command::GetDacBypass,
            "start" => Command::Start,
            "stop" => Command::Stop,
            "stats" => Command::GetStats,
            "reset" => Command::Reset,
            "set_mode" => {
                let raw = arg(0)
                    .ok_or_else(|| SdrError::invalid("set_mode requires mode argument (0 or 1)"))?;
                let mode: i64 = raw
                    .parse()
                    .map_err(|_| SdrError::invalid("Mode must be a number (0 or 1)"))?;
                Command::SetMode(mode_from_int(mode)?)
            }
            "set_dac_bypass" => {
                let raw = arg(0).ok_or_else(|| {
                    SdrError::invalid("set_dac_bypass requires enable argument (0 or 1)")
                })?;
                let enable: i64 = raw
                    .parse()
                    .map_err(|_| SdrError::invalid("DAC bypass enable must be a number (0 or 1)"))?;
                match enable {
                    0 => Command::SetDacBypass(false),
                    1 => Command::SetDacBypass(true),
                    _ => return Err(SdrError::invalid("DAC bypass enable must be 0 or 1")),
                }
            }
            "set_buffer" => {
                let raw = arg(0).ok_or_else(|| SdrError::invalid("set_buffer requires size argument"))?;
                let size: i64 = raw
                    .parse()
                    .map_err(|_| SdrError::invalid("Buffer size must be a number"))?;
                Command::SetBuffer(buffer_size_from_int(size)?)
            }
            "set_dest" => {
                let (Some(ip), Some(port)) = (arg(0), arg(1)) else {
                    return Err(SdrError::invalid("set_dest requires IP and port arguments"));
                };
                let port: u16 = port
                    .parse()
                    .map_err(|_| SdrError::invalid("Port must be a number"))?;
                Command::SetDest {
                    ip: ip.to_string(),
                    port,
                }
            }
            "monitor" => {
                // Negative durations monitor for zero seconds.
                let duration = arg(0)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .map(|secs| Duration::from_secs(secs.max(0).unsigned_abs()))
                    .unwrap_or(DEFAULT_MONITOR_DURATION);
                return Ok(Operation::Monitor { duration });
            }
            "test_sequence" => return Ok(Operation::TestSequence),
            _ => return Err(SdrError::UnknownCommand(name.to_string())),
        };

        command.validate()?;
        Ok(Operation::Device(command))
    }
}

pub(crate) fn mode_from_int(mode: i64) -> Result<u8, SdrError> {
    match mode {
        0 | 1 => Ok(mode as u8),
        _ => Err(SdrError::invalid("Mode must be 0 or 1")),
    }
}

pub(crate) fn buffer_size_from_int(size: i64) -> Result<u32, SdrError> {
    u32::try_from(size)
        .ok()
        .filter(|s| is_valid_buffer_size(*s))
        .ok_or_else(|| SdrError::invalid("Buffer size must be 512-65536 bytes, 4-byte aligned"))
}
