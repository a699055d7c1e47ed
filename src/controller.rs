//! Typed device operations on top of a [`CommandTransport`].
//!
//! Every operation validates its arguments first and only then relays the
//! encoded command. The controller never retries and never checks that the
//! device actually applied a setting.

use tracing::debug;

use crate::client::{CommandChannel, CommandTransport};
use crate::command::{Command, buffer_size_from_int, mode_from_int};
use crate::config::ControllerConfig;
use crate::errors::SdrError;

#[derive(Debug)]
pub struct DeviceController<T: CommandTransport = CommandChannel> {
    transport: T,
}

impl DeviceController<CommandChannel> {
    /// Opens a control channel to the device described by `config`.
    pub fn connect(config: &ControllerConfig) -> Result<Self, SdrError> {
        Ok(Self::new(CommandChannel::from_config(config)?))
    }
}

impl<T: CommandTransport> DeviceController<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Validates and sends a single command, returning the raw device reply.
    pub fn execute(&mut self, command: &Command) -> Result<String, SdrError> {
        if let Err(e) = command.validate() {
            debug!(command = command.name(), error = %e, "command rejected locally");
            return Err(e);
        }
        self.transport.send(&command.to_string())
    }

    pub fn get_info(&mut self) -> Result<String, SdrError> {
        self.execute(&Command::Info)
    }

    pub fn get_status(&mut self) -> Result<String, SdrError> {
        self.execute(&Command::GetStatus)
    }

    /// Selects the device operating mode; only `0` and `1` exist.
    pub fn set_mode(&mut self, mode: i64) -> Result<String, SdrError> {
        let mode = mode_from_int(mode)?;
        self.execute(&Command::SetMode(mode))
    }

    pub fn get_mode(&mut self) -> Result<String, SdrError> {
        self.execute(&Command::GetMode)
    }

    /// Routes the stream around the PL DAC path when enabled.
    pub fn set_dac_bypass(&mut self, enable: bool) -> Result<String, SdrError> {
        self.execute(&Command::SetDacBypass(enable))
    }

    pub fn get_dac_bypass(&mut self) -> Result<String, SdrError> {
        self.execute(&Command::GetDacBypass)
    }

    /// Sets the DMA transfer size: 512 to 65536 bytes, 4-byte aligned.
    pub fn set_buffer_size(&mut self, size: i64) -> Result<String, SdrError> {
        let size = buffer_size_from_int(size)?;
        self.execute(&Command::SetBuffer(size))
    }

    /// Points the data stream at `ip:port`. The device does its own validation.
    pub fn set_destination(&mut self, ip: &str, port: u16) -> Result<String, SdrError> {
        self.execute(&Command::SetDest {
            ip: ip.to_string(),
            port,
        })
    }

    pub fn start_streaming(&mut self) -> Result<String, SdrError> {
        self.execute(&Command::Start)
    }

    pub fn stop_streaming(&mut self) -> Result<String, SdrError> {
        self.execute(&Command::Stop)
    }

    pub fn get_stats(&mut self) -> Result<String, SdrError> {
        self.execute(&Command::GetStats)
    }

    /// Stops streaming and resets device state.
    pub fn reset(&mut self) -> Result<String, SdrError> {
        self.execute(&Command::Reset)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
