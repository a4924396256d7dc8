//! Output buffers for synthesized audio

use super::MemoryPolicy;
use crate::config::PropertySource;
use crate::Result;
use log::{debug, warn};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::str::FromStr;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Property selecting where audio output is buffered
pub const AUDIO_STORE_PROPERTY: &str = "synthesis.audiostore";

static GLOBAL: OnceCell<DestinationSelector> = OnceCell::new();

/// Where new output buffers should live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Always in memory
    Ram,
    /// Always in a temporary file
    File,
    /// In a file while memory is low, otherwise in memory
    Auto,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ram" => Ok(OutputMode::Ram),
            "file" => Ok(OutputMode::File),
            "auto" => Ok(OutputMode::Auto),
            other => Err(format!("Unknown audio store '{}'", other)),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputMode::Ram => "ram",
            OutputMode::File => "file",
            OutputMode::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// A buffer that audio data is written into
///
/// The creator owns it; nothing here pools or cleans up destinations.
/// File-backed buffers use an anonymous temporary file that the OS removes
/// once it is dropped.
pub enum AudioDestination {
    Memory(Vec<u8>),
    File { file: File, len: u64 },
}

impl AudioDestination {
    /// Create an in-memory or file-backed destination
    pub fn new(in_ram: bool) -> io::Result<Self> {
        if in_ram {
            Ok(AudioDestination::Memory(Vec::new()))
        } else {
            let file = tempfile::tempfile()?;
            Ok(AudioDestination::File { file, len: 0 })
        }
    }

    pub fn is_in_ram(&self) -> bool {
        matches!(self, AudioDestination::Memory(_))
    }

    /// Number of bytes written so far
    pub fn len(&self) -> u64 {
        match self {
            AudioDestination::Memory(buf) => buf.len() as u64,
            AudioDestination::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read back everything written
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            AudioDestination::Memory(buf) => Ok(buf),
            AudioDestination::File { mut file, len } => {
                file.flush()?;
                file.seek(SeekFrom::Start(0))?;
                let mut buf = Vec::with_capacity(len as usize);
                file.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl Write for AudioDestination {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self {
            AudioDestination::Memory(buf) => buf.write(data),
            AudioDestination::File { file, len } => {
                let n = file.write(data)?;
                *len += n as u64;
                Ok(n)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            AudioDestination::Memory(_) => Ok(()),
            AudioDestination::File { file, .. } => file.flush(),
        }
    }
}

impl fmt::Debug for AudioDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioDestination")
            .field("in_ram", &self.is_in_ram())
            .field("len", &self.len())
            .finish()
    }
}

/// Chooses memory or file backing for new destinations
pub struct DestinationSelector {
    mode: OutputMode,
    policy: Arc<MemoryPolicy>,
}

impl DestinationSelector {
    /// Read the output mode from configuration (default `ram`)
    ///
    /// The mode is fixed for the lifetime of the selector. Unrecognised
    /// values behave as `auto`.
    pub fn from_config(properties: &dyn PropertySource, policy: Arc<MemoryPolicy>) -> Self {
        let raw = properties
            .get_property(AUDIO_STORE_PROPERTY)
            .unwrap_or_else(|| "ram".to_string());
        let mode = raw.parse().unwrap_or_else(|e| {
            warn!("{}; falling back to auto", e);
            OutputMode::Auto
        });
        debug!("Audio store mode: {}", mode);
        Self::new(mode, policy)
    }

    /// The process-wide selector
    ///
    /// `synthesis.audiostore` is read on the first call only; the mode then
    /// stays fixed for the life of the process.
    pub fn global(properties: &dyn PropertySource, policy: Arc<MemoryPolicy>) -> &'static Self {
        GLOBAL.get_or_init(|| Self::from_config(properties, policy))
    }

    pub fn new(mode: OutputMode, policy: Arc<MemoryPolicy>) -> Self {
        Self { mode, policy }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Create a destination according to the mode and current memory state
    pub fn create_destination(&self) -> Result<AudioDestination> {
        let in_ram = match self.mode {
            OutputMode::Ram => true,
            OutputMode::File => false,
            OutputMode::Auto => !self.policy.is_low_memory(),
        };
        Ok(AudioDestination::new(in_ram)?)
    }
}
