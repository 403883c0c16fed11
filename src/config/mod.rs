//! Serial line settings and the optional config file
//!
//! Settings come from three places, later ones winning: built-in defaults
//! (9600 baud, 7 data bits, odd parity, one stop bit, the usual HP plotter
//! setup), a TOML file with a `[serial]` table, and command line flags. The
//! operator can also edit each option from the UI.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {option}: {value:?} (expected {expected})")]
    InvalidValue {
        option: &'static str,
        value: String,
        expected: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Parity {
    No,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    pub const NAMES: [&'static str; 5] = ["even", "mark", "no", "odd", "space"];

    pub fn name(self) -> &'static str {
        match self {
            Parity::No => "no",
            Parity::Odd => "odd",
            Parity::Even => "even",
            Parity::Mark => "mark",
            Parity::Space => "space",
        }
    }
}

impl FromStr for Parity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no" => Ok(Parity::No),
            "odd" => Ok(Parity::Odd),
            "even" => Ok(Parity::Even),
            "mark" => Ok(Parity::Mark),
            "space" => Ok(Parity::Space),
            _ => Err(ConfigError::InvalidValue {
                option: "parity",
                value: s.to_string(),
                expected: join_readable(&Parity::NAMES),
            }),
        }
    }
}

impl TryFrom<String> for Parity {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

impl StopBits {
    pub const NAMES: [&'static str; 3] = ["1", "1.5", "2"];

    pub fn name(self) -> &'static str {
        match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        }
    }
}

impl FromStr for StopBits {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(StopBits::One),
            "1.5" => Ok(StopBits::OnePointFive),
            "2" => Ok(StopBits::Two),
            _ => Err(ConfigError::InvalidValue {
                option: "stop bits",
                value: s.to_string(),
                expected: join_readable(&StopBits::NAMES),
            }),
        }
    }
}

impl TryFrom<String> for StopBits {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `["a", "b", "c"]` → `"a, b, or c"`
fn join_readable(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [rest @ .., last] => format!("{}, or {}", rest.join(", "), last),
    }
}

/// The settings the operator can edit from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialOption {
    Port,
    BaudRate,
    DataBits,
    Parity,
    StopBits,
}

impl SerialOption {
    pub const ALL: [SerialOption; 5] = [
        SerialOption::Port,
        SerialOption::BaudRate,
        SerialOption::DataBits,
        SerialOption::Parity,
        SerialOption::StopBits,
    ];

    /// Key that opens the editor for this option
    pub fn key(self) -> char {
        match self {
            SerialOption::Port => 'p',
            SerialOption::BaudRate => 'b',
            SerialOption::DataBits => 'd',
            SerialOption::Parity => 'r',
            SerialOption::StopBits => 't',
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.key() == key)
    }

    pub fn name(self) -> &'static str {
        match self {
            SerialOption::Port => "Port",
            SerialOption::BaudRate => "Baudrate",
            SerialOption::DataBits => "Data bits",
            SerialOption::Parity => "Parity",
            SerialOption::StopBits => "Stop bits",
        }
    }

    pub fn placeholder(self) -> String {
        match self {
            SerialOption::Port => "Path...".to_string(),
            SerialOption::BaudRate => "Baudrate...".to_string(),
            SerialOption::DataBits => "Data bits...".to_string(),
            SerialOption::Parity => format!("Parity ({})...", join_readable(&Parity::NAMES)),
            SerialOption::StopBits => {
                format!("Stop bits ({})...", join_readable(&StopBits::NAMES))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub port: Option<PathBuf>,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for SerialSettings {
    fn default() -> Self {
        SerialSettings {
            port: None,
            baud_rate: 9600,
            data_bits: 7,
            parity: Parity::Odd,
            stop_bits: StopBits::One,
        }
    }
}

impl SerialSettings {
    /// Update one option from operator input. On error nothing changes.
    pub fn set_option(&mut self, option: SerialOption, value: &str) -> Result<(), ConfigError> {
        let invalid = |option, expected: &str| ConfigError::InvalidValue {
            option,
            value: value.to_string(),
            expected: expected.to_string(),
        };

        match option {
            SerialOption::Port => {
                let value = value.trim();
                self.port = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            SerialOption::BaudRate => {
                self.baud_rate = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("baudrate", "a positive integer"))?;
            }
            SerialOption::DataBits => {
                self.data_bits = match value.trim().parse() {
                    Ok(bits @ 5..=8) => bits,
                    _ => return Err(invalid("data bits", "5, 6, 7, or 8")),
                };
            }
            SerialOption::Parity => self.parity = value.parse()?,
            SerialOption::StopBits => self.stop_bits = value.parse()?,
        }
        debug!(option = option.name(), value, "serial option changed");
        Ok(())
    }

    /// Current value of an option, formatted for display.
    pub fn get_option(&self, option: SerialOption) -> String {
        match option {
            SerialOption::Port => self
                .port
                .as_ref()
                .map(|port| port.display().to_string())
                .unwrap_or_default(),
            SerialOption::BaudRate => self.baud_rate.to_string(),
            SerialOption::DataBits => self.data_bits.to_string(),
            SerialOption::Parity => self.parity.to_string(),
            SerialOption::StopBits => self.stop_bits.to_string(),
        }
    }
}

/// Everything read from the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialSettings,
}

impl Config {
    /// Load the config file if one is given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
