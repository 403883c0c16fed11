//! Byte sink the stepping loop writes instructions to

use super::errors::OpenError;
use crate::config::{Parity, SerialSettings, StopBits};
use serialport::SerialPort;
use std::io::{self, Write};
use std::time::Duration;

/// How long a single write may block on a full output buffer.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where stepped instructions are sent.
///
/// Every [`Write`] implementation is a transport, so tests can record into a
/// `Vec<u8>` and the binary can write to a serial port.
pub trait Transport: Send {
    /// Write all of `bytes`, returning how many were written.
    fn send(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Block until everything sent so far has left the process.
    fn sync(&mut self) -> io::Result<()>;
}

impl<W: Write + Send> Transport for W {
    fn send(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.write_all(bytes)?;
        Ok(bytes.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// A serial port configured from [`SerialSettings`].
///
/// `flush` drains the output queue (`tcdrain` on unix), so a step only
/// completes once its bytes have been shifted out of the UART.
pub struct SerialTransport {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn open(settings: &SerialSettings) -> Result<Self, OpenError> {
        let path = settings.port.as_ref().ok_or(OpenError::NoPort)?;
        let name = path.to_string_lossy().into_owned();

        let port = serialport::new(name.as_str(), settings.baud_rate)
            .data_bits(line_data_bits(settings.data_bits)?)
            .parity(line_parity(settings.parity)?)
            .stop_bits(line_stop_bits(settings.stop_bits)?)
            .flow_control(serialport::FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|source| OpenError::Open {
                path: name.clone(),
                source,
            })?;

        Ok(SerialTransport { name, port })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

fn line_data_bits(bits: u8) -> Result<serialport::DataBits, OpenError> {
    match bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        other => Err(OpenError::UnsupportedDataBits(other)),
    }
}

fn line_parity(parity: Parity) -> Result<serialport::Parity, OpenError> {
    match parity {
        Parity::No => Ok(serialport::Parity::None),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Mark | Parity::Space => Err(OpenError::UnsupportedParity(parity)),
    }
}

fn line_stop_bits(stop_bits: StopBits) -> Result<serialport::StopBits, OpenError> {
    match stop_bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OnePointFive => Err(OpenError::UnsupportedStopBits(stop_bits)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_is_a_transport() {
        let mut sink: Vec<u8> = Vec::new();
        assert_eq!(sink.send(b"PU;").unwrap(), 3);
        sink.sync().unwrap();
        assert_eq!(sink, b"PU;");
    }

    #[test]
    fn test_line_settings_map_onto_driver() {
        assert_eq!(line_data_bits(7).unwrap(), serialport::DataBits::Seven);
        assert_eq!(line_parity(Parity::Odd).unwrap(), serialport::Parity::Odd);
        assert_eq!(line_parity(Parity::No).unwrap(), serialport::Parity::None);
        assert_eq!(line_stop_bits(StopBits::Two).unwrap(), serialport::StopBits::Two);
    }

    #[test]
    fn test_unsupported_line_settings_are_rejected() {
        assert!(matches!(
            line_parity(Parity::Mark),
            Err(OpenError::UnsupportedParity(Parity::Mark))
        ));
        assert!(matches!(
            line_stop_bits(StopBits::OnePointFive),
            Err(OpenError::UnsupportedStopBits(StopBits::OnePointFive))
        ));
        assert!(matches!(line_data_bits(9), Err(OpenError::UnsupportedDataBits(9))));
    }

    #[test]
    fn test_open_without_port_fails() {
        let settings = SerialSettings::default();
        assert!(matches!(SerialTransport::open(&settings), Err(OpenError::NoPort)));
    }

    #[test]
    fn test_unsupported_settings_fail_before_touching_the_device() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SerialSettings {
            port: Some(dir.path().join("ttyMissing")),
            parity: Parity::Space,
            ..SerialSettings::default()
        };
        assert!(matches!(
            SerialTransport::open(&settings),
            Err(OpenError::UnsupportedParity(Parity::Space))
        ));
    }

    #[test]
    fn test_open_missing_device_fails() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SerialSettings {
            port: Some(dir.path().join("ttyMissing")),
            ..SerialSettings::default()
        };
        let err = SerialTransport::open(&settings).err().unwrap();
        assert!(matches!(err, OpenError::Open { .. }));
        assert!(err.to_string().contains("ttyMissing"));
    }

    #[test]
    fn test_regular_file_is_not_a_serial_port() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let settings = SerialSettings {
            port: Some(file.path().to_path_buf()),
            ..SerialSettings::default()
        };
        assert!(SerialTransport::open(&settings).is_err());
    }
}
