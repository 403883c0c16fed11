//! The instruction unit produced by the lexer

use std::fmt;

/// Commands whose argument runs until the label terminator instead of `;`.
pub const LABEL_COMMANDS: [&str; 2] = ["LB", "BL"];

/// Command that replaces the label terminator.
pub const DEFINE_TERMINATOR: &str = "DT";

/// One parsed HP-GL command.
///
/// `source` holds the exact bytes the instruction was lexed from (minus
/// newlines). It is what gets written to the device, so it is kept as raw
/// bytes rather than text. `argument` is the text view of `argument_bytes`;
/// anything that needs exact bytes (the `DT` terminator) reads the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub command: String,
    pub argument: String,
    pub argument_bytes: Vec<u8>,
    pub source: Vec<u8>,
}

impl Instruction {
    /// Build an instruction, normalizing the command to upper case.
    pub fn new(command: &str, argument: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        let argument = argument.into();
        Instruction {
            command: command.to_ascii_uppercase(),
            argument_bytes: argument.clone().into_bytes(),
            argument,
            source: source.into(),
        }
    }

    /// Build an instruction from lexed bytes, which need not be UTF-8.
    pub fn from_bytes(command: &[u8], argument: Vec<u8>, source: Vec<u8>) -> Self {
        Instruction {
            command: String::from_utf8_lossy(command).to_ascii_uppercase(),
            argument: String::from_utf8_lossy(&argument).into_owned(),
            argument_bytes: argument,
            source,
        }
    }

    /// Whether the argument is terminator-delimited label text.
    pub fn is_label(&self) -> bool {
        is_label_command(&self.command)
    }
}

/// Case-insensitive check against [`LABEL_COMMANDS`].
pub fn is_label_command(command: &str) -> bool {
    LABEL_COMMANDS
        .iter()
        .any(|label| label.eq_ignore_ascii_case(command))
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.argument.is_empty() {
            write!(f, "{};", self.command)
        } else if self.is_label() {
            // Label text can hold control bytes, show them escaped
            write!(f, "{} {:?};", self.command, self.argument)
        } else {
            write!(f, "{} {};", self.command, self.argument)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_uppercased() {
        let instruction = Instruction::new("pa", "1,2", "pa1,2;");
        assert_eq!(instruction.command, "PA");
        assert_eq!(instruction.source, b"pa1,2;");
    }

    #[test]
    fn test_from_bytes_keeps_raw_argument() {
        let instruction = Instruction::from_bytes(b"dt", vec![0xff], b"dt\xff;".to_vec());
        assert_eq!(instruction.command, "DT");
        assert_eq!(instruction.argument, "\u{fffd}");
        assert_eq!(instruction.argument_bytes, vec![0xffu8]);
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Instruction::new("IN", "", "IN;").to_string(), "IN;");
        assert_eq!(Instruction::new("PA", "10,20", "PA10,20;").to_string(), "PA 10,20;");
        assert_eq!(
            Instruction::new("LB", "Hi\u{3}", "LBHi\u{3}").to_string(),
            "LB \"Hi\\u{3}\";"
        );
    }

    #[test]
    fn test_label_detection_ignores_case() {
        assert!(is_label_command("lb"));
        assert!(is_label_command("BL"));
        assert!(!is_label_command("PA"));
    }
}
