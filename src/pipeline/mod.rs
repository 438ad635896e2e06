//! Shared plumbing for the command handlers.
//!
//! Loading inputs, writing outputs, and the process exit codes every
//! command reports through.

mod output;
mod parse;

pub use output::{write_output, OutputTarget};
pub use parse::{load_bom, read_input, resolve_input_format, resolve_output_format};

/// Process exit codes.
///
/// The values are part of the command-line contract and never change.
pub mod exit_codes {
    /// Success
    pub const OK: i32 = 0;
    /// The command ran but its check failed (invalid BOM, entity not found)
    pub const OK_FAIL: i32 = 1;
    /// An input could not be read or an output could not be written
    pub const IO_ERROR: i32 = 2;
    /// Invalid or missing arguments
    pub const PARAMETER_VALIDATION_ERROR: i32 = 3;
    /// Format or format/version pair not supported by the operation
    pub const UNSUPPORTED_FORMAT: i32 = 4;
    /// Reserved for signature verification
    pub const SIGNATURE_NOT_FOUND: i32 = 5;
    /// Reserved for signature verification
    pub const SIGNATURE_FAILED_VERIFICATION: i32 = 6;
}

#[cfg(test)]
mod tests {
    use super::exit_codes::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(OK, 0);
        assert_eq!(OK_FAIL, 1);
        assert_eq!(IO_ERROR, 2);
        assert_eq!(PARAMETER_VALIDATION_ERROR, 3);
        assert_eq!(UNSUPPORTED_FORMAT, 4);
        assert_eq!(SIGNATURE_NOT_FOUND, 5);
        assert_eq!(SIGNATURE_FAILED_VERIFICATION, 6);
    }
}
