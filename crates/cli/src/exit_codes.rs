//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 1    | General error (unspecified)                    |
//! | 2    | Usage error (bad args, bad cell reference)     |
//! | 3    | I/O error (script or config unreadable)        |
//! | 4    | Parse error (script is not valid JSON)         |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or an event naming an invalid cell.
pub const EXIT_USAGE: u8 = 2;

/// A script, settings or keybinding file could not be read.
pub const EXIT_IO: u8 = 3;

/// A script or config file is not valid JSON for its schema.
pub const EXIT_PARSE: u8 = 4;
