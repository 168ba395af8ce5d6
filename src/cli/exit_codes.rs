//! exit codes for dynif commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

#![allow(dead_code)]

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// content file or directory not found
pub const CONTENT_NOT_FOUND: i32 = 2;

/// context or attributes input could not be decoded
pub const MALFORMED_INPUT: i32 = 3;

/// invalid command-line arguments
pub const INVALID_ARGS: i32 = 4;

/// configuration file error
pub const CONFIG_ERROR: i32 = 5;

/// a batch run finished with per-item failures
pub const PARTIAL_FAILURE: i32 = 6;
