//! Exit codes for CLI operations
//!
//! These follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - the strategy rejected the object
pub const VALIDATION_ERROR: i32 = 2;

/// Manifest error - unreadable YAML or unsupported kind
pub const MANIFEST_ERROR: i32 = 3;

/// Config error - invalid configuration file
pub const CONFIG_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Conflict - stale resourceVersion on update
pub const CONFLICT_ERROR: i32 = 6;

/// Usage error - invalid arguments or options (sysexits.h)
pub const USAGE_ERROR: i32 = 64;
