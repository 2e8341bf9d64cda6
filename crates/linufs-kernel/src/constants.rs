//! Store configuration constants.
//!
//! Centralizes the fixed identifiers and record widths shared by both
//! backends and the admin wire contract.

use std::time::Duration;

/// Root directory identifier of the local backend.
pub const LOCAL_ROOT: u32 = 1000;

/// First identifier handed out by the local arena.
pub const LOCAL_INO_MIN: u32 = 1111;

/// Last identifier handed out by the local arena (inclusive).
pub const LOCAL_INO_MAX: u32 = 2000;

/// Content buffer capacity of a local regular file.
pub const LOCAL_CONTENT_CAPACITY: usize = 100;

/// Root directory identifier used by the admin service.
pub const REMOTE_ROOT: u32 = 1000;

/// Width of the `content` field in a `read_response` record.
pub const REMOTE_CONTENT_CAPACITY: usize = 1024;

/// Width of the fixed, null-padded `name` field in a `list_response` entry.
pub const NAME_FIELD_LEN: usize = 256;

/// Longest name that still leaves room for the terminating NUL.
pub const NAME_MAX_LEN: usize = NAME_FIELD_LEN - 1;

/// Number of entry slots in a `list_response` record.
pub const LIST_MAX_ENTRIES: usize = 8;

/// Wire `type` byte for a directory (`DT_DIR`).
pub const DT_DIR: u8 = 4;

/// Wire `type` byte for a regular file (`DT_REG`).
pub const DT_REG: u8 = 8;

/// RPC target every remote call is addressed to.
pub const ADMIN_TARGET: &str = "admin";

/// Upper bound on a single admin round trip.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(5);
