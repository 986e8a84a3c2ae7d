//! Utility module
//!
//! This module provides common utilities and helper functions used
//! throughout the library.

use std::fmt::Write;

/// Renders bytes as contiguous uppercase hex, the way packets are usually quoted
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02X}", b);
        out
    })
}
