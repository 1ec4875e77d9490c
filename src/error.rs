//! General error types shared across the crate
//!
//! This module contains the small, free-standing error types that do not
//! belong to any one subsystem. Errors specific to parsing, base58,
//! packing, or entrypoint resolution live alongside the code that
//! produces them.

use std::error::Error;
use std::fmt::{Debug, Display};

/// Error type representing all possible conditions for invalidity
/// encountered when attempting to parse a string-type as a series
/// of hex-encoded bytes.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd)]
pub enum HexConvError {
    /// Error case for odd-length strings
    OddParity(String),
    /// Error case for strings containing non-hex characters,
    /// i.e. anything not in `[0-9a-fA-F]`.
    NonHex(String),
}

impl Debug for HexConvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(invalid) => {
                write!(f, "non-even length-parity for string `{}`", invalid)
            }
            Self::NonHex(invalid) => write!(f, "non-hex character found in string `{}`", invalid),
        }
    }
}

impl Display for HexConvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(_) => {
                write!(f, "hex-conversion failed on odd-length string")
            }
            Self::NonHex(_) => {
                write!(f, "hex-conversion failed on non-hex character")
            }
        }
    }
}

impl Error for HexConvError {}
