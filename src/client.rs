//! Typed seams toward the collaborators this crate does not implement
//!
//! The codec layer produces signing preimages and consumes contract
//! scripts, but neither holds keys nor speaks HTTP. Those concerns live
//! behind the two traits here: a [`Signer`] wraps whatever cryptographic
//! backend the application uses, and a [`ScriptSource`] wraps the RPC
//! query that resolves a contract's current script. Both are synchronous
//! from the core's point of view; an async transport awaits its work
//! before calling in.

use crate::crypto::{Address, Signature};
use crate::operation::Script;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by a [`Signer`] backend
#[derive(Debug)]
pub enum SignerError {
    /// The backend refused to sign (locked device, rejected prompt, …)
    Refused,
    /// Any backend-specific failure
    Backend(Box<dyn Error + Send + Sync>),
}

impl Display for SignerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SignerError::Refused => write!(f, "signing backend refused the request"),
            SignerError::Backend(err) => write!(f, "signing backend failed: {err}"),
        }
    }
}

impl Error for SignerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SignerError::Refused => None,
            SignerError::Backend(err) => Some(err.as_ref()),
        }
    }
}

/// Cryptographic signing provider over pre-image bytes produced by this
/// crate
pub trait Signer {
    /// Signs the given message bytes.
    fn sign(&self, message: &[u8]) -> Result<Signature, SignerError>;

    /// Checks a signature over the given message bytes.
    fn verify(&self, message: &[u8], signature: &Signature) -> bool;
}

/// Failure reported by a [`ScriptSource`]
#[derive(Debug)]
pub enum ScriptSourceError {
    /// No contract exists at the given address
    NotFound(String),
    /// Any transport-specific failure
    Backend(Box<dyn Error + Send + Sync>),
}

impl Display for ScriptSourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptSourceError::NotFound(address) => {
                write!(f, "no contract found at {address}")
            }
            ScriptSourceError::Backend(err) => write!(f, "script lookup failed: {err}"),
        }
    }
}

impl Error for ScriptSourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScriptSourceError::NotFound(_) => None,
            ScriptSourceError::Backend(err) => Some(err.as_ref()),
        }
    }
}

/// Resolver of a contract's current script, typically backed by an RPC
/// client
pub trait ScriptSource {
    /// Returns the script deployed at `contract`.
    fn script(&self, contract: &Address) -> Result<Script, ScriptSourceError>;
}
