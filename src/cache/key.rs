//! Key Derivation Module
//!
//! Computes a cache key from an operation's logical arguments.
//!
//! The important subtlety lives in the suspending call shape: a suspending
//! operation's underlying call carries one synthetic trailing parameter (a
//! completion token that hands control back to the caller). That token is
//! unique per call and is NOT a logical argument, so it must be stripped
//! before the key is built. Without the strip, two suspending calls with
//! identical logical arguments derive different keys and caching is silently
//! defeated for every suspending operation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CacheError, Result};

// == Key Part ==
/// One logical argument value, compared and hashed structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// Signed integer argument
    Int(i64),
    /// Unsigned integer argument
    Uint(u64),
    /// String argument
    Str(String),
    /// Boolean argument
    Bool(bool),
    /// Synthetic completion token appended by the suspending call shape.
    /// Never part of a derived key.
    Token(u64),
}

impl From<i64> for KeyPart {
    fn from(v: i64) -> Self {
        KeyPart::Int(v)
    }
}

impl From<u64> for KeyPart {
    fn from(v: u64) -> Self {
        KeyPart::Uint(v)
    }
}

impl From<&str> for KeyPart {
    fn from(v: &str) -> Self {
        KeyPart::Str(v.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(v: String) -> Self {
        KeyPart::Str(v)
    }
}

impl From<bool> for KeyPart {
    fn from(v: bool) -> Self {
        KeyPart::Bool(v)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Int(v) => write!(f, "{}", v),
            KeyPart::Uint(v) => write!(f, "{}", v),
            KeyPart::Str(v) => write!(f, "{}", v),
            KeyPart::Bool(v) => write!(f, "{}", v),
            KeyPart::Token(v) => write!(f, "token#{}", v),
        }
    }
}

// == Cache Key ==
/// Derived lookup key for one cached operation call.
///
/// Equality and hashing are structural over the ordered argument values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// No logical arguments
    Unit,
    /// Exactly one logical argument: the key is that value
    Single(KeyPart),
    /// Two or more logical arguments: ordered composite
    Composite(Vec<KeyPart>),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Unit => write!(f, "()"),
            CacheKey::Single(part) => write!(f, "{}", part),
            CacheKey::Composite(parts) => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}

// == Operation Signature ==
/// Token source for suspending call shapes. Each call gets a fresh token,
/// mirroring a runtime that allocates one completion handle per invocation.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// The ordered argument list of one operation call, plus its call shape.
///
/// Used transiently during key derivation; never stored.
#[derive(Debug, Clone)]
pub struct OperationSignature {
    /// Underlying call parameters, in order
    params: Vec<KeyPart>,
    /// True when the call shape appends a trailing completion token
    is_suspending: bool,
}

impl OperationSignature {
    /// Builds the signature of a blocking call: parameters are exactly the
    /// logical arguments.
    pub fn blocking<I, P>(args: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPart>,
    {
        Self {
            params: args.into_iter().map(Into::into).collect(),
            is_suspending: false,
        }
    }

    /// Builds the signature of a suspending call: the logical arguments plus
    /// one fresh completion token as the trailing parameter, matching what
    /// the underlying call actually carries.
    pub fn suspending<I, P>(args: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPart>,
    {
        let mut params: Vec<KeyPart> = args.into_iter().map(Into::into).collect();
        params.push(KeyPart::Token(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)));
        Self {
            params,
            is_suspending: true,
        }
    }

    /// Returns the underlying parameters, in order.
    #[cfg(test)]
    pub fn params(&self) -> &[KeyPart] {
        &self.params
    }
}

// == Derive Key ==
/// Derives the cache key for one operation call.
///
/// Suspending signatures drop exactly their last parameter (the completion
/// token) first. The remaining logical arguments map to the key: zero
/// arguments give the unit key, one argument is used directly, more become
/// an ordered composite.
pub fn derive_key(signature: OperationSignature) -> Result<CacheKey> {
    let mut params = signature.params;

    if signature.is_suspending && params.pop().is_none() {
        return Err(CacheError::InvalidSignature(
            "suspending call shape carries no completion token".to_string(),
        ));
    }

    Ok(match params.len() {
        0 => CacheKey::Unit,
        1 => CacheKey::Single(params.remove(0)),
        _ => CacheKey::Composite(params),
    })
}
