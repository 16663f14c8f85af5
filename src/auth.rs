//! Operator gate in front of course processing.
//!
//! Nothing in [`crate::pipeline`] runs without an [`Operator`], and the only
//! way to get one is through an [`IdentityProvider`].

use std::collections::BTreeSet;

use tracing::{info, warn};

/// What an operator presents to sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An authenticated human operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    name: String,
}

impl Operator {
    /// Mint a capability. Intended for [`IdentityProvider`] implementations.
    pub fn granted(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("operator name is empty")]
    MissingName,
    #[error("operator {0:?} is not allowed to run this tool")]
    NotAllowed(String),
}

pub trait IdentityProvider {
    fn authenticate(&self, credentials: &Credentials) -> Result<Operator, AuthError>;
}

/// Trusts the local account, optionally restricted to an allow-list.
#[derive(Debug, Clone, Default)]
pub struct LocalOperator {
    allowed: BTreeSet<String>,
}

impl LocalOperator {
    /// An empty allow-list admits any non-empty name.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl IdentityProvider for LocalOperator {
    fn authenticate(&self, credentials: &Credentials) -> Result<Operator, AuthError> {
        let name = credentials.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        if !self.allowed.is_empty() && !self.allowed.contains(name) {
            warn!(operator = name, "operator rejected");
            return Err(AuthError::NotAllowed(name.to_string()));
        }
        info!(operator = name, "operator signed in");
        Ok(Operator::granted(name))
    }
}
