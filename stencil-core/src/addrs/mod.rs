//! Addresses - Provider and resource addresses
//!
//! Normalizes free-form provider source strings and resource addresses into
//! typed values. This module depends on nothing else in the crate except
//! [`crate::diagnostics`].

mod hostname;
mod provider;
mod resource;

pub use hostname::{BUILTIN_PROVIDER_HOST, DEFAULT_REGISTRY_HOST, Hostname, HostnameError};
pub use provider::{
    BUILTIN_PROVIDER_NAMESPACE, DEFAULT_PROVIDER_NAMESPACE, LEGACY_PROVIDER_NAMESPACE, Provider,
    ProviderKind, ProviderPartError, implied_provider_for_unqualified_type,
    is_provider_part_normalized, must_parse_provider_part, must_parse_provider_source,
    parse_provider_part, parse_provider_source, try_parse_provider_source,
};
pub use resource::{ResourceAddr, ResourceMode};

use crate::diagnostics::Diagnostic;

/// Address parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(
        "The provider source {address:?} must be in the format \"[hostname/][namespace/]name\""
    )]
    MalformedAddress { address: String },

    #[error("Invalid provider type {given:?} in source {address:?}: {cause}")]
    InvalidProviderType {
        address: String,
        given: String,
        cause: ProviderPartError,
    },

    #[error(
        "Provider source {address:?} has a type with the prefix \"terraform-provider-\", which isn't valid. Although that prefix is often used in the names of version control repositories for providers, provider source strings should not include it. Did you mean {suggestion:?}?"
    )]
    RepositoryPrefix { address: String, suggestion: String },

    #[error(
        "Provider source {address:?} has a type with the prefix \"terraform-\", which isn't allowed because it would be redundant to name a provider with that prefix. If you are the author of this provider, rename it to not include the prefix."
    )]
    RedundantPrefix { address: String },

    #[error("Invalid provider namespace {given:?} in source {address:?}: {cause}")]
    InvalidProviderNamespace {
        address: String,
        given: String,
        cause: ProviderPartError,
    },

    #[error(
        "The legacy provider namespace \"-\" in source {address:?} is only valid with the hostname {}",
        DEFAULT_REGISTRY_HOST
    )]
    LegacyNamespace { address: String },

    #[error("Invalid provider source hostname in source {address:?}: {cause}")]
    InvalidHostname {
        address: String,
        cause: HostnameError,
    },

    #[error(
        "The hostname {} and the namespace \"builtin\" are reserved for providers bundled with the tool and may only be used together, but source {address:?} uses only one of them",
        BUILTIN_PROVIDER_HOST
    )]
    BuiltInMismatch { address: String },

    #[error("{address:?} is not a valid resource address: {reason}")]
    InvalidResourceAddress { address: String, reason: String },
}

impl ParseError {
    /// Short summary suitable for a diagnostic headline
    pub fn summary(&self) -> &'static str {
        match self {
            ParseError::MalformedAddress { .. } => "Invalid provider source string",
            ParseError::InvalidProviderType { .. }
            | ParseError::RepositoryPrefix { .. }
            | ParseError::RedundantPrefix { .. } => "Invalid provider type",
            ParseError::InvalidProviderNamespace { .. } | ParseError::LegacyNamespace { .. } => {
                "Invalid provider namespace"
            }
            ParseError::InvalidHostname { .. } | ParseError::BuiltInMismatch { .. } => {
                "Invalid provider source hostname"
            }
            ParseError::InvalidResourceAddress { .. } => "Invalid resource address",
        }
    }

    pub fn detail(&self) -> String {
        self.to_string()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary(), self.detail())
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        err.to_diagnostic()
    }
}
