//! Provider - Fully-qualified provider addresses
//!
//! A provider is identified by `hostname/namespace/type`. Two namespaces are
//! special and only valid on one particular host each:
//!
//! - `builtin` on `terraform.io` marks providers bundled with the tool itself
//! - `-` on `registry.terraform.io` marks legacy addresses whose real namespace
//!   must be looked up in an external compatibility table
//!
//! [`Provider`] keeps these as separate variants so that a `builtin` namespace
//! on some other host cannot be constructed.

use std::cmp::Ordering;
use std::fmt;

use log::debug;
use thiserror::Error;

use super::ParseError;
use super::hostname::{BUILTIN_PROVIDER_HOST, DEFAULT_REGISTRY_HOST, Hostname, is_dns_label};
use crate::diagnostics::{Diagnostic, Diagnostics};

/// Namespace of providers bundled with the tool
pub const BUILTIN_PROVIDER_NAMESPACE: &str = "builtin";

/// Namespace marker for legacy provider addresses
pub const LEGACY_PROVIDER_NAMESPACE: &str = "-";

/// Namespace assumed for unqualified provider type names
pub const DEFAULT_PROVIDER_NAMESPACE: &str = "hashicorp";

/// Type name that implies the built-in provider rather than a registry package
const BUILTIN_TYPE_NAME: &str = "terraform";

/// Prefix no provider type may carry
const REDUNDANT_PREFIX: &str = "terraform-";

/// Prefix used by provider source repositories, never part of a type name
const REPOSITORY_PREFIX: &str = "terraform-provider-";

/// Invalid namespace or type token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderPartError {
    #[error("must have at least one character")]
    Empty,

    #[error("{0:?} contains dots, which are not allowed")]
    ContainsDot(String),

    #[error(
        "{0:?} must contain only letters, digits, and dashes, and may not use leading or trailing dashes"
    )]
    InvalidCharacters(String),
}

/// Normalize a namespace or type token the way a DNS label is normalized.
///
/// The token is lowercased and must then consist of letters, digits and
/// dashes, with no dash at either end. Passing the result back in returns it
/// unchanged.
pub fn parse_provider_part(given: &str) -> Result<String, ProviderPartError> {
    if given.is_empty() {
        return Err(ProviderPartError::Empty);
    }
    if given.contains('.') {
        return Err(ProviderPartError::ContainsDot(given.to_string()));
    }

    let folded = given.to_lowercase();
    if is_dns_label(&folded) {
        Ok(folded)
    } else {
        Err(ProviderPartError::InvalidCharacters(given.to_string()))
    }
}

/// Like [`parse_provider_part`], but panics on invalid input.
///
/// Only for tokens that are constants in the program.
pub fn must_parse_provider_part(given: &str) -> String {
    match parse_provider_part(given) {
        Ok(part) => part,
        Err(e) => panic!("invalid provider part {:?}: {}", given, e),
    }
}

/// Returns true if `given` is already in normalized form
pub fn is_provider_part_normalized(given: &str) -> Result<bool, ProviderPartError> {
    Ok(parse_provider_part(given)? == given)
}

/// The variants of a provider address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// A provider distributed by a registry host
    Registry {
        hostname: Hostname,
        namespace: String,
        type_name: String,
    },
    /// A provider bundled with the tool (`terraform.io/builtin/<type>`)
    BuiltIn { type_name: String },
    /// A legacy address (`registry.terraform.io/-/<type>`)
    Legacy { type_name: String },
}

/// Fully-qualified provider address
///
/// Equality and hashing are structural, so values can be used as map keys.
/// All constructors validate and normalize their parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Provider {
    kind: ProviderKind,
}

impl Provider {
    /// Build a provider address from already-normalized hostname and raw
    /// namespace/type parts.
    ///
    /// # Panics
    ///
    /// Panics if the namespace or type are invalid, or if the combination is
    /// reserved. Use [`Provider::try_new`] for values from outside the program.
    pub fn new(hostname: Hostname, namespace: &str, type_name: &str) -> Self {
        match Self::try_new(hostname, namespace, type_name) {
            Ok(provider) => provider,
            Err(e) => panic!("{}", e),
        }
    }

    /// Build a provider address from parts, normalizing namespace and type.
    pub fn try_new(
        hostname: Hostname,
        namespace: &str,
        type_name: &str,
    ) -> Result<Self, ParseError> {
        let address = format!("{}/{}/{}", hostname, namespace, type_name);
        let type_name =
            parse_provider_part(type_name).map_err(|cause| ParseError::InvalidProviderType {
                address: address.clone(),
                given: type_name.to_string(),
                cause,
            })?;
        resolve(hostname, namespace, type_name, &address)
    }

    /// `registry.terraform.io/hashicorp/<type>`
    ///
    /// # Panics
    ///
    /// Panics if `type_name` is not a valid provider part.
    pub fn new_default(type_name: &str) -> Self {
        Self {
            kind: ProviderKind::Registry {
                hostname: DEFAULT_REGISTRY_HOST.clone(),
                namespace: DEFAULT_PROVIDER_NAMESPACE.to_string(),
                type_name: must_parse_provider_part(type_name),
            },
        }
    }

    /// `terraform.io/builtin/<type>`
    ///
    /// # Panics
    ///
    /// Panics if `type_name` is not a valid provider part.
    pub fn new_builtin(type_name: &str) -> Self {
        Self {
            kind: ProviderKind::BuiltIn {
                type_name: must_parse_provider_part(type_name),
            },
        }
    }

    /// `registry.terraform.io/-/<type>`
    ///
    /// # Panics
    ///
    /// Panics if `type_name` is not a valid provider part.
    pub fn new_legacy(type_name: &str) -> Self {
        Self {
            kind: ProviderKind::Legacy {
                type_name: must_parse_provider_part(type_name),
            },
        }
    }

    pub fn kind(&self) -> &ProviderKind {
        &self.kind
    }

    pub fn hostname(&self) -> &Hostname {
        match &self.kind {
            ProviderKind::Registry { hostname, .. } => hostname,
            ProviderKind::BuiltIn { .. } => &BUILTIN_PROVIDER_HOST,
            ProviderKind::Legacy { .. } => &DEFAULT_REGISTRY_HOST,
        }
    }

    pub fn namespace(&self) -> &str {
        match &self.kind {
            ProviderKind::Registry { namespace, .. } => namespace,
            ProviderKind::BuiltIn { .. } => BUILTIN_PROVIDER_NAMESPACE,
            ProviderKind::Legacy { .. } => LEGACY_PROVIDER_NAMESPACE,
        }
    }

    pub fn type_name(&self) -> &str {
        match &self.kind {
            ProviderKind::Registry { type_name, .. }
            | ProviderKind::BuiltIn { type_name }
            | ProviderKind::Legacy { type_name } => type_name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, ProviderKind::BuiltIn { .. })
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self.kind, ProviderKind::Legacy { .. })
    }

    /// Returns true for `registry.terraform.io/hashicorp/*`
    pub fn is_default(&self) -> bool {
        matches!(
            &self.kind,
            ProviderKind::Registry { hostname, namespace, .. }
                if *hostname == DEFAULT_REGISTRY_HOST && namespace == DEFAULT_PROVIDER_NAMESPACE
        )
    }

    /// Short form for messages: the hostname is left out when it is the
    /// default registry host (e.g., `hashicorp/aws`).
    pub fn for_display(&self) -> String {
        if *self.hostname() == DEFAULT_REGISTRY_HOST {
            format!("{}/{}", self.namespace(), self.type_name())
        } else {
            self.to_string()
        }
    }

    /// The bare type name, for addresses that older tooling identified by type
    /// alone (legacy and default providers). `None` for everything else.
    pub fn legacy_string(&self) -> Option<&str> {
        if self.is_legacy() || self.is_default() {
            Some(self.type_name())
        } else {
            None
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.hostname(),
            self.namespace(),
            self.type_name()
        )
    }
}

impl PartialOrd for Provider {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Provider {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hostname()
            .cmp(other.hostname())
            .then_with(|| self.namespace().cmp(other.namespace()))
            .then_with(|| self.type_name().cmp(other.type_name()))
    }
}

/// The provider a user most likely meant by a bare type name.
///
/// `terraform` maps to the built-in provider (`terraform.io/builtin/terraform`)
/// since the registry package of the same name is unmaintained. Every other
/// name maps to `registry.terraform.io/hashicorp/<name>`.
///
/// # Panics
///
/// Panics if `type_name` is not a valid provider part. Input from outside the
/// program should go through [`parse_provider_source`] instead.
pub fn implied_provider_for_unqualified_type(type_name: &str) -> Provider {
    let type_name = must_parse_provider_part(type_name);
    if type_name == BUILTIN_TYPE_NAME {
        Provider::new_builtin(&type_name)
    } else {
        Provider::new_default(&type_name)
    }
}

/// Parse `name`, `namespace/name` or `hostname/namespace/name`.
///
/// A bare name goes through [`implied_provider_for_unqualified_type`]; a
/// missing hostname defaults to [`DEFAULT_REGISTRY_HOST`].
pub fn try_parse_provider_source(given: &str) -> Result<Provider, ParseError> {
    let malformed = || ParseError::MalformedAddress {
        address: given.to_string(),
    };

    let parts: Vec<&str> = given.split('/').collect();
    if parts.len() > 3 || parts.iter().any(|part| part.is_empty()) {
        return Err(malformed());
    }

    let given_type = parts[parts.len() - 1];
    let type_name =
        parse_provider_part(given_type).map_err(|cause| ParseError::InvalidProviderType {
            address: given.to_string(),
            given: given_type.to_string(),
            cause,
        })?;
    if type_name.starts_with(REDUNDANT_PREFIX) {
        // Suggest the stripped type only when it would itself be valid
        if let Some(stripped) = type_name.strip_prefix(REPOSITORY_PREFIX)
            && parse_provider_part(stripped).is_ok()
        {
            let leading = &given[..given.len() - given_type.len()];
            return Err(ParseError::RepositoryPrefix {
                address: given.to_string(),
                suggestion: format!("{}{}", leading, stripped),
            });
        }
        return Err(ParseError::RedundantPrefix {
            address: given.to_string(),
        });
    }

    let provider = match parts.as_slice() {
        [_] => implied_provider_for_unqualified_type(&type_name),
        [namespace, _] => resolve(DEFAULT_REGISTRY_HOST.clone(), namespace, type_name, given)?,
        [host, namespace, _] => {
            let hostname =
                Hostname::for_comparison(host).map_err(|cause| ParseError::InvalidHostname {
                    address: given.to_string(),
                    cause,
                })?;
            resolve(hostname, namespace, type_name, given)?
        }
        _ => return Err(malformed()),
    };

    debug!("resolved provider source {:?} to {}", given, provider);
    Ok(provider)
}

/// Parse a provider source string, reporting problems as diagnostics.
///
/// Returns `None` together with at least one error diagnostic when the string
/// is not a valid provider source. A legacy address parses, but comes with a
/// warning.
pub fn parse_provider_source(given: &str) -> (Option<Provider>, Diagnostics) {
    match try_parse_provider_source(given) {
        Ok(provider) => {
            let mut diags = Diagnostics::new();
            if let Some(type_name) = provider.legacy_string() {
                diags.push(Diagnostic::warning(
                    "Legacy provider address",
                    format!(
                        "Provider source {:?} uses the legacy namespace \"-\", which only exists for upgrading old state. Use {:?} instead.",
                        given,
                        Provider::new_default(type_name).for_display()
                    ),
                ));
            }
            (Some(provider), diags)
        }
        Err(e) => (None, Diagnostics::from(e.to_diagnostic())),
    }
}

/// Like [`parse_provider_source`], but panics on any error.
///
/// Only for provider sources that are constants in the program, never for
/// user input.
pub fn must_parse_provider_source(given: &str) -> Provider {
    match try_parse_provider_source(given) {
        Ok(provider) => provider,
        Err(e) => panic!("{}", e.to_diagnostic()),
    }
}

/// Pick the provider variant for a hostname, a raw namespace and a normalized
/// type name.
fn resolve(
    hostname: Hostname,
    namespace: &str,
    type_name: String,
    address: &str,
) -> Result<Provider, ParseError> {
    if namespace == LEGACY_PROVIDER_NAMESPACE {
        return if hostname == DEFAULT_REGISTRY_HOST {
            Ok(Provider {
                kind: ProviderKind::Legacy { type_name },
            })
        } else {
            Err(ParseError::LegacyNamespace {
                address: address.to_string(),
            })
        };
    }

    let namespace =
        parse_provider_part(namespace).map_err(|cause| ParseError::InvalidProviderNamespace {
            address: address.to_string(),
            given: namespace.to_string(),
            cause,
        })?;

    let builtin_host = hostname == BUILTIN_PROVIDER_HOST;
    let builtin_namespace = namespace == BUILTIN_PROVIDER_NAMESPACE;
    let kind = match (builtin_host, builtin_namespace) {
        (true, true) => ProviderKind::BuiltIn { type_name },
        (false, false) => ProviderKind::Registry {
            hostname,
            namespace,
            type_name,
        },
        _ => {
            return Err(ParseError::BuiltInMismatch {
                address: address.to_string(),
            });
        }
    };
    Ok(Provider { kind })
}
