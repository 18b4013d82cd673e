//! Hostname - Normalized service hostnames
//!
//! The first part of a fully-qualified provider address is the hostname of the
//! registry that distributes it. Hostnames are compared after IDNA processing
//! (Unicode case mapping to lowercase ASCII, punycode for non-ASCII labels), so
//! `Registry.Example.COM` and `registry.example.com` are the same host.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Host;

/// Hostname used for provider addresses that do not give one explicitly
pub static DEFAULT_REGISTRY_HOST: Hostname =
    Hostname::from_normalized_static("registry.terraform.io");

/// Pseudo-hostname of providers bundled with the tool itself
pub static BUILTIN_PROVIDER_HOST: Hostname = Hostname::from_normalized_static("terraform.io");

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

static DNS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("DNS label pattern is valid")
});

/// Returns true if `s` is a lowercase DNS label: letters, digits and dashes,
/// with no leading or trailing dash. Length is not checked here.
pub(crate) fn is_dns_label(s: &str) -> bool {
    DNS_LABEL.is_match(s)
}

/// Hostname errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostnameError {
    #[error("invalid hostname {given:?}: {reason}")]
    Invalid { given: String, reason: String },
}

impl HostnameError {
    fn invalid(given: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            given: given.to_string(),
            reason: reason.into(),
        }
    }
}

/// A service hostname in normalized form
///
/// Values of this type are always lowercase ASCII and syntactically valid, so
/// equality is plain byte comparison. The only way to get one from untrusted
/// input is [`Hostname::for_comparison`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hostname(Cow<'static, str>);

impl Hostname {
    /// Normalize a user-supplied hostname, with an optional `:port` suffix.
    ///
    /// The default HTTPS port is dropped, so `example.com:443` and
    /// `example.com` compare equal.
    pub fn for_comparison(given: &str) -> Result<Self, HostnameError> {
        if given.is_empty() {
            return Err(HostnameError::invalid(given, "must not be empty"));
        }

        let (host, port) = match given.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (given, None),
        };
        if host.contains(':') {
            return Err(HostnameError::invalid(given, "IP addresses are not allowed"));
        }
        let port = match port {
            Some(port) => match port.parse::<u16>() {
                Ok(number) if port.bytes().all(|b| b.is_ascii_digit()) => Some(number),
                _ => {
                    return Err(HostnameError::invalid(
                        given,
                        format!("invalid port number {:?}", port),
                    ));
                }
            },
            None => None,
        };

        let ascii = match Host::parse(host) {
            Ok(Host::Domain(domain)) => domain,
            Ok(_) => {
                return Err(HostnameError::invalid(given, "IP addresses are not allowed"));
            }
            Err(e) => return Err(HostnameError::invalid(given, e.to_string())),
        };

        if ascii.len() > MAX_HOSTNAME_LEN {
            return Err(HostnameError::invalid(
                given,
                format!("must be at most {} characters", MAX_HOSTNAME_LEN),
            ));
        }
        for label in ascii.split('.') {
            if label.is_empty() {
                return Err(HostnameError::invalid(given, "empty label"));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(HostnameError::invalid(
                    given,
                    format!("label {:?} is longer than {} characters", label, MAX_LABEL_LEN),
                ));
            }
            if !is_dns_label(label) {
                return Err(HostnameError::invalid(
                    given,
                    format!(
                        "label {:?} must contain only letters, digits, and dashes, and may not start or end with a dash",
                        label
                    ),
                ));
            }
        }

        // Ports are stored as numbers, so `:0443` and `:443` are the same
        let normalized = match port {
            None | Some(443) => ascii,
            Some(port) => format!("{}:{}", ascii, port),
        };
        Ok(Self(Cow::Owned(normalized)))
    }

    /// Wrap a hostname that is already known to be normalized.
    ///
    /// For compile-time constants only; no validation happens here.
    pub const fn from_normalized_static(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
