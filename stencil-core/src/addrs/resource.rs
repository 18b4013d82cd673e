//! Resource addresses
//!
//! `[module.<name>.]*[data.]<type>.<name>`, e.g. `aws_instance.web` or
//! `module.network.data.aws_vpc.main`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::ParseError;
use super::provider::{Provider, parse_provider_source};
use crate::diagnostics::Diagnostics;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("identifier pattern is valid")
});

const EXPECTED_FORM: &str = "expected [module.NAME.]*[data.]TYPE.NAME";

/// Address keywords that can never be a resource type
const RESERVED_TYPE_NAMES: &[&str] = &["data", "module"];

/// Whether a resource is managed or read-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceMode {
    /// A resource the tool creates and manages
    Managed,
    /// A data source (read-only)
    Data,
}

impl ResourceMode {
    /// Block keyword used in configuration (`resource` or `data`)
    pub fn keyword(&self) -> &'static str {
        match self {
            ResourceMode::Managed => "resource",
            ResourceMode::Data => "data",
        }
    }
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Address of a single resource, optionally inside nested modules
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddr {
    /// Module call names from the root (empty for the root module)
    pub module_path: Vec<String>,
    pub mode: ResourceMode,
    /// Resource type (e.g., "aws_instance")
    pub resource_type: String,
    /// Resource name (e.g., "web")
    pub name: String,
}

impl ResourceAddr {
    pub fn new(mode: ResourceMode, resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module_path: Vec::new(),
            mode,
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    pub fn parse(given: &str) -> Result<Self, ParseError> {
        let invalid = |reason: String| ParseError::InvalidResourceAddress {
            address: given.to_string(),
            reason,
        };

        let segments: Vec<&str> = given.split('.').collect();
        let mut rest = segments.as_slice();

        let mut module_path = Vec::new();
        while rest.len() > 2 && rest[0] == "module" {
            let module_name = rest[1];
            if !IDENTIFIER.is_match(module_name) {
                return Err(invalid(format!("invalid module name {:?}", module_name)));
            }
            module_path.push(module_name.to_string());
            rest = &rest[2..];
        }

        let mode = if rest.len() == 3 && rest[0] == "data" {
            rest = &rest[1..];
            ResourceMode::Data
        } else {
            ResourceMode::Managed
        };

        let [resource_type, name] = rest else {
            return Err(invalid(EXPECTED_FORM.to_string()));
        };
        if !IDENTIFIER.is_match(resource_type) || RESERVED_TYPE_NAMES.contains(resource_type) {
            return Err(invalid(format!("invalid resource type {:?}", resource_type)));
        }
        if !IDENTIFIER.is_match(name) {
            return Err(invalid(format!("invalid resource name {:?}", name)));
        }

        Ok(Self {
            module_path,
            mode,
            resource_type: resource_type.to_string(),
            name: name.to_string(),
        })
    }

    /// Provider type name implied by the resource type: everything before the
    /// first underscore (`aws_instance` -> `aws`).
    pub fn implied_provider(&self) -> &str {
        self.resource_type
            .split('_')
            .next()
            .unwrap_or(&self.resource_type)
    }

    /// Provider that owns this resource's schema: `explicit` (a provider
    /// source string) when given, otherwise the one implied by the type.
    pub fn resolve_provider(&self, explicit: Option<&str>) -> (Option<Provider>, Diagnostics) {
        let source = explicit.unwrap_or_else(|| self.implied_provider());
        parse_provider_source(source)
    }
}

impl fmt::Display for ResourceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for module_name in &self.module_path {
            write!(f, "module.{}.", module_name)?;
        }
        if self.mode == ResourceMode::Data {
            write!(f, "data.")?;
        }
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}
