//! Configuration scaffolding
//!
//! Turns a resource type's schema into a template the user fills in:
//!
//! - required attributes are always listed as `name = <REQUIRED type>`
//! - optional attributes are listed as `name = <OPTIONAL type>`
//! - computed-only attributes are left out
//! - nested blocks are expanded only when their minimum item count is above zero
//!
//! Attributes and blocks are written in name order, so the same schema always
//! produces the same text.
//!
//! # Example
//!
//! ```
//! use stencil_core::addrs::ResourceMode;
//! use stencil_core::scaffold::{render_resource, ScaffoldConfig};
//! use stencil_core::schema::{Attribute, AttributeType, Block};
//!
//! let schema = Block::new()
//!     .attribute("ami", Attribute::new(AttributeType::String).required());
//! let text = render_resource(
//!     ResourceMode::Managed,
//!     "aws_instance",
//!     "web",
//!     &schema,
//!     &ScaffoldConfig::default(),
//! );
//!
//! assert!(text.contains("  ami = <REQUIRED string>"));
//! ```

mod config;
mod render;

pub use config::ScaffoldConfig;
pub use render::{render, render_resource};

use log::debug;

use crate::addrs::{Provider, ResourceAddr};
use crate::diagnostics::Diagnostic;
use crate::schema::SchemaSource;

/// Look up the schema for `addr` under `provider` and render its template.
pub fn scaffold_resource<S: SchemaSource + ?Sized>(
    source: &S,
    addr: &ResourceAddr,
    provider: &Provider,
    config: &ScaffoldConfig,
) -> Result<String, Diagnostic> {
    let block = source.lookup(provider, addr.mode, &addr.resource_type)?;
    debug!(
        "rendering {} from provider {} ({} attribute(s), {} block type(s))",
        addr,
        provider,
        block.attributes.len(),
        block.block_types.len()
    );
    Ok(render_resource(
        addr.mode,
        &addr.resource_type,
        &addr.name,
        block,
        config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addrs::{ResourceMode, must_parse_provider_source};
    use crate::schema::{Attribute, AttributeType, Block, ProviderSchema, ProviderSchemas};

    fn catalog() -> ProviderSchemas {
        ProviderSchemas::new().with_provider(
            must_parse_provider_source("hashicorp/aws"),
            ProviderSchema::new()
                .resource(
                    "aws_s3_bucket",
                    Block::new()
                        .attribute("bucket", Attribute::new(AttributeType::String).required()),
                )
                .data_source(
                    "aws_region",
                    Block::new().attribute("name", Attribute::new(AttributeType::String).optional()),
                ),
        )
    }

    #[test]
    fn scaffold_managed_resource() {
        let addr = ResourceAddr::parse("aws_s3_bucket.logs").unwrap();
        let provider = must_parse_provider_source(addr.implied_provider());
        let text =
            scaffold_resource(&catalog(), &addr, &provider, &ScaffoldConfig::default()).unwrap();
        assert_eq!(
            text,
            "resource \"aws_s3_bucket\" \"logs\" {\n  bucket = <REQUIRED string>\n\n}\n"
        );
    }

    #[test]
    fn scaffold_data_source() {
        let addr = ResourceAddr::parse("data.aws_region.current").unwrap();
        assert_eq!(addr.mode, ResourceMode::Data);
        let provider = must_parse_provider_source("aws");
        let text =
            scaffold_resource(&catalog(), &addr, &provider, &ScaffoldConfig::default()).unwrap();
        assert!(text.starts_with("data \"aws_region\" \"current\" {\n"));
        assert!(text.contains("name = <OPTIONAL string>"));
    }

    #[test]
    fn scaffold_reports_missing_schema() {
        let addr = ResourceAddr::parse("aws_instance.web").unwrap();
        let provider = must_parse_provider_source("aws");
        let diag = scaffold_resource(&catalog(), &addr, &provider, &ScaffoldConfig::default())
            .unwrap_err();
        assert!(diag.is_error());
        assert_eq!(diag.summary, "Missing resource schema");
    }
}
