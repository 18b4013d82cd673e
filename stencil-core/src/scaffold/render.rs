//! Render a schema tree as a configuration template

use std::collections::BTreeMap;

use super::config::ScaffoldConfig;
use crate::addrs::ResourceMode;
use crate::schema::{Attribute, Block, NestedBlock, Presence};

/// Render a whole resource, framed as `resource "<type>" "<name>" { ... }`
/// (or `data "<type>" "<name>"` for data sources).
pub fn render_resource(
    mode: ResourceMode,
    resource_type: &str,
    name: &str,
    block: &Block,
    config: &ScaffoldConfig,
) -> String {
    let mut buf = String::new();
    buf.push_str(&format!(
        "{} \"{}\" \"{}\" {{\n",
        mode.keyword(),
        resource_type,
        name
    ));
    write_body(&mut buf, block, config.indent_size, config);
    buf.push_str("}\n");
    buf
}

/// Render the attributes and mandatory nested blocks of `block`, each line
/// indented by `indent` spaces.
pub fn render(block: &Block, indent: usize, config: &ScaffoldConfig) -> String {
    let mut buf = String::new();
    write_body(&mut buf, block, indent, config);
    buf
}

fn write_body(buf: &mut String, block: &Block, indent: usize, config: &ScaffoldConfig) {
    write_attributes(buf, &block.attributes, indent, config);
    write_blocks(buf, &block.block_types, indent, config);
}

fn write_attributes(
    buf: &mut String,
    attributes: &BTreeMap<String, Attribute>,
    indent: usize,
    config: &ScaffoldConfig,
) {
    let pad = " ".repeat(indent);
    for (name, attribute) in attributes {
        let marker = match attribute.presence() {
            Presence::Required => "REQUIRED",
            Presence::Optional if config.include_optional => "OPTIONAL",
            Presence::Optional => continue,
            // Computed values can't be set by the user
            Presence::Computed => continue,
        };

        if config.include_descriptions
            && let Some(description) = attribute.description.as_deref()
        {
            for line in description.lines().filter(|line| !line.trim().is_empty()) {
                buf.push_str(&format!("{}# {}\n", pad, line.trim_end()));
            }
        }
        buf.push_str(&format!(
            "{}{} = <{} {}>\n\n",
            pad,
            name,
            marker,
            attribute.type_name()
        ));
    }
}

fn write_blocks(
    buf: &mut String,
    blocks: &BTreeMap<String, NestedBlock>,
    indent: usize,
    config: &ScaffoldConfig,
) {
    let pad = " ".repeat(indent);
    for (name, nested) in blocks {
        if !nested.is_required() && !config.include_optional_blocks {
            continue;
        }
        buf.push_str(&format!("{}{} {{\n", pad, name));
        write_body(buf, &nested.block, indent + config.indent_size, config);
        buf.push_str(&format!("{}}}\n", pad));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeType, NestingMode};

    fn instance_schema() -> Block {
        Block::new()
            .attribute(
                "name",
                Attribute::new(AttributeType::String)
                    .required()
                    .with_description("Name of the instance"),
            )
            .attribute(
                "tags",
                Attribute::new(AttributeType::Map(Box::new(AttributeType::String))).optional(),
            )
            .attribute("arn", Attribute::new(AttributeType::String).computed())
            .block(
                "ebs_block_device",
                NestedBlock::new(
                    NestingMode::Set,
                    Block::new().attribute(
                        "device_name",
                        Attribute::new(AttributeType::String).required(),
                    ),
                )
                .with_min_items(1),
            )
            .block(
                "timeouts",
                NestedBlock::new(
                    NestingMode::Single,
                    Block::new().attribute("create", Attribute::new(AttributeType::String).optional()),
                ),
            )
    }

    #[test]
    fn required_and_optional_attributes() {
        let out = render(&instance_schema(), 2, &ScaffoldConfig::default());
        assert!(out.contains("  # Name of the instance\n  name = <REQUIRED string>\n\n"));
        assert!(out.contains("  tags = <OPTIONAL map of string>\n\n"));
    }

    #[test]
    fn computed_attributes_are_skipped() {
        let out = render(&instance_schema(), 2, &ScaffoldConfig::default());
        assert!(!out.contains("arn"));
    }

    #[test]
    fn mandatory_blocks_are_expanded() {
        let out = render(&instance_schema(), 2, &ScaffoldConfig::default());
        assert!(out.contains("  ebs_block_device {\n    device_name = <REQUIRED string>\n\n  }\n"));
        assert!(!out.contains("timeouts"));
    }

    #[test]
    fn optional_blocks_when_enabled() {
        let config = ScaffoldConfig {
            include_optional_blocks: true,
            ..Default::default()
        };
        let out = render(&instance_schema(), 2, &config);
        assert!(out.contains("  timeouts {\n    create = <OPTIONAL string>\n\n  }\n"));
    }

    #[test]
    fn required_only_drops_optional_attributes() {
        let out = render(&instance_schema(), 2, &ScaffoldConfig::required_only());
        assert!(out.contains("name = <REQUIRED string>"));
        assert!(!out.contains("tags"));
    }

    #[test]
    fn descriptions_can_be_disabled() {
        let config = ScaffoldConfig {
            include_descriptions: false,
            ..Default::default()
        };
        let out = render(&instance_schema(), 2, &config);
        assert!(!out.contains('#'));
        assert!(out.starts_with("  name = <REQUIRED string>\n\n"));
    }

    #[test]
    fn multi_line_descriptions_are_commented() {
        let block = Block::new().attribute(
            "policy",
            Attribute::new(AttributeType::String)
                .required()
                .with_description("First line.\n\nSecond line."),
        );
        let out = render(&block, 0, &ScaffoldConfig::default());
        assert_eq!(
            out,
            "# First line.\n# Second line.\npolicy = <REQUIRED string>\n\n"
        );
    }

    #[test]
    fn names_are_sorted() {
        let block = Block::new()
            .attribute("zone", Attribute::new(AttributeType::String).required())
            .attribute("alpha", Attribute::new(AttributeType::String).required())
            .attribute("middle", Attribute::new(AttributeType::Number).optional());
        let out = render(&block, 0, &ScaffoldConfig::default());
        assert_eq!(
            out,
            "alpha = <REQUIRED string>\n\nmiddle = <OPTIONAL number>\n\nzone = <REQUIRED string>\n\n"
        );
    }

    #[test]
    fn deeply_nested_blocks_indent() {
        let block = Block::new().block(
            "outer",
            NestedBlock::new(
                NestingMode::List,
                Block::new().block(
                    "inner",
                    NestedBlock::new(
                        NestingMode::List,
                        Block::new().attribute("value", Attribute::new(AttributeType::Bool).required()),
                    )
                    .with_min_items(2),
                ),
            )
            .with_min_items(1),
        );
        let out = render(&block, 2, &ScaffoldConfig::default());
        assert_eq!(
            out,
            "  outer {\n    inner {\n      value = <REQUIRED bool>\n\n    }\n  }\n"
        );
    }

    #[test]
    fn empty_schema_renders_empty_body() {
        let block = Block::new().attribute("id", Attribute::new(AttributeType::String).computed());
        let out = render_resource(
            ResourceMode::Managed,
            "null_resource",
            "x",
            &block,
            &ScaffoldConfig::default(),
        );
        assert_eq!(out, "resource \"null_resource\" \"x\" {\n}\n");
        assert_eq!(render(&Block::new(), 2, &ScaffoldConfig::default()), "");
    }

    #[test]
    fn resource_and_data_frames() {
        let block = Block::new().attribute("name", Attribute::new(AttributeType::String).required());
        let out = render_resource(
            ResourceMode::Managed,
            "aws_instance",
            "web",
            &block,
            &ScaffoldConfig::default(),
        );
        assert_eq!(
            out,
            "resource \"aws_instance\" \"web\" {\n  name = <REQUIRED string>\n\n}\n"
        );

        let out = render_resource(
            ResourceMode::Data,
            "aws_ami",
            "ubuntu",
            &block,
            &ScaffoldConfig::default(),
        );
        assert!(out.starts_with("data \"aws_ami\" \"ubuntu\" {\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let config = ScaffoldConfig::default();
        let first = render(&instance_schema(), 2, &config);
        let second = render(&instance_schema(), 2, &config);
        assert_eq!(first, second);
    }
}
