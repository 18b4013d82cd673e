//! Scaffold configuration

/// Scaffold options
#[derive(Debug, Clone)]
pub struct ScaffoldConfig {
    /// Number of spaces added per nesting level (default: 2)
    pub indent_size: usize,

    /// Emit each attribute's description as a `#` comment above it
    pub include_descriptions: bool,

    /// Emit optional attributes as placeholders (required ones are always
    /// emitted)
    pub include_optional: bool,

    /// Emit nested blocks whose minimum item count is zero
    pub include_optional_blocks: bool,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            indent_size: 2,
            include_descriptions: true,
            include_optional: true,
            include_optional_blocks: false,
        }
    }
}

impl ScaffoldConfig {
    /// Only required attributes and mandatory blocks
    pub fn required_only() -> Self {
        Self {
            include_optional: false,
            ..Default::default()
        }
    }
}
