//! Codec settings.

/// Settings shared by the importer and exporter.
#[derive(Clone, Debug, PartialEq)]
pub struct CodecConfig {
    /// Spaces per indentation level in written files
    pub indent: usize,

    /// Largest per-cell deviation from identity a parent-inverse may have
    /// before the exporter rebuilds the local transform
    pub parent_inverse_tolerance: f32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            indent: 4,
            parent_inverse_tolerance: 0.001,
        }
    }
}

impl CodecConfig {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_parent_inverse_tolerance(mut self, tolerance: f32) -> Self {
        self.parent_inverse_tolerance = tolerance;
        self
    }
}
