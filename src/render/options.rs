//! Rendering options and configuration.

/// How tables appear in the hOCR output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    /// A `div.ocr_table` containing the cells' lines in row-major reading
    /// order. Keeps the output a flat flow of lines and words.
    #[default]
    Flow,
    /// A real `<table>` with `<tr>`/`<td>` structure; spanning cells carry
    /// `rowspan`/`colspan` attributes and covered slots are skipped.
    Structural,
}

/// Options for rendering hOCR output.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// How to render tables
    pub table_mode: TableMode,

    /// Language attribute placed on reading blocks
    pub lang: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table rendering mode.
    pub fn with_table_mode(mut self, mode: TableMode) -> Self {
        self.table_mode = mode;
        self
    }

    /// Set the block language attribute.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            table_mode: TableMode::Flow,
            lang: "eng".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.table_mode, TableMode::Flow);
        assert_eq!(options.lang, "eng");
    }

    #[test]
    fn test_builder() {
        let options = RenderOptions::new()
            .with_table_mode(TableMode::Structural)
            .with_lang("deu");
        assert_eq!(options.table_mode, TableMode::Structural);
        assert_eq!(options.lang, "deu");
    }
}
