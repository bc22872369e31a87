//! Diagnostics channel for recoverable conversion anomalies.
//!
//! Structural errors abort a conversion; everything else (a dropped block, a
//! clamped box, a table cell conflict) is absorbed with a best-effort
//! substitute and reported here, independent of whether the conversion
//! succeeded.

use serde::{Deserialize, Serialize};

/// Category of a recoverable anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A relationship pointed at an id absent from the input (lenient mode).
    DanglingReference,
    /// A block was missing required fields and was dropped.
    MalformedBlock,
    /// A bounding box had non-positive extent, or a box was clamped to a
    /// minimum 1-pixel extent during emission.
    DegenerateBox,
    /// The dimension source lacks the requested page; defaults were used.
    UnsupportedPage,
    /// Two table cells claimed the same grid slot; the first won.
    LayoutConflict,
}

/// A single recoverable anomaly observed during conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Anomaly category
    pub kind: DiagnosticKind,

    /// Page the anomaly occurred on, if known
    pub page: Option<u32>,

    /// Id of the affected block, if any
    pub block_id: Option<String>,

    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with no page or block attribution.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            page: None,
            block_id: None,
            message: message.into(),
        }
    }

    /// Attach a page number.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a block id.
    pub fn for_block(mut self, id: impl Into<String>) -> Self {
        self.block_id = Some(id.into());
        self
    }
}

/// Ordered collection of diagnostics from one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Also emits it through the `log` facade.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!(
            "{:?}{}: {}",
            diagnostic.kind,
            diagnostic
                .page
                .map(|p| format!(" (page {})", p))
                .unwrap_or_default(),
            diagnostic.message
        );
        self.items.push(diagnostic);
    }

    /// Append all diagnostics from another collection, preserving order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Iterate over recorded diagnostics in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no diagnostics were recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any diagnostic of the given kind was recorded.
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.items.iter().any(|d| d.kind == kind)
    }

    /// Count diagnostics of the given kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
