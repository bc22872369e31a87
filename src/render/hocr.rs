//! hOCR HTML emission.
//!
//! Output is XHTML 1.0 Transitional with the hOCR classes `ocr_page`,
//! `ocr_block`, `ocr_table`, `ocr_line` and `ocrx_word`, indented two
//! spaces per nesting level. Emission is deterministic: the same layout
//! and dimensions always produce identical bytes.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::dimensions::PageDimensions;
use crate::layout::{CellContent, LineLayout, PageItem, PageLayout, ReadingBlock, TableLayout};
use crate::model::{NormBox, PixelBox, WordBlock};

use super::options::{RenderOptions, TableMode};

/// Renders resolved page layouts into hOCR markup.
pub struct HocrEmitter<'a> {
    options: &'a RenderOptions,
}

/// Per-page emission state: resolved dimensions plus the diagnostics sink
/// for boxes clamped to a minimum 1-pixel extent.
struct RenderCtx<'d> {
    dims: PageDimensions,
    page: u32,
    diagnostics: &'d mut Diagnostics,
}

impl RenderCtx<'_> {
    fn pixels(&mut self, bbox: &NormBox, id: &str) -> PixelBox {
        let (px, clamped) = bbox.to_pixels(self.dims);
        if clamped {
            self.diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::DegenerateBox,
                    format!("box for {} clamped to a 1-pixel extent", id),
                )
                .on_page(self.page)
                .for_block(id),
            );
        }
        px
    }
}

impl<'a> HocrEmitter<'a> {
    /// Create an emitter over render options.
    pub fn new(options: &'a RenderOptions) -> Self {
        Self { options }
    }

    /// Everything up to and including the opening `<body>` tag.
    pub fn prelude(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
             \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n",
        );
        out.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"en\">\n");
        out.push_str("  <head>\n");
        out.push_str("    <title></title>\n");
        out.push_str(
            "    <meta http-equiv=\"Content-Type\" content=\"text/html;charset=utf-8\" />\n",
        );
        out.push_str("    <meta name=\"ocr-system\" content=\"aws-textract\" />\n");
        out.push_str(
            "    <meta name=\"ocr-capabilities\" \
             content=\"ocr_page ocr_block ocr_table ocr_line ocrx_word\" />\n",
        );
        out.push_str("  </head>\n");
        out.push_str("  <body>\n");
        out
    }

    /// The closing `</body></html>` pair.
    pub fn epilogue(&self) -> String {
        "  </body>\n</html>\n".to_string()
    }

    /// Render one page as an `ocr_page` div fragment.
    ///
    /// Boxes clamped to a minimum 1-pixel extent during denormalization
    /// are reported through `diagnostics`, one entry per clamped box.
    pub fn render_page(
        &self,
        layout: &PageLayout<'_>,
        dimensions: PageDimensions,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let mut ctx = RenderCtx {
            dims: dimensions,
            page: layout.number,
            diagnostics,
        };
        let mut out = String::new();
        pad(&mut out, 2);
        out.push_str(&format!(
            "<div class=\"ocr_page\" id=\"page_{}\" title=\"bbox 0 0 {} {}; ppageno {}\">\n",
            layout.number,
            dimensions.width,
            dimensions.height,
            layout.number - 1
        ));
        for item in &layout.items {
            match item {
                PageItem::Block(block) => self.write_block(&mut out, block, &mut ctx),
                PageItem::Table(table) => match self.options.table_mode {
                    TableMode::Flow => self.write_table_flow(&mut out, table, &mut ctx),
                    TableMode::Structural => {
                        self.write_table_structural(&mut out, table, &mut ctx)
                    }
                },
            }
        }
        pad(&mut out, 2);
        out.push_str("</div>\n");
        out
    }

    fn write_block(&self, out: &mut String, block: &ReadingBlock<'_>, ctx: &mut RenderCtx<'_>) {
        let px = ctx.pixels(&block.bbox, &block.id);
        pad(out, 3);
        out.push_str(&format!(
            "<div class=\"ocr_block\" id=\"{}\" title=\"{}\" lang=\"{}\">\n",
            escape_attr(&block.id),
            px.to_property(),
            escape_attr(&self.options.lang)
        ));
        for line in &block.lines {
            self.write_line(out, 4, line, ctx);
        }
        pad(out, 3);
        out.push_str("</div>\n");
    }

    fn write_line(
        &self,
        out: &mut String,
        level: usize,
        line: &LineLayout<'_>,
        ctx: &mut RenderCtx<'_>,
    ) {
        let px = ctx.pixels(&line.line.bbox, &line.line.id);
        pad(out, level);
        out.push_str(&format!(
            "<span class=\"ocr_line\" id=\"{}\" title=\"{}; baseline 0 0\">\n",
            escape_attr(&line.line.id),
            px.to_property()
        ));
        for word in &line.words {
            self.write_word(out, level + 1, word, ctx);
        }
        pad(out, level);
        out.push_str("</span>\n");
    }

    fn write_word(
        &self,
        out: &mut String,
        level: usize,
        word: &WordBlock,
        ctx: &mut RenderCtx<'_>,
    ) {
        let px = ctx.pixels(&word.bbox, &word.id);
        pad(out, level);
        out.push_str(&format!(
            "<span class=\"ocrx_word\" id=\"{}\" title=\"{}; x_wconf {}\">{}</span>\n",
            escape_attr(&word.id),
            px.to_property(),
            wconf(word.confidence),
            escape_text(&word.text)
        ));
    }

    fn write_table_flow(&self, out: &mut String, table: &TableLayout<'_>, ctx: &mut RenderCtx<'_>) {
        let px = ctx.pixels(&table.table.bbox, &table.table.id);
        pad(out, 3);
        out.push_str(&format!(
            "<div class=\"ocr_table\" id=\"{}\" title=\"{}; x_wconf {}\">\n",
            escape_attr(&table.table.id),
            px.to_property(),
            wconf(table.table.confidence)
        ));
        for cell in table.cells_in_reading_order() {
            self.write_cell_lines(out, 4, cell, ctx);
        }
        pad(out, 3);
        out.push_str("</div>\n");
    }

    fn write_table_structural(
        &self,
        out: &mut String,
        table: &TableLayout<'_>,
        ctx: &mut RenderCtx<'_>,
    ) {
        let px = ctx.pixels(&table.table.bbox, &table.table.id);
        pad(out, 3);
        out.push_str(&format!(
            "<table class=\"ocr_table\" id=\"{}\" title=\"{}; x_wconf {}\">\n",
            escape_attr(&table.table.id),
            px.to_property(),
            wconf(table.table.confidence)
        ));
        for row in 1..=table.row_count {
            pad(out, 4);
            out.push_str("<tr>\n");
            for column in 1..=table.column_count {
                match table.cell_at(row, column) {
                    Some(cell) if table.is_origin(row, column) => {
                        self.write_td(out, cell, ctx);
                    }
                    // Covered by a spanning cell: no td at all
                    Some(_) => {}
                    None => {
                        pad(out, 5);
                        out.push_str("<td></td>\n");
                    }
                }
            }
            pad(out, 4);
            out.push_str("</tr>\n");
        }
        pad(out, 3);
        out.push_str("</table>\n");
    }

    fn write_td(&self, out: &mut String, cell: &CellContent<'_>, ctx: &mut RenderCtx<'_>) {
        pad(out, 5);
        out.push_str("<td");
        if cell.cell.row_span > 1 {
            out.push_str(&format!(" rowspan=\"{}\"", cell.cell.row_span));
        }
        if cell.cell.column_span > 1 {
            out.push_str(&format!(" colspan=\"{}\"", cell.cell.column_span));
        }
        if cell.is_empty() {
            out.push_str("></td>\n");
            return;
        }
        out.push_str(">\n");
        self.write_cell_lines(out, 6, cell, ctx);
        pad(out, 5);
        out.push_str("</td>\n");
    }

    /// Cell content as line spans: real line children first, then a
    /// synthetic line wrapping any direct word children.
    fn write_cell_lines(
        &self,
        out: &mut String,
        level: usize,
        cell: &CellContent<'_>,
        ctx: &mut RenderCtx<'_>,
    ) {
        for line in &cell.lines {
            self.write_line(out, level, line, ctx);
        }
        if !cell.words.is_empty() && cell.lines.is_empty() {
            let px = ctx.pixels(&cell.cell.bbox, &cell.cell.id);
            pad(out, level);
            out.push_str(&format!(
                "<span class=\"ocr_line\" id=\"{}_line\" title=\"{}; baseline 0 0\">\n",
                escape_attr(&cell.cell.id),
                px.to_property()
            ));
            for word in &cell.words {
                self.write_word(out, level + 1, word, ctx);
            }
            pad(out, level);
            out.push_str("</span>\n");
        }
    }
}

fn pad(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

/// Confidence as hOCR `x_wconf`: truncated to an integer and clamped to
/// the 0-100 range. Missing confidence reads as 100.
fn wconf(confidence: Option<f64>) -> u32 {
    confidence.unwrap_or(100.0).clamp(0.0, 100.0) as u32
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
