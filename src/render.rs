//! Draws a [`ReportLayout`] onto a single PDF page.

use std::io::BufWriter;

use log::debug;
use printpdf::{Color, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb};

use crate::error::RenderError;
use crate::fonts::{self, FontSource, ReportFonts};
use crate::layout::{FontWeight, ReportLayout, Rule, TextItem, Tone};
use crate::model::{ReportSelection, WeeklyStats};

const LAYER_NAME: &str = "Report";

/// The serialized document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
}

/// Renders report layouts with a fixed font source.
///
/// Each call builds a fresh document, so renders never share state.
#[derive(Clone, Debug)]
pub struct ReportRenderer {
    font_source: FontSource,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(FontSource::Builtin)
    }
}

impl ReportRenderer {
    /// Creates a renderer that draws with fonts from `font_source`.
    pub fn new(font_source: FontSource) -> Self {
        Self { font_source }
    }

    /// The font source every render uses.
    pub fn font_source(&self) -> &FontSource {
        &self.font_source
    }

    /// Lays out `stats` for `selection` and renders the result.
    pub fn render_stats(
        &self,
        stats: &WeeklyStats,
        selection: ReportSelection,
    ) -> Result<RenderedReport, RenderError> {
        self.render(&ReportLayout::build(stats, selection))
    }

    /// Renders the layout and serializes the document to bytes.
    pub fn render(&self, layout: &ReportLayout) -> Result<RenderedReport, RenderError> {
        let (width, height) = layout.page_size_mm();
        let (document, page, layer) =
            PdfDocument::new(layout.title(), Mm(width), Mm(height), LAYER_NAME);
        let fonts = fonts::install_fonts(&document, &self.font_source)?;
        let layer = document.get_page(page).get_layer(layer);

        for rule in layout.rules() {
            draw_rule(&layer, rule);
        }

        for item in layout.texts() {
            draw_text(&layer, &fonts, item);
        }

        let mut writer = BufWriter::new(Vec::new());
        document
            .save(&mut writer)
            .map_err(|err| RenderError::Pdf(err.to_string()))?;
        let bytes = writer
            .into_inner()
            .map_err(|err| RenderError::Io(err.into_error()))?;

        debug!("Rendered '{}' ({} bytes)", layout.title(), bytes.len());
        Ok(RenderedReport { bytes })
    }
}

fn color(tone: Tone) -> Color {
    let (r, g, b) = tone.rgb();
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn draw_text(layer: &PdfLayerReference, fonts: &ReportFonts, item: &TextItem) {
    let font = match item.weight {
        FontWeight::Regular => &fonts.regular,
        FontWeight::Bold => &fonts.bold,
    };

    layer.set_fill_color(color(item.tone));
    layer.use_text(
        item.text.as_str(),
        item.font_size,
        Mm(item.x_mm),
        Mm(item.y_mm),
        font,
    );
}

fn draw_rule(layer: &PdfLayerReference, rule: &Rule) {
    layer.set_outline_color(color(Tone::Default));
    layer.set_outline_thickness(rule.thickness_pt);
    layer.add_shape(Line {
        points: vec![
            (Point::new(Mm(rule.x_start_mm), Mm(rule.y_mm)), false),
            (Point::new(Mm(rule.x_end_mm), Mm(rule.y_mm)), false),
        ],
        is_closed: false,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_pdf_header() {
        let selection = ReportSelection::new(0, 2025).expect("valid selection");
        let report = ReportRenderer::default()
            .render_stats(&WeeklyStats::default(), selection)
            .expect("render succeeds");

        assert!(report.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unreadable_font_is_a_render_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let renderer = ReportRenderer::new(FontSource::Bundled {
            regular: dir.path().join("missing-regular.ttf"),
            bold: dir.path().join("missing-bold.ttf"),
        });
        let selection = ReportSelection::new(0, 2025).expect("valid selection");

        let err = renderer
            .render_stats(&WeeklyStats::default(), selection)
            .expect_err("missing font must fail");
        assert!(matches!(err, RenderError::FontLoad { .. }));
    }
}
