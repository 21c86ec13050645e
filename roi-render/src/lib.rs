//! Chart and PDF output for ROI reports.

pub mod charts;
pub mod error;
pub mod fonts;
pub mod pdf;

use std::path::Path;

use roi_core::{CurrencyLocale, ReportRecord};
use tracing::warn;

pub use charts::{ChartArtifact, ChartKind, ChartSet, generate_charts};
pub use error::RenderError;
pub use fonts::FontSet;
pub use pdf::{PdfOutput, render_pdf};

/// Everything rendered for one report.
#[derive(Debug, Default)]
pub struct RenderedReport {
    pub charts: Vec<ChartArtifact>,
    pub pdf: Option<Vec<u8>>,
    pub warnings: Vec<String>,
}

/// Renders charts and the PDF with the fonts and currency locale chosen at
/// construction.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    fonts: Option<FontSet>,
    locale: CurrencyLocale,
}

impl ReportRenderer {
    /// Uses the fonts in `font_dir` when given and readable, the bundled
    /// fonts otherwise.
    pub fn new(font_dir: Option<&Path>) -> Self {
        let fonts = match font_dir.map(FontSet::load) {
            Some(Ok(fonts)) => fonts,
            Some(Err(err)) => {
                warn!(error = %err, "configured fonts unavailable, using bundled fonts");
                FontSet::bundled()
            }
            None => FontSet::bundled(),
        };
        Self::with_fonts(Some(fonts))
    }

    /// `None` draws charts without text and sets the PDF in Helvetica.
    pub fn with_fonts(fonts: Option<FontSet>) -> Self {
        if let Some(set) = &fonts {
            fonts::register_chart_fonts(set);
        }
        Self {
            fonts,
            locale: CurrencyLocale::default(),
        }
    }

    pub fn with_locale(
        mut self,
        locale: CurrencyLocale,
    ) -> Self {
        self.locale = locale;
        self
    }

    pub fn has_fonts(&self) -> bool {
        self.fonts.is_some()
    }

    pub fn locale(&self) -> &CurrencyLocale {
        &self.locale
    }

    pub fn render(
        &self,
        report: &ReportRecord,
    ) -> RenderedReport {
        let ChartSet {
            artifacts,
            mut warnings,
        } = generate_charts(report, &self.locale, self.has_fonts());
        let pdf = render_pdf(
            report,
            &report.input.consultant,
            &artifacts,
            self.fonts.as_ref(),
            &self.locale,
        );
        warnings.extend(pdf.warnings);

        RenderedReport {
            charts: artifacts,
            pdf: pdf.bytes,
            warnings,
        }
    }
}
