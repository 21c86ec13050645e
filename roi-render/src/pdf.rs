//! A4 report layout.
//!
//! Content flows top to bottom from a cursor; a new page is started
//! whenever the next block would run into the bottom margin.

use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef,
    Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Px,
};
use roi_core::{ConsultantInfo, CurrencyLocale, ReportRecord};
use tracing::{debug, warn};

use crate::charts::ChartArtifact;
use crate::error::RenderError;
use crate::fonts::FontSet;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LAYER_NAME: &str = "Layer 1";

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;

/// Points to millimetres.
const PT_TO_MM: f32 = 0.352_778;

/// PDF bytes, or `None` when the document could not be finalized.
#[derive(Debug, Default)]
pub struct PdfOutput {
    pub bytes: Option<Vec<u8>>,
    pub warnings: Vec<String>,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Lays out one report. Never fails: problems are collected as warnings
/// and a failed finalization yields no bytes.
pub fn render_pdf(
    report: &ReportRecord,
    consultant: &ConsultantInfo,
    charts: &[ChartArtifact],
    fonts: Option<&FontSet>,
    locale: &CurrencyLocale,
) -> PdfOutput {
    let mut warnings = Vec::new();
    match build_document(report, consultant, charts, fonts, locale, &mut warnings) {
        Ok(bytes) => {
            debug!(bytes = bytes.len(), "PDF rendered");
            PdfOutput {
                bytes: Some(bytes),
                warnings,
            }
        }
        Err(err) => {
            warn!(error = %err, "PDF not produced");
            warnings.push(err.to_string());
            PdfOutput {
                bytes: None,
                warnings,
            }
        }
    }
}

fn build_document(
    report: &ReportRecord,
    consultant: &ConsultantInfo,
    charts: &[ChartArtifact],
    fonts: Option<&FontSet>,
    locale: &CurrencyLocale,
    warnings: &mut Vec<String>,
) -> Result<Vec<u8>, RenderError> {
    let title = format!("ROI Analysis Report - {}", report.input.client.name);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
    let fonts = load_fonts(&doc, fonts, warnings)?;
    let mut page = PageCursor {
        layer: doc.get_page(page).get_layer(layer),
        doc: &doc,
        y: PAGE_HEIGHT - MARGIN,
    };

    // Header
    page.centered_text(&title, TITLE_SIZE, &fonts.bold, 10.0);
    page.centered_text(&format!("Generated: {}", report.timestamp_label()), BODY_SIZE, &fonts.regular, 5.0);
    page.gap(10.0);

    page.heading("Consultant Information", &fonts);
    page.text(&format!("Name: {}", consultant.name), BODY_SIZE, &fonts.regular, 6.0);
    page.text(&format!("Email: {}", consultant.email), BODY_SIZE, &fonts.regular, 6.0);
    page.text(&format!("Phone / WhatsApp: {}", consultant.phone), BODY_SIZE, &fonts.regular, 6.0);
    page.gap(5.0);

    page.heading("Client / Project Information", &fonts);
    page.text(&format!("Name: {}", report.input.client.name), BODY_SIZE, &fonts.regular, 6.0);
    page.text(&format!("Location: {}", report.input.client.location), BODY_SIZE, &fonts.regular, 6.0);
    page.gap(5.0);

    page.heading("Key ROI Results", &fonts);
    for (label, value) in summary_rows(report, locale) {
        page.table_row(label, &value, &fonts.regular);
    }
    page.gap(5.0);

    page.heading("Calculation Details", &fonts);
    for line in breakdown_lines(report, locale) {
        let font = if line.total { &fonts.bold } else { &fonts.regular };
        page.text(&line.text, BODY_SIZE, font, 6.0);
        if line.gap_after {
            page.gap(3.0);
        }
    }
    page.gap(10.0);

    page.heading("Data Visualization", &fonts);
    page.gap(5.0);
    if charts.is_empty() {
        page.text("Charts could not be generated.", BODY_SIZE, &fonts.regular, 6.0);
    } else {
        for chart in charts {
            page.image(chart);
            page.gap(5.0);
        }
    }

    doc.save_to_bytes().map_err(|e| RenderError::Pdf(e.to_string()))
}

fn load_fonts(
    doc: &PdfDocumentReference,
    fonts: Option<&FontSet>,
    warnings: &mut Vec<String>,
) -> Result<Fonts, RenderError> {
    if let Some(set) = fonts {
        let embedded = doc
            .add_external_font(set.regular.as_slice())
            .and_then(|regular| Ok((regular, doc.add_external_font(set.bold.as_slice())?)));
        match embedded {
            Ok((regular, bold)) => return Ok(Fonts { regular, bold }),
            Err(err) => {
                let message = format!("bundled font could not be embedded ({err}), using Helvetica");
                warn!("{message}");
                warnings.push(message);
            }
        }
    } else {
        let message = "bundled font not available, using Helvetica".to_string();
        warn!("{message}");
        warnings.push(message);
    }

    let builtin = |font| doc.add_builtin_font(font).map_err(|e| RenderError::Pdf(e.to_string()));
    Ok(Fonts {
        regular: builtin(BuiltinFont::Helvetica)?,
        bold: builtin(BuiltinFont::HelveticaBold)?,
    })
}

/// Label and display value for each cell pair of the results table.
pub fn summary_rows(
    report: &ReportRecord,
    locale: &CurrencyLocale,
) -> [(&'static str, String); 5] {
    [
        ("Initial Investment", locale.format(report.total_investment)),
        ("Annual Savings", locale.format(report.annual_savings)),
        ("1-Year ROI", report.roi_1_year.display_percent()),
        ("5-Year ROI", report.roi_5_year.display_percent()),
        ("Payback Period (Months)", report.payback_period.display_number()),
    ]
}

pub struct BreakdownLine {
    pub text: String,
    pub total: bool,
    gap_after: bool,
}

impl BreakdownLine {
    fn item(text: String) -> Self {
        Self {
            text,
            total: false,
            gap_after: false,
        }
    }

    fn total(text: String) -> Self {
        Self {
            text,
            total: true,
            gap_after: true,
        }
    }
}

/// Monthly savings derivation followed by the investment breakdown.
pub fn breakdown_lines(
    report: &ReportRecord,
    locale: &CurrencyLocale,
) -> Vec<BreakdownLine> {
    vec![
        BreakdownLine::item("Monthly Savings Components:".to_string()),
        BreakdownLine::item(format!(
            "  + Staff cost reduction: {}",
            locale.format(report.staff_savings_monthly)
        )),
        BreakdownLine::item(format!(
            "  + Operational loss reduction: {}",
            locale.format(report.noshow_savings_monthly)
        )),
        BreakdownLine::item(format!(
            "  - Monthly maintenance cost: {}",
            locale.format(report.input.maintenance_cost)
        )),
        BreakdownLine::total(format!(
            "  = Net Monthly Savings: {}",
            locale.format(report.total_monthly_savings)
        )),
        BreakdownLine::item("Initial Investment Breakdown:".to_string()),
        BreakdownLine::item(format!("  - Setup cost: {}", locale.format(report.setup_cost))),
        BreakdownLine::item(format!(
            "  - Integration cost: {}",
            locale.format(report.integration_cost)
        )),
        BreakdownLine::item(format!("  - Training cost: {}", locale.format(report.training_cost))),
        BreakdownLine::total(format!(
            "  = Total Initial Investment: {}",
            locale.format(report.total_investment)
        )),
    ]
}

struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    /// Baseline position from the bottom edge, in millimetres.
    y: f32,
}

impl PageCursor<'_> {
    fn ensure_space(
        &mut self,
        height: f32,
    ) {
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn gap(
        &mut self,
        height: f32,
    ) {
        self.y -= height;
    }

    /// One line of text occupying `line_height` millimetres.
    fn text(
        &mut self,
        text: &str,
        size: f32,
        font: &IndirectFontRef,
        line_height: f32,
    ) {
        self.ensure_space(line_height);
        let baseline = self.y - line_height + (line_height - size * PT_TO_MM) / 2.0;
        self.layer.use_text(text, size, Mm(MARGIN), Mm(baseline.max(0.0)), font);
        self.y -= line_height;
    }

    /// Like [`PageCursor::text`], horizontally centred on the page.
    fn centered_text(
        &mut self,
        text: &str,
        size: f32,
        font: &IndirectFontRef,
        line_height: f32,
    ) {
        self.ensure_space(line_height);
        let baseline = self.y - line_height + (line_height - size * PT_TO_MM) / 2.0;
        self.layer.use_text(text, size, Mm(centered_x(text, size)), Mm(baseline.max(0.0)), font);
        self.y -= line_height;
    }

    /// Section title with a rule underneath.
    fn heading(
        &mut self,
        text: &str,
        fonts: &Fonts,
    ) {
        self.ensure_space(8.0 + 12.0);
        self.text(text, HEADING_SIZE, &fonts.bold, 8.0);
        self.rule(MARGIN, PAGE_WIDTH - MARGIN, self.y);
    }

    /// Two bordered cells of half the content width each.
    fn table_row(
        &mut self,
        label: &str,
        value: &str,
        font: &IndirectFontRef,
    ) {
        const ROW_HEIGHT: f32 = 8.0;
        const PADDING: f32 = 2.0;
        self.ensure_space(ROW_HEIGHT);

        let top = self.y;
        let bottom = top - ROW_HEIGHT;
        let middle = MARGIN + CONTENT_WIDTH / 2.0;
        let right = PAGE_WIDTH - MARGIN;
        let baseline = bottom + (ROW_HEIGHT - BODY_SIZE * PT_TO_MM) / 2.0;

        self.layer.use_text(label, BODY_SIZE, Mm(MARGIN + PADDING), Mm(baseline), font);
        let value_width = approximate_text_width(value, BODY_SIZE);
        self.layer.use_text(value, BODY_SIZE, Mm(right - PADDING - value_width), Mm(baseline), font);

        self.rule(MARGIN, right, top);
        self.rule(MARGIN, right, bottom);
        for x in [MARGIN, middle, right] {
            self.layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(x), Mm(top)), false),
                    (Point::new(Mm(x), Mm(bottom)), false),
                ],
                is_closed: false,
            });
        }
        self.y = bottom;
    }

    fn rule(
        &self,
        from_x: f32,
        to_x: f32,
        y: f32,
    ) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from_x), Mm(y)), false),
                (Point::new(Mm(to_x), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    /// Chart scaled to the printable width.
    fn image(
        &mut self,
        chart: &ChartArtifact,
    ) {
        let height = CONTENT_WIDTH * chart.height as f32 / chart.width.max(1) as f32;
        self.ensure_space(height);

        let image = Image::from(ImageXObject {
            width: Px(chart.width as usize),
            height: Px(chart.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: chart.rgb.clone(),
            image_filter: None,
            smask: None,
            clipping_bbox: None,
        });
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(self.y - height)),
                dpi: Some(chart.width as f32 * 25.4 / CONTENT_WIDTH),
                ..Default::default()
            },
        );
        self.y -= height;
    }
}

/// Left edge that centres `text` on the page, never left of the margin.
fn centered_x(
    text: &str,
    size: f32,
) -> f32 {
    ((PAGE_WIDTH - approximate_text_width(text, size)) / 2.0).max(MARGIN)
}

/// Average glyph width of a sans-serif face is about half the font size.
fn approximate_text_width(
    text: &str,
    size: f32,
) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}
