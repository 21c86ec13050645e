//! Raster charts for the dashboard and the PDF.
//!
//! Each chart is drawn independently into an RGB buffer. A chart that fails
//! turns into a warning and the other one is still produced. Without
//! registered fonts the charts are still drawn, minus all text.

use std::fmt;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use roi_core::calculations::common::MONTHS_PER_YEAR;
use roi_core::{CurrencyLocale, ReportRecord};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::fonts::{CHART_FONT_FAMILY, chart_fonts_registered};

/// Five years of monthly projections.
pub const PROJECTION_MONTHS: u32 = 60;

pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 500;

const LINE_COLOR: RGBColor = RGBColor(0x2E, 0x86, 0xC1);
const ZERO_LINE_COLOR: RGBColor = RGBColor(0xE7, 0x4C, 0x3C);
const GRID_COLOR: RGBColor = RGBColor(0xDD, 0xDD, 0xDD);
const TEXT_COLOR: RGBColor = RGBColor(0x33, 0x33, 0x33);
const BAR_COLORS: [RGBColor; 3] = [
    RGBColor(0x27, 0xAE, 0x60),
    RGBColor(0xF1, 0xC4, 0x0F),
    RGBColor(0xE7, 0x4C, 0x3C),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    CashFlow,
    SavingsBreakdown,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::CashFlow => "5-Year Cumulative Cash Flow Projection",
            Self::SavingsBreakdown => "Annual Savings Sources",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::CashFlow => f.write_str("cash flow"),
            Self::SavingsBreakdown => f.write_str("savings breakdown"),
        }
    }
}

/// A rendered chart: tightly packed 8-bit RGB rows, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Charts that rendered, plus one warning per chart that did not.
#[derive(Debug, Default)]
pub struct ChartSet {
    pub artifacts: Vec<ChartArtifact>,
    pub warnings: Vec<String>,
}

/// `(month, savings × month − investment)` for months 1 to 60. The series
/// ends early at the first month whose value does not fit a `Decimal`.
pub fn cash_flow_series(report: &ReportRecord) -> Vec<(u32, Decimal)> {
    (1..=PROJECTION_MONTHS)
        .map_while(|month| {
            let cumulative = report
                .total_monthly_savings
                .checked_mul(Decimal::from(month))
                .and_then(|saved| saved.checked_sub(report.total_investment));
            if cumulative.is_none() {
                warn!(month, "cumulative cash flow overflows, projection cut short");
            }
            cumulative.map(|value| (month, value))
        })
        .collect()
}

/// Annualized staff savings, annualized operational savings and total
/// annual savings, with their bar labels.
pub fn savings_breakdown(report: &ReportRecord) -> [(&'static str, Decimal); 3] {
    let annualize = |monthly: Decimal| monthly.checked_mul(MONTHS_PER_YEAR).unwrap_or(Decimal::ZERO);
    [
        ("Staff savings", annualize(report.staff_savings_monthly)),
        ("Operational savings", annualize(report.noshow_savings_monthly)),
        ("Total annual", report.annual_savings),
    ]
}

/// Renders both charts. Text is drawn only when `text` is set and chart
/// fonts are registered; otherwise a warning says the charts are unlabelled.
pub fn generate_charts(
    report: &ReportRecord,
    locale: &CurrencyLocale,
    text: bool,
) -> ChartSet {
    let mut set = ChartSet::default();
    let labels = text && chart_fonts_registered();
    if !labels {
        warn!("chart fonts unavailable, drawing charts without text");
        set.warnings
            .push("Chart fonts unavailable; charts were drawn without titles or labels.".to_string());
    }

    let cash_flow = render_cash_flow(report, locale, labels);
    let breakdown = render_savings_breakdown(report, locale, labels);
    for result in [cash_flow, breakdown] {
        match result {
            Ok(artifact) => {
                debug!(kind = %artifact.kind, "chart rendered");
                set.artifacts.push(artifact);
            }
            Err(err) => {
                warn!(error = %err, "chart skipped");
                set.warnings.push(err.to_string());
            }
        }
    }
    set
}

pub fn render_cash_flow(
    report: &ReportRecord,
    locale: &CurrencyLocale,
    labels: bool,
) -> Result<ChartArtifact, RenderError> {
    let kind = ChartKind::CashFlow;
    let points: Vec<(u32, f64)> = cash_flow_series(report)
        .into_iter()
        .map(|(month, value)| (month, value.to_f64().unwrap_or(0.0)))
        .collect();
    let (y_min, y_max) = value_range(points.iter().map(|(_, v)| *v));

    draw(kind, |root| {
        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if labels {
            builder
                .caption(kind.title(), caption_style())
                .x_label_area_size(45)
                .y_label_area_size(140);
        }
        let mut chart = builder.build_cartesian_2d(1u32..PROJECTION_MONTHS, y_min..y_max)?;

        if labels {
            chart
                .configure_mesh()
                .light_line_style(GRID_COLOR.stroke_width(1))
                .x_desc("Month")
                .y_desc("Cumulative cash flow (IDR)")
                .y_label_formatter(&|v| locale.format_f64(*v))
                .label_style((CHART_FONT_FAMILY, 13).into_font().color(&TEXT_COLOR))
                .draw()?;
        }

        chart.draw_series(LineSeries::new(
            [(1, 0.0), (PROJECTION_MONTHS, 0.0)],
            ZERO_LINE_COLOR.stroke_width(1),
        ))?;
        chart.draw_series(LineSeries::new(points.iter().copied(), LINE_COLOR.stroke_width(2)))?;
        chart.draw_series(
            points
                .iter()
                .map(|(month, value)| Circle::new((*month, *value), 3, LINE_COLOR.filled())),
        )?;
        Ok(())
    })
}

pub fn render_savings_breakdown(
    report: &ReportRecord,
    locale: &CurrencyLocale,
    labels: bool,
) -> Result<ChartArtifact, RenderError> {
    let kind = ChartKind::SavingsBreakdown;
    let bars = savings_breakdown(report);
    let values: Vec<f64> = bars
        .iter()
        .map(|(_, value)| value.to_f64().unwrap_or(0.0))
        .collect();
    let (y_min, y_max) = value_range(values.iter().copied());

    draw(kind, |root| {
        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if labels {
            builder
                .caption(kind.title(), caption_style())
                .x_label_area_size(45)
                .y_label_area_size(140);
        }
        let mut chart = builder
            .build_cartesian_2d((0u32..bars.len() as u32).into_segmented(), y_min..y_max)?;

        if labels {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .light_line_style(GRID_COLOR.stroke_width(1))
                .y_desc("Savings (IDR)")
                .y_label_formatter(&|v| locale.format_f64(*v))
                .x_label_formatter(&|segment| match segment {
                    SegmentValue::CenterOf(i) => bars
                        .get(*i as usize)
                        .map(|(name, _)| name.to_string())
                        .unwrap_or_default(),
                    _ => String::new(),
                })
                .label_style((CHART_FONT_FAMILY, 13).into_font().color(&TEXT_COLOR))
                .draw()?;
        }

        chart.draw_series(values.iter().enumerate().map(|(i, value)| {
            let i = i as u32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *value)],
                BAR_COLORS[i as usize % BAR_COLORS.len()].filled(),
            );
            bar.set_margin(0, 0, 40, 40);
            bar
        }))?;

        if labels {
            let style = TextStyle::from((CHART_FONT_FAMILY, 14).into_font())
                .color(&TEXT_COLOR)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(bars.iter().zip(&values).enumerate().map(|(i, ((_, amount), value))| {
                Text::new(
                    locale.format(*amount),
                    (SegmentValue::CenterOf(i as u32), *value),
                    style.clone(),
                )
            }))?;
        }
        Ok(())
    })
}

fn caption_style() -> TextStyle<'static> {
    (CHART_FONT_FAMILY, 24)
        .into_font()
        .style(FontStyle::Bold)
        .color(&TEXT_COLOR)
}

type DrawResult = Result<(), Box<dyn std::error::Error + 'static>>;

/// Runs `paint` on a blank white canvas and returns the pixels.
fn draw<F>(
    kind: ChartKind,
    paint: F,
) -> Result<ChartArtifact, RenderError>
where
    F: FnOnce(DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult,
{
    let chart_error = |reason: String| RenderError::Chart { kind, reason };
    let mut rgb = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| chart_error(e.to_string()))?;
        paint(root.clone()).map_err(|e| chart_error(e.to_string()))?;
        root.present().map_err(|e| chart_error(e.to_string()))?;
    }
    Ok(ChartArtifact {
        kind,
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        rgb,
    })
}

/// Y range covering every value and zero, with headroom for bar labels.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = (max - min).max(1.0);
    let pad = span * 0.1;
    (if min < 0.0 { min - pad } else { 0.0 }, max + pad)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use roi_core::time::wib;
    use roi_core::{ReportBuilder, RoiInput};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::fonts::{FontSet, register_chart_fonts};

    fn report(input: RoiInput) -> ReportRecord {
        let timestamp = wib().with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
        ReportBuilder::new(&input).build(timestamp).unwrap()
    }

    #[test]
    fn cash_flow_covers_sixty_months() {
        let series = cash_flow_series(&report(RoiInput::default()));

        assert_eq!(series.len(), 60);
        assert_eq!(series[0], (1, dec!(118000000) - dec!(720000000)));
        assert_eq!(series[59], (60, dec!(118000000) * dec!(60) - dec!(720000000)));
    }

    #[test]
    fn cash_flow_stops_at_the_first_overflowing_month() {
        let mut record = report(RoiInput::default());
        record.total_monthly_savings = dec!(2000000000000000000000000000);

        let series = cash_flow_series(&record);

        assert_eq!(series.len(), 39);
        assert_eq!(series.last().map(|(month, _)| *month), Some(39));
        assert!(series.iter().all(|(_, value)| *value > Decimal::ZERO));
    }

    #[test]
    fn breakdown_annualizes_monthly_savings() {
        let bars = savings_breakdown(&report(RoiInput::default()));

        assert_eq!(bars[0], ("Staff savings", dec!(576000000)));
        assert_eq!(bars[1], ("Operational savings", dec!(900000000)));
        assert_eq!(bars[2], ("Total annual", dec!(1416000000)));
    }

    #[test]
    fn value_range_always_includes_zero() {
        assert_eq!(value_range([10.0, 20.0].into_iter()).0, 0.0);

        let (lo, hi) = value_range([-50.0, -10.0].into_iter());
        assert!(lo < -50.0);
        assert!(hi > 0.0);
    }

    #[test]
    fn value_range_of_flat_zero_is_not_empty() {
        let (lo, hi) = value_range([0.0, 0.0].into_iter());

        assert!(hi > lo);
    }

    #[test]
    fn charts_render_to_rgb_buffers() {
        assert!(register_chart_fonts(&FontSet::bundled()));

        let set = generate_charts(&report(RoiInput::default()), &CurrencyLocale::BASELINE, true);

        assert!(set.warnings.is_empty(), "{:?}", set.warnings);
        assert_eq!(set.artifacts.len(), 2);
        for artifact in &set.artifacts {
            assert_eq!(artifact.rgb.len(), (artifact.width * artifact.height * 3) as usize);
            assert!(artifact.rgb.iter().any(|&b| b != 0xFF), "chart is blank");
        }
    }

    #[test]
    fn charts_without_text_carry_a_warning() {
        let set = generate_charts(&report(RoiInput::default()), &CurrencyLocale::BASELINE, false);

        assert_eq!(set.artifacts.len(), 2);
        assert_eq!(set.warnings.len(), 1);
        assert!(set.warnings[0].contains("without titles or labels"), "{:?}", set.warnings);
    }

    #[test]
    fn labels_change_the_pixels() {
        assert!(register_chart_fonts(&FontSet::bundled()));
        let record = report(RoiInput::default());

        let plain = render_cash_flow(&record, &CurrencyLocale::BASELINE, false).unwrap();
        let labelled = render_cash_flow(&record, &CurrencyLocale::BASELINE, true).unwrap();

        assert_ne!(plain.rgb, labelled.rgb);
    }

    #[test]
    fn negative_savings_still_render() {
        let set = generate_charts(
            &report(RoiInput {
                admin_staff: 0,
                monthly_appointments: 0,
                ..RoiInput::default()
            }),
            &CurrencyLocale::BASELINE,
            false,
        );

        assert_eq!(set.artifacts.len(), 2);
    }
}
