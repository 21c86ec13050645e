//! Plain-text result screens printed by the shell.

use std::fmt::Write;

use roi_core::{CurrencyLocale, Metric, PersistedReport, ReportRecord};

use crate::pipeline::{SubmissionOutcome, SyncReport};
use crate::state::SessionState;
use crate::utils::opt_text_display;

const RULE: &str = "------------------------------------------------------------";

/// Headline metrics, breakdowns, warnings and the sync result of one
/// submission.
pub fn render_submission(
    outcome: &SubmissionOutcome,
    state: &SessionState,
    locale: &CurrencyLocale,
) -> String {
    let report = &outcome.report;
    let mut out = String::new();

    let _ = writeln!(out, "ROI Analysis: {} ({})", report.input.client.name, report.input.client.location);
    let _ = writeln!(out, "Prepared by {} on {}", report.input.consultant.name, report.timestamp_label());
    let _ = writeln!(out, "{RULE}");
    write_metrics(&mut out, report, locale);
    let _ = writeln!(out, "{RULE}");
    write_breakdown(&mut out, report, locale);
    let _ = writeln!(out, "{RULE}");

    let charts: Vec<String> = outcome.charts.iter().map(|kind| kind.to_string()).collect();
    let _ = writeln!(out, "Charts:            {}", opt_text_display(Some(charts.join(", ").as_str())));
    let pdf_file = outcome.pdf_file.as_ref().map(|path| path.display().to_string());
    let _ = writeln!(out, "Local PDF:         {}", opt_text_display(pdf_file.as_deref()));
    let _ = writeln!(out, "Storage path:      {}", outcome.storage_path);

    match &outcome.sync {
        SyncReport::Synced(synced) => {
            let note = if synced.upload.is_reused() {
                " (existing file reused)"
            } else {
                ""
            };
            let _ = writeln!(out, "Report link:       {}{note}", synced.upload.url());
        }
        SyncReport::Skipped(reason) => {
            let _ = writeln!(out, "Sync skipped:      {reason}");
        }
        SyncReport::Failed(err) => {
            let _ = writeln!(out, "Sync error:        {err}");
        }
    }
    let _ = writeln!(out, "Sync status:       {}", state.sync_status);

    if !outcome.warnings.is_empty() {
        let _ = writeln!(out, "{RULE}");
        for warning in &outcome.warnings {
            let _ = writeln!(out, "warning: {warning}");
        }
    }
    out
}

fn write_metrics(
    out: &mut String,
    report: &ReportRecord,
    locale: &CurrencyLocale,
) {
    let rows = [
        ("Initial investment", locale.format(report.total_investment)),
        ("Annual savings", locale.format(report.annual_savings)),
        ("1-year ROI", report.roi_1_year.display_percent()),
        ("5-year ROI", report.roi_5_year.display_percent()),
        ("Payback (months)", report.payback_period.display_number()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<19}{value}");
    }
}

fn write_breakdown(
    out: &mut String,
    report: &ReportRecord,
    locale: &CurrencyLocale,
) {
    let _ = writeln!(out, "Monthly savings");
    let _ = writeln!(out, "  + staff cost reduction      {}", locale.format(report.staff_savings_monthly));
    let _ = writeln!(out, "  + operational loss reduced  {}", locale.format(report.noshow_savings_monthly));
    let _ = writeln!(out, "  - maintenance               {}", locale.format(report.input.maintenance_cost));
    let _ = writeln!(out, "  = net monthly savings       {}", locale.format(report.total_monthly_savings));
    let _ = writeln!(out, "Initial investment");
    let _ = writeln!(out, "  setup                       {}", locale.format(report.setup_cost));
    let _ = writeln!(out, "  integration                 {}", locale.format(report.integration_cost));
    let _ = writeln!(out, "  training                    {}", locale.format(report.training_cost));
    let _ = writeln!(out, "  = total                     {}", locale.format(report.total_investment));
}

/// One line per stored report, newest first.
pub fn render_history(
    rows: &[PersistedReport],
    locale: &CurrencyLocale,
) -> String {
    if rows.is_empty() {
        return "No reports stored yet.\n".to_string();
    }

    let mut out = String::new();
    for row in rows {
        let roi = Metric::from(row.roi_1_year).display_percent();
        let _ = writeln!(
            out,
            "{} | {} ({}) | {} | investment {} | 1-year ROI {} | {}",
            row.timestamp,
            row.client_name,
            row.client_location,
            row.consultant_name,
            locale.format(row.total_investment),
            roi,
            opt_text_display(row.pdf_link.as_deref()),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use roi_core::time::wib;
    use roi_core::{ReportBuilder, RoiInput, StoragePath};
    use roi_render::ChartKind;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::state::SyncStatus;

    fn outcome(sync: SyncReport) -> SubmissionOutcome {
        let timestamp = wib().with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
        let report = ReportBuilder::new(&RoiInput::default()).build(timestamp).unwrap();
        SubmissionOutcome {
            storage_path: StoragePath::for_report(&report),
            report,
            charts: vec![ChartKind::CashFlow, ChartKind::SavingsBreakdown],
            pdf_file: Some(PathBuf::from("reports/250131 Project Alpha Jakarta.pdf")),
            sync,
            warnings: vec!["Bundled font missing".to_string()],
        }
    }

    #[test]
    fn submission_shows_headline_metrics() {
        let state = SessionState::new();

        let text = render_submission(
            &outcome(SyncReport::Skipped("sync disabled".to_string())),
            &state,
            &CurrencyLocale::BASELINE,
        );

        assert!(text.contains("Initial investment Rp 720.000.000"), "{text}");
        assert!(text.contains("Annual savings     Rp 1.416.000.000"), "{text}");
        assert!(text.contains("1-year ROI         96.7%"), "{text}");
        assert!(text.contains("5-year ROI         883.3%"), "{text}");
        assert!(text.contains("Payback (months)   6.1"), "{text}");
    }

    #[test]
    fn submission_shows_breakdown_and_sync_details() {
        let mut state = SessionState::new();
        state.sync_status = SyncStatus::NotAttempted;

        let text = render_submission(
            &outcome(SyncReport::Skipped("sync disabled".to_string())),
            &state,
            &CurrencyLocale::BASELINE,
        );

        assert!(text.contains("staff cost reduction      Rp 48.000.000"), "{text}");
        assert!(text.contains("operational loss reduced  Rp 75.000.000"), "{text}");
        assert!(text.contains("Charts:            cash flow, savings breakdown"), "{text}");
        assert!(text.contains("Sync skipped:      sync disabled"), "{text}");
        assert!(text.contains("Sync status:       not attempted"), "{text}");
        assert!(text.contains("warning: Bundled font missing"), "{text}");
    }

    #[test]
    fn history_lists_rows_with_null_metrics() {
        let timestamp = wib().with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
        let input = RoiInput {
            setup_cost_usd: dec!(0),
            integration_cost_usd: dec!(0),
            training_cost_usd: dec!(0),
            ..RoiInput::default()
        };
        let row = ReportBuilder::new(&input).build(timestamp).unwrap().to_persisted();

        let text = render_history(&[row], &CurrencyLocale::BASELINE);

        assert_eq!(
            text,
            "2025-01-31 10:00:00 WIB | Project Alpha (Jakarta) |  | investment Rp 0 | 1-year ROI N/A | -\n"
        );
    }

    #[test]
    fn empty_history_says_so() {
        assert_eq!(render_history(&[], &CurrencyLocale::BASELINE), "No reports stored yet.\n");
    }
}
