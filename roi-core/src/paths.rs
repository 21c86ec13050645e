use std::fmt;

use crate::models::ReportRecord;
use crate::time::datestamp;

/// Where a report's PDF is stored: `{base}/{base}.pdf`, where `base` is
/// `"{yymmdd} {client name} {client location}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath {
    base_name: String,
}

impl StoragePath {
    pub fn for_report(report: &ReportRecord) -> Self {
        let base_name = format!(
            "{} {} {}",
            datestamp(&report.timestamp),
            clean_segment(&report.input.client.name),
            clean_segment(&report.input.client.location),
        );
        Self { base_name }
    }

    /// Directory part of the key.
    pub fn folder(&self) -> &str {
        &self.base_name
    }

    /// File name used both in the bucket and for the local download.
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.base_name)
    }

    /// Full object key inside the bucket.
    pub fn key(&self) -> String {
        format!("{}/{}", self.base_name, self.file_name())
    }
}

impl fmt::Display for StoragePath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Path separators in user-entered names would split the key.
fn clean_segment(value: &str) -> String {
    value.trim().replace(['/', '\\'], "-")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::ReportBuilder;
    use crate::models::{ClientInfo, RoiInput};
    use crate::time::wib;

    fn report_for(client: ClientInfo) -> ReportRecord {
        let input = RoiInput {
            client,
            ..RoiInput::default()
        };
        let timestamp = wib().with_ymd_and_hms(2025, 3, 7, 9, 30, 0).unwrap();
        ReportBuilder::new(&input).build(timestamp).unwrap()
    }

    #[test]
    fn key_repeats_base_name_as_folder_and_file() {
        let path = StoragePath::for_report(&report_for(ClientInfo {
            name: "RS Sehat".to_string(),
            location: "Bandung".to_string(),
        }));

        assert_eq!(path.folder(), "250307 RS Sehat Bandung");
        assert_eq!(path.file_name(), "250307 RS Sehat Bandung.pdf");
        assert_eq!(path.key(), "250307 RS Sehat Bandung/250307 RS Sehat Bandung.pdf");
    }

    #[test]
    fn separators_in_names_do_not_create_folders() {
        let path = StoragePath::for_report(&report_for(ClientInfo {
            name: "Klinik A/B".to_string(),
            location: " Surabaya ".to_string(),
        }));

        assert_eq!(path.folder(), "250307 Klinik A-B Surabaya");
    }
}
