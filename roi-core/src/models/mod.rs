mod input;
mod metric;
mod persisted;
mod report;

pub use input::{ClientInfo, ConsultantInfo, InputError, RoiInput};
pub use metric::Metric;
pub use persisted::PersistedReport;
pub use report::ReportRecord;
