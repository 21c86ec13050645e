use async_trait::async_trait;
use reqwest::Response;
use roi_core::{PersistedReport, ReportRepository, RepositoryError};
use tracing::debug;

use crate::client::SupabaseClient;

/// Report table access through PostgREST (`/rest/v1/{table}`).
#[derive(Debug, Clone)]
pub struct SupabaseReportRepository {
    client: SupabaseClient,
}

impl SupabaseReportRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

async fn check(response: Response) -> Result<Response, RepositoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RepositoryError::Database(format!("{status}: {body}")))
}

#[async_trait]
impl ReportRepository for SupabaseReportRepository {
    async fn insert_report(
        &self,
        table: &str,
        report: &PersistedReport,
    ) -> Result<(), RepositoryError> {
        let url = self.client.endpoint(["rest", "v1", table]);
        let response = self
            .client
            .post(url)
            .header("Prefer", "return=minimal")
            .json(report)
            .send()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        check(response).await?;
        debug!(table, "report row inserted");
        Ok(())
    }

    async fn list_reports(
        &self,
        table: &str,
        limit: u32,
    ) -> Result<Vec<PersistedReport>, RepositoryError> {
        let mut url = self.client.endpoint(["rest", "v1", table]);
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "timestamp.desc")
            .append_pair("limit", &limit.to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        let body = check(response)
            .await?
            .text()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        parse_rows(&body)
    }
}

/// Rows may carry extra columns (`id`, `created_at`); they are ignored.
fn parse_rows(body: &str) -> Result<Vec<PersistedReport>, RepositoryError> {
    serde_json::from_str(body).map_err(|e| RepositoryError::Database(format!("unexpected response: {e}")))
}
