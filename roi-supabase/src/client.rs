use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("project URL is not valid: {0}")]
    InvalidUrl(String),

    #[error("API key is missing")]
    MissingKey,

    #[error("API key contains characters not allowed in a header")]
    InvalidKey,

    #[error("HTTP client could not be built: {0}")]
    Build(#[from] reqwest::Error),
}

/// Authenticated handle on one Supabase project.
///
/// Cheap to clone; the storage and table halves of the backend share one.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base: Url,
}

impl SupabaseClient {
    /// `project_url` is the project root, e.g. `https://xyz.supabase.co`.
    pub fn new(
        project_url: &str,
        api_key: &str,
    ) -> Result<Self, ClientError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ClientError::MissingKey);
        }

        let base = Url::parse(project_url.trim())
            .map_err(|e| ClientError::InvalidUrl(format!("{project_url}: {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(project_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| ClientError::InvalidKey)?;
        let bearer =
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| ClientError::InvalidKey)?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self { http, base })
    }

    /// Project URL with `segments` appended, each percent-encoded.
    pub fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/'));
            }
        }
        url
    }

    pub fn post(
        &self,
        url: Url,
    ) -> RequestBuilder {
        self.http.post(url)
    }

    pub fn get(
        &self,
        url: Url,
    ) -> RequestBuilder {
        self.http.get(url)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn endpoint_appends_and_encodes_segments() {
        let client = SupabaseClient::new("https://xyz.supabase.co/", "key").unwrap();

        let url = client.endpoint(["storage", "v1", "object", "laporan-pdf", "a b/a b.pdf"]);

        assert_eq!(
            url.as_str(),
            "https://xyz.supabase.co/storage/v1/object/laporan-pdf/a%20b/a%20b.pdf"
        );
    }

    #[test]
    fn missing_key_is_rejected() {
        assert!(matches!(
            SupabaseClient::new("https://xyz.supabase.co", "  "),
            Err(ClientError::MissingKey)
        ));
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(matches!(
            SupabaseClient::new("not a url", "key"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            SupabaseClient::new("mailto:someone@example.com", "key"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
