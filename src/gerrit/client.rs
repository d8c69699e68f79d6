//! Gerrit REST client

use crate::error::{Error, Result};
use crate::gerrit::{ChangeSource, RawChange};
use crate::types::ChangeNumber;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Prefix Gerrit puts in front of every JSON response to defeat XSSI
const XSSI_PREFIX: &str = ")]}'";

/// Query options for the candidate change query
const CANDIDATE_OPTIONS: [&str; 4] = [
    "CURRENT_REVISION",
    "DETAILED_LABELS",
    "DETAILED_ACCOUNTS",
    "SUBMITTABLE",
];

/// Gerrit service using reqwest (anonymous access)
pub struct GerritService {
    client: Client,
    base_url: String,
    project: String,
}

impl GerritService {
    /// Create a new Gerrit service for `project` on the server at `base_url`
    pub fn new(base_url: &str, project: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("mergeable-changes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Gerrit(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Search query selecting open, approved and verified changes
    pub fn candidate_query(&self) -> String {
        format!(
            "project:{} status:open label:Code-Review=2 label:Verified=1",
            self.project
        )
    }

    /// GET `url` with `query` and return the response body.
    ///
    /// On a non-success status, returns the status alongside the error.
    async fn get_body(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<(StatusCode, String), (Option<StatusCode>, Error)> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| (e.status(), Error::Http(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err((
                Some(status),
                Error::Gerrit(format!("GET {url} returned {status}")),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| (Some(status), Error::Http(e)))?;
        Ok((status, body))
    }
}

fn strip_xssi(body: &str) -> &str {
    body.strip_prefix(XSSI_PREFIX).unwrap_or(body).trim_start()
}

/// Decode a Gerrit JSON change list, stripping the XSSI prefix if present
fn decode_changes(body: &str) -> Result<Vec<RawChange>> {
    Ok(serde_json::from_str(strip_xssi(body))?)
}

/// Decode a candidate list element by element.
///
/// Only a body that is not a JSON list fails as a whole. An element whose
/// fields have the wrong shape becomes `Error::MalformedRecord`.
fn decode_candidates(body: &str) -> Result<Vec<Result<RawChange>>> {
    let values: Vec<Value> = serde_json::from_str(strip_xssi(body))?;
    Ok(values.into_iter().map(decode_candidate).collect())
}

fn decode_candidate(value: Value) -> Result<RawChange> {
    let number = value.get("_number").and_then(Value::as_u64);
    serde_json::from_value(value).map_err(|e| {
        warn!(change = ?number, error = %e, "undecodable change in candidate result");
        Error::MalformedRecord {
            number,
            reason: format!("undecodable payload: {e}"),
        }
    })
}

#[async_trait]
impl ChangeSource for GerritService {
    async fn query_candidates(&self) -> Result<Vec<Result<RawChange>>> {
        let url = self.api_url("/changes/");
        let q = self.candidate_query();
        debug!(query = %q, "querying candidate changes");

        let mut params = vec![("q", q.as_str())];
        params.extend(CANDIDATE_OPTIONS.iter().map(|o| ("o", *o)));

        let changes = self
            .get_body(&url, &params)
            .await
            .map_err(|(_, e)| e)
            .and_then(|(_, body)| decode_candidates(&body))
            .map_err(|e| Error::DataSourceUnavailable(e.to_string()))?;

        debug!(count = changes.len(), "fetched candidate changes");
        Ok(changes)
    }

    async fn submitted_together(&self, number: ChangeNumber) -> Result<Vec<RawChange>> {
        debug!(change = number, "querying submitted_together");
        let url = self.api_url(&format!("/changes/{number}/submitted_together"));

        let series = self
            .get_body(&url, &[("o", "DETAILED_ACCOUNTS")])
            .await
            .and_then(|(status, body)| decode_changes(&body).map_err(|e| (Some(status), e)))
            .map_err(|(status, e)| Error::DependencyQuery {
                number,
                message: e.to_string(),
                status: status.map(|s| s.as_u16()),
            })?;

        debug!(change = number, size = series.len(), "fetched series");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const CANDIDATES: &str = r#")]}'
[
  {
    "_number": 100,
    "project": "spdk/spdk",
    "subject": "bdev: add thing",
    "owner": {"name": "Jane Doe"},
    "mergeable": true,
    "submittable": true,
    "labels": {"Code-Review": {"all": [{"value": 2, "name": "Reviewer One"}]}},
    "revisions": {"abc": {"_number": 1, "created": "2024-08-01 10:00:00.000000000"}}
  }
]"#;

    #[test]
    fn test_decode_strips_xssi_prefix() {
        let changes = decode_changes(CANDIDATES).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].number, Some(100));
    }

    #[test]
    fn test_decode_without_prefix() {
        let changes = decode_changes(r#"[{"_number": 5}]"#).unwrap();
        assert_eq!(changes[0].number, Some(5));
    }

    #[test]
    fn test_mistyped_candidate_does_not_fail_the_list() {
        let body = r#")]}'
[
  {"_number": 100, "project": "spdk/spdk", "mergeable": true},
  {"_number": 101, "project": "spdk/spdk", "mergeable": "yes"},
  {"project": "spdk/spdk", "revisions": null}
]"#;

        let changes = decode_candidates(body).unwrap();
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].as_ref().unwrap().number, Some(100));
        assert!(matches!(
            changes[1],
            Err(Error::MalformedRecord {
                number: Some(101),
                ..
            })
        ));
        assert!(matches!(
            changes[2],
            Err(Error::MalformedRecord { number: None, .. })
        ));
    }

    #[test]
    fn test_candidate_body_that_is_not_a_list_fails() {
        assert!(decode_candidates("<html>maintenance</html>").is_err());
        assert!(decode_candidates(r#"{"_number": 1}"#).is_err());
    }

    #[test]
    fn test_candidate_query_names_project_and_labels() {
        let service = GerritService::new("https://review.spdk.io/", "spdk/spdk").unwrap();
        assert_eq!(
            service.candidate_query(),
            "project:spdk/spdk status:open label:Code-Review=2 label:Verified=1"
        );
        assert_eq!(
            service.api_url("/changes/"),
            "https://review.spdk.io/changes/"
        );
    }

    #[tokio::test]
    async fn test_query_candidates_sends_options() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/changes/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "q".into(),
                    "project:spdk/spdk status:open label:Code-Review=2 label:Verified=1".into(),
                ),
                Matcher::Regex("o=CURRENT_REVISION".into()),
                Matcher::Regex("o=DETAILED_LABELS".into()),
                Matcher::Regex("o=DETAILED_ACCOUNTS".into()),
                Matcher::Regex("o=SUBMITTABLE".into()),
            ]))
            .with_status(200)
            .with_body(CANDIDATES)
            .create_async()
            .await;

        let service = GerritService::new(&server.url(), "spdk/spdk").unwrap();
        let changes = service.query_candidates().await.unwrap();

        mock.assert_async().await;
        assert_eq!(changes.len(), 1);
        let change = changes[0].as_ref().unwrap();
        assert_eq!(change.subject.as_deref(), Some("bdev: add thing"));
    }

    #[tokio::test]
    async fn test_query_candidates_server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/changes/")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let service = GerritService::new(&server.url(), "spdk/spdk").unwrap();
        let err = service.query_candidates().await.unwrap_err();
        assert!(matches!(err, Error::DataSourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_query_candidates_garbage_body_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/changes/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let service = GerritService::new(&server.url(), "spdk/spdk").unwrap();
        let err = service.query_candidates().await.unwrap_err();
        assert!(matches!(err, Error::DataSourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_submitted_together_forbidden_is_dependency_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/changes/103/submitted_together")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("not permitted")
            .create_async()
            .await;

        let service = GerritService::new(&server.url(), "spdk/spdk").unwrap();
        let err = service.submitted_together(103).await.unwrap_err();

        assert!(err.is_permission_denied());
        match err {
            Error::DependencyQuery { number, .. } => assert_eq!(number, 103),
            other => panic!("Expected DependencyQuery error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submitted_together_returns_series() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/changes/102/submitted_together")
            .match_query(Matcher::UrlEncoded("o".into(), "DETAILED_ACCOUNTS".into()))
            .with_status(200)
            .with_body(")]}'\n[{\"_number\": 102}, {\"_number\": 101}]")
            .create_async()
            .await;

        let service = GerritService::new(&server.url(), "spdk/spdk").unwrap();
        let series = service.submitted_together(102).await.unwrap();
        let numbers: Vec<_> = series.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![Some(102), Some(101)]);
    }
}
