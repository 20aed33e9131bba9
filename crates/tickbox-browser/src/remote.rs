//! Remote sync adapter: the tracker's REST API.
//!
//! Implements the four operations of the remote-store boundary. Failures are
//! reported, never retried; callers treat every write as fire-and-forget.

use smol_str::SmolStr;

use tickbox_core::{CommentItem, IssueSnapshot};

/// Fields requested when fetching the issue.
const ISSUE_FIELDS: &str = "summary,description,comments(id,text)";

/// Errors from the remote boundary.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("remote responded with status {status}")]
    Status { status: u16 },
}

/// REST client bound to one issue page.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    http: reqwest::Client,
    base: String,
    issue: SmolStr,
}

impl TrackerClient {
    pub fn new(base: impl Into<String>, issue: impl Into<SmolStr>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into(),
            issue: issue.into(),
        }
    }

    /// Build a client from the current page URL.
    pub fn from_location(location: &web_sys::Location) -> Option<Self> {
        let href = location.href().ok()?;
        Self::from_url(&href)
    }

    /// Build a client from an issue page URL of the form
    /// `https://host/path/issue/KEY-123[...]`.
    pub fn from_url(href: &str) -> Option<Self> {
        let (base, issue) = split_issue_url(href)?;
        Some(Self::new(base, issue))
    }

    pub fn issue_id(&self) -> &str {
        &self.issue
    }

    fn issue_endpoint(&self) -> String {
        format!("{}/api/issues/{}", self.base, self.issue)
    }

    /// Fetch the issue: summary, description and comment list.
    pub async fn fetch_issue(&self) -> Result<IssueSnapshot, RemoteError> {
        let url = format!("{}?fields={}", self.issue_endpoint(), ISSUE_FIELDS);
        let response = self.http.get(url).send().await?;
        Ok(Self::check(response)?.json().await?)
    }

    /// Fetch the comment list alone.
    pub async fn fetch_comments(&self) -> Result<Vec<CommentItem>, RemoteError> {
        let url = format!("{}/comments?fields=id,text", self.issue_endpoint());
        let response = self.http.get(url).send().await?;
        Ok(Self::check(response)?.json().await?)
    }

    /// Replace the issue description.
    pub async fn update_description(&self, text: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .post(self.issue_endpoint())
            .json(&serde_json::json!({ "description": text }))
            .send()
            .await?;
        Self::check(response).map(drop)
    }

    /// Replace one comment's text.
    pub async fn update_comment(&self, key: &str, text: &str) -> Result<(), RemoteError> {
        let url = format!("{}/comments/{}", self.issue_endpoint(), key);
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        Self::check(response).map(drop)
    }

    fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(RemoteError::Status {
                status: status.as_u16(),
            })
        }
    }
}

/// Split an issue page URL into (base endpoint, issue id).
fn split_issue_url(href: &str) -> Option<(String, SmolStr)> {
    let at = href.find("/issue/")?;
    let base = &href[..at];
    let rest = &href[at + "/issue/".len()..];
    let issue: String = rest
        .chars()
        .take_while(|c| !matches!(c, '/' | '?' | '#'))
        .collect();
    if base.is_empty() || issue.is_empty() {
        return None;
    }
    Some((base.to_string(), SmolStr::new(issue)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_issue_url() {
        let (base, issue) =
            split_issue_url("https://tracker.example.com/bugs/issue/TP-1234").unwrap();
        assert_eq!(base, "https://tracker.example.com/bugs");
        assert_eq!(issue, "TP-1234");
    }

    #[test]
    fn test_split_issue_url_trims_tail() {
        let (_, issue) = split_issue_url("https://t.example/issue/TP-7?tab=comments").unwrap();
        assert_eq!(issue, "TP-7");
        let (_, issue) = split_issue_url("https://t.example/issue/TP-8#focus").unwrap();
        assert_eq!(issue, "TP-8");
    }

    #[test]
    fn test_split_issue_url_rejects() {
        assert!(split_issue_url("https://t.example/dashboard").is_none());
        assert!(split_issue_url("https://t.example/issue/").is_none());
    }
}
