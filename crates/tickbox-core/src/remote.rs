//! Remote-store data model.
//!
//! The remote store is an opaque collaborator offering four operations:
//! fetch the issue, fetch the comment list, update one comment's text and
//! update the description. These are the shapes those operations exchange;
//! the transport lives in the browser crate.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One remote comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentItem {
    pub id: SmolStr,
    #[serde(default)]
    pub text: String,
}

/// The issue as the remote store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSnapshot {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comments: Vec<CommentItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_tolerates_missing_fields() {
        let issue: IssueSnapshot =
            serde_json::from_str(r#"{"summary": "title only"}"#).unwrap();
        assert_eq!(issue.summary, "title only");
        assert!(issue.description.is_empty());
        assert!(issue.comments.is_empty());
    }

    #[test]
    fn test_comment_items_parse() {
        let items: Vec<CommentItem> =
            serde_json::from_str(r#"[{"id": "c-1", "text": "_[ ] todo"}]"#).unwrap();
        assert_eq!(items[0].id, "c-1");
        assert_eq!(items[0].text, "_[ ] todo");
    }
}
