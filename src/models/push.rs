use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single commit that is part of a push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub revision: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub repository_id: Option<u64>,
}

/// A push of one or more commits to a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Push {
    pub id: u64,
    /// Tip revision of the push
    pub revision: String,
    pub author: String,
    /// Unix timestamp in seconds
    pub push_timestamp: i64,
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub revision_count: u32,
    #[serde(default)]
    pub repository_id: Option<u64>,
}

impl Push {
    pub fn pushed_at(&self) -> Option<DateTime<Utc>> {
        (self.push_timestamp > 0)
            .then(|| DateTime::from_timestamp(self.push_timestamp, 0))
            .flatten()
    }

    pub fn short_revision(&self) -> &str {
        self.revision.get(..12).unwrap_or(&self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_ignores_undocumented_fields() {
        let push: Push = serde_json::from_str(
            r#"{
                "id": 12345,
                "revision": "abc123def4567890",
                "author": "dev@example.com",
                "push_timestamp": 1700000000,
                "revision_count": 2,
                "revisions": [{"revision": "abc123def4567890", "author": "dev", "comments": "Bug 1 - fix", "extra": 1}],
                "brand_new_field": {"nested": true}
            }"#,
        )
        .unwrap();

        assert_eq!(push.id, 12345);
        assert_eq!(push.revisions.len(), 1);
        assert_eq!(push.short_revision(), "abc123def456");
        assert_eq!(
            push.pushed_at().unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn test_short_revision_of_short_hash() {
        let push: Push = serde_json::from_str(
            r#"{"id": 1, "revision": "abc", "author": "a", "push_timestamp": 0}"#,
        )
        .unwrap();

        assert_eq!(push.short_revision(), "abc");
    }
}
