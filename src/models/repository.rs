use std::fmt;

use serde::{Deserialize, Serialize};

/// Version control system backing a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DvcsType {
    Hg,
    Git,
    #[serde(other)]
    Other,
}

impl fmt::Display for DvcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hg => "hg",
            Self::Git => "git",
            Self::Other => "other",
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A repository (project) known to Treeherder, e.g. `mozilla-central`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub dvcs_type: DvcsType,
    #[serde(default)]
    pub repository_group: RepositoryGroup,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub codebase: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active_status: String,
    #[serde(default)]
    pub life_cycle_order: Option<i64>,
    #[serde(default)]
    pub performance_alerts_enabled: bool,
    #[serde(default)]
    pub expire_performance_data: bool,
    #[serde(default)]
    pub is_try_repo: bool,
    #[serde(default)]
    pub tc_root_url: Option<String>,
}

impl Repository {
    pub fn is_active(&self) -> bool {
        self.active_status == "active"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_minimal_payload() {
        let repo: Repository =
            serde_json::from_str(r#"{"id": 4, "name": "autoland", "dvcs_type": "hg"}"#).unwrap();

        assert_eq!(repo.name, "autoland");
        assert_eq!(repo.dvcs_type, DvcsType::Hg);
        assert!(!repo.is_active());
        assert!(repo.branch.is_none());
    }

    #[test]
    fn test_repository_unknown_dvcs_type() {
        let repo: Repository =
            serde_json::from_str(r#"{"id": 4, "name": "x", "dvcs_type": "svn"}"#).unwrap();

        assert_eq!(repo.dvcs_type, DvcsType::Other);
    }

    #[test]
    fn test_repository_requires_name() {
        let result: Result<Repository, _> =
            serde_json::from_str(r#"{"id": 4, "dvcs_type": "git"}"#);

        assert!(result.is_err());
    }
}
