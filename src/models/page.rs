use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub repository: Option<String>,
}

/// `{"results": [...], "meta": {...}}` envelope used by the project endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsPage<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

/// Page-number envelope whose `next` field links to the following page.
#[derive(Debug, Clone, Deserialize)]
pub struct CursorPage<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}
