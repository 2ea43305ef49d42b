//! Data Transfer Objects - request types for pages, forms and the API.

use serde::{Deserialize, Serialize};

/// Admin login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `?page=&limit=` on listings. Missing or unparsable values fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        positive(self.page.as_deref()).unwrap_or(1)
    }

    pub fn limit_or(&self, default: u64) -> u64 {
        positive(self.limit.as_deref()).unwrap_or(default)
    }
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0)
}

/// `?q=` on search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Admin settings form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub site_title: String,
    #[serde(default)]
    pub site_subtitle: String,
    #[serde(default)]
    pub footer_html: String,
    #[serde(default)]
    pub posts_per_page: Option<String>,
}

impl SettingsForm {
    pub fn posts_per_page(&self) -> Option<u64> {
        positive(self.posts_per_page.as_deref())
    }
}
