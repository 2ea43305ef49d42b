//! Site configuration (`_config.yml`).
//!
//! Owned by the settings store, read by every page render.

use serde::{Deserialize, Serialize};

/// Main site configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub theme: ThemeSettings,
    pub menu: Vec<MenuItem>,
    pub social: Vec<SocialLink>,
    pub blog: BlogSettings,
    pub footer: FooterSettings,
    pub url: UrlSettings,
}

impl SiteConfig {
    /// Page size for the home page, never zero.
    pub fn posts_per_page(&self) -> u64 {
        self.blog.posts_per_page.max(1)
    }

    /// Resolve a dotted path such as `site.title` or `menu.0.url`.
    ///
    /// This is the only dynamic access into the configuration; templates
    /// reach it through the `config` function.
    pub fn lookup(&self, path: &str) -> Option<serde_json::Value> {
        let root = serde_json::to_value(self).ok()?;
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(root, |value, segment| match value {
                serde_json::Value::Object(mut map) => map.remove(segment),
                serde_json::Value::Array(mut items) => {
                    let index = segment.parse::<usize>().ok()?;
                    (index < items.len()).then(|| items.swap_remove(index))
                }
                _ => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Quill".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "Admin".to_string(),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub name: String,
    pub primary_color: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            primary_color: "#3b82f6".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogSettings {
    pub posts_per_page: u64,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self { posts_per_page: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSettings {
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlSettings {
    pub base: String,
}

impl Default for UrlSettings {
    fn default() -> Self {
        Self {
            base: "http://localhost:3000".to_string(),
        }
    }
}
