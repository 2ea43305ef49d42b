//! YAML-backed site settings (`_config.yml`).

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use quill_core::domain::SiteConfig;
use quill_core::ports::{SettingsError, SettingsStore};

/// Site configuration loaded from a YAML file and rewritten wholesale on save.
pub struct YamlSettingsStore {
    path: PathBuf,
    current: RwLock<Arc<SiteConfig>>,
}

impl YamlSettingsStore {
    /// Load the file at `path`. A missing file yields the defaults.
    ///
    /// Called once at startup, before any request worker runs.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(SettingsError::Read(e.to_string())),
        };
        let config = parse_config(&path, raw)?;
        tracing::info!(path = %path.display(), title = %config.site.title, "Site settings loaded");

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(config)),
        })
    }

    fn swap(&self, config: SiteConfig) -> Arc<SiteConfig> {
        let config = Arc::new(config);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = config.clone();
        config
    }

    /// Sibling of the settings file, so the final rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "_config.yml".to_string());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4().simple()))
    }
}

fn parse_config(path: &Path, raw: Option<String>) -> Result<SiteConfig, SettingsError> {
    let Some(raw) = raw else {
        tracing::warn!(path = %path.display(), "Settings file not found, using defaults");
        return Ok(SiteConfig::default());
    };
    serde_yaml::from_str(&raw).map_err(|e| SettingsError::Parse(e.to_string()))
}

async fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

#[async_trait]
impl SettingsStore for YamlSettingsStore {
    fn current(&self) -> Arc<SiteConfig> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn reload(&self) -> Result<Arc<SiteConfig>, SettingsError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(SettingsError::Read(e.to_string())),
        };
        let config = parse_config(&self.path, raw)?;
        Ok(self.swap(config))
    }

    /// Writes a temp file next to the settings file and renames it over the
    /// original; readers see either the old or the new document.
    async fn replace(&self, config: SiteConfig) -> Result<Arc<SiteConfig>, SettingsError> {
        let yaml = serde_yaml::to_string(&config).map_err(|e| SettingsError::Write(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::Write(e.to_string()))?;
        }

        let temp = self.temp_path();
        let written = match write_file(&temp, yaml.as_bytes()).await {
            Ok(()) => fs::rename(&temp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&temp).await;
            return Err(SettingsError::Write(e.to_string()));
        }

        tracing::info!(path = %self.path.display(), "Site settings saved");
        Ok(self.swap(config))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SAMPLE: &str = r#"
site:
  title: My Blog
  subtitle: Notes
menu:
  - name: Home
    url: /
  - name: Archives
    url: /archives
blog:
  posts_per_page: 8
footer:
  html: "<b>hi</b>"
"#;

    #[test]
    fn test_parse_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, SAMPLE).unwrap();

        let store = YamlSettingsStore::open(&path).unwrap();
        let config = store.current();

        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.menu.len(), 2);
        assert_eq!(config.posts_per_page(), 8);
        assert_eq!(config.footer.html.as_deref(), Some("<b>hi</b>"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlSettingsStore::open(dir.path().join("absent.yml")).unwrap();
        assert_eq!(*store.current(), SiteConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "site: [unclosed").unwrap();

        assert!(matches!(
            YamlSettingsStore::open(&path),
            Err(SettingsError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, SAMPLE).unwrap();
        let store = YamlSettingsStore::open(&path).unwrap();

        let mut config = (*store.current()).clone();
        config.site.title = "Renamed".to_string();
        config.footer.html = Some("footer".to_string());
        store.replace(config.clone()).await.unwrap();

        assert_eq!(store.current().site.title, "Renamed");

        let reopened = YamlSettingsStore::open(&path).unwrap();
        assert_eq!(*reopened.current(), config);
        assert_eq!(*reopened.reload().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_replace_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("_config.yml");
        let store = YamlSettingsStore::open(&path).unwrap();

        let mut config = SiteConfig::default();
        config.site.title = "Fresh".to_string();
        store.replace(config.clone()).await.unwrap();
        config.site.title = "Again".to_string();
        store.replace(config).await.unwrap();

        let names: Vec<String> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["_config.yml".to_string()]);
        assert!(fs::read_to_string(&path).unwrap().contains("Again"));
    }

    #[tokio::test]
    async fn test_reload_picks_up_manual_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        let store = YamlSettingsStore::open(&path).unwrap();
        assert_eq!(*store.current(), SiteConfig::default());

        fs::write(&path, SAMPLE).unwrap();
        assert_eq!(store.reload().await.unwrap().site.title, "My Blog");
        assert_eq!(store.current().site.title, "My Blog");

        fs::write(&path, "site: [unclosed").unwrap();
        assert!(matches!(store.reload().await, Err(SettingsError::Parse(_))));
        assert_eq!(store.current().site.title, "My Blog");
    }
}
