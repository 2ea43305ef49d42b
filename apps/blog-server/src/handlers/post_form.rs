//! Multipart body of the admin post editor.

use std::str::FromStr;

use actix_multipart::Multipart;
use futures::StreamExt;
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{PostChanges, PostDraft, PostStatus};

use crate::uploads::{UploadError, UploadStore};

/// Name of the file input on the editor form.
pub const IMAGE_FIELD: &str = "featuredImage";

/// Cap on any single text field.
const TEXT_FIELD_LIMIT: usize = 10 * 1024 * 1024;

/// Fields submitted by `admin/edit_post.html`.
#[derive(Debug, Default)]
pub struct PostForm {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub tags: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    /// Public path of an image stored while reading the form.
    pub featured_image: Option<String>,
}

impl PostForm {
    /// Drain the multipart stream, saving the featured image if one was chosen.
    ///
    /// On error no stored image is left behind.
    pub async fn read(payload: Multipart, uploads: &UploadStore) -> Result<Self, UploadError> {
        let mut form = PostForm::default();

        if let Err(e) = form.read_fields(payload, uploads).await {
            if let Some(path) = form.featured_image.take() {
                uploads.discard(&path).await;
            }
            return Err(e);
        }

        Ok(form)
    }

    async fn read_fields(
        &mut self,
        mut payload: Multipart,
        uploads: &UploadStore,
    ) -> Result<(), UploadError> {
        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|e| UploadError::Multipart(e.to_string()))?;
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD {
                if let Some(path) = uploads.save(&mut field).await? {
                    // last file wins
                    if let Some(replaced) = self.featured_image.replace(path) {
                        uploads.discard(&replaced).await;
                    }
                }
                continue;
            }

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
                if bytes.len() + chunk.len() > TEXT_FIELD_LIMIT {
                    return Err(UploadError::Multipart(format!("field `{name}` is too large")));
                }
                bytes.extend_from_slice(&chunk);
            }
            self.set(&name, String::from_utf8_lossy(&bytes).into_owned());
        }

        Ok(())
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "id" => self.id = Some(value),
            "title" => self.title = value,
            "content" => self.content = value,
            "excerpt" => self.excerpt = Some(value),
            "tags" => self.tags = Some(value),
            "category" => self.category = Some(value),
            "status" => self.status = Some(value),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    /// Id of the post being edited; `None` means create.
    pub fn post_id(&self) -> Result<Option<Uuid>, DomainError> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| DomainError::post_not_found(raw)),
        }
    }

    fn parsed_status(&self) -> Result<Option<PostStatus>, DomainError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => PostStatus::from_str(raw).map(Some),
        }
    }

    pub fn into_draft(self, author: &str) -> Result<PostDraft, DomainError> {
        let status = self.parsed_status()?;
        Ok(PostDraft {
            title: self.title,
            slug: None,
            content: self.content,
            excerpt: self.excerpt,
            category: self.category,
            status,
            tags: self.tags.as_deref().map(split_tags),
            featured_image: self.featured_image,
            author: Some(author.to_string()),
        })
    }

    pub fn into_changes(self, author: &str) -> Result<PostChanges, DomainError> {
        let status = self.parsed_status()?;
        Ok(PostChanges {
            title: Some(self.title),
            slug: None,
            content: Some(self.content),
            excerpt: self.excerpt,
            category: self.category,
            status,
            tags: self.tags.as_deref().map(split_tags),
            featured_image: self.featured_image,
            author: Some(author.to_string()),
        })
    }
}

/// `"rust, web,,  tips "` -> `["rust", "web", "tips"]`
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PostForm {
        PostForm {
            title: "Hello".into(),
            content: "Body".into(),
            excerpt: Some("".into()),
            tags: Some("rust, web,, ".into()),
            category: Some("tech".into()),
            status: Some("published".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("rust, web,,  tips "), vec!["rust", "web", "tips"]);
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ").is_empty());
    }

    #[test]
    fn test_into_draft() {
        let draft = form().into_draft("admin").unwrap();
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.status, Some(PostStatus::Published));
        assert_eq!(draft.tags, Some(vec!["rust".to_string(), "web".to_string()]));
        assert_eq!(draft.author.as_deref(), Some("admin"));
        assert!(draft.featured_image.is_none());
    }

    #[test]
    fn test_into_changes_keeps_image_when_none_uploaded() {
        let changes = form().into_changes("admin").unwrap();
        assert!(changes.featured_image.is_none());
        assert_eq!(changes.title.as_deref(), Some("Hello"));
        assert_eq!(changes.excerpt.as_deref(), Some(""));
    }

    #[test]
    fn test_blank_status_means_default() {
        let mut f = form();
        f.status = Some(" ".into());
        assert_eq!(f.into_draft("admin").unwrap().status, None);
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        let mut f = form();
        f.status = Some("archived".into());
        assert!(matches!(f.into_draft("admin"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_post_id() {
        let mut f = form();
        assert_eq!(f.post_id().unwrap(), None);

        f.id = Some("".into());
        assert_eq!(f.post_id().unwrap(), None);

        let id = Uuid::new_v4();
        f.id = Some(id.to_string());
        assert_eq!(f.post_id().unwrap(), Some(id));

        f.id = Some("not-a-uuid".into());
        assert!(matches!(f.post_id(), Err(DomainError::NotFound { .. })));
    }
}
