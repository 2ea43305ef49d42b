use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Author recorded when a draft does not name one.
pub const DEFAULT_AUTHOR: &str = "Admin";

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(DomainError::Validation(format!(
                "unknown post status '{other}'"
            ))),
        }
    }
}

/// Post entity - a single blog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Markdown source.
    pub content: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub author: String,
    pub views: u64,
    pub likes: u64,
    /// Stored and returned as-is; nothing reads it.
    pub comments: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post from a draft, applying defaults.
    ///
    /// The slug must already be derived; see [`crate::domain::derive_slug`].
    pub fn new(draft: PostDraft, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            slug,
            content: draft.content,
            excerpt: non_empty(draft.excerpt),
            category: non_empty(draft.category),
            status: draft.status.unwrap_or_default(),
            tags: draft.tags.unwrap_or_default(),
            featured_image: non_empty(draft.featured_image),
            author: non_empty(draft.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            views: 0,
            likes: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Merge supplied fields onto this post. Does not touch `updated_at`.
    ///
    /// An empty excerpt or category clears the field.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(slug) = changes.slug {
            self.slug = slug;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(excerpt) = changes.excerpt {
            self.excerpt = non_empty(Some(excerpt));
        }
        if let Some(category) = changes.category {
            self.category = non_empty(Some(category));
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(image) = changes.featured_image {
            self.featured_image = non_empty(Some(image));
        }
        if let Some(author) = non_empty(changes.author) {
            self.author = author;
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Caller-supplied fields for a new post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub author: Option<String>,
}

/// Partial update of a post. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub author: Option<String>,
}

/// The fields archive listings need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            created_at: post.created_at,
        }
    }
}

/// One page of published posts plus what pagination controls need.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl PostPage {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1))
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }
}

/// Post counts, each from its own query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub published: u64,
    pub draft: u64,
}
