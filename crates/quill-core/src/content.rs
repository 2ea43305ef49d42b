//! Content repository - the single entry point to the post store.
//!
//! Routing code never shapes queries itself: pagination, slug derivation,
//! defaults, search guards and aggregation all live here, on top of an
//! injected [`PostRepository`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Local, Utc};
use uuid::Uuid;

use crate::domain::{
    Post, PostChanges, PostDraft, PostPage, PostStatus, PostSummary, Stats, derive_slug,
};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;

const MAX_WINDOW: u64 = i64::MAX as u64;

/// Facade over the post store.
#[derive(Clone)]
pub struct ContentRepository {
    posts: Arc<dyn PostRepository>,
}

impl ContentRepository {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Published posts, newest first, sliced to `page` (1-based).
    pub async fn list_published(&self, page: u64, page_size: u64) -> Result<PostPage, DomainError> {
        if page == 0 {
            return Err(DomainError::Validation("page must be at least 1".to_string()));
        }
        if page_size == 0 {
            return Err(DomainError::Validation(
                "page size must be greater than 0".to_string(),
            ));
        }

        // Stores bind LIMIT/OFFSET as signed 64-bit integers.
        let page_size = page_size.min(MAX_WINDOW);
        let Some(offset) = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| *offset <= MAX_WINDOW)
        else {
            let total = self.posts.count(Some(PostStatus::Published)).await?;
            return Ok(PostPage {
                posts: Vec::new(),
                total,
                page,
                page_size,
            });
        };
        let (posts, total) = self.posts.find_published(offset, page_size).await?;

        Ok(PostPage {
            posts,
            total,
            page,
            page_size,
        })
    }

    /// The published post with this slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::post_not_found(slug))
    }

    /// Any post by id, drafts included.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    /// Every post regardless of status, newest first.
    pub async fn list_all(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_all().await?)
    }

    pub async fn create(&self, draft: PostDraft) -> Result<Post, DomainError> {
        if draft.title.trim().is_empty() {
            return Err(DomainError::Validation("title is required".to_string()));
        }

        let slug = match draft.slug.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => derive_slug(explicit),
            _ => derive_slug(&draft.title),
        };
        let post = Post::new(draft, slug);

        tracing::debug!(post_id = %post.id, slug = %post.slug, "Creating post");
        let stored = self.posts.insert(post).await?;
        tracing::info!(post_id = %stored.id, status = %stored.status, "Post created");

        Ok(stored)
    }

    /// Merge `changes` onto the stored post and refresh `updated_at`.
    pub async fn update(&self, id: Uuid, mut changes: PostChanges) -> Result<Post, DomainError> {
        if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DomainError::Validation("title is required".to_string()));
        }

        let mut post = self.get_by_id(id).await?;

        changes.slug = changes
            .slug
            .take()
            .filter(|s| !s.trim().is_empty())
            .map(|s| derive_slug(&s));
        post.apply(changes);
        post.updated_at = Utc::now();

        match self.posts.update(post).await {
            Ok(updated) => {
                tracing::info!(post_id = %id, "Post updated");
                Ok(updated)
            }
            Err(RepoError::NotFound) => Err(DomainError::post_not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a post. Deleting an id that is already gone succeeds.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        match self.posts.delete(id).await {
            Ok(()) => {
                tracing::info!(post_id = %id, "Post deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => {
                tracing::debug!(post_id = %id, "Delete of absent post ignored");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Published posts containing `query` in title or content, ignoring case.
    ///
    /// A blank query matches nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<Post>, DomainError> {
        let needle = query.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.posts.search_published(needle).await?)
    }

    /// Tag cloud: tag → number of published posts carrying it.
    pub async fn all_tags(&self) -> Result<BTreeMap<String, u64>, DomainError> {
        let tag_sets = self.posts.published_tag_sets().await?;
        Ok(count_tags(tag_sets))
    }

    /// Category → number of published posts in it.
    pub async fn categories(&self) -> Result<BTreeMap<String, u64>, DomainError> {
        let categories = self.posts.published_categories().await?;
        let mut counts = BTreeMap::new();
        for category in categories.into_iter().flatten() {
            let category = category.trim();
            if !category.is_empty() {
                *counts.entry(category.to_string()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// Published posts bucketed by local calendar year of creation.
    pub async fn archives(&self) -> Result<BTreeMap<i32, Vec<PostSummary>>, DomainError> {
        let summaries = self.posts.published_summaries().await?;
        Ok(group_by_year(summaries))
    }

    /// Total, published and draft counts.
    ///
    /// Three separate queries; under concurrent writes the parts need not
    /// add up to the total.
    pub async fn stats(&self) -> Result<Stats, DomainError> {
        let total = self.posts.count(None).await?;
        let published = self.posts.count(Some(PostStatus::Published)).await?;
        let draft = self.posts.count(Some(PostStatus::Draft)).await?;

        Ok(Stats {
            total,
            published,
            draft,
        })
    }

    /// Bump the view counter of a post.
    pub async fn record_view(&self, id: Uuid) -> Result<(), DomainError> {
        match self.posts.increment_views(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(DomainError::post_not_found(id)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Count tags across posts, skipping entries that were not sequences.
pub fn count_tags<I>(tag_sets: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = Option<Vec<String>>>,
{
    let mut counts = BTreeMap::new();
    for tags in tag_sets.into_iter().flatten() {
        for tag in tags {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    counts
}

/// Group summaries by local year, newest first within each year.
pub fn group_by_year<I>(summaries: I) -> BTreeMap<i32, Vec<PostSummary>>
where
    I: IntoIterator<Item = PostSummary>,
{
    let mut archives: BTreeMap<i32, Vec<PostSummary>> = BTreeMap::new();
    for summary in summaries {
        let year = summary.created_at.with_timezone(&Local).year();
        archives.entry(year).or_default().push(summary);
    }
    for posts in archives.values_mut() {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    }
    archives
}
