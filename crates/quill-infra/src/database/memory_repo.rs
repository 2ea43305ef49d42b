//! In-memory post repository - used when no database is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, PostStatus, PostSummary};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository};

/// Post store backed by a `Vec` behind an async `RwLock`.
///
/// Data is lost on process restart. Slug uniqueness is enforced like the
/// database's unique index.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }

    async fn published(&self) -> Vec<Post> {
        let store = self.store.read().await;
        let posts = store.iter().filter(|p| p.is_published()).cloned().collect();
        Self::newest_first(posts)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.iter().any(|p| p.id == post.id || p.slug == post.slug) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.iter().any(|p| p.id != post.id && p.slug == post.slug) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        let slot = store
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|p| p.id != id);
        if store.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_published(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let published = self.published().await;
        let total = published.len() as u64;
        let window = published
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok((window, total))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .find(|p| p.is_published() && p.slug == slug)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(Self::newest_first(store.clone()))
    }

    async fn search_published(&self, needle: &str) -> Result<Vec<Post>, RepoError> {
        let needle = needle.to_lowercase();
        Ok(self
            .published()
            .await
            .into_iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.content.to_lowercase().contains(&needle)
            })
            .collect())
    }

    async fn published_tag_sets(&self) -> Result<Vec<Option<Vec<String>>>, RepoError> {
        Ok(self
            .published()
            .await
            .into_iter()
            .map(|p| Some(p.tags))
            .collect())
    }

    async fn published_categories(&self) -> Result<Vec<Option<String>>, RepoError> {
        Ok(self
            .published()
            .await
            .into_iter()
            .map(|p| p.category)
            .collect())
    }

    async fn published_summaries(&self) -> Result<Vec<PostSummary>, RepoError> {
        Ok(self.published().await.iter().map(PostSummary::from).collect())
    }

    async fn count(&self, status: Option<PostStatus>) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        let count = store
            .iter()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .count();
        Ok(count as u64)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let post = store
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        post.views += 1;
        Ok(())
    }
}
