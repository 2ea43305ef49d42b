use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostStatus, PostSummary};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. `RepoError::NotFound` if nothing was removed.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post store. Every method is one independent round trip.
///
/// Listings are ordered by `created_at` descending, then `id` descending.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// A window of published posts and the total number of published posts.
    async fn find_published(&self, offset: u64, limit: u64)
    -> Result<(Vec<Post>, u64), RepoError>;

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Every post regardless of status.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Published posts whose title or content contains `needle`, ignoring case.
    async fn search_published(&self, needle: &str) -> Result<Vec<Post>, RepoError>;

    /// The raw tag list of every published post.
    ///
    /// `None` marks a row whose stored value is not a sequence.
    async fn published_tag_sets(&self) -> Result<Vec<Option<Vec<String>>>, RepoError>;

    /// The category of every published post.
    async fn published_categories(&self) -> Result<Vec<Option<String>>, RepoError>;

    async fn published_summaries(&self) -> Result<Vec<PostSummary>, RepoError>;

    /// Number of posts, optionally restricted to one status.
    async fn count(&self, status: Option<PostStatus>) -> Result<u64, RepoError>;

    /// Atomically add one to the view counter.
    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;
}
