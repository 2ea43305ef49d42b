//! PostgreSQL post repository.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};
use uuid::Uuid;

use quill_core::domain::{Post, PostStatus, PostSummary};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use super::entity::post::{self, Entity as PostEntity, tag_list};
use super::postgres_base::{PostgresBaseRepository, repo_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

fn published() -> SimpleExpr {
    post::Column::Status.eq(post::Status::Published)
}

fn newest_first(select: Select<PostEntity>) -> Select<PostEntity> {
    select
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
}

/// `%needle%` in lower case, with LIKE metacharacters escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn lower_like(column: post::Column, pattern: String) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_published(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        tracing::debug!(offset, limit, "Listing published posts");

        let total = PostEntity::find()
            .filter(published())
            .count(&self.db)
            .await
            .map_err(repo_err)?;

        let models = newest_first(PostEntity::find().filter(published()))
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(published())
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let result = newest_first(PostEntity::find())
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn search_published(&self, needle: &str) -> Result<Vec<Post>, RepoError> {
        let matches = Condition::any()
            .add(lower_like(post::Column::Title, contains_pattern(needle)))
            .add(lower_like(post::Column::Content, contains_pattern(needle)));

        let result = newest_first(PostEntity::find().filter(published()).filter(matches))
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn published_tag_sets(&self) -> Result<Vec<Option<Vec<String>>>, RepoError> {
        let rows: Vec<Option<serde_json::Value>> = PostEntity::find()
            .select_only()
            .column(post::Column::Tags)
            .filter(published())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(rows.into_iter().map(tag_list).collect())
    }

    async fn published_categories(&self) -> Result<Vec<Option<String>>, RepoError> {
        PostEntity::find()
            .select_only()
            .column(post::Column::Category)
            .filter(published())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(repo_err)
    }

    async fn published_summaries(&self) -> Result<Vec<PostSummary>, RepoError> {
        let rows: Vec<(Uuid, String, String, DateTimeWithTimeZone)> =
            newest_first(PostEntity::find().filter(published()))
                .select_only()
                .columns([
                    post::Column::Id,
                    post::Column::Title,
                    post::Column::Slug,
                    post::Column::CreatedAt,
                ])
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(repo_err)?;

        Ok(rows
            .into_iter()
            .map(|(id, title, slug, created_at)| PostSummary {
                id,
                title,
                slug,
                created_at: created_at.into(),
            })
            .collect())
    }

    async fn count(&self, status: Option<PostStatus>) -> Result<u64, RepoError> {
        let mut query = PostEntity::find();
        if let Some(status) = status {
            query = query.filter(post::Column::Status.eq(post::Status::from(status)));
        }

        query.count(&self.db).await.map_err(repo_err)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
