//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::PostStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub status: Status,
    /// JSON so that rows written elsewhere with a non-array value still load.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub tags: Option<Json>,
    pub featured_image: Option<String>,
    pub author: String,
    pub views: i64,
    pub likes: i64,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub comments: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Status {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<PostStatus> for Status {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => Status::Draft,
            PostStatus::Published => Status::Published,
        }
    }
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Draft => PostStatus::Draft,
            Status::Published => PostStatus::Published,
        }
    }
}

/// Read a stored tags value. `None` when the value is not an array.
///
/// Non-string array members are dropped.
pub fn tag_list(value: Option<Json>) -> Option<Vec<String>> {
    match value {
        Some(Json::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Json::String(tag) => Some(tag),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn counter(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        let comments = match model.comments {
            Some(Json::Array(items)) => items,
            _ => Vec::new(),
        };

        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            content: model.content,
            excerpt: model.excerpt,
            category: model.category,
            status: model.status.into(),
            tags: tag_list(model.tags).unwrap_or_default(),
            featured_image: model.featured_image,
            author: model.author,
            views: counter(model.views),
            likes: counter(model.likes),
            comments,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        let tags = post.tags.into_iter().map(Json::String).collect();

        Self {
            id: Set(post.id),
            title: Set(post.title),
            slug: Set(post.slug),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            category: Set(post.category),
            status: Set(post.status.into()),
            tags: Set(Some(Json::Array(tags))),
            featured_image: Set(post.featured_image),
            author: Set(post.author),
            views: Set(i64::try_from(post.views).unwrap_or(i64::MAX)),
            likes: Set(i64::try_from(post.likes).unwrap_or(i64::MAX)),
            comments: Set(Some(Json::Array(post.comments))),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
