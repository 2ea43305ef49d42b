//! Domain entities - the core business objects.

mod post;
mod site;
mod slug;

pub use post::{
    DEFAULT_AUTHOR, Post, PostChanges, PostDraft, PostPage, PostStatus, PostSummary, Stats,
};
pub use site::{
    BlogSettings, FooterSettings, MenuItem, SiteConfig, SiteInfo, SocialLink, ThemeSettings,
    UrlSettings,
};
pub use slug::{derive_slug, slugify};
