// Article module: captured article → long-form event → relays

mod draft;
mod post;
mod topics;

pub use draft::{Article, ArticleError};
pub use post::{post_article, PostError};
pub use topics::{TopicSet, DEFAULT_TOPICS};
