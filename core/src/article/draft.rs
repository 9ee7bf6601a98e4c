// Article drafting: turns a captured article into a long-form event draft

use super::topics::TopicSet;
use crate::event::{EventDraft, Kind, Tag};
use thiserror::Error;

const UNTITLED: &str = "Untitled";
const SHARED_WITH: &str = "**Shared with:** relaypost";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArticleError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// A captured article, body already in Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    url: String,
    title: String,
    byline: Option<String>,
    body: String,
}

impl Article {
    /// Create an article for `url`. Blank titles become `Untitled`.
    pub fn new(url: &str, title: &str, body: impl Into<String>) -> Result<Self, ArticleError> {
        let url = url.trim();
        url::Url::parse(url).map_err(|e| ArticleError::InvalidUrl(format!("{} ({})", url, e)))?;

        let title = title.trim();
        Ok(Self {
            url: url.to_string(),
            title: if title.is_empty() {
                UNTITLED.to_string()
            } else {
                title.to_string()
            },
            byline: None,
            body: body.into(),
        })
    }

    /// Attach an author byline; blank bylines are ignored
    pub fn with_byline(mut self, byline: &str) -> Self {
        let byline = byline.trim();
        self.byline = (!byline.is_empty()).then(|| byline.to_string());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn byline(&self) -> Option<&str> {
        self.byline.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Markdown header prepended to the body: source link, attribution, rule
    pub fn metadata_header(&self) -> String {
        let source = format!("**Original source:** [{}]({})", self.url, self.url);
        [source.as_str(), SHARED_WITH, "", "---", ""].join("\n\n")
    }

    /// Build a long-form draft stamped at `created_at`.
    ///
    /// Tag order: `d`, `r`, `title`, `url`, `published_at`, one `t` per
    /// topic, then `author` when a byline is present.
    pub fn to_draft(&self, topics: &TopicSet, created_at: u64) -> EventDraft {
        let timestamp = created_at.to_string();
        let mut draft = EventDraft::new(Kind::LONG_FORM, self.metadata_header() + &self.body)
            .with_created_at(created_at)
            .with_tag(Tag::new(["d".to_string(), format!("{}-{}", self.url, timestamp)]))
            .with_tag(Tag::new(["r", self.url.as_str()]))
            .with_tag(Tag::new(["title", self.title.as_str()]))
            .with_tag(Tag::new(["url", self.url.as_str()]))
            .with_tag(Tag::new(["published_at", timestamp.as_str()]));

        for topic in topics.iter() {
            draft = draft.with_tag(Tag::new(["t", topic]));
        }

        if let Some(byline) = &self.byline {
            draft = draft.with_tag(Tag::new(["author", byline.as_str()]));
        }

        draft
    }
}
