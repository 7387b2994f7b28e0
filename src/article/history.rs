//! Display model for the article history list.

use chrono::NaiveDateTime;

use super::{Article, ArticleId, PublishStatus};

/// Characters of content shown in a history snippet.
pub const SNIPPET_CHARS: usize = 150;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A control offered for one history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Edit,
    Publish,
    View,
    Delete,
}

impl HistoryAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Publish => "Publish",
            Self::View => "View",
            Self::Delete => "Delete",
        }
    }
}

/// One row of the history overlay, with every displayed value precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: ArticleId,
    pub title: String,
    pub status: PublishStatus,
    pub word_count: Option<u64>,
    pub tags: Vec<String>,
    pub snippet: String,
    pub created: String,
    /// Present only when the update date differs from the creation date.
    pub updated: Option<String>,
    /// Present only for published articles.
    pub published: Option<String>,
    pub days_to_publish: Option<String>,
    pub external_url: Option<String>,
    pub actions: Vec<HistoryAction>,
}

impl HistoryEntry {
    pub fn from_article(article: &Article) -> Self {
        let published = article.is_published();
        let days = match (published, article.created_at, article.published_at) {
            (true, Some(created), Some(at)) => Some(format_day_count(days_to_publish(created, at))),
            _ => None,
        };
        let updated = match article.updated_at {
            Some(updated) if Some(updated) != article.created_at => {
                Some(format_date(Some(updated)))
            }
            _ => None,
        };
        let title = if article.title.is_empty() {
            "Untitled".to_string()
        } else {
            article.title.clone()
        };

        Self {
            id: article.id.clone(),
            title,
            status: article.publish_status,
            word_count: article.word_count,
            tags: article.tags.clone(),
            snippet: snippet(&article.content),
            created: format_date(article.created_at),
            updated,
            published: published.then(|| format_date(article.published_at)),
            days_to_publish: days,
            external_url: article.external_url.clone().filter(|url| !url.is_empty()),
            actions: actions_for(published),
        }
    }

    pub fn is_published(&self) -> bool {
        self.external_url.is_some()
    }

    pub fn has_action(&self, action: HistoryAction) -> bool {
        self.actions.contains(&action)
    }
}

fn actions_for(published: bool) -> Vec<HistoryAction> {
    let middle = if published {
        HistoryAction::View
    } else {
        HistoryAction::Publish
    };
    vec![HistoryAction::Edit, middle, HistoryAction::Delete]
}

/// Whole days from creation to publication, rounded up, at least one.
pub fn days_to_publish(created: NaiveDateTime, published: NaiveDateTime) -> u64 {
    let ms = (published - created).num_milliseconds();
    let days = ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0);
    u64::try_from(days.max(1)).unwrap_or(1)
}

pub(crate) fn format_day_count(days: u64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

/// The first [`SNIPPET_CHARS`] characters of `content`, with `...` if cut.
pub fn snippet(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Calendar date of a timestamp, or `N/A` when unknown.
pub fn format_date(value: Option<NaiveDateTime>) -> String {
    value.map_or_else(|| "N/A".to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}
