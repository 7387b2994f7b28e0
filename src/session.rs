//! The editing session: which article is open and what the backend last saw.
//!
//! A session starts `Unsaved`, becomes a `Draft` once the backend hands back
//! an id, and ends `Published`. Publishing is terminal; there is no way back
//! to a draft. Every reset bumps the epoch so replies to requests issued under
//! an older session can be recognized and dropped.

use tracing::debug;

use crate::api::ArticleForm;
use crate::article::{ArticleId, LoadedArticle, PublishStatus, join_tags, parse_tags};

/// Where the open article stands relative to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Unsaved,
    Draft,
    Published,
}

/// Rejections raised before any request leaves the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter an article title")]
    MissingTitle,
    #[error("Please enter article content")]
    MissingContent,
    #[error("Please enter some content to save as draft")]
    MissingDraftContent,
    #[error("This article is already published")]
    AlreadyPublished,
    #[error("Another save or publish is still in progress")]
    Busy,
}

/// Request categories that can be in flight at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Save and publish share this slot.
    Mutation,
    History,
    Load,
    Delete,
    Status,
}

/// Busy flags, one per [`Slot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight {
    mutation: Option<Mutation>,
    history: bool,
    load: bool,
    delete: bool,
    status: bool,
}

/// Which mutation holds the shared slot, for the busy label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateDraft,
    SaveDraft,
    Publish,
}

impl InFlight {
    /// Claim the mutation slot.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Busy`] if another mutation holds it.
    pub fn begin_mutation(&mut self, kind: Mutation) -> Result<(), ValidationError> {
        if self.mutation.is_some() {
            return Err(ValidationError::Busy);
        }
        self.mutation = Some(kind);
        Ok(())
    }

    /// Claim a read slot; returns false if that read is already running.
    pub fn begin(&mut self, slot: Slot) -> bool {
        let flag = match slot {
            // claimed through begin_mutation
            Slot::Mutation => return false,
            Slot::History => &mut self.history,
            Slot::Load => &mut self.load,
            Slot::Delete => &mut self.delete,
            Slot::Status => &mut self.status,
        };
        !std::mem::replace(flag, true)
    }

    pub fn finish(&mut self, slot: Slot) {
        match slot {
            Slot::Mutation => self.mutation = None,
            Slot::History => self.history = false,
            Slot::Load => self.load = false,
            Slot::Delete => self.delete = false,
            Slot::Status => self.status = false,
        }
    }

    pub const fn mutation(&self) -> Option<Mutation> {
        self.mutation
    }

    pub const fn is_busy(&self, slot: Slot) -> bool {
        match slot {
            Slot::Mutation => self.mutation.is_some(),
            Slot::History => self.history,
            Slot::Load => self.load,
            Slot::Delete => self.delete,
            Slot::Status => self.status,
        }
    }
}

/// Session state for the article being edited. Editor text lives in the
/// editor buffer; everything else the backend needs lives here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorSession {
    article_id: Option<ArticleId>,
    last_saved_content: String,
    lifecycle: Lifecycle,
    epoch: u64,
    /// Title field contents.
    pub title: String,
    /// Raw comma separated tag field.
    pub tags: String,
    pub status: PublishStatus,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn article_id(&self) -> Option<&ArticleId> {
        self.article_id.as_ref()
    }

    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn last_saved_content(&self) -> &str {
        &self.last_saved_content
    }

    /// Whether a reply issued under `epoch` still belongs to this session.
    pub const fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// True when the editor holds text the backend has not confirmed.
    pub fn is_dirty(&self, content: &str) -> bool {
        content != self.last_saved_content && !(content.is_empty() && self.article_id.is_none())
    }

    fn next_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        debug!(epoch = self.epoch, "session epoch advanced");
    }

    /// Start a fresh session for a newly ingested file.
    ///
    /// `title` replaces the title field only when the file has one; tags and
    /// status carry over, as the form fields do.
    pub fn begin_ingest(&mut self, title: Option<String>) {
        self.next_epoch();
        self.article_id = None;
        self.last_saved_content.clear();
        self.lifecycle = Lifecycle::Unsaved;
        if let Some(title) = title {
            self.title = title;
        }
    }

    /// Clear everything back to an empty, unsaved session.
    pub fn reset(&mut self) {
        self.next_epoch();
        self.article_id = None;
        self.last_saved_content.clear();
        self.lifecycle = Lifecycle::Unsaved;
        self.title.clear();
        self.tags.clear();
        self.status = PublishStatus::Draft;
    }

    /// Form for the automatic draft created right after ingestion.
    ///
    /// Content goes out exactly as read; no id is attached.
    pub fn initial_draft_form(&self, content: &str) -> ArticleForm {
        ArticleForm {
            title: self.title.trim().to_string(),
            content: content.to_string(),
            tags: self.tags.trim().to_string(),
            publish_status: self.status,
            article_id: None,
        }
    }

    /// Form for a user-triggered save.
    ///
    /// # Errors
    ///
    /// Rejects published sessions and blank content.
    pub fn draft_form(&self, content: &str) -> Result<ArticleForm, ValidationError> {
        if self.lifecycle == Lifecycle::Published {
            return Err(ValidationError::AlreadyPublished);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::MissingDraftContent);
        }
        Ok(self.form_with(content))
    }

    /// Form for publishing.
    ///
    /// # Errors
    ///
    /// Rejects published sessions, a blank title, then blank content.
    pub fn publish_form(&self, content: &str) -> Result<ArticleForm, ValidationError> {
        if self.lifecycle == Lifecycle::Published {
            return Err(ValidationError::AlreadyPublished);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::MissingContent);
        }
        Ok(self.form_with(content))
    }

    fn form_with(&self, content: &str) -> ArticleForm {
        ArticleForm {
            title: self.title.trim().to_string(),
            content: content.to_string(),
            tags: self.tags.trim().to_string(),
            publish_status: self.status,
            article_id: self.article_id.clone(),
        }
    }

    /// Record an acknowledged save of `content`.
    pub fn apply_saved(&mut self, id: ArticleId, content: String) {
        debug!(id = %id, from = ?self.lifecycle, "draft saved");
        self.article_id = Some(id);
        self.last_saved_content = content;
        self.lifecycle = Lifecycle::Draft;
    }

    /// Record a successful publish; the session is cleared for a new article.
    pub fn apply_published(&mut self) {
        debug!(id = ?self.article_id, "article published, session cleared");
        self.reset();
    }

    /// Take over an article fetched from the backend.
    pub fn apply_loaded(&mut self, id: ArticleId, article: &LoadedArticle) {
        self.next_epoch();
        self.lifecycle = if article.is_published() {
            Lifecycle::Published
        } else {
            Lifecycle::Draft
        };
        debug!(id = %id, lifecycle = ?self.lifecycle, "article loaded");
        self.article_id = Some(id);
        self.title.clone_from(&article.title);
        self.tags = join_tags(&article.tags);
        self.status = article.publish_status;
        self.last_saved_content.clone_from(&article.content);
    }

    /// Forget the backend id if it names the deleted article.
    pub fn forget_article(&mut self, deleted: &ArticleId) -> bool {
        if self.article_id.as_ref() != Some(deleted) {
            return false;
        }
        debug!(id = %deleted, "open article deleted");
        self.article_id = None;
        self.last_saved_content.clear();
        self.lifecycle = Lifecycle::Unsaved;
        true
    }

    /// Tags as a list, for display.
    pub fn tag_list(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }
}
