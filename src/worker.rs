//! Background thread for network and file I/O.
//!
//! The UI thread hands [`Job`]s to the worker and polls for [`Completion`]s,
//! so it never blocks on a request. Jobs run one at a time in submission
//! order. Requests tied to the editing session carry the session epoch they
//! were issued under.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use chrono::Local;
use tracing::{debug, warn};

use crate::api::{
    ApiError, ApiStatus, ArticleApi, ArticleForm, PublishResponse, SaveDraftResponse,
};
use crate::article::{Article, ArticleId, LoadedArticle};
use crate::export::{ExportFormat, write_export};
use crate::ingest::{IngestError, read_markdown};

/// Work for the background thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    ReadFile(PathBuf),
    /// The automatic draft created after ingestion.
    CreateDraft { epoch: u64, form: ArticleForm },
    SaveDraft { epoch: u64, form: ArticleForm },
    Publish { epoch: u64, form: ArticleForm },
    History,
    LoadArticle {
        epoch: u64,
        id: ArticleId,
        then_publish: bool,
    },
    Delete(ArticleId),
    ApiStatus,
    Export {
        dir: PathBuf,
        title: String,
        content: String,
        format: ExportFormat,
    },
}

/// Outcome of a [`Job`], delivered back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    FileRead {
        path: PathBuf,
        result: Result<String, IngestError>,
    },
    DraftCreated {
        epoch: u64,
        content: String,
        result: Result<SaveDraftResponse, ApiError>,
    },
    DraftSaved {
        epoch: u64,
        content: String,
        result: Result<SaveDraftResponse, ApiError>,
    },
    Published {
        epoch: u64,
        result: Result<PublishResponse, ApiError>,
    },
    History(Result<Vec<Article>, ApiError>),
    ArticleLoaded {
        epoch: u64,
        id: ArticleId,
        then_publish: bool,
        result: Result<LoadedArticle, ApiError>,
    },
    Deleted {
        id: ArticleId,
        result: Result<(), ApiError>,
    },
    ApiStatus(Result<ApiStatus, ApiError>),
    Exported(Result<PathBuf, String>),
}

/// Run one job to completion on the calling thread.
pub fn execute(api: &dyn ArticleApi, job: Job) -> Completion {
    match job {
        Job::ReadFile(path) => {
            let result = read_markdown(&path);
            Completion::FileRead { path, result }
        }
        Job::CreateDraft { epoch, form } => Completion::DraftCreated {
            epoch,
            result: api.save_draft(&form),
            content: form.content,
        },
        Job::SaveDraft { epoch, form } => Completion::DraftSaved {
            epoch,
            result: api.save_draft(&form),
            content: form.content,
        },
        Job::Publish { epoch, form } => Completion::Published {
            epoch,
            result: api.publish(&form),
        },
        Job::History => Completion::History(api.history()),
        Job::LoadArticle {
            epoch,
            id,
            then_publish,
        } => Completion::ArticleLoaded {
            epoch,
            result: api.article(&id),
            id,
            then_publish,
        },
        Job::Delete(id) => Completion::Deleted {
            result: api.delete(&id),
            id,
        },
        Job::ApiStatus => Completion::ApiStatus(api.status()),
        Job::Export {
            dir,
            title,
            content,
            format,
        } => {
            let now = Local::now().naive_local();
            let result = write_export(&dir, &title, &content, format, now).map_err(|e| {
                warn!(error = %e, "export failed");
                e.to_string()
            });
            Completion::Exported(result)
        }
    }
}

/// Handle to the background I/O thread.
pub struct Worker {
    jobs: Sender<Job>,
    done: Receiver<Completion>,
    handle: JoinHandle<()>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("finished", &self.handle.is_finished())
            .finish_non_exhaustive()
    }
}

impl Worker {
    /// Start the worker thread, which owns `api` from now on.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn(api: Box<dyn ArticleApi>) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("quillpost-io".to_string())
            .spawn(move || {
                for job in job_rx {
                    debug!(?job, "worker picked up job");
                    if done_tx.send(execute(api.as_ref(), job)).is_err() {
                        break;
                    }
                }
                debug!("worker stopped");
            })?;
        Ok(Self {
            jobs: job_tx,
            done: done_rx,
            handle,
        })
    }

    /// Queue a job. Returns false if the worker has gone away.
    pub fn submit(&self, job: Job) -> bool {
        self.jobs.send(job).is_ok()
    }

    /// Next finished job, if any.
    pub fn try_recv(&self) -> Option<Completion> {
        match self.done.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("worker channel disconnected");
                None
            }
        }
    }
}
