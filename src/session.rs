//! Single-threaded driver that owns a repository and serializes every mutation.
//!
//! Commands, the showcase timer, the bounds debounce and feed polling all run
//! through one `select!` loop, so the repository is never touched concurrently.

use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

use crate::feed::{Arrival, IngestBatch, IngestTracker, MetadataFeed, replacement_patch};
use crate::foundation::core::{Point, Position3D};
use crate::foundation::error::ShowcaseResult;
use crate::layout::{DragOutcome, LayoutStrategy};
use crate::photo::metadata::PhotoMetadata;
use crate::repository::PhotoDataRepository;
use crate::repository::render::RenderAdapter;

pub enum SessionCommand {
    AddPhotos {
        photos: Vec<PhotoMetadata>,
        animate: bool,
    },
    RemovePhoto(String),
    SwitchStrategy {
        strategy: Box<dyn LayoutStrategy>,
        reply: Option<oneshot::Sender<ShowcaseResult<()>>>,
    },
    UpdateMetadata {
        id: String,
        patch: Map<String, Value>,
    },
    DragStart {
        id: String,
        at: Position3D,
    },
    DragMove(Position3D),
    DragEnd {
        at: Position3D,
        reply: Option<oneshot::Sender<ShowcaseResult<DragOutcome>>>,
    },
    Hover(Option<Point>),
    Showcase(String),
    Shutdown,
}

impl std::fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddPhotos { photos, animate } => f
                .debug_struct("AddPhotos")
                .field("count", &photos.len())
                .field("animate", animate)
                .finish(),
            Self::RemovePhoto(id) => f.debug_tuple("RemovePhoto").field(id).finish(),
            Self::SwitchStrategy { strategy, .. } => f
                .debug_struct("SwitchStrategy")
                .field("strategy", &strategy.name())
                .finish_non_exhaustive(),
            Self::UpdateMetadata { id, .. } => f
                .debug_struct("UpdateMetadata")
                .field("id", id)
                .finish_non_exhaustive(),
            Self::DragStart { id, at } => f
                .debug_struct("DragStart")
                .field("id", id)
                .field("at", at)
                .finish(),
            Self::DragMove(at) => f.debug_tuple("DragMove").field(at).finish(),
            Self::DragEnd { at, .. } => f
                .debug_struct("DragEnd")
                .field("at", at)
                .finish_non_exhaustive(),
            Self::Hover(p) => f.debug_tuple("Hover").field(p).finish(),
            Self::Showcase(id) => f.debug_tuple("Showcase").field(id).finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Sending half handed to input handlers and the host application.
pub type SessionHandle = mpsc::UnboundedSender<SessionCommand>;

pub struct ShowcaseSession<A: RenderAdapter> {
    repo: PhotoDataRepository<A>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    feed: Option<Box<dyn MetadataFeed>>,
    tracker: IngestTracker,
    poll_interval: Duration,
}

impl<A: RenderAdapter> std::fmt::Debug for ShowcaseSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShowcaseSession")
            .field("photos", &self.repo.len())
            .field("strategy", &self.repo.layout_strategy_name())
            .field("has_feed", &self.feed.is_some())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<A: RenderAdapter> ShowcaseSession<A> {
    pub fn new(repo: PhotoDataRepository<A>) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            repo,
            commands: rx,
            feed: None,
            tracker: IngestTracker::new(),
            poll_interval: Duration::from_secs(10),
        };
        (session, tx)
    }

    pub fn with_feed(mut self, feed: Box<dyn MetadataFeed>, poll_interval: Duration) -> Self {
        self.feed = Some(feed);
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn repository(&self) -> &PhotoDataRepository<A> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut PhotoDataRepository<A> {
        &mut self.repo
    }

    pub fn into_repository(self) -> PhotoDataRepository<A> {
        self.repo
    }

    /// Run until `Shutdown` arrives or every handle is dropped.
    ///
    /// Command failures are logged and the loop keeps going; the repository
    /// is disposed on exit.
    #[tracing::instrument(skip(self))]
    pub async fn run(&mut self) {
        let period = self.repo.config().timings.showcase_interval();
        let mut showcase = tokio::time::interval_at(Instant::now() + period, period);
        showcase.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let deadline = self.repo.bounds_deadline();
            let wake = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    None | Some(SessionCommand::Shutdown) => break,
                    Some(cmd) => self.handle(cmd).await,
                },
                _ = showcase.tick() => {
                    self.repo.showcase_tick().await;
                }
                _ = poll.tick(), if self.feed.is_some() => {
                    self.poll_feed().await;
                }
                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    self.repo.flush_bounds();
                }
            }
        }

        tracing::info!(photos = self.repo.len(), "session stopping");
        self.repo.dispose();
    }

    async fn handle(&mut self, cmd: SessionCommand) {
        tracing::debug!(?cmd, "session command");
        match cmd {
            SessionCommand::AddPhotos { photos, animate } => {
                if let Err(e) = self.repo.add_photos(photos, animate).await {
                    tracing::warn!(error = %e, "adding photos failed");
                }
            }
            SessionCommand::RemovePhoto(id) => {
                if let Err(e) = self.repo.remove_photo(&id).await {
                    tracing::warn!(photo = %id, error = %e, "removing photo failed");
                }
            }
            SessionCommand::SwitchStrategy { strategy, reply } => {
                let res = self.repo.set_layout_strategy(strategy).await;
                if let Err(e) = &res {
                    tracing::warn!(error = %e, "strategy switch failed");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(res);
                }
            }
            SessionCommand::UpdateMetadata { id, patch } => {
                if let Err(e) = self.repo.update_metadata(&id, &patch).await {
                    tracing::warn!(photo = %id, error = %e, "metadata update failed");
                }
            }
            SessionCommand::DragStart { id, at } => {
                self.repo.begin_drag(&id, at);
            }
            SessionCommand::DragMove(at) => {
                self.repo.drag_to(at);
            }
            SessionCommand::DragEnd { at, reply } => {
                let res = self.repo.end_drag(at).await;
                if let Err(e) = &res {
                    tracing::warn!(error = %e, "drag end failed");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(res);
                }
            }
            SessionCommand::Hover(focus) => {
                self.repo.hover(focus);
            }
            SessionCommand::Showcase(id) => {
                self.repo.showcase_photo(&id).await;
            }
            SessionCommand::Shutdown => {}
        }
    }

    async fn poll_feed(&mut self) {
        let Some(feed) = self.feed.as_mut() else {
            return;
        };
        match self.tracker.poll(feed.as_mut()).await {
            Ok(batch) => apply_batch(&mut self.repo, batch).await,
            Err(e) => tracing::warn!(error = %e, "feed poll failed"),
        }
    }
}

/// Push one ingest result into the repository: removals first, then quiet
/// arrivals, then spawning arrivals, then updates.
pub async fn apply_batch<A: RenderAdapter>(repo: &mut PhotoDataRepository<A>, batch: IngestBatch) {
    for id in &batch.removed {
        if let Err(e) = repo.remove_photo(id).await {
            tracing::warn!(photo = %id, error = %e, "feed removal failed");
        }
    }
    for (kind, animate) in [(Arrival::Initial, false), (Arrival::Incremental, true)] {
        let photos = batch.by_arrival(kind);
        if photos.is_empty() {
            continue;
        }
        if let Err(e) = repo.add_photos(photos, animate).await {
            tracing::warn!(error = %e, ?kind, "feed arrivals failed");
        }
    }
    for record in &batch.updated {
        let res = match replacement_patch(record) {
            Ok(patch) => repo.update_metadata(&record.id, &patch).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = res {
            tracing::warn!(photo = %record.id, error = %e, "feed update failed");
        }
    }
}
