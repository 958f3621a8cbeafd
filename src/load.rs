//! Scene load request: resolve a source into a loaded remote scene.
//!
//! ```text
//!            load call                 poll every interval
//! Pending ─────────────▶ Downloading ◀──┐
//!    │                   Loading     ◀──┤ (re-poll)
//!    │                      │  └────────┘
//!    │                      ├──▶ Done                  → Ok(LoadedScene)
//!    │                      ├──▶ Failed(DownloadingError | LoadingError | Unknown)
//!    │                      └──▶ Failed(ServerDisconnected)
//!    └──── abort() from any non-terminal state ──▶ Cancelled
//! ```
//!
//! Progress is published on a bounded channel and read back as a
//! [`Stream`] that ends once the request is terminal.  One consumer per
//! request.  `abort()` only stops local waiting; remote work already
//! dispatched is not retracted.

use core::cell::{Cell, RefCell};
use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::rc::Rc;
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;
use futures_lite::Stream;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::rpc::safe_client::SafeClient;
use crate::rpc::transport::Transport;
use crate::rpc::types::{Handle, VimLoadingState};

/// Default interval between load-status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Progress updates buffered before the oldest is dropped.
const UPDATE_DEPTH: usize = 16;

// ═══════════════════════════════════════════════════════════════
//  Source & result types
// ═══════════════════════════════════════════════════════════════

/// Where a scene comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VimSource {
    pub url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl VimSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Server-side path for `file:` sources, `None` for remote URLs.
    pub fn local_path(&self) -> Option<String> {
        self.url
            .starts_with("file:")
            .then(|| self.url.replacen("file:///", "file://", 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadErrorKind {
    DownloadingError,
    LoadingError,
    ServerDisconnected,
    Cancelled,
    Unknown,
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DownloadingError => write!(f, "download failed"),
            Self::LoadingError => write!(f, "load failed"),
            Self::ServerDisconnected => write!(f, "server disconnected"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Unknown => write!(f, "unknown error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub kind: LoadErrorKind,
    /// Human-readable detail, usually the server's last error.
    pub details: String,
}

impl LoadError {
    pub fn new(kind: LoadErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.details.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.details)
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedScene {
    pub handle: Handle,
    pub element_count: u32,
}

/// Lifecycle of a [`LoadRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Pending,
    Downloading,
    Loading,
    Done,
    Failed(LoadErrorKind),
    Cancelled,
}

impl LoadPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed(_) | Self::Cancelled)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Delay port
// ═══════════════════════════════════════════════════════════════

/// Waits between polls.  Swappable so tests do not sleep.
#[allow(async_fn_in_trait)]
pub trait Delay {
    async fn delay(&self, duration: Duration);
}

/// Timer on the `async-io-mini` reactor.
pub struct ReactorDelay;

impl Delay for ReactorDelay {
    async fn delay(&self, duration: Duration) {
        async_io_mini::Timer::after(duration).await;
    }
}

// ═══════════════════════════════════════════════════════════════
//  Load request
// ═══════════════════════════════════════════════════════════════

enum LoadUpdate {
    Progress(f32),
    Finished,
}

struct Shared {
    phase: Cell<LoadPhase>,
    progress: Cell<Option<f32>>,
    updates: Channel<NoopRawMutex, LoadUpdate, UPDATE_DEPTH>,
}

impl Shared {
    /// Publish an update, dropping the oldest when the consumer lags.
    fn publish(&self, update: LoadUpdate) {
        if let Err(embassy_sync::channel::TrySendError::Full(update)) =
            self.updates.try_send(update)
        {
            let _ = self.updates.try_receive();
            let _ = self.updates.try_send(update);
        }
    }
}

pub struct LoadRequest {
    source: VimSource,
    poll_interval: Duration,
    shared: Rc<Shared>,
    handle: Cell<Option<Handle>>,
    error: RefCell<Option<LoadError>>,
}

impl LoadRequest {
    pub fn new(source: VimSource) -> Self {
        Self {
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
            shared: Rc::new(Shared {
                phase: Cell::new(LoadPhase::Pending),
                progress: Cell::new(None),
                updates: Channel::new(),
            }),
            handle: Cell::new(None),
            error: RefCell::new(None),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn source(&self) -> &VimSource {
        &self.source
    }

    pub fn phase(&self) -> LoadPhase {
        self.shared.phase.get()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Last reported progress fraction, 0 before the first poll.
    pub fn progress(&self) -> f32 {
        self.shared.progress.get().unwrap_or(0.0)
    }

    /// Remote handle once the load call returned one.
    pub fn handle(&self) -> Option<Handle> {
        self.handle.get()
    }

    pub fn error(&self) -> Option<LoadError> {
        self.error.borrow().clone()
    }

    /// Stop waiting.  Returns `false` when the request was already
    /// terminal.
    pub fn abort(&self) -> bool {
        if self.is_terminal() {
            return false;
        }
        info!("load {}: cancelled", self.source.url);
        self.enter(LoadPhase::Cancelled);
        true
    }

    /// Live progress values; ends when the request is terminal.
    pub fn progress_stream(&self) -> ProgressStream {
        ProgressStream {
            shared: self.shared.clone(),
            done: false,
        }
    }

    /// Move to `phase`.  Terminal phases are final.
    fn enter(&self, phase: LoadPhase) {
        let previous = self.shared.phase.get();
        if previous.is_terminal() {
            return;
        }
        self.shared.phase.set(phase);
        if previous != phase && !phase.is_terminal() {
            info!("load {}: {phase:?}", self.source.url);
        }
        if phase.is_terminal() {
            self.shared.publish(LoadUpdate::Finished);
        }
    }

    fn report(&self, progress: f32) {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let advanced = self
            .shared
            .progress
            .get()
            .is_none_or(|last| progress > last);
        if advanced {
            self.shared.progress.set(Some(progress));
            self.shared.publish(LoadUpdate::Progress(progress));
        }
    }

    fn fail(&self, kind: LoadErrorKind, details: impl Into<String>) -> LoadError {
        if self.phase() == LoadPhase::Cancelled {
            return self.cancelled();
        }
        let err = LoadError::new(kind, details);
        warn!("load {}: {err}", self.source.url);
        *self.error.borrow_mut() = Some(err.clone());
        self.enter(LoadPhase::Failed(kind));
        err
    }

    fn cancelled(&self) -> LoadError {
        LoadError::new(LoadErrorKind::Cancelled, "")
    }

    async fn remote_failure<T: Transport>(
        &self,
        client: &SafeClient<T>,
        kind: LoadErrorKind,
    ) -> LoadError {
        let details = client.get_last_error().await;
        if !client.connected() {
            return self.fail(LoadErrorKind::ServerDisconnected, details);
        }
        self.fail(kind, details)
    }

    fn transport_failure<T: Transport>(&self, client: &SafeClient<T>, err: &Error) -> LoadError {
        if !client.connected() || *err == Error::NotConnected {
            self.fail(LoadErrorKind::ServerDisconnected, err.to_string())
        } else {
            self.fail(LoadErrorKind::Unknown, err.to_string())
        }
    }

    /// Drive the request to a terminal state.
    pub async fn run<T: Transport>(
        &self,
        client: &SafeClient<T>,
        delay: &impl Delay,
    ) -> Result<LoadedScene, LoadError> {
        if self.is_terminal() {
            return Err(self
                .error()
                .unwrap_or_else(|| self.cancelled()));
        }

        let started = Instant::now();
        let handle = match client.try_load_source(&self.source).await {
            Ok(handle) => handle,
            Err(Error::Rejected(_)) => {
                return Err(self.remote_failure(client, LoadErrorKind::Unknown).await);
            }
            Err(err @ Error::Validation(_)) => {
                return Err(self.fail(LoadErrorKind::Unknown, err.to_string()));
            }
            Err(err) => return Err(self.transport_failure(client, &err)),
        };
        self.handle.set(Some(handle));

        loop {
            if self.phase() == LoadPhase::Cancelled {
                return Err(self.cancelled());
            }

            let status = match client.try_get_vim_loading_state(handle).await {
                Ok(status) => status,
                Err(err) => return Err(self.transport_failure(client, &err)),
            };
            if self.phase() == LoadPhase::Cancelled {
                return Err(self.cancelled());
            }

            match status.state {
                VimLoadingState::Downloading => {
                    self.enter(LoadPhase::Downloading);
                    self.report(status.progress);
                }
                VimLoadingState::Loading => {
                    self.enter(LoadPhase::Loading);
                    self.report(status.progress);
                }
                VimLoadingState::Done => {
                    let element_count = match client.try_get_element_count(handle).await {
                        Ok(count) => count,
                        Err(err) => return Err(self.transport_failure(client, &err)),
                    };
                    if self.phase() == LoadPhase::Cancelled {
                        return Err(self.cancelled());
                    }
                    info!(
                        "load {}: done in {} ms, handle {handle}, {element_count} elements",
                        self.source.url,
                        started.elapsed().as_millis()
                    );
                    self.enter(LoadPhase::Done);
                    return Ok(LoadedScene {
                        handle,
                        element_count,
                    });
                }
                VimLoadingState::FailedToDownload => {
                    return Err(self
                        .remote_failure(client, LoadErrorKind::DownloadingError)
                        .await);
                }
                VimLoadingState::FailedToLoad => {
                    return Err(self.remote_failure(client, LoadErrorKind::LoadingError).await);
                }
                VimLoadingState::Unknown => {
                    return Err(self.remote_failure(client, LoadErrorKind::Unknown).await);
                }
            }

            delay.delay(self.poll_interval).await;
        }
    }
}

/// Progress values of one [`LoadRequest`].
pub struct ProgressStream {
    shared: Rc<Shared>,
    done: bool,
}

impl Stream for ProgressStream {
    type Item = f32;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<f32>> {
        if self.done {
            return Poll::Ready(None);
        }
        match self.shared.updates.poll_receive(cx) {
            Poll::Ready(LoadUpdate::Progress(p)) => Poll::Ready(Some(p)),
            Poll::Ready(LoadUpdate::Finished) => {
                self.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
