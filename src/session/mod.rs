//! Stream session lifecycle
//!
//! A [`StreamSession`] owns one feed's connection + decode lifecycle. The
//! backend runs in its own tokio task and talks to the render loop only
//! through two one-way channels: the latest-frame [`FrameMailbox`] and a
//! `watch` status channel. A session failure is strictly local; it can
//! never block or stall the render loop or another session.

pub mod backend;
pub mod mailbox;
pub mod pool;
pub mod sim;
pub mod state;

#[cfg(feature = "backend-gst")]
pub mod gst;

pub use backend::{BackendFactory, BackendStatus, DecodeBackend, StreamError};
pub use mailbox::FrameMailbox;
pub use pool::SessionPool;
pub use sim::{SimBackend, SimBackendFactory};
pub use state::{RetryPolicy, SessionPhase, SessionState};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::feeds::FeedConfig;
use crate::render::VideoFrame;

/// Snapshot of a session's lifecycle state
#[derive(Debug, Clone)]
pub struct SessionStatus {
    /// Current phase
    pub phase: SessionPhase,
    /// Failures in the current rolling window
    pub consecutive_failures: u32,
}

/// Session tuning shared by all sessions of a viewer
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Decode poll cadence of the driver task
    pub poll_interval: Duration,
    /// Reconnect/backoff policy
    pub retry: RetryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// One feed's runtime connection/decode lifecycle
///
/// Dropping the session (or calling [`StreamSession::shutdown`]) cancels
/// the driver task within one poll interval; the backend's resources are
/// released on every exit path.
pub struct StreamSession {
    index: usize,
    feed: FeedConfig,
    mailbox: Arc<FrameMailbox>,
    status_rx: watch::Receiver<SessionStatus>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl StreamSession {
    /// Start a session by spawning its driver task
    pub fn spawn<B>(index: usize, feed: FeedConfig, backend: B, config: SessionConfig) -> Self
    where
        B: DecodeBackend + 'static,
    {
        let mailbox = Arc::new(FrameMailbox::new());
        let (status_tx, status_rx) = watch::channel(SessionStatus {
            phase: SessionPhase::Idle,
            consecutive_failures: 0,
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(drive(
            backend,
            feed.clone(),
            Arc::clone(&mailbox),
            status_tx,
            shutdown_rx,
            config,
        ));

        Self {
            index,
            feed,
            mailbox,
            status_rx,
            shutdown_tx,
            task,
        }
    }

    /// Cycle-order index of the feed this session serves
    pub fn index(&self) -> usize {
        self.index
    }

    /// The feed configuration
    pub fn feed(&self) -> &FeedConfig {
        &self.feed
    }

    /// Newest frame beyond `last_seq`, without blocking
    pub fn poll(&self, last_seq: Option<u64>) -> Option<Arc<VideoFrame>> {
        self.mailbox.take_newer(last_seq)
    }

    /// Current lifecycle snapshot
    pub fn status(&self) -> SessionStatus {
        self.status_rx.borrow().clone()
    }

    /// Stop the session and wait for the backend to be released
    ///
    /// The driver observes the shutdown flag within one poll interval
    /// even while sleeping out a backoff delay, so this completes in
    /// bounded time rather than waiting on transport timeouts.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

/// Sleep, returning early (true) if shutdown is requested
async fn wait_or_shutdown(shutdown_rx: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        changed = shutdown_rx.changed() => changed.is_err() || *shutdown_rx.borrow(),
    }
}

fn publish_status(status_tx: &watch::Sender<SessionStatus>, state: &SessionState) {
    let _ = status_tx.send(SessionStatus {
        phase: state.phase(),
        consecutive_failures: state.consecutive_failures(),
    });
}

/// Backend driver: connect, stream, reconnect with backoff, release
async fn drive<B: DecodeBackend>(
    mut backend: B,
    feed: FeedConfig,
    mailbox: Arc<FrameMailbox>,
    status_tx: watch::Sender<SessionStatus>,
    mut shutdown_rx: watch::Receiver<bool>,
    config: SessionConfig,
) {
    let mut state = SessionState::new(config.retry);

    'outer: loop {
        if *shutdown_rx.borrow() {
            break;
        }

        state.begin_connect();
        publish_status(&status_tx, &state);
        tracing::debug!(feed = %feed.name, url = %feed.redacted_url(), "connecting");

        let error = match backend.start() {
            Ok(()) => {
                state.on_streaming();
                publish_status(&status_tx, &state);
                tracing::info!(feed = %feed.name, "stream up");

                loop {
                    if *shutdown_rx.borrow() {
                        break 'outer;
                    }
                    match backend.poll() {
                        Ok(Some(frame)) => mailbox.publish(frame),
                        Ok(None) => {}
                        Err(e) => break e,
                    }
                    if wait_or_shutdown(&mut shutdown_rx, config.poll_interval).await {
                        break 'outer;
                    }
                }
            }
            Err(e) => e,
        };

        // Release pipeline resources between attempts and drop the last
        // frame so a dead stream never lingers on screen.
        backend.stop();
        mailbox.clear();

        let delay = state.on_error(Instant::now());
        publish_status(&status_tx, &state);
        tracing::warn!(
            feed = %feed.name,
            phase = ?state.phase(),
            failures = state.consecutive_failures(),
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "stream error, backing off"
        );

        if wait_or_shutdown(&mut shutdown_rx, delay).await {
            break;
        }
    }

    backend.stop();
    tracing::debug!(feed = %feed.name, "session stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use super::*;
    use crate::render::PixelFormat;

    fn fast_config() -> SessionConfig {
        SessionConfig {
            poll_interval: Duration::from_millis(1),
            retry: RetryPolicy {
                backoff_base: Duration::from_millis(1),
                backoff_cap: Duration::from_millis(5),
                max_consecutive_failures: 3,
                failure_window: Duration::from_secs(60),
            },
        }
    }

    fn feed() -> FeedConfig {
        FeedConfig::new("cam", "rtsp://cam/ch0")
    }

    async fn wait_for_phase(session: &StreamSession, phase: SessionPhase) {
        for _ in 0..500 {
            if session.status().phase == phase {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("session never reached {:?}", phase);
    }

    #[tokio::test]
    async fn test_session_streams_frames() {
        let backend = SimBackend::new(4, 4, PixelFormat::Bgra8888)
            .with_frame_interval(Duration::from_millis(1));
        let session = StreamSession::spawn(0, feed(), backend, fast_config());

        wait_for_phase(&session, SessionPhase::Streaming).await;

        let mut last = None;
        for _ in 0..200 {
            if let Some(frame) = session.poll(last) {
                if last.is_some() {
                    break;
                }
                last = Some(frame.seq);
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert!(last.is_some(), "no frames delivered");

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_session_recovers_from_failed_starts() {
        let backend = SimBackend::new(4, 4, PixelFormat::Bgra8888)
            .with_frame_interval(Duration::from_millis(1))
            .fail_next_starts(2);
        let session = StreamSession::spawn(0, feed(), backend, fast_config());

        wait_for_phase(&session, SessionPhase::Streaming).await;
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_session_enters_failed_after_budget() {
        let backend = SimBackend::new(4, 4, PixelFormat::Bgra8888).fail_next_starts(100);
        let session = StreamSession::spawn(0, feed(), backend, fast_config());

        wait_for_phase(&session, SessionPhase::Failed).await;
        assert!(session.status().consecutive_failures >= 3);
        session.shutdown().await;
    }

    struct TrackedBackend {
        inner: SimBackend,
        stopped: Arc<AtomicBool>,
        stops: Arc<AtomicU32>,
    }

    impl DecodeBackend for TrackedBackend {
        fn start(&mut self) -> Result<(), StreamError> {
            self.stopped.store(false, Ordering::SeqCst);
            self.inner.start()
        }

        fn poll(&mut self) -> Result<Option<VideoFrame>, StreamError> {
            self.inner.poll()
        }

        fn stop(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.inner.stop();
        }

        fn status(&self) -> BackendStatus {
            self.inner.status()
        }
    }

    #[tokio::test]
    async fn test_shutdown_releases_backend() {
        let stopped = Arc::new(AtomicBool::new(false));
        let stops = Arc::new(AtomicU32::new(0));
        let backend = TrackedBackend {
            inner: SimBackend::new(4, 4, PixelFormat::Bgra8888)
                .with_frame_interval(Duration::from_millis(1)),
            stopped: Arc::clone(&stopped),
            stops: Arc::clone(&stops),
        };

        let session = StreamSession::spawn(0, feed(), backend, fast_config());
        wait_for_phase(&session, SessionPhase::Streaming).await;
        session.shutdown().await;

        assert!(stopped.load(Ordering::SeqCst));
        assert!(stops.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_drop_of_handle_stops_driver() {
        let stopped = Arc::new(AtomicBool::new(false));
        let backend = TrackedBackend {
            inner: SimBackend::new(4, 4, PixelFormat::Bgra8888)
                .with_frame_interval(Duration::from_millis(1)),
            stopped: Arc::clone(&stopped),
            stops: Arc::new(AtomicU32::new(0)),
        };

        let session = StreamSession::spawn(0, feed(), backend, fast_config());
        wait_for_phase(&session, SessionPhase::Streaming).await;

        // Dropping the handle closes the shutdown channel; the driver
        // treats a closed channel as a shutdown request.
        drop(session);

        for _ in 0..500 {
            if stopped.load(Ordering::SeqCst) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("backend never released after handle drop");
    }
}
