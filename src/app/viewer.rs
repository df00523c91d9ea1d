//! The viewer loop
//!
//! The single serialized render/composite/input path. The framebuffer
//! and touch panel are exclusive resources, so everything that touches
//! them runs here; sessions only communicate inward through their
//! mailboxes and status channels.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cycle::CycleController;
use crate::device::{DisplaySink, TouchSource};
use crate::error::{Error, Result};
use crate::feeds::FeedRegistry;
use crate::input::{CalibrationProfile, InputTranslator, OverlayLayout};
use crate::render::{Compositor, FrameScheduler, Scene, VideoFrame};
use crate::session::{BackendFactory, SessionPhase, SessionPool, SessionStatus};
use crate::stats::ViewerStats;

use super::config::ViewerConfig;

/// What was last drawn; a repeat scene skips the present entirely
///
/// Matters on SPI panels where every present costs real bus time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SceneKey {
    feed: usize,
    phase: SessionPhase,
    overlay: bool,
    seq: Option<u64>,
    live: bool,
}

/// The appliance control loop
pub struct Viewer<F, D, T>
where
    F: BackendFactory,
    D: DisplaySink,
    T: TouchSource,
{
    config: ViewerConfig,
    registry: FeedRegistry,
    pool: SessionPool<F>,
    scheduler: FrameScheduler,
    compositor: Compositor,
    translator: InputTranslator,
    layout: OverlayLayout,
    cycle: CycleController,
    display: D,
    touch: T,
    stats: ViewerStats,
    current_frame: Option<Arc<VideoFrame>>,
    current_session: usize,
    overlay_until: Option<Instant>,
    last_scene: Option<SceneKey>,
}

impl<F, D, T> Viewer<F, D, T>
where
    F: BackendFactory,
    D: DisplaySink,
    T: TouchSource,
{
    /// Build a viewer over the given devices
    ///
    /// Geometry and pixel format come from the display device; the
    /// config's display fields are only used to construct that device.
    pub fn new(
        config: ViewerConfig,
        registry: FeedRegistry,
        calibration: CalibrationProfile,
        factory: F,
        display: D,
        touch: T,
    ) -> Self {
        let width = display.width();
        let height = display.height();
        let format = display.format();

        let compositor = Compositor::new(width, height, format, config.staleness_bound);
        let translator = InputTranslator::new(calibration, width, height, config.debounce);
        let layout = OverlayLayout::edge_strips(width, height, config.button_width);
        let cycle = CycleController::new(registry.count(), config.auto_cycle_interval, Instant::now());
        let scheduler = FrameScheduler::new(config.target_fps);
        let pool = SessionPool::new(factory, registry.clone(), config.session_config());

        Self {
            config,
            registry,
            pool,
            scheduler,
            compositor,
            translator,
            layout,
            cycle,
            display,
            touch,
            stats: ViewerStats::new(),
            current_frame: None,
            current_session: 0,
            overlay_until: None,
            last_scene: None,
        }
    }

    /// Counters for this run
    pub fn stats(&self) -> &ViewerStats {
        &self.stats
    }

    /// Run the loop until a device error occurs
    pub async fn run(&mut self) -> Result<()> {
        // Tick fast enough for touch latency even at low display rates;
        // the scheduler still gates actual frame presentation.
        let tick = self.scheduler.period().min(Duration::from_millis(20));
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            feeds = self.registry.count(),
            fps = self.config.target_fps,
            "viewer running"
        );

        let mut last_stats_log = Instant::now();
        loop {
            ticker.tick().await;
            let now = Instant::now();
            self.step(now).await?;

            if now.saturating_duration_since(last_stats_log) >= Duration::from_secs(60) {
                last_stats_log = now;
                tracing::debug!(
                    presented = self.stats.frames_presented,
                    dropped = self.stats.frames_dropped,
                    placeholders = self.stats.placeholder_presents,
                    manual = self.stats.manual_navigations,
                    auto = self.stats.auto_navigations,
                    fps = self.stats.presented_fps(),
                    "viewer stats"
                );
            }
        }
    }

    /// Run the loop with graceful shutdown
    pub async fn run_until<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: std::future::Future<Output = ()>,
    {
        tokio::select! {
            result = self.run() => result,
            _ = shutdown => {
                tracing::info!("shutdown signal received");
                Ok(())
            }
        }
    }

    /// Stop all sessions and release their pipelines
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }

    /// One pass of the control loop
    async fn step(&mut self, now: Instant) -> Result<()> {
        // Touch: drain pending samples into at most one navigation each
        while let Some(sample) = self.touch.poll().map_err(Error::Device)? {
            if let Some(tap) = self.translator.feed(sample, now) {
                if let Some(zone) = self.layout.hit_test(tap.x, tap.y) {
                    let index = self.cycle.navigate(zone.direction, now);
                    self.stats.manual_navigations += 1;
                    tracing::info!(
                        feed = %self.registry.get(index).name,
                        zone = zone.name,
                        "navigate"
                    );
                }
            }
        }
        if let Some(release) = self.translator.last_release() {
            self.overlay_until = Some(release + self.config.overlay_timeout);
        }

        // Inactivity auto-advance
        if let Some(index) = self.cycle.tick(now) {
            self.stats.auto_navigations += 1;
            tracing::info!(feed = %self.registry.get(index).name, "auto-cycle");
        }

        // Sessions: active eager, next pre-warmed, nothing else live
        let active = self.cycle.active_index();
        if active != self.current_session {
            self.current_session = active;
            self.current_frame = None;
        }
        let prewarm = if self.config.prewarm_next {
            Some(self.cycle.next_index())
        } else {
            None
        };
        self.pool.retain(active, prewarm).await;

        // Pull at most one new frame through the rate gate
        let status = match self.pool.session(active) {
            Some(session) => {
                let last_seq = self.scheduler.last_seq(active);
                if let Some(frame) = session.poll(last_seq) {
                    if self.scheduler.admit(now, active, frame.seq) {
                        if let Some(last) = last_seq {
                            self.stats.frames_dropped += frame.seq.saturating_sub(last + 1);
                        }
                        self.stats.frames_presented += 1;
                        self.current_frame = Some(frame);
                    }
                }
                session.status()
            }
            None => SessionStatus {
                phase: SessionPhase::Failed,
                consecutive_failures: 0,
            },
        };

        // Compose and present only when the scene actually changed
        let overlay_visible = self.overlay_until.map(|t| now < t).unwrap_or(false);
        let frame = self.current_frame.as_deref();
        let live = status.phase == SessionPhase::Streaming
            && frame
                .map(|f| !f.is_stale(now, self.config.staleness_bound))
                .unwrap_or(false);
        let key = SceneKey {
            feed: active,
            phase: status.phase,
            overlay: overlay_visible,
            seq: frame.map(|f| f.seq),
            live,
        };

        if self.last_scene != Some(key) {
            let scene = Scene {
                frame,
                feed_name: &self.registry.get(active).name,
                phase: status.phase,
                overlay_visible,
            };
            let buffer = self.compositor.composite(&scene, now);
            self.display.present(buffer).map_err(Error::Device)?;
            if !live {
                self.stats.placeholder_presents += 1;
            }
            self.last_scene = Some(key);
        }

        Ok(())
    }
}
