//! Simulated playback engine
//!
//! A clock-only engine: no decoding happens, but preparation, rendering
//! start and completion are reported from a background thread exactly the
//! way a real backend reports them, which makes the widget drivable
//! without media or a display.

use crate::engine::{DataSource, EngineEventSink, InfoKind, PlaybackEngine, PlayerFactory};
use crate::host::SurfaceId;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Error code reported when preparing without a data source
pub const ERROR_NO_SOURCE: i32 = -1004;

/// Factory producing [`SimulatedEngine`]s of a fixed media length
#[derive(Debug, Clone)]
pub struct SimulatedPlayerFactory {
    duration_ms: u64,
    video_size: (u32, u32),
}

impl SimulatedPlayerFactory {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            video_size: (1920, 1080),
        }
    }

    /// Override the reported video size
    pub fn with_video_size(mut self, width: u32, height: u32) -> Self {
        self.video_size = (width, height);
        self
    }
}

impl PlayerFactory for SimulatedPlayerFactory {
    fn create_player(&self, sink: EngineEventSink) -> Box<dyn PlaybackEngine> {
        Box::new(SimulatedEngine::new(sink, self.duration_ms, self.video_size))
    }
}

/// Media clock shared with the engine thread
#[derive(Debug)]
struct Clock {
    base_ms: u64,
    resumed_at: Option<Instant>,
    speed: f32,
}

impl Clock {
    fn position(&self, duration_ms: u64) -> u64 {
        let running = self
            .resumed_at
            .map(|t| (t.elapsed().as_millis() as f64 * self.speed as f64) as u64)
            .unwrap_or(0);
        (self.base_ms + running).min(duration_ms)
    }

    fn remaining(&self, duration_ms: u64) -> Option<Duration> {
        self.resumed_at?;
        let left = duration_ms.saturating_sub(self.position(duration_ms));
        Some(Duration::from_millis((left as f64 / self.speed.max(0.01) as f64) as u64))
    }

    fn resume(&mut self) {
        if self.resumed_at.is_none() {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn pause(&mut self, duration_ms: u64) {
        self.base_ms = self.position(duration_ms);
        self.resumed_at = None;
    }

    fn seek(&mut self, position_ms: u64) {
        self.base_ms = position_ms;
        if self.resumed_at.is_some() {
            self.resumed_at = Some(Instant::now());
        }
    }
}

/// Clock-driven engine used by the demo binary and tests
pub struct SimulatedEngine {
    sink: EngineEventSink,
    duration_ms: u64,
    video_size: (u32, u32),
    clock: Arc<Mutex<Clock>>,
    looping: Arc<Mutex<bool>>,
    wake_tx: Option<Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
    source: Option<String>,
    surface: Option<SurfaceId>,
    volume: (f32, f32),
    media_codec: bool,
}

impl SimulatedEngine {
    pub fn new(sink: EngineEventSink, duration_ms: u64, video_size: (u32, u32)) -> Self {
        Self {
            sink,
            duration_ms,
            video_size,
            clock: Arc::new(Mutex::new(Clock {
                base_ms: 0,
                resumed_at: None,
                speed: 1.0,
            })),
            looping: Arc::new(Mutex::new(false)),
            wake_tx: None,
            worker: None,
            source: None,
            surface: None,
            volume: (1.0, 1.0),
            media_codec: false,
        }
    }

    /// Current channel volumes
    pub fn volume(&self) -> (f32, f32) {
        self.volume
    }

    /// Surface frames would be drawn into
    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn media_codec_enabled(&self) -> bool {
        self.media_codec
    }

    fn wake(&self) {
        if let Some(tx) = &self.wake_tx {
            let _ = tx.send(());
        }
    }

    fn stop_worker(&mut self) {
        // Dropping the sender disconnects the worker loop
        self.wake_tx = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn clock_thread(
        sink: EngineEventSink,
        clock: Arc<Mutex<Clock>>,
        looping: Arc<Mutex<bool>>,
        duration_ms: u64,
        video_size: (u32, u32),
        wake_rx: Receiver<()>,
    ) {
        sink.prepared();
        sink.video_size_changed(video_size.0, video_size.1);
        clock.lock().resume();
        sink.info(InfoKind::RenderingStart, 0);

        loop {
            let remaining = clock.lock().remaining(duration_ms);
            let woke = match remaining {
                Some(wait) => wake_rx.recv_timeout(wait),
                None => wake_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match woke {
                Ok(()) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    if *looping.lock() {
                        clock.lock().seek(0);
                        continue;
                    }
                    clock.lock().pause(duration_ms);
                    sink.completion();
                }
            }
        }
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn set_option(&mut self, key: &str, value: &str) {
        debug!("Simulated engine option {}={}", key, value);
    }

    fn init(&mut self) {
        debug!("Simulated engine initialised (generation {})", self.sink.generation());
    }

    fn set_data_source(&mut self, source: DataSource<'_>) {
        self.source = Some(match source {
            DataSource::Asset(stream) => format!("asset:{}", stream.name()),
            DataSource::Url { url, .. } => url.to_string(),
        });
    }

    fn set_surface(&mut self, surface: SurfaceId) {
        self.surface = Some(surface);
    }

    fn prepare_async(&mut self) {
        let Some(source) = &self.source else {
            self.sink.error(1, ERROR_NO_SOURCE);
            return;
        };
        info!("Simulated engine preparing {} ({} ms)", source, self.duration_ms);

        self.stop_worker();
        let (wake_tx, wake_rx) = crossbeam_channel::unbounded();
        let sink = self.sink.clone();
        let clock = Arc::clone(&self.clock);
        let looping = Arc::clone(&self.looping);
        let duration_ms = self.duration_ms;
        let video_size = self.video_size;

        self.wake_tx = Some(wake_tx);
        self.worker = Some(thread::spawn(move || {
            Self::clock_thread(sink, clock, looping, duration_ms, video_size, wake_rx);
        }));
    }

    fn reset(&mut self) {
        self.stop_worker();
        let mut clock = self.clock.lock();
        clock.base_ms = 0;
        clock.resumed_at = None;
        self.source = None;
    }

    fn start(&mut self) {
        self.clock.lock().resume();
        self.wake();
    }

    fn pause(&mut self) {
        self.clock.lock().pause(self.duration_ms);
        self.wake();
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.clock.lock().seek(position_ms.min(self.duration_ms));
        self.wake();
    }

    fn current_position(&self) -> u64 {
        self.clock.lock().position(self.duration_ms)
    }

    fn duration(&self) -> u64 {
        self.duration_ms
    }

    fn is_playing(&self) -> bool {
        self.clock.lock().resumed_at.is_some()
    }

    fn buffered_percentage(&self) -> u32 {
        if self.worker.is_some() { 100 } else { 0 }
    }

    fn set_volume(&mut self, left: f32, right: f32) {
        self.volume = (left.clamp(0.0, 1.0), right.clamp(0.0, 1.0));
    }

    fn set_speed(&mut self, speed: f32) {
        let mut clock = self.clock.lock();
        let was_running = clock.resumed_at.is_some();
        clock.pause(self.duration_ms);
        clock.speed = speed.clamp(0.25, 4.0);
        if was_running {
            clock.resume();
        }
        drop(clock);
        self.wake();
    }

    fn set_looping(&mut self, looping: bool) {
        *self.looping.lock() = looping;
    }

    fn set_media_codec_enabled(&mut self, enabled: bool) {
        self.media_codec = enabled;
    }

    fn release(&mut self) {
        self.stop_worker();
        self.clock.lock().resumed_at = None;
        debug!("Simulated engine released (generation {})", self.sink.generation());
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
