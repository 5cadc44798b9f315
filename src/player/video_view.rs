//! Video view lifecycle coordinator
//!
//! [`VideoView`] ties one engine, one host and the helper state machines
//! together. It sequences engine creation, source binding, preparation and
//! teardown, and guarantees that every acquired engine is released exactly
//! once.
//!
//! All callbacks (engine, orientation sensor, window and audio focus) are
//! posted to the widget's own FIFO queue and drained by [`VideoView::pump`]
//! on the owner's thread.

use crate::engine::{DataSource, EngineEvent, EngineEventSink, PlaybackEngine, PlayerFactory};
use crate::host::{
    AudioFocusArbiter, ConnectionKind, ControlSurface, NetworkPolicy, OrientationSensor,
    RenderSurface, SurfaceHost, SurfaceKind, ViewHandle,
};
use crate::player::events::{AudioFocusChange, ViewEvent, ViewEventSender};
use crate::player::listeners::{ListenerSet, StateChangeListener};
use crate::player::orientation::OrientationPolicy;
use crate::player::progress::ProgressStore;
use crate::player::registry::{ActiveInstanceRegistry, InstanceId, Releasable};
use crate::player::screen::ScreenModeController;
use crate::player::state::{Effect, PlaybackStateMachine};
use crate::player::{AssetStream, PlayState, ScreenMode, ScreenScaleMode, Source};
use crate::utils::{Result, ResultExt, VideoViewConfig, VideoViewError};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, trace, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Volume applied while another stream ducks us
const DUCKED_VOLUME: f32 = 0.1;

/// Widgets are shared so the registry can release them
pub type SharedVideoView = Arc<Mutex<VideoView>>;

/// Builder for [`VideoView`]
pub struct VideoViewBuilder {
    config: VideoViewConfig,
    factory: Option<Box<dyn PlayerFactory>>,
    host: Option<Box<dyn SurfaceHost>>,
    sensor: Option<Box<dyn OrientationSensor>>,
    audio_focus: Option<Box<dyn AudioFocusArbiter>>,
    network: Option<Box<dyn NetworkPolicy>>,
    control: Option<Box<dyn ControlSurface>>,
    progress: Option<Box<dyn ProgressStore>>,
    registry: Option<Arc<ActiveInstanceRegistry>>,
    listeners: Vec<Arc<dyn StateChangeListener>>,
}

impl Default for VideoViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoViewBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: VideoViewConfig::default(),
            factory: None,
            host: None,
            sensor: None,
            audio_focus: None,
            network: None,
            control: None,
            progress: None,
            registry: None,
            listeners: Vec::new(),
        }
    }

    /// Set widget configuration
    pub fn with_config(mut self, config: VideoViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Factory creating a fresh engine for every playback
    pub fn with_player_factory(mut self, factory: Box<dyn PlayerFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_surface_host(mut self, host: Box<dyn SurfaceHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_orientation_sensor(mut self, sensor: Box<dyn OrientationSensor>) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn with_audio_focus(mut self, arbiter: Box<dyn AudioFocusArbiter>) -> Self {
        self.audio_focus = Some(arbiter);
        self
    }

    pub fn with_network_policy(mut self, policy: Box<dyn NetworkPolicy>) -> Self {
        self.network = Some(policy);
        self
    }

    pub fn with_control_surface(mut self, control: Box<dyn ControlSurface>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn with_progress_store(mut self, store: Box<dyn ProgressStore>) -> Self {
        self.progress = Some(store);
        self
    }

    /// Share a registry with other widgets; a private one is created otherwise
    pub fn with_registry(mut self, registry: Arc<ActiveInstanceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn StateChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Build the widget
    ///
    /// Fails with a configuration error when the player factory or the
    /// surface host is missing, or the configuration does not validate.
    pub fn build(self) -> Result<SharedVideoView> {
        let VideoViewBuilder {
            config,
            factory,
            host,
            sensor,
            audio_focus,
            network,
            control,
            progress,
            registry,
            listeners,
        } = self;

        config.validate()?;
        let factory = factory.ok_or_else(|| VideoViewError::config("player factory is required"))?;
        let host = host.ok_or_else(|| VideoViewError::config("surface host is required"))?;

        let registry = registry.unwrap_or_else(|| Arc::new(ActiveInstanceRegistry::new()));
        if config.play_on_mobile_network {
            registry.set_play_on_mobile_network(true);
        }
        let id = registry.allocate_id();

        let mut screen = ScreenModeController::new(
            ViewHandle(id.0),
            host,
            sensor,
            config.enable_orientation,
            Duration::from_millis(config.focus_reenable_delay_ms),
        );
        if let Some((width, height)) = config.tiny_screen_size() {
            screen.set_tiny_size(width, height);
        }
        screen.set_tiny_corner(config.tiny_screen_corner);

        let mut listener_set = ListenerSet::new();
        for listener in listeners {
            listener_set.add(listener);
        }

        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        info!("Video view {} created", id.0);

        Ok(Arc::new_cyclic(|weak| {
            Mutex::new(VideoView {
                id,
                self_ref: weak.clone(),
                config,
                factory,
                engine: None,
                generation: 0,
                state: PlaybackStateMachine::new(),
                screen,
                orientation: OrientationPolicy::new(),
                render_surface: None,
                audio_focus,
                network,
                control,
                progress,
                registry,
                listeners: listener_set,
                source: None,
                retired_assets: Vec::new(),
                current_position: 0,
                video_size: (0, 0),
                muted: false,
                locked: false,
                paused_by_focus: false,
                events_tx,
                events_rx,
            })
        }))
    }
}

/// Embeddable video playback widget
pub struct VideoView {
    id: InstanceId,
    self_ref: Weak<Mutex<VideoView>>,
    config: VideoViewConfig,
    factory: Box<dyn PlayerFactory>,

    /// Live engine; `None` whenever the widget is idle
    engine: Option<Box<dyn PlaybackEngine>>,

    /// Generation of the live engine; bumped on every acquisition and release
    generation: u64,

    state: PlaybackStateMachine,
    screen: ScreenModeController,
    orientation: OrientationPolicy,
    render_surface: Option<Box<dyn RenderSurface>>,
    audio_focus: Option<Box<dyn AudioFocusArbiter>>,
    network: Option<Box<dyn NetworkPolicy>>,
    control: Option<Box<dyn ControlSurface>>,
    progress: Option<Box<dyn ProgressStore>>,
    registry: Arc<ActiveInstanceRegistry>,
    listeners: ListenerSet,
    source: Option<Source>,

    /// Streams replaced while an engine was bound to them; closed on release
    retired_assets: Vec<Box<dyn AssetStream>>,

    /// Cached playback position in milliseconds
    current_position: u64,

    video_size: (u32, u32),
    muted: bool,
    locked: bool,

    /// Playback was paused by an audio focus loss
    paused_by_focus: bool,

    events_tx: Sender<ViewEvent>,
    events_rx: Receiver<ViewEvent>,
}

impl VideoView {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn config(&self) -> &VideoViewConfig {
        &self.config
    }

    /// Producer handle for host callbacks
    pub fn event_sender(&self) -> ViewEventSender {
        ViewEventSender::new(self.events_tx.clone())
    }

    // ----- source binding -----

    /// Bind the media to play; takes effect on the next fresh start
    pub fn set_source(&mut self, source: Source) {
        if self.engine.is_some() {
            debug!("View {}: source stored while an engine is alive", self.id.0);
            if let Some(Source::Asset(stream)) = self.source.take() {
                self.retired_assets.push(stream);
            }
        } else {
            self.close_asset();
        }
        self.source = Some(source);
    }

    pub fn set_url<S: Into<String>>(&mut self, url: S) {
        self.set_source(Source::url(url));
    }

    pub fn set_url_with_headers<S: Into<String>>(&mut self, url: S, headers: HashMap<String, String>) {
        self.set_source(Source::url_with_headers(url, headers));
    }

    pub fn set_asset<A: AssetStream + 'static>(&mut self, stream: A) {
        self.set_source(Source::asset(stream));
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    // ----- playback commands -----

    /// Start playback
    ///
    /// From idle this runs the full first-play sequence. With a live engine
    /// in a playback state it simply resumes the engine.
    pub fn start(&mut self) {
        if self.in_idle() {
            if self.start_play() {
                self.set_keep_screen_on(true);
            }
        } else if self.in_playback() {
            self.start_in_playback_state();
            self.set_keep_screen_on(true);
            self.request_audio_focus();
        } else {
            debug!("View {}: start ignored in {:?}", self.id.0, self.state.state());
        }
    }

    pub fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.pause();
        }
        self.set_play_state(PlayState::Paused);
        self.set_keep_screen_on(false);
        self.abandon_audio_focus();
    }

    pub fn resume(&mut self) {
        if !self.in_playback() {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if engine.is_playing() {
            return;
        }
        engine.start();
        self.set_play_state(PlayState::Playing);
        self.request_audio_focus();
        self.set_keep_screen_on(true);
    }

    /// Tear the widget down; a no-op while idle
    pub fn release(&mut self) {
        self.registry.unregister(self.id);
        if self.in_idle() {
            return;
        }

        if self.in_playback() {
            if let Some(engine) = self.engine.as_ref() {
                self.current_position = engine.current_position();
            }
        }
        // From here on every callback, re-entrant or queued, sees no engine
        let engine = self.engine.take();
        self.generation += 1;
        info!("View {} releasing engine", self.id.0);

        if let Some(control) = self.control.as_mut() {
            control.hide_status_view();
        }
        self.save_progress();
        if let Some(mut engine) = engine {
            engine.release();
        }
        self.close_asset();
        self.set_keep_screen_on(false);
        self.abandon_audio_focus();
        self.screen.reset();
        self.remove_render_surface();

        self.locked = false;
        self.current_position = 0;
        self.paused_by_focus = false;
        self.set_play_state(PlayState::Idle);
    }

    /// Prepare the current source again on the live engine
    pub fn replay(&mut self, reset_position: bool) {
        if self.engine.is_none() {
            warn!("View {}: replay without an engine", self.id.0);
            return;
        }
        if reset_position {
            self.current_position = 0;
        }
        self.add_display();
        self.start_prepare(true);
    }

    pub fn seek_to(&mut self, position_ms: u64) {
        if !self.in_playback() {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.seek_to(position_ms);
        }
    }

    /// Position in milliseconds, refreshed from the engine; 0 outside playback
    pub fn current_position(&mut self) -> u64 {
        if !self.in_playback() {
            return 0;
        }
        if let Some(engine) = self.engine.as_ref() {
            self.current_position = engine.current_position();
        }
        self.current_position
    }

    pub fn duration(&self) -> u64 {
        match self.engine.as_ref() {
            Some(engine) if self.in_playback() => engine.duration(),
            _ => 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        match self.engine.as_ref() {
            Some(engine) if self.in_playback() => engine.is_playing(),
            _ => false,
        }
    }

    pub fn buffered_percentage(&self) -> u32 {
        self.engine.as_ref().map_or(0, |engine| engine.buffered_percentage())
    }

    pub fn tcp_speed(&self) -> u64 {
        self.engine.as_ref().map_or(0, |engine| engine.tcp_speed())
    }

    pub fn set_speed(&mut self, speed: f32) {
        if !self.in_playback() {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.set_speed(speed);
        }
    }

    pub fn set_mute(&mut self, muted: bool) {
        self.muted = muted;
        let volume = if muted { 0.0 } else { 1.0 };
        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(volume, volume);
        }
    }

    pub fn is_mute(&self) -> bool {
        self.muted
    }

    /// Set left/right volume (0.0 to 1.0) on the live engine
    pub fn set_volume(&mut self, left: f32, right: f32) {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(left, right);
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.config.looping = looping;
        if let Some(engine) = self.engine.as_mut() {
            engine.set_looping(looping);
        }
    }

    /// Seed the position playback starts from
    pub fn skip_position_when_play(&mut self, position_ms: u64) {
        self.current_position = position_ms;
    }

    /// Persist the current progress, e.g. before the host may be reclaimed
    pub fn save_instance_state(&mut self) {
        if self.in_playback() {
            if let Some(engine) = self.engine.as_ref() {
                self.current_position = engine.current_position();
            }
        }
        self.save_progress();
    }

    // ----- screen modes -----

    pub fn set_lock(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn enter_fullscreen(&mut self) {
        if self.screen.enter_fullscreen() {
            self.announce_screen_mode(ScreenMode::Fullscreen);
        }
    }

    pub fn exit_fullscreen(&mut self) {
        if self.screen.exit_fullscreen() {
            self.announce_screen_mode(ScreenMode::Normal);
        }
    }

    pub fn enter_tiny_screen(&mut self) {
        if self.screen.enter_tiny() {
            self.announce_screen_mode(ScreenMode::Tiny);
        }
    }

    pub fn exit_tiny_screen(&mut self) {
        if self.screen.exit_tiny() {
            self.announce_screen_mode(ScreenMode::Normal);
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.screen.is_fullscreen()
    }

    pub fn is_tiny_screen(&self) -> bool {
        self.screen.is_tiny()
    }

    /// Tiny window size; a zero side is derived from the host width
    pub fn set_tiny_screen_size(&mut self, width: u32, height: u32) {
        self.config.tiny_screen_width = width;
        self.config.tiny_screen_height = height;
        self.screen.set_tiny_size(width, height);
    }

    pub fn set_screen_scale_mode(&mut self, mode: ScreenScaleMode) {
        self.config.screen_scale = mode;
        if let Some(surface) = self.render_surface.as_mut() {
            surface.set_scale_mode(mode);
        }
    }

    pub fn set_mirror_rotation(&mut self, mirrored: bool) {
        if let Some(surface) = self.render_surface.as_mut() {
            surface.set_mirrored(mirrored);
        }
    }

    pub fn set_video_rotation(&mut self, degrees: i32) {
        if let Some(surface) = self.render_surface.as_mut() {
            surface.set_video_rotation(degrees);
        }
    }

    /// Last reported video size (width, height)
    pub fn video_size(&self) -> (u32, u32) {
        self.video_size
    }

    pub fn current_play_state(&self) -> PlayState {
        self.state.state()
    }

    pub fn current_screen_mode(&self) -> ScreenMode {
        self.screen.mode()
    }

    pub fn host(&self) -> &dyn SurfaceHost {
        self.screen.host()
    }

    // ----- preferences and collaborators -----

    pub fn set_enable_orientation(&mut self, enabled: bool) {
        self.config.enable_orientation = enabled;
        self.screen.set_follow_orientation(enabled);
    }

    pub fn set_enable_audio_focus(&mut self, enabled: bool) {
        self.config.enable_audio_focus = enabled;
    }

    pub fn set_enable_media_codec(&mut self, enabled: bool) {
        self.config.enable_media_codec = enabled;
    }

    pub fn set_using_surface_view(&mut self, enabled: bool) {
        self.config.using_surface_view = enabled;
    }

    pub fn set_enable_parallel_play(&mut self, enabled: bool) {
        self.config.enable_parallel_play = enabled;
    }

    pub fn set_player_factory(&mut self, factory: Box<dyn PlayerFactory>) {
        self.factory = factory;
    }

    pub fn set_progress_store(&mut self, store: Option<Box<dyn ProgressStore>>) {
        self.progress = store;
    }

    pub fn set_control_surface(&mut self, control: Option<Box<dyn ControlSurface>>) {
        self.control = control;
    }

    pub fn set_orientation_sensor(&mut self, sensor: Option<Box<dyn OrientationSensor>>) {
        self.screen.set_sensor(sensor);
    }

    /// Let the control surface consume a back press
    pub fn on_back_pressed(&mut self) -> bool {
        self.control
            .as_mut()
            .map_or(false, |control| control.on_back_pressed())
    }

    // ----- listeners -----

    pub fn add_listener(&mut self, listener: Arc<dyn StateChangeListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&mut self, listener: &Arc<dyn StateChangeListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn set_listener(&mut self, listener: Arc<dyn StateChangeListener>) {
        self.listeners.set(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    // ----- event queue -----

    /// Drain the event queue in FIFO order, then fire due timers
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        self.poll_timers(Instant::now());
        handled
    }

    /// Fire timers due at `now`
    pub fn poll_timers(&mut self, now: Instant) {
        self.screen.poll_timers(now);
    }

    /// Handle one queued event
    pub fn dispatch(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Engine { generation, event } => {
                if generation != self.generation || self.engine.is_none() {
                    trace!("View {}: stale engine event {:?} (generation {})", self.id.0, event, generation);
                    return;
                }
                self.on_engine_event(event);
            }
            ViewEvent::Orientation(angle) => self.on_orientation_changed(angle),
            ViewEvent::WindowFocus(has_focus) => self.on_window_focus_changed(has_focus),
            ViewEvent::WindowVisibility(visible) => self.on_window_visibility_changed(visible),
            ViewEvent::AudioFocus(change) => self.on_audio_focus_changed(change),
        }
    }

    /// Engine callback for the live engine
    pub fn on_engine_event(&mut self, event: EngineEvent) {
        if self.engine.is_none() {
            debug!("View {}: engine event {:?} without an engine", self.id.0, event);
            return;
        }
        if let EngineEvent::Error { what, extra } = event {
            let err = VideoViewError::Engine(format!("what={} extra={}", what, extra));
            error!("View {}: {}", self.id.0, err);
        }

        let transition = self.state.on_engine_event(&event);
        if let Some(state) = transition.state {
            self.announce_play_state(state);
        }
        for effect in transition.effects {
            self.apply_effect(effect);
        }
    }

    /// Raw orientation sample in degrees
    pub fn on_orientation_changed(&mut self, angle: i32) {
        if !self.screen.accepts_orientation_samples() {
            return;
        }
        let context = self.screen.orientation_context(self.locked);
        if let Some(decision) = self.orientation.on_sample(angle, context) {
            debug!("View {}: orientation decision {:?}", self.id.0, decision);
            if let Some(mode) = self.screen.apply_orientation(decision) {
                self.announce_screen_mode(mode);
            }
        }
    }

    pub fn on_window_focus_changed(&mut self, has_focus: bool) {
        let in_playback = self.in_playback();
        self.screen
            .on_window_focus_changed(has_focus, in_playback, Instant::now());
    }

    pub fn on_window_visibility_changed(&mut self, visible: bool) {
        if !visible && self.is_playing() {
            debug!("View {} hidden while playing", self.id.0);
            self.pause();
        }
    }

    pub fn on_audio_focus_changed(&mut self, change: AudioFocusChange) {
        debug!("View {}: audio focus {:?}", self.id.0, change);
        match change {
            AudioFocusChange::Gained => {
                if !self.muted {
                    self.set_volume(1.0, 1.0);
                }
                if self.paused_by_focus {
                    self.paused_by_focus = false;
                    self.resume();
                }
            }
            AudioFocusChange::Lost | AudioFocusChange::LostTransient => {
                if self.is_playing() {
                    self.paused_by_focus = true;
                    self.pause();
                }
            }
            AudioFocusChange::Ducked => {
                if self.is_playing() && !self.muted {
                    self.set_volume(DUCKED_VOLUME, DUCKED_VOLUME);
                }
            }
        }
    }

    // ----- internals -----

    fn in_playback(&self) -> bool {
        self.state.is_in_playback_state(self.engine.is_some())
    }

    fn in_idle(&self) -> bool {
        self.state.is_in_idle_state(self.engine.is_some())
    }

    /// First play from idle; returns whether preparation was started
    fn start_play(&mut self) -> bool {
        if !self.source.as_ref().is_some_and(Source::is_bindable) {
            warn!("View {}: start without a playable source", self.id.0);
            return false;
        }

        if !self.config.enable_parallel_play {
            self.registry.release_all_except(self.id);
        }
        let handle: Weak<Mutex<dyn Releasable>> = self.self_ref.clone();
        self.registry.register(self.id, handle);

        if self.network_blocks_playback() {
            info!("View {}: cellular playback not allowed", self.id.0);
            if let Some(control) = self.control.as_mut() {
                control.show_status_view();
            }
            return false;
        }

        self.request_audio_focus();

        if let (Some(store), Some(source)) = (self.progress.as_ref(), self.source.as_ref()) {
            let saved = store.get(source.key());
            if saved > 0 {
                debug!("View {}: resuming {} at {} ms", self.id.0, source.key(), saved);
                self.current_position = saved;
            }
        }

        if self.screen.follow_orientation() {
            self.screen.enable_tracking();
        }

        info!("View {}: first play of {:?}", self.id.0, self.source);
        self.init_player();
        self.start_prepare(false);
        true
    }

    /// Network sources over cellular need the registry's permission
    fn network_blocks_playback(&self) -> bool {
        let Some(source) = self.source.as_ref() else {
            return false;
        };
        if source.is_local() || self.control.is_none() {
            return false;
        }
        let Some(policy) = self.network.as_ref() else {
            return false;
        };
        policy.connection() == ConnectionKind::Cellular && !self.registry.play_on_mobile_network()
    }

    fn init_player(&mut self) {
        self.generation += 1;
        let sink = EngineEventSink::new(self.generation, self.events_tx.clone());
        let mut engine = self.factory.create_player(sink);

        for (key, value) in &self.config.init_options {
            engine.set_option(key, value);
        }
        engine.init();
        engine.set_media_codec_enabled(self.config.enable_media_codec);
        engine.set_looping(self.config.looping);
        if self.muted {
            engine.set_volume(0.0, 0.0);
        }
        self.engine = Some(engine);
        self.add_display();
    }

    /// Replace the render surface and bind it to the engine
    fn add_display(&mut self) {
        self.remove_render_surface();

        let kind = if self.config.using_surface_view {
            SurfaceKind::Surface
        } else {
            SurfaceKind::Texture
        };
        let view = self.screen.view();
        let mut surface = self.screen.host_mut().create_render_surface(view, kind);
        surface.set_scale_mode(self.config.screen_scale);
        if let Some(engine) = self.engine.as_mut() {
            engine.set_surface(surface.id());
        }
        self.render_surface = Some(surface);
    }

    fn remove_render_surface(&mut self) {
        if let Some(mut surface) = self.render_surface.take() {
            let view = self.screen.view();
            self.screen.host_mut().remove_render_surface(view, surface.id());
            surface.release();
        }
    }

    fn start_prepare(&mut self, reset: bool) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if reset {
            engine.reset();
        }

        let bound = match self.source.as_mut() {
            Some(Source::Asset(stream)) => {
                engine.set_data_source(DataSource::Asset(&mut **stream));
                true
            }
            Some(Source::Locator { url, headers }) if !url.is_empty() => {
                engine.set_data_source(DataSource::Url {
                    url: url.as_str(),
                    headers: &*headers,
                });
                true
            }
            _ => false,
        };
        if !bound {
            warn!("View {}: nothing to prepare", self.id.0);
            return;
        }

        engine.prepare_async();
        self.set_play_state(PlayState::Preparing);
        self.announce_screen_mode(self.screen.mode());
    }

    fn start_in_playback_state(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.start();
        }
        self.set_play_state(PlayState::Playing);
    }

    fn save_progress(&mut self) {
        if self.current_position == 0 {
            return;
        }
        if let (Some(store), Some(source)) = (self.progress.as_mut(), self.source.as_ref()) {
            debug!("View {}: saving progress {} ms", self.id.0, self.current_position);
            store.save(source.key(), self.current_position);
        }
    }

    /// Close the bound byte stream and any retired ones; none can be bound again afterwards
    fn close_asset(&mut self) {
        let mut streams = std::mem::take(&mut self.retired_assets);
        if matches!(self.source, Some(Source::Asset(_))) {
            if let Some(Source::Asset(stream)) = self.source.take() {
                streams.push(stream);
            }
        }
        for mut stream in streams {
            if let Err(e) = stream.close().cleanup_err("Failed to close asset stream") {
                warn!("View {}: {}", self.id.0, e);
            }
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ClearKeepAwake => self.set_keep_screen_on(false),
            Effect::ResetPosition => self.current_position = 0,
            Effect::PersistZeroProgress => {
                if let (Some(store), Some(source)) = (self.progress.as_mut(), self.source.as_ref()) {
                    store.save(source.key(), 0);
                }
            }
            Effect::PauseIfHidden => {
                if !self.screen.host().is_visible() {
                    self.pause();
                }
            }
            Effect::SeekToCachedPosition => {
                if self.current_position > 0 {
                    self.seek_to(self.current_position);
                }
            }
            Effect::RotateVideo(degrees) => self.set_video_rotation(degrees),
            Effect::ResizeVideo { width, height } => {
                self.video_size = (width, height);
                let scale = self.config.screen_scale;
                if let Some(surface) = self.render_surface.as_mut() {
                    surface.set_scale_mode(scale);
                    surface.set_video_size(width, height);
                }
            }
        }
    }

    fn set_play_state(&mut self, state: PlayState) {
        self.state.set(state);
        self.announce_play_state(state);
    }

    /// Control surface first, then listeners in registration order
    fn announce_play_state(&mut self, state: PlayState) {
        if let Some(control) = self.control.as_mut() {
            control.on_play_state_changed(state);
        }
        self.listeners.notify_play_state(state);
    }

    fn announce_screen_mode(&mut self, mode: ScreenMode) {
        if let Some(control) = self.control.as_mut() {
            control.on_player_mode_changed(mode);
        }
        self.listeners.notify_player_mode(mode);
    }

    fn set_keep_screen_on(&mut self, keep_on: bool) {
        self.screen.host_mut().set_keep_screen_on(keep_on);
    }

    fn request_audio_focus(&mut self) {
        if !self.config.enable_audio_focus {
            return;
        }
        if let Some(arbiter) = self.audio_focus.as_mut() {
            arbiter.request();
        }
    }

    fn abandon_audio_focus(&mut self) {
        if !self.config.enable_audio_focus {
            return;
        }
        if let Some(arbiter) = self.audio_focus.as_mut() {
            arbiter.abandon();
        }
    }
}

impl Releasable for VideoView {
    fn release(&mut self) {
        VideoView::release(self);
    }
}

impl Drop for VideoView {
    fn drop(&mut self) {
        self.release();
    }
}
