//! Frame driver: one visualizer session stepped once per display refresh.
//!
//! Each step pulls a spectrum snapshot, reduces it to band scalars, maps those
//! to render parameters, advances along the path, mutates the scene, submits
//! the frame and asks the scheduler for the next one.

use crate::audio::{AudioPlayer, BandReducer, BandScalars, SpectrumSource};
use crate::camera::CameraPose;
use crate::error::{ensure_finite, Result, VisualizerError};
use crate::mapping::{ParameterMapper, RenderParams};
use crate::params::{BandConfig, KnotConfig, LightConfig, ParameterMapping, PathConfig};
use crate::path::{PathSample, PathSampler};
use crate::scene::SceneState;

/// Requests the next frame from the host (window redraw, test loop, ...)
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Receives a fully mutated scene and draws it
pub trait SceneSink {
    fn submit(&mut self, frame: &FrameUpdate) -> Result<()>;

    /// Display surface changed size
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Lifecycle of the frame driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Before the first frame
    Idle,
    /// Steady per-frame loop; there is no terminal state
    Running,
}

/// Everything one frame changed, handed to the scene sink
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUpdate {
    /// Frames completed before this one
    pub frame: u64,
    pub bands: BandScalars,
    pub params: RenderParams,
    pub path: PathSample,
    pub camera: CameraPose,
    pub scene: SceneState,
}

/// Session configuration (all tunables besides the analyser and the display)
#[derive(Clone, Debug, Default)]
pub struct VisualizerConfig {
    pub bands: BandConfig,
    pub mapping: ParameterMapping,
    pub path: PathConfig,
    pub knot: KnotConfig,
    pub light: LightConfig,
}

/// A visualizer session: spectrum source, reducer, mapper, path and scene
pub struct Visualizer<S: SpectrumSource> {
    source: S,
    snapshot: Vec<u8>,
    reducer: BandReducer,
    mapper: ParameterMapper,
    sampler: PathSampler,
    scene: SceneState,
    spin_per_frame: f32,
    roll_per_progress: f64,
    state: DriverState,
    frame: u64,
}

impl<S: SpectrumSource> Visualizer<S> {
    /// Create new session; fails on invalid configuration
    pub fn new(source: S, config: VisualizerConfig) -> Result<Self> {
        let snapshot = vec![0; source.bin_count()];
        Ok(Self {
            source,
            snapshot,
            reducer: BandReducer::new(config.bands),
            mapper: ParameterMapper::new(config.mapping)?,
            sampler: PathSampler::new(&config.path)?,
            scene: SceneState::new(&config.light),
            spin_per_frame: config.knot.spin_per_frame,
            roll_per_progress: config.path.roll_per_progress,
            state: DriverState::Idle,
            frame: 0,
        })
    }

    /// Replace the reducer (custom partition layout)
    pub fn with_reducer(mut self, reducer: BandReducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame
    }

    pub fn sampler(&self) -> &PathSampler {
        &self.sampler
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    /// Idle → Running: start playback and schedule the first frame.
    /// Later calls are no-ops.
    pub fn start(
        &mut self,
        player: &mut dyn AudioPlayer,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<()> {
        if self.state == DriverState::Running {
            log::warn!("Frame driver already running");
            return Ok(());
        }

        player.play()?;
        self.state = DriverState::Running;
        log::info!("Frame driver running");
        scheduler.request_frame();
        Ok(())
    }

    /// Run one frame and reschedule
    pub fn step(
        &mut self,
        sink: &mut dyn SceneSink,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<FrameUpdate> {
        if self.state != DriverState::Running {
            return Err(VisualizerError::NotStarted);
        }

        let update = self.update()?;
        sink.submit(&update)?;
        self.frame += 1;
        scheduler.request_frame();
        Ok(update)
    }

    /// Analyse, map and mutate the scene without submitting
    fn update(&mut self) -> Result<FrameUpdate> {
        self.source.fill_spectrum(&mut self.snapshot);
        let bands = self.reducer.reduce(&self.snapshot);
        let params = self.mapper.map(&bands)?;
        let path = self.sampler.advance_and_sample();

        for (field, v) in [
            ("path.camera", path.camera),
            ("path.knot", path.knot),
            ("path.light", path.light),
        ] {
            if !v.is_finite() {
                return Err(VisualizerError::NonFinite {
                    field,
                    value: f32::NAN,
                });
            }
        }

        let knot = &mut self.scene.knot;
        knot.position = path.knot;
        knot.scale = params.knot_scale;
        knot.uniforms = params.uniforms;
        knot.spin(self.spin_per_frame);

        let light = &mut self.scene.light;
        light.position = path.light;
        light.color = params.light_color;

        let roll = ensure_finite(
            "camera.roll",
            (self.sampler.accumulated() * self.roll_per_progress) as f32,
        )?;
        let camera = CameraPose {
            eye: path.camera,
            target: self.scene.knot.position,
            roll,
        };

        log::trace!(
            "frame {} bands {:.3}/{:.3}/{:.3}/{:.3}",
            self.frame,
            bands.bass,
            bands.low,
            bands.mid,
            bands.high
        );

        Ok(FrameUpdate {
            frame: self.frame,
            bands,
            params,
            path,
            camera,
            scene: self.scene,
        })
    }
}
