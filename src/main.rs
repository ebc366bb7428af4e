//! tunnelviz - fly through a wireframe tunnel while a torus knot pulses to the music
//!
//! The camera travels a closed spline through four nested tubes, rolling as it
//! goes. A point light and a shader-deformed torus knot ride ahead of it, both
//! driven by the spectrum of the playing track.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use tunnelviz::audio::{AudioPlayer, SpectrumAnalyser, WavPlayer};
use tunnelviz::cli::Args;
use tunnelviz::driver::{FrameScheduler, SceneSink, Visualizer};
use tunnelviz::params::{RenderConfig, TunnelConfig};
use tunnelviz::rendering::Renderer;
use tunnelviz::scene::SceneMeshes;

/// Schedules frames through winit redraw requests
struct WindowScheduler(Arc<Window>);

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,

    // Session
    visualizer: Visualizer<SpectrumAnalyser>,
    player: WavPlayer,

    /// Geometry waiting for upload on the first resume
    meshes: Option<SceneMeshes>,
    render_config: RenderConfig,

    /// Fatal error that ended the event loop
    error: Option<anyhow::Error>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("tunnelviz")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create window")?,
        );

        let meshes = self
            .meshes
            .take()
            .context("scene geometry already uploaded")?;
        let renderer = pollster::block_on(Renderer::new(
            Arc::clone(&window),
            &meshes,
            self.render_config.clone(),
        ))
        .context("failed to initialise renderer")?;

        self.window = Some(Arc::clone(&window));
        self.renderer = Some(renderer);

        let mut scheduler = WindowScheduler(window);
        self.visualizer
            .start(&mut self.player, &mut scheduler)
            .context("failed to start playback")?;

        log::info!("tunnelviz is running, press ESC to quit");
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
                    return;
                };
                let mut scheduler = WindowScheduler(Arc::clone(window));
                if let Err(e) = self.visualizer.step(renderer, &mut scheduler) {
                    self.fail(event_loop, anyhow::Error::new(e).context("frame failed"));
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.visualizer_config();
    let render_config = args.render_config();

    let analyser =
        SpectrumAnalyser::with_new_tap(args.analyser_config()).context("invalid analyser settings")?;
    let mut player = WavPlayer::new(args.playback_config(), analyser.tap().clone());
    player
        .load()
        .with_context(|| format!("failed to load {}", args.audio.display()))?;

    let knot_config = config.knot.clone();
    let visualizer = Visualizer::new(analyser, config).context("invalid visualizer settings")?;

    let meshes = SceneMeshes::build(
        visualizer.sampler().curve(),
        &TunnelConfig::default(),
        &knot_config,
    );
    log::info!(
        "Scene: tunnel {} triangles, knot {} triangles",
        meshes.tunnel.triangle_count(),
        meshes.knot.triangle_count()
    );

    let mut app = App {
        window: None,
        renderer: None,
        visualizer,
        player,
        meshes: Some(meshes),
        render_config,
        error: None,
    };

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.run_app(&mut app)?;

    log::info!("{} frames rendered", app.visualizer.frames_rendered());
    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
