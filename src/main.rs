//! Luxury Holiday Tree
//!
//! A particle tree that scatters into a cloud and gathers back into a cone,
//! steered by hand gestures or the keyboard.

mod config;
mod hud;
mod scene;

use anyhow::{Context, Result};
use config::AppConfig;
use glam::Vec2;
use hud::{FrameStats, HudInfo, TitleRefresh};
use scene::TreeScene;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tree_control::{
    BackendChoice, GeneratorChoice, GestureBackend, GestureCategory, GreetingGenerator, NoBackend,
    PhraseBook, SimulatedBackend, SimulatedHand, Unconfigured,
};
use tree_renderer::TreeRenderer;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    renderer: TreeRenderer,
    scene: TreeScene,
    stats: FrameStats,
    title: TitleRefresh,
}

impl GpuState {
    async fn new(window: Arc<Window>, app_config: &AppConfig, hand: &SimulatedHand) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = TreeRenderer::new(&device, &config);
        log::info!("✓ Renderer ready ({surface_format:?})");

        let scene = TreeScene::new(
            app_config,
            gesture_backend(app_config.control.backend, hand),
            greeting_generator(app_config.control.generator),
            config.width,
            config.height,
        )?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            scene,
            stats: FrameStats::new(),
            title: TitleRefresh::new(Duration::from_millis(250)),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.renderer.resize(&self.device, &self.config);
            self.scene.resize(new_size.width, new_size.height);
        }
    }

    /// Run one frame and draw it. Returns the HUD title when it needs
    /// refreshing.
    fn render(&mut self) -> Result<Option<&str>, wgpu::SurfaceError> {
        let dt = self.stats.tick();
        let frame = self.scene.frame(dt);

        self.renderer
            .upload(&self.device, &self.queue, self.scene.staging());

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            self.scene.camera(),
            self.scene.time(),
        );
        output.present();

        let controls = self.scene.controls();
        let title = hud::title(&HudInfo {
            state: frame.state,
            greeting: self.scene.greeting().display_text(),
            manual: controls.is_manual(),
            sensor_active: controls.gestures_active(),
            backend: controls.backend_name(),
            readout: self.scene.readout(),
            fps: self.stats.fps(),
        });
        Ok(self.title.update(Instant::now(), title))
    }
}

fn gesture_backend(choice: BackendChoice, hand: &SimulatedHand) -> Box<dyn GestureBackend> {
    match choice {
        BackendChoice::Simulated => Box::new(SimulatedBackend::new(hand.clone())),
        BackendChoice::None => Box::new(NoBackend),
    }
}

fn greeting_generator(choice: GeneratorChoice) -> Arc<dyn GreetingGenerator> {
    match choice {
        GeneratorChoice::PhraseBook => Arc::new(PhraseBook::default()),
        GeneratorChoice::None => Arc::new(Unconfigured),
    }
}

struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    /// Cursor and keys standing in for a webcam hand
    hand: SimulatedHand,
}

impl App {
    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode, state: ElementState) {
        let pressed = state == ElementState::Pressed;

        // Held poses for the simulated hand
        let pose = match key {
            KeyCode::KeyO => Some(GestureCategory::OpenPalm),
            KeyCode::KeyX => Some(GestureCategory::ClosedFist),
            _ => None,
        };
        if let Some(pose) = pose {
            if pressed {
                self.hand.hold(pose);
            } else {
                self.hand.release(pose);
            }
            return;
        }

        if !pressed {
            return;
        }

        match key {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::KeyC => {
                if let Some(gpu_state) = &self.gpu_state {
                    gpu_state.scene.controls().scatter();
                }
            }
            KeyCode::KeyF => {
                if let Some(gpu_state) = &self.gpu_state {
                    gpu_state.scene.controls().form();
                }
            }
            KeyCode::KeyG => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    let manual = gpu_state.scene.controls_mut().toggle_manual_mode();
                    log::info!("{} control", if manual { "Manual" } else { "Gesture" });
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Luxury Holiday Tree")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone(), &self.config, &self.hand)) {
            Ok(gpu_state) => {
                self.window = Some(window);
                self.gpu_state = Some(gpu_state);
            }
            Err(err) => {
                log::error!("Failed to start: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code, state),

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    if size.width > 0 && size.height > 0 {
                        self.hand.set_cursor(Vec2::new(
                            position.x as f32 / size.width as f32,
                            position.y as f32 / size.height as f32,
                        ));
                    }
                }
            }

            WindowEvent::CursorEntered { .. } => self.hand.set_in_view(true),
            WindowEvent::CursorLeft { .. } => self.hand.set_in_view(false),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render() {
                        Ok(Some(title)) => window.set_title(title),
                        Ok(None) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("Render error: {e:?}"),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting luxury holiday tree...");

    let config = AppConfig::load()?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        config,
        window: None,
        gpu_state: None,
        hand: SimulatedHand::new(),
    };

    event_loop.run_app(&mut app)?;
    Ok(())
}
