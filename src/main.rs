mod cli;
mod field;
mod framepace;
mod gpu;
mod gui;
mod surface;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec2;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::field::{FieldConfig, ParticleField};
use crate::framepace::Framepacer;
use crate::gpu::GpuContext;
use crate::gui::EguiIntegration;
use crate::surface::PainterSurface;

/// Minimum interval between field resizes. Resize events arriving faster
/// than this are coalesced and applied once the interval has passed; the
/// swapchain itself always tracks the window immediately.
const RESIZE_INTERVAL: Duration = Duration::from_millis(200);

/// Render pass clear color, roughly the field's background in linear space.
/// The field paints its own background on top in exact sRGB.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0034,
    g: 0.0107,
    b: 0.0296,
    a: 1.0,
};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = cli::Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("field seed: {seed}");

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    // State
    let mut app_state = AppState {
        tokio_rt: tokio::runtime::Runtime::new()?,
        gpu: None,
        gfx: None,
        field: ParticleField::new(FieldConfig {
            seed,
            link_distance: args.link_distance,
            ..Default::default()
        }),
        framepace: Framepacer::new(),

        particle_override: args.particles,
        framerate: args.framerate,

        pending_resize: None,
        last_field_resize: Instant::now(),

        mouse_position: Vec2::ZERO,
        is_paused: false,
        step: false,
    };

    event_loop.run_app(&mut app_state)?;
    Ok(())
}

struct GfxState {
    window: Arc<Window>,
    egui: EguiIntegration,
}

struct AppState<'a> {
    tokio_rt: tokio::runtime::Runtime,
    gpu: Option<GpuContext<'a>>,
    gfx: Option<GfxState>,
    field: ParticleField,
    framepace: Framepacer,

    particle_override: Option<usize>,
    framerate: Option<u32>,

    pending_resize: Option<(u32, u32)>,
    last_field_resize: Instant,

    mouse_position: Vec2,
    is_paused: bool,
    step: bool,
}

impl<'a> ApplicationHandler for AppState<'a> {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let window = match event_loop.create_window(Window::default_attributes().with_title("nebula"))
        {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        let window_size = window.inner_size();

        let gpu = match self.tokio_rt.block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(err) => {
                error!("GPU setup failed: {err:#}");
                event_loop.exit();
                return;
            }
        };

        // The field reads the dimensions resize stored, then spawns.
        self.field.resize(window_size.width, window_size.height);
        let particle_override = self.particle_override;
        self.field.initialize(move |width| {
            particle_override.unwrap_or_else(|| field::default_density(width))
        });
        info!(
            "initialized {} particles over {}x{}",
            self.field.len(),
            self.field.width(),
            self.field.height()
        );

        let mut egui = EguiIntegration::new(&gpu.device, gpu.surface_format());
        egui.resize(window_size.width, window_size.height);

        self.gfx = Some(GfxState { window, egui });
        self.gpu = Some(gpu);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let (Some(gpu), Some(gfx)) = (self.gpu.as_mut(), self.gfx.as_mut()) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                gfx.egui.resize(new_size.width, new_size.height);

                // The field resize is throttled; applied in about_to_wait.
                self.pending_resize = Some((new_size.width, new_size.height));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let mut handled = true;
                match (event.state, event.physical_key) {
                    (ElementState::Pressed, PhysicalKey::Code(KeyCode::Space)) => {
                        self.is_paused = !self.is_paused;
                    }
                    (ElementState::Pressed, PhysicalKey::Code(KeyCode::KeyN)) => {
                        self.step = true;
                    }
                    (ElementState::Pressed, PhysicalKey::Code(KeyCode::F11)) => {
                        if gfx.window.fullscreen().is_none() {
                            gfx.window
                                .set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
                        } else {
                            gfx.window.set_fullscreen(None);
                        }
                    }

                    _ => handled = false,
                };

                if !handled {
                    gfx.egui.key_event(event);
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                gfx.egui.modifiers_event(modifiers);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                gfx.egui.mouse_event(self.mouse_position, state, button);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                gfx.egui.mouse_motion(position);
                self.mouse_position = position;
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        let (Some(gpu), Some(gfx)) = (self.gpu.as_mut(), self.gfx.as_mut()) else {
            return;
        };

        if let Some((width, height)) = self.pending_resize {
            if self.last_field_resize.elapsed() >= RESIZE_INTERVAL {
                self.field.resize(width, height);
                self.pending_resize = None;
                self.last_field_resize = Instant::now();
            }
        }

        self.framepace.begin_frame();

        if !self.is_paused || self.step {
            self.field.tick();
            self.step = false;
        }

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure_surface();
                return;
            }
            Err(err) => {
                error!("failed to acquire frame: {err}");
                return;
            }
        };

        gfx.egui.run(|ctx| {
            // The field owns the whole background layer; the settings
            // window floats above it.
            let painter = ctx.layer_painter(egui::LayerId::background());
            let mut surface = PainterSurface::new(painter, ctx.screen_rect());
            self.field.render(&mut surface);

            egui::Window::new("Field")
                .default_width(145.0)
                .show(ctx, |ui| {
                    ui.checkbox(&mut self.is_paused, "Paused [Space]");
                    ui.label(format!("FPS {:.1}", self.framepace.fps()));
                    ui.label(format!("{} particles", self.field.len()));
                    ui.label(format!(
                        "{}x{} surface",
                        self.field.width(),
                        self.field.height()
                    ));
                });
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        gfx.egui.pre_render(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            self.framepace.frametime(),
        );

        // Render
        {
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            gfx.egui.render(&mut rpass);
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();

        self.framepace.end_frame(self.framerate);
    }
}
