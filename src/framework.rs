use std::sync::Arc;

use anyhow::Context;
use log::{info, trace};
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use crate::params::{self, DemoParams};

gflags::define! {
    --log_filter: &str = "warn,motes=info"
}
gflags::define! {
    --config: &str = "demo_config.toml"
}
gflags::define! {
    -h, --help = false
}

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// The per-frame color and depth views owned by the framework.
pub struct RenderTargets<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

// "Framework" for a windowed executable. Each demo implements load-time setup
// and the per-frame body; the framework owns the window, device, surface and
// depth buffer, and drives the event pump.
pub trait Demo: 'static + Sized {
    fn init(
        config: &wgpu::SurfaceConfiguration,
        params: &DemoParams,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> anyhow::Result<Self>;

    fn resize(
        &mut self,
        _config: &wgpu::SurfaceConfiguration,
        _device: &wgpu::Device,
        _queue: &wgpu::Queue,
    ) {
    }

    fn handle_event(&mut self, _event: &WindowEvent) {}

    fn render(&mut self, targets: &RenderTargets, device: &wgpu::Device, queue: &wgpu::Queue);
}

fn make_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_buffer"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

async fn run_async<D: Demo>(title: &str) -> anyhow::Result<()> {
    gflags::parse();
    if HELP.flag {
        gflags::print_help_and_exit(0);
    }
    scrub_log::init_with_filter_string(LOG_FILTER.flag)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let params = params::from_file_or_default(CONFIG.flag);
    params.validate()?;

    let event_loop = EventLoop::new()?;
    info!("Initializing the window...");
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                params.window_width,
                params.window_height,
            ))
            .build(&event_loop)?,
    );

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let surface = instance.create_surface(window.clone())?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .context("No suitable graphics adapter found")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await
        .context("Failed to create the graphics device")?;

    let size = window.inner_size();
    let mut config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: COLOR_FORMAT,
        width: size.width.max(1),
        height: size.height.max(1),
        // Fifo is vsync: present blocks until the next flip, which is the
        // only frame pacing in this loop. Immediate runs unthrottled.
        present_mode: if params.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::Immediate
        },
        desired_maximum_frame_latency: 2,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
        view_formats: vec![],
    };
    surface.configure(&device, &config);
    let mut depth_view = make_depth_view(&device, &config);

    info!("Initializing the demo...");
    let mut demo = D::init(&config, &params, &device, &queue)?;
    let mut last_frame_start = std::time::Instant::now();

    info!("Entering render loop...");
    event_loop.run(move |event, elwt| {
        // Drain whatever events are pending, then render a frame.
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => {
                    info!("Resizing to {:?}", size);
                    config.width = size.width.max(1);
                    config.height = size.height.max(1);
                    surface.configure(&device, &config);
                    depth_view = make_depth_view(&device, &config);
                    demo.resize(&config, &device, &queue);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(KeyCode::Escape | KeyCode::KeyQ),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                }
                | WindowEvent::CloseRequested => {
                    elwt.exit();
                }
                WindowEvent::RedrawRequested => {
                    let frame = match surface.get_current_texture() {
                        Ok(frame) => frame,
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            surface.configure(&device, &config);
                            return;
                        }
                        // Device removal and the like are fatal by design.
                        Err(e) => panic!("Failed to acquire next surface texture: {:?}", e),
                    };
                    let color_view = frame
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());
                    demo.render(
                        &RenderTargets {
                            color: &color_view,
                            depth: &depth_view,
                        },
                        &device,
                        &queue,
                    );
                    frame.present();
                    trace!("Frame time: {:?}", last_frame_start.elapsed());
                    last_frame_start = std::time::Instant::now();
                }
                other => demo.handle_event(&other),
            },
            Event::AboutToWait => window.request_redraw(),
            _ => (),
        }
    })?;
    Ok(())
}

pub fn run<D: Demo>(title: &str) -> anyhow::Result<()> {
    futures::executor::block_on(run_async::<D>(title))
}
