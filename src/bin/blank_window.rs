use motes::framework::{self, Demo, RenderTargets};
use motes::params::DemoParams;

/// The first demo tier: an event loop that clears and presents the surface
/// every frame, nothing else.
struct BlankWindow;

impl Demo for BlankWindow {
    fn init(
        _config: &wgpu::SurfaceConfiguration,
        _params: &DemoParams,
        _device: &wgpu::Device,
        _queue: &wgpu::Queue,
    ) -> anyhow::Result<Self> {
        Ok(BlankWindow)
    }

    fn render(&mut self, targets: &RenderTargets, device: &wgpu::Device, queue: &wgpu::Queue) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("blank_frame"),
        });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: targets.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: targets.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        queue.submit(Some(encoder.finish()));
    }
}

fn main() -> anyhow::Result<()> {
    framework::run::<BlankWindow>("Blank Window")
}
