use log::info;

use motes::framework::{self, Demo, RenderTargets};
use motes::params::DemoParams;
use motes::particle_system::{ParticleRenderer, ParticleSystem};
use motes::particles;

/// The full demo: a compute pass advances the particles, a buffer copy
/// mirrors them into the instance buffer, and an instanced draw renders one
/// triangle per particle.
struct ComputeParticles {
    system: ParticleSystem,
    renderer: ParticleRenderer,
}

impl Demo for ComputeParticles {
    fn init(
        config: &wgpu::SurfaceConfiguration,
        params: &DemoParams,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
    ) -> anyhow::Result<Self> {
        let seed = particles::seed_particles(&params.particle_system_params);
        let system = ParticleSystem::new(device, &params.particle_system_params, &seed)?;
        let renderer = ParticleRenderer::new(device, config)?;
        info!("Simulating {} particles", system.particle_count);
        Ok(ComputeParticles { system, renderer })
    }

    fn resize(
        &mut self,
        config: &wgpu::SurfaceConfiguration,
        _device: &wgpu::Device,
        _queue: &wgpu::Queue,
    ) {
        self.renderer.resize(config);
    }

    fn render(&mut self, targets: &RenderTargets, device: &wgpu::Device, queue: &wgpu::Queue) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("particle_frame"),
        });
        // Dispatch, copy, draw. The copy has to land between the other two so
        // the draw never sees a stale instance buffer.
        self.system.dispatch(&mut encoder);
        self.system.copy_to_instances(&mut encoder);
        self.renderer.render(&mut encoder, targets, &self.system);
        queue.submit(Some(encoder.finish()));
    }
}

fn main() -> anyhow::Result<()> {
    framework::run::<ComputeParticles>("Compute Particles")
}
