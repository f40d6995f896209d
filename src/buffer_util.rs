use wgpu::util::DeviceExt;
use zerocopy::AsBytes;

use crate::particles::{ParticleRecord, PARTICLE_STRIDE};

pub struct SizedBuffer {
    pub buffer: wgpu::Buffer,
    pub size: wgpu::BufferAddress,
}

pub fn particle_buffer_size(particle_count: u32) -> wgpu::BufferAddress {
    particle_count as wgpu::BufferAddress * PARTICLE_STRIDE
}

/// The compute-side particle buffer: read-write storage, initialized exactly
/// once from the host-seeded records, copy source for the transfer step.
pub fn make_particle_buffer(device: &wgpu::Device, particles: &[ParticleRecord]) -> SizedBuffer {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("particle_buffer"),
        contents: particles.as_bytes(),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
    });
    SizedBuffer {
        buffer,
        size: particle_buffer_size(particles.len() as u32),
    }
}

/// The render-side instance buffer: same size as the particle buffer, vertex
/// input only, never touched by the host after creation. Its contents arrive
/// exclusively via buffer-to-buffer copy each frame.
pub fn make_instance_buffer(device: &wgpu::Device, particle_count: u32) -> SizedBuffer {
    let size = particle_buffer_size(particle_count);
    SizedBuffer {
        buffer: device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }),
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sizes_match_the_record_stride() {
        assert_eq!(particle_buffer_size(1024), 1024 * 28);
        assert_eq!(particle_buffer_size(64), 64 * 28);
    }
}
