use log::trace;
use wgpu::util::DeviceExt;
use zerocopy::AsBytes;

use crate::assets;
use crate::buffer_util::{self, SizedBuffer};
use crate::framework;
use crate::geometry;
use crate::params::ParticleSystemParams;
use crate::particles::{ParticleRecord, ParticleSettings, INSTANCE_OFFSET, PARTICLE_STRIDE};

// This needs to match the workgroup size the build script splices into the
// particle compute shader.
pub const PARTICLES_PER_GROUP: u32 = 64;

// Whole groups only; params::validate has already rejected remainders.
pub fn work_group_count(particle_count: u32) -> u32 {
    particle_count / PARTICLES_PER_GROUP
}

/// GPU-resident particle state: the read-write storage buffer the compute
/// shader advances every frame, and the vertex-usage instance buffer the
/// renderer consumes. The instance buffer is only ever written by
/// `copy_to_instances`.
pub struct ParticleSystem {
    pub particle_count: u32,
    work_groups: u32,
    pub particle_buffer: SizedBuffer,
    pub instance_buffer: SizedBuffer,
    pub settings_buffer: wgpu::Buffer,
    compute_bind_group: wgpu::BindGroup,
    compute_pipeline: wgpu::ComputePipeline,
}

impl ParticleSystem {
    pub fn new(
        device: &wgpu::Device,
        params: &ParticleSystemParams,
        initial_particles: &[ParticleRecord],
    ) -> anyhow::Result<Self> {
        let particle_count = params.particle_count;
        debug_assert_eq!(initial_particles.len(), particle_count as usize);

        let particle_buffer = buffer_util::make_particle_buffer(device, initial_particles);
        let instance_buffer = buffer_util::make_instance_buffer(device, particle_count);

        // Uploaded once; the settings never change after load.
        let settings = ParticleSettings {
            particle_count,
            lifetime: params.lifetime,
            padding: 0.0,
        };
        let settings_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle_settings"),
            contents: settings.as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let compute_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("particle_compute_layout"),
                entries: &[
                    // Particle storage buffer
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // Uniform inputs
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particle_compute_bindings"),
            layout: &compute_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: particle_buffer.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: settings_buffer.as_entire_binding(),
                },
            ],
        });

        let compute_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("particle_compute_pipeline_layout"),
                bind_group_layouts: &[&compute_bind_group_layout],
                push_constant_ranges: &[],
            });

        let cs_module = assets::shader_module(device, "particles.comp.wgsl")?;
        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("particle_compute_pipeline"),
            layout: Some(&compute_pipeline_layout),
            module: &cs_module,
            entry_point: "main",
        });

        Ok(ParticleSystem {
            particle_count,
            work_groups: work_group_count(particle_count),
            particle_buffer,
            instance_buffer,
            settings_buffer,
            compute_bind_group,
            compute_pipeline,
        })
    }

    /// Advance the particle state one step on the device.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("particle_update"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.compute_pipeline);
        cpass.set_bind_group(0, &self.compute_bind_group, &[]);
        trace!("Dispatching {} work groups", self.work_groups);
        cpass.dispatch_workgroups(self.work_groups, 1, 1);
    }

    /// Mirror the freshly computed particle state into the instance buffer.
    /// Must land between the dispatch and the draw of the same frame; the
    /// queue executes encoder commands in submission order, which is the only
    /// ordering guarantee this relies on.
    pub fn copy_to_instances(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_buffer_to_buffer(
            &self.particle_buffer.buffer,
            0,
            &self.instance_buffer.buffer,
            0,
            self.particle_buffer.size,
        );
    }
}

// Instance stream layout: position then velocity, age skipped by the 4-byte
// buffer offset at bind time.
pub const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32x3];

fn instance_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: PARTICLE_STRIDE,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRIBUTES,
    }
}

/// Draws the instanced triangles from the instance buffer and the fixed
/// 3-vertex base shape.
pub struct ParticleRenderer {
    vertex_buffer: wgpu::Buffer,
    render_pipeline: wgpu::RenderPipeline,
    viewport: (u32, u32),
}

impl ParticleRenderer {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> anyhow::Result<Self> {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle_base_triangle"),
            contents: geometry::TRIANGLE.as_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let draw_module = assets::shader_module(device, "particles.draw.wgsl")?;

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("particle_render_pipeline_layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle_render_pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &draw_module,
                entry_point: "vs_main",
                buffers: &[geometry::vertex_buffer_layout(), instance_buffer_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &draw_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: framework::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        Ok(ParticleRenderer {
            vertex_buffer,
            render_pipeline,
            // Captured once here; stays stale until resize() is called.
            viewport: (config.width, config.height),
        })
    }

    pub fn resize(&mut self, config: &wgpu::SurfaceConfiguration) {
        self.viewport = (config.width, config.height);
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        targets: &framework::RenderTargets,
        system: &ParticleSystem,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("particle_draw"),
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
        let (width, height) = self.viewport;
        rpass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
        rpass.set_pipeline(&self.render_pipeline);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_vertex_buffer(1, system.instance_buffer.buffer.slice(INSTANCE_OFFSET..));
        rpass.draw(0..geometry::TRIANGLE.len() as u32, 0..system.particle_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer_util::particle_buffer_size;

    #[test]
    fn one_group_per_sixty_four_particles() {
        assert_eq!(work_group_count(64), 1);
        assert_eq!(work_group_count(1024), 16);
        assert_eq!(work_group_count(4096), 64);
        for count in (1..64).map(|n| n * 64) {
            assert_eq!(work_group_count(count) * PARTICLES_PER_GROUP, count);
        }
    }

    #[test]
    fn instance_stream_layout() {
        let layout = instance_buffer_layout();
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
    }

    #[test]
    fn buffer_pair_sizes_agree() {
        // Both sides of the transfer step are derived from the same formula,
        // so a whole-buffer copy can never be partial.
        assert_eq!(particle_buffer_size(1024), 1024 * 28);
    }
}
