// This should match the vertex-input layout in the draw shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, zerocopy::FromZeroes, zerocopy::FromBytes, zerocopy::AsBytes)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

pub const VERTEX_STRIDE: wgpu::BufferAddress = std::mem::size_of::<Vertex>() as _;

const _: () = assert!(
    std::mem::size_of::<Vertex>() == 28,
    "size of Vertex does not match WGSL"
);

// The one base shape every particle instances: a small triangle.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.02, 0.0],
        color: [1.0, 0.85, 0.35, 1.0],
    },
    Vertex {
        position: [-0.01, -0.02, 0.0],
        color: [0.95, 0.4, 0.1, 1.0],
    },
    Vertex {
        position: [0.01, -0.02, 0.0],
        color: [0.95, 0.4, 0.1, 1.0],
    },
];

pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_is_three_vertices() {
        assert_eq!(TRIANGLE.len(), 3);
        assert_eq!(VERTEX_STRIDE, 28);
    }
}
