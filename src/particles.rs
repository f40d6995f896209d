use cgmath::{InnerSpace, Vector3};
use rand::Rng;

use crate::params::ParticleSystemParams;

// This should match the struct defined in the particle compute shader and the
// instance-input layout in the draw shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, zerocopy::FromZeroes, zerocopy::FromBytes, zerocopy::AsBytes)]
pub struct ParticleRecord {
    pub age: u32,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
}

// This should match the struct defined in the particle compute shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, zerocopy::FromZeroes, zerocopy::FromBytes, zerocopy::AsBytes)]
pub struct ParticleSettings {
    pub particle_count: u32,
    pub lifetime: u32,
    pub padding: f64,
}

pub const PARTICLE_STRIDE: wgpu::BufferAddress = std::mem::size_of::<ParticleRecord>() as _;

// The instance stream starts past the leading `age` field, so the first
// vertex attribute lands on `position`.
pub const INSTANCE_OFFSET: wgpu::BufferAddress = std::mem::size_of::<u32>() as _;

const _: () = assert!(
    std::mem::size_of::<ParticleRecord>() == 28,
    "size of ParticleRecord does not match WGSL"
);
const _: () = assert!(
    std::mem::size_of::<ParticleSettings>() == 16,
    "size of ParticleSettings does not match WGSL"
);

fn random_unit_vector<R: Rng>(rng: &mut R) -> Vector3<f32> {
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
        );
        let len2 = v.magnitude2();
        if len2 > 1e-6 && len2 <= 1.0 {
            return v.normalize();
        }
    }
}

/// Seed the initial particle state: everything at the origin with a random
/// direction at a fixed speed. This is the only host-side write the particle
/// data ever sees; after upload the compute shader owns it.
pub fn seed_particles(params: &ParticleSystemParams) -> Vec<ParticleRecord> {
    let mut rng = rand::thread_rng();
    (0..params.particle_count)
        .map(|_| {
            let velocity = random_unit_vector(&mut rng) * params.emission_speed;
            ParticleRecord {
                age: 0,
                position: [0.0; 3],
                velocity: velocity.into(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_offset_skips_the_age_field() {
        assert_eq!(INSTANCE_OFFSET, 4);
        assert_eq!(PARTICLE_STRIDE, 28);
    }

    #[test]
    fn seeded_velocities_have_fixed_speed() {
        let params = ParticleSystemParams::default();
        let particles = seed_particles(&params);
        assert_eq!(particles.len(), params.particle_count as usize);
        for p in &particles {
            assert_eq!(p.age, 0);
            assert_eq!(p.position, [0.0; 3]);
            let speed = Vector3::from(p.velocity).magnitude();
            assert!(
                (speed - params.emission_speed).abs() < 1e-5,
                "speed {} != {}",
                speed,
                params.emission_speed
            );
        }
    }

    #[test]
    fn unit_vectors_are_unit_length() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.magnitude() - 1.0).abs() < 1e-5);
        }
    }
}
