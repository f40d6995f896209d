pub mod assets;
pub mod buffer_util;
pub mod framework;
pub mod geometry;
pub mod params;
pub mod particle_system;
pub mod particles;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal() {
        let _test_bytes = assets::read("particles.comp.wgsl").unwrap();
    }
}
