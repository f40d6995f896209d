use anyhow::ensure;
use serde::{Deserialize, Serialize};

use crate::particle_system::PARTICLES_PER_GROUP;

// Parameters that define a demo run. These don't change at runtime.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct DemoParams {
    pub window_width: u32,
    pub window_height: u32,

    // When false the surface presents immediately with no pacing at all and
    // the frame loop pins a core. Vsync is the only frame limiter either way.
    pub vsync: bool,

    #[serde(default)]
    pub particle_system_params: ParticleSystemParams,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct ParticleSystemParams {
    pub particle_count: u32,
    // Frames a particle lives before it respawns at the origin.
    pub lifetime: u32,
    pub emission_speed: f32,
}

impl Default for ParticleSystemParams {
    fn default() -> Self {
        ParticleSystemParams {
            particle_count: 1024,
            lifetime: 120,
            emission_speed: 0.05,
        }
    }
}

impl Default for DemoParams {
    fn default() -> Self {
        DemoParams {
            window_width: 1280,
            window_height: 720,
            vsync: true,
            particle_system_params: ParticleSystemParams::default(),
        }
    }
}

impl DemoParams {
    // The dispatch math divides particles into whole workgroups and never
    // handles a remainder, so reject counts that would leave one.
    pub fn validate(&self) -> anyhow::Result<()> {
        let count = self.particle_system_params.particle_count;
        ensure!(count > 0, "particle_count must be positive, got {}", count);
        ensure!(
            count % PARTICLES_PER_GROUP == 0,
            "particle_count must be a multiple of {}, got {}",
            PARTICLES_PER_GROUP,
            count
        );
        Ok(())
    }
}

impl std::str::FromStr for DemoParams {
    type Err = toml::de::Error;
    fn from_str(serialized: &str) -> Result<Self, Self::Err> {
        let params = toml::from_str(serialized)?;
        Ok(params)
    }
}

/// Read params from a TOML file, falling back to defaults when the file is
/// missing or malformed.
pub fn from_file_or_default(path: &str) -> DemoParams {
    match std::fs::read_to_string(path) {
        Ok(serialized) => match serialized.parse() {
            Ok(params) => params,
            Err(e) => {
                log::error!("Failed to parse config file ({}): {:?}", path, e);
                DemoParams::default()
            }
        },
        Err(e) => {
            log::error!("Failed to read config file ({}): {:?}", path, e);
            DemoParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        let params = DemoParams {
            window_width: 640,
            window_height: 480,
            vsync: false,
            particle_system_params: ParticleSystemParams::default(),
        };
        let serialized = toml::to_string(&params).unwrap();
        println!("serialized = {}", serialized);
        let deserialized: DemoParams = toml::from_str(&serialized).unwrap();
        println!("deserialized = {:?}", deserialized);
        assert_eq!(params.window_width, deserialized.window_width);
        assert_eq!(params.window_height, deserialized.window_height);
        assert_eq!(params.vsync, deserialized.vsync);
        assert_eq!(
            params.particle_system_params.particle_count,
            deserialized.particle_system_params.particle_count
        );
    }

    #[test]
    fn defaults_validate() {
        assert!(DemoParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_group_remainders() {
        let mut params = DemoParams::default();
        params.particle_system_params.particle_count = 1000;
        assert!(params.validate().is_err());
        params.particle_system_params.particle_count = 0;
        assert!(params.validate().is_err());
        for count in [64, 1024, 4096] {
            params.particle_system_params.particle_count = count;
            assert!(params.validate().is_ok());
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let params = from_file_or_default("/definitely/not/a/config.toml");
        assert_eq!(params.window_width, DemoParams::default().window_width);
    }
}
