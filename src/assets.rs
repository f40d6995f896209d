use std::borrow::Cow;

use anyhow::{anyhow, Context};

// Shaders are templated into $OUT_DIR by the build script and embedded here.
#[derive(rust_embed::RustEmbed)]
#[folder = "$OUT_DIR/shaders"]
pub struct Shaders;

/// Read an embedded blob by name. Missing assets are a startup-fatal error.
pub fn read(name: &str) -> anyhow::Result<Cow<'static, [u8]>> {
    let file = Shaders::get(name).ok_or_else(|| anyhow!("No embedded asset named {:?}", name))?;
    Ok(file.data)
}

/// Asynchronous variant of `read`. Embedded assets resolve without
/// suspending, but the signature matches loaders that hit real storage.
pub async fn read_async(name: &str) -> anyhow::Result<Cow<'static, [u8]>> {
    read(name)
}

/// Build a shader module from an embedded WGSL asset.
pub fn shader_module(device: &wgpu::Device, name: &str) -> anyhow::Result<wgpu::ShaderModule> {
    let bytes = read(name)?;
    module_from_bytes(device, name, &bytes)
}

pub fn module_from_bytes(
    device: &wgpu::Device,
    name: &str,
    bytes: &[u8],
) -> anyhow::Result<wgpu::ShaderModule> {
    let source = std::str::from_utf8(bytes)
        .with_context(|| format!("Shader {:?} is not valid UTF-8", name))?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_string())),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal() {
        for entry in Shaders::iter() {
            println!("Found shader: {:?}", entry);
        }
        let _test_bytes = read("particles.comp.wgsl").unwrap();
        let _test_bytes = read("particles.draw.wgsl").unwrap();
        let _test_bytes = read("triangle.draw.wgsl").unwrap();
    }

    #[test]
    fn missing_asset_is_an_error() {
        assert!(read("no_such.wgsl").is_err());
    }

    #[test]
    fn async_read_delivers_the_same_bytes() {
        let sync_bytes = read("particles.comp.wgsl").unwrap();
        let async_bytes = futures::executor::block_on(read_async("particles.comp.wgsl")).unwrap();
        assert_eq!(sync_bytes, async_bytes);
    }
}
