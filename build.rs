use std::{env, error::Error, fs};

// Workgroup size baked into the compute shaders. The host-side dispatch math
// in src/particle_system.rs must agree with this value.
const PARTICLES_PER_GROUP: u32 = 64;

// All shaders reside in the 'src/shaders' directory. They are rendered
// through tera so build-time constants can be spliced into the WGSL, then
// embedded from $OUT_DIR by the assets module.
fn generate_shaders() -> std::result::Result<(), Box<dyn Error>> {
    let tera = tera::Tera::new("src/shaders/*")?;
    println!("cargo:rerun-if-changed=src/shaders/");
    let mut context = tera::Context::new();
    context.insert("particles_per_group", &PARTICLES_PER_GROUP);
    let output_path = env::var("OUT_DIR")?;
    fs::create_dir_all(format!("{}/shaders/", output_path))?;
    for file in fs::read_dir("src/shaders")? {
        let file = file?;
        if file.path().extension().unwrap().to_str().unwrap() == "wgsl" {
            let file = file.file_name();
            let file_name = file.to_str().unwrap();
            let result = tera.render(file_name, &context)?;
            fs::write(format!("{}/shaders/{}", output_path, file_name), result)?;
            println!("cargo:rerun-if-changed=src/shaders/{}", file_name);
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = generate_shaders() {
        // panic here for a nicer error message, otherwise it will
        // be flattened to one line for some reason
        panic!("Unable to generate shaders\n{}", err);
    }
}
