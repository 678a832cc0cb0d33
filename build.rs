use std::{
    fs,
    io::{self, Write},
    process::Command,
};

const SHADERS: [(&str, &str); 2] = [
    ("shaders/shader.vert", "target/shaders/vert.spv"),
    ("shaders/shader.frag", "target/shaders/frag.spv"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=shaders/");

    fs::create_dir_all("target/shaders")?;

    for (source, output) in SHADERS {
        // shaders are loaded at runtime, so a missing compiler only fails at startup
        let result = match Command::new("glslc").arg(source).arg("-o").arg(output).output() {
            Ok(result) => result,
            Err(err) => {
                println!("cargo:warning=could not run glslc for {source}: {err}");
                continue;
            }
        };
        io::stdout().write_all(&result.stdout)?;
        io::stderr().write_all(&result.stderr)?;
        if !result.status.success() {
            println!("cargo:warning=glslc failed to compile {source}");
        }
    }

    Ok(())
}
