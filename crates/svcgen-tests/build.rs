//! Renders `interfaces.yaml` with the built-in templates into `OUT_DIR`.

use std::path::PathBuf;

use svcgen_core::{DescriptorBuilder, Emitter, Generator, InterfaceDocument};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=interfaces.yaml");

    let content = std::fs::read_to_string("interfaces.yaml")?;
    let doc = InterfaceDocument::parse_content(&content)?;
    let generator = Generator::new(
        DescriptorBuilder::new("svcgen_runtime"),
        Emitter::builtin()?,
    );
    let report = generator.generate_document(&doc, |_| true)?;
    if let Some(failed) = report.failed.first() {
        return Err(failed.to_string().into());
    }

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    for file in &report.generated {
        std::fs::write(out_dir.join(&file.file_name), &file.contents)?;
    }
    Ok(())
}
