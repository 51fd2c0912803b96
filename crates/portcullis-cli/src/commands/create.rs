//! Create command - run a manifest through the create hooks

use portcullis_core::{SimpleNameGenerator, before_create};
use std::path::Path;

use crate::config::Config;
use crate::display::{self, OutputFormat};
use crate::error::Result;
use crate::manifest::Manifest;

pub fn run(
    config: &Config,
    file: &Path,
    namespace: Option<&str>,
    output: OutputFormat,
) -> Result<()> {
    let registry = config.registry()?;
    let mut manifest = Manifest::load(file)?;
    let strategy = registry.get(manifest.kind(), None)?;

    display::step(&format!("Creating {} {}", manifest.kind(), manifest.key()));

    let ctx = super::request_context(namespace);
    if let Err(err) = before_create(
        strategy.as_ref(),
        &ctx,
        manifest.object_mut(),
        &SimpleNameGenerator,
    ) {
        if let Some(errors) = err.field_errors() {
            display::print_field_errors(errors);
        }
        return Err(err.into());
    }

    display::success(&format!("{} {} accepted", manifest.kind(), manifest.key()));
    display::print_manifest(&manifest, output)
}
