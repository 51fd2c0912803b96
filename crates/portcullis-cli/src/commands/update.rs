//! Update command - run a manifest through the update hooks against a stored copy

use portcullis_core::before_update;
use std::path::Path;

use crate::config::Config;
use crate::display::{self, OutputFormat};
use crate::error::{CliError, Result};
use crate::manifest::Manifest;

pub fn run(
    config: &Config,
    old: &Path,
    file: &Path,
    status: bool,
    namespace: Option<&str>,
    output: OutputFormat,
) -> Result<()> {
    let registry = config.registry()?;
    let stored = Manifest::load(old)?;
    let mut manifest = Manifest::load(file)?;

    if stored.kind() != manifest.kind() {
        return Err(CliError::usage(format!(
            "cannot update a {} with a {}",
            stored.kind(),
            manifest.kind()
        )));
    }

    let subresource = status.then_some("status");
    let strategy = registry.get(manifest.kind(), subresource)?;

    display::step(&format!(
        "Updating {} {}{}",
        manifest.kind(),
        manifest.key(),
        if status { " (status)" } else { "" }
    ));

    let ctx = super::request_context(namespace);
    if let Err(err) = before_update(strategy.as_ref(), &ctx, manifest.object_mut(), stored.object())
    {
        if let Some(errors) = err.field_errors() {
            display::print_field_errors(errors);
        }
        return Err(err.into());
    }

    if manifest == stored {
        display::warning("no changes");
    } else {
        display::success(&format!("{} {} accepted", manifest.kind(), manifest.key()));
    }
    display::print_manifest(&manifest, output)
}
