//! Display formatting for CLI output
//!
//! Objects go to stdout so they can be piped; progress and diagnostics go to stderr.

use clap::ValueEnum;
use console::style;
use portcullis_core::ErrorList;

use crate::error::Result;
use crate::manifest::Manifest;

/// Output format for resulting objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
    /// Only `kind namespace/name`
    Name,
}

/// Render `manifest` in `format`
pub fn render(manifest: &Manifest, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => manifest.to_yaml(),
        OutputFormat::Json => manifest.to_json().map(|json| json + "\n"),
        OutputFormat::Name => Ok(format!("{} {}\n", manifest.kind(), manifest.key())),
    }
}

/// Print `manifest` to stdout
pub fn print_manifest(manifest: &Manifest, format: OutputFormat) -> Result<()> {
    print!("{}", render(manifest, format)?);
    Ok(())
}

pub fn step(message: &str) {
    eprintln!("{} {}", style("→").blue(), message);
}

pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// List field errors, one per line
pub fn print_field_errors(errors: &ErrorList) {
    for err in errors {
        eprintln!("  {} {}", style("✗").red(), err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_name() {
        let manifest = Manifest::parse("kind: Route\nmetadata:\n  name: web\n  namespace: shop\n").unwrap();
        assert_eq!(render(&manifest, OutputFormat::Name).unwrap(), "Route shop/web\n");
    }

    #[test]
    fn test_render_json_round_trips_kind() {
        let manifest = Manifest::parse("kind: BuildConfig\nmetadata:\n  name: app\n").unwrap();
        let json = render(&manifest, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "BuildConfig");
        assert_eq!(value["apiVersion"], "build.openshift.io/v1");
    }
}
