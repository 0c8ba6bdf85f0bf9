//! Command-line argument definitions for the org chart viewer.

use clap::Parser;
use std::path::PathBuf;

/// Interactive force-directed org chart viewer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the org chart JSON document
    #[arg(help = "Path to the input document")]
    pub input: PathBuf,

    /// Layout settings file (JSON); defaults to the user config directory
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace); RUST_LOG wins when set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Diagram width, overriding the settings file
    #[arg(long)]
    pub width: Option<f32>,

    /// Diagram height, overriding the settings file
    #[arg(long)]
    pub height: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["orgchart-native", "org.json"]);
        assert_eq!(args.input, PathBuf::from("org.json"));
        assert_eq!(args.log_level, "info");
        assert!(args.settings.is_none());
        assert!(args.width.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "orgchart-native",
            "org.json",
            "--settings",
            "layout.json",
            "--width",
            "1600",
            "--height",
            "900",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.settings, Some(PathBuf::from("layout.json")));
        assert_eq!(args.width, Some(1600.0));
        assert_eq!(args.height, Some(900.0));
        assert_eq!(args.log_level, "debug");
    }
}
