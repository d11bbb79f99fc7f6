//! Pipeline configuration: TOML file plus command line overrides.
//!
//! ```toml
//! preview_limit = 500
//!
//! [standardizer]
//! threshold = 85
//! overrides = { MAG_G = "brightness" }
//!
//! [anomaly]
//! seed = 7
//! contamination = 0.02
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use cosmic_model::PipelineOptions;

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionOverrides {
    pub overrides: Vec<(String, String)>,
    pub threshold: Option<u8>,
    pub seed: Option<u64>,
    pub contamination: Option<f64>,
}

/// Parse TOML pipeline options. Missing keys take their defaults.
pub fn parse_options(text: &str) -> Result<PipelineOptions> {
    toml::from_str(text).context("parse pipeline options")
}

/// Load options from `path`, or defaults when no path is given.
pub fn load_options(path: Option<&Path>) -> Result<PipelineOptions> {
    let Some(path) = path else {
        return Ok(PipelineOptions::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let options = parse_options(&text).with_context(|| format!("in {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded pipeline options");
    Ok(options)
}

/// Apply command line values on top of `options`.
pub fn apply_overrides(mut options: PipelineOptions, cli: &OptionOverrides) -> PipelineOptions {
    for (original, standard) in &cli.overrides {
        options.standardizer = options
            .standardizer
            .with_override(original.clone(), standard.clone());
    }
    if let Some(threshold) = cli.threshold {
        options.standardizer = options.standardizer.with_threshold(threshold);
    }
    if let Some(seed) = cli.seed {
        options.anomaly = options.anomaly.with_seed(seed);
    }
    if let Some(contamination) = cli.contamination {
        options.anomaly = options.anomaly.with_contamination(contamination);
    }
    options
}

/// Parse an `ORIGINAL=STANDARD` rename.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    let Some((original, standard)) = raw.split_once('=') else {
        bail!("expected ORIGINAL=STANDARD, got `{raw}`");
    };
    let (original, standard) = (original.trim(), standard.trim());
    if original.is_empty() || standard.is_empty() {
        bail!("both sides of `{raw}` must be non-empty");
    }
    Ok((original.to_string(), standard.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let options = parse_options(
            "preview_limit = 50\n[anomaly]\nseed = 7\n[standardizer.overrides]\nMAG_G = \"brightness\"\n",
        )
        .unwrap();
        assert_eq!(options.preview_limit, 50);
        assert_eq!(options.anomaly.seed, 7);
        assert_eq!(options.anomaly.contamination, 0.05);
        assert_eq!(options.standardizer.threshold, 80);
        assert_eq!(
            options.standardizer.overrides.get("MAG_G").map(String::as_str),
            Some("brightness")
        );
        assert_eq!(options.imputation.neighbors, 5);
    }

    #[test]
    fn command_line_wins() {
        let options = parse_options("[standardizer]\nthreshold = 90\n").unwrap();
        let cli = OptionOverrides {
            overrides: vec![("ra_err".into(), "error".into())],
            threshold: Some(70),
            seed: Some(1),
            contamination: None,
        };
        let options = apply_overrides(options, &cli);
        assert_eq!(options.standardizer.threshold, 70);
        assert_eq!(options.anomaly.seed, 1);
        assert_eq!(options.anomaly.contamination, 0.05);
        assert_eq!(options.standardizer.overrides.len(), 1);
    }

    #[test]
    fn override_syntax() {
        assert_eq!(
            parse_override(" FLUX_1 = brightness").unwrap(),
            ("FLUX_1".to_string(), "brightness".to_string())
        );
        assert!(parse_override("flux").is_err());
        assert!(parse_override("=brightness").is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(parse_options("preview_limit = \"many\"").is_err());
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_options(Some(Path::new("/nonexistent/cosmic.toml"))).unwrap_err();
        assert!(err.to_string().contains("cosmic.toml"));
    }
}
