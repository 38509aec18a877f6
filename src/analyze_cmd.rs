//! Analyze command: regional means and error summaries of every model.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use drought_metrics::MetricKind;
use drought_regions::RegionAnalysis;

use crate::cli::AnalyzeArgs;
use crate::convert;

/// Whether a mask file belongs to administrative level `level`.
fn is_admin_level(path: &Path, level: u8) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.contains(&format!("_l{level}_")))
}

/// Run the region analysis for one experiment.
pub fn run(args: AnalyzeArgs) -> Result<()> {
    let _cmd = info_span!("analyze").entered();
    let config = args.common.load_config()?;
    let kind = convert::parse_analysis_kind(args.kind.as_deref().unwrap_or(&config.analysis.kind))?;
    let metric_maps = config
        .analysis
        .metric_maps
        .iter()
        .map(|n| n.parse::<MetricKind>().map_err(anyhow::Error::from))
        .collect::<Result<Vec<_>>>()?;

    let mut analysis = RegionAnalysis::new(&config.io.data_dir, &config.io.experiment, kind)
        .context("region analysis cannot start")?;
    if let Some(level) = args.admin_level.or(config.analysis.admin_level) {
        analysis
            .retain_masks(|p| is_admin_level(p, level))
            .with_context(|| format!("no masks of admin level {level}"))?;
    }

    let summary = analysis.analyze().context("region analysis failed")?;
    for row in &summary.global_errors {
        info!(model = %row.model, rmse = row.rmse, mae = row.mae, r2 = row.r2, "global errors");
    }

    if !metric_maps.is_empty() {
        let path = analysis
            .analyze_metric_maps(&metric_maps)
            .context("metric map analysis failed")?;
        info!(path = %path.display(), "regional metric means written");
    }

    info!(out_dir = %analysis.out_dir().display(), files = summary.files.len(), "analysis complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_level_matching() {
        assert!(is_admin_level(Path::new("b/province_l1_kenya.parquet"), 1));
        assert!(!is_admin_level(Path::new("b/province_l1_kenya.parquet"), 2));
        assert!(!is_admin_level(Path::new("b_l1_/district.parquet"), 1));
    }
}
