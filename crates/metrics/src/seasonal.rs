//! Error tables per meteorological season.

use std::collections::BTreeMap;

use drought_calendar::Season;
use tracing::{info_span, instrument};

use crate::delta::{DeltaTable, error_deltas};
use crate::error::MetricError;
use crate::kind::MetricKind;
use crate::nested::NestedTable;
use crate::station::{ErrorTable, StationData, calculate_errors};

/// `season -> model -> error table`.
pub type SeasonalErrors = NestedTable<Season, String, ErrorTable>;

/// Computes the error table of every model restricted to each season.
#[instrument(skip_all, fields(models = models.len()))]
pub fn seasonal_errors(
    models: &BTreeMap<String, StationData>,
    metrics: &[MetricKind],
) -> SeasonalErrors {
    let mut out = SeasonalErrors::new();
    for season in Season::ALL {
        let _span = info_span!("season", %season).entered();
        for (model, data) in models {
            let table = calculate_errors(&data.filter_season(season), metrics);
            out.insert(season, model.clone(), table);
        }
    }
    out
}

/// Deltas against `reference` within each season.
pub fn seasonal_deltas(
    errors: &SeasonalErrors,
    reference: &str,
) -> Result<BTreeMap<Season, DeltaTable>, MetricError> {
    errors
        .outer_keys()
        .filter_map(|season| errors.row(season).map(|row| (*season, row)))
        .map(|(season, row)| error_deltas(row, reference).map(|d| (season, d)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationRecord;
    use chrono::{Duration, NaiveDate};

    fn year_of_data(scale: f64) -> StationData {
        let start = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        StationData::from_records((0..365).map(|i| {
            let obs = 5.0 + (i % 17) as f64;
            StationRecord {
                station_id: "g1".to_string(),
                time: start + Duration::days(i),
                obs: Some(obs),
                sim: Some(obs * scale),
            }
        }))
    }

    #[test]
    fn test_every_season_and_model_present() {
        let models = BTreeMap::from([
            ("LSTM".to_string(), year_of_data(1.0)),
            ("VIC".to_string(), year_of_data(1.2)),
        ]);
        let errors = seasonal_errors(&models, &[MetricKind::Nse, MetricKind::Bias]);
        assert_eq!(errors.len(), 8);

        let summer = errors.get(&Season::Jja, "LSTM").unwrap();
        assert_eq!(summer.get("g1", MetricKind::Nse), Some(1.0));

        let deltas = seasonal_deltas(&errors, "LSTM").unwrap();
        assert_eq!(deltas.len(), 4);
        let son = deltas[&Season::Son].get("VIC", "bias").unwrap()["g1"];
        assert!((son + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_deltas_missing_reference() {
        let models = BTreeMap::from([("VIC".to_string(), year_of_data(1.2))]);
        let errors = seasonal_errors(&models, &[MetricKind::Rmse]);
        assert!(matches!(
            seasonal_deltas(&errors, "LSTM"),
            Err(MetricError::MissingReference { .. })
        ));
    }
}
