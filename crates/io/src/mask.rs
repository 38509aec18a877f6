//! Labelled region masks.

use std::collections::BTreeSet;
use std::path::Path;

use ndarray::{Array2, Axis};

use crate::error::IoError;
use crate::grid::{check_2d, coordinate_indices};

/// Ordered mapping from integer region id to region name.
///
/// Parsed from the comma-separated `keys` and `values` metadata attached to
/// every region mask file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLookup {
    entries: Vec<(i64, String)>,
}

impl RegionLookup {
    /// Builds a lookup from `(id, name)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::RegionSchema`] on duplicate ids, duplicate names or
    /// empty names.
    pub fn new(label: &str, entries: Vec<(i64, String)>) -> Result<Self, IoError> {
        let mut seen_ids = BTreeSet::new();
        let mut seen_names = BTreeSet::new();
        for (id, name) in &entries {
            if !seen_ids.insert(*id) {
                return Err(schema(label, format!("duplicate region id {id}")));
            }
            if name.is_empty() {
                return Err(schema(label, format!("region id {id} has an empty name")));
            }
            if !seen_names.insert(name.as_str()) {
                return Err(schema(label, format!("duplicate region name '{name}'")));
            }
        }
        Ok(Self { entries })
    }

    /// Parses the `keys` / `values` attribute pair.
    ///
    /// Both strings are split on commas and each item is whitespace-trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::RegionSchema`] if the lists differ in length, a key
    /// is not an integer, or ids or names repeat.
    pub fn parse(label: &str, keys: &str, values: &str) -> Result<Self, IoError> {
        let ids: Vec<&str> = keys.split(',').map(str::trim).collect();
        let names: Vec<&str> = values.split(',').map(str::trim).collect();
        if ids.len() != names.len() {
            return Err(schema(
                label,
                format!("{} keys but {} values", ids.len(), names.len()),
            ));
        }
        let entries = ids
            .iter()
            .zip(names)
            .map(|(k, v)| {
                k.parse::<i64>()
                    .map(|id| (id, v.to_string()))
                    .map_err(|_| schema(label, format!("key '{k}' is not an integer")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(label, entries)
    }

    /// Serialises the ids back to the `keys` attribute format.
    pub fn keys_attr(&self) -> String {
        self.entries
            .iter()
            .map(|(id, _)| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Serialises the names back to the `values` attribute format.
    pub fn values_attr(&self) -> String {
        self.entries
            .iter()
            .map(|(_, name)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Name of region `id`.
    pub fn name(&self, id: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == id)
            .map(|(_, v)| v.as_str())
    }

    /// `(id, name)` pairs in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lookup holds no regions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn schema(label: &str, reason: String) -> IoError {
    IoError::RegionSchema {
        label: label.to_string(),
        reason,
    }
}

/// A 2-D integer region grid with its lookup and label.
///
/// Cells outside every region hold `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    label: String,
    lat: Vec<f64>,
    lon: Vec<f64>,
    regions: Array2<Option<i64>>,
    lookup: RegionLookup,
}

impl RegionMask {
    /// Creates a mask.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if `regions` is not `(lat, lon)` shaped.
    pub fn new(
        label: impl Into<String>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        regions: Array2<Option<i64>>,
        lookup: RegionLookup,
    ) -> Result<Self, IoError> {
        check_2d(regions.dim(), lat.len(), lon.len())?;
        Ok(Self {
            label: label.into(),
            lat,
            lon,
            regions,
            lookup,
        })
    }

    /// Label derived from the mask file stem, e.g. `province_l1_kenya`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the latitude axis.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Returns the longitude axis.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Region id per cell.
    pub fn regions(&self) -> &Array2<Option<i64>> {
        &self.regions
    }

    /// The id to name lookup.
    pub fn lookup(&self) -> &RegionLookup {
        &self.lookup
    }

    /// Subsets the mask to the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::CoordinateMismatch`] if any coordinate is absent.
    pub fn restrict_to(&self, lat: &[f64], lon: &[f64]) -> Result<Self, IoError> {
        let context = format!("region mask '{}'", self.label);
        let yi = coordinate_indices("lat", &self.lat, lat, &context)?;
        let xi = coordinate_indices("lon", &self.lon, lon, &context)?;
        let regions = self.regions.select(Axis(0), &yi).select(Axis(1), &xi);
        Self::new(
            self.label.clone(),
            lat.to_vec(),
            lon.to_vec(),
            regions,
            self.lookup.clone(),
        )
    }
}

/// Label for a mask stored at `path`: the file name without extension.
pub fn label_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
