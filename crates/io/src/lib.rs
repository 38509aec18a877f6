//! # drought-io
//!
//! Gridded containers and their on-disk form. Grids are stored as Parquet in
//! a long `(time, lat, lon, <variables>)` layout, region masks as
//! `(lat, lon, region)` with the region lookup in file metadata. Raw NetCDF
//! inputs can be ingested with the `netcdf` feature.

mod error;
mod grid;
mod mask;
#[cfg(feature = "netcdf")]
mod netcdf_read;
mod parquet_read;
mod parquet_write;
mod reader;
mod writer;

pub use error::IoError;
pub use grid::{COORD_TOLERANCE, Grid, GriddedSeries};
pub use mask::{RegionLookup, RegionMask, label_from_path};
pub use parquet_write::{KEYS_METADATA, VALUES_METADATA};
#[cfg(feature = "netcdf")]
pub use reader::{NetcdfConfig, read_netcdf};
pub use reader::{read_grid, read_region_mask, read_series};
pub use writer::{Compression, WriterConfig, write_grid, write_region_mask, write_series};
