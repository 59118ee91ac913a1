//! JSON table files making up a dataset directory.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{MovieInfo, MovieLocation};

/// Movie key → movie metadata
pub const MOVIE_TABLE_FILE: &str = "movie_data.json";
/// Movie key → list of that movie's locations
pub const LOCATION_TABLE_FILE: &str = "loc_data.json";
/// Flat location array sorted by latitude
pub const LATITUDE_TABLE_FILE: &str = "lat_data.json";

pub type MovieTable = BTreeMap<String, MovieInfo>;
pub type LocationTable = BTreeMap<String, Vec<MovieLocation>>;

pub(crate) fn read_table<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_table<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}
