//! Where the tables come from: a preloaded snapshot or a directory read per call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::tables::{
    read_table, write_table, LocationTable, MovieTable, LATITUDE_TABLE_FILE, LOCATION_TABLE_FILE,
    MOVIE_TABLE_FILE,
};
use crate::error::StoreError;
use crate::models::IndexedLocation;
use crate::spatial::LatitudeIndex;

/// Read access to the three tables.
///
/// Implementations must hand out data that never changes once returned, so
/// callers can hold on to the `Arc`s while other queries run.
pub trait TableSource: Send + Sync {
    fn movies(&self) -> Result<Arc<MovieTable>, StoreError>;

    fn locations(&self) -> Result<Arc<LocationTable>, StoreError>;

    fn latitude_index(&self) -> Result<Arc<LatitudeIndex>, StoreError>;
}

/// Immutable in-memory copy of a dataset, loaded once and shared.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    movies: Arc<MovieTable>,
    locations: Arc<LocationTable>,
    index: Arc<LatitudeIndex>,
}

impl Snapshot {
    pub fn new(
        movies: MovieTable,
        locations: LocationTable,
        by_latitude: Vec<IndexedLocation>,
    ) -> Self {
        Self {
            movies: Arc::new(movies),
            locations: Arc::new(locations),
            index: Arc::new(LatitudeIndex::new(by_latitude)),
        }
    }

    /// Load all three tables from a dataset directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let source = DirectorySource::new(dir.as_ref());
        let snapshot = Self {
            movies: source.movies()?,
            locations: source.locations()?,
            index: source.latitude_index()?,
        };

        info!(
            "Loaded dataset from {}: {} movies, {} location records",
            dir.as_ref().display(),
            snapshot.movies.len(),
            snapshot.index.len()
        );

        Ok(snapshot)
    }

    /// Write all three tables into `dir`, creating it if needed.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<(), StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        write_table(&dir.join(MOVIE_TABLE_FILE), self.movies.as_ref())?;
        write_table(&dir.join(LOCATION_TABLE_FILE), self.locations.as_ref())?;
        write_table(&dir.join(LATITUDE_TABLE_FILE), self.index.as_slice())?;

        info!(
            "Wrote {} movies and {} location records to {}",
            self.movies.len(),
            self.index.len(),
            dir.display()
        );
        Ok(())
    }

    pub fn index(&self) -> &LatitudeIndex {
        &self.index
    }
}

impl TableSource for Snapshot {
    fn movies(&self) -> Result<Arc<MovieTable>, StoreError> {
        Ok(Arc::clone(&self.movies))
    }

    fn locations(&self) -> Result<Arc<LocationTable>, StoreError> {
        Ok(Arc::clone(&self.locations))
    }

    fn latitude_index(&self) -> Result<Arc<LatitudeIndex>, StoreError> {
        Ok(Arc::clone(&self.index))
    }
}

/// Reads a table from disk on every call.
///
/// Each call is one blocking read of one file. Nothing is cached, so a
/// dataset replaced on disk is picked up by the next query.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableSource for DirectorySource {
    fn movies(&self) -> Result<Arc<MovieTable>, StoreError> {
        debug!("Reading {}", MOVIE_TABLE_FILE);
        read_table(&self.dir.join(MOVIE_TABLE_FILE)).map(Arc::new)
    }

    fn locations(&self) -> Result<Arc<LocationTable>, StoreError> {
        debug!("Reading {}", LOCATION_TABLE_FILE);
        read_table(&self.dir.join(LOCATION_TABLE_FILE)).map(Arc::new)
    }

    fn latitude_index(&self) -> Result<Arc<LatitudeIndex>, StoreError> {
        debug!("Reading {}", LATITUDE_TABLE_FILE);
        let locations: Vec<IndexedLocation> = read_table(&self.dir.join(LATITUDE_TABLE_FILE))?;
        Ok(Arc::new(LatitudeIndex::new(locations)))
    }
}
