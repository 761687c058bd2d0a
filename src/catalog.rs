use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::map::{Map, MapError};

/// Fixed capacity of the catalog; loads past this are refused.
pub const MAX_MAPS: usize = 16;

/// Extension picked up by the directory bulk-loader.
pub const MAP_EXTENSION: &str = "map";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("map catalog is full ({MAX_MAPS} maps)")]
    CatalogFull,

    #[error("map index {0} is out of range")]
    IndexOutOfRange(usize),
}

/// Ordered, bounded collection of loaded maps plus the active selection.
///
/// While nothing has been activated the built-in default map stands in, so
/// `active_map` always has something to return.
pub struct MapCatalog {
    maps: Vec<Map>,
    active: Option<usize>,
    fallback: Map,
}

impl Default for MapCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MapCatalog {
    pub fn new() -> Self {
        MapCatalog {
            maps: Vec::new(),
            active: None,
            fallback: Map::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Append a map, returning its index.
    pub fn add(&mut self, map: Map) -> Result<usize, CatalogError> {
        if self.maps.len() >= MAX_MAPS {
            return Err(CatalogError::CatalogFull);
        }
        self.maps.push(map);
        Ok(self.maps.len() - 1)
    }

    /// Make the map at `index` active and return it. A bad index leaves the
    /// current selection untouched.
    pub fn activate(&mut self, index: usize) -> Result<&Map, CatalogError> {
        if index >= self.maps.len() {
            return Err(CatalogError::IndexOutOfRange(index));
        }
        self.active = Some(index);
        Ok(&self.maps[index])
    }

    pub fn active_map(&self) -> &Map {
        match self.active {
            Some(i) => &self.maps[i],
            None => &self.fallback,
        }
    }

    /// Load every `.map` file in `dir`, counting successes. Files that fail
    /// to parse are skipped; enumeration order is whatever the filesystem
    /// yields. An unreadable directory is the only overall failure.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize, MapError> {
        let mut added = 0usize;
        for entry in fs::read_dir(dir)? {
            let path = match entry {
                Ok(e) => e.path(),
                Err(e) => {
                    warn!("skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some(MAP_EXTENSION) {
                continue;
            }
            match Map::load(&path) {
                Ok(map) => match self.add(map) {
                    Ok(index) => {
                        info!("loaded map {} as slot {index}", path.display());
                        added += 1;
                    }
                    Err(e) => {
                        warn!("not loading {}: {e}", path.display());
                        break;
                    }
                },
                Err(e) => warn!("failed to load {}: {e}", path.display()),
            }
        }
        Ok(added)
    }
}
