use std::path::Path;

use log::{info, warn};

use crate::catalog::{CatalogError, MapCatalog};
use crate::map::Map;
use crate::player::{MoveInput, Player};

/// Upper bound on per-frame elapsed time. A frame hitch with uncapped dt
/// would make a single movement step large enough to tunnel through walls.
pub const MAX_FRAME_DT: f32 = 0.05;

/// One raycasting session: the map catalog and the player moving through
/// the active map. All per-frame state lives here rather than in globals so
/// independent sessions can coexist.
pub struct Engine {
    catalog: MapCatalog,
    player: Player,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let catalog = MapCatalog::new();
        let start = catalog.active_map();
        let player = Player::at(start.start_x, start.start_y);
        Engine { catalog, player }
    }

    pub fn active_map(&self) -> &Map {
        self.catalog.active_map()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn map_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn add_map(&mut self, map: Map) -> Result<usize, CatalogError> {
        self.catalog.add(map)
    }

    /// Switch to a catalog entry. Activation is the one place the player
    /// pose is reset, to the target map's declared start.
    pub fn activate_map(&mut self, index: usize) -> Result<(), CatalogError> {
        let map = self.catalog.activate(index)?;
        self.player.reset(map);
        info!("switched to map {index}: \"{}\" ({}x{})", map.name, map.width, map.height);
        Ok(())
    }

    /// Bulk-load maps from a directory, degrading to the built-in map when
    /// the directory is unusable.
    pub fn load_maps_from(&mut self, dir: &Path) -> usize {
        match self.catalog.load_directory(dir) {
            Ok(count) => count,
            Err(e) => {
                warn!("map directory {} unavailable: {e}", dir.display());
                0
            }
        }
    }

    /// Integrate one frame of input. `dt` is clamped to [`MAX_FRAME_DT`].
    pub fn update(&mut self, input: MoveInput, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        let map = self.catalog.active_map();
        self.player.update(map, input, dt);
    }
}
