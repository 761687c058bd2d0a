use crate::map::Map;
use crate::player::Player;

/// Perpendicular distance where fog starts eating into wall brightness.
pub const FOG_START: f32 = 5.0;
/// Distance at which walls fade fully to black.
pub const FOG_END: f32 = 10.0;

// Horizontal-boundary hits draw darker than vertical ones.
const SIDE_SHADE: f32 = 0.75;

/// Which grid boundary a ray crossed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Vertical boundary (the ray stepped in X).
    X,
    /// Horizontal boundary (the ray stepped in Y).
    Y,
}

/// Result of casting one screen column: everything a renderer needs to draw
/// the wall strip for that column.
#[derive(Debug, Clone, Copy)]
pub struct WallHit {
    pub column: usize,
    /// Perpendicular (fisheye-corrected) distance to the wall.
    pub distance: f32,
    /// Cell value of the struck wall.
    pub material: u8,
    pub side: Side,
    /// Fractional offset along the wall face, in `[0, 1)`. Selects the
    /// texture column for texture-capable renderers.
    pub wall_x: f32,
}

impl WallHit {
    /// Inclusive pixel rows of the wall strip on a screen of the given
    /// height, clamped to the screen.
    pub fn vertical_span(&self, screen_height: usize) -> (usize, usize) {
        let h = screen_height as i32;
        let line_height = (screen_height as f32 / self.distance.max(1e-4)) as i32;
        let top = (h / 2 - line_height / 2).max(0);
        let bottom = (h / 2 + line_height / 2).min(h - 1);
        (top as usize, bottom as usize)
    }

    /// Brightness hint in `[0, 1]`: horizontal-boundary darkening plus linear
    /// fog beyond [`FOG_START`], reaching black at [`FOG_END`].
    pub fn shade(&self) -> f32 {
        let side = match self.side {
            Side::X => 1.0,
            Side::Y => SIDE_SHADE,
        };
        if self.distance <= FOG_START {
            return side;
        }
        side * ((FOG_END - self.distance) / (FOG_END - FOG_START)).clamp(0.0, 1.0)
    }
}

#[inline]
fn frac(v: f32) -> f32 {
    v - v.floor()
}

/// Cast the ray for one screen column and return the first wall it strikes,
/// or `None` if the ray leaves the map.
///
/// Grid DDA: step cell by cell along whichever axis reaches its next
/// boundary sooner, until a solid cell or the map edge.
pub fn cast_column(
    map: &Map,
    player: &Player,
    column: usize,
    screen_width: usize,
) -> Option<WallHit> {
    // Column index to camera-space offset in [-1, 1].
    let camera_x = 2.0 * column as f32 / screen_width as f32 - 1.0;
    let ray_dir_x = player.dir_x + player.plane_x * camera_x;
    let ray_dir_y = player.dir_y + player.plane_y * camera_x;

    let mut map_x = player.pos_x as i32;
    let mut map_y = player.pos_y as i32;

    // A zero ray component would divide by zero; an effectively infinite
    // step keeps that axis out of the traversal instead.
    let delta_dist_x = if ray_dir_x == 0.0 {
        f32::MAX
    } else {
        (1.0 / ray_dir_x).abs()
    };
    let delta_dist_y = if ray_dir_y == 0.0 {
        f32::MAX
    } else {
        (1.0 / ray_dir_y).abs()
    };

    // Step direction per axis and distance to the first boundary on it.
    let (step_x, mut side_dist_x) = if ray_dir_x < 0.0 {
        (-1, (player.pos_x - map_x as f32) * delta_dist_x)
    } else {
        (1, (map_x as f32 + 1.0 - player.pos_x) * delta_dist_x)
    };
    let (step_y, mut side_dist_y) = if ray_dir_y < 0.0 {
        (-1, (player.pos_y - map_y as f32) * delta_dist_y)
    } else {
        (1, (map_y as f32 + 1.0 - player.pos_y) * delta_dist_y)
    };

    let mut side = Side::X;
    let material = loop {
        // Advance along whichever axis has the nearer boundary; on a tie the
        // horizontal step wins.
        if side_dist_x < side_dist_y {
            side_dist_x += delta_dist_x;
            map_x += step_x;
            side = Side::X;
        } else {
            side_dist_y += delta_dist_y;
            map_y += step_y;
            side = Side::Y;
        }
        if !map.in_bounds(map_x, map_y) {
            return None;
        }
        let cell = map.cell(map_x as usize, map_y as usize);
        if cell > 0 {
            break cell;
        }
    };

    // Distance projected onto the camera's forward axis, not the Euclidean
    // ray length; this is what keeps wall heights fisheye-free.
    let distance = match side {
        Side::X => (map_x as f32 - player.pos_x + (1 - step_x) as f32 / 2.0) / ray_dir_x,
        Side::Y => (map_y as f32 - player.pos_y + (1 - step_y) as f32 / 2.0) / ray_dir_y,
    };

    // Where along the wall face the ray landed, for texture lookup.
    let wall_x = match side {
        Side::X => frac(player.pos_y + distance * ray_dir_y),
        Side::Y => frac(player.pos_x + distance * ray_dir_x),
    };

    Some(WallHit {
        column,
        distance,
        material,
        side,
        wall_x,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    // 5x5 room with a solid border.
    fn room() -> Map {
        let mut grid = [0u8; 25];
        for i in 0..5 {
            grid[i] = 1;
            grid[20 + i] = 1;
            grid[i * 5] = 1;
            grid[i * 5 + 4] = 1;
        }
        Map::from_grid(&grid, 5, 5, (2.5, 2.5), "room")
    }

    fn facing_east(pos_x: f32, pos_y: f32) -> Player {
        Player {
            pos_x,
            pos_y,
            dir_x: 1.0,
            dir_y: 0.0,
            plane_x: 0.0,
            plane_y: 0.66,
            move_speed: 5.0,
            rot_speed: 3.0,
        }
    }

    #[test]
    fn enclosed_map_hits_every_column() {
        let map = Map::default();
        let player = Player::at(map.start_x, map.start_y);
        for column in 0..320 {
            let hit = cast_column(&map, &player, column, 320);
            assert!(hit.is_some(), "column {column} missed");
            assert!(hit.unwrap().distance > 0.0);
        }
    }

    #[test]
    fn axis_parallel_ray_terminates() {
        let map = room();
        // Center column of an even width: camera_x is exactly 0, so the ray
        // direction is exactly (1, 0).
        let hit = cast_column(&map, &facing_east(2.5, 2.5), 160, 320).unwrap();
        assert_eq!(hit.side, Side::X);
        assert_relative_eq!(hit.distance, 1.5, epsilon = 1e-6);
        assert_eq!(hit.material, 1);
        assert_relative_eq!(hit.wall_x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn open_map_produces_misses() {
        let map = Map::from_grid(&[0u8; 25], 5, 5, (2.5, 2.5), "open");
        for column in 0..64 {
            assert!(cast_column(&map, &facing_east(2.5, 2.5), column, 64).is_none());
        }
    }

    #[test]
    fn wall_x_matches_independent_computation() {
        let map = room();
        let player = facing_east(2.5, 2.3);
        let screen_width = 4;
        let column = 3;
        let hit = cast_column(&map, &player, column, screen_width).unwrap();

        let camera_x = 2.0 * column as f32 / screen_width as f32 - 1.0;
        let ray_dir_x = player.dir_x + player.plane_x * camera_x;
        let ray_dir_y = player.dir_y + player.plane_y * camera_x;
        let expected = match hit.side {
            Side::X => player.pos_y + hit.distance * ray_dir_y,
            Side::Y => player.pos_x + hit.distance * ray_dir_x,
        };
        let expected = expected - expected.floor();
        assert!(hit.wall_x >= 0.0 && hit.wall_x < 1.0);
        assert_relative_eq!(hit.wall_x, expected, epsilon = 1e-6);
    }

    #[test]
    fn side_reflects_struck_boundary() {
        let map = room();
        // Straight up in grid space: must cross a horizontal boundary.
        let player = Player {
            dir_x: 0.0,
            dir_y: -1.0,
            plane_x: 0.66,
            plane_y: 0.0,
            ..facing_east(2.5, 2.5)
        };
        let hit = cast_column(&map, &player, 160, 320).unwrap();
        assert_eq!(hit.side, Side::Y);
        assert_relative_eq!(hit.distance, 1.5, epsilon = 1e-6);
    }

    #[test]
    fn vertical_span_is_clamped_and_centered() {
        let hit = WallHit {
            column: 0,
            distance: 2.0,
            material: 1,
            side: Side::X,
            wall_x: 0.0,
        };
        let (top, bottom) = hit.vertical_span(200);
        assert_eq!((top, bottom), (50, 150));

        // Point-blank hits cover the whole screen instead of overflowing.
        let close = WallHit {
            distance: 1e-9,
            ..hit
        };
        let (top, bottom) = close.vertical_span(200);
        assert_eq!(top, 0);
        assert_eq!(bottom, 199);
    }

    #[test]
    fn shade_darkens_sides_and_applies_fog() {
        let hit = |side, distance| WallHit {
            column: 0,
            distance,
            material: 1,
            side,
            wall_x: 0.0,
        };
        assert_relative_eq!(hit(Side::X, 2.0).shade(), 1.0);
        assert_relative_eq!(hit(Side::Y, 2.0).shade(), 0.75);
        // Halfway through the fog band.
        assert_relative_eq!(hit(Side::X, 7.5).shade(), 0.5);
        // Beyond the far end the shade clamps at black.
        assert_relative_eq!(hit(Side::X, 25.0).shade(), 0.0);
        assert_relative_eq!(hit(Side::Y, FOG_START).shade(), 0.75);
    }
}
