use crate::map::Map;

const MOVE_SPEED: f32 = 5.0; // grid units per second
const ROT_SPEED: f32 = 3.0; // radians per second

// tan(33 deg) ~ 0.66 gives the classic 66 degree horizontal FOV.
const PLANE_SCALE: f32 = 0.66;

/// Held-key snapshot for one frame of movement.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

/// Player pose: a point in continuous grid coordinates, a unit direction
/// vector, and the camera-plane vector perpendicular to it.
#[derive(Debug, Clone)]
pub struct Player {
    pub pos_x: f32,
    pub pos_y: f32,
    pub dir_x: f32,
    pub dir_y: f32,
    pub plane_x: f32,
    pub plane_y: f32,
    pub move_speed: f32,
    pub rot_speed: f32,
}

impl Player {
    /// Spawn at a position, facing negative X.
    pub fn at(pos_x: f32, pos_y: f32) -> Self {
        Player {
            pos_x,
            pos_y,
            dir_x: -1.0,
            dir_y: 0.0,
            plane_x: 0.0,
            plane_y: PLANE_SCALE,
            move_speed: MOVE_SPEED,
            rot_speed: ROT_SPEED,
        }
    }

    /// Snap back to a map's declared start pose.
    pub fn reset(&mut self, map: &Map) {
        *self = Player::at(map.start_x, map.start_y);
    }

    /// Apply one frame of movement. Forward/backward and the two turn keys
    /// are evaluated independently, so any combination may act in one call.
    pub fn update(&mut self, map: &Map, input: MoveInput, dt: f32) {
        let step = self.move_speed * dt;
        if input.forward {
            self.try_step(
                map,
                self.pos_x + self.dir_x * step,
                self.pos_y + self.dir_y * step,
            );
        }
        if input.backward {
            self.try_step(
                map,
                self.pos_x - self.dir_x * step,
                self.pos_y - self.dir_y * step,
            );
        }

        let angle = self.rot_speed * dt;
        if input.turn_right {
            // Clockwise turn takes the negative angle.
            self.rotate(-angle);
        }
        if input.turn_left {
            self.rotate(angle);
        }
    }

    // Move to the candidate point unless it leaves the map or lands in a
    // solid cell. Both axes are judged against the same point; a blocked
    // diagonal does not slide along the wall.
    fn try_step(&mut self, map: &Map, new_x: f32, new_y: f32) {
        if new_x < 0.0 || new_y < 0.0 {
            return;
        }
        if new_x >= map.width as f32 || new_y >= map.height as f32 {
            return;
        }
        if map.cell(new_x as usize, new_y as usize) != 0 {
            return;
        }
        self.pos_x = new_x;
        self.pos_y = new_y;
    }

    // Rotate direction and camera plane by the same angle so they stay
    // perpendicular and keep their magnitudes.
    fn rotate(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let dir_x = self.dir_x;
        self.dir_x = dir_x * cos - self.dir_y * sin;
        self.dir_y = dir_x * sin + self.dir_y * cos;
        let plane_x = self.plane_x;
        self.plane_x = plane_x * cos - self.plane_y * sin;
        self.plane_y = plane_x * sin + self.plane_y * cos;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;

    // 8x8 room: solid border, empty interior.
    fn room() -> Map {
        let mut grid = [0u8; 64];
        for i in 0..8 {
            grid[i] = 1;
            grid[56 + i] = 1;
            grid[i * 8] = 1;
            grid[i * 8 + 7] = 1;
        }
        Map::from_grid(&grid, 8, 8, (4.0, 4.0), "room")
    }

    fn forward() -> MoveInput {
        MoveInput {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn forward_moves_along_direction() {
        let map = room();
        let mut player = Player::at(4.0, 4.0);
        let mut travelled = 0.0f32;
        for _ in 0..10 {
            player.update(&map, forward(), 0.01);
            // Distance along the (fixed) direction vector grows monotonically.
            let along = (player.pos_x - 4.0) * player.dir_x + (player.pos_y - 4.0) * player.dir_y;
            assert!(along > travelled);
            travelled = along;
            assert_eq!(map.cell(player.pos_x as usize, player.pos_y as usize), 0);
        }
        assert_relative_eq!(travelled, 10.0 * 0.01 * MOVE_SPEED, epsilon = 1e-4);
    }

    #[test]
    fn walls_block_movement() {
        let map = room();
        // Facing negative X, one step away from the border wall.
        let mut player = Player::at(1.1, 4.0);
        player.update(&map, forward(), 0.05);
        assert_eq!((player.pos_x, player.pos_y), (1.1, 4.0));
    }

    #[test]
    fn map_edge_blocks_movement() {
        // No border walls at all: the bounds check alone must stop us.
        let map = Map::from_grid(&[0u8; 16], 4, 4, (0.5, 2.0), "open");
        let mut player = Player::at(0.2, 2.0);
        player.update(&map, forward(), 0.1);
        assert_eq!((player.pos_x, player.pos_y), (0.2, 2.0));
    }

    #[test]
    fn forward_and_backward_may_both_apply() {
        let map = room();
        let mut player = Player::at(4.0, 4.0);
        let input = MoveInput {
            forward: true,
            backward: true,
            ..Default::default()
        };
        player.update(&map, input, 0.02);
        // The two translations cancel.
        assert_relative_eq!(player.pos_x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(player.pos_y, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn rotation_round_trips() {
        let map = room();
        let mut player = Player::at(4.0, 4.0);
        let left = MoveInput {
            turn_left: true,
            ..Default::default()
        };
        let right = MoveInput {
            turn_right: true,
            ..Default::default()
        };
        for _ in 0..7 {
            player.update(&map, left, 0.031);
        }
        for _ in 0..7 {
            player.update(&map, right, 0.031);
        }
        assert_relative_eq!(player.dir_x, -1.0, epsilon = 1e-4);
        assert_relative_eq!(player.dir_y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(player.plane_x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(player.plane_y, PLANE_SCALE, epsilon = 1e-4);
    }

    proptest! {
        // Any sequence of turns preserves the direction magnitude, the plane
        // magnitude, and their perpendicularity.
        #[test]
        fn rotation_invariants(
            turns in proptest::collection::vec((any::<bool>(), any::<bool>(), 0.0f32..0.05), 0..200),
        ) {
            let map = room();
            let mut player = Player::at(4.0, 4.0);
            for (turn_left, turn_right, dt) in turns {
                let input = MoveInput { turn_left, turn_right, ..Default::default() };
                player.update(&map, input, dt);
            }
            let dir_len = (player.dir_x * player.dir_x + player.dir_y * player.dir_y).sqrt();
            let plane_len = (player.plane_x * player.plane_x + player.plane_y * player.plane_y).sqrt();
            let dot = player.dir_x * player.plane_x + player.dir_y * player.plane_y;
            prop_assert!((dir_len - 1.0).abs() < 1e-3);
            prop_assert!((plane_len - PLANE_SCALE).abs() < 1e-3);
            prop_assert!(dot.abs() < 1e-3);
        }
    }
}
