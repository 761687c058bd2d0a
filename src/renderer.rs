use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

use crate::map::Map;
use crate::player::Player;
use crate::raycast::{self, WallHit};

#[inline]
const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory, alpha at 0
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

const SKY: u32 = pack_rgb(100, 100, 170);
const FLOOR: u32 = pack_rgb(80, 80, 80);

fn material_color(material: u8) -> u32 {
    match material {
        1 => pack_rgb(255, 0, 0),
        2 => pack_rgb(0, 255, 0),
        3 => pack_rgb(0, 0, 255),
        4 => pack_rgb(255, 255, 0),
        // Unrecognized materials are still solid, just neutral.
        _ => pack_rgb(128, 128, 128),
    }
}

fn scale_rgb(color: u32, factor: f32) -> u32 {
    let scale = |c: u32| ((c & 0xFF) as f32 * factor) as u32 & 0xFF;
    scale(color) | (scale(color >> 8) << 8) | (scale(color >> 16) << 16)
}

// One column's wall strip, ready to paint.
struct Strip {
    top: usize,
    bottom: usize,
    color: u32,
}

fn strip_for(hit: &WallHit, screen_height: usize) -> Strip {
    let (top, bottom) = hit.vertical_span(screen_height);
    Strip {
        top,
        bottom,
        color: scale_rgb(material_color(hit.material), hit.shade()),
    }
}

/// Draw one frame into a row-major `width * height` framebuffer: sky and
/// floor halves with a shaded wall strip per column.
pub fn render_frame(buf: &mut [u32], width: usize, height: usize, map: &Map, player: &Player) {
    // Cast every column up front so rows can then be filled independently.
    let strips: Vec<Option<Strip>> = (0..width)
        .into_par_iter()
        .map(|col| {
            raycast::cast_column(map, player, col, width).map(|hit| strip_for(&hit, height))
        })
        .collect();

    let mid = height / 2;
    buf.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let backdrop = if y < mid { SKY } else { FLOOR };
        for (x, px) in row.iter_mut().enumerate() {
            *px = match &strips[x] {
                // Columns whose ray left the map keep the backdrop.
                Some(s) if s.top <= y && y <= s.bottom => s.color,
                _ => backdrop,
            };
        }
    });
}
