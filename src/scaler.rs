use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source pixel coordinates for every destination pixel.
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    let sx = src_w as f32 / dst_w.max(1) as f32;
    let sy = src_h as f32 / dst_h.max(1) as f32;

    // Sample at pixel centers so the mapping stays symmetric.
    let src_x = (0..dst_w)
        .map(|x| (((x as f32 + 0.5) * sx) as usize).min(src_w - 1))
        .collect();
    let src_y = (0..dst_h)
        .map(|y| (((y as f32 + 0.5) * sy) as usize).min(src_h - 1))
        .collect();

    ScaleLut { src_x, src_y }
}

/// Nearest-neighbor stretch of the internal framebuffer to the window
/// surface. Rows are processed in parallel for cache friendly writes;
/// nearest sampling keeps wall edges hard.
pub fn blit_scaled(dst: &mut [u32], dst_w: usize, src: &[u32], src_w: usize, lut: &ScaleLut) {
    dst.par_chunks_mut(dst_w).enumerate().for_each(|(y, dst_row)| {
        let row = lut.src_y[y] * src_w;
        for (x, px) in dst_row.iter_mut().enumerate() {
            *px = src[row + lut.src_x[x]];
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upscale_preserves_quadrants() {
        let src = [1u32, 2, 3, 4]; // 2x2
        let lut = build_scale_lut(4, 4, 2, 2);
        let mut dst = vec![0u32; 16];
        blit_scaled(&mut dst, 4, &src, 2, &lut);
        assert_eq!(
            dst,
            vec![1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]
        );
    }

    #[test]
    fn identity_scale_copies() {
        let src = [7u32, 8, 9, 10, 11, 12]; // 3x2
        let lut = build_scale_lut(3, 2, 3, 2);
        let mut dst = vec![0u32; 6];
        blit_scaled(&mut dst, 3, &src, 3, &lut);
        assert_eq!(dst, src);
    }
}
