use serde::{Deserialize, Serialize};

/// Dimensions of the working frame, fixed once per calibration session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// All-zero image of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height],
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width as u32, self.height as u32)
    }
}

/// Per-pixel absolute difference. Inputs must have matching dimensions.
pub fn absdiff(a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> GrayImage {
    debug_assert_eq!((a.width, a.height), (b.width, b.height));
    let w = a.width.min(b.width);
    let h = a.height.min(b.height);

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let pa = a.data[y * a.width + x];
            let pb = b.data[y * b.width + x];
            out[y * w + x] = pa.abs_diff(pb);
        }
    }

    GrayImage {
        width: w,
        height: h,
        data: out,
    }
}

/// Normalized box blur with a `(2*radius + 1)^2` kernel. Border pixels
/// average over the in-bounds part of the kernel only.
pub fn box_blur(src: &GrayImageView<'_>, radius: usize) -> GrayImage {
    if radius == 0 {
        return GrayImage {
            width: src.width,
            height: src.height,
            data: src.data.to_vec(),
        };
    }

    let r = radius as i64;
    let w = src.width as i64;
    let h = src.height as i64;
    let mut out = vec![0u8; src.width * src.height];

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u32;
            let mut count = 0u32;
            for dy in -r..=r {
                let sy = y + dy;
                if sy < 0 || sy >= h {
                    continue;
                }
                for dx in -r..=r {
                    let sx = x + dx;
                    if sx < 0 || sx >= w {
                        continue;
                    }
                    sum += u32::from(src.data[(sy * w + sx) as usize]);
                    count += 1;
                }
            }
            out[(y * w + x) as usize] = (sum / count) as u8;
        }
    }

    GrayImage {
        width: src.width,
        height: src.height,
        data: out,
    }
}

/// Binary threshold: pixels strictly above `level` become 255, the rest 0.
pub fn threshold_binary(src: &GrayImageView<'_>, level: u8) -> GrayImage {
    let data = src
        .data
        .iter()
        .map(|&v| if v > level { 255 } else { 0 })
        .collect();

    GrayImage {
        width: src.width,
        height: src.height,
        data,
    }
}

pub fn count_nonzero(src: &GrayImageView<'_>) -> usize {
    src.data.iter().filter(|&&v| v != 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_with(width: usize, height: usize, pixels: &[(usize, usize, u8)]) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for &(x, y, v) in pixels {
            img.data[y * width + x] = v;
        }
        img
    }

    #[test]
    fn absdiff_is_symmetric() {
        let a = image_with(4, 3, &[(1, 1, 200), (2, 0, 10)]);
        let b = image_with(4, 3, &[(1, 1, 50)]);

        let d1 = absdiff(&a.view(), &b.view());
        let d2 = absdiff(&b.view(), &a.view());
        assert_eq!(d1, d2);
        assert_eq!(d1.data[1 * 4 + 1], 150);
        assert_eq!(d1.data[2], 10);
        assert_eq!(count_nonzero(&d1.view()), 2);
    }

    #[test]
    fn blur_preserves_flat_regions() {
        let mut img = GrayImage::new(6, 6);
        img.data.fill(80);
        let blurred = box_blur(&img.view(), 2);
        assert!(blurred.data.iter().all(|&v| v == 80));
    }

    #[test]
    fn blur_spreads_an_impulse() {
        let img = image_with(7, 7, &[(3, 3, 255)]);
        let blurred = box_blur(&img.view(), 1);
        // 255 / 9 == 28 over the 3x3 neighborhood of the impulse.
        assert_eq!(blurred.data[3 * 7 + 3], 28);
        assert_eq!(blurred.data[2 * 7 + 2], 28);
        assert_eq!(blurred.data[0], 0);
    }

    #[test]
    fn threshold_counts_changed_pixels() {
        let img = image_with(3, 3, &[(0, 0, 61), (1, 1, 60), (2, 2, 255)]);
        let binary = threshold_binary(&img.view(), 60);
        assert_eq!(count_nonzero(&binary.view()), 2);
        assert_eq!(binary.data[0], 255);
        assert_eq!(binary.data[1 * 3 + 1], 0);
    }
}
