//! Synthetic stereo pairs shared by the integration tests.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereocorr::{OwnedImage, Vec2};

/// Margin of the noise field around the visible image.
const FIELD_PAD: usize = 24;

/// Left/right images where left pixel `p` matches right pixel `p + shift`.
pub struct StereoPair {
    pub left: OwnedImage,
    pub right: OwnedImage,
}

/// Lightly smoothed uniform noise in `[0, 255)`.
pub fn noise_field(width: usize, height: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let raw: Vec<f32> = (0..width * height)
        .map(|_| rng.random_range(0.0f32..255.0))
        .collect();
    let at = |x: usize, y: usize| raw[y.min(height - 1) * width + x.min(width - 1)];
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (xm, ym) = (x.saturating_sub(1), y.saturating_sub(1));
            let sum = 4.0 * at(x, y) + at(xm, y) + at(x + 1, y) + at(x, ym) + at(x, y + 1);
            out.push(sum / 8.0);
        }
    }
    out
}

/// Builds a `width x height` pair with a constant displacement.
pub fn shifted_pair(width: usize, height: usize, shift: Vec2, seed: u64) -> StereoPair {
    let fw = width + 2 * FIELD_PAD;
    let fh = height + 2 * FIELD_PAD;
    let field = noise_field(fw, fh, seed);
    let sample = |x: i32, y: i32| {
        let fx = (x + FIELD_PAD as i32) as usize;
        let fy = (y + FIELD_PAD as i32) as usize;
        field[fy * fw + fx]
    };
    let mut left = Vec::with_capacity(width * height);
    let mut right = Vec::with_capacity(width * height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            left.push(sample(x, y));
            right.push(sample(x - shift.x, y - shift.y));
        }
    }
    StereoPair {
        left: OwnedImage::new(left, width, height).unwrap(),
        right: OwnedImage::new(right, width, height).unwrap(),
    }
}

/// Two unrelated noise images.
pub fn unrelated_pair(width: usize, height: usize, seed: u64) -> StereoPair {
    StereoPair {
        left: OwnedImage::new(noise_field(width, height, seed), width, height).unwrap(),
        right: OwnedImage::new(noise_field(width, height, seed + 1), width, height).unwrap(),
    }
}
