//! Render drivers: per-pixel sampling, image buffer, and the parallel
//! tile renderer.
//!
//! The per-pixel contract: average `samples_per_pixel` radiance
//! estimates, then gamma-correct (sqrt) and quantize to 8-bit when
//! exporting bytes. The parallel driver hands the static tile list to a
//! rayon pool; each worker owns a private tile buffer and an RNG seeded
//! from the render seed and the tile index, so output is deterministic
//! for a fixed seed regardless of scheduling.

use crate::{
    error::RenderError,
    integrator::{radiance, Estimator},
    tile::{generate_tiles, render_tile, TileResult, DEFAULT_TILE_SIZE},
    Camera, Color, Scene,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing and Monte Carlo averaging
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Which light-transport estimator to run
    pub estimator: Estimator,
    /// Background color when a ray escapes the scene
    pub background: Color,
    /// Whether to use a sky gradient instead of the solid background
    pub use_sky_gradient: bool,
    /// Base seed for the per-tile generators
    pub seed: u64,
    /// Worker thread count; `None` uses all available parallelism
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 64,
            max_depth: 5,
            estimator: Estimator::Mis,
            background: Color::ZERO,
            use_sky_gradient: false,
            seed: 0,
            threads: None,
        }
    }
}

/// Render a single pixel with multi-sampling.
///
/// Returns the linear radiance average; gamma and quantization happen
/// once per pixel at byte export.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += radiance(scene, &ray, config, rng);
    }

    pixel_color / config.samples_per_pixel as f32
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b]
}

/// Image buffer holding linear radiance per pixel.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Write a tile's pixels at its position.
    pub fn blit(&mut self, result: &TileResult) {
        let tile = result.tile;
        for local_y in 0..tile.height {
            for local_x in 0..tile.width {
                let color = result.pixels[(local_y * tile.width + local_x) as usize];
                self.set(tile.x + local_x, tile.y + local_y, color);
            }
        }
    }

    /// Convert to gamma-corrected RGB bytes.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 3) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*color));
        }
        bytes
    }
}

fn validate(camera: &Camera, config: &RenderConfig) -> Result<(), RenderError> {
    if camera.image_width == 0 || camera.image_height == 0 {
        return Err(RenderError::InvalidResolution {
            width: camera.image_width,
            height: camera.image_height,
        });
    }
    if config.samples_per_pixel == 0 {
        return Err(RenderError::NoSamples);
    }
    Ok(())
}

/// Derive a well-mixed per-tile seed from the base seed.
///
/// splitmix64 finalizer; adjacent tile indices must not produce
/// correlated generator states.
fn tile_seed(base: u64, tile_index: usize) -> u64 {
    let mut z = base.wrapping_add((tile_index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Render the scene in parallel over tiles.
///
/// Every tile is rendered exactly once; a worker that finishes early
/// steals the next unclaimed tile from the static list. The scene is
/// shared by reference across workers, read-only, without locks.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
) -> Result<ImageBuffer, RenderError> {
    validate(camera, config)?;

    let tiles = generate_tiles(camera.image_width, camera.image_height, DEFAULT_TILE_SIZE);

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = config.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    log::info!(
        "rendering {}x{} @ {} spp, {:?} estimator, {} tiles on {} threads",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        config.estimator,
        tiles.len(),
        pool.current_num_threads()
    );

    let results: Vec<TileResult> = pool.install(|| {
        tiles
            .par_iter()
            .map(|tile| {
                let mut rng = StdRng::seed_from_u64(tile_seed(config.seed, tile.index));
                TileResult::new(*tile, render_tile(tile, camera, scene, config, &mut rng))
            })
            .collect()
    });

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        image.blit(result);
    }
    Ok(image)
}

/// Render the scene single-threaded with one RNG.
///
/// Simpler driver for tests and debugging.
pub fn render_image(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Result<ImageBuffer, RenderError> {
    validate(camera, config)?;

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, scene, x, y, config, rng);
            image.set(x, y, color);
        }
    }
    Ok(image)
}
