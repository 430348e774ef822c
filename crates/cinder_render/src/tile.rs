//! Tile-based work partitioning.
//!
//! Divides the image into fixed-size square tiles that can be rendered
//! independently and in parallel using rayon. Tiles never share pixels,
//! so workers need no pixel-level synchronization; claiming the next
//! tile is the only coordination point and rayon's work stealing over
//! the static tile list handles it.

use crate::renderer::{render_pixel, RenderConfig};
use crate::{Camera, Color, Scene};
use rand::RngCore;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner
    pub y: u32,
    /// Width of the tile in pixels
    pub width: u32,
    /// Height of the tile in pixels
    pub height: u32,
    /// Index of this tile in the render order
    pub index: usize,
}

impl Tile {
    /// Create a new tile.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this tile.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default tile size in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Generate tiles for an image, sorted in spiral order from center.
///
/// Tiles at the right/bottom edges are clipped to the image. The order
/// never affects output (tiles are independent); center-out just shows
/// the interesting part of a progressive preview first.
pub fn generate_tiles(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            let th = tile_size.min(height - y);
            tiles.push(Tile::new(x, y, tw, th, index));
            index += 1;
            x += tile_size;
        }
        y += tile_size;
    }

    sort_spiral(&mut tiles, width, height);

    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.index = i;
    }

    tiles
}

/// Sort tiles by distance from image center (spiral order).
fn sort_spiral(tiles: &mut [Tile], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    tiles.sort_by(|a, b| {
        let a_center_x = a.x as f32 + a.width as f32 / 2.0;
        let a_center_y = a.y as f32 + a.height as f32 / 2.0;
        let b_center_x = b.x as f32 + b.width as f32 / 2.0;
        let b_center_y = b.y as f32 + b.height as f32 / 2.0;

        let a_dist = (a_center_x - center_x).powi(2) + (a_center_y - center_y).powi(2);
        let b_dist = (b_center_x - center_x).powi(2) + (b_center_y - center_y).powi(2);

        a_dist.partial_cmp(&b_dist).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single tile into a private pixel buffer.
///
/// Returns linear colors in row-major order within the tile. The RNG is
/// owned by the calling worker; it is never shared across tiles.
pub fn render_tile(
    tile: &Tile,
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(tile.pixel_count() as usize);

    for local_y in 0..tile.height {
        for local_x in 0..tile.width {
            let global_x = tile.x + local_x;
            let global_y = tile.y + local_y;
            pixels.push(render_pixel(camera, scene, global_x, global_y, config, rng));
        }
    }

    pixels
}

/// Result of rendering a tile.
#[derive(Debug, Clone)]
pub struct TileResult {
    /// The tile that was rendered
    pub tile: Tile,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl TileResult {
    /// Create a new tile result.
    pub fn new(tile: Tile, pixels: Vec<Color>) -> Self {
        Self { tile, pixels }
    }
}
