//! Cornell-box style demo.
//!
//! Builds the classic box from the triangle arena, drops in a mirror
//! sphere and a glossy block, renders with the MIS estimator and writes
//! a binary PPM.

use anyhow::{Context, Result};
use cinder_render::{
    render, BoxShape, Camera, Color, Estimator, Material, RenderConfig, Scene, Sphere, Triangle,
    Vec3,
};
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() -> Result<()> {
    env_logger::init();

    let start = std::time::Instant::now();
    let scene = build_scene()?;
    println!("Scene built in {:?}", start.elapsed());

    let mut camera = Camera::new()
        .with_resolution(640, 640)
        .with_position(
            Vec3::new(0.0, 1.0, 3.4),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Y,
        )
        .with_vfov(40.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: 256,
        max_depth: 5,
        estimator: Estimator::Mis,
        ..RenderConfig::default()
    };

    println!(
        "Rendering {}x{} @ {} spp...",
        camera.image_width, camera.image_height, config.samples_per_pixel
    );

    let start = std::time::Instant::now();
    let image = render(&camera, &scene, &config)?;
    println!("Rendered in {:?}", start.elapsed());

    let filename = "cornell.ppm";
    save_ppm(&image.to_rgb(), camera.image_width, camera.image_height, filename)
        .context("failed to save image")?;
    println!("Saved to {filename}");

    Ok(())
}

/// Two triangles covering the quad (a, b, c, d), counter-clockwise.
fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: u32) -> [Triangle; 2] {
    [
        Triangle::new(a, b, c, material),
        Triangle::new(a, c, d, material),
    ]
}

fn build_scene() -> Result<Scene> {
    const WHITE: u32 = 0;
    const RED: u32 = 1;
    const GREEN: u32 = 2;
    const LIGHT: u32 = 3;
    const MIRROR: u32 = 4;
    const GLOSSY: u32 = 5;

    let materials = vec![
        Material::lambertian(Color::new(0.73, 0.73, 0.73)),
        Material::lambertian(Color::new(0.65, 0.05, 0.05)),
        Material::lambertian(Color::new(0.12, 0.45, 0.15)),
        Material::emissive(Color::new(15.0, 15.0, 15.0)),
        Material::mirror(Color::new(0.95, 0.95, 0.95)),
        Material::phong(Color::new(0.8, 0.7, 0.5), 80.0),
    ];

    // Box interior: x in [-1,1], y in [0,2], z in [-1,1], open toward +z
    let (l, r, b, t, back, front) = (-1.0, 1.0, 0.0, 2.0, -1.0, 1.0);
    let mut triangles = Vec::new();

    // Floor, ceiling, back wall
    triangles.extend(quad(
        Vec3::new(l, b, back),
        Vec3::new(r, b, back),
        Vec3::new(r, b, front),
        Vec3::new(l, b, front),
        WHITE,
    ));
    triangles.extend(quad(
        Vec3::new(l, t, back),
        Vec3::new(l, t, front),
        Vec3::new(r, t, front),
        Vec3::new(r, t, back),
        WHITE,
    ));
    triangles.extend(quad(
        Vec3::new(l, b, back),
        Vec3::new(l, t, back),
        Vec3::new(r, t, back),
        Vec3::new(r, b, back),
        WHITE,
    ));

    // Colored side walls
    triangles.extend(quad(
        Vec3::new(l, b, back),
        Vec3::new(l, b, front),
        Vec3::new(l, t, front),
        Vec3::new(l, t, back),
        RED,
    ));
    triangles.extend(quad(
        Vec3::new(r, b, back),
        Vec3::new(r, t, back),
        Vec3::new(r, t, front),
        Vec3::new(r, b, front),
        GREEN,
    ));

    // Ceiling light panel, slightly below the ceiling
    triangles.extend(quad(
        Vec3::new(-0.3, t - 0.01, -0.3),
        Vec3::new(-0.3, t - 0.01, 0.3),
        Vec3::new(0.3, t - 0.01, 0.3),
        Vec3::new(0.3, t - 0.01, -0.3),
        LIGHT,
    ));

    let spheres = vec![Sphere::new(Vec3::new(-0.45, 0.35, -0.3), 0.35, MIRROR)];
    let boxes = vec![BoxShape::new(
        Vec3::new(0.15, 0.0, -0.55),
        Vec3::new(0.75, 0.8, 0.05),
        GLOSSY,
    )];

    Ok(Scene::new(triangles, spheres, boxes, materials)?)
}

fn save_ppm(rgb: &[u8], width: u32, height: u32, path: &str) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write!(writer, "P6\n{width} {height}\n255\n")?;
    writer.write_all(rgb)?;
    writer.flush()
}
