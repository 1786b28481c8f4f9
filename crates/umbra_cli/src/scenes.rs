//! Demo scenes selectable from the command line.

use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use log::{info, warn};
use rand::RngCore;
use umbra_core::TextureCache;
use umbra_renderer::sampling::{gen_f32, gen_range_f32, random_vec3};
use umbra_renderer::{
    AaRect, BoxShape, BuildError, BvhNode, Camera, CheckerTexture, Color, ConstantMedium,
    Dielectric, DiffuseLight, Hittable, HittableList, ImageTexture, Lambertian, Material, Metal,
    MovingSphere, NoiseTexture, RotateY, Sphere, Texture, Translate, Vec3,
};

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Ground plane covered in small random spheres, some moving
    RandomSpheres,
    /// Two large checkered spheres
    TwoSpheres,
    /// Marble-like Perlin noise on a ground sphere and a ball
    TwoPerlinSpheres,
    /// Image-mapped globe
    Earth,
    /// Perlin spheres lit by a rectangular area light
    SimpleLight,
    /// Cornell box with two rotated blocks
    CornellBox,
    /// Cornell box with blocks of smoke and fog
    CornellSmoke,
    /// Every feature at once
    Final,
}

/// Everything the renderer needs for one frame.
pub struct Scene {
    pub world: Arc<dyn Hittable>,
    pub camera: Camera,
    pub background: Color,
}

/// Viewpoint and lens for a scene.
struct View {
    look_from: Vec3,
    look_at: Vec3,
    vfov: f32,
    aperture: f32,
    focus_dist: f32,
    aspect_ratio: f32,
}

impl View {
    fn looking(look_from: Vec3, look_at: Vec3, vfov: f32) -> Self {
        Self {
            look_from,
            look_at,
            vfov,
            aperture: 0.0,
            focus_dist: 10.0,
            aspect_ratio: 16.0 / 9.0,
        }
    }

    fn square(mut self) -> Self {
        self.aspect_ratio = 1.0;
        self
    }

    fn camera(&self, width: u32) -> Camera {
        let height = ((width as f32 / self.aspect_ratio) as u32).max(1);
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(self.look_from, self.look_at, Vec3::Y)
            .with_lens(self.vfov, self.aperture, self.focus_dist)
            .with_shutter(0.0, 1.0);
        camera.initialize();
        camera
    }
}

const SKY: Color = Color::new(0.7, 0.8, 1.0);

/// Build `kind` for an image `width` pixels wide.
pub fn build_scene(
    kind: SceneKind,
    width: u32,
    texture_path: &Path,
    rng: &mut dyn RngCore,
) -> Result<Scene, BuildError> {
    let mut textures = TextureCache::new();

    let (objects, view, background) = match kind {
        SceneKind::RandomSpheres => {
            let mut view = View::looking(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0);
            view.aperture = 0.1;
            view.aspect_ratio = 3.0 / 2.0;
            (random_spheres(rng), view, SKY)
        }
        SceneKind::TwoSpheres => (
            two_spheres(),
            View::looking(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0),
            SKY,
        ),
        SceneKind::TwoPerlinSpheres => (
            two_perlin_spheres(rng),
            View::looking(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0),
            SKY,
        ),
        SceneKind::Earth => (
            earth(&mut textures, texture_path),
            View::looking(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0),
            SKY,
        ),
        SceneKind::SimpleLight => (
            simple_light(rng),
            View::looking(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), 20.0),
            Color::ZERO,
        ),
        SceneKind::CornellBox => (
            cornell_box(),
            View::looking(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), 40.0)
                .square(),
            Color::ZERO,
        ),
        SceneKind::CornellSmoke => (
            cornell_smoke(),
            View::looking(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), 40.0)
                .square(),
            Color::ZERO,
        ),
        SceneKind::Final => (
            final_scene(&mut textures, texture_path, rng)?,
            View::looking(Vec3::new(478.0, 278.0, -600.0), Vec3::new(278.0, 278.0, 0.0), 40.0)
                .square(),
            Color::ZERO,
        ),
    };

    info!("Scene {:?}: {} top-level objects", kind, objects.len());
    let world = BvhNode::new(objects.into_objects(), 0.0, 1.0, rng)?;

    Ok(Scene {
        world: Arc::new(world),
        camera: view.camera(width),
        background,
    })
}

fn lambertian(color: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(color))
}

fn light(intensity: f32) -> Arc<dyn Material> {
    Arc::new(DiffuseLight::from_color(Color::splat(intensity)))
}

/// Image texture from the shared cache, or the debug color if unreadable.
fn image_texture(textures: &mut TextureCache, path: &Path) -> Arc<dyn Texture> {
    match textures.load(path) {
        Ok(image) => Arc::new(ImageTexture::new(image)),
        Err(err) => {
            warn!("{err}; image texture will render as cyan");
            Arc::new(ImageTexture::missing())
        }
    }
}

fn random_spheres(rng: &mut dyn RngCore) -> HittableList {
    let mut world = HittableList::new();

    let checker: Arc<dyn Texture> = Arc::new(CheckerTexture::from_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::splat(0.9),
    ));
    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(checker)),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                let center1 = center + Vec3::new(0.0, gen_range_f32(rng, 0.0, 0.5), 0.0);
                world.add(Arc::new(MovingSphere::new(
                    center,
                    center1,
                    0.0,
                    1.0,
                    0.2,
                    lambertian(albedo),
                )));
            } else if choose_mat < 0.95 {
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range_f32(rng, 0.0, 0.5);
                world.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz)))));
            } else {
                world.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5)))));
            }
        }
    }

    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Arc::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Color::new(0.4, 0.2, 0.1)),
    )));
    world.add(Arc::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    world
}

fn two_spheres() -> HittableList {
    let checker: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(
        CheckerTexture::from_colors(Color::new(0.2, 0.3, 0.1), Color::splat(0.9)),
    )));

    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, -10.0, 0.0), 10.0, checker.clone())));
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, 10.0, 0.0), 10.0, checker)));
    world
}

fn two_perlin_spheres(rng: &mut dyn RngCore) -> HittableList {
    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(NoiseTexture::new(4.0, rng))));

    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone())));
    world.add(Arc::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble)));
    world
}

fn earth(textures: &mut TextureCache, texture_path: &Path) -> HittableList {
    let surface = Arc::new(Lambertian::new(image_texture(textures, texture_path)));

    let mut world = HittableList::new();
    world.add(Arc::new(Sphere::new(Vec3::ZERO, 2.0, surface)));
    world
}

fn simple_light(rng: &mut dyn RngCore) -> HittableList {
    let mut world = two_perlin_spheres(rng);
    world.add(Arc::new(AaRect::xy(3.0, 5.0, 1.0, 3.0, -2.0, light(4.0))));
    world
}

/// Walls and ceiling light shared by both Cornell variants.
fn cornell_walls(light_intensity: f32, light_rect: (f32, f32, f32, f32)) -> (HittableList, Arc<dyn Material>) {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::splat(0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));
    let (x0, x1, z0, z1) = light_rect;

    let mut world = HittableList::new();
    world.add(Arc::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    world.add(Arc::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    world.add(Arc::new(AaRect::xz(x0, x1, z0, z1, 554.0, light(light_intensity))));
    world.add(Arc::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    world.add(Arc::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    world.add(Arc::new(AaRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    (world, white)
}

/// Box from the origin to `size`, turned about Y and moved into place.
fn placed_box(size: Vec3, angle: f32, offset: Vec3, material: Arc<dyn Material>) -> Arc<dyn Hittable> {
    let shape: Arc<dyn Hittable> = Arc::new(BoxShape::new(Vec3::ZERO, size, material));
    let rotated: Arc<dyn Hittable> = Arc::new(RotateY::new(shape, angle));
    Arc::new(Translate::new(rotated, offset))
}

fn cornell_box() -> HittableList {
    let (mut world, white) = cornell_walls(15.0, (213.0, 343.0, 227.0, 332.0));

    world.add(placed_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white.clone(),
    ));
    world.add(placed_box(
        Vec3::new(165.0, 165.0, 165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white,
    ));
    world
}

fn cornell_smoke() -> HittableList {
    let (mut world, white) = cornell_walls(7.0, (113.0, 443.0, 127.0, 432.0));

    let tall = placed_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white.clone(),
    );
    let short = placed_box(
        Vec3::new(165.0, 165.0, 165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white,
    );

    world.add(Arc::new(ConstantMedium::with_color(tall, 0.01, Color::ZERO)));
    world.add(Arc::new(ConstantMedium::with_color(short, 0.01, Color::ONE)));
    world
}

fn final_scene(
    textures: &mut TextureCache,
    texture_path: &Path,
    rng: &mut dyn RngCore,
) -> Result<HittableList, BuildError> {
    let ground = lambertian(Color::new(0.48, 0.83, 0.53));

    let boxes_per_side = 20;
    let mut boxes: Vec<Arc<dyn Hittable>> = Vec::with_capacity(boxes_per_side * boxes_per_side);
    for i in 0..boxes_per_side {
        for j in 0..boxes_per_side {
            let w = 100.0;
            let x0 = -1000.0 + i as f32 * w;
            let z0 = -1000.0 + j as f32 * w;
            let y1 = gen_range_f32(rng, 1.0, 101.0);
            boxes.push(Arc::new(BoxShape::new(
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            )));
        }
    }

    let mut world = HittableList::new();
    world.add(Arc::new(BvhNode::new(boxes, 0.0, 1.0, rng)?));

    world.add(Arc::new(AaRect::xz(123.0, 423.0, 147.0, 412.0, 554.0, light(7.0))));

    let center0 = Vec3::new(400.0, 400.0, 200.0);
    let center1 = center0 + Vec3::new(30.0, 0.0, 0.0);
    world.add(Arc::new(MovingSphere::new(
        center0,
        center1,
        0.0,
        1.0,
        50.0,
        lambertian(Color::new(0.7, 0.3, 0.1)),
    )));

    world.add(Arc::new(Sphere::new(
        Vec3::new(260.0, 150.0, 45.0),
        50.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0)),
    )));

    // Glass ball filled with blue haze
    let boundary: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::new(360.0, 150.0, 145.0),
        70.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    world.add(boundary.clone());
    world.add(Arc::new(ConstantMedium::with_color(
        boundary,
        0.2,
        Color::new(0.2, 0.4, 0.9),
    )));

    // Thin mist over everything
    let mist: Arc<dyn Hittable> = Arc::new(Sphere::new(Vec3::ZERO, 5000.0, Arc::new(Dielectric::new(1.5))));
    world.add(Arc::new(ConstantMedium::with_color(mist, 0.0001, Color::ONE)));

    let globe = Arc::new(Lambertian::new(image_texture(textures, texture_path)));
    world.add(Arc::new(Sphere::new(Vec3::new(400.0, 200.0, 400.0), 100.0, globe)));

    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(NoiseTexture::new(0.1, rng))));
    world.add(Arc::new(Sphere::new(Vec3::new(220.0, 280.0, 300.0), 80.0, marble)));

    let white = lambertian(Color::splat(0.73));
    let cluster: Vec<Arc<dyn Hittable>> = (0..1000)
        .map(|_| {
            Arc::new(Sphere::new(random_vec3(rng, 0.0, 165.0), 10.0, white.clone())) as Arc<dyn Hittable>
        })
        .collect();
    let cluster: Arc<dyn Hittable> = Arc::new(BvhNode::new(cluster, 0.0, 1.0, rng)?);
    world.add(Arc::new(Translate::new(
        Arc::new(RotateY::new(cluster, 15.0)),
        Vec3::new(-100.0, 270.0, 395.0),
    )));

    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_renderer::{ray_color, Interval, Ray};

    const ALL: [SceneKind; 8] = [
        SceneKind::RandomSpheres,
        SceneKind::TwoSpheres,
        SceneKind::TwoPerlinSpheres,
        SceneKind::Earth,
        SceneKind::SimpleLight,
        SceneKind::CornellBox,
        SceneKind::CornellSmoke,
        SceneKind::Final,
    ];

    fn missing_texture() -> &'static Path {
        Path::new("does/not/exist/earthmap.jpg")
    }

    #[test]
    fn test_every_scene_builds() {
        for kind in ALL {
            let mut rng = StdRng::seed_from_u64(3);
            let scene = build_scene(kind, 64, missing_texture(), &mut rng).unwrap();

            assert_eq!(scene.camera.image_width, 64);
            assert!(scene.camera.image_height > 0);
            assert!(scene.world.bounding_box(0.0, 1.0).is_some());
        }
    }

    #[test]
    fn test_scene_names_match_cli() {
        let names: Vec<String> = ALL
            .iter()
            .filter_map(|kind| kind.to_possible_value())
            .map(|value| value.get_name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "random-spheres",
                "two-spheres",
                "two-perlin-spheres",
                "earth",
                "simple-light",
                "cornell-box",
                "cornell-smoke",
                "final"
            ]
        );
    }

    #[test]
    fn test_cornell_box_is_square_and_closed() {
        let mut rng = StdRng::seed_from_u64(0);
        let scene = build_scene(SceneKind::CornellBox, 50, missing_texture(), &mut rng).unwrap();
        assert_eq!(scene.camera.image_height, 50);

        // From the middle of the box every direction hits a wall
        let origin = Vec3::new(278.0, 278.0, 278.0);
        for dir in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z] {
            let ray = Ray::new(origin, dir, 0.0);
            assert!(scene
                .world
                .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
                .is_some());
        }
    }

    #[test]
    fn test_ceiling_light_is_visible() {
        let mut rng = StdRng::seed_from_u64(0);
        let scene = build_scene(SceneKind::CornellBox, 50, missing_texture(), &mut rng).unwrap();

        let ray = Ray::new(Vec3::new(278.0, 500.0, 280.0), Vec3::Y, 0.0);
        let color = ray_color(&ray, scene.background, scene.world.as_ref(), 5, &mut rng);
        assert!((color - Color::splat(15.0)).length() < 1e-4);
    }
}
