//! Umbra Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over an immutable scene graph:
//! analytic primitives, instancing wrappers and participating media,
//! accelerated by a randomized-axis BVH.
//!
//! All randomness flows through an explicit `RngCore` so each render task
//! owns its own stream.

mod bucket;
mod bvh;
mod box_shape;
mod camera;
mod constant_medium;
mod hittable;
mod instance;
mod material;
mod perlin;
mod rect;
mod renderer;
pub mod sampling;
mod sphere;
mod texture;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{BuildError, BvhNode};
pub use box_shape::BoxShape;
pub use camera::Camera;
pub use constant_medium::ConstantMedium;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use instance::{RotateY, Translate};
pub use material::{
    Color, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult,
};
pub use perlin::Perlin;
pub use rect::AaRect;
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render, render_pixel, ImageBuffer, PixelEstimate,
    RenderConfig,
};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture};

/// Re-export Vec3 and common math types from umbra_math
pub use umbra_math::{Aabb, Interval, Ray, Vec3};

/// Lower bound of the ray interval for secondary rays, avoids self-intersection.
pub const RAY_EPSILON: f32 = 0.001;
