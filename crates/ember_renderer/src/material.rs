//! Surface shading.
//!
//! [`shade`] dispatches on the hit material's kind. Each kind has its own
//! shading function taking the scene, the incoming ray and the hit.

use ember_core::MaterialKind;
use ember_math::{Ray, Vec3, EPSILON};

use crate::{hit::HitRecord, renderer::ray_color, scene::Scene, Color, RenderConfig};

/// Color seen along `ray`, which hit the scene at `hit`.
///
/// Diffuse and constant surfaces always shade. Mirrors and glass hit by a
/// ray deeper than `config.max_depth` see the background instead of
/// spawning more rays.
pub fn shade(scene: &Scene, ray: &Ray, hit: &HitRecord, config: &RenderConfig) -> Color {
    let material = scene.material(hit.material);
    let normal = hit.normal(material.smooth_shading);

    match material.kind {
        MaterialKind::Diffuse { albedo } => shade_diffuse(scene, hit, normal, albedo, config),
        MaterialKind::Reflective { albedo } => {
            shade_reflective(scene, ray, hit, normal, albedo, config)
        }
        MaterialKind::Refractive { ior } => shade_refractive(scene, ray, hit, normal, ior, config),
        MaterialKind::Constant { albedo } => albedo,
    }
}

/// Direct lighting from every point light that isn't occluded.
pub fn shade_diffuse(
    scene: &Scene,
    hit: &HitRecord,
    normal: Vec3,
    albedo: Color,
    config: &RenderConfig,
) -> Color {
    let mut color = Color::ZERO;

    for light in scene.lights() {
        let to_light = light.position - hit.p;
        let distance = to_light.length();
        if distance <= 0.0 {
            continue;
        }
        let light_dir = to_light / distance;

        let cos_theta = light_dir.dot(normal).max(0.0);
        if cos_theta == 0.0 {
            continue;
        }

        let shadow_ray =
            Ray::new(hit.p + normal * config.shadow_bias, light_dir).with_max_distance(distance);
        if scene.intersect_any(&shadow_ray) {
            continue;
        }

        color += albedo * light.falloff(distance) * cos_theta;
    }

    color
}

/// Perfect mirror.
///
/// The albedo tints what the mirror reflects once. Mirror-to-mirror bounces
/// pass the color through untinted, so a hall of mirrors isn't darkened by
/// repeated multiplication.
pub fn shade_reflective(
    scene: &Scene,
    ray: &Ray,
    hit: &HitRecord,
    normal: Vec3,
    albedo: Color,
    config: &RenderConfig,
) -> Color {
    if ray.depth > config.max_depth {
        return scene.background();
    }

    let reflected = Ray::new(
        hit.p + normal * config.reflection_bias,
        reflect(ray.direction, normal),
    )
    .with_depth(ray.depth + 1);

    match scene.trace(&reflected) {
        Some(next) => {
            let color = shade(scene, &reflected, &next, config);
            match scene.material(next.material).kind {
                MaterialKind::Reflective { .. } => color,
                _ => albedo * color,
            }
        }
        None => albedo * scene.background(),
    }
}

/// Dielectric: Fresnel blend of the reflected and refracted colors.
///
/// Under total internal reflection only the reflected color is used.
pub fn shade_refractive(
    scene: &Scene,
    ray: &Ray,
    hit: &HitRecord,
    normal: Vec3,
    ior: f32,
    config: &RenderConfig,
) -> Color {
    if ray.depth > config.max_depth {
        return scene.background();
    }

    let mut n = normal;
    let mut cos_i = ray.direction.dot(n).clamp(-1.0, 1.0);
    let (mut eta_i, mut eta_t) = (1.0, ior);

    if cos_i > 0.0 {
        // Leaving the medium.
        std::mem::swap(&mut eta_i, &mut eta_t);
        n = -n;
    } else {
        cos_i = -cos_i;
    }

    let reflected = Ray::new(hit.p + n * config.reflection_bias, reflect(ray.direction, n))
        .with_depth(ray.depth + 1);
    let reflect_color = ray_color(scene, &reflected, config);

    let Some(direction) = refract(ray.direction, n, eta_i / eta_t, cos_i) else {
        return reflect_color;
    };

    let refracted =
        Ray::new(hit.p - n * config.refraction_bias, direction).with_depth(ray.depth + 1);
    let refract_color = ray_color(scene, &refracted, config);

    let kr = fresnel(ray.direction, n);
    reflect_color * kr + refract_color * (1.0 - kr)
}

/// Mirror `direction` about `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    (direction - 2.0 * direction.dot(normal) * normal).normalize()
}

/// Snell's law.
///
/// `normal` faces the incoming ray, `cos_i = -direction · normal >= 0` and
/// `eta` is the ratio of the incident to the transmitted index. Returns
/// `None` under total internal reflection, including exactly at the
/// critical angle.
#[inline]
pub fn refract(direction: Vec3, normal: Vec3, eta: f32, cos_i: f32) -> Option<Vec3> {
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < EPSILON {
        return None;
    }
    Some((eta * direction + (eta * cos_i - k.sqrt()) * normal).normalize())
}

/// Reflectance weight for a ray hitting a surface whose normal faces it.
///
/// `0.5 * (1 + d·n)^5`: head-on rays reflect little, grazing rays approach
/// one half.
#[inline]
pub fn fresnel(direction: Vec3, normal: Vec3) -> f32 {
    0.5 * (1.0 + direction.dot(normal)).powi(5)
}
