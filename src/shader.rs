//! Per-pixel and per-vertex shading strategies over one lighting model.

use glam::Vec3;

use crate::{
    color::Color,
    math::vec::{RgbAsVec3Ext, Vec3AsRgbExt},
    scene::{Material, PointLight},
};

/// Phong illumination at a surface point: ambient plus, per light, a
/// diffuse and a half-vector specular term with quadratic distance
/// attenuation. The result is clamped per channel to [0, 1].
pub fn lighting(
    point: Vec3,
    normal: Vec3,
    material: &Material,
    lights: &[PointLight],
    eye: Vec3,
) -> Color {
    let eye_dir = (eye - point).normalize_or_zero();
    let mut diffuse_sum = Vec3::ZERO;
    let mut specular_sum = Vec3::ZERO;

    for light in lights {
        let to_light = light.position - point;
        let distance = to_light.length();
        let light_dir = to_light.normalize_or_zero();
        let attenuation = 1.0 / (1.0 + light.k * distance * distance);

        diffuse_sum += light.color * normal.dot(light_dir).max(0.0) * attenuation;

        let half_vector = (eye_dir + light_dir).normalize_or_zero();
        specular_sum += light.color
            * normal.dot(half_vector).max(0.0).powf(material.shininess)
            * attenuation;
    }

    let color =
        material.ambient + diffuse_sum * material.diffuse + specular_sum * material.specular;
    color.clamp(Vec3::ZERO, Vec3::ONE).rgb()
}

/// One shading strategy: fed triangle data once per rasterized triangle,
/// then asked for a color once per covered pixel.
pub trait Shader {
    fn new_triangle(&mut self, positions: [Vec3; 3], normals: [Vec3; 3]);
    fn compute_color(&self, alpha: f32, beta: f32, gamma: f32) -> Color;
}

/// Per-vertex lighting, blended linearly across the triangle interior.
pub struct Gouraud<'a> {
    material: &'a Material,
    lights: &'a [PointLight],
    eye: Vec3,
    colors: [Vec3; 3],
}

impl<'a> Gouraud<'a> {
    pub fn new(material: &'a Material, lights: &'a [PointLight], eye: Vec3) -> Self {
        Self {
            material,
            lights,
            eye,
            colors: [Vec3::ZERO; 3],
        }
    }
}

impl Shader for Gouraud<'_> {
    fn new_triangle(&mut self, positions: [Vec3; 3], normals: [Vec3; 3]) {
        for i in 0..3 {
            self.colors[i] =
                lighting(positions[i], normals[i], self.material, self.lights, self.eye).vec();
        }
    }

    fn compute_color(&self, alpha: f32, beta: f32, gamma: f32) -> Color {
        (self.colors[0] * alpha + self.colors[1] * beta + self.colors[2] * gamma).rgb()
    }
}

/// Per-pixel lighting on the interpolated position and re-normalized
/// interpolated normal.
pub struct Phong<'a> {
    material: &'a Material,
    lights: &'a [PointLight],
    eye: Vec3,
    positions: [Vec3; 3],
    normals: [Vec3; 3],
}

impl<'a> Phong<'a> {
    pub fn new(material: &'a Material, lights: &'a [PointLight], eye: Vec3) -> Self {
        Self {
            material,
            lights,
            eye,
            positions: [Vec3::ZERO; 3],
            normals: [Vec3::ZERO; 3],
        }
    }
}

impl Shader for Phong<'_> {
    fn new_triangle(&mut self, positions: [Vec3; 3], normals: [Vec3; 3]) {
        self.positions = positions;
        self.normals = normals;
    }

    fn compute_color(&self, alpha: f32, beta: f32, gamma: f32) -> Color {
        let [na, nb, nc] = self.normals;
        let [va, vb, vc] = self.positions;
        let normal = (na * alpha + nb * beta + nc * gamma).normalize_or_zero();
        let point = va * alpha + vb * beta + vc * gamma;
        lighting(point, normal, self.material, self.lights, self.eye)
    }
}
