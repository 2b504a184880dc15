pub mod parser;

use std::{io, path::Path, path::PathBuf};

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::{
    math::transform::{self, TransformError},
    mesh::{Mesh, MeshHandle},
};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("could not open scene file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Point light with quadratic distance attenuation `1 / (1 + k d^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub k: f32,
}

impl PointLight {
    /// Parse a `light x y z , r g b , k` declaration. Returns `None` when
    /// the line is not a light declaration at all.
    fn parse(line: &str) -> Option<PointLight> {
        let mut tokens = line
            .split_whitespace()
            .map(|t| t.trim_matches(','))
            .filter(|t| !t.is_empty());

        if tokens.next() != Some("light") {
            return None;
        }

        let mut next = || tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0.0);
        let position = Vec3::new(next(), next(), next());
        let color = Vec3::new(next(), next(), next());
        let k = next();
        Some(PointLight { position, color, k })
    }
}

/// Phong material: per-channel reflectances in [0, 1] and a shininess
/// exponent. The default reflects light diffusely with no ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ZERO,
            shininess: 0.0,
        }
    }
}

/// Camera with an axis-angle orientation and an off-axis perspective
/// frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub axis: Vec3,
    pub angle: f32,
    pub near: f32,
    pub far: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            axis: Vec3::Z,
            angle: 0.0,
            near: 1.0,
            far: 10.0,
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
        }
    }
}

impl Camera {
    /// Apply one named field line (`position x y z`, `near n`, ...).
    /// Unrecognized field names are ignored.
    fn fill_field(&mut self, line: &str) {
        let mut tokens = line.split_whitespace();
        let Some(field) = tokens.next() else { return };
        let mut next = || tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0.0);

        match field {
            "position" => self.position = Vec3::new(next(), next(), next()),
            "orientation" => {
                self.axis = Vec3::new(next(), next(), next());
                self.angle = next();
            }
            "near" => self.near = next(),
            "far" => self.far = next(),
            "left" => self.left = next(),
            "right" => self.right = next(),
            "top" => self.top = next(),
            "bottom" => self.bottom = next(),
            _ => {}
        }
    }

    /// Camera-to-world transform: translate to the camera position, oriented
    /// by the axis-angle rotation. A zero-length axis degrades to no
    /// rotation.
    pub fn camera_to_world(&self) -> Mat4 {
        let rotation = transform::rotation(self.axis, self.angle).unwrap_or(Mat4::IDENTITY);
        transform::translation(self.position.x, self.position.y, self.position.z) * rotation
    }

    pub fn projection(&self) -> Result<Mat4, TransformError> {
        transform::perspective(
            self.near,
            self.far,
            self.left,
            self.right,
            self.top,
            self.bottom,
        )
    }

    /// World space to clip space.
    pub fn view_projection(&self) -> Result<Mat4, TransformError> {
        Ok(self.projection()? * self.camera_to_world().inverse())
    }
}

/// One instance of a mesh placed in the scene. Instances referencing an
/// undeclared mesh label carry no handle and rasterize to nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub mesh: Option<MeshHandle>,
    pub transform: Mat4,
    pub material: Material,
}

impl Object {
    fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            transform: Mat4::IDENTITY,
            material: Material::default(),
        }
    }
}

/// A render-ready scene: camera, lights and object instances, plus the
/// arena of meshes the instances point into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub lights: Vec<PointLight>,
    pub objects: Vec<Object>,
    meshes: Vec<Mesh>,
}

impl Scene {
    /// Read and assemble a scene description file. Mesh-load and
    /// unknown-label problems are reported and skipped; only failing to
    /// read the scene file itself is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Scene::parse(&text, path.parent()))
    }

    /// Assemble a scene from description text. `base_dir` is the fallback
    /// directory for mesh files named by relative paths.
    pub fn parse(text: &str, base_dir: Option<&Path>) -> Scene {
        let mut parser = parser::Parser::new(base_dir);
        for line in text.lines() {
            parser.line(line.trim_end_matches('\r'));
        }
        parser.finish()
    }

    pub fn mesh(&self, handle: MeshHandle) -> &Mesh {
        &self.meshes[handle.0]
    }

    /// Insert a mesh into the arena and return its handle.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle(self.meshes.len() - 1)
    }
}
