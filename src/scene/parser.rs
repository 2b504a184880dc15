//! Line-driven state machine assembling a [`Scene`] from description text.
//!
//! The grammar is blank-line delimited: camera fields and light
//! declarations, an `objects:` header followed by label/mesh-file
//! associations, then one section per object instance holding transform and
//! material directives.

use std::{collections::HashMap, path::Path};

use glam::{Mat4, Vec3};

use crate::{
    math::transform,
    mesh::{Mesh, MeshHandle},
    scene::{Object, PointLight, Scene},
};

/// Sentinel line ending the camera/lights section.
const OBJECTS_HEADER: &str = "objects:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    CameraAndLights,
    FilesHeader,
    Files,
    WaitSection,
    NewSection,
    GettingTransform,
    OneSectionEnd,
}

/// Pure transition function; the line's content is handled separately, in
/// the state this returns.
pub fn transition(state: State, line: &str) -> State {
    let blank = line.is_empty();
    match state {
        State::CameraAndLights if line == OBJECTS_HEADER => State::FilesHeader,
        State::CameraAndLights => state,
        State::FilesHeader => State::Files,
        State::Files if blank => State::WaitSection,
        State::Files => state,
        State::WaitSection if blank => state,
        State::WaitSection => State::NewSection,
        State::NewSection => State::GettingTransform,
        State::GettingTransform if blank => State::OneSectionEnd,
        State::GettingTransform => state,
        State::OneSectionEnd if blank => State::WaitSection,
        State::OneSectionEnd => State::NewSection,
    }
}

struct Association {
    mesh: MeshHandle,
    copies: usize,
}

/// Parser context threaded through each line; nothing survives past
/// [`Parser::finish`].
pub struct Parser<'a> {
    state: State,
    base_dir: Option<&'a Path>,
    scene: Scene,
    associations: HashMap<String, Association>,
    current: Option<Object>,
}

impl<'a> Parser<'a> {
    pub fn new(base_dir: Option<&'a Path>) -> Self {
        Self {
            state: State::CameraAndLights,
            base_dir,
            scene: Scene::default(),
            associations: HashMap::new(),
            current: None,
        }
    }

    /// Feed one line (without its terminator).
    pub fn line(&mut self, line: &str) {
        self.state = transition(self.state, line);

        match self.state {
            State::CameraAndLights => match PointLight::parse(line) {
                Some(light) => self.scene.lights.push(light),
                None => self.scene.camera.fill_field(line),
            },
            State::FilesHeader | State::WaitSection => {}
            State::Files => self.file_association(line),
            State::NewSection => self.begin_section(line),
            State::GettingTransform => self.section_directive(line),
            State::OneSectionEnd => self.end_section(),
        }
    }

    /// Finalize the scene. A section still open at end of input is appended
    /// without requiring a trailing blank line.
    pub fn finish(mut self) -> Scene {
        if self.state == State::GettingTransform {
            self.end_section();
        }
        self.scene
    }

    /// `label filename`: load the mesh from the literal path, falling back
    /// to a path relative to the scene file. Both failing skips the
    /// association without aborting the parse.
    fn file_association(&mut self, line: &str) {
        let mut tokens = line.split_whitespace();
        let (Some(label), Some(filename)) = (tokens.next(), tokens.next()) else {
            log::error!("malformed file association line: {line:?}");
            return;
        };

        let mesh = Mesh::load(filename).or_else(|err| match self.base_dir {
            Some(dir) => Mesh::load(dir.join(filename)),
            None => Err(err),
        });

        match mesh {
            Ok(mesh) => {
                let mesh = self.scene.add_mesh(mesh);
                self.associations
                    .insert(label.to_string(), Association { mesh, copies: 1 });
            }
            Err(err) => log::error!("could not load mesh file {filename}: {err}"),
        }
    }

    /// A section's opening line names a declared label; instantiate a fresh
    /// copy of the associated mesh. An undeclared label still opens a
    /// section so the directives that follow stay consumed, but the object
    /// gets no geometry.
    fn begin_section(&mut self, line: &str) {
        let label = line.split_whitespace().next().unwrap_or_default();

        self.current = Some(match self.associations.get_mut(label) {
            Some(association) => {
                let name = format!("{label}_copy{}", association.copies);
                association.copies += 1;
                Object {
                    mesh: Some(association.mesh),
                    ..Object::unbound(name)
                }
            }
            None => {
                log::error!("label {label:?} not found");
                Object::unbound(label)
            }
        });
    }

    /// Transform and material directives compose onto the open object.
    /// Transforms pre-multiply: the first directive of a section is applied
    /// closest to the object.
    fn section_directive(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        let Some(current) = self.current.as_mut() else { return };

        if try_material_line(line, current) {
            return;
        }
        match parse_transform_line(line) {
            Some(matrix) => current.transform = matrix * current.transform,
            None => log::warn!("unrecognized directive skipped: {line:?}"),
        }
    }

    fn end_section(&mut self) {
        if let Some(object) = self.current.take() {
            self.scene.objects.push(object);
        }
    }
}

/// `t x y z`, `s x y z` or `r ux uy uz angle`.
fn parse_transform_line(line: &str) -> Option<Mat4> {
    let mut tokens = line.split_whitespace();
    let prefix = tokens.next()?;
    let mut next = || tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0.0);

    match prefix {
        "t" => Some(transform::translation(next(), next(), next())),
        "s" => Some(transform::scaling(next(), next(), next())),
        "r" => {
            let axis = Vec3::new(next(), next(), next());
            let angle = next();
            match transform::rotation(axis, angle) {
                Ok(matrix) => Some(matrix),
                Err(err) => {
                    log::warn!("rotation directive skipped: {err}");
                    Some(Mat4::IDENTITY)
                }
            }
        }
        _ => None,
    }
}

/// `ambient|diffuse|specular r g b` or `shininess v`. Returns whether the
/// line was a material directive.
fn try_material_line(line: &str, object: &mut Object) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(field) = tokens.next() else {
        return false;
    };
    let mut next = || tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0.0);

    match field {
        "ambient" => object.material.ambient = Vec3::new(next(), next(), next()),
        "diffuse" => object.material.diffuse = Vec3::new(next(), next(), next()),
        "specular" => object.material.specular = Vec3::new(next(), next(), next()),
        "shininess" => object.material.shininess = next(),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::math::transform::{scaling, translation};

    #[test]
    fn transitions_follow_the_section_cycle() {
        use State::*;

        assert_eq!(transition(CameraAndLights, "position 0 0 5"), CameraAndLights);
        assert_eq!(transition(CameraAndLights, "objects:"), FilesHeader);
        assert_eq!(transition(FilesHeader, "cube cube.obj"), Files);
        assert_eq!(transition(Files, "tet tet.obj"), Files);
        assert_eq!(transition(Files, ""), WaitSection);
        assert_eq!(transition(WaitSection, ""), WaitSection);
        assert_eq!(transition(WaitSection, "cube"), NewSection);
        assert_eq!(transition(NewSection, "t 1 0 0"), GettingTransform);
        assert_eq!(transition(GettingTransform, "s 2 2 2"), GettingTransform);
        assert_eq!(transition(GettingTransform, ""), OneSectionEnd);
        assert_eq!(transition(OneSectionEnd, "cube"), NewSection);
        assert_eq!(transition(OneSectionEnd, ""), WaitSection);
    }

    #[test]
    fn camera_and_lights_section() {
        let scene = Scene::parse(
            "position 0 0 5\n\
             orientation 0 0 1 0\n\
             near 1\n\
             far 20\n\
             left -1\n\
             right 1\n\
             top 1\n\
             bottom -1\n\
             light 0 5 0 , 1 1 1 , 0.2\n\
             fancy_unknown_field 3\n",
            None,
        );

        assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(scene.camera.far, 20.0);
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.lights[0].position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(scene.lights[0].color, Vec3::ONE);
        assert_eq!(scene.lights[0].k, 0.2);
    }

    #[test]
    fn transform_directives_compose_first_line_innermost() {
        // The mesh file does not exist; the section still accumulates its
        // transform, which is what this probes.
        let scene = Scene::parse(
            "objects:\n\
             cube /definitely/not/a/file.obj\n\
             \n\
             cube\n\
             t 1 0 0\n\
             s 2 2 2\n",
            None,
        );

        assert_eq!(scene.objects.len(), 1);
        let expected = scaling(2.0, 2.0, 2.0) * translation(1.0, 0.0, 0.0);
        assert_eq!(scene.objects[0].transform, expected);

        let probe = scene.objects[0].transform.transform_point3(Vec3::ZERO);
        assert_eq!(probe, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn material_directives_fill_the_material() {
        let scene = Scene::parse(
            "objects:\n\
             cube missing.obj\n\
             \n\
             cube\n\
             ambient 0.1 0.2 0.3\n\
             diffuse 0.4 0.5 0.6\n\
             specular 0.7 0.8 0.9\n\
             shininess 8\n",
            None,
        );

        let material = scene.objects[0].material;
        assert_eq!(material.ambient, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(material.diffuse, Vec3::new(0.4, 0.5, 0.6));
        assert_eq!(material.specular, Vec3::new(0.7, 0.8, 0.9));
        assert_eq!(material.shininess, 8.0);
    }

    #[test]
    fn zero_axis_rotation_is_skipped_not_nan() {
        let scene = Scene::parse(
            "objects:\n\
             cube missing.obj\n\
             \n\
             cube\n\
             r 0 0 0 1.5\n\
             t 1 0 0\n",
            None,
        );

        assert_eq!(scene.objects[0].transform, translation(1.0, 0.0, 0.0));
    }

    #[test]
    fn missing_label_is_reported_not_fatal() {
        let scene = Scene::parse(
            "objects:\n\
             cube missing.obj\n\
             \n\
             ghost\n\
             t 1 0 0\n\
             \n\
             ghost\n\
             s 3 3 3\n",
            None,
        );

        // Both malformed sections still appear, with no mesh bound, and
        // their directives were not misattributed.
        assert_eq!(scene.objects.len(), 2);
        assert!(scene.objects.iter().all(|o| o.mesh.is_none()));
        assert_eq!(scene.objects[1].transform, scaling(3.0, 3.0, 3.0));
    }

    #[test]
    fn instances_share_a_mesh_and_get_numbered_names() {
        let dir = test_dir("copies");
        std::fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        std::fs::write(
            dir.join("scene.txt"),
            "near 1\n\
             objects:\n\
             tri tri.obj\n\
             \n\
             tri\n\
             t 1 0 0\n\
             \n\
             tri\n\
             t 2 0 0\n",
        )
        .unwrap();

        let scene = Scene::load(dir.join("scene.txt")).unwrap();
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.objects[0].name, "tri_copy1");
        assert_eq!(scene.objects[1].name, "tri_copy2");
        assert_eq!(scene.objects[0].mesh, scene.objects[1].mesh);
        assert_eq!(scene.mesh(scene.objects[0].mesh.unwrap()).faces.len(), 1);
        // Each instance owns its transform.
        assert_ne!(scene.objects[0].transform, scene.objects[1].transform);
    }

    #[test]
    fn trailing_section_is_finalized_without_blank_line() {
        let scene = Scene::parse(
            "objects:\n\
             cube missing.obj\n\
             \n\
             cube\n\
             t 1 2 3\n",
            None,
        );

        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.objects[0].transform, translation(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_section_body_keeps_identity_transform() {
        let scene = Scene::parse(
            "objects:\n\
             cube missing.obj\n\
             \n\
             cube\n\
             \n",
            None,
        );

        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.objects[0].transform, Mat4::IDENTITY);
    }

    #[test]
    fn reparsing_is_idempotent() {
        let text = "position 1 2 3\n\
                    light 0 5 0 , 1 1 1 , 0\n\
                    objects:\n\
                    cube missing.obj\n\
                    \n\
                    cube\n\
                    t 1 0 0\n\
                    r 0 0 1 0.5\n\
                    ambient 0.1 0.1 0.1\n";

        let first = Scene::parse(text, None);
        let second = Scene::parse(text, None);
        assert_eq!(first, second);
    }

    fn test_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("softraster-parser-{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
