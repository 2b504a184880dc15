//! Per-object rasterization: project, cull, scan-convert, depth-test,
//! shade.

use glam::{Mat4, Vec3};

use crate::{
    color::{self, Color},
    framebuffer::Framebuffer,
    math::transform::{cartesian_to_homogeneous, homogeneous_to_cartesian, TransformError},
    mesh::Mesh,
    raster,
    scene::{Object, Scene},
    shader::{Gouraud, Phong, Shader},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Gouraud,
    Phong,
    Edges,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RendererOptions {
    pub mode: RenderMode,
    /// Transform normals by the inverse-transpose of the model transform
    /// instead of the model transform itself. Off by default: existing
    /// scenes were authored against the simplified behavior, which only
    /// differs under non-uniform scaling.
    pub correct_normals: bool,
    /// Coverage-split antialiasing for edge mode lines.
    pub antialias_edges: bool,
}

/// Render a full scene into a fresh framebuffer. Objects are processed
/// sequentially; instances without a bound mesh contribute nothing.
pub fn render(
    scene: &Scene,
    width: u32,
    height: u32,
    options: &RendererOptions,
) -> Result<Framebuffer, TransformError> {
    let mut fb = Framebuffer::new(width, height);
    let view_projection = scene.camera.view_projection()?;
    let eye = scene.camera.position;

    for object in &scene.objects {
        let Some(handle) = object.mesh else {
            log::debug!("skipping {:?}: no mesh bound", object.name);
            continue;
        };
        let mesh = scene.mesh(handle);

        match options.mode {
            RenderMode::Gouraud => {
                let mut shader = Gouraud::new(&object.material, &scene.lights, eye);
                render_object(&mut fb, mesh, object, view_projection, options, &mut shader);
            }
            RenderMode::Phong => {
                let mut shader = Phong::new(&object.material, &scene.lights, eye);
                render_object(&mut fb, mesh, object, view_projection, options, &mut shader);
            }
            RenderMode::Edges => {
                draw_object_edges(
                    &mut fb,
                    mesh,
                    object,
                    view_projection,
                    color::WHITE,
                    options.antialias_edges,
                );
            }
        }
    }

    Ok(fb)
}

fn world_positions(mesh: &Mesh, object: &Object) -> Vec<Vec3> {
    mesh.vertices
        .iter()
        .map(|&v| homogeneous_to_cartesian(object.transform * cartesian_to_homogeneous(v)))
        .collect()
}

fn ndc_positions(world: &[Vec3], view_projection: Mat4) -> Vec<Vec3> {
    world
        .iter()
        .map(|&p| homogeneous_to_cartesian(view_projection * cartesian_to_homogeneous(p)))
        .collect()
}

fn transformed_normals(mesh: &Mesh, object: &Object, correct_normals: bool) -> Vec<Vec3> {
    let normal_matrix = if correct_normals {
        object.transform.inverse().transpose()
    } else {
        object.transform
    };
    mesh.normals
        .iter()
        .map(|&n| normal_matrix.transform_vector3(n))
        .collect()
}

fn render_object(
    fb: &mut Framebuffer,
    mesh: &Mesh,
    object: &Object,
    view_projection: Mat4,
    options: &RendererOptions,
    shader: &mut dyn Shader,
) {
    let (width, height) = (fb.width(), fb.height());
    let world = world_positions(mesh, object);
    let ndc = ndc_positions(&world, view_projection);
    let normals = transformed_normals(mesh, object, options.correct_normals);

    for face in &mesh.faces {
        let [ia, ib, ic] = face.vertices;
        if ia >= ndc.len() || ib >= ndc.len() || ic >= ndc.len() {
            log::warn!("face references missing vertices in {:?}", object.name);
            continue;
        }
        let (a, b, c) = (ndc[ia], ndc[ib], ndc[ic]);

        // Back-face cull: counter-clockwise (viewer-facing) triangles have
        // a positive signed area in NDC.
        if (b - a).cross(c - a).z <= 0.0 {
            continue;
        }

        let positions = [world[ia], world[ib], world[ic]];
        let plane_normal = (positions[1] - positions[0])
            .cross(positions[2] - positions[0])
            .normalize_or_zero();
        let vertex_normal = |slot: usize| {
            face.normals[slot]
                .and_then(|ni| normals.get(ni).copied())
                .unwrap_or(plane_normal)
        };
        shader.new_triangle(positions, [vertex_normal(0), vertex_normal(1), vertex_normal(2)]);

        let pa = raster::ndc_to_screen(a, width, height);
        let pb = raster::ndc_to_screen(b, width, height);
        let pc = raster::ndc_to_screen(c, width, height);

        let xmin = pa.0.min(pb.0).min(pc.0).max(0);
        let xmax = pa.0.max(pb.0).max(pc.0).min(width as i32 - 1);
        let ymin = pa.1.min(pb.1).min(pc.1).max(0);
        let ymax = pa.1.max(pb.1).max(pc.1).min(height as i32 - 1);

        for y in ymin..=ymax {
            for x in xmin..=xmax {
                let Some((alpha, beta, gamma)) = raster::barycentric(pa, pb, pc, x, y) else {
                    continue;
                };
                let in_unit = |t: f32| (0.0..=1.0).contains(&t);
                if !(in_unit(alpha) && in_unit(beta) && in_unit(gamma)) {
                    continue;
                }

                let point = a * alpha + b * beta + c * gamma;
                let (x, y) = (x as u32, y as u32);
                if raster::within_ndc_cube(point) && point.z < fb.depth(x, y) {
                    fb.set_depth(x, y, point.z);
                    let pixel = color::clamp(shader.compute_color(alpha, beta, gamma));
                    fb.put_pixel(x, y, pixel);
                }
            }
        }
    }
}

/// Wireframe: each face edge with at least one endpoint inside the
/// canonical cube, line-stepped and coverage-blended into the framebuffer.
fn draw_object_edges(
    fb: &mut Framebuffer,
    mesh: &Mesh,
    object: &Object,
    view_projection: Mat4,
    color: Color,
    antialias: bool,
) {
    let (width, height) = (fb.width(), fb.height());
    let ndc = ndc_positions(&world_positions(mesh, object), view_projection);
    let inside: Vec<bool> = ndc.iter().map(|&p| raster::within_ndc_cube(p)).collect();

    for face in &mesh.faces {
        for i in 0..3 {
            let start = face.vertices[i];
            let end = face.vertices[(i + 1) % 3];
            if start >= ndc.len() || end >= ndc.len() {
                continue;
            }
            // Both endpoints outside the cube: the edge is off-screen or
            // behind the camera, and projecting it would smear artifacts.
            if !inside[start] && !inside[end] {
                continue;
            }

            let (x0, y0) = raster::ndc_to_screen(ndc[start], width, height);
            let (x1, y1) = raster::ndc_to_screen(ndc[end], width, height);
            raster::draw_line(x0, y0, x1, y1, antialias, |x, y, coverage| {
                if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                    fb.blend_pixel(x as u32, y as u32, color, coverage);
                }
            });
        }
    }
}
