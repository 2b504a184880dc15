//! Scan-conversion primitives: NDC/screen mapping, barycentric coverage and
//! an integer line stepper.

use glam::Vec3;

/// Map an NDC point to pixel coordinates. NDC y points up, screen y down.
pub fn ndc_to_screen(ndc: Vec3, width: u32, height: u32) -> (i32, i32) {
    let x = (ndc.x + 1.0) / 2.0 * width as f32;
    let y = (1.0 - ndc.y) / 2.0 * height as f32;
    (x as i32, y as i32)
}

/// Whether a point lies inside the canonical view volume [-1, 1]^3.
pub fn within_ndc_cube(p: Vec3) -> bool {
    p.x >= -1.0 && p.x <= 1.0 && p.y >= -1.0 && p.y <= 1.0 && p.z >= -1.0 && p.z <= 1.0
}

/// Barycentric coordinates of pixel (x, y) with respect to a screen-space
/// triangle, by the signed-area ratio formula. `None` for a zero-area
/// triangle, so no division corrupts downstream math.
///
/// The area terms are computed in f32: a vertex almost on the eye plane
/// projects to screen coordinates near `i32::MAX`, and integer products of
/// those would overflow.
pub fn barycentric(
    (xa, ya): (i32, i32),
    (xb, yb): (i32, i32),
    (xc, yc): (i32, i32),
    x: i32,
    y: i32,
) -> Option<(f32, f32, f32)> {
    let (xa, ya) = (xa as f32, ya as f32);
    let (xb, yb) = (xb as f32, yb as f32);
    let (xc, yc) = (xc as f32, yc as f32);
    let (x, y) = (x as f32, y as f32);

    let denom = (yb - yc) * (xa - xc) + (xc - xb) * (ya - yc);
    if denom == 0.0 {
        return None;
    }

    let alpha = ((yb - yc) * (x - xc) + (xc - xb) * (y - yc)) / denom;
    let beta = ((yc - ya) * (x - xc) + (xa - xc) * (y - yc)) / denom;
    let gamma = 1.0 - alpha - beta;
    Some((alpha, beta, gamma))
}

/// Bresenham-style integer line stepper. `fill` receives each candidate
/// pixel with a coverage weight; without antialiasing the weight is always
/// 1, with it the error term splits coverage over the two nearest pixels.
pub fn draw_line(
    mut x0: i32,
    mut y0: i32,
    mut x1: i32,
    mut y1: i32,
    antialias: bool,
    mut fill: impl FnMut(i32, i32, f32),
) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let y_step = if y0 < y1 { 1 } else { -1 };

    let mut y = y0;
    let mut e = 0;
    for x in x0..x1 {
        if antialias {
            let alpha = (e as f32 / dx as f32).clamp(0.0, 1.0);
            if steep {
                fill(y, x, 1.0 - alpha);
                fill(y + y_step, x, alpha);
            } else {
                fill(x, y, 1.0 - alpha);
                fill(x, y + y_step, alpha);
            }
        } else if steep {
            fill(y, x, 1.0);
        } else {
            fill(x, y, 1.0);
        }

        e += dy;
        if 2 * e >= dx {
            y += y_step;
            e -= dx;
        }
    }
}
