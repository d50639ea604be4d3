use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use particle_image::geometry::{PLANE_HEIGHT, PLANE_WIDTH};

/// Extra world units around a card's plane that still count as a hit.
pub const PICK_MARGIN: f32 = 0.25;

/// Fixed perspective camera looking down -Z at the carousel.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view (radians).
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub dir: Vec3,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn set_viewport(&mut self, viewport: [f32; 2]) {
        self.aspect = viewport[0] / viewport[1].max(1.0);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// wgpu clip space: depth in [0, 1], which `perspective_rh` already produces.
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// World-space ray through a cursor position in physical pixels
    /// (origin top-left).
    pub fn ray_through(&self, cursor: Vec2, viewport: [f32; 2]) -> Ray {
        let ndc = Vec2::new(
            2.0 * cursor.x / viewport[0].max(1.0) - 1.0,
            1.0 - 2.0 * cursor.y / viewport[1].max(1.0),
        );
        let inv = self.view_proj().inverse();
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            dir: (far - near).normalize_or_zero(),
        }
    }

    /// Projects a world point to pixels (origin top-left). `None` when the
    /// point is behind the camera.
    pub fn project_to_screen(&self, world: Vec3, viewport: [f32; 2]) -> Option<Vec2> {
        let clip = self.view_proj() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport[0],
            (1.0 - ndc.y) * 0.5 * viewport[1],
        ))
    }
}

/// Distance along `ray` at which it crosses a card's local z = 0 plane
/// inside the card rectangle, if it does.
pub fn intersect_card(ray: &Ray, model: Mat4) -> Option<f32> {
    if model.determinant().abs() <= f32::EPSILON {
        return None;
    }
    let inv = model.inverse();
    let origin = inv.transform_point3(ray.origin);
    let dir = inv.transform_vector3(ray.dir);
    if dir.z.abs() <= f32::EPSILON {
        return None;
    }

    let s = -origin.z / dir.z;
    if s < 0.0 {
        return None;
    }
    let hit = origin + dir * s;
    let inside = hit.x.abs() <= PLANE_WIDTH * 0.5 + PICK_MARGIN
        && hit.y.abs() <= PLANE_HEIGHT * 0.5 + PICK_MARGIN;
    if !inside {
        return None;
    }

    // `s` is measured in local units; report world distance so hits on
    // differently scaled cards compare fairly.
    Some((model.transform_point3(hit) - ray.origin).length())
}

/// Nearest card under the ray.
pub fn pick_card(ray: &Ray, cards: impl IntoIterator<Item = (usize, Mat4)>) -> Option<usize> {
    cards
        .into_iter()
        .filter_map(|(index, model)| intersect_card(ray, model).map(|t| (index, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
