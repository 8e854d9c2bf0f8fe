use glam::{ EulerRot, Mat3, Mat4, Quat, Vec3 };

// Linear interpolation utility function
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Cubic ease-in-out over [0, 1]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Quadratic ease-in-out over [0, 1]
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Right-handed perspective with an OpenGL clip range of [-1, 1]
pub fn perspective(fov_y_radians: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y_radians, aspect_ratio.max(f32::EPSILON), near, far)
}

/// Orientation that points an object's +Z axis from `position` at `target`,
/// keeping +Y as close to world up as possible.
pub fn look_rotation(position: Vec3, target: Vec3) -> Quat {
    let mut z = target - position;
    if z.length_squared() < f32::EPSILON {
        z = Vec3::Z;
    }
    z = z.normalize();

    let mut x = Vec3::Y.cross(z);
    if x.length_squared() < f32::EPSILON {
        // Looking straight up or down
        let nudged = (z + Vec3::new(0.0, 0.0, 1e-4)).normalize();
        x = Vec3::Y.cross(nudged);
        if x.length_squared() < f32::EPSILON {
            x = Vec3::X;
        }
    }
    x = x.normalize();
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Map a normalised device coordinate back into world space
pub fn unproject(ndc: Vec3, view: Mat4, projection: Mat4) -> Vec3 {
    let inv_view_proj = (projection * view).inverse();
    let world = inv_view_proj * ndc.extend(1.0);
    if world.w.abs() < f32::EPSILON {
        return world.truncate();
    }
    world.truncate() / world.w
}

/// Rebuild a rotation with one X-Y-Z Euler angle replaced
pub fn with_euler_angle(rotation: Quat, axis: EulerAxis, angle: f32) -> Quat {
    let (mut x, mut y, mut z) = rotation.to_euler(EulerRot::XYZ);
    match axis {
        EulerAxis::X => x = angle,
        EulerAxis::Y => y = angle,
        EulerAxis::Z => z = angle,
    }
    Quat::from_euler(EulerRot::XYZ, x, y, z)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EulerAxis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Slab test. Returns the entry distance along the ray.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            if direction.abs() < f32::EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

pub fn rgb_to_hsl(rgb: Vec3) -> Vec3 {
    let max = rgb.max_element();
    let min = rgb.min_element();
    let l = (max + min) / 2.0;

    if (max - min).abs() < f32::EPSILON {
        return Vec3::new(0.0, 0.0, l);
    }

    let delta = max - min;
    let s = if l <= 0.5 { delta / (max + min) } else { delta / (2.0 - max - min) };
    let h = if max == rgb.x {
        (rgb.y - rgb.z) / delta + if rgb.y < rgb.z { 6.0 } else { 0.0 }
    } else if max == rgb.y {
        (rgb.z - rgb.x) / delta + 2.0
    } else {
        (rgb.x - rgb.y) / delta + 4.0
    };

    Vec3::new(h / 6.0, s, l)
}

pub fn hsl_to_rgb(hsl: Vec3) -> Vec3 {
    let (h, s, l) = (hsl.x.rem_euclid(1.0), hsl.y.clamp(0.0, 1.0), hsl.z.clamp(0.0, 1.0));
    if s <= 0.0 {
        return Vec3::splat(l);
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(hue_to_rgb(p, q, h + 1.0 / 3.0), hue_to_rgb(p, q, h), hue_to_rgb(p, q, h - 1.0 / 3.0))
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
