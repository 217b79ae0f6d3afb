//! 2D collision shapes
//!
//! Shapes are stored in body space and transformed to world space on demand
//! for overlap and ray tests.

use crate::foundation::math::{normalize_or_zero, rotate, Vec2};

const EPSILON: f32 = 1.0e-6;

/// Body-space fixture shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box in body space, given by half extents
    Box {
        /// Half width
        half_width: f32,
        /// Half height
        half_height: f32,
    },
    /// Circle centred on the body origin
    Circle {
        /// Radius
        radius: f32,
    },
}

impl Shape {
    /// Box from full width and height
    pub fn rect(width: f32, height: f32) -> Self {
        Self::Box {
            half_width: width * 0.5,
            half_height: height * 0.5,
        }
    }
    
    /// Circle from radius
    pub fn circle(radius: f32) -> Self {
        Self::Circle { radius }
    }
    
    /// Area used for mass computation
    pub fn area(&self) -> f32 {
        match *self {
            Self::Box { half_width, half_height } => 4.0 * half_width * half_height,
            Self::Circle { radius } => std::f32::consts::PI * radius * radius,
        }
    }
    
    /// Place the shape at a body transform
    pub fn to_world_space(&self, position: Vec2, angle: f32) -> WorldShape {
        match *self {
            Self::Box { half_width, half_height } => WorldShape::Obb {
                center: position,
                axes: [rotate(Vec2::x(), angle), rotate(Vec2::y(), angle)],
                half: Vec2::new(half_width, half_height),
            },
            Self::Circle { radius } => WorldShape::Circle { center: position, radius },
        }
    }
}

/// World-space shape used during a single test
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    /// Circle
    Circle {
        /// Centre
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// Oriented box
    Obb {
        /// Centre
        center: Vec2,
        /// Local x and y axes in world space
        axes: [Vec2; 2],
        /// Half extents along `axes`
        half: Vec2,
    },
}

/// Contact geometry between two overlapping shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from the first shape to the second
    pub normal: Vec2,
    /// Representative contact point
    pub point: Vec2,
}

/// Ray intersection with a single shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayIntersection {
    /// Position along the segment in `[0, 1]`; 0 when the origin is inside
    pub fraction: f32,
    /// World-space hit point
    pub point: Vec2,
    /// Surface normal at the hit point
    pub normal: Vec2,
}

impl WorldShape {
    /// Centre of the shape
    pub fn center(&self) -> Vec2 {
        match *self {
            Self::Circle { center, .. } | Self::Obb { center, .. } => center,
        }
    }
    
    /// Test overlap with `other`; the manifold normal points from `self` to `other`
    pub fn overlap(&self, other: &WorldShape) -> Option<Manifold> {
        match (*self, *other) {
            (Self::Circle { center: ca, radius: ra }, Self::Circle { center: cb, radius: rb }) => circle_circle(ca, ra, cb, rb),
            (Self::Obb { .. }, Self::Circle { center, radius }) => obb_circle(self, center, radius),
            (Self::Circle { center, radius }, Self::Obb { .. }) => obb_circle(other, center, radius).map(|m| Manifold {
                normal: -m.normal,
                point: m.point,
            }),
            (Self::Obb { .. }, Self::Obb { .. }) => obb_obb(self, other),
        }
    }
    
    /// Intersect the segment `p1 -> p2`
    pub fn ray_cast(&self, p1: Vec2, p2: Vec2) -> Option<RayIntersection> {
        match *self {
            Self::Circle { center, radius } => ray_circle(center, radius, p1, p2),
            Self::Obb { center, axes, half } => ray_obb(center, axes, half, p1, p2),
        }
    }
}

fn circle_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<Manifold> {
    let d = cb - ca;
    let reach = ra + rb;
    let dist2 = d.norm_squared();
    if dist2 >= reach * reach {
        return None;
    }
    
    let normal = if dist2 > EPSILON { d / dist2.sqrt() } else { Vec2::x() };
    Some(Manifold {
        normal,
        point: ((ca + normal * ra) + (cb - normal * rb)) * 0.5,
    })
}

fn local_point(center: Vec2, axes: [Vec2; 2], p: Vec2) -> Vec2 {
    let rel = p - center;
    Vec2::new(rel.dot(&axes[0]), rel.dot(&axes[1]))
}

fn world_dir(axes: [Vec2; 2], v: Vec2) -> Vec2 {
    axes[0] * v.x + axes[1] * v.y
}

fn obb_circle(obb: &WorldShape, circle_center: Vec2, radius: f32) -> Option<Manifold> {
    let WorldShape::Obb { center, axes, half } = *obb else {
        return None;
    };
    
    let local = local_point(center, axes, circle_center);
    let clamped = Vec2::new(local.x.clamp(-half.x, half.x), local.y.clamp(-half.y, half.y));
    
    if clamped == local {
        // Centre inside the box: push out through the nearest face
        let dx = half.x - local.x.abs();
        let dy = half.y - local.y.abs();
        let n_local = if dx < dy {
            Vec2::new(local.x.signum(), 0.0)
        } else {
            Vec2::new(0.0, local.y.signum())
        };
        return Some(Manifold {
            normal: world_dir(axes, n_local),
            point: circle_center,
        });
    }
    
    let delta = local - clamped;
    let dist2 = delta.norm_squared();
    if dist2 >= radius * radius {
        return None;
    }
    Some(Manifold {
        normal: world_dir(axes, delta / dist2.sqrt()),
        point: center + world_dir(axes, clamped),
    })
}

fn projected_radius(axes: [Vec2; 2], half: Vec2, axis: Vec2) -> f32 {
    half.x * axes[0].dot(&axis).abs() + half.y * axes[1].dot(&axis).abs()
}

fn corners(center: Vec2, axes: [Vec2; 2], half: Vec2) -> [Vec2; 4] {
    let x = axes[0] * half.x;
    let y = axes[1] * half.y;
    [center + x + y, center - x + y, center - x - y, center + x - y]
}

fn obb_obb(a: &WorldShape, b: &WorldShape) -> Option<Manifold> {
    let (WorldShape::Obb { center: ca, axes: aa, half: ha }, WorldShape::Obb { center: cb, axes: ab, half: hb }) = (*a, *b) else {
        return None;
    };
    
    let d = cb - ca;
    let mut best: Option<(f32, Vec2, bool)> = None;
    for (axis, from_a) in [(aa[0], true), (aa[1], true), (ab[0], false), (ab[1], false)] {
        let along = d.dot(&axis);
        let overlap = projected_radius(aa, ha, axis) + projected_radius(ab, hb, axis) - along.abs();
        if overlap <= 0.0 {
            return None;
        }
        if best.map_or(true, |(depth, _, _)| overlap < depth) {
            let normal = if along < 0.0 { -axis } else { axis };
            best = Some((overlap, normal, from_a));
        }
    }
    
    let (_, normal, from_a) = best?;
    let point = if from_a {
        // Deepest corner of B against A's face
        corners(cb, ab, hb)
            .into_iter()
            .min_by(|p, q| p.dot(&normal).total_cmp(&q.dot(&normal)))
    } else {
        corners(ca, aa, ha)
            .into_iter()
            .max_by(|p, q| p.dot(&normal).total_cmp(&q.dot(&normal)))
    }?;
    
    Some(Manifold { normal, point })
}

fn ray_circle(center: Vec2, radius: f32, p1: Vec2, p2: Vec2) -> Option<RayIntersection> {
    let s = p1 - center;
    let c = s.norm_squared() - radius * radius;
    if c <= 0.0 {
        return Some(RayIntersection {
            fraction: 0.0,
            point: p1,
            normal: normalize_or_zero(s),
        });
    }
    
    let d = p2 - p1;
    let a = d.norm_squared();
    if a < EPSILON {
        return None;
    }
    let b = s.dot(&d);
    let sigma = b * b - a * c;
    if sigma < 0.0 {
        return None;
    }
    
    let t = (-b - sigma.sqrt()) / a;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let point = p1 + d * t;
    Some(RayIntersection {
        fraction: t,
        point,
        normal: normalize_or_zero(point - center),
    })
}

fn ray_obb(center: Vec2, axes: [Vec2; 2], half: Vec2, p1: Vec2, p2: Vec2) -> Option<RayIntersection> {
    let origin = local_point(center, axes, p1);
    if origin.x.abs() <= half.x && origin.y.abs() <= half.y {
        return Some(RayIntersection {
            fraction: 0.0,
            point: p1,
            normal: Vec2::zeros(),
        });
    }
    
    let d = p2 - p1;
    let dir = Vec2::new(d.dot(&axes[0]), d.dot(&axes[1]));
    let mut t_min = 0.0_f32;
    let mut t_max = 1.0_f32;
    let mut normal = Vec2::zeros();
    
    for i in 0..2 {
        if dir[i].abs() < EPSILON {
            if origin[i].abs() > half[i] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[i];
        let mut t1 = (-half[i] - origin[i]) * inv;
        let mut t2 = (half[i] - origin[i]) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_min {
            t_min = t1;
            normal = Vec2::zeros();
            normal[i] = -dir[i].signum();
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }
    
    if normal == Vec2::zeros() {
        return None;
    }
    Some(RayIntersection {
        fraction: t_min,
        point: p1 + d * t_min,
        normal: world_dir(axes, normal),
    })
}
