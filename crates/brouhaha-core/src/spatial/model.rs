//! Placement domain models: poses, shapes, colors and placed objects.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A point or direction in session space, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn scale(self, factor: f32) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Unit quaternion orientation (x, y, z, w).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation of `angle` radians around the vertical (y) axis.
    pub fn from_yaw(angle: f32) -> Self {
        let half = angle / 2.0;
        Self {
            x: 0.0,
            y: half.sin(),
            z: 0.0,
            w: half.cos(),
        }
    }

    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v).scale(2.0);
        v + t.scale(self.w) + q.cross(t)
    }

    /// Viewing direction: the camera looks down its local -Z axis.
    pub fn forward(&self) -> Vec3 {
        self.rotate(Vec3::new(0.0, 0.0, -1.0))
    }
}

/// Camera or object pose in session space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Orientation,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// The point `distance` meters straight ahead of this pose.
    pub fn ahead(&self, distance: f32) -> Vec3 {
        self.position + self.orientation.forward().scale(distance)
    }
}

/// Shapes the spray can can paint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Sphere,
    Plane,
    Ring,
    Pyramid,
    Box,
}

/// Concrete geometry for a shape of a given size, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeGeometry {
    Sphere { radius: f32 },
    Plane { width: f32, height: f32 },
    Ring { ring_radius: f32, pipe_radius: f32 },
    Pyramid { width: f32, height: f32, length: f32 },
    Box { width: f32, height: f32, length: f32 },
}

impl ShapeKind {
    pub fn geometry(self, size: f32) -> ShapeGeometry {
        match self {
            ShapeKind::Sphere => ShapeGeometry::Sphere { radius: size },
            ShapeKind::Plane => ShapeGeometry::Plane {
                width: size,
                height: size,
            },
            ShapeKind::Ring => ShapeGeometry::Ring {
                ring_radius: size,
                pipe_radius: size / 4.0,
            },
            ShapeKind::Pyramid => ShapeGeometry::Pyramid {
                width: size,
                height: size * 2.0,
                length: size,
            },
            ShapeKind::Box => ShapeGeometry::Box {
                width: size,
                height: size,
                length: size,
            },
        }
    }
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Clamps every component into the unit range.
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLUE
    }
}

/// A shape placed in the scene, either committed to a stroke or floating as
/// the edit-mode preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Monotonic id within one session, used by renderers to track nodes.
    pub id: u64,
    pub shape: ShapeKind,
    /// Size in meters.
    pub size: f32,
    pub color: Rgba,
    pub pose: Pose,
}

impl PlacedObject {
    pub fn geometry(&self) -> ShapeGeometry {
        self.shape.geometry(self.size)
    }
}
