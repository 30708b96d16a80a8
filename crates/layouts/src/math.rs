use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    pub fn scale(self, factor: f32) -> Vec3 {
        Vec3 {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }
}

/// Unit quaternion used for composing segment poses. Euler angles are in
/// degrees, applied yaw (Y), then pitch (X), then roll (Z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn from_euler_degrees(euler: Vec3) -> Quat {
        let half_x = euler.x.to_radians() * 0.5;
        let half_y = euler.y.to_radians() * 0.5;
        let half_z = euler.z.to_radians() * 0.5;

        let pitch = Quat {
            x: half_x.sin(),
            y: 0.0,
            z: 0.0,
            w: half_x.cos(),
        };
        let yaw = Quat {
            x: 0.0,
            y: half_y.sin(),
            z: 0.0,
            w: half_y.cos(),
        };
        let roll = Quat {
            x: 0.0,
            y: 0.0,
            z: half_z.sin(),
            w: half_z.cos(),
        };

        yaw.mul(pitch).mul(roll)
    }

    pub fn mul(self, rhs: Quat) -> Quat {
        Quat {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        let u = Vec3 {
            x: self.x,
            y: self.y,
            z: self.z,
        };
        let t = u.cross(v).scale(2.0);
        v.add(t.scale(self.w)).add(u.cross(t))
    }
}

/// Local placement transform carried by item prototypes and instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation_euler_degrees: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation_euler_degrees: Vec3::ZERO,
        scale: Vec3::ONE,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// World-space pose of an activated segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl WorldPose {
    pub const ORIGIN: WorldPose = WorldPose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_local(offset: Vec3, rotation_euler_degrees: Vec3) -> WorldPose {
        WorldPose {
            position: offset,
            rotation: Quat::from_euler_degrees(rotation_euler_degrees),
        }
    }

    /// Resolves a child pose given in this pose's local space, the way a
    /// segment is briefly parented under its predecessor before detaching.
    pub fn compose_local(self, offset: Vec3, rotation_euler_degrees: Vec3) -> WorldPose {
        WorldPose {
            position: self.position.add(self.rotation.rotate(offset)),
            rotation: self.rotation.mul(Quat::from_euler_degrees(rotation_euler_degrees)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual.x - expected.x).abs() < 0.0001
                && (actual.y - expected.y).abs() < 0.0001
                && (actual.z - expected.z).abs() < 0.0001,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn identity_rotation_leaves_vector_unchanged() {
        let v = Vec3::new(1.5, -2.0, 0.25);
        assert_vec3_close(Quat::IDENTITY.rotate(v), v);
    }

    #[test]
    fn yaw_quarter_turn_maps_x_to_negative_z() {
        let q = Quat::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        assert_vec3_close(q.rotate(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn half_turn_composed_from_two_quarter_turns() {
        let quarter = Quat::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        let half = quarter.mul(quarter);
        assert_vec3_close(
            half.rotate(Vec3::new(1.0, 0.0, 0.0)),
            Vec3::new(-1.0, 0.0, 0.0),
        );
    }

    #[test]
    fn compose_local_offsets_along_parent_facing() {
        let parent = WorldPose::from_local(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 90.0, 0.0));
        let child = parent.compose_local(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO);
        assert_vec3_close(child.position, Vec3::new(10.0, 0.0, -2.0));
    }

    #[test]
    fn compose_local_at_origin_matches_from_local() {
        let offset = Vec3::new(3.0, 0.0, -1.0);
        let rotation = Vec3::new(0.0, 45.0, 0.0);
        let composed = WorldPose::ORIGIN.compose_local(offset, rotation);
        let direct = WorldPose::from_local(offset, rotation);
        assert_vec3_close(composed.position, direct.position);
        let probe = Vec3::new(1.0, 2.0, 3.0);
        assert_vec3_close(composed.rotation.rotate(probe), direct.rotation.rotate(probe));
    }
}
