use serde::{Deserialize, Serialize};
use std::ops::Add;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const UP: BlockPosition = BlockPosition { x: 0, y: 1, z: 0 };
    pub const UNIT_X: BlockPosition = BlockPosition { x: 1, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl Add for BlockPosition {
    type Output = BlockPosition;

    fn add(self, rhs: BlockPosition) -> Self::Output {
        BlockPosition {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

/// Position and rotation of an entity in Java coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct EntityPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl EntityPosition {
    /// The block containing this position.
    pub fn block(self) -> BlockPosition {
        BlockPosition {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }

    pub fn to_bedrock(self) -> Vec3f {
        Vec3f {
            x: self.x as f32,
            y: self.y as f32,
            z: self.z as f32,
        }
    }
}

impl From<(f64, f64, f64, f32, f32)> for EntityPosition {
    fn from(value: (f64, f64, f64, f32, f32)) -> Self {
        let (x, y, z, pitch, yaw) = value;
        Self {
            x,
            y,
            z,
            pitch,
            yaw,
        }
    }
}

/// Bedrock's single precision vector.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3f {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
