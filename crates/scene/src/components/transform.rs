use foundation::math::{Mat4, Vec3};

/// Local transform of a node relative to its parent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(position),
        }
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    pub fn position(&self) -> Vec3 {
        self.matrix.translation()
    }
}
