use super::Vec3;

/// Column-major 4x4 matrix (`cols[c][r]`), matching WGSL memory layout.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f64; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_cols(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    pub fn from_cols_f32(cols: [[f32; 4]; 4]) -> Self {
        let mut out = [[0.0f64; 4]; 4];
        for (c, col) in cols.iter().enumerate() {
            for (r, v) in col.iter().enumerate() {
                out[c][r] = *v as f64;
            }
        }
        Self { cols: out }
    }

    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn from_scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = s.x;
        m.cols[1][1] = s.y;
        m.cols[2][2] = s.z;
        m
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`.
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let c = from.dot(to);
        if c > 1.0 - 1e-12 {
            return Self::IDENTITY;
        }
        if c < -1.0 + 1e-12 {
            // Half turn about any axis perpendicular to `from`.
            let helper = if from.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
            let k = from.cross(helper).normalize_or_zero();
            return Self::rotation_about(k, -1.0, 0.0);
        }
        let axis = from.cross(to);
        let s = axis.length();
        Self::rotation_about(axis * (1.0 / s), c, s)
    }

    /// Rodrigues rotation about unit axis `k` given the angle's cosine and sine.
    fn rotation_about(k: Vec3, c: f64, s: f64) -> Self {
        let t = 1.0 - c;
        Self::from_cols([
            [t * k.x * k.x + c, t * k.x * k.y + s * k.z, t * k.x * k.z - s * k.y, 0.0],
            [t * k.x * k.y - s * k.z, t * k.y * k.y + c, t * k.y * k.z + s * k.x, 0.0],
            [t * k.x * k.z + s * k.y, t * k.y * k.z - s * k.x, t * k.z * k.z + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn to_cols_f32(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in self.cols.iter().enumerate() {
            for (r, v) in col.iter().enumerate() {
                out[c][r] = *v as f32;
            }
        }
        out
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.cols[3][0], self.cols[3][1], self.cols[3][2])
    }

    /// Transforms a point (w = 1), dividing by w when it is not 1.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.cols;
        let x = m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0];
        let y = m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1];
        let z = m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2];
        let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];
        if w == 0.0 || w == 1.0 {
            Vec3::new(x, y, z)
        } else {
            Vec3::new(x / w, y / w, z / w)
        }
    }

    /// Transforms a direction (w = 0).
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.cols;
        Vec3::new(
            m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
            m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
            m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
        )
    }

    /// Right-handed perspective projection with depth range [0, 1].
    pub fn perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (0.5 * fov_y_rad).tan();
        let m00 = f / aspect;
        let m11 = f;
        let m22 = far / (near - far);
        let m23 = (near * far) / (near - far);

        // [ m00,  0,   0,   0 ]
        // [  0,  m11,  0,   0 ]
        // [  0,   0,  m22, m23 ]
        // [  0,   0,  -1,   0 ]
        Self::from_cols([
            [m00, 0.0, 0.0, 0.0],
            [0.0, m11, 0.0, 0.0],
            [0.0, 0.0, m22, -1.0],
            [0.0, 0.0, m23, 0.0],
        ])
    }

    /// Right-handed orthographic projection with depth range [0, 1].
    pub fn orthographic_rh_z0(
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        near: f64,
        far: f64,
    ) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let nf = near - far;
        Self::from_cols([
            [2.0 / rl, 0.0, 0.0, 0.0],
            [0.0, 2.0 / tb, 0.0, 0.0],
            [0.0, 0.0, 1.0 / nf, 0.0],
            [-(right + left) / rl, -(top + bottom) / tb, near / nf, 1.0],
        ])
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize_or_zero();
        let s = f.cross(up).normalize_or_zero();
        let u = s.cross(f);

        Self::from_cols([
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
        ])
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, b: Mat4) -> Mat4 {
        let a = &self.cols;
        let mut c = [[0.0f64; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                c[col][row] = a[0][row] * b.cols[col][0]
                    + a[1][row] * b.cols[col][1]
                    + a[2][row] * b.cols[col][2]
                    + a[3][row] * b.cols[col][3];
            }
        }
        Mat4 { cols: c }
    }
}

#[cfg(test)]
mod tests {
    use super::Mat4;
    use crate::math::Vec3;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn translation_then_scale_composes_right_to_left() {
        let t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let s = Mat4::from_scale(Vec3::splat(2.0));
        let p = (t * s).transform_point(Vec3::new(1.0, 1.0, 1.0));
        assert!(approx(p, Vec3::new(3.0, 4.0, 5.0)));
        assert_eq!((t * s).translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rotation_arc_maps_from_onto_to() {
        let cases = [
            (Vec3::new(0.0, 0.0, -1.0), Vec3::Y),
            (Vec3::X, Vec3::Z),
            (Vec3::Y, Vec3::Y),
            (Vec3::Y, Vec3::new(0.0, -1.0, 0.0)),
        ];
        for (from, to) in cases {
            let r = Mat4::from_rotation_arc(from, to);
            assert!(approx(r.transform_vector(from), to), "{from:?} -> {to:?}");
            // Lengths are preserved.
            let v = Vec3::new(0.3, -1.2, 2.0);
            assert!((r.transform_vector(v).length() - v.length()).abs() < 1e-9);
        }
    }

    #[test]
    fn look_at_moves_target_onto_negative_z() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let p = view.transform_point(Vec3::ZERO);
        assert!(approx(p, Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn orthographic_maps_near_and_far_to_unit_depth() {
        let proj = Mat4::orthographic_rh_z0(-2.0, 2.0, -1.0, 1.0, 0.1, 100.0);
        let near = proj.transform_point(Vec3::new(2.0, 1.0, -0.1));
        let far = proj.transform_point(Vec3::new(-2.0, -1.0, -100.0));
        assert!(approx(near, Vec3::new(1.0, 1.0, 0.0)));
        assert!(approx(far, Vec3::new(-1.0, -1.0, 1.0)));
    }

    #[test]
    fn perspective_maps_near_plane_to_zero_depth() {
        let proj = Mat4::perspective_rh_z0(75f64.to_radians(), 1.5, 0.1, 1000.0);
        let p = proj.transform_point(Vec3::new(0.0, 0.0, -0.1));
        assert!(p.z.abs() < 1e-9);
    }
}
