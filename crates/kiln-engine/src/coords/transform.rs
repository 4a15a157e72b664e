use core::ops::Mul;

use bytemuck::{Pod, Zeroable};

use super::Vec2;

/// Column-major 4x4 matrix.
///
/// Element `(row, col)` lives at `m[col * 4 + row]`, which is the layout WGSL
/// `mat4x4<f32>` expects in a uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Transform {
    pub m: [f32; 16],
}

impl Transform {
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn translation(x: f32, y: f32) -> Self {
        let mut t = Self::IDENTITY;
        t.m[12] = x;
        t.m[13] = y;
        t
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        let mut t = Self::IDENTITY;
        t.m[0] = sx;
        t.m[5] = sy;
        t
    }

    /// Counter-clockwise rotation around Z (clockwise on screen, since +Y is down).
    pub fn rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        let mut t = Self::IDENTITY;
        t.m[0] = c;
        t.m[1] = s;
        t.m[4] = -s;
        t.m[5] = c;
        t
    }

    /// Maps logical pixels (top-left origin, +Y down) to clip space.
    pub fn ortho_top_left(width: f32, height: f32) -> Self {
        let w = width.max(1.0);
        let h = height.max(1.0);
        let mut t = Self::IDENTITY;
        t.m[0] = 2.0 / w;
        t.m[5] = -2.0 / h;
        t.m[12] = -1.0;
        t.m[13] = 1.0;
        t
    }

    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let m = &self.m;
        Vec2::new(
            m[0] * p.x + m[4] * p.y + m[12],
            m[1] * p.x + m[5] * p.y + m[13],
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;

    /// `a * b` applies `b` first.
    fn mul(self, rhs: Transform) -> Transform {
        let (a, b) = (&self.m, &rhs.m);
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
            }
        }
        Transform { m: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    #[test]
    fn identity_keeps_points() {
        let p = Vec2::new(3.0, -4.0);
        assert_eq!(Transform::IDENTITY.transform_point(p), p);
    }

    #[test]
    fn translation_then_scale_order() {
        let t = Transform::translation(10.0, 0.0) * Transform::scale(2.0, 2.0);
        assert!(close(t.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0)));
    }

    #[test]
    fn ortho_maps_corners_to_clip() {
        let t = Transform::ortho_top_left(200.0, 100.0);
        assert!(close(t.transform_point(Vec2::zero()), Vec2::new(-1.0, 1.0)));
        assert!(close(t.transform_point(Vec2::new(200.0, 100.0)), Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn rotation_quarter_turn() {
        let t = Transform::rotation(core::f32::consts::FRAC_PI_2);
        assert!(close(t.transform_point(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0)));
    }
}
