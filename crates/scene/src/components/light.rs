/// Linear RGB color from a `0xRRGGBB` literal.
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Light {
    /// Sky color from above, ground color from below, blended by normal.y.
    Hemisphere {
        sky: [f32; 3],
        ground: [f32; 3],
        intensity: f32,
    },
    Directional {
        color: [f32; 3],
        intensity: f32,
    },
    Point {
        color: [f32; 3],
        intensity: f32,
        range: Option<f32>,
    },
    Spot {
        color: [f32; 3],
        intensity: f32,
        range: Option<f32>,
    },
}

impl Light {
    pub fn hemisphere(sky_hex: u32, ground_hex: u32) -> Self {
        Light::Hemisphere {
            sky: rgb_from_hex(sky_hex),
            ground: rgb_from_hex(ground_hex),
            intensity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Light, rgb_from_hex};

    #[test]
    fn hex_colors_unpack_per_channel() {
        assert_eq!(rgb_from_hex(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb_from_hex(0x000000), [0.0, 0.0, 0.0]);
        let grey = rgb_from_hex(0x444444);
        assert!((grey[1] - 68.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn hemisphere_light_defaults_to_unit_intensity() {
        match Light::hemisphere(0xffffff, 0x444444) {
            Light::Hemisphere { sky, intensity, .. } => {
                assert_eq!(sky, [1.0, 1.0, 1.0]);
                assert_eq!(intensity, 1.0);
            }
            other => panic!("unexpected light: {other:?}"),
        }
    }
}
