//! Team recoloring of sprite pixmaps
//!
//! Sprites are drawn in the neutral (blue) team colors. Pixels whose hue lies in
//! the configured blue band, and that are saturated enough not to be gray trim,
//! are hue-rotated by a per-team offset. This only affects what is displayed;
//! the map color table uses the declared color variants.

use image::{Rgba, RgbaImage};

use crate::models::Team;

/// Number of teams with a hue shift entry (0..=6).
pub const SHIFTED_TEAMS: usize = 7;

/// Default per-team hue shifts as fractions of a full turn.
pub const DEFAULT_TEAM_SHIFTS: [f64; SHIFTED_TEAMS] = [0.0, 0.4, 0.73, 0.18, 0.48, 0.9, 0.1];

/// HSV color with every component in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Convert RGB to HSV. Hue is a fraction in [0, 1).
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let s = if max > 0.0 { d / max } else { 0.0 };
    if d < f64::EPSILON {
        return Hsv { h: 0.0, s, v: max };
    }

    let h = if (max - r).abs() < f64::EPSILON {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsv { h: (h / 6.0).rem_euclid(1.0), s, v: max }
}

/// Convert HSV back to 8-bit RGB.
pub fn hsv_to_rgb(hsv: Hsv) -> (u8, u8, u8) {
    let h = hsv.h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let v = hsv.v;
    let p = v * (1.0 - hsv.s);
    let q = v * (1.0 - hsv.s * f);
    let t = v * (1.0 - hsv.s * (1.0 - f));

    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    let to_byte = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

/// The team hue-shift table and the band of hues it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamPalette {
    /// Inclusive hue range considered "team blue"
    pub hue_band: (f64, f64),
    /// Pixels at or below this saturation are left alone
    pub min_saturation: f64,
    /// Shift for teams 0..=6; any other team is not shifted
    pub shifts: [f64; SHIFTED_TEAMS],
}

impl Default for TeamPalette {
    fn default() -> Self {
        Self { hue_band: (0.5, 0.75), min_saturation: 0.1, shifts: DEFAULT_TEAM_SHIFTS }
    }
}

impl TeamPalette {
    /// Hue shift for a team. Teams outside 0..=6 (including spectator) land in
    /// the reserved no-shift bucket.
    pub fn shift_for(&self, team: Team) -> f64 {
        self.shifts.get(team as usize).copied().unwrap_or(0.0)
    }

    /// Recolor one pixel for a team.
    pub fn recolor_pixel(&self, pixel: Rgba<u8>, team: Team) -> Rgba<u8> {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            return pixel;
        }
        let shift = self.shift_for(team);
        if shift == 0.0 {
            return pixel;
        }

        let mut hsv = rgb_to_hsv(r, g, b);
        let (lo, hi) = self.hue_band;
        if hsv.s <= self.min_saturation || hsv.h < lo || hsv.h > hi {
            return pixel;
        }

        hsv.h = (hsv.h + shift).rem_euclid(1.0);
        let (r, g, b) = hsv_to_rgb(hsv);
        Rgba([r, g, b, a])
    }

    /// Recolor a whole sprite for a team.
    pub fn recolor(&self, sprite: &RgbaImage, team: Team) -> RgbaImage {
        let mut out = sprite.clone();
        if self.shift_for(team) == 0.0 {
            return out;
        }
        for pixel in out.pixels_mut() {
            *pixel = self.recolor_pixel(*pixel, team);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SPECTATOR_TEAM;

    const BLUE: Rgba<u8> = Rgba([40, 80, 200, 255]);

    #[test]
    fn test_rgb_to_hsv_primaries() {
        let red = rgb_to_hsv(255, 0, 0);
        assert!(red.h.abs() < 1e-9);
        assert!((red.s - 1.0).abs() < 1e-9);

        let blue = rgb_to_hsv(0, 0, 255);
        assert!((blue.h - 2.0 / 3.0).abs() < 1e-9);

        let gray = rgb_to_hsv(128, 128, 128);
        assert_eq!(gray.s, 0.0);
    }

    #[test]
    fn test_hsv_roundtrip_preserves_color() {
        for (r, g, b) in [(40, 80, 200), (255, 128, 0), (12, 200, 99), (0, 0, 0)] {
            assert_eq!(hsv_to_rgb(rgb_to_hsv(r, g, b)), (r, g, b));
        }
    }

    #[test]
    fn test_team_zero_and_spectator_unchanged() {
        let palette = TeamPalette::default();
        assert_eq!(palette.recolor_pixel(BLUE, 0), BLUE);
        assert_eq!(palette.recolor_pixel(BLUE, SPECTATOR_TEAM), BLUE);
        assert_eq!(palette.recolor_pixel(BLUE, 7), BLUE);
    }

    #[test]
    fn test_blue_pixels_are_shifted() {
        let palette = TeamPalette::default();
        let red_team = palette.recolor_pixel(BLUE, 1);
        assert_ne!(red_team, BLUE);
        assert_eq!(red_team.0[3], 255);

        let before = rgb_to_hsv(40, 80, 200);
        let after = rgb_to_hsv(red_team.0[0], red_team.0[1], red_team.0[2]);
        let expected = (before.h + 0.4).rem_euclid(1.0);
        assert!((after.h - expected).abs() < 0.01);
    }

    #[test]
    fn test_gray_transparent_and_off_band_pixels_untouched() {
        let palette = TeamPalette::default();
        let gray = Rgba([120, 120, 130, 255]);
        let clear = Rgba([40, 80, 200, 0]);
        let green = Rgba([20, 200, 40, 255]);
        assert_eq!(palette.recolor_pixel(gray, 2), gray);
        assert_eq!(palette.recolor_pixel(clear, 2), clear);
        assert_eq!(palette.recolor_pixel(green, 2), green);
    }

    #[test]
    fn test_recolor_image() {
        let palette = TeamPalette::default();
        let mut sprite = RgbaImage::new(2, 1);
        sprite.put_pixel(0, 0, BLUE);
        sprite.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        let out = palette.recolor(&sprite, 3);
        assert_ne!(*out.get_pixel(0, 0), BLUE);
        assert_eq!(*out.get_pixel(1, 0), Rgba([200, 200, 200, 255]));
    }
}
