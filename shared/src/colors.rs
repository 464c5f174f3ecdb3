const FURNITURE_SATURATION: f64 = 0.55;
const FURNITURE_LIGHTNESS: f64 = 0.42;
const HIGHLIGHT_LIGHTNESS_BOOST: f64 = 0.18;

/// Deterministic furniture color via CRC32 hash of the display name.
/// The hash only picks the hue; saturation and lightness are fixed so every
/// unit stays readable against the floor color.
pub fn furniture_color(name: &str) -> (u8, u8, u8) {
    let hash = crc32fast::hash(name.as_bytes());
    let hue = (hash % 360) as f64;
    hsl_to_rgb(hue, FURNITURE_SATURATION, FURNITURE_LIGHTNESS)
}

/// Lighter variant of `rgb` used for hovered overlays.
pub fn highlight_color(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (h, s, l) = rgb_to_hsl(r, g, b);
    hsl_to_rgb(h, s, (l + HIGHLIGHT_LIGHTNESS_BOOST).min(0.9))
}

/// Convert RGB to HSL. Returns (h: 0..360, s: 0..1, l: 0..1).
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

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

    (h * 60.0, s, l)
}

/// Convert HSL to RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    (
        (hue_channel(p, q, h + 1.0 / 3.0) * 255.0).round() as u8,
        (hue_channel(p, q, h) * 255.0).round() as u8,
        (hue_channel(p, q, h - 1.0 / 3.0) * 255.0).round() as u8,
    )
}

fn hue_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
