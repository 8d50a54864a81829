use crate::error::RasterError;

/// CSS basic color keywords.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("maroon", [128, 0, 0]),
    ("red", [255, 0, 0]),
    ("purple", [128, 0, 128]),
    ("fuchsia", [255, 0, 255]),
    ("magenta", [255, 0, 255]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("olive", [128, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("navy", [0, 0, 128]),
    ("blue", [0, 0, 255]),
    ("teal", [0, 128, 128]),
    ("aqua", [0, 255, 255]),
    ("cyan", [0, 255, 255]),
    ("orange", [255, 165, 0]),
];

/// Parse a color string into an RGB triple.
///
/// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `rgb(r%, g%, b%)` and CSS basic
/// color names, case-insensitive.
///
/// ```
/// use raster_compose::merge::parse_color;
///
/// assert_eq!(parse_color("#ff8000").unwrap(), [255, 128, 0]);
/// assert_eq!(parse_color("#fff").unwrap(), [255, 255, 255]);
/// assert_eq!(parse_color("rgb(0, 50%, 100%)").unwrap(), [0, 128, 255]);
/// ```
pub fn parse_color(value: &str) -> Result<[u8; 3], RasterError> {
    let invalid = || RasterError::InvalidColor(value.to_string());
    let color = value.trim().to_ascii_lowercase();

    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    if let Some(args) = color
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args).ok_or_else(invalid);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == color)
        .map(|(_, rgb)| *rgb)
        .ok_or_else(invalid)
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(rgb)
        }
        6 => Some([
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ]),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<[u8; 3]> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }

    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        *slot = match part.strip_suffix('%') {
            Some(pct) => {
                let pct: f32 = pct.trim().parse().ok()?;
                if !(0.0..=100.0).contains(&pct) {
                    return None;
                }
                (pct * 255.0 / 100.0).round() as u8
            }
            None => part.parse::<u8>().ok()?,
        };
    }
    Some(rgb)
}
