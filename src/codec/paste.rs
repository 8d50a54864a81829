use image::{DynamicImage, GenericImageView, RgbImage, RgbaImage};

/// Paste `layer` onto `canvas` at the origin, clipped to the canvas.
///
/// A layer with an alpha channel is blended through its own alpha as mask:
/// every channel becomes `(src * m + dst * (255 - m)) / 255`, so `m = 255`
/// replaces the destination and `m = 0` leaves it untouched. Layers without
/// alpha overwrite the destination.
///
/// RGB and RGBA canvases are blended in place; any other canvas is promoted
/// to RGBA first.
pub fn paste(canvas: &mut DynamicImage, layer: &DynamicImage) {
    match canvas {
        DynamicImage::ImageRgb8(dst) => paste_rgb(dst, layer),
        DynamicImage::ImageRgba8(dst) => paste_rgba(dst, layer),
        other => {
            let mut dst = other.to_rgba8();
            paste_rgba(&mut dst, layer);
            *other = DynamicImage::ImageRgba8(dst);
        }
    }
}

fn overlap(canvas: (u32, u32), layer: &DynamicImage) -> (u32, u32) {
    let (w, h) = layer.dimensions();
    (w.min(canvas.0), h.min(canvas.1))
}

fn paste_rgb(dst: &mut RgbImage, layer: &DynamicImage) {
    let (w, h) = overlap(dst.dimensions(), layer);

    if layer.color().has_alpha() {
        let src = layer.to_rgba8();
        for y in 0..h {
            for x in 0..w {
                let s = src.get_pixel(x, y);
                let d = dst.get_pixel_mut(x, y);
                let mask = s[3];
                for c in 0..3 {
                    d[c] = blend(s[c], d[c], mask);
                }
            }
        }
    } else {
        let src = layer.to_rgb8();
        for y in 0..h {
            for x in 0..w {
                dst.put_pixel(x, y, *src.get_pixel(x, y));
            }
        }
    }
}

fn paste_rgba(dst: &mut RgbaImage, layer: &DynamicImage) {
    let (w, h) = overlap(dst.dimensions(), layer);
    let src = layer.to_rgba8();

    if layer.color().has_alpha() {
        for y in 0..h {
            for x in 0..w {
                let s = src.get_pixel(x, y);
                let d = dst.get_pixel_mut(x, y);
                let mask = s[3];
                for c in 0..4 {
                    d[c] = blend(s[c], d[c], mask);
                }
            }
        }
    } else {
        for y in 0..h {
            for x in 0..w {
                dst.put_pixel(x, y, *src.get_pixel(x, y));
            }
        }
    }
}

#[inline]
fn blend(src: u8, dst: u8, mask: u8) -> u8 {
    let mask = mask as u16;
    ((src as u16 * mask + dst as u16 * (255 - mask) + 127) / 255) as u8
}
