use std::path::Path;

use super::*;

const FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/fonts/DejaVuSansMono.ttf");

fn rasterizer(font_size: f32, canvas: u32) -> GlyphRasterizer {
    let font = GlyphFont::load(Path::new(FONT), font_size).unwrap();
    GlyphRasterizer::new(font, canvas).unwrap()
}

#[test]
fn ink_bounds_cover_dark_pixels_only() {
    let mut img = GrayImage::from_pixel(6, 5, image::Luma([255]));
    img.put_pixel(1, 2, image::Luma([0]));
    img.put_pixel(3, 4, image::Luma([200]));

    let b = InkBounds::of_ink(&img, 255).unwrap();
    assert_eq!(
        b,
        InkBounds {
            x0: 1,
            y0: 2,
            x1: 4,
            y1: 5
        }
    );
    assert_eq!((b.width(), b.height()), (3, 3));

    assert!(InkBounds::of_ink(&GrayImage::from_pixel(3, 3, image::Luma([255])), 255).is_none());
}

#[test]
fn centered_position_allows_negative_offsets() {
    let small = InkBounds {
        x0: 0,
        y0: 0,
        x1: 4,
        y1: 6,
    };
    assert_eq!(centered_position(10, small), (3, 2));

    let big = InkBounds {
        x0: 5,
        y0: 5,
        x1: 19,
        y1: 17,
    };
    assert_eq!(centered_position(10, big), (-2, -1));
}

#[test]
fn rendered_glyph_is_centered_within_one_pixel() {
    let mut r = rasterizer(28.0, 32);
    for ch in ['@', 'o', 'I', '_', '`', '|'] {
        let bmp = r.render(ch).unwrap();
        assert_eq!(bmp.status, GlyphStatus::Inked, "{ch:?}");
        assert_eq!(bmp.image.dimensions(), (32, 32));

        let drawn = InkBounds::of_ink(&bmp.image, 255).unwrap();
        let cx = f64::from(drawn.x0 + drawn.x1) / 2.0;
        let cy = f64::from(drawn.y0 + drawn.y1) / 2.0;
        assert!((cx - 16.0).abs() <= 1.0, "{ch:?} x center {cx}");
        assert!((cy - 16.0).abs() <= 1.0, "{ch:?} y center {cy}");
    }
}

#[test]
fn background_is_white_and_ink_is_black() {
    let mut r = rasterizer(20.0, 24);
    let bmp = r.render('#').unwrap();
    assert_eq!(bmp.image.get_pixel(0, 0).0[0], 255);
    assert_eq!(bmp.image.pixels().map(|p| p.0[0]).min(), Some(0));
}

#[test]
fn space_renders_blank_canvas() {
    let mut r = rasterizer(16.0, 16);
    let bmp = r.render(' ').unwrap();
    assert_eq!(bmp.status, GlyphStatus::Blank);
    assert!(bmp.ink.is_none());
    assert!(bmp.image.pixels().all(|p| p.0[0] == 255));
}

#[test]
fn unsupported_char_renders_blank_and_is_flagged() {
    let mut r = rasterizer(16.0, 16);
    let bmp = r.render('漢').unwrap();
    assert_eq!(bmp.status, GlyphStatus::Missing);
    assert!(bmp.image.pixels().all(|p| p.0[0] == 255));
}

#[test]
fn oversized_glyph_is_clipped_not_scaled() {
    let mut r = rasterizer(40.0, 8);
    let bmp = r.render('I').unwrap();
    assert_eq!(bmp.image.dimensions(), (8, 8));
    assert!(bmp.position.0 < 0 || bmp.position.1 < 0);
    // Clipped to the canvas, still inked.
    assert!(bmp.image.pixels().any(|p| p.0[0] < 255));
}

#[test]
fn rendering_is_deterministic() {
    let mut a = rasterizer(12.0, 12);
    let mut b = rasterizer(12.0, 12);
    for ch in ['@', 'B', '%', '~'] {
        assert_eq!(a.render(ch).unwrap().image, b.render(ch).unwrap().image);
        // The cached context is reused between calls.
        assert_eq!(a.render(ch).unwrap().image, b.render(ch).unwrap().image);
    }
}

#[test]
fn measure_matches_render_ink_size() {
    let mut r = rasterizer(24.0, 40);
    let measured = r.measure('A').unwrap().unwrap();
    let bmp = r.render('A').unwrap();
    let drawn = InkBounds::of_ink(&bmp.image, 255).unwrap();
    assert!((drawn.width() - measured.width()).abs() <= 1);
    assert!((drawn.height() - measured.height()).abs() <= 1);
}

#[test]
fn zero_canvas_is_rejected() {
    let font = GlyphFont::load(Path::new(FONT), 10.0).unwrap();
    assert!(matches!(
        GlyphRasterizer::new(font, 0),
        Err(GlyphreelError::Validation(_))
    ));
}
