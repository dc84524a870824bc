#![no_main]
use libfuzzer_sys::fuzz_target;
use leptopix::*;

const FORMATS: [PixelFormat; 5] = [
    PixelFormat::Indexed1,
    PixelFormat::Indexed8,
    PixelFormat::Rgb24,
    PixelFormat::Rgb32,
    PixelFormat::Argb32,
];

fuzz_target!(|data: &[u8]| {
    // Header: format, width, height, extra stride bytes, palette length
    let [f, w, h, pad, pal, rest @ ..] = data else {
        return;
    };
    let format = FORMATS[usize::from(*f) % FORMATS.len()];
    let (width, height) = (u32::from(*w % 64) + 1, u32::from(*h % 64) + 1);
    let stride = format.min_stride(width) + usize::from(*pad % 8);
    let mut raw = rest.to_vec();
    raw.resize(stride * height as usize, 0);
    let Ok(mut bmp) = Bitmap::from_raw(width, height, format, stride, raw) else {
        return;
    };
    if format.is_indexed() {
        let palette = (0..usize::from(*pal))
            .map(|i| PixColor::new(i as u8, *pal, 255 - i as u8))
            .collect();
        bmp.set_palette(palette);
    }

    // Import may only fail on a missing or oversized palette, and must unlock either way
    let pix = match bitmap_to_pix(&bmp, enough::Unstoppable) {
        Ok(pix) => pix,
        Err(PixError::ColormapBuild { .. } | PixError::MissingPalette(_)) => {
            assert!(!bmp.is_locked());
            return;
        }
        Err(e) => panic!("unexpected import failure: {e}"),
    };
    assert!(!bmp.is_locked());

    let back = pix_to_bitmap(&pix, format.has_alpha(), enough::Unstoppable)
        .expect("export of an imported pix must succeed");
    for y in 0..height {
        for x in 0..width {
            let (a, b) = (bmp.get_pixel(x, y), back.get_pixel(x, y));
            if format.has_alpha() {
                assert_eq!(a, b, "roundtrip pixel mismatch at <{x},{y}>");
            } else {
                assert_eq!(a.map(PixColor::opaque), b.map(PixColor::opaque));
            }
        }
    }
});
