use enough::{Stop, StopReason, Unstoppable};
use leptopix::*;

fn gradient_palette(n: usize) -> Vec<PixColor> {
    (0..n)
        .map(|i| PixColor::new(i as u8, (255 - i) as u8, (i * 7) as u8))
        .collect()
}

fn assert_same_colors(a: &Bitmap, b: &Bitmap, check_alpha: bool) {
    assert_eq!(a.width(), b.width());
    assert_eq!(a.height(), b.height());
    for y in 0..a.height() {
        for x in 0..a.width() {
            let (pa, pb) = (a.get_pixel(x, y).unwrap(), b.get_pixel(x, y).unwrap());
            if check_alpha {
                assert_eq!(pa, pb, "pixel <{x},{y}>");
            } else {
                assert_eq!(pa.opaque(), pb.opaque(), "pixel <{x},{y}>");
            }
        }
    }
}

fn roundtrip(bmp: &Bitmap) -> (Pix, Bitmap) {
    let pix = bitmap_to_pix(bmp, Unstoppable).unwrap();
    assert!(!bmp.is_locked());
    let back = pix_to_bitmap(&pix, bmp.format().has_alpha(), Unstoppable).unwrap();
    (pix, back)
}

#[test]
fn indexed1_roundtrip_odd_width() {
    let mut bmp = Bitmap::new(13, 3, PixelFormat::Indexed1).unwrap();
    bmp.set_palette(vec![PixColor::new(250, 240, 230), PixColor::new(5, 10, 15)]);
    for y in 0..3 {
        for x in 0..13 {
            bmp.set_index(x, y, ((x * 3 + y) % 2) as u8).unwrap();
        }
    }

    let (pix, back) = roundtrip(&bmp);
    assert_eq!(pix.depth(), 1);
    assert_eq!(pix.words_per_line(), 1);
    assert_eq!(pix.colormap().unwrap().colors(), bmp.palette());
    for y in 0..3 {
        for x in 0..13 {
            assert_eq!(pix.pixel(x, y), Some(u32::from(bmp.index(x, y).unwrap())));
        }
    }
    assert_eq!(back.format(), PixelFormat::Indexed1);
    assert_eq!(back.palette(), bmp.palette());
    assert_same_colors(&bmp, &back, true);
}

#[test]
fn indexed8_palette_passthrough() {
    let n = 37;
    let mut bmp = Bitmap::new(7, 5, PixelFormat::Indexed8).unwrap();
    bmp.set_palette(gradient_palette(n));
    for y in 0..5 {
        for x in 0..7 {
            bmp.set_index(x, y, ((x + y * 7) as usize % n) as u8).unwrap();
        }
    }

    let (pix, back) = roundtrip(&bmp);
    assert_eq!(pix.depth(), 8);
    assert_eq!(pix.colormap().unwrap().count(), n);
    for y in 0..5 {
        for x in 0..7 {
            assert_eq!(pix.pixel(x, y), Some(u32::from(bmp.index(x, y).unwrap())));
            assert_eq!(back.index(x, y), bmp.index(x, y));
        }
    }
    assert_eq!(back.format(), PixelFormat::Indexed8);
    assert_eq!(back.palette(), bmp.palette());
    assert_same_colors(&bmp, &back, true);
}

#[test]
fn direct_formats_roundtrip() {
    for format in [PixelFormat::Rgb24, PixelFormat::Rgb32, PixelFormat::Argb32] {
        let mut bmp = Bitmap::new(5, 4, format).unwrap();
        for y in 0..4u32 {
            for x in 0..5u32 {
                let c = PixColor::with_alpha((x * 50) as u8, (y * 60) as u8, 77, (x * y * 20) as u8);
                bmp.set_pixel(x, y, c).unwrap();
            }
        }
        let (pix, back) = roundtrip(&bmp);
        assert_eq!(pix.depth(), 32, "{format:?}");
        assert!(pix.colormap().is_none());
        let expected = if format.has_alpha() {
            PixelFormat::Argb32
        } else {
            PixelFormat::Rgb32
        };
        assert_eq!(back.format(), expected);
        assert_same_colors(&bmp, &back, format.has_alpha());
    }
}

#[test]
fn rgb_formats_are_opaque() {
    let mut raw = Bitmap::new(1, 1, PixelFormat::Rgb32).unwrap();
    {
        // Rgb32's 4th byte is padding; junk there must not leak into alpha.
        let mut data = raw.lock_bits_mut().unwrap();
        data.row_mut(0).unwrap().copy_from_slice(&[1, 2, 3, 9]);
    }
    let pix = bitmap_to_pix(&raw, Unstoppable).unwrap();
    assert_eq!(pix.pixel(0, 0), Some(0x0302_01FF));
}

#[test]
fn argb32_2x2_scenario() {
    // (B, G, R, A) per pixel
    let quads: [[u8; 4]; 4] = [
        [0x10, 0x20, 0x30, 0xFF],
        [0x00, 0x80, 0xFF, 0x00],
        [0xAA, 0xBB, 0xCC, 0x7F],
        [0x01, 0x02, 0x03, 0x04],
    ];
    let data: Vec<u8> = quads.iter().flatten().copied().collect();
    let bmp = Bitmap::from_raw(2, 2, PixelFormat::Argb32, 8, data).unwrap();
    let pix = bitmap_to_pix(&bmp, Unstoppable).unwrap();
    for (i, q) in quads.iter().enumerate() {
        let (x, y) = ((i % 2) as u32, (i / 2) as u32);
        assert_eq!(
            pix.pixel(x, y),
            Some(codec::encode_as_rgba(q[2], q[1], q[0], q[3])),
            "<{x},{y}>"
        );
    }
}

#[test]
fn gray8_exports_replicated() {
    let mut pix = Pix::create(4, 1, 8).unwrap();
    for x in 0..4 {
        pix.set_pixel(x, 0, x * 60 + 3).unwrap();
    }
    let bmp = pix_to_bitmap(&pix, false, Unstoppable).unwrap();
    assert_eq!(bmp.format(), PixelFormat::Rgb32);
    for x in 0..4u32 {
        let g = (x * 60 + 3) as u8;
        assert_eq!(bmp.get_pixel(x, 0), Some(PixColor::new(g, g, g)));
    }
}

#[test]
fn resolution_is_rounded() {
    let mut bmp = Bitmap::new(1, 1, PixelFormat::Rgb24).unwrap();
    bmp.set_resolution(299.6, 150.2);
    let pix = bitmap_to_pix(&bmp, Unstoppable).unwrap();
    assert_eq!((pix.x_res(), pix.y_res()), (300, 150));
    let back = pix_to_bitmap(&pix, false, Unstoppable).unwrap();
    assert_eq!(back.horizontal_resolution(), 300.0);
}

#[test]
fn unsupported_format_is_rejected() {
    let bmp = Bitmap::new(4, 4, PixelFormat::Rgb565).unwrap();
    let err = bitmap_to_pix(&bmp, Unstoppable).unwrap_err();
    assert!(matches!(
        err,
        PixError::UnsupportedPixelFormat(PixelFormat::Rgb565)
    ));
    assert!(!err.rolled_back());
    assert!(!bmp.is_locked());
}

#[test]
fn oversized_palette_rolls_back() {
    let mut bmp = Bitmap::new(8, 1, PixelFormat::Indexed1).unwrap();
    bmp.set_palette(gradient_palette(3));
    let err = bitmap_to_pix(&bmp, Unstoppable).unwrap_err();
    assert!(matches!(
        err,
        PixError::ColormapBuild {
            index: 2,
            capacity: 2
        }
    ));
    assert!(err.rolled_back());
    assert!(!bmp.is_locked());
}

#[test]
fn locked_source_is_refused() {
    let bmp = Bitmap::new(2, 2, PixelFormat::Rgb24).unwrap();
    let guard = bmp.lock_bits().unwrap();
    let err = bitmap_to_pix(&bmp, Unstoppable).unwrap_err();
    assert!(matches!(err, PixError::AlreadyLocked));
    drop(guard);
    assert!(bitmap_to_pix(&bmp, Unstoppable).is_ok());
}

#[test]
fn limits_reject_before_allocating() {
    let bmp = Bitmap::new(100, 100, PixelFormat::Rgb24).unwrap();
    let limits = Limits {
        max_memory_bytes: Some(1000),
        ..Default::default()
    };
    let err = ImportRequest::new(&bmp)
        .with_limits(&limits)
        .convert(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, PixError::LimitExceeded(_)));
    assert!(!err.rolled_back());
    assert!(!bmp.is_locked());

    let pix = Pix::create(100, 100, 32).unwrap();
    let limits = Limits {
        max_pixels: Some(99),
        ..Default::default()
    };
    let result = ExportRequest::new(&pix)
        .with_limits(&limits)
        .convert(Unstoppable);
    match result.unwrap_err() {
        PixError::LimitExceeded(_) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
}

struct AlwaysStop;

impl Stop for AlwaysStop {
    fn check(&self) -> Result<(), StopReason> {
        Err(StopReason::Cancelled)
    }
}

#[test]
fn cancellation_releases_everything() {
    let bmp = Bitmap::new(4, 4, PixelFormat::Argb32).unwrap();
    let err = bitmap_to_pix(&bmp, AlwaysStop).unwrap_err();
    assert!(matches!(err, PixError::Cancelled(_)));
    assert!(err.rolled_back());
    assert!(!bmp.is_locked());

    let pix = Pix::create(4, 4, 32).unwrap();
    let err = pix_to_bitmap(&pix, true, AlwaysStop).unwrap_err();
    assert!(matches!(err, PixError::Cancelled(_)));
}

#[test]
fn colormap_ownership_moves_with_pix() {
    let mut cmap = PixColormap::create(8).unwrap();
    cmap.add_color(PixColor::new(9, 8, 7));
    let mut pix = Pix::create(1, 1, 8).unwrap();
    pix.set_colormap(cmap).unwrap();

    let copy = pix.clone();
    pix.colormap_mut()
        .unwrap()
        .set(0, PixColor::new(1, 1, 1))
        .unwrap();
    assert_eq!(copy.colormap().unwrap().get(0).unwrap(), PixColor::new(9, 8, 7));
    assert_eq!(pix.color_at(0, 0), Some(PixColor::new(1, 1, 1)));
}
