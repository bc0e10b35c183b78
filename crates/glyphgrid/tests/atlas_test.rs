use glyphgrid::test_support::SolidFace;
use glyphgrid::{BitmapFace, GlyphAtlas, RenderError, RUNE_COUNT};
use pretty_assertions::assert_eq;

#[test]
fn rects_are_uniform_ordered_and_disjoint() {
    let atlas = GlyphAtlas::build(&BitmapFace::vga()).unwrap();
    let rects = atlas.rects();
    assert_eq!(rects.len(), RUNE_COUNT as usize);
    for (i, rect) in rects.iter().enumerate() {
        assert_eq!(rect.width(), atlas.cell_width());
        assert_eq!(rect.height(), atlas.cell_height());
        assert_eq!(rect.x0, i as u32 * atlas.cell_width());
        assert_eq!(rect.y0, 0);
    }
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn canvas_size_follows_cell_size() {
    let atlas = GlyphAtlas::build(&SolidFace::new(3, 5)).unwrap();
    assert_eq!((atlas.cell_width(), atlas.cell_height()), (3, 5));
    assert_eq!((atlas.width(), atlas.height()), (RUNE_COUNT * 3, 5));
    assert_eq!(atlas.pixels().len(), (RUNE_COUNT * 3 * 5 * 4) as usize);
}

#[test]
fn solid_glyphs_cover_their_cell() {
    let atlas = GlyphAtlas::build(&SolidFace::new(3, 5)).unwrap();
    let block = atlas.view('#').unwrap();
    let space = atlas.view(' ').unwrap();
    for y in 0..5 {
        for x in 0..3 {
            assert_eq!(block.coverage(x, y), 255);
            assert_eq!(space.coverage(x, y), 0);
        }
    }
    assert_eq!(block.coverage(3, 0), 0, "views clip to their own cell");
}

#[test]
fn non_printable_characters_have_no_view() {
    let atlas = GlyphAtlas::build(&BitmapFace::vga()).unwrap();
    assert!(atlas.view('\n').is_none());
    assert!(atlas.view('é').is_none());
    assert_eq!(atlas.slot('~'), Some(94));
}

#[test]
fn zero_width_face_is_rejected() {
    let err = GlyphAtlas::build(&SolidFace::new(0, 5)).unwrap_err();
    assert!(matches!(err, RenderError::Font(_)));
}

#[test]
fn exported_image_matches_canvas() {
    let atlas = GlyphAtlas::build(&BitmapFace::vga()).unwrap();
    let image = atlas.to_image();
    assert_eq!(image.dimensions(), (atlas.width(), atlas.height()));
    assert_eq!(image.as_raw().as_slice(), atlas.pixels());
}
