use glyphgrid::{Glyph, GlyphGrid, FIRST_PRINTABLE, LAST_PRINTABLE};
use rand::Rng;

/// Overwrite every cell with a random printable character and random
/// palette colors.
pub fn fill_random<R: Rng>(grid: &mut GlyphGrid, rng: &mut R) {
    let colors = grid.palette().len().min(256);
    if colors == 0 {
        return;
    }
    for cell in grid.cells_mut() {
        let code = rng.gen_range(FIRST_PRINTABLE..=LAST_PRINTABLE);
        *cell = Glyph::new(
            char::from_u32(code).unwrap_or(' '),
            rng.gen_range(0..colors) as u8,
            rng.gen_range(0..colors) as u8,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphgrid::Palette;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn same_seed_same_grid() {
        let palette = Arc::new(Palette::base());
        let mut a = GlyphGrid::new(8, 4, Arc::clone(&palette));
        let mut b = GlyphGrid::new(8, 4, palette);
        fill_random(&mut a, &mut StdRng::seed_from_u64(7));
        fill_random(&mut b, &mut StdRng::seed_from_u64(7));
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn cells_stay_in_range() {
        let mut grid = GlyphGrid::new(16, 16, Arc::new(Palette::base()));
        fill_random(&mut grid, &mut StdRng::seed_from_u64(1));
        for g in grid.cells() {
            assert!(g.ch.is_ascii_graphic() || g.ch == ' ');
            assert!(g.fg < 16 && g.bg < 16);
        }
    }
}
