use rand::Rng;
use ratatui::layout::Rect;

const DROPS: usize = 24;
const LIFETIME_TICKS: u16 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Droplet {
    column: u16,
    row: i32,
    speed: i32,
}

/// Falling emoji overlay played once per received broadcast.
#[derive(Debug, Clone)]
pub struct RainOverlay {
    emoji: String,
    drops: Vec<Droplet>,
    ticks_left: u16,
}

impl RainOverlay {
    pub fn new(emoji: String, width: u16) -> Self {
        Self::with_rng(emoji, width, &mut rand::thread_rng())
    }

    fn with_rng<R: Rng + ?Sized>(emoji: String, width: u16, rng: &mut R) -> Self {
        let columns = width.saturating_sub(2).max(1);
        let drops = (0..DROPS)
            .map(|_| Droplet {
                column: rng.gen_range(0..columns),
                row: -rng.gen_range(0..12),
                speed: rng.gen_range(1..=2),
            })
            .collect();
        Self {
            emoji,
            drops,
            ticks_left: LIFETIME_TICKS,
        }
    }

    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    /// Advance one frame. Returns `false` once the rain is over.
    pub fn tick(&mut self) -> bool {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        for drop in &mut self.drops {
            drop.row += drop.speed;
        }
        self.ticks_left > 0
    }

    /// Cells inside `area` that currently show a drop.
    pub fn cells(&self, area: Rect) -> Vec<Rect> {
        self.drops
            .iter()
            .filter_map(|drop| {
                let row = u16::try_from(drop.row).ok()?;
                if row >= area.height || drop.column + 1 >= area.width {
                    return None;
                }
                Some(Rect::new(area.x + drop.column, area.y + row, 2, 1))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn drops_fall_and_rain_expires() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut rain = RainOverlay::with_rng("🎉".to_string(), 40, &mut rng);
        let area = Rect::new(0, 0, 40, 20);
        let mut ticks = 0;
        while rain.tick() {
            ticks += 1;
        }
        assert_eq!(ticks, LIFETIME_TICKS - 1);
        assert!(rain.cells(area).is_empty());
    }

    #[test]
    fn cells_stay_inside_area() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut rain = RainOverlay::with_rng("🚀".to_string(), 30, &mut rng);
        let area = Rect::new(5, 2, 30, 10);
        for _ in 0..8 {
            rain.tick();
            for cell in rain.cells(area) {
                assert!(cell.x >= area.x && cell.right() <= area.right());
                assert!(cell.y >= area.y && cell.bottom() <= area.bottom());
            }
        }
    }
}
