//! # Weather Effects
//!
//! Particle layers composited over every scene while a weather setting is
//! active. Particles live in screen space and re-seed themselves whenever
//! the surface changes size.

use crate::config::Weather;
use crate::rendering::{Surface, Style};
use crate::scenes::{SceneContext, SceneLayer};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SNOW_Z: i32 = 300;
pub const RAIN_Z: i32 = 310;

/// One particle per this many screen cells.
const CELLS_PER_FLAKE: i32 = 40;
const CELLS_PER_DROP: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Particle {
    col: f32,
    row: f32,
    speed: f32,
}

#[derive(Debug)]
struct ParticleField {
    rng: StdRng,
    size: (i32, i32),
    density: i32,
    particles: Vec<Particle>,
}

impl ParticleField {
    fn new(seed: u64, density: i32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            size: (0, 0),
            density,
            particles: Vec::new(),
        }
    }

    fn fit(&mut self, size: (i32, i32), speeds: (f32, f32)) {
        if size == self.size {
            return;
        }
        self.size = size;
        let (cols, rows) = size;
        let count = if cols > 0 && rows > 0 { (cols * rows / self.density).max(1) } else { 0 };
        self.particles = (0..count)
            .map(|_| Particle {
                col: self.rng.gen_range(0.0..cols as f32),
                row: self.rng.gen_range(0.0..rows as f32),
                speed: self.rng.gen_range(speeds.0..speeds.1),
            })
            .collect();
        debug!("Weather field resized to {}x{} with {} particles", cols, rows, count);
    }

    /// Advances every particle, wrapping at the bottom with a new column.
    fn fall(&mut self, drift: f32) {
        let (cols, rows) = self.size;
        for particle in &mut self.particles {
            particle.row += particle.speed;
            particle.col += drift;
            if particle.row >= rows as f32 {
                particle.row = 0.0;
                particle.col = self.rng.gen_range(0.0..cols as f32);
            }
            if particle.col < 0.0 {
                particle.col += cols as f32;
            } else if particle.col >= cols as f32 {
                particle.col -= cols as f32;
            }
        }
    }

    fn draw(&self, surface: &mut dyn Surface, glyph: impl Fn(&Particle) -> char, style: Style) {
        for particle in &self.particles {
            surface.put(particle.col as i32, particle.row as i32, glyph(particle), style);
        }
    }
}

/// Slow, sideways-drifting snow.
#[derive(Debug)]
pub struct SnowLayer {
    field: ParticleField,
}

impl SnowLayer {
    pub fn new(seed: u64) -> Self {
        Self {
            field: ParticleField::new(seed, CELLS_PER_FLAKE),
        }
    }
}

impl SceneLayer for SnowLayer {
    fn name(&self) -> &str {
        "snow"
    }

    fn z_index(&self) -> i32 {
        SNOW_Z
    }

    fn draw(&mut self, surface: &mut dyn Surface, frame: u64, ctx: &SceneContext<'_>) {
        self.field.fit(surface.size(), (0.2, 0.6));
        let drift = if frame % 40 < 20 { 0.1 } else { -0.1 };
        self.field.fall(drift);
        let style = Style::new(ctx.colors.get("snow"), ctx.colors.background("black"));
        self.field
            .draw(surface, |flake| if flake.speed > 0.4 { '*' } else { '.' }, style);
    }
}

/// Fast, straight rain.
#[derive(Debug)]
pub struct RainLayer {
    field: ParticleField,
}

impl RainLayer {
    pub fn new(seed: u64) -> Self {
        Self {
            field: ParticleField::new(seed, CELLS_PER_DROP),
        }
    }
}

impl SceneLayer for RainLayer {
    fn name(&self) -> &str {
        "rain"
    }

    fn z_index(&self) -> i32 {
        RAIN_Z
    }

    fn draw(&mut self, surface: &mut dyn Surface, _frame: u64, ctx: &SceneContext<'_>) {
        self.field.fit(surface.size(), (0.8, 1.6));
        self.field.fall(0.0);
        let style = Style::new(ctx.colors.get("rain"), ctx.colors.background("black"));
        self.field.draw(surface, |_| '|', style);
    }
}

/// Global layers drawn over every scene.
#[derive(Default)]
pub struct EffectRegistry {
    layers: Vec<Box<dyn SceneLayer>>,
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.layers.iter().map(|layer| layer.name()).collect();
        f.debug_struct("EffectRegistry").field("layers", &names).finish()
    }
}

impl EffectRegistry {
    /// Registry holding the layer for `weather`, if any.
    pub fn from_weather(weather: Weather, seed: u64) -> Self {
        let mut registry = Self::default();
        match weather {
            Weather::None => {}
            Weather::Snow => registry.register(Box::new(SnowLayer::new(seed))),
            Weather::Rain => registry.register(Box::new(RainLayer::new(seed))),
        }
        registry
    }

    pub fn register(&mut self, layer: Box<dyn SceneLayer>) {
        debug!("Registered global effect {}", layer.name());
        self.layers.push(layer);
    }

    pub fn layers_mut(&mut self) -> &mut [Box<dyn SceneLayer>] {
        &mut self.layers
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::{CellBuffer, ColorTable};

    fn count_glyphs(buffer: &CellBuffer, glyphs: &[char]) -> usize {
        buffer.to_text().chars().filter(|ch| glyphs.contains(ch)).count()
    }

    #[test]
    fn test_registry_follows_weather() {
        assert!(EffectRegistry::from_weather(Weather::None, 1).is_empty());
        let mut snow = EffectRegistry::from_weather(Weather::Snow, 1);
        assert_eq!(snow.len(), 1);
        assert_eq!(snow.layers_mut()[0].z_index(), SNOW_Z);
        let mut rain = EffectRegistry::from_weather(Weather::Rain, 1);
        assert_eq!(rain.layers_mut()[0].name(), "rain");
        rain.clear();
        assert!(rain.is_empty());
    }

    #[test]
    fn test_rain_draws_inside_border() {
        let colors = ColorTable::default();
        let ctx = SceneContext { colors: &colors, menu: None };
        let mut buffer = CellBuffer::new(40, 20);
        let mut rain = RainLayer::new(3);
        rain.draw(&mut buffer, 0, &ctx);
        assert!(count_glyphs(&buffer, &['|']) > 0);
        assert!(buffer.row_text(0).chars().all(|ch| ch == ' '));
    }

    #[test]
    fn test_field_refits_on_resize() {
        let colors = ColorTable::default();
        let ctx = SceneContext { colors: &colors, menu: None };
        let mut snow = SnowLayer::new(5);
        snow.draw(&mut CellBuffer::new(40, 20), 0, &ctx);
        let small = snow.field.particles.len();
        snow.draw(&mut CellBuffer::new(80, 40), 1, &ctx);
        assert!(snow.field.particles.len() > small);
        assert!(snow
            .field
            .particles
            .iter()
            .all(|p| p.col >= 0.0 && p.col < 80.0 && p.row >= 0.0 && p.row < 40.0));
    }

    #[test]
    fn test_same_seed_same_snow() {
        let colors = ColorTable::default();
        let ctx = SceneContext { colors: &colors, menu: None };
        let mut a = SnowLayer::new(9);
        let mut b = SnowLayer::new(9);
        let mut buffer_a = CellBuffer::new(30, 12);
        let mut buffer_b = CellBuffer::new(30, 12);
        for frame in 0..5 {
            a.draw(&mut buffer_a, frame, &ctx);
            b.draw(&mut buffer_b, frame, &ctx);
        }
        assert_eq!(buffer_a.to_text(), buffer_b.to_text());
    }
}
