//! Tests for the particle field: bounds, determinism, and link geometry.

use glam::Vec2;

use crate::field::{default_density, FieldConfig, Particle, ParticleField};
use crate::surface::{Rgba, Surface};

/// Records the drawing command stream instead of executing it.
#[derive(Default)]
struct RecordingSurface {
    commands: Vec<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Clear,
    Circle { alpha: u8 },
    Line { from: Vec2, to: Vec2 },
}

impl Surface for RecordingSurface {
    fn clear(&mut self, _color: Rgba) {
        self.commands.push(Command::Clear);
    }

    fn fill_circle(&mut self, _center: Vec2, _radius: f32, color: Rgba) {
        self.commands.push(Command::Circle { alpha: color.a });
    }

    fn line_segment(&mut self, from: Vec2, to: Vec2, _color: Rgba, _width: f32) {
        self.commands.push(Command::Line { from, to });
    }
}

impl RecordingSurface {
    fn lines(&self) -> Vec<(Vec2, Vec2)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Line { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::Circle { .. }))
            .count()
    }
}

fn field_with(seed: u64, width: u32, height: u32, count: usize) -> ParticleField {
    let mut field = ParticleField::new(FieldConfig {
        seed,
        ..Default::default()
    });
    field.resize(width, height);
    field.initialize(|_| count);
    field
}

/// A stationary particle for link-geometry tests.
fn dot(x: f32, y: f32) -> Particle {
    Particle {
        position: Vec2::new(x, y),
        velocity: Vec2::ZERO,
        radius: 1.0,
        opacity: 0.5,
    }
}

fn assert_all_in_bounds(field: &ParticleField) {
    let (w, h) = (field.width() as f32, field.height() as f32);
    for (i, particle) in field.particles().iter().enumerate() {
        let p = particle.position;
        assert!(
            p.x >= 0.0 && p.x < w && p.y >= 0.0 && p.y < h,
            "particle {i} out of bounds at {p:?} in {w}x{h}"
        );
    }
}

// ---- Initialization ----

#[test]
fn test_initialize_count_matches_density() {
    let mut field = ParticleField::new(FieldConfig::default());
    field.resize(800, 600);
    field.initialize(default_density);
    assert_eq!(field.len(), 60);

    field.resize(640, 480);
    field.initialize(default_density);
    assert_eq!(field.len(), 30);

    field.initialize(|width| width as usize / 10);
    assert_eq!(field.len(), 64);
}

#[test]
fn test_initialize_spawns_in_bounds() {
    let field = field_with(7, 800, 600, 60);
    assert_all_in_bounds(&field);
}

#[test]
fn test_resize_before_initialize_is_observed() {
    let mut field = ParticleField::new(FieldConfig::default());
    field.resize(1024, 700);
    field.initialize(default_density);

    assert_eq!(field.len(), default_density(1024));
    assert_eq!((field.width(), field.height()), (1024, 700));
    assert_all_in_bounds(&field);
}

#[test]
fn test_initialize_on_zero_size_spawns_nothing() {
    let mut field = ParticleField::new(FieldConfig::default());
    field.initialize(default_density);
    assert_eq!(field.len(), 0);

    // Ticking an uninitialized field is a no-op, not a panic.
    field.tick();
    assert_eq!(field.len(), 0);
}

// ---- Tick / bounds ----

#[test]
fn test_particles_in_bounds_after_every_tick() {
    // 800x600, 30 particles, 1000 ticks, fixed seed.
    let mut field = field_with(2024, 800, 600, 30);

    for _ in 0..1000 {
        field.tick();
        assert_eq!(field.len(), 30);
        assert_all_in_bounds(&field);
    }
}

#[test]
fn test_resize_does_not_reposition_particles() {
    let mut field = field_with(5, 800, 600, 30);
    let before: Vec<Particle> = field.particles().to_vec();

    field.resize(200, 150);

    assert_eq!(field.particles(), &before[..], "resize moved particles");
}

#[test]
fn test_shrink_self_corrects_on_next_tick() {
    let mut field = field_with(5, 800, 600, 30);
    field.resize(100, 100);

    // Particles stranded outside the new bounds fail the bounds check on
    // their next advancement and get reset into the shrunken surface.
    field.tick();
    assert_all_in_bounds(&field);
}

// ---- Determinism ----

#[test]
fn test_same_seed_reproducible() {
    let mut field_a = field_with(12345, 800, 600, 30);
    let mut field_b = field_with(12345, 800, 600, 30);

    assert_eq!(field_a.particles(), field_b.particles());

    for tick in 0..1000 {
        field_a.tick();
        field_b.tick();
        assert_eq!(
            field_a.particles(),
            field_b.particles(),
            "trajectories diverged with same seed at tick {tick}"
        );
    }
}

#[test]
fn test_different_seeds_diverge() {
    let mut field_a = field_with(111, 800, 600, 30);
    let mut field_b = field_with(222, 800, 600, 30);

    let mut diverged = field_a.particles() != field_b.particles();
    for _ in 0..100 {
        field_a.tick();
        field_b.tick();
        if field_a.particles() != field_b.particles() {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "different seeds should produce divergent fields");
}

// ---- Link geometry ----

#[test]
fn test_link_threshold_is_exclusive() {
    let mut field = field_with(1, 800, 600, 0);

    // Exactly at the 150-unit threshold: no link.
    field.set_particles(vec![dot(100.0, 300.0), dot(250.0, 300.0)]);
    let mut surface = RecordingSurface::default();
    field.render(&mut surface);
    assert!(
        surface.lines().is_empty(),
        "pair at exactly the threshold must not be linked"
    );

    // Just below: linked.
    field.set_particles(vec![dot(100.0, 300.0), dot(249.5, 300.0)]);
    let mut surface = RecordingSurface::default();
    field.render(&mut surface);
    assert_eq!(surface.lines().len(), 1, "pair just below the threshold");
}

#[test]
fn test_links_counted_once_per_pair() {
    let mut field = field_with(1, 800, 600, 0);
    field.set_particles(vec![dot(10.0, 10.0), dot(20.0, 10.0), dot(15.0, 20.0)]);

    let mut surface = RecordingSurface::default();
    field.render(&mut surface);

    let lines = surface.lines();
    assert_eq!(lines.len(), 3, "three mutually close particles, three links");

    for (i, (a1, b1)) in lines.iter().enumerate() {
        for (a2, b2) in &lines[i + 1..] {
            let same_pair = (a1 == a2 && b1 == b2) || (a1 == b2 && b1 == a2);
            assert!(!same_pair, "pair linked more than once in a frame");
        }
    }
}

#[test]
fn test_distant_particles_not_linked() {
    let mut field = field_with(1, 800, 600, 0);
    field.set_particles(vec![dot(0.0, 0.0), dot(700.0, 500.0)]);

    let mut surface = RecordingSurface::default();
    field.render(&mut surface);
    assert!(surface.lines().is_empty());
}

// ---- Render command stream ----

#[test]
fn test_render_clears_then_draws_every_particle() {
    let field = field_with(9, 800, 600, 30);

    let mut surface = RecordingSurface::default();
    field.render(&mut surface);

    assert_eq!(surface.commands.first(), Some(&Command::Clear));
    assert_eq!(surface.circle_count(), 30);
}

#[test]
fn test_circle_alpha_scales_with_particle_opacity() {
    let mut field = field_with(1, 800, 600, 0);
    field.set_particles(vec![dot(100.0, 100.0)]); // opacity 0.5

    let mut surface = RecordingSurface::default();
    field.render(&mut surface);

    assert!(
        surface.commands.contains(&Command::Circle { alpha: 128 }),
        "opacity 0.5 should draw at alpha 128, got {:?}",
        surface.commands
    );
}
