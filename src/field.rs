//! The particle field: a set of drifting points advanced once per tick and
//! rendered with proximity links between nearby pairs.
//!
//! The field is headless. It knows nothing about windows or frame timing;
//! the host calls `tick` and `render` back to back once per frame and owns
//! the throttling of resize notifications.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::surface::{Rgba, Surface};

/// Distance below which two particles are linked. The comparison is strict:
/// a pair at exactly this distance is not linked.
pub const LINK_DISTANCE: f32 = 150.0;

/// Stroke width of link lines.
const LINK_WIDTH: f32 = 1.0;

/// Velocity components are drawn from `-VELOCITY_LIMIT..VELOCITY_LIMIT`,
/// in surface units per tick.
const VELOCITY_LIMIT: f32 = 0.4;

const RADIUS_MIN: f32 = 0.5;
const RADIUS_MAX: f32 = 2.0;

const OPACITY_MIN: f32 = 0.2;
const OPACITY_MAX: f32 = 0.7;

/// Surfaces narrower than this get the reduced particle count.
const NARROW_WIDTH: u32 = 768;

/// Default width-derived particle count: fewer on narrow surfaces.
pub fn default_density(surface_width: u32) -> usize {
    if surface_width < NARROW_WIDTH {
        30
    } else {
        60
    }
}

/// Configuration for a new field.
pub struct FieldConfig {
    /// RNG seed for determinism. Same seed = same trajectories.
    pub seed: u64,
    /// Proximity link threshold, exclusive.
    pub link_distance: f32,
    /// Base particle color; scaled by each particle's opacity when drawn.
    pub particle_color: Rgba,
    /// Link color, already at its fixed low opacity.
    pub link_color: Rgba,
    /// Color the surface is cleared to each frame.
    pub background: Rgba,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            link_distance: LINK_DISTANCE,
            particle_color: Rgba::new(100, 255, 218, 255),
            link_color: Rgba::new(100, 255, 218, 26),
            background: Rgba::new(10, 25, 47, 255),
        }
    }
}

/// A single drifting point. Slots are reused: a particle leaving the surface
/// is re-randomized in place rather than reallocated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub opacity: f32,
}

impl Particle {
    fn random(rng: &mut impl Rng, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height)),
            velocity: Vec2::new(
                rng.gen_range(-VELOCITY_LIMIT..VELOCITY_LIMIT),
                rng.gen_range(-VELOCITY_LIMIT..VELOCITY_LIMIT),
            ),
            radius: rng.gen_range(RADIUS_MIN..RADIUS_MAX),
            opacity: rng.gen_range(OPACITY_MIN..OPACITY_MAX),
        }
    }

    /// Whether the position lies inside `[0, width) x [0, height)`.
    fn in_bounds(&self, width: f32, height: f32) -> bool {
        self.position.x >= 0.0
            && self.position.x < width
            && self.position.y >= 0.0
            && self.position.y < height
    }
}

/// The particle field: particles plus the current surface dimensions.
pub struct ParticleField {
    particles: Vec<Particle>,
    width: u32,
    height: u32,
    config: FieldConfig,
    rng: ChaCha8Rng,
}

impl ParticleField {
    /// Create an empty zero-size field. Call `resize` and `initialize` once
    /// the surface dimensions are known.
    pub fn new(config: FieldConfig) -> Self {
        Self {
            particles: Vec::new(),
            width: 0,
            height: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Update the stored dimensions. Existing particles are not repositioned;
    /// after a shrink they may sit out of bounds until their next reset.
    /// Safe to call at any time, including before `initialize`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Populate the field with `density(width)` randomized particles spread
    /// over the current dimensions, replacing any existing set. A zero-area
    /// field ends up empty.
    pub fn initialize(&mut self, density: impl Fn(u32) -> usize) {
        self.particles.clear();
        if self.width == 0 || self.height == 0 {
            return;
        }

        let count = density(self.width);
        let (w, h) = (self.width as f32, self.height as f32);
        self.particles
            .extend((0..count).map(|_| Particle::random(&mut self.rng, w, h)));
    }

    /// Advance every particle by its velocity. A particle ending out of
    /// bounds on either axis is fully re-randomized (both axes), so every
    /// particle is in bounds when this returns.
    pub fn tick(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let (w, h) = (self.width as f32, self.height as f32);
        for particle in &mut self.particles {
            particle.position += particle.velocity;
            if !particle.in_bounds(w, h) {
                *particle = Particle::random(&mut self.rng, w, h);
            }
        }
    }

    /// Draw the frame: clear, one circle per particle, then one line per
    /// unordered pair strictly closer than the link threshold. Distances are
    /// compared squared to skip the square root. The pair scan is O(n²),
    /// which is fine at the default 30-60 particles.
    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear(self.config.background);

        for particle in &self.particles {
            surface.fill_circle(
                particle.position,
                particle.radius,
                self.config.particle_color.with_alpha(particle.opacity),
            );
        }

        let link_sq = self.config.link_distance * self.config.link_distance;
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                if a.position.distance_squared(b.position) < link_sq {
                    surface.line_segment(
                        a.position,
                        b.position,
                        self.config.link_color,
                        LINK_WIDTH,
                    );
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Replace the particle set directly (for link-geometry tests).
    #[cfg(test)]
    pub fn set_particles(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }
}
