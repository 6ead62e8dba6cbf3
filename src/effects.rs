//! Decorative particle bursts for accept/reject feedback
//!
//! Coordinates are in terminal cells with the origin at the centre of the
//! card. Nothing here touches the data model; a burst lives for
//! `PARTICLE_LIFETIME_MS` and is then dropped.

use std::time::Duration;

use rand::Rng;

use crate::constants::{GRAVITY, PARTICLE_COUNT, PARTICLE_LIFETIME_MS};

/// Below this opacity a particle is removed
const MIN_OPACITY: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    /// Confetti rising from the card
    Accept,
    /// Debris falling off the card
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    vx: f32,
    vy: f32,
    pub opacity: f32,
    pub scale: f32,
    /// Index into the palette the renderer picks from
    pub hue: u8,
}

impl Particle {
    pub fn glyph(&self) -> &'static str {
        if self.scale > 0.75 {
            "✦"
        } else if self.scale > 0.4 {
            "*"
        } else {
            "·"
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    pub kind: Option<BurstKind>,
    pub particles: Vec<Particle>,
    elapsed: Duration,
}

impl ParticleSystem {
    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Start a burst at `origin`, replacing any running one.
    pub fn burst(&mut self, origin: (f32, f32), kind: BurstKind, rng: &mut impl Rng) {
        self.kind = Some(kind);
        self.elapsed = Duration::ZERO;
        self.particles = (0..PARTICLE_COUNT)
            .map(|_| {
                let (vx, vy) = match kind {
                    BurstKind::Accept => (
                        rng.random_range(-12.0..12.0),
                        rng.random_range(-14.0..-4.0),
                    ),
                    BurstKind::Reject => {
                        (rng.random_range(-6.0..6.0), rng.random_range(-2.0..4.0))
                    }
                };
                Particle {
                    x: origin.0,
                    y: origin.1,
                    vx,
                    vy,
                    opacity: 1.0,
                    scale: rng.random_range(0.5..1.0),
                    hue: rng.random_range(0..6),
                }
            })
            .collect();
    }

    /// Advance the simulation by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if self.particles.is_empty() {
            return;
        }

        self.elapsed += dt;
        if self.elapsed >= Duration::from_millis(PARTICLE_LIFETIME_MS) {
            self.clear();
            return;
        }

        let secs = dt.as_secs_f32();
        let lifetime = PARTICLE_LIFETIME_MS as f32 / 1000.0;
        let decay = secs / lifetime;

        for p in &mut self.particles {
            p.vy += GRAVITY * secs;
            p.x += p.vx * secs;
            p.y += p.vy * secs;
            p.opacity = (p.opacity - decay * 1.5).max(0.0);
            p.scale = (p.scale - decay).max(0.0);
        }
        self.particles.retain(|p| p.opacity > MIN_OPACITY);
        if self.particles.is_empty() {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.kind = None;
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_burst_spawns_particles_at_origin() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut system = ParticleSystem::default();
        system.burst((10.0, 5.0), BurstKind::Accept, &mut rng);

        assert_eq!(system.particles.len(), PARTICLE_COUNT);
        assert!(system.particles.iter().all(|p| p.x == 10.0 && p.y == 5.0));
        assert!(system.is_active());
    }

    #[test]
    fn test_gravity_pulls_particles_down() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut system = ParticleSystem::default();
        system.burst((0.0, 0.0), BurstKind::Accept, &mut rng);
        let before: Vec<f32> = system.particles.iter().map(|p| p.vy).collect();

        system.tick(Duration::from_millis(50));

        for (p, vy) in system.particles.iter().zip(before) {
            assert!(p.vy > vy);
            assert!(p.opacity < 1.0);
        }
    }

    #[test]
    fn test_burst_expires_after_lifetime() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut system = ParticleSystem::default();
        system.burst((0.0, 0.0), BurstKind::Reject, &mut rng);

        let step = Duration::from_millis(40);
        let mut elapsed = Duration::ZERO;
        while system.is_active() {
            system.tick(step);
            elapsed += step;
            assert!(elapsed <= Duration::from_millis(PARTICLE_LIFETIME_MS) + step);
        }
        assert!(system.kind.is_none());
    }

    #[test]
    fn test_tick_on_idle_system_is_noop() {
        let mut system = ParticleSystem::default();
        system.tick(Duration::from_secs(10));
        assert!(!system.is_active());
    }
}
