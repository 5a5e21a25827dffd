use std::f64::consts::PI;

use crate::common::{Color, SolverError};
use crate::math::vec2::Vec2;
use crate::objects::BodyHandle;
use crate::world::{EmitterConfig, Solver};

/// Time-varying colour: each channel is a squared sine a third of a turn
/// apart from the next.
pub fn rainbow(t: f64) -> Color {
    let r = t.sin();
    let g = (t + 0.33 * 2.0 * PI).sin();
    let b = (t + 0.66 * 2.0 * PI).sin();
    Color::new(channel(r), channel(g), channel(b))
}

fn channel(s: f64) -> u8 {
    (255.0 * s * s) as u8
}

/// Spawns a stream of bodies from a fixed point, sweeping the launch angle
/// and radius with simulated time.
#[derive(Debug, Clone)]
pub struct Emitter {
    config: EmitterConfig,
    ticks_since_spawn: u32,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self {
            config,
            ticks_since_spawn: 0,
        })
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Radius of a body spawned at time `t`, oscillating between the
    /// configured minimum and maximum.
    pub fn radius_at(&self, t: f64) -> f64 {
        let amp = (self.config.max_radius - self.config.min_radius) / 2.0;
        let avg = (self.config.min_radius + self.config.max_radius) / 2.0;
        amp * (1.4 * t + PI * 0.5).sin() + avg
    }

    /// Launch angle at time `t`; `π/2` points along +Y.
    pub fn angle_at(&self, t: f64) -> f64 {
        self.config.max_angle * t.sin() + PI * 0.5
    }

    /// Spawns a body if the cap and spawn delay allow it, then advances the
    /// solver by one tick. Returns the spawned body's handle, if any.
    pub fn step(&mut self, solver: &mut Solver) -> Result<Option<BodyHandle>, SolverError> {
        let spawned = if self.ready(solver) {
            self.ticks_since_spawn = 0;
            Some(self.spawn(solver)?)
        } else {
            None
        };
        solver.update();
        self.ticks_since_spawn = self.ticks_since_spawn.saturating_add(1);
        Ok(spawned)
    }

    fn ready(&self, solver: &Solver) -> bool {
        solver.objects_count() < self.config.max_objects
            && self.ticks_since_spawn as f64 * solver.tick_dt() >= self.config.spawn_delay
    }

    fn spawn(&self, solver: &mut Solver) -> Result<BodyHandle, SolverError> {
        let t = solver.time();
        let handle = solver.add_object(self.config.position, self.radius_at(t))?;
        let velocity = Vec2::from_angle(self.angle_at(t)) * self.config.speed;
        solver.set_object_velocity(handle, velocity)?;
        solver.set_object_color(handle, rainbow(t))?;
        Ok(handle)
    }
}
