use crate::{
    collision::{BroadPhase, CollisionResolver},
    common::{
        error::{positive_finite, SolverError},
        Color,
    },
    constraints::CircularBoundary,
    integration::integrator,
    math::vec2::Vec2,
    objects::{Body, BodyHandle, BodyStore},
    world::config::SimulationConfig,
};

/// Fixed-timestep Verlet solver for disks inside a circular boundary.
///
/// Each call to [`Solver::update`] advances simulated time by one tick and
/// runs `sub_steps` passes of: gravity, integration, boundary projection,
/// collision relaxation. The application owns the value and drives it.
#[derive(Debug)]
pub struct Solver {
    bodies: BodyStore,
    constraint: Option<CircularBoundary>,
    resolver: CollisionResolver,
    gravity: Vec2,
    sub_steps: u32,
    tick_dt: f64,
    time: f64,
}

impl Solver {
    pub const DEFAULT_GRAVITY: Vec2 = Vec2 { x: 0.0, y: 1000.0 };
    pub const DEFAULT_SUB_STEPS: u32 = 8;
    pub const DEFAULT_TICK_DT: f64 = 1.0 / 60.0;

    /// Creates an empty solver with default settings and no boundary.
    pub fn new() -> Self {
        Self {
            bodies: BodyStore::new(),
            constraint: None,
            resolver: CollisionResolver::default(),
            gravity: Self::DEFAULT_GRAVITY,
            sub_steps: Self::DEFAULT_SUB_STEPS,
            tick_dt: Self::DEFAULT_TICK_DT,
            time: 0.0,
        }
    }

    /// Builds a configured solver, rejecting any invalid setting.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SolverError> {
        let mut solver = Self::new();
        solver.set_simulation_tick_dt(config.effective_tick_dt()?)?;
        solver.set_sub_steps_count(config.sub_steps)?;
        solver.set_gravity(config.gravity)?;
        if let Some(boundary) = config.boundary {
            solver.set_constraint(boundary.center, boundary.radius)?;
        }
        solver.set_broad_phase(config.broad_phase)?;
        solver.set_collision_response(config.collision_response)?;
        Ok(solver)
    }

    // --- Bodies --- //

    /// Spawns a body at rest and returns its handle.
    pub fn add_object(&mut self, position: Vec2, radius: f64) -> Result<BodyHandle, SolverError> {
        if !positive_finite(radius) {
            return Err(SolverError::InvalidRadius(radius));
        }
        if !position.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        let handle = self.bodies.insert(Body::new(position, radius));
        log::trace!("spawned body {:?} at {:?}, radius {}", handle, position, radius);
        Ok(handle)
    }

    /// Sets the body's history so that its next step moves it by
    /// `velocity * tick_dt`.
    pub fn set_object_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), SolverError> {
        if !velocity.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        let tick_dt = self.tick_dt;
        self.body_mut(handle)?.set_velocity(velocity, tick_dt);
        Ok(())
    }

    pub fn set_object_color(&mut self, handle: BodyHandle, color: Color) -> Result<(), SolverError> {
        self.body_mut(handle)?.color = color;
        Ok(())
    }

    /// Despawns a body. Remaining bodies keep their order and handles.
    pub fn remove_object(&mut self, handle: BodyHandle) -> Result<Body, SolverError> {
        let body = self
            .bodies
            .remove(handle)
            .ok_or(SolverError::InvalidHandle(handle))?;
        log::trace!("removed body {:?}", handle);
        Ok(body)
    }

    pub fn object(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Read-only view of every body, in spawn order.
    pub fn objects(&self) -> &[Body] {
        self.bodies.as_slice()
    }

    /// Handles of every body, in the same order as [`Solver::objects`].
    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.handles()
    }

    /// Number of live bodies, saturating at `u32::MAX`.
    pub fn objects_count(&self) -> u32 {
        saturating_count(self.bodies.len())
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body, SolverError> {
        self.bodies
            .get_mut(handle)
            .ok_or(SolverError::InvalidHandle(handle))
    }

    // --- Configuration --- //

    /// Sets the circular region bodies are kept inside.
    pub fn set_constraint(&mut self, center: Vec2, radius: f64) -> Result<(), SolverError> {
        self.constraint = Some(CircularBoundary::new(center, radius)?);
        log::debug!("boundary set: center {:?}, radius {}", center, radius);
        Ok(())
    }

    pub fn constraint(&self) -> Option<&CircularBoundary> {
        self.constraint.as_ref()
    }

    pub fn set_gravity(&mut self, gravity: Vec2) -> Result<(), SolverError> {
        if !gravity.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        self.gravity = gravity;
        Ok(())
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_sub_steps_count(&mut self, sub_steps: u32) -> Result<(), SolverError> {
        if sub_steps == 0 {
            return Err(SolverError::InvalidSubSteps(sub_steps));
        }
        if self.time > 0.0 && sub_steps != self.sub_steps {
            log::warn!(
                "sub-step count changed from {} to {} mid-run at t={}",
                self.sub_steps,
                sub_steps,
                self.time
            );
        }
        self.sub_steps = sub_steps;
        log::debug!("sub-steps per tick: {}", sub_steps);
        Ok(())
    }

    pub fn sub_steps_count(&self) -> u32 {
        self.sub_steps
    }

    pub fn set_simulation_tick_dt(&mut self, tick_dt: f64) -> Result<(), SolverError> {
        if !positive_finite(tick_dt) {
            return Err(SolverError::InvalidTickDt(tick_dt));
        }
        if self.time > 0.0 && tick_dt != self.tick_dt {
            log::warn!(
                "tick duration changed from {} to {} mid-run at t={}",
                self.tick_dt,
                tick_dt,
                self.time
            );
        }
        self.tick_dt = tick_dt;
        log::debug!("tick duration: {}s", tick_dt);
        Ok(())
    }

    /// Sets the tick duration to `1 / rate`.
    pub fn set_simulation_update_rate(&mut self, rate: f64) -> Result<(), SolverError> {
        if !positive_finite(rate) {
            return Err(SolverError::InvalidUpdateRate(rate));
        }
        self.set_simulation_tick_dt(1.0 / rate)
    }

    pub fn tick_dt(&self) -> f64 {
        self.tick_dt
    }

    /// Duration of one sub-step.
    pub fn step_dt(&self) -> f64 {
        self.tick_dt / self.sub_steps as f64
    }

    pub fn set_broad_phase(&mut self, broad_phase: BroadPhase) -> Result<(), SolverError> {
        self.resolver.set_broad_phase(broad_phase)?;
        log::debug!("collision broad phase: {:?}", broad_phase);
        Ok(())
    }

    pub fn broad_phase(&self) -> BroadPhase {
        self.resolver.broad_phase()
    }

    pub fn set_collision_response(&mut self, response: f64) -> Result<(), SolverError> {
        self.resolver.set_response(response)
    }

    pub fn collision_response(&self) -> f64 {
        self.resolver.response()
    }

    // --- Simulation --- //

    /// Simulated seconds elapsed.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Overlapping pairs corrected by the last collision pass of the last tick.
    pub fn last_contact_count(&self) -> usize {
        self.resolver.last_contact_count()
    }

    /// Deepest overlap between any two bodies, or 0.0 when none overlap.
    /// Checks every pair.
    pub fn max_overlap(&self) -> f64 {
        let bodies = self.bodies.as_slice();
        let mut worst: f64 = 0.0;
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                let overlap = a.radius() + b.radius() - a.position().distance(b.position());
                worst = worst.max(overlap);
            }
        }
        worst
    }

    /// Furthest any body sticks out of the boundary, or 0.0 when all are
    /// inside (or there is no boundary).
    pub fn max_boundary_violation(&self) -> f64 {
        let Some(boundary) = &self.constraint else {
            return 0.0;
        };
        self.bodies.iter().fold(0.0, |worst: f64, body| {
            let reach = body.position().distance(boundary.center()) + body.radius();
            worst.max(reach - boundary.radius())
        })
    }

    /// Advances the simulation by one tick.
    pub fn update(&mut self) {
        self.time += self.tick_dt;
        let step_dt = self.step_dt();
        let gravity = self.gravity;

        for _ in 0..self.sub_steps {
            let bodies = self.bodies.as_mut_slice();

            // 1. Gravity
            for body in bodies.iter_mut() {
                body.accelerate(gravity);
            }

            // 2. Integrate motion
            integrator::integrate_all(bodies, step_dt);

            // 3. Boundary, before collisions so pairs are solved against
            //    positions already inside
            if let Some(boundary) = &self.constraint {
                boundary.apply(bodies);
            }

            // 4. Collisions
            self.resolver.resolve_all(bodies);
        }

        log::trace!(
            "tick t={:.4}: {} bodies, {} contacts",
            self.time,
            self.bodies.len(),
            self.resolver.last_contact_count()
        );
    }
}

fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_solver_new() {
        let solver = Solver::new();
        assert_eq!(solver.objects_count(), 0);
        assert_eq!(solver.time(), 0.0);
        assert_eq!(solver.gravity(), Vec2::new(0.0, 1000.0));
        assert_eq!(solver.sub_steps_count(), 8);
        assert!(solver.constraint().is_none());
        assert_eq!(solver.broad_phase(), BroadPhase::AllPairs);
    }

    #[test]
    fn test_add_object() {
        let mut solver = Solver::new();
        let a = solver.add_object(Vec2::new(1.0, 2.0), 3.0).unwrap();
        let b = solver.add_object(Vec2::new(4.0, 5.0), 6.0).unwrap();
        assert_eq!(solver.objects_count(), 2);
        let body = solver.object(a).unwrap();
        assert_eq!(body.position(), Vec2::new(1.0, 2.0));
        assert_eq!(body.previous_position(), Vec2::new(1.0, 2.0));
        assert_eq!(body.acceleration(), Vec2::ZERO);
        assert_eq!(body.radius(), 3.0);
        assert_eq!(solver.objects()[1].radius(), 6.0);
        assert_eq!(solver.handles().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_add_object_rejects_bad_input() {
        let mut solver = Solver::new();
        assert_eq!(
            solver.add_object(Vec2::ZERO, 0.0),
            Err(SolverError::InvalidRadius(0.0))
        );
        assert_eq!(
            solver.add_object(Vec2::ZERO, -1.0),
            Err(SolverError::InvalidRadius(-1.0))
        );
        assert_eq!(
            solver.add_object(Vec2::new(f64::NAN, 0.0), 1.0),
            Err(SolverError::NonFiniteVector)
        );
        assert_eq!(solver.objects_count(), 0);
    }

    #[test]
    fn test_configuration_is_validated() {
        let mut solver = Solver::new();
        assert_eq!(solver.set_sub_steps_count(0), Err(SolverError::InvalidSubSteps(0)));
        assert_eq!(solver.set_simulation_tick_dt(0.0), Err(SolverError::InvalidTickDt(0.0)));
        assert_eq!(solver.set_simulation_tick_dt(-0.1), Err(SolverError::InvalidTickDt(-0.1)));
        assert_eq!(
            solver.set_simulation_update_rate(0.0),
            Err(SolverError::InvalidUpdateRate(0.0))
        );
        assert_eq!(
            solver.set_constraint(Vec2::ZERO, -5.0),
            Err(SolverError::InvalidBoundary(-5.0))
        );
        assert_eq!(
            solver.set_gravity(Vec2::new(0.0, f64::INFINITY)),
            Err(SolverError::NonFiniteVector)
        );
        // Nothing changed
        assert_eq!(solver.sub_steps_count(), Solver::DEFAULT_SUB_STEPS);
        assert_eq!(solver.tick_dt(), Solver::DEFAULT_TICK_DT);
        assert!(solver.constraint().is_none());
    }

    #[test]
    fn test_update_rate_sets_tick_dt() {
        let mut solver = Solver::new();
        solver.set_simulation_update_rate(50.0).unwrap();
        assert_relative_eq!(solver.tick_dt(), 0.02, epsilon = EPSILON);
        solver.set_sub_steps_count(4).unwrap();
        assert_relative_eq!(solver.step_dt(), 0.005, epsilon = EPSILON);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut solver = Solver::new();
        let a = solver.add_object(Vec2::ZERO, 1.0).unwrap();
        solver.remove_object(a).unwrap();
        assert_eq!(
            solver.set_object_velocity(a, Vec2::new(1.0, 0.0)),
            Err(SolverError::InvalidHandle(a))
        );
        assert_eq!(
            solver.set_object_color(a, Color::BLACK),
            Err(SolverError::InvalidHandle(a))
        );
        assert!(matches!(solver.remove_object(a), Err(SolverError::InvalidHandle(_))));
        assert!(solver.object(a).is_none());
    }

    #[test]
    fn test_set_object_color() {
        let mut solver = Solver::new();
        let a = solver.add_object(Vec2::ZERO, 1.0).unwrap();
        solver.set_object_color(a, Color::new(10, 20, 30)).unwrap();
        assert_eq!(solver.object(a).unwrap().color(), Color::new(10, 20, 30));
    }

    #[test]
    fn test_update_advances_time() {
        let mut solver = Solver::new();
        solver.set_simulation_tick_dt(0.25).unwrap();
        solver.update();
        assert_eq!(solver.time(), 0.25);
        solver.update();
        assert_eq!(solver.time(), 0.5);
    }

    #[test]
    fn test_update_applies_gravity_per_sub_step() {
        let mut solver = Solver::new();
        solver.set_simulation_tick_dt(0.1).unwrap();
        solver.set_sub_steps_count(1).unwrap();
        solver.set_gravity(Vec2::new(0.0, 10.0)).unwrap();
        let a = solver.add_object(Vec2::ZERO, 1.0).unwrap();

        solver.update();
        assert_relative_eq!(solver.object(a).unwrap().position().y, 0.1, epsilon = EPSILON);
        solver.update();
        assert_relative_eq!(solver.object(a).unwrap().position().y, 0.3, epsilon = EPSILON);
    }

    #[test]
    fn test_unconstrained_without_boundary() {
        let mut solver = Solver::new();
        solver.set_gravity(Vec2::ZERO).unwrap();
        solver.set_sub_steps_count(1).unwrap();
        let a = solver.add_object(Vec2::new(1.0e4, 0.0), 1.0).unwrap();
        solver.set_object_velocity(a, Vec2::new(600.0, 0.0)).unwrap();
        for _ in 0..10 {
            solver.update();
        }
        assert_relative_eq!(solver.object(a).unwrap().position().x, 1.0e4 + 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_from_config() {
        let mut config = SimulationConfig::default();
        config.sub_steps = 3;
        config.update_rate = Some(30.0);
        config.broad_phase = BroadPhase::UniformGrid { cell_size: None };
        config.collision_response = 0.75;
        let solver = Solver::from_config(&config).unwrap();
        assert_eq!(solver.sub_steps_count(), 3);
        assert_relative_eq!(solver.tick_dt(), 1.0 / 30.0, epsilon = EPSILON);
        assert_eq!(solver.broad_phase(), BroadPhase::UniformGrid { cell_size: None });
        assert_eq!(solver.collision_response(), 0.75);
        let boundary = solver.constraint().unwrap();
        assert_eq!(boundary.center(), Vec2::new(500.0, 500.0));
        assert_eq!(boundary.radius(), 450.0);
    }

    #[test]
    fn test_from_config_fails_fast() {
        let mut config = SimulationConfig::default();
        config.sub_steps = 0;
        assert_eq!(Solver::from_config(&config).err(), Some(SolverError::InvalidSubSteps(0)));

        let mut config = SimulationConfig::default();
        config.collision_response = 2.0;
        assert_eq!(Solver::from_config(&config).err(), Some(SolverError::InvalidResponse(2.0)));
    }

    #[test]
    fn test_objects_count_saturates() {
        assert_eq!(saturating_count(0), 0);
        assert_eq!(saturating_count(700), 700);
        assert_eq!(saturating_count(u32::MAX as usize), u32::MAX);
        assert_eq!(saturating_count(usize::MAX), u32::MAX);
    }

    #[test]
    fn test_diagnostics() {
        let mut solver = Solver::new();
        assert_eq!(solver.max_overlap(), 0.0);
        assert_eq!(solver.max_boundary_violation(), 0.0);

        solver.add_object(Vec2::new(0.0, 0.0), 2.0).unwrap();
        solver.add_object(Vec2::new(3.0, 0.0), 2.0).unwrap();
        assert_relative_eq!(solver.max_overlap(), 1.0, epsilon = EPSILON);
        // no boundary yet
        assert_eq!(solver.max_boundary_violation(), 0.0);

        solver.set_constraint(Vec2::new(0.0, 0.0), 4.0).unwrap();
        assert_relative_eq!(solver.max_boundary_violation(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_remove_object_keeps_others() {
        let mut solver = Solver::new();
        let a = solver.add_object(Vec2::new(1.0, 0.0), 1.0).unwrap();
        let b = solver.add_object(Vec2::new(2.0, 0.0), 1.0).unwrap();
        let removed = solver.remove_object(a).unwrap();
        assert_eq!(removed.position(), Vec2::new(1.0, 0.0));
        assert_eq!(solver.objects_count(), 1);
        assert_eq!(solver.object(b).unwrap().position(), Vec2::new(2.0, 0.0));
    }
}
