use ggez::event::{self, EventHandler};
use ggez::glam::Vec2 as GVec2;
use ggez::graphics::{self, Color, DrawMode, DrawParam, Mesh};
use ggez::input::keyboard::{KeyCode, KeyInput};
use ggez::{Context, GameError, GameResult};
use verlet_engine::scene::{Emitter, FixedStep};
use verlet_engine::{ScenarioConfig, Solver};

const WINDOW_SIZE: f32 = 1000.0;

struct MainState {
    solver: Solver,
    emitter: Emitter,
    fixed_step: FixedStep,
    disk: Mesh,
    boundary: Option<Mesh>,
}

fn game_error<E: std::fmt::Display>(err: E) -> GameError {
    GameError::CustomError(err.to_string())
}

impl MainState {
    fn new(ctx: &mut Context, scenario: ScenarioConfig) -> GameResult<MainState> {
        let solver = Solver::from_config(&scenario.simulation).map_err(game_error)?;
        let emitter = Emitter::new(scenario.emitter).map_err(game_error)?;
        let fixed_step = FixedStep::new(solver.tick_dt(), scenario.frame.max_frame_skip);

        // Unit disk, scaled to each body's radius when drawn
        let disk = Mesh::new_circle(ctx, DrawMode::fill(), GVec2::ZERO, 1.0, 0.01, Color::WHITE)?;

        let boundary = match solver.constraint() {
            Some(c) => Some(Mesh::new_circle(
                ctx,
                DrawMode::fill(),
                GVec2::new(c.center().x as f32, c.center().y as f32),
                c.radius() as f32,
                0.5,
                Color::BLACK,
            )?),
            None => None,
        };

        Ok(MainState {
            solver,
            emitter,
            fixed_step,
            disk,
            boundary,
        })
    }
}

impl EventHandler for MainState {
    fn update(&mut self, ctx: &mut Context) -> GameResult {
        let budget = self.fixed_step.accumulate(ctx.time.delta().as_secs_f64());
        for _ in 0..budget.steps {
            self.emitter.step(&mut self.solver).map_err(game_error)?;
        }

        let mut title = format!("Verlet | Frame Skip: {}", budget.frame_skip());
        if budget.saturated {
            title.push_str(" (MAX)");
        }
        ctx.gfx.set_window_title(&title);
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult {
        let mut canvas = graphics::Canvas::from_frame(ctx, Color::WHITE);

        if let Some(boundary) = &self.boundary {
            canvas.draw(boundary, DrawParam::new());
        }

        for body in self.solver.objects() {
            let p = body.position();
            let c = body.color();
            canvas.draw(
                &self.disk,
                DrawParam::new()
                    .dest(GVec2::new(p.x as f32, p.y as f32))
                    .scale(GVec2::splat(body.radius() as f32))
                    .color(Color::from_rgb(c.r, c.g, c.b)),
            );
        }

        canvas.finish(ctx)?;
        Ok(())
    }

    fn key_down_event(&mut self, ctx: &mut Context, input: KeyInput, _repeated: bool) -> GameResult {
        if input.keycode == Some(KeyCode::Escape) {
            ctx.request_quit();
        }
        Ok(())
    }
}

pub fn run_visual(scenario: ScenarioConfig) -> GameResult {
    let cb = ggez::ContextBuilder::new("verlet_demo", "verlet_engine")
        .window_setup(ggez::conf::WindowSetup::default().title("Verlet"))
        .window_mode(ggez::conf::WindowMode::default().dimensions(WINDOW_SIZE, WINDOW_SIZE));

    let (mut ctx, event_loop) = cb.build()?;
    let state = MainState::new(&mut ctx, scenario)?;
    event::run(ctx, event_loop, state)
}
