//! The frame scheduler.
//!
//! Each iteration advances the clock by the measured wall-clock delta, runs
//! the variable-rate pass over every behaviour, drains the fixed-rate
//! catch-up loop, then hands the world to the render sink. [`Engine::run`]
//! paces iterations to the configured target rate; [`Engine::step`] drives
//! one iteration with an explicit delta for deterministic tests and
//! embedders that own the outer loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::config::{ConfigError, EngineConfig};
use crate::core::tasks::TaskQueue;
use crate::ecs::behaviour::UpdateContext;
use crate::ecs::entity::Entity;
use crate::ecs::world::World;
use crate::foundation::time::Clock;

/// Which scheduler pass is being dispatched.
#[derive(Clone, Copy)]
enum Pass {
    /// Variable-rate pass with the frame delta in seconds.
    Update(f32),
    /// Fixed-rate pass with the constant step in seconds.
    Fixed(f32),
}

/// Handle for stopping a running engine from another thread.
#[derive(Clone)]
pub struct StopSignal {
    running: Arc<AtomicBool>,
}

impl StopSignal {
    /// Ask the engine loop to exit after its current iteration.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// The frame scheduler driving a [`World`].
pub struct Engine {
    world: Arc<World>,
    clock: Clock,
    tasks: Arc<TaskQueue>,
    frame_interval: Duration,
    running: Arc<AtomicBool>,
    running_slow: bool,
}

impl Engine {
    /// Create a scheduler for the given world.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRate`] if the configuration holds a
    /// non-positive rate.
    pub fn new(config: &EngineConfig, world: Arc<World>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world,
            clock: Clock::new(config.fixed_step()),
            tasks: Arc::new(TaskQueue::new()),
            frame_interval: config.frame_interval(),
            running: Arc::new(AtomicBool::new(false)),
            running_slow: false,
        })
    }

    /// The world this scheduler drives.
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// The simulation clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The fixed-rate task queue. Clone the `Arc` to push tasks from
    /// anywhere, including from inside behaviours and tasks.
    pub fn tasks(&self) -> &Arc<TaskQueue> {
        &self.tasks
    }

    /// Whether the last paced iteration overran its frame budget.
    pub fn is_running_slow(&self) -> bool {
        self.running_slow
    }

    /// A handle that stops [`run`](Engine::run) from another thread.
    pub fn stop_signal(&self) -> StopSignal {
        StopSignal {
            running: Arc::clone(&self.running),
        }
    }

    /// Drive one scheduler iteration with an explicit wall-clock delta.
    ///
    /// Advances the clock, runs the variable-rate pass once, drains the
    /// fixed-rate catch-up loop (each drain runs the fixed pass and one
    /// task-queue drive), then calls `render` with the world.
    pub fn step(&mut self, elapsed: Duration, render: &mut dyn FnMut(&World)) {
        self.clock.advance(elapsed);

        let delta = self.clock.delta_time();
        for entity in self.world.entities() {
            Self::dispatch(&self.world, &self.clock, &entity, Pass::Update(delta));
        }

        let fixed_delta = self.clock.fixed_delta_time();
        while self.clock.fixed_behind() {
            self.clock.advance_fixed();
            // Re-snapshot: a fixed update may spawn or destroy entities.
            for entity in self.world.entities() {
                Self::dispatch(&self.world, &self.clock, &entity, Pass::Fixed(fixed_delta));
            }
            self.tasks.drive(fixed_delta);
        }

        render(&self.world);
    }

    /// Run the paced loop until the [`StopSignal`] fires.
    ///
    /// Resets the clock, then repeats: measure elapsed wall time, step, and
    /// sleep off whatever remains of the frame budget. An iteration that
    /// overruns the budget skips the sleep and flips
    /// [`is_running_slow`](Engine::is_running_slow) until the loop catches
    /// up.
    pub fn run(&mut self, render: &mut dyn FnMut(&World)) {
        self.clock.reset();
        self.running.store(true, Ordering::Relaxed);
        log::info!(
            "engine loop started, frame interval {:?}",
            self.frame_interval
        );

        let mut last_frame = Instant::now();
        while self.running.load(Ordering::Relaxed) {
            let now = Instant::now();
            let elapsed = now - last_frame;
            last_frame = now;

            self.step(elapsed, render);
            self.pace(now.elapsed());
        }
        log::info!("engine loop stopped at t={:.3}s", self.clock.time());
    }

    fn pace(&mut self, worked: Duration) {
        match self.frame_interval.checked_sub(worked) {
            Some(remaining) => {
                self.running_slow = false;
                std::thread::sleep(remaining);
            }
            None => {
                if !self.running_slow {
                    log::warn!(
                        "frame took {worked:?}, over the {:?} budget",
                        self.frame_interval
                    );
                }
                self.running_slow = true;
            }
        }
    }

    /// Invoke one pass on every behaviour of one entity.
    ///
    /// A panicking hook is caught and logged; the entity's remaining
    /// behaviours and all other entities still run. Components with unmet
    /// requirements are skipped and reported once.
    fn dispatch(world: &World, clock: &Clock, entity: &Arc<Entity>, pass: Pass) {
        let ctx = UpdateContext {
            world,
            clock,
            entity,
        };
        for component in entity.behaviours() {
            if !entity.requirements_met(component.as_ref()) {
                if component.base().mark_requirement_warned() {
                    log::warn!(
                        "entity id={} name={:?}: component requirements unmet, skipping",
                        entity.id(),
                        entity.name()
                    );
                }
                continue;
            }
            let Some(behaviour) = component.as_behaviour() else {
                continue;
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                if component.base().mark_started() {
                    behaviour.start(&ctx);
                }
                match pass {
                    Pass::Update(delta) => behaviour.update(&ctx, delta),
                    Pass::Fixed(delta) => behaviour.fixed_update(&ctx, delta),
                }
            }));
            if let Err(payload) = outcome {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                log::error!(
                    "behaviour panicked on entity id={} name={:?}: {message}",
                    entity.id(),
                    entity.name()
                );
            }
        }
    }
}
