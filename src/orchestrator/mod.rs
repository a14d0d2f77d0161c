// src/orchestrator/mod.rs
//! Drives the simulation: the fixed-period tick, host event routing and the
//! presenter's refresh cadence.
//!
//! One tick runs, in order: the application's update step, the engine's time
//! base advance by measured milliseconds, the engine's task dispatcher (which
//! is where display and input driver calls happen), and the frame upload.
//! Everything runs on one thread, so a frame is never uploaded while the
//! engine is still writing it.

use crate::clock::{MonotonicClock, TickTimer};
use crate::config::SimulationConfig;
use crate::controls::{LedObserver, PhysicalControlsAdapter};
use crate::display::{DisplayDriverAdapter, DisplayStats};
use crate::engine::{
    report_memory_usage, Application, DisplayDriverInfo, Drivers, InputDeviceKind, TaskPriority, UiEngine,
};
use crate::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::gpu::{GpuBackend, PresentOutcome, PresenterStats, TexturePresenter};
use crate::host::{HostEvent, HostInput};
use crate::input::InputDriverAdapter;
use anyhow::{Context, Result};
use log::{debug, info, trace};
use std::time::Duration;

/// Represents the status of the simulator after handling an event or running its loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SimulatorStatus {
    /// Keep going.
    Running,
    /// The host asked to close. The loop should end.
    Shutdown,
}

/// Owns the engine, the application, the driver adapters and the presenter.
pub struct Simulator<E, A, G>
where
    E: UiEngine,
    A: Application<E>,
    G: GpuBackend,
{
    engine: E,
    app: A,
    display: DisplayDriverAdapter,
    input: InputDriverAdapter,
    controls: PhysicalControlsAdapter,
    presenter: TexturePresenter<G>,
    clock: Box<dyn MonotonicClock>,
    timer: TickTimer,
    tick_period: Duration,
    ticks: u64,
}

impl<E, A, G> Simulator<E, A, G>
where
    E: UiEngine,
    A: Application<E>,
    G: GpuBackend,
{
    /// Builds the presentation path, then brings up the engine and the
    /// application. Fails only if the presenter cannot be built.
    pub fn new(
        mut engine: E,
        mut app: A,
        gpu: G,
        observer: Box<dyn LedObserver>,
        clock: Box<dyn MonotonicClock>,
        config: &SimulationConfig,
    ) -> Result<Self> {
        let presenter = TexturePresenter::new(gpu).context("Failed to set up presentation")?;
        let mut controls = PhysicalControlsAdapter::new(observer);

        engine.init();
        engine.register_display_driver(DisplayDriverInfo {
            hor_res: SCREEN_WIDTH as u32,
            ver_res: SCREEN_HEIGHT as u32,
        });
        engine.register_input_driver(InputDeviceKind::Pointer);
        engine.create_task(
            config.memory_monitor_period_ms,
            TaskPriority::Lowest,
            Box::new(report_memory_usage),
        );
        info!(
            "Simulator: Engine initialized, display {}x{}, tick {:?}",
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            config.tick_period()
        );

        app.init(&mut engine, &mut controls);
        info!("Simulator: Application initialized.");

        let timer = TickTimer::new(clock.now());
        Ok(Self {
            engine,
            app,
            display: DisplayDriverAdapter::new(),
            input: InputDriverAdapter::new(),
            controls,
            presenter,
            clock,
            timer,
            tick_period: config.tick_period(),
            ticks: 0,
        })
    }

    /// Runs one simulation tick. Returns whether a new frame was uploaded.
    pub fn tick(&mut self) -> bool {
        self.update_application();
        self.advance_engine_time();
        self.dispatch_engine();
        let uploaded = self.upload_frame();
        self.ticks += 1;
        uploaded
    }

    fn update_application(&mut self) {
        self.app.update(&mut self.engine, &mut self.controls);
    }

    fn advance_engine_time(&mut self) {
        let ms = self.timer.elapsed_ms(self.clock.now());
        if ms > 0 {
            self.engine.advance_time_base(ms);
        }
    }

    fn dispatch_engine(&mut self) {
        let mut drivers = Drivers {
            display: &mut self.display,
            input: &mut self.input,
        };
        self.engine.run_task_dispatcher(&mut drivers);
    }

    fn upload_frame(&mut self) -> bool {
        self.presenter.upload_if_dirty(self.display.framebuffer_mut())
    }

    /// Draws the live texture. Called on the host's refresh cadence.
    pub fn present(&mut self) -> PresentOutcome {
        self.presenter.present()
    }

    /// Routes one host event to the pointer or button state.
    pub fn handle_host_event(&mut self, event: HostEvent) -> SimulatorStatus {
        trace!("Simulator: Handling {:?}", event);
        match event {
            HostEvent::PointerMoved { x, y } => self.input.on_pointer_moved(x, y),
            HostEvent::PointerDown { x, y } => self.input.on_pointer_down(x, y),
            HostEvent::PointerUp { x, y } => self.input.on_pointer_up(x, y),
            HostEvent::ButtonDown => self.controls.on_button(true),
            HostEvent::ButtonUp => self.controls.on_button(false),
            HostEvent::CloseRequested => {
                info!("Simulator: CloseRequested received. Signaling shutdown.");
                return SimulatorStatus::Shutdown;
            }
        }
        SimulatorStatus::Running
    }

    /// Runs ticks and presents on their own deadlines until the host closes
    /// or `run_for` has elapsed. Host events are polled every iteration.
    pub fn run(
        &mut self,
        host: &mut dyn HostInput,
        present_interval: Duration,
        run_for: Option<Duration>,
    ) -> Result<SimulatorStatus> {
        let start = self.clock.now();
        let mut next_tick = start;
        let mut next_present = start;
        info!(
            "Simulator: Starting main loop (tick {:?}, present every {:?})",
            self.tick_period, present_interval
        );

        let status = loop {
            let now = self.clock.now();
            if run_for.is_some_and(|limit| now.saturating_sub(start) >= limit) {
                info!("Simulator: Run time elapsed.");
                break SimulatorStatus::Running;
            }

            let events = host.poll_events(now).context("Failed to poll host events")?;
            if events
                .into_iter()
                .any(|event| self.handle_host_event(event) == SimulatorStatus::Shutdown)
            {
                break SimulatorStatus::Shutdown;
            }

            if now >= next_tick {
                self.tick();
                next_tick += self.tick_period;
                if next_tick <= now {
                    debug!("Simulator: Tick overran by {:?}", now - next_tick);
                    next_tick = now + self.tick_period;
                }
            }
            if now >= next_present {
                self.present();
                next_present += present_interval;
                if next_present <= now {
                    next_present = now + present_interval;
                }
            }

            let wake = next_tick.min(next_present);
            let wake = match run_for {
                Some(limit) => wake.min(start + limit),
                None => wake,
            };
            let now = self.clock.now();
            if wake > now {
                self.clock.sleep(wake - now);
            }
        };

        self.log_stats();
        Ok(status)
    }

    fn log_stats(&self) {
        let display = self.display.stats();
        let presenter = self.presenter.stats();
        info!(
            "Simulator: {} ticks; display flushes {}, fills {}, maps {}, rejected {}",
            self.ticks, display.flushes, display.fills, display.maps, display.rejected
        );
        info!(
            "Simulator: {} uploads, {} presented, {} skipped",
            presenter.uploads, presenter.presented, presenter.skipped
        );
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn display(&self) -> &DisplayDriverAdapter {
        &self.display
    }

    pub fn display_stats(&self) -> DisplayStats {
        self.display.stats()
    }

    pub fn input(&self) -> &InputDriverAdapter {
        &self.input
    }

    pub fn controls(&self) -> &PhysicalControlsAdapter {
        &self.controls
    }

    /// Board controls for callers holding raw firmware LED ids.
    pub fn controls_mut(&mut self) -> &mut PhysicalControlsAdapter {
        &mut self.controls
    }

    pub fn presenter(&self) -> &TexturePresenter<G> {
        &self.presenter
    }

    pub fn presenter_stats(&self) -> PresenterStats {
        self.presenter.stats()
    }
}
