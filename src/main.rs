// src/main.rs

use hmi_sim::{
    clock::SystemClock,
    config::{Config, CONFIG},
    controls::LoggingLedObserver,
    demo::{DemoEngine, Stopwatch},
    framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH},
    gpu::HeadlessGpu,
    host::{HostEvent, ScriptedHost},
    orchestrator::{Simulator, SimulatorStatus},
};

use anyhow::{Context, Result};
use log::{error, info};
use std::time::Duration;

/// Main entry point for the `hmi-sim` application.
fn main() -> Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting hmi-sim...");
    let config: &Config = &CONFIG;

    let headless = std::env::args().skip(1).any(|arg| arg == "--headless");
    let result = if headless || !cfg!(feature = "x11-host") {
        run_headless(config)
    } else {
        run_windowed(config)
    };

    match result {
        Ok(status) => {
            info!("hmi-sim exited ({:?}).", status);
            Ok(())
        }
        Err(e) => {
            error!("Simulator failed: {:#}. Root cause: {:?}.", e, e.root_cause());
            Err(e)
        }
    }
}

/// Runs against the in-memory GPU with a scripted button sequence: start,
/// pause, then a long press to reset.
fn run_headless(config: &Config) -> Result<SimulatorStatus> {
    let scale = config.display.window_scale.max(1) as usize;
    let gpu = HeadlessGpu::new(SCREEN_WIDTH * scale, SCREEN_HEIGHT * scale).context("Failed to create headless GPU")?;
    let ms = Duration::from_millis;
    let mut host = ScriptedHost::new()
        .at(ms(100), HostEvent::PointerDown { x: 120, y: 150 })
        .at(ms(150), HostEvent::PointerUp { x: 120, y: 150 })
        .button_press(ms(200), ms(300))
        .button_press(ms(1_200), ms(1_300))
        .button_press(ms(1_500), ms(1_950));

    let mut sim = Simulator::new(
        DemoEngine::new(),
        Stopwatch::new(),
        gpu,
        Box::new(LoggingLedObserver),
        Box::new(SystemClock::new()),
        &config.simulation,
    )?;
    info!("Running headless for {:?}", config.simulation.headless_run());

    let status = sim.run(&mut host, config.display.present_interval(), Some(config.simulation.headless_run()))?;

    info!(
        "Headless run done: stopwatch {:?} at {} ms, {} frames presented",
        sim.app().state(),
        sim.app().elapsed_ms(),
        sim.presenter().gpu().frames_presented()
    );
    Ok(status)
}

#[cfg(feature = "x11-host")]
fn run_windowed(config: &Config) -> Result<SimulatorStatus> {
    use hmi_sim::host::x11::{X11Gpu, X11Input, X11LedIndicator, X11Window};

    let window = X11Window::open(config).context("Failed to open host window")?;
    let mut host = X11Input::new(window.clone(), config.controls.button_key);
    let mut sim = Simulator::new(
        DemoEngine::new(),
        Stopwatch::new(),
        X11Gpu::new(window.clone()),
        Box::new(X11LedIndicator::new(window)),
        Box::new(SystemClock::new()),
        &config.simulation,
    )?;
    sim.run(&mut host, config.display.present_interval(), None)
}

#[cfg(not(feature = "x11-host"))]
fn run_windowed(_config: &Config) -> Result<SimulatorStatus> {
    anyhow::bail!("windowed mode needs the x11-host feature")
}
