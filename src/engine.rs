// src/engine.rs

//! Boundary to the two foreign collaborators the simulator hosts: the
//! embedded UI engine and the embedded application logic.
//!
//! Neither is implemented here. The simulator drives them only through these
//! traits. Driver hooks are not stored inside the engine; they are handed to
//! it as a [`Drivers`] context on every dispatcher run, which keeps the frame
//! buffer and pointer state owned by the simulator.

use crate::controls::PhysicalControls;
use crate::display::DisplayDriver;
use crate::input::InputDriver;
use log::info;

/// The driver hooks in effect for one dispatcher run.
pub struct Drivers<'a> {
    pub display: &'a mut dyn DisplayDriver,
    pub input: &'a mut dyn InputDriver,
}

/// Display parameters announced at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDriverInfo {
    pub hor_res: u32,
    pub ver_res: u32,
}

/// Kinds of input device the engine can poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDeviceKind {
    Pointer,
}

/// Engine task priorities, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    Lowest,
    Low,
    Mid,
    High,
    Highest,
}

/// Heap usage as reported by the engine's allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    pub total_size: u32,
    pub free_size: u32,
    pub used_pct: u8,
    pub frag_pct: u8,
    pub free_biggest_size: u32,
}

impl MemoryStats {
    pub fn used_size(&self) -> u32 {
        self.total_size.saturating_sub(self.free_size)
    }
}

/// Read access to the engine's allocator statistics.
pub trait MemoryMonitor {
    fn memory_monitor(&self) -> MemoryStats;
}

/// Periodic task body. Receives the engine's allocator view when it runs.
pub type TaskCallback = Box<dyn FnMut(&dyn MemoryMonitor)>;

/// The embedded UI engine as the simulator consumes it.
pub trait UiEngine: MemoryMonitor {
    fn init(&mut self);
    fn register_display_driver(&mut self, info: DisplayDriverInfo);
    fn register_input_driver(&mut self, kind: InputDeviceKind);
    fn create_task(&mut self, period_ms: u32, priority: TaskPriority, task: TaskCallback);
    /// Advance the engine's millisecond time base.
    fn advance_time_base(&mut self, ms: u32);
    /// Run due tasks once. Display and input driver calls happen inside.
    fn run_task_dispatcher(&mut self, drivers: &mut Drivers<'_>);
}

/// The embedded application logic.
pub trait Application<E: UiEngine> {
    /// Called once after the engine is initialized.
    fn init(&mut self, engine: &mut E, controls: &mut dyn PhysicalControls);
    /// Called once per tick, before the engine runs.
    fn update(&mut self, engine: &mut E, controls: &mut dyn PhysicalControls);
}

/// Body of the memory monitor task the simulator registers with the engine.
pub fn report_memory_usage(monitor: &dyn MemoryMonitor) {
    let mon = monitor.memory_monitor();
    info!(
        "used: {:6} ({:3}%), frag: {:3}%, biggest free: {:6}",
        mon.used_size(),
        mon.used_pct,
        mon.frag_pct,
        mon.free_biggest_size
    );
}
