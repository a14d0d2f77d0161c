// src/demo/engine.rs
//! DemoEngine - a small software UI engine for the stopwatch screen.
//!
//! It follows the embedded engine's redraw model: changes invalidate screen
//! areas, and the periodic refresh renders each area through a partial draw
//! buffer of [`DRAW_BUFFER_ROWS`] rows, flushing one strip at a time. A strip
//! is only reused after the display driver acknowledges its flush; a missing
//! acknowledgment stalls the refresh for good.

use crate::color::Rgb565;
use crate::demo::scene::{self, Scene, BODY, ICON_AREA, TITLE_BAND, TITLE_COLOR};
use crate::demo::stopwatch::StopwatchFace;
use crate::display::{DisplayRegion, FlushReady};
use crate::engine::{
    DisplayDriverInfo, Drivers, InputDeviceKind, MemoryMonitor, MemoryStats, TaskCallback, TaskPriority, UiEngine,
};
use crate::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::input::PointerData;
use log::{debug, info, trace, warn};

/// Rows in the partial draw buffer.
pub const DRAW_BUFFER_ROWS: usize = 20;
/// Period of the built-in refresh and pointer read.
pub const REFRESH_PERIOD_MS: u32 = 30;

const HEAP_SIZE: u32 = 32 * 1024;
const HEAP_BASE_USED: u32 = 2 * 1024;
const TASK_SIZE: u32 = 48;
const AREA_SIZE: u32 = 16;

/// Set by the display driver when a flushed strip may be reused.
#[derive(Debug, Default)]
struct FlushFlag {
    ready: bool,
}

impl FlushReady for FlushFlag {
    fn flush_ready(&mut self) {
        self.ready = true;
    }
}

struct Task {
    period_ms: u32,
    priority: TaskPriority,
    last_run: u32,
    callback: Option<TaskCallback>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub refreshes: u64,
    pub flushes: u64,
    pub fills: u64,
    pub maps: u64,
}

pub struct DemoEngine {
    initialized: bool,
    display: Option<DisplayDriverInfo>,
    pointer: bool,
    tick_ms: u32,
    tasks: Vec<Task>,
    last_refresh: Option<u32>,
    scene: Scene,
    invalid: Vec<DisplayRegion>,
    draw_buf: Vec<Rgb565>,
    stalled: bool,
    stats: RefreshStats,
}

impl DemoEngine {
    pub fn new() -> Self {
        Self {
            initialized: false,
            display: None,
            pointer: false,
            tick_ms: 0,
            tasks: Vec::new(),
            last_refresh: None,
            scene: Scene::default(),
            invalid: Vec::new(),
            draw_buf: vec![Rgb565::BLACK; SCREEN_WIDTH * DRAW_BUFFER_ROWS],
            stalled: false,
            stats: RefreshStats::default(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn invalid_areas(&self) -> &[DisplayRegion] {
        &self.invalid
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn stats(&self) -> RefreshStats {
        self.stats
    }

    /// Marks `area` for redraw. Areas overlapping a pending one are merged.
    pub fn invalidate(&mut self, area: DisplayRegion) {
        let Some(mut area) = area.intersect(&DisplayRegion::full_screen()) else {
            return;
        };
        while let Some(i) = self.invalid.iter().position(|a| a.intersect(&area).is_some()) {
            area = area.union(&self.invalid.swap_remove(i));
        }
        self.invalid.push(area);
    }

    fn due(&self, last: u32, period_ms: u32) -> bool {
        self.tick_ms.wrapping_sub(last) >= period_ms
    }

    fn run_tasks(&mut self) {
        let mut order: Vec<usize> = (0..self.tasks.len()).collect();
        order.sort_by(|&a, &b| self.tasks[b].priority.cmp(&self.tasks[a].priority));

        for i in order {
            if !self.due(self.tasks[i].last_run, self.tasks[i].period_ms) {
                continue;
            }
            self.tasks[i].last_run = self.tick_ms;
            // Taken out while it runs so it can look at the engine.
            if let Some(mut callback) = self.tasks[i].callback.take() {
                callback(&*self);
                self.tasks[i].callback = Some(callback);
            }
        }
    }

    fn read_pointer(&mut self, drivers: &mut Drivers<'_>) {
        let mut data = PointerData::default();
        while drivers.input.read(&mut data) {}

        let marker = data.is_pressed().then_some((data.x, data.y));
        if marker == self.scene.marker {
            return;
        }
        trace!("DemoEngine: pointer {:?}", data);
        for (x, y) in [self.scene.marker, marker].into_iter().flatten() {
            if let Some(area) = scene::marker_area(x, y) {
                self.invalidate(area);
            }
        }
        self.scene.marker = marker;
    }

    fn refresh(&mut self, drivers: &mut Drivers<'_>) {
        if self.invalid.is_empty() {
            return;
        }
        self.stats.refreshes += 1;
        let areas = std::mem::take(&mut self.invalid);
        debug!("DemoEngine: refreshing {} area(s)", areas.len());

        for area in areas {
            if let Some(band) = area.intersect(&TITLE_BAND) {
                self.draw_title(band, drivers);
            }
            if let Some(body) = area.intersect(&BODY) {
                if !self.draw_body(body, drivers) {
                    return;
                }
            }
        }
    }

    fn draw_title(&mut self, band: DisplayRegion, drivers: &mut Drivers<'_>) {
        drivers.display.fill_region(band, TITLE_COLOR);
        self.stats.fills += 1;
        if let Some(icon) = band.intersect(&ICON_AREA) {
            let pixels: Vec<Rgb565> = icon.points().map(|(x, y)| self.scene.icon_pixel(x, y)).collect();
            drivers.display.map_region(icon, &pixels);
            self.stats.maps += 1;
        }
    }

    /// Renders `body` in strips. Returns false once a flush goes
    /// unacknowledged.
    fn draw_body(&mut self, body: DisplayRegion, drivers: &mut Drivers<'_>) -> bool {
        let mut y1 = body.y1;
        while y1 <= body.y2 {
            let y2 = (y1 + DRAW_BUFFER_ROWS as i32 - 1).min(body.y2);
            let strip = DisplayRegion::new(body.x1, y1, body.x2, y2);
            let len = strip.area();
            for (slot, (x, y)) in self.draw_buf[..len].iter_mut().zip(strip.points()) {
                *slot = self.scene.body_pixel(x, y);
            }

            let mut flag = FlushFlag::default();
            drivers.display.flush_region(strip, &self.draw_buf[..len], &mut flag);
            self.stats.flushes += 1;
            if !flag.ready {
                warn!("DemoEngine: flush of {:?} was never acknowledged; refresh stalled", strip);
                self.stalled = true;
                return false;
            }
            y1 = y2 + 1;
        }
        true
    }
}

impl Default for DemoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMonitor for DemoEngine {
    fn memory_monitor(&self) -> MemoryStats {
        let used = HEAP_BASE_USED + self.tasks.len() as u32 * TASK_SIZE + self.invalid.len() as u32 * AREA_SIZE;
        let free = HEAP_SIZE.saturating_sub(used);
        MemoryStats {
            total_size: HEAP_SIZE,
            free_size: free,
            used_pct: (used * 100 / HEAP_SIZE).min(100) as u8,
            frag_pct: 0,
            free_biggest_size: free,
        }
    }
}

impl UiEngine for DemoEngine {
    fn init(&mut self) {
        self.initialized = true;
        info!("DemoEngine: initialized, draw buffer {} rows", DRAW_BUFFER_ROWS);
    }

    fn register_display_driver(&mut self, info: DisplayDriverInfo) {
        if info.hor_res as usize != SCREEN_WIDTH || info.ver_res as usize != SCREEN_HEIGHT {
            warn!(
                "DemoEngine: display {}x{} does not match the {}x{} layout",
                info.hor_res, info.ver_res, SCREEN_WIDTH, SCREEN_HEIGHT
            );
        }
        self.display = Some(info);
        self.invalidate(DisplayRegion::full_screen());
    }

    fn register_input_driver(&mut self, kind: InputDeviceKind) {
        match kind {
            InputDeviceKind::Pointer => self.pointer = true,
        }
    }

    fn create_task(&mut self, period_ms: u32, priority: TaskPriority, task: TaskCallback) {
        debug!("DemoEngine: task every {} ms at {:?}", period_ms, priority);
        self.tasks.push(Task {
            period_ms,
            priority,
            last_run: self.tick_ms,
            callback: Some(task),
        });
    }

    fn advance_time_base(&mut self, ms: u32) {
        self.tick_ms = self.tick_ms.wrapping_add(ms);
    }

    fn run_task_dispatcher(&mut self, drivers: &mut Drivers<'_>) {
        if !self.initialized {
            return;
        }
        self.run_tasks();

        if self.last_refresh.is_some_and(|last| !self.due(last, REFRESH_PERIOD_MS)) {
            return;
        }
        self.last_refresh = Some(self.tick_ms);
        if self.pointer {
            self.read_pointer(drivers);
        }
        if self.display.is_some() && !self.stalled {
            self.refresh(drivers);
        }
    }
}

impl StopwatchFace for DemoEngine {
    fn ticks(&self) -> u32 {
        self.tick_ms
    }

    fn show_elapsed(&mut self, elapsed_ms: u32) {
        let previous = self.scene.elapsed_ms;
        if previous == elapsed_ms {
            return;
        }
        self.scene.elapsed_ms = elapsed_ms;
        if scene::readout_text(previous) != scene::readout_text(elapsed_ms) {
            self.invalidate(scene::READOUT_AREA);
        }
        if scene::gauge_value(previous) != scene::gauge_value(elapsed_ms) {
            self.invalidate(scene::GAUGE_AREA);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayDriver, DisplayDriverAdapter};
    use crate::input::InputDriverAdapter;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Display driver that drops every acknowledgment.
    #[derive(Default)]
    struct SilentDisplay {
        flushes: usize,
    }

    impl DisplayDriver for SilentDisplay {
        fn flush_region(&mut self, _region: DisplayRegion, _colors: &[Rgb565], _ready: &mut dyn FlushReady) {
            self.flushes += 1;
        }
        fn fill_region(&mut self, _region: DisplayRegion, _color: Rgb565) {}
        fn map_region(&mut self, _region: DisplayRegion, _colors: &[Rgb565]) {}
    }

    fn ready_engine() -> DemoEngine {
        let mut engine = DemoEngine::new();
        engine.init();
        engine.register_display_driver(DisplayDriverInfo { hor_res: 240, ver_res: 320 });
        engine.register_input_driver(InputDeviceKind::Pointer);
        engine
    }

    fn dispatch(engine: &mut DemoEngine, display: &mut dyn DisplayDriver, input: &mut InputDriverAdapter) {
        let mut drivers = Drivers { display, input };
        engine.run_task_dispatcher(&mut drivers);
    }

    #[test_log::test]
    fn first_refresh_draws_whole_screen() {
        let mut engine = ready_engine();
        let mut display = DisplayDriverAdapter::new();
        let mut input = InputDriverAdapter::new();

        dispatch(&mut engine, &mut display, &mut input);

        let body_strips = (BODY.height() + DRAW_BUFFER_ROWS - 1) / DRAW_BUFFER_ROWS;
        assert_eq!(engine.stats().flushes, body_strips as u64);
        assert_eq!(engine.stats().fills, 1);
        assert_eq!(engine.stats().maps, 1);
        assert!(engine.invalid_areas().is_empty());

        let fb = display.framebuffer();
        assert_eq!(fb.read(200, 5), TITLE_COLOR.to_argb8888());
        assert_eq!(fb.read(0, BODY.y1 as usize), Rgb565::new(0, 0, 0xFF).to_argb8888());
        assert_eq!(display.stats().rejected, 0);
    }

    #[test_log::test]
    fn refresh_waits_for_its_period() {
        let mut engine = ready_engine();
        let mut display = DisplayDriverAdapter::new();
        let mut input = InputDriverAdapter::new();
        dispatch(&mut engine, &mut display, &mut input);

        engine.show_elapsed(1_230);
        engine.advance_time_base(REFRESH_PERIOD_MS - 1);
        dispatch(&mut engine, &mut display, &mut input);
        assert_eq!(engine.invalid_areas(), &[scene::READOUT_AREA, scene::GAUGE_AREA]);

        engine.advance_time_base(1);
        dispatch(&mut engine, &mut display, &mut input);
        assert!(engine.invalid_areas().is_empty());
        assert_eq!(engine.stats().refreshes, 2);
    }

    #[test_log::test]
    fn missing_acknowledgment_stalls_refresh() {
        let mut engine = ready_engine();
        let mut display = SilentDisplay::default();
        let mut input = InputDriverAdapter::new();

        dispatch(&mut engine, &mut display, &mut input);
        assert!(engine.is_stalled());
        assert_eq!(display.flushes, 1);

        engine.show_elapsed(5_000);
        engine.advance_time_base(REFRESH_PERIOD_MS);
        dispatch(&mut engine, &mut display, &mut input);
        assert_eq!(display.flushes, 1);
    }

    #[test_log::test]
    fn pressed_pointer_moves_marker() {
        let mut engine = ready_engine();
        let mut display = DisplayDriverAdapter::new();
        let mut input = InputDriverAdapter::new();
        dispatch(&mut engine, &mut display, &mut input);

        input.on_pointer_down(60, 100);
        engine.advance_time_base(REFRESH_PERIOD_MS);
        dispatch(&mut engine, &mut display, &mut input);
        assert_eq!(engine.scene().marker, Some((60, 100)));
        assert_eq!(display.framebuffer().read(60, 100), Rgb565::WHITE.to_argb8888());

        input.on_pointer_up(60, 100);
        engine.advance_time_base(REFRESH_PERIOD_MS);
        dispatch(&mut engine, &mut display, &mut input);
        assert_eq!(engine.scene().marker, None);
        assert_ne!(display.framebuffer().read(60, 100), Rgb565::WHITE.to_argb8888());
    }

    #[test_log::test]
    fn overlapping_invalidations_merge() {
        let mut engine = DemoEngine::new();
        engine.invalidate(DisplayRegion::new(0, 0, 10, 10));
        engine.invalidate(DisplayRegion::new(5, 5, 20, 20));
        engine.invalidate(DisplayRegion::new(100, 100, 110, 110));
        engine.invalidate(DisplayRegion::new(-50, 300, 10, 400));

        assert_eq!(
            engine.invalid_areas(),
            &[
                DisplayRegion::new(0, 0, 20, 20),
                DisplayRegion::new(100, 100, 110, 110),
                DisplayRegion::new(0, 300, 10, 319),
            ]
        );
    }

    #[test_log::test]
    fn tasks_run_by_period_and_priority() {
        let mut engine = ready_engine();
        let mut display = DisplayDriverAdapter::new();
        let mut input = InputDriverAdapter::new();
        let runs = Rc::new(Cell::new(0u32));
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));

        let counter = runs.clone();
        let low = order.clone();
        engine.create_task(
            100,
            TaskPriority::Lowest,
            Box::new(move |monitor: &dyn MemoryMonitor| {
                counter.set(counter.get() + 1);
                assert_eq!(monitor.memory_monitor().total_size, HEAP_SIZE);
                low.borrow_mut().push("low");
            }),
        );
        let high = order.clone();
        engine.create_task(100, TaskPriority::High, Box::new(move |_: &dyn MemoryMonitor| high.borrow_mut().push("high")));

        engine.advance_time_base(99);
        dispatch(&mut engine, &mut display, &mut input);
        assert_eq!(runs.get(), 0);

        engine.advance_time_base(1);
        dispatch(&mut engine, &mut display, &mut input);
        assert_eq!(runs.get(), 1);
        assert_eq!(*order.borrow(), vec!["high", "low"]);

        engine.advance_time_base(50);
        dispatch(&mut engine, &mut display, &mut input);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn memory_stats_are_consistent() {
        let engine = ready_engine();
        let stats = engine.memory_monitor();
        assert_eq!(stats.total_size, HEAP_SIZE);
        assert_eq!(stats.used_size() + stats.free_size, HEAP_SIZE);
        assert!(stats.used_pct <= 100);
    }
}
