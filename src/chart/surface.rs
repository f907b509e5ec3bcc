//! Cached, smoothly scrolling strip-chart surface.
//!
//! A [`ChartSurface`] renders its table once into an off-screen
//! [`Framebuffer`] and reuses that image until something invalidates it. In
//! between samples the host calls [`ChartSurface::tick`] once per frame; the
//! surface slides the cached image left by the fraction of the timespan that
//! has elapsed since the newest sample, so the chart scrolls continuously
//! instead of jumping whenever a row arrives.

use super::renderer::{RenderWindow, Renderer};
use crate::clock::Clock;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use crate::model::{SharedTable, TableEvent};
use crate::output::PngEncoder;
use crate::render::RasterCanvas;
use batuta_common::display::WithDimensions;
use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc::Receiver;

/// Consecutive ticks without a draw after which the tick disarms itself.
pub const MAX_MISSED_FRAMES: u32 = 10;

/// What the host should do after a frame tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The scroll offset moved; schedule a draw.
    Redraw,
    /// Nothing visible changed; keep ticking.
    Idle,
    /// The tick disarmed itself; stop calling until the next draw re-arms it.
    Remove,
}

/// Off-screen cached chart with dirty tracking and scroll animation.
#[derive(Debug)]
pub struct ChartSurface {
    model: Option<SharedTable>,
    events: Option<Receiver<TableEvent>>,
    clock: Rc<dyn Clock>,
    renderers: Vec<Box<dyn Renderer>>,
    surface: Option<Framebuffer>,
    dirty: bool,
    width: u32,
    height: u32,
    visible: bool,
    background: Rgba,
    x_offset: f64,
    missed_frames: u32,
    tick_armed: bool,
}

impl ChartSurface {
    /// Create a surface observing `model`. Nothing is drawn until the surface
    /// has been [`allocate`](Self::allocate)d a non-empty size.
    pub fn new(model: SharedTable, clock: Rc<dyn Clock>) -> Self {
        let events = model.borrow_mut().subscribe();
        Self {
            model: Some(model),
            events: Some(events),
            clock,
            renderers: Vec::new(),
            surface: None,
            dirty: true,
            width: 0,
            height: 0,
            visible: true,
            background: Rgba::TRANSPARENT,
            x_offset: 0.0,
            missed_frames: 0,
            tick_armed: false,
        }
    }

    /// Set the color painted behind the chart on every draw.
    #[must_use]
    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// The observed table, if any.
    #[must_use]
    pub fn model(&self) -> Option<&SharedTable> {
        self.model.as_ref()
    }

    /// Observe a different table, or none.
    pub fn set_model(&mut self, model: Option<SharedTable>) {
        self.events = model.as_ref().map(|m| m.borrow_mut().subscribe());
        self.model = model;
        self.x_offset = 0.0;
        self.dirty = true;
    }

    /// Append a renderer; renderers paint in registration order.
    pub fn add_renderer<R: Renderer + 'static>(&mut self, renderer: R) {
        self.renderers.push(Box::new(renderer));
        self.dirty = true;
    }

    /// Remove every renderer.
    pub fn clear_renderers(&mut self) {
        self.renderers.clear();
        self.dirty = true;
    }

    /// Number of registered renderers.
    #[must_use]
    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    /// Give the surface its on-screen size. A different size drops the cache.
    pub fn allocate(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.surface = None;
            self.dirty = true;
        }
    }

    /// Allocated size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Mark the widget shown or hidden. A hidden surface stops its tick.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the widget is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Drain pending model notifications into the dirty flag and offset.
    pub fn process_events(&mut self) {
        let Some(events) = &self.events else {
            return;
        };
        for event in events.try_iter() {
            match event {
                TableEvent::Changed => {
                    self.x_offset = 0.0;
                    self.dirty = true;
                }
                TableEvent::ValueMinChanged(_)
                | TableEvent::ValueMaxChanged(_)
                | TableEvent::TimespanChanged(_) => self.dirty = true,
            }
        }
    }

    /// True when the cached image must be repainted before the next draw.
    /// Call [`process_events`](Self::process_events) first to observe model
    /// changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drain notifications and report whether a draw is needed.
    pub fn needs_redraw(&mut self) -> bool {
        self.process_events();
        self.dirty || self.surface.is_none()
    }

    /// Horizontal scroll offset as a fraction of the width (zero or negative).
    #[must_use]
    pub fn x_offset(&self) -> f64 {
        self.x_offset
    }

    /// True while the host should keep calling [`tick`](Self::tick).
    #[must_use]
    pub fn is_tick_armed(&self) -> bool {
        self.tick_armed
    }

    /// Consecutive ticks since the last draw.
    #[must_use]
    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    /// The cached image, if one exists.
    #[must_use]
    pub fn cached(&self) -> Option<&Framebuffer> {
        self.surface.as_ref()
    }

    // ========================================================================
    // Painting
    // ========================================================================

    /// Create the cached image if missing, repaint it if dirty, then arm the
    /// frame tick.
    ///
    /// # Errors
    ///
    /// Returns an error when the table is mutably borrowed elsewhere or a
    /// renderer fails.
    pub fn ensure_surface(&mut self) -> Result<()> {
        self.process_events();
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        if self.surface.is_none() {
            log::debug!("creating {}x{} chart surface", self.width, self.height);
            self.surface = Some(Framebuffer::new(self.width, self.height)?);
            self.dirty = true;
        }

        if self.dirty {
            self.repaint()?;
        }

        if !self.tick_armed {
            log::debug!("arming chart tick");
            self.tick_armed = true;
        }
        Ok(())
    }

    fn repaint(&mut self) -> Result<()> {
        let Some(model) = &self.model else {
            return Ok(());
        };
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        let table = model
            .try_borrow()
            .map_err(|e| Error::Rendering(format!("table unavailable: {e}")))?;

        let window = RenderWindow::for_table(&table, self.clock.as_ref());
        log::trace!(
            "repainting chart: {} rows, window {window:?}, {} renderers",
            table.len(),
            self.renderers.len()
        );

        surface.clear(Rgba::TRANSPARENT);
        let area = Rect::from_size(self.width, self.height);
        let mut canvas = RasterCanvas::new(surface);
        for renderer in &self.renderers {
            renderer.render(&table, &window, &mut canvas, area)?;
        }
        self.dirty = false;
        Ok(())
    }

    /// Paint the chart into `target` at its origin.
    ///
    /// Resets the missed-frame counter, brings the cache up to date, paints
    /// the background and composites the cache shifted by the scroll offset.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ensure_surface`](Self::ensure_surface).
    pub fn draw(&mut self, target: &mut Framebuffer) -> Result<()> {
        self.missed_frames = 0;
        self.ensure_surface()?;

        let width = self.width.min(target.width()) as i32;
        let height = self.height.min(target.height()) as i32;
        if self.background.a > 0 {
            for y in 0..height {
                target.blend_span(0, width, y, self.background);
            }
        }
        if let Some(surface) = &self.surface {
            target.composite(surface, self.pixel_offset(), 0);
        }
        Ok(())
    }

    fn pixel_offset(&self) -> i32 {
        (self.x_offset * f64::from(self.width)).round() as i32
    }

    /// Per-frame callback. `frame_time` is the host frame clock in
    /// microseconds on the same timeline as the table's timestamps.
    pub fn tick(&mut self, frame_time: i64) -> Tick {
        if !self.tick_armed {
            return Tick::Remove;
        }
        self.process_events();

        let timespan = match (&self.surface, &self.model) {
            (Some(_), Some(model)) if self.visible => match model.try_borrow() {
                Ok(table) => Some((table.timespan(), table.end_time(self.clock.as_ref()))),
                Err(_) => None,
            },
            _ => None,
        };
        let Some((timespan, end_time)) = timespan else {
            return self.disarm();
        };

        if self.missed_frames >= MAX_MISSED_FRAMES {
            return self.disarm();
        }
        self.missed_frames += 1;

        if timespan <= 0 {
            return self.disarm();
        }

        let before = self.pixel_offset();
        self.x_offset = -((frame_time as f64 - end_time as f64) / timespan as f64);
        if self.pixel_offset() == before {
            Tick::Idle
        } else {
            Tick::Redraw
        }
    }

    fn disarm(&mut self) -> Tick {
        if self.tick_armed {
            log::debug!("disarming chart tick after {} missed frames", self.missed_frames);
            self.tick_armed = false;
        }
        Tick::Remove
    }

    /// Stop the tick and drop the cached image.
    pub fn destroy(&mut self) {
        self.disarm();
        self.surface = None;
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Render the current chart into a fresh framebuffer of the allocated size
    /// with the scroll offset applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] before the surface is allocated,
    /// or any error from [`draw`](Self::draw).
    pub fn snapshot(&mut self) -> Result<Framebuffer> {
        let mut target = Framebuffer::new(self.width, self.height)?;
        self.draw(&mut target)?;
        Ok(target)
    }

    /// Write a [`snapshot`](Self::snapshot) as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot or PNG encoding fails.
    pub fn write_png<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let fb = self.snapshot()?;
        PngEncoder::write_to_file(&fb, path)
    }
}

impl WithDimensions for ChartSurface {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.allocate(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{LineRenderer, StackedRenderer};
    use crate::clock::ManualClock;
    use crate::model::TimeSeriesTable;

    fn setup() -> (SharedTable, Rc<ManualClock>, ChartSurface) {
        let table = TimeSeriesTable::new(&["v"], 5)
            .unwrap()
            .with_timespan(1_000)
            .unwrap()
            .into_shared();
        let clock = Rc::new(ManualClock::new(0));
        let mut surface = ChartSurface::new(Rc::clone(&table), Rc::clone(&clock) as Rc<dyn Clock>);
        surface.add_renderer(LineRenderer::new(0).color(Rgba::RED));
        surface.allocate(100, 40);
        (table, clock, surface)
    }

    #[test]
    fn test_nothing_without_allocation() {
        let table = TimeSeriesTable::new(&["v"], 5).unwrap().into_shared();
        let mut surface = ChartSurface::new(table, Rc::new(ManualClock::new(0)));
        surface.ensure_surface().unwrap();
        assert!(surface.cached().is_none());
        assert!(!surface.is_tick_armed());
        assert!(surface.snapshot().is_err());
    }

    #[test]
    fn test_ensure_surface_cleans_and_arms() {
        let (_table, _clock, mut surface) = setup();
        assert!(surface.is_dirty());
        surface.ensure_surface().unwrap();
        assert!(!surface.is_dirty());
        assert!(surface.is_tick_armed());
        assert!(surface.cached().is_some());
    }

    #[test]
    fn test_append_marks_dirty_and_resets_offset() {
        let (table, _clock, mut surface) = setup();
        table.borrow_mut().append(0, &[10.0]).unwrap();
        surface.ensure_surface().unwrap();
        assert_eq!(surface.tick(500), Tick::Redraw);
        assert!(surface.x_offset() < 0.0);

        table.borrow_mut().append(1_000, &[20.0]).unwrap();
        surface.process_events();
        assert!(surface.is_dirty());
        assert_eq!(surface.x_offset(), 0.0);
    }

    #[test]
    fn test_tick_with_extreme_frame_times() {
        let (table, _clock, mut surface) = setup();
        table.borrow_mut().append(0, &[10.0]).unwrap();
        surface.ensure_surface().unwrap();

        assert_eq!(surface.tick(i64::MIN), Tick::Redraw);
        assert!(surface.x_offset().is_finite());
        assert!(surface.x_offset() > 0.0);

        assert_eq!(surface.tick(i64::MAX), Tick::Redraw);
        assert!(surface.x_offset().is_finite());
        assert!(surface.x_offset() < 0.0);
    }

    #[test]
    fn test_bound_and_renderer_changes_mark_dirty() {
        let (table, _clock, mut surface) = setup();
        surface.ensure_surface().unwrap();

        table.borrow_mut().set_value_max(500.0).unwrap();
        assert!(surface.needs_redraw());
        surface.ensure_surface().unwrap();

        surface.add_renderer(StackedRenderer::new(0));
        assert!(surface.is_dirty());
        surface.ensure_surface().unwrap();

        surface.clear_renderers();
        assert!(surface.is_dirty());
        assert_eq!(surface.renderer_count(), 0);
    }

    #[test]
    fn test_allocate_same_size_keeps_cache() {
        let (_table, _clock, mut surface) = setup();
        surface.ensure_surface().unwrap();
        surface.allocate(100, 40);
        assert!(!surface.is_dirty());
        surface.allocate(120, 40);
        assert!(surface.is_dirty());
        assert!(surface.cached().is_none());
    }

    #[test]
    fn test_tick_offset_formula() {
        let (table, _clock, mut surface) = setup();
        table.borrow_mut().append(2_000, &[1.0]).unwrap();
        surface.ensure_surface().unwrap();

        assert_eq!(surface.tick(2_250), Tick::Redraw);
        assert!((surface.x_offset() + 0.25).abs() < 1e-12);

        // Same frame time: offset unchanged.
        assert_eq!(surface.tick(2_250), Tick::Idle);
    }

    #[test]
    fn test_tick_disarms_after_missed_frames() {
        let (_table, _clock, mut surface) = setup();
        surface.ensure_surface().unwrap();
        for frame in 0..MAX_MISSED_FRAMES {
            assert_ne!(surface.tick(i64::from(frame)), Tick::Remove);
        }
        assert_eq!(surface.tick(100), Tick::Remove);
        assert!(!surface.is_tick_armed());
        assert_eq!(surface.tick(101), Tick::Remove);

        let mut target = Framebuffer::new(100, 40).unwrap();
        surface.draw(&mut target).unwrap();
        assert!(surface.is_tick_armed());
        assert_eq!(surface.missed_frames(), 0);
    }

    #[test]
    fn test_tick_removed_when_hidden_or_modelless() {
        let (_table, _clock, mut surface) = setup();
        surface.ensure_surface().unwrap();
        surface.set_visible(false);
        assert_eq!(surface.tick(0), Tick::Remove);

        surface.set_visible(true);
        surface.ensure_surface().unwrap();
        surface.set_model(None);
        assert_eq!(surface.tick(0), Tick::Remove);
    }

    #[test]
    fn test_destroy_drops_cache() {
        let (_table, _clock, mut surface) = setup();
        surface.ensure_surface().unwrap();
        surface.destroy();
        assert!(surface.cached().is_none());
        assert!(!surface.is_tick_armed());
    }

    #[test]
    fn test_draw_paints_curve_and_background() {
        let (table, clock, mut surface) = setup();
        {
            let mut t = table.borrow_mut();
            t.append(0, &[10.0]).unwrap();
            t.append(500, &[90.0]).unwrap();
            t.append(1_000, &[50.0]).unwrap();
        }
        clock.set(1_000);
        surface.set_dimensions(100, 40);
        let mut surface = surface.with_background(Rgba::BLACK);

        let fb = surface.snapshot().unwrap();
        assert_eq!(fb.covered_pixels(), 100 * 40);
        let reddish = (0..40).any(|y| fb.get_pixel(99, y).is_some_and(|p| p.r > 100));
        assert!(reddish);
    }

    #[test]
    fn test_borrowed_table_is_a_rendering_error() {
        let (table, _clock, mut surface) = setup();
        let _guard = table.borrow_mut();
        assert!(matches!(surface.ensure_surface(), Err(Error::Rendering(_))));
    }
}
