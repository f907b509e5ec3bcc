//! Historical-data panel: one scrolling stacked chart per GPU metric.
//!
//! The panel owns a table and a [`ChartSurface`] per [`MetricKind`], feeds
//! them from [`GpuStatus`] snapshots and keeps the min/max/current labels in
//! step with the tables' bound notifications. It is the layer that tolerates
//! bad samples: anything that cannot be recorded is logged and skipped.

use crate::chart::{ChartSurface, StackedRenderer, Tick};
use crate::clock::{Clock, USEC_PER_SEC};
use crate::config::HistoryConfig;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::model::{SharedTable, TableEvent, TimeSeriesTable};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// Upper bound of the GPU clock chart until the real maximum is known.
pub const DEFAULT_MAX_GPU_CLOCK: f64 = 2000.0;

/// Upper bound of the memory clock chart until the real maximum is known.
pub const DEFAULT_MAX_MEM_CLOCK: f64 = 7000.0;

/// A charted GPU metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricKind {
    /// Graphics clock.
    GpuClock,
    /// Memory clock.
    MemoryClock,
    /// Core temperature.
    GpuTemp,
    /// First fan's duty.
    FanDuty,
    /// First fan's speed.
    FanRpm,
    /// GPU utilization.
    GpuLoad,
    /// Memory controller utilization.
    MemoryLoad,
    /// Memory in use.
    MemoryUsage,
    /// Board power draw.
    PowerDraw,
}

/// Unit and initial bounds of a metric's chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPreset {
    /// Unit suffix for the current-value label.
    pub unit: &'static str,
    /// Initial lower bound.
    pub min: f64,
    /// Initial upper bound.
    pub max: f64,
}

impl MetricKind {
    /// Every metric in panel order.
    pub const ALL: [Self; 9] = [
        Self::GpuClock,
        Self::MemoryClock,
        Self::GpuTemp,
        Self::FanDuty,
        Self::FanRpm,
        Self::GpuLoad,
        Self::MemoryLoad,
        Self::MemoryUsage,
        Self::PowerDraw,
    ];

    /// Unit and initial bounds.
    #[must_use]
    pub const fn preset(self) -> MetricPreset {
        let (unit, max) = match self {
            Self::GpuClock => ("MHz", DEFAULT_MAX_GPU_CLOCK),
            Self::MemoryClock => ("MHz", DEFAULT_MAX_MEM_CLOCK),
            Self::GpuTemp => ("°C", 100.0),
            Self::FanDuty | Self::GpuLoad | Self::MemoryLoad => ("%", 100.0),
            Self::FanRpm => ("rpm", 2200.0),
            Self::MemoryUsage => ("MiB", 4096.0),
            Self::PowerDraw => ("W", 400.0),
        };
        MetricPreset {
            unit,
            min: 0.0,
            max,
        }
    }

    /// Series name used for the metric's table column.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GpuClock => "gpu_clock",
            Self::MemoryClock => "memory_clock",
            Self::GpuTemp => "gpu_temp",
            Self::FanDuty => "fan_duty",
            Self::FanRpm => "fan_rpm",
            Self::GpuLoad => "gpu_load",
            Self::MemoryLoad => "memory_load",
            Self::MemoryUsage => "memory_usage",
            Self::PowerDraw => "power_draw",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reading destined for a metric's chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Target chart.
    pub kind: MetricKind,
    /// Monotonic timestamp in microseconds.
    pub timestamp: i64,
    /// Reading in the metric's unit.
    pub value: f64,
}

/// Snapshot of one GPU's readings. Any field may be unavailable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuStatus {
    /// Graphics clock, MHz.
    pub gpu_clock: Option<u32>,
    /// Memory clock, MHz.
    pub memory_clock: Option<u32>,
    /// Core temperature, °C.
    pub gpu_temp: Option<u32>,
    /// `(duty %, rpm)` per fan.
    pub fans: Vec<(u32, u32)>,
    /// GPU utilization, %.
    pub gpu_load: Option<u32>,
    /// Memory controller utilization, %.
    pub memory_load: Option<u32>,
    /// Memory in use, MiB.
    pub memory_used: Option<u32>,
    /// Power draw, W.
    pub power_draw: Option<f64>,
}

/// Hardware maxima that replace the preset upper bounds once known.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaxValues {
    /// Maximum graphics clock, MHz.
    pub gpu_clock: Option<f64>,
    /// Maximum memory clock, MHz.
    pub memory_clock: Option<f64>,
    /// Total memory, MiB.
    pub memory_total: Option<f64>,
}

/// Convert a status snapshot into samples sharing one timestamp from `clock`.
///
/// Only the first fan is charted.
#[must_use]
pub fn samples_from_status(status: &GpuStatus, clock: &dyn Clock) -> Vec<Sample> {
    let timestamp = clock.now_us();
    let sample = |kind, value: f64| Sample {
        kind,
        timestamp,
        value,
    };

    let mut samples = Vec::with_capacity(MetricKind::ALL.len());
    let readings = [
        (MetricKind::GpuClock, status.gpu_clock),
        (MetricKind::MemoryClock, status.memory_clock),
        (MetricKind::GpuTemp, status.gpu_temp),
    ];
    samples.extend(
        readings
            .into_iter()
            .filter_map(|(kind, v)| v.map(|v| sample(kind, f64::from(v)))),
    );
    if let Some(&(duty, rpm)) = status.fans.first() {
        samples.push(sample(MetricKind::FanDuty, f64::from(duty)));
        samples.push(sample(MetricKind::FanRpm, f64::from(rpm)));
    }
    let readings = [
        (MetricKind::GpuLoad, status.gpu_load),
        (MetricKind::MemoryLoad, status.memory_load),
        (MetricKind::MemoryUsage, status.memory_used),
    ];
    samples.extend(
        readings
            .into_iter()
            .filter_map(|(kind, v)| v.map(|v| sample(kind, f64::from(v)))),
    );
    if let Some(power) = status.power_draw {
        samples.push(sample(MetricKind::PowerDraw, power));
    }
    samples
}

/// Text shown next to a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricLabels {
    /// Lower bound, no decimals.
    pub min: String,
    /// Upper bound, no decimals.
    pub max: String,
    /// Latest reading with its unit.
    pub current: String,
}

#[derive(Debug)]
struct Graph {
    table: SharedTable,
    surface: ChartSurface,
    bound_events: Receiver<TableEvent>,
    labels: MetricLabels,
}

impl Graph {
    fn sync_labels(&mut self) {
        for event in self.bound_events.try_iter() {
            match event {
                TableEvent::ValueMinChanged(v) => self.labels.min = format!("{v:.0}"),
                TableEvent::ValueMaxChanged(v) => self.labels.max = format!("{v:.0}"),
                TableEvent::Changed | TableEvent::TimespanChanged(_) => {}
            }
        }
    }
}

/// The historical-data panel.
#[derive(Debug)]
pub struct HistoryPanel {
    config: HistoryConfig,
    clock: Rc<dyn Clock>,
    graphs: BTreeMap<MetricKind, Graph>,
    max_values: MaxValues,
    gpu_index: usize,
    width: u32,
}

impl HistoryPanel {
    /// Build every chart from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration does not validate.
    pub fn new(config: HistoryConfig, clock: Rc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let mut panel = Self {
            config,
            clock,
            graphs: BTreeMap::new(),
            max_values: MaxValues::default(),
            gpu_index: 0,
            width: 0,
        };
        panel.build_graphs()?;
        Ok(panel)
    }

    fn build_graphs(&mut self) -> Result<()> {
        let color = self.config.graph_color()?;
        let background = self.config.background()?;
        let renderer = StackedRenderer::new(0)
            .line_width(self.config.line_width)
            .stroke_color(color)
            .fill_color(color.with_alpha_f32(self.config.fill_alpha));
        let timespan = i64::from(self.config.monitoring_interval_s) * USEC_PER_SEC;

        self.graphs.clear();
        for kind in MetricKind::ALL {
            let preset = kind.preset();
            let table = TimeSeriesTable::new(&[kind.name()], self.config.capacity())?
                .with_timespan(timespan)?
                .with_bounds(preset.min, preset.max)?
                .into_shared();
            let bound_events = table.borrow_mut().subscribe();

            let mut surface =
                ChartSurface::new(Rc::clone(&table), Rc::clone(&self.clock)).with_background(background);
            surface.add_renderer(renderer.clone());
            surface.allocate(self.width, self.config.chart_height);

            table.borrow_mut().append(self.clock.now_us(), &[0.0])?;

            let labels = MetricLabels {
                min: format!("{:.0}", preset.min),
                max: format!("{:.0}", preset.max),
                current: format!("0 {}", preset.unit),
            };
            self.graphs.insert(
                kind,
                Graph {
                    table,
                    surface,
                    bound_events,
                    labels,
                },
            );
        }
        log::debug!(
            "built {} history charts, {} samples each",
            self.graphs.len(),
            self.config.capacity()
        );
        Ok(())
    }

    // ========================================================================
    // Feeding
    // ========================================================================

    /// Append each sample to its chart and update the current-value label.
    ///
    /// Samples that cannot be recorded (non-finite values, a table borrowed
    /// elsewhere) are logged and skipped.
    pub fn refresh(&mut self, samples: &[Sample]) {
        let started = Instant::now();
        for sample in samples {
            let Some(graph) = self.graphs.get_mut(&sample.kind) else {
                continue;
            };
            if !sample.value.is_finite() {
                log::warn!("dropping non-finite {} sample: {}", sample.kind, sample.value);
                continue;
            }
            let appended = match graph.table.try_borrow_mut() {
                Ok(mut table) => table.append(sample.timestamp, &[sample.value]),
                Err(e) => Err(crate::Error::Rendering(format!("table unavailable: {e}"))),
            };
            if let Err(e) = appended {
                log::warn!("dropping {} sample: {e}", sample.kind);
                continue;
            }
            graph.labels.current = format!("{} {}", sample.value, sample.kind.preset().unit);
            graph.sync_labels();
        }
        log::debug!(
            "refreshing history charts took {:.3} ms",
            started.elapsed().as_secs_f64() * 1000.0
        );
    }

    /// Record a status snapshot for `gpu_index`. Switching GPUs resets every
    /// chart first.
    ///
    /// # Errors
    ///
    /// Returns an error only if the charts cannot be rebuilt on a GPU switch.
    pub fn add_status(&mut self, status: &GpuStatus, gpu_index: usize) -> Result<()> {
        if gpu_index != self.gpu_index {
            log::debug!("switching history from GPU {} to {gpu_index}", self.gpu_index);
            self.gpu_index = gpu_index;
            self.reset()?;
        }
        let samples = samples_from_status(status, self.clock.as_ref());
        self.refresh(&samples);
        Ok(())
    }

    /// Replace preset upper bounds with hardware maxima.
    pub fn set_max_values(&mut self, max_values: MaxValues) {
        self.max_values = max_values;
        self.apply_max_values();
    }

    fn apply_max_values(&mut self) {
        let targets = [
            (MetricKind::GpuClock, self.max_values.gpu_clock),
            (MetricKind::MemoryClock, self.max_values.memory_clock),
            (MetricKind::MemoryUsage, self.max_values.memory_total),
        ];
        for (kind, max) in targets {
            let (Some(max), Some(graph)) = (max, self.graphs.get_mut(&kind)) else {
                continue;
            };
            let result = match graph.table.try_borrow_mut() {
                Ok(mut table) => table.set_value_max(max),
                Err(e) => Err(crate::Error::Rendering(format!("table unavailable: {e}"))),
            };
            if let Err(e) = result {
                log::warn!("ignoring {kind} maximum: {e}");
            }
            graph.sync_labels();
        }
    }

    /// Rebuild every chart from scratch and re-apply known maxima.
    ///
    /// # Errors
    ///
    /// Returns an error when a chart cannot be rebuilt.
    pub fn reset(&mut self) -> Result<()> {
        self.build_graphs()?;
        self.apply_max_values();
        Ok(())
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// Give every chart the panel width; heights come from the configuration.
    pub fn allocate(&mut self, width: u32) {
        self.width = width;
        for graph in self.graphs.values_mut() {
            graph.surface.allocate(width, self.config.chart_height);
        }
    }

    /// Frame tick for every armed chart; returns the charts to redraw.
    pub fn tick(&mut self, frame_time: i64) -> Vec<MetricKind> {
        self.graphs
            .iter_mut()
            .filter(|(_, g)| g.surface.is_tick_armed())
            .filter_map(|(&kind, g)| (g.surface.tick(frame_time) == Tick::Redraw).then_some(kind))
            .collect()
    }

    /// Paint one chart into `target`.
    ///
    /// # Errors
    ///
    /// Propagates [`ChartSurface::draw`] errors.
    pub fn draw(&mut self, kind: MetricKind, target: &mut Framebuffer) -> Result<()> {
        match self.graphs.get_mut(&kind) {
            Some(graph) => graph.surface.draw(target),
            None => Ok(()),
        }
    }

    /// Labels for a chart.
    #[must_use]
    pub fn labels(&self, kind: MetricKind) -> Option<&MetricLabels> {
        self.graphs.get(&kind).map(|g| &g.labels)
    }

    /// The table behind a chart.
    #[must_use]
    pub fn table(&self, kind: MetricKind) -> Option<&SharedTable> {
        self.graphs.get(&kind).map(|g| &g.table)
    }

    /// The surface of a chart.
    pub fn surface_mut(&mut self, kind: MetricKind) -> Option<&mut ChartSurface> {
        self.graphs.get_mut(&kind).map(|g| &mut g.surface)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}
