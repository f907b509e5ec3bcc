//! Fan profile curves: temperature to duty step functions.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// One step of a fan profile: at or above `temperature`, run at `duty` %.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedStep {
    /// Temperature in °C.
    pub temperature: i32,
    /// Fan duty in percent.
    pub duty: i32,
}

impl SpeedStep {
    /// Create a step.
    #[must_use]
    pub const fn new(temperature: i32, duty: i32) -> Self {
        Self { temperature, duty }
    }
}

/// Temperature and duty limits a profile lives within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileLimits {
    /// Lowest temperature on the curve.
    pub min_temp: i32,
    /// Highest temperature on the curve.
    pub max_temp: i32,
    /// Lowest allowed duty.
    pub min_duty: i32,
    /// Highest allowed duty.
    pub max_duty: i32,
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            min_temp: 0,
            max_temp: 100,
            min_duty: 0,
            max_duty: 100,
        }
    }
}

/// Editing ranges for one step, bounded by its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepBounds {
    /// Allowed temperatures.
    pub temperature: RangeInclusive<i32>,
    /// Allowed duties.
    pub duty: RangeInclusive<i32>,
}

/// Sorted temperature to duty mapping.
///
/// # Example
///
/// ```
/// use trueno_strip::profile::{ProfileCurve, ProfileLimits, SpeedStep};
///
/// let steps = [SpeedStep::new(40, 30), SpeedStep::new(70, 80)];
/// let curve = ProfileCurve::from_steps(&steps, ProfileLimits::default());
/// // The curve is anchored at both ends of the temperature range.
/// assert_eq!(curve.points(), vec![(0, 30), (40, 30), (70, 80), (100, 100)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileCurve {
    points: BTreeMap<i32, i32>,
}

impl ProfileCurve {
    /// Empty curve.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plottable curve from persisted steps.
    ///
    /// When there is at least one step, `min_temp` is added with the duty of
    /// the lowest step if it is missing, and `max_temp` is pinned to
    /// `max_duty`. An empty step list yields an empty curve.
    #[must_use]
    pub fn from_steps(steps: &[SpeedStep], limits: ProfileLimits) -> Self {
        let mut points: BTreeMap<i32, i32> =
            steps.iter().map(|s| (s.temperature, s.duty)).collect();
        if let Some((_, &lowest_duty)) = points.first_key_value() {
            points.entry(limits.min_temp).or_insert(lowest_duty);
            points.insert(limits.max_temp, limits.max_duty);
        }
        Self { points }
    }

    /// Insert or replace the duty at `temperature`.
    pub fn insert(&mut self, temperature: i32, duty: i32) {
        self.points.insert(temperature, duty);
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the curve has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in ascending temperature order.
    #[must_use]
    pub fn points(&self) -> Vec<(i32, i32)> {
        self.points.iter().map(|(&t, &d)| (t, d)).collect()
    }

    /// Points shifted left by `hysteresis` degrees, dropping any whose shifted
    /// temperature would be negative.
    #[must_use]
    pub fn hysteresis_points(&self, hysteresis: i32) -> Vec<(i32, i32)> {
        self.points
            .iter()
            .map(|(&t, &d)| (t - hysteresis, d))
            .filter(|&(t, _)| t >= 0)
            .collect()
    }
}

impl FromIterator<(i32, i32)> for ProfileCurve {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Allowed temperature and duty ranges when editing `steps[index]`.
///
/// A step must stay strictly between its neighbours' temperatures and between
/// their duties; without a neighbour the profile limits apply. Returns `None`
/// for an invalid index. `steps` must be sorted by temperature.
#[must_use]
pub fn step_bounds(steps: &[SpeedStep], index: usize, limits: ProfileLimits) -> Option<StepBounds> {
    steps.get(index)?;
    let prev = index.checked_sub(1).and_then(|i| steps.get(i));
    let next = steps.get(index + 1);

    let (temp_lo, duty_lo) = prev.map_or((limits.min_temp, limits.min_duty), |p| {
        (p.temperature + 1, p.duty)
    });
    let (temp_hi, duty_hi) = next.map_or((limits.max_temp, limits.max_duty), |n| {
        (n.temperature - 1, n.duty)
    });

    Some(StepBounds {
        temperature: temp_lo..=temp_hi,
        duty: duty_lo..=duty_hi,
    })
}

/// Whether another step may be appended after `steps`.
///
/// False once the last step sits at `max_temp` or already runs at
/// `max_duty`; always true for an empty profile.
#[must_use]
pub fn can_add_step(steps: &[SpeedStep], limits: ProfileLimits) -> bool {
    steps
        .last()
        .map_or(true, |last| last.temperature != limits.max_temp && last.duty != limits.max_duty)
}
