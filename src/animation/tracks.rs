use crate::animation::values::Interpolatable;
use crate::import::Key;

/// A time-ordered sequence of samples for one property of one bone.
///
/// Times are in seconds. `times` and `values` always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f64>,
    pub values: Vec<T>,
}

impl<T: Interpolatable> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track from parallel arrays. Extra entries on the longer side are dropped.
    #[must_use]
    pub fn new(mut times: Vec<f64>, mut values: Vec<T>) -> Self {
        let len = times.len().min(values.len());
        if times.len() != values.len() {
            log::warn!(
                "Keyframe track has {} times but {} values, truncating to {len}",
                times.len(),
                values.len()
            );
        }
        times.truncate(len);
        values.truncate(len);
        Self { times, values }
    }

    /// Builds a track from tick-stamped keys, scaling every time by `time_scale`.
    #[must_use]
    pub fn from_keys(keys: &[Key<T>], time_scale: f64) -> Self {
        Self {
            times: keys.iter().map(|k| k.time * time_scale).collect(),
            values: keys.iter().map(|k| k.value).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Index `i` of the interval `[times[i], times[i + 1]]` used for `time`.
    ///
    /// This is the first `i` whose successor lies strictly after `time`,
    /// clamped to the final interval. Times before the first key use interval 0.
    /// Requires at least two keys.
    #[must_use]
    pub fn interval(&self, time: f64) -> usize {
        let last_interval = self.len().saturating_sub(2);
        // partition_point gives the first key strictly after `time`
        self.times
            .partition_point(|&t| t <= time)
            .saturating_sub(1)
            .min(last_interval)
    }

    /// Samples the track. `None` only for an empty track.
    ///
    /// A single key is returned as-is. Otherwise the blend factor inside the
    /// chosen interval is clamped to `[0, 1]`, so times past the last key
    /// hold the last value.
    #[must_use]
    pub fn sample(&self, time: f64) -> Option<T> {
        match self.len() {
            0 => None,
            1 => Some(self.values[0]),
            _ => {
                let index = self.interval(time);
                let t0 = self.times[index];
                let t1 = self.times[index + 1];
                let dt = t1 - t0;

                // Coincident keys: stay on the first one
                let fac = if dt > 0.0 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };

                Some(T::interpolate_linear(
                    self.values[index],
                    self.values[index + 1],
                    fac as f32,
                ))
            }
        }
    }
}
