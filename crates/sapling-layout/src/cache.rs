//! Per-node measurement memoization.

use sapling_core::{floats_equal, round_value_to_pixel_grid, MeasureMode};

/// Size of the measurement ring.
pub const MAX_CACHED_MEASUREMENTS: usize = 16;

/// One memoized call of the layout routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CachedMeasurement {
    pub available_width: f32,
    pub available_height: f32,
    /// `None` marks an entry that was never written.
    pub width_mode: Option<MeasureMode>,
    pub height_mode: Option<MeasureMode>,
    pub computed_width: f32,
    pub computed_height: f32,
}

impl CachedMeasurement {
    /// Entry that can never match.
    pub(crate) const EMPTY: Self = Self {
        available_width: 0.0,
        available_height: 0.0,
        width_mode: None,
        height_mode: None,
        computed_width: -1.0,
        computed_height: -1.0,
    };

    /// Entry left behind by zeroing a layout.
    pub(crate) const ZEROED: Self = Self {
        available_width: 0.0,
        available_height: 0.0,
        width_mode: Some(MeasureMode::Undefined),
        height_mode: Some(MeasureMode::Undefined),
        computed_width: 0.0,
        computed_height: 0.0,
    };

    pub(crate) fn new(
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        computed_width: f32,
        computed_height: f32,
    ) -> Self {
        Self {
            available_width,
            available_height,
            width_mode: Some(width_mode),
            height_mode: Some(height_mode),
            computed_width,
            computed_height,
        }
    }

    /// Same inputs, compared exactly.
    pub(crate) fn matches_exactly(
        &self,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
    ) -> bool {
        floats_equal(self.available_width, available_width)
            && floats_equal(self.available_height, available_height)
            && self.width_mode == Some(width_mode)
            && self.height_mode == Some(height_mode)
    }
}

impl Default for CachedMeasurement {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Slot a lookup hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheSlot {
    /// The full-layout entry.
    Layout,
    /// An entry of the measurement ring.
    Measurement(usize),
}

/// Measurement ring plus the entry of the last full layout.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MeasureCache {
    entries: [CachedMeasurement; MAX_CACHED_MEASUREMENTS],
    next_index: usize,
    layout: CachedMeasurement,
}

impl MeasureCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: [CachedMeasurement::EMPTY; MAX_CACHED_MEASUREMENTS],
            next_index: 0,
            layout: CachedMeasurement::EMPTY,
        }
    }

    pub(crate) fn zeroed() -> Self {
        Self {
            entries: [CachedMeasurement::ZEROED; MAX_CACHED_MEASUREMENTS],
            next_index: 0,
            layout: CachedMeasurement::ZEROED,
        }
    }

    /// Forget the ring and the layout entry.
    pub(crate) fn invalidate(&mut self) {
        self.next_index = 0;
        self.layout = CachedMeasurement::EMPTY;
    }

    pub(crate) fn layout(&self) -> &CachedMeasurement {
        &self.layout
    }

    /// Live ring entries, oldest slot first.
    pub(crate) fn measurements(&self) -> &[CachedMeasurement] {
        &self.entries[..self.next_index]
    }

    pub(crate) fn get(&self, slot: CacheSlot) -> &CachedMeasurement {
        match slot {
            CacheSlot::Layout => &self.layout,
            CacheSlot::Measurement(index) => &self.entries[index],
        }
    }

    /// Number of live ring entries.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.next_index
    }

    /// Store a result. Returns `true` when the ring wrapped.
    pub(crate) fn record(&mut self, perform_layout: bool, entry: CachedMeasurement) -> bool {
        let wrapped = self.next_index == MAX_CACHED_MEASUREMENTS;
        if wrapped {
            self.next_index = 0;
        }
        if perform_layout {
            self.layout = entry;
        } else {
            self.entries[self.next_index] = entry;
            self.next_index += 1;
        }
        wrapped
    }
}

impl Default for MeasureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs of a layout request, used to decide whether a memoized
/// measurement still answers it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MeasureRequest {
    /// Available width.
    pub width: f32,
    /// Width mode.
    pub width_mode: MeasureMode,
    /// Available height.
    pub height: f32,
    /// Height mode.
    pub height_mode: MeasureMode,
    /// Horizontal margin of the node.
    pub margin_row: f32,
    /// Vertical margin of the node.
    pub margin_column: f32,
}

fn size_is_exact_and_matches_old_measured_size(
    mode: MeasureMode,
    size: f32,
    last_computed: f32,
) -> bool {
    mode == MeasureMode::Exactly && floats_equal(size, last_computed)
}

fn old_size_is_unspecified_and_still_fits(
    mode: MeasureMode,
    size: f32,
    last_mode: Option<MeasureMode>,
    last_computed: f32,
) -> bool {
    mode == MeasureMode::AtMost
        && last_mode == Some(MeasureMode::Undefined)
        && (size >= last_computed || floats_equal(size, last_computed))
}

fn new_size_is_stricter_and_still_valid(
    mode: MeasureMode,
    size: f32,
    last_mode: Option<MeasureMode>,
    last_size: f32,
    last_computed: f32,
) -> bool {
    last_mode == Some(MeasureMode::AtMost)
        && mode == MeasureMode::AtMost
        && last_size > size
        && (last_computed <= size || floats_equal(size, last_computed))
}

fn axis_is_compatible(
    mode: MeasureMode,
    size: f32,
    effective_size: f32,
    margin: f32,
    last_mode: Option<MeasureMode>,
    last_size: f32,
    effective_last_size: f32,
    last_computed: f32,
) -> bool {
    let same_spec = last_mode == Some(mode) && floats_equal(effective_last_size, effective_size);
    same_spec
        || size_is_exact_and_matches_old_measured_size(mode, size - margin, last_computed)
        || old_size_is_unspecified_and_still_fits(mode, size - margin, last_mode, last_computed)
        || new_size_is_stricter_and_still_valid(
            mode,
            size - margin,
            last_mode,
            last_size,
            last_computed,
        )
}

/// Whether `cached` can answer `request` for a node with a measure function.
///
/// A non-zero `point_scale_factor` compares the available sizes after
/// snapping them to the pixel grid.
pub(crate) fn can_use_cached_measurement(
    request: &MeasureRequest,
    cached: &CachedMeasurement,
    point_scale_factor: f32,
) -> bool {
    if cached.computed_height < 0.0 || cached.computed_width < 0.0 {
        return false;
    }

    let snap = |value: f32| {
        if point_scale_factor == 0.0 {
            value
        } else {
            round_value_to_pixel_grid(value, point_scale_factor, false, false)
        }
    };

    let width_ok = axis_is_compatible(
        request.width_mode,
        request.width,
        snap(request.width),
        request.margin_row,
        cached.width_mode,
        cached.available_width,
        snap(cached.available_width),
        cached.computed_width,
    );
    let height_ok = axis_is_compatible(
        request.height_mode,
        request.height,
        snap(request.height),
        request.margin_column,
        cached.height_mode,
        cached.available_height,
        snap(cached.available_height),
        cached.computed_height,
    );
    width_ok && height_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(width: f32, width_mode: MeasureMode, height: f32, height_mode: MeasureMode) -> MeasureRequest {
        MeasureRequest {
            width,
            width_mode,
            height,
            height_mode,
            margin_row: 0.0,
            margin_column: 0.0,
        }
    }

    #[test]
    fn test_cache_empty_entry_never_matches() {
        let req = request(10.0, MeasureMode::Exactly, 10.0, MeasureMode::Exactly);
        assert!(!can_use_cached_measurement(&req, &CachedMeasurement::EMPTY, 1.0));
    }

    #[test]
    fn test_cache_same_spec_hits() {
        let cached = CachedMeasurement::new(
            100.0,
            50.0,
            MeasureMode::AtMost,
            MeasureMode::Undefined,
            80.0,
            20.0,
        );
        let req = request(100.0, MeasureMode::AtMost, 50.0, MeasureMode::Undefined);
        assert!(can_use_cached_measurement(&req, &cached, 1.0));
    }

    #[test]
    fn test_cache_exact_matches_old_result() {
        let cached = CachedMeasurement::new(
            f32::NAN,
            f32::NAN,
            MeasureMode::Undefined,
            MeasureMode::Undefined,
            80.0,
            20.0,
        );
        let req = request(80.0, MeasureMode::Exactly, 20.0, MeasureMode::Exactly);
        assert!(can_use_cached_measurement(&req, &cached, 1.0));
    }

    #[test]
    fn test_cache_unspecified_still_fits() {
        let cached = CachedMeasurement::new(
            f32::NAN,
            f32::NAN,
            MeasureMode::Undefined,
            MeasureMode::Undefined,
            80.0,
            20.0,
        );
        let fits = request(120.0, MeasureMode::AtMost, 30.0, MeasureMode::AtMost);
        assert!(can_use_cached_measurement(&fits, &cached, 1.0));
        let too_small = request(60.0, MeasureMode::AtMost, 30.0, MeasureMode::AtMost);
        assert!(!can_use_cached_measurement(&too_small, &cached, 1.0));
    }

    #[test]
    fn test_cache_stricter_at_most() {
        let cached = CachedMeasurement::new(
            200.0,
            100.0,
            MeasureMode::AtMost,
            MeasureMode::AtMost,
            80.0,
            20.0,
        );
        let stricter = request(90.0, MeasureMode::AtMost, 50.0, MeasureMode::AtMost);
        assert!(can_use_cached_measurement(&stricter, &cached, 1.0));
        let too_strict = request(70.0, MeasureMode::AtMost, 50.0, MeasureMode::AtMost);
        assert!(!can_use_cached_measurement(&too_strict, &cached, 1.0));
    }

    #[test]
    fn test_cache_margin_subtracted() {
        let cached = CachedMeasurement::new(
            f32::NAN,
            f32::NAN,
            MeasureMode::Undefined,
            MeasureMode::Undefined,
            80.0,
            20.0,
        );
        let mut req = request(90.0, MeasureMode::Exactly, 20.0, MeasureMode::Exactly);
        req.margin_row = 10.0;
        assert!(can_use_cached_measurement(&req, &cached, 1.0));
    }

    #[test]
    fn test_cache_rounded_comparison() {
        let cached = CachedMeasurement::new(
            100.2,
            50.0,
            MeasureMode::AtMost,
            MeasureMode::Exactly,
            100.15,
            50.0,
        );
        let req = request(100.1, MeasureMode::AtMost, 50.0, MeasureMode::Exactly);
        assert!(can_use_cached_measurement(&req, &cached, 1.0));
        assert!(!can_use_cached_measurement(&req, &cached, 0.0));
    }

    #[test]
    fn test_cache_ring_wraps() {
        let mut cache = MeasureCache::new();
        let entry = CachedMeasurement::new(1.0, 1.0, MeasureMode::Exactly, MeasureMode::Exactly, 1.0, 1.0);
        for _ in 0..MAX_CACHED_MEASUREMENTS {
            assert!(!cache.record(false, entry));
        }
        assert_eq!(cache.len(), MAX_CACHED_MEASUREMENTS);
        assert!(cache.record(false, entry));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_layout_entry_separate() {
        let mut cache = MeasureCache::new();
        let entry = CachedMeasurement::new(5.0, 6.0, MeasureMode::Exactly, MeasureMode::AtMost, 5.0, 3.0);
        cache.record(true, entry);
        assert_eq!(cache.len(), 0);
        assert_eq!(*cache.layout(), entry);
        assert!(cache.layout().matches_exactly(5.0, 6.0, MeasureMode::Exactly, MeasureMode::AtMost));
        cache.invalidate();
        assert_eq!(*cache.layout(), CachedMeasurement::EMPTY);
    }
}
