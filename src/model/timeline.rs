use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Smallest width a bar is ever drawn with, so zero-length items stay visible.
pub const MIN_BAR_WIDTH: f32 = 6.0;

/// Timeline granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    #[default]
    Week,
    Month,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Day, ViewMode::Week, ViewMode::Month];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
        }
    }
}

/// How the timeline advances from one column to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStep {
    /// Fixed number of days per column.
    Days(u32),
    /// One calendar month per column, whatever its length.
    CalendarMonth,
}

/// Geometry and labelling of one timeline column for a given [`ViewMode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub mode: ViewMode,
    /// Width of one column in pixels.
    pub unit_width: f32,
    /// Nominal days per column (30 for months).
    pub unit_days: u32,
    pub step: UnitStep,
    label_format: &'static str,
    sub_label_format: &'static str,
}

impl ViewConfig {
    pub fn for_mode(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Day => Self {
                mode,
                unit_width: 50.0,
                unit_days: 1,
                step: UnitStep::Days(1),
                label_format: "%d",
                sub_label_format: "%a",
            },
            ViewMode::Week => Self {
                mode,
                unit_width: 100.0,
                unit_days: 7,
                step: UnitStep::Days(7),
                label_format: "W%V",
                sub_label_format: "%d %b",
            },
            ViewMode::Month => Self {
                mode,
                unit_width: 120.0,
                unit_days: 30,
                step: UnitStep::CalendarMonth,
                label_format: "%b",
                sub_label_format: "%Y",
            },
        }
    }

    pub fn pixels_per_day(&self) -> f32 {
        self.unit_width / self.unit_days as f32
    }

    /// Primary header label for the column starting at `date`.
    pub fn label(&self, date: NaiveDate) -> String {
        date.format(self.label_format).to_string()
    }

    /// Secondary header label for the column starting at `date`.
    pub fn sub_label(&self, date: NaiveDate) -> String {
        date.format(self.sub_label_format).to_string()
    }

    /// Pixel offset of `date` from `range_start`.
    ///
    /// Month mode counts real calendar months (with a within-month fraction)
    /// rather than dividing elapsed days by the nominal 30-day unit.
    pub fn unit_position(&self, date: NaiveDate, range_start: NaiveDate) -> f32 {
        match self.step {
            UnitStep::Days(days) => {
                let elapsed = (date - range_start).num_days() as f32;
                elapsed / days as f32 * self.unit_width
            }
            UnitStep::CalendarMonth => {
                (month_ordinal(date) - month_ordinal(range_start)) as f32 * self.unit_width
            }
        }
    }

    /// Width in pixels of a bar spanning `start..end`.
    pub fn bar_width(&self, start: NaiveDate, end: NaiveDate) -> f32 {
        let span_days = (end - start).num_days().max(0) as f32;
        (span_days / self.unit_days as f32 * self.unit_width).max(MIN_BAR_WIDTH)
    }

    /// Number of columns needed to cover `range_start..=range_end`.
    pub fn total_units(&self, range_start: NaiveDate, range_end: NaiveDate) -> u32 {
        if range_end <= range_start {
            return 1;
        }
        match self.step {
            UnitStep::Days(days) => {
                let span = (range_end - range_start).num_days() as u32;
                span.div_ceil(days).max(1)
            }
            UnitStep::CalendarMonth => {
                let months = (range_end.year() - range_start.year()) * 12
                    + range_end.month() as i32
                    - range_start.month() as i32;
                (months + 1).max(1) as u32
            }
        }
    }

    /// Start date of column `index`.
    pub fn unit_start(&self, range_start: NaiveDate, index: u32) -> NaiveDate {
        match self.step {
            UnitStep::Days(days) => range_start + Duration::days(index as i64 * days as i64),
            UnitStep::CalendarMonth => add_months(first_of_month(range_start), index as i32),
        }
    }

    /// Whole days represented by a horizontal pointer delta.
    pub fn day_delta(&self, pixel_delta: f32) -> i64 {
        (pixel_delta / self.pixels_per_day()).round() as i64
    }

    /// Total canvas width for a range.
    pub fn total_width(&self, range: &DateRange) -> f32 {
        self.total_units(range.start, range.end) as f32 * self.unit_width
    }

    /// Move `date` back to the start of the column containing it.
    fn snap_down(&self, date: NaiveDate) -> NaiveDate {
        match self.mode {
            ViewMode::Day => date,
            ViewMode::Week => date.week(Weekday::Mon).first_day(),
            ViewMode::Month => first_of_month(date),
        }
    }

    /// One column earlier/later than `date`.
    fn shift_units(&self, date: NaiveDate, units: i32) -> NaiveDate {
        match self.step {
            UnitStep::Days(days) => date + Duration::days(units as i64 * days as i64),
            UnitStep::CalendarMonth => add_months(date, units),
        }
    }
}

/// The displayed date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Derive the range covering `spans`, padded by one column on each side.
    ///
    /// Falls back to the calendar year of `today` when there is nothing dated.
    pub fn covering<I>(spans: I, config: &ViewConfig, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
    {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for (start, end) in spans {
            bounds = Some(match bounds {
                None => (start, end),
                Some((min, max)) => (min.min(start), max.max(end)),
            });
        }

        match bounds {
            Some((min, max)) => Self {
                start: config.snap_down(config.shift_units(min, -1)),
                end: config.shift_units(max, 1),
            },
            None => Self {
                start: NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                end: NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            },
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Months since year 0 with the day expressed as a fraction of its month.
fn month_ordinal(date: NaiveDate) -> f64 {
    let whole = date.year() as f64 * 12.0 + date.month0() as f64;
    whole + date.day0() as f64 / days_in_month(date) as f64
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    (add_months(first, 1) - first).num_days() as u32
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Calendar month arithmetic, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let mut day = date.day();
    loop {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            return d;
        }
        if day <= 28 {
            return date;
        }
        day -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_item_at_range_start_is_at_zero() {
        let config = ViewConfig::for_mode(ViewMode::Week);
        assert_eq!(config.unit_width, 100.0);
        assert_eq!(config.unit_days, 7);
        let start = d(2024, 3, 4);
        assert_eq!(config.unit_position(start, start), 0.0);
        assert_eq!(config.unit_position(d(2024, 3, 11), start), 100.0);
    }

    #[test]
    fn unit_position_never_decreases() {
        let start = d(2023, 12, 15);
        for mode in ViewMode::ALL {
            let config = ViewConfig::for_mode(mode);
            let mut last = f32::MIN;
            for offset in -40..400 {
                let x = config.unit_position(start + Duration::days(offset), start);
                assert!(x >= last, "{mode:?} went backwards at offset {offset}");
                last = x;
            }
        }
    }

    #[test]
    fn month_positions_follow_calendar_months() {
        let config = ViewConfig::for_mode(ViewMode::Month);
        let start = d(2024, 1, 1);
        assert_eq!(config.unit_position(d(2024, 2, 1), start), 120.0);
        assert_eq!(config.unit_position(d(2024, 3, 1), start), 240.0);
        assert_eq!(config.unit_position(d(2025, 1, 1), start), 12.0 * 120.0);
        let mid_feb = config.unit_position(d(2024, 2, 15), start);
        assert!((mid_feb - (120.0 + 14.0 / 29.0 * 120.0)).abs() < 0.01);
    }

    #[test]
    fn items_before_range_get_negative_offsets() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        assert_eq!(config.unit_position(d(2024, 1, 8), d(2024, 1, 10)), -100.0);
    }

    #[test]
    fn zero_duration_bars_are_clamped() {
        let config = ViewConfig::for_mode(ViewMode::Week);
        assert_eq!(config.bar_width(d(2024, 5, 1), d(2024, 5, 1)), MIN_BAR_WIDTH);
        assert_eq!(config.bar_width(d(2024, 5, 1), d(2024, 5, 15)), 200.0);
    }

    #[test]
    fn total_units_counts_columns() {
        let week = ViewConfig::for_mode(ViewMode::Week);
        assert_eq!(week.total_units(d(2024, 1, 1), d(2024, 1, 29)), 4);
        assert_eq!(week.total_units(d(2024, 1, 1), d(2024, 1, 30)), 5);

        let month = ViewConfig::for_mode(ViewMode::Month);
        assert_eq!(month.total_units(d(2024, 1, 1), d(2024, 3, 10)), 3);
        assert_eq!(month.unit_start(d(2024, 11, 1), 2), d(2025, 1, 1));
    }

    #[test]
    fn day_delta_rounds_to_whole_days() {
        let day = ViewConfig::for_mode(ViewMode::Day);
        assert_eq!(day.day_delta(150.0), 3);
        assert_eq!(day.day_delta(-24.0), 0);
        assert_eq!(day.day_delta(-26.0), -1);

        let week = ViewConfig::for_mode(ViewMode::Week);
        assert_eq!(week.day_delta(100.0), 7);
    }

    #[test]
    fn range_is_padded_and_snapped() {
        let week = ViewConfig::for_mode(ViewMode::Week);
        // 2024-03-13 is a Wednesday.
        let range = DateRange::covering([(d(2024, 3, 13), d(2024, 3, 20))], &week, d(2024, 1, 1));
        assert_eq!(range.start, d(2024, 3, 4));
        assert_eq!(range.end, d(2024, 3, 27));

        let month = ViewConfig::for_mode(ViewMode::Month);
        let range = DateRange::covering([(d(2024, 3, 13), d(2024, 5, 31))], &month, d(2024, 1, 1));
        assert_eq!(range.start, d(2024, 2, 1));
        assert_eq!(range.end, d(2024, 6, 30));
    }

    #[test]
    fn empty_range_falls_back_to_current_year() {
        let config = ViewConfig::for_mode(ViewMode::Day);
        let range = DateRange::covering(std::iter::empty(), &config, d(2026, 10, 19));
        assert_eq!(range, DateRange { start: d(2026, 1, 1), end: d(2026, 12, 31) });
    }

    #[test]
    fn add_months_clamps_day() {
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2024, 3, 31), -1), d(2024, 2, 29));
        assert_eq!(add_months(d(2024, 12, 5), 1), d(2025, 1, 5));
    }
}
