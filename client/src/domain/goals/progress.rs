//! Progress ratios, encouragement bands, and display formatting.
//!
//! Everything here is pure: the dashboard feeds in (actual, target) pairs
//! from [`super::Goal::facet_totals`] and renders whatever comes back.

/// Percentage of `target` reached by `current`, clamped to `[0, 100]`.
///
/// A zero (or absent, read as zero) target yields 0% regardless of the
/// current value: with no goal set there is no progress to show, and no
/// NaN or infinity ever escapes this function.
///
/// # Examples
/// ```
/// use client::domain::goals::progress_percent;
///
/// assert_eq!(progress_percent(6.0, 24.0), 25.0);
/// assert_eq!(progress_percent(30.0, 24.0), 100.0);
/// assert_eq!(progress_percent(5.0, 0.0), 0.0);
/// ```
pub fn progress_percent(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

/// Encouragement band the progress indicator sits in.
///
/// The four bands totally partition `[0, 100]`: low and mid thirds, the
/// high stretch below completion, and exact completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressBand {
    /// At most a third of the way there.
    Low,
    /// Between one and two thirds.
    Mid,
    /// Past two thirds but not done.
    High,
    /// Target reached.
    Complete,
}

impl ProgressBand {
    /// Band for a clamped progress percentage.
    pub fn for_percent(percent: f64) -> Self {
        if percent <= 33.33 {
            Self::Low
        } else if percent <= 66.66 {
            Self::Mid
        } else if percent < 100.0 {
            Self::High
        } else {
            Self::Complete
        }
    }

    /// Encouragement line rendered over the progress bar.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Low => "Keep Going!",
            Self::Mid => "Getting Closer!",
            Self::High => "Almost There!",
            Self::Complete => "Goal Achieved!",
        }
    }

    /// Indicator colour for the band.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#f87171",
            Self::Mid => "#facc15",
            Self::High | Self::Complete => "#22c55e",
        }
    }
}

/// One dashboard metric: the raw pair plus its derived presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricProgress {
    /// Actual value accumulated so far.
    pub current: f64,
    /// Target value for the year.
    pub target: f64,
    /// Clamped progress percentage.
    pub percent: f64,
    /// Encouragement band for the percentage.
    pub band: ProgressBand,
}

impl MetricProgress {
    /// Derive progress and band from an (actual, target) pair.
    pub fn new(current: f64, target: f64) -> Self {
        let percent = progress_percent(current, target);
        Self {
            current,
            target,
            percent,
            band: ProgressBand::for_percent(percent),
        }
    }
}

/// Axis marks at one and two thirds of the target, rounded to whole units.
pub fn third_marks(target: f64) -> (f64, f64) {
    ((target / 3.0).round(), (target * 2.0 / 3.0).round())
}

/// Format an amount as whole-dollar currency with thousands separators.
///
/// # Examples
/// ```
/// use client::domain::goals::format_currency;
///
/// assert_eq!(format_currency(500_000.0), "$500,000");
/// assert_eq!(format_currency(0.0), "$0");
/// ```
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let grouped = group_thousands(rounded.abs());
    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Format a sales-volume amount: millions collapse to `$X.YM`, everything
/// below renders as plain currency.
///
/// # Examples
/// ```
/// use client::domain::goals::format_volume;
///
/// assert_eq!(format_volume(1_500_000.0), "$1.5M");
/// assert_eq!(format_volume(999_999.0), "$999,999");
/// ```
pub fn format_volume(amount: f64) -> String {
    if amount >= 1_000_000.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else {
        format_currency(amount)
    }
}

fn group_thousands(magnitude: f64) -> String {
    // Display amounts fit comfortably in u64 after rounding; saturate on
    // anything absurd rather than panicking.
    let whole = if magnitude >= u64::MAX as f64 {
        u64::MAX
    } else {
        magnitude as u64
    };
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    //! Calculator and formatting coverage.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 24.0, 0.0)]
    #[case(6.0, 24.0, 25.0)]
    #[case(24.0, 24.0, 100.0)]
    #[case(30.0, 24.0, 100.0)]
    #[case(1.0, 3.0, 100.0 / 3.0)]
    fn percent_is_clamped_to_the_unit_range(
        #[case] current: f64,
        #[case] target: f64,
        #[case] expected: f64,
    ) {
        let percent = progress_percent(current, target);
        assert!((percent - expected).abs() < 1e-9, "got {percent}");
        assert!((0.0..=100.0).contains(&percent));
    }

    #[test]
    fn percent_is_complete_exactly_when_current_reaches_target() {
        for (current, target) in [(23.9, 24.0), (24.0, 24.0), (24.1, 24.0)] {
            let complete = progress_percent(current, target) >= 100.0;
            assert_eq!(complete, current >= target, "current {current}");
        }
    }

    #[rstest]
    #[case::zero_target_zero_current(0.0, 0.0)]
    #[case::zero_target_with_progress(5.0, 0.0)]
    fn zero_target_always_reads_as_no_progress(#[case] current: f64, #[case] target: f64) {
        let percent = progress_percent(current, target);
        assert_eq!(percent, 0.0);
        assert!(percent.is_finite());
    }

    #[rstest]
    #[case(0.0, ProgressBand::Low)]
    #[case(33.33, ProgressBand::Low)]
    #[case(33.34, ProgressBand::Mid)]
    #[case(66.66, ProgressBand::Mid)]
    #[case(66.67, ProgressBand::High)]
    #[case(99.99, ProgressBand::High)]
    #[case(100.0, ProgressBand::Complete)]
    fn bands_partition_the_unit_range_without_overlap(
        #[case] percent: f64,
        #[case] expected: ProgressBand,
    ) {
        assert_eq!(ProgressBand::for_percent(percent), expected);
    }

    #[test]
    fn every_percent_maps_to_exactly_one_band() {
        for tenth in 0..=1000 {
            let percent = f64::from(tenth) / 10.0;
            // for_percent is total over the range; just ensure it returns
            // and that completion is reserved for exactly 100.
            let band = ProgressBand::for_percent(percent);
            assert_eq!(band == ProgressBand::Complete, percent >= 100.0);
        }
    }

    #[rstest]
    #[case(ProgressBand::Low, "Keep Going!")]
    #[case(ProgressBand::Mid, "Getting Closer!")]
    #[case(ProgressBand::High, "Almost There!")]
    #[case(ProgressBand::Complete, "Goal Achieved!")]
    fn bands_carry_their_encouragement_lines(
        #[case] band: ProgressBand,
        #[case] expected: &str,
    ) {
        assert_eq!(band.message(), expected);
    }

    #[rstest]
    #[case(500_000.0, "$500,000")]
    #[case(999_999.0, "$999,999")]
    #[case(1_000.0, "$1,000")]
    #[case(999.0, "$999")]
    #[case(0.0, "$0")]
    fn currency_groups_thousands(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_currency(amount), expected);
    }

    #[rstest]
    #[case(1_500_000.0, "$1.5M")]
    #[case(1_000_000.0, "$1.0M")]
    #[case(12_340_000.0, "$12.3M")]
    #[case(500_000.0, "$500,000")]
    fn volume_collapses_millions(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_volume(amount), expected);
    }

    #[test]
    fn metric_progress_derives_band_from_percent() {
        let metric = MetricProgress::new(45_000.0, 180_000.0);
        assert_eq!(metric.percent, 25.0);
        assert_eq!(metric.band, ProgressBand::Low);
    }

    #[test]
    fn third_marks_round_to_whole_units() {
        assert_eq!(third_marks(24.0), (8.0, 16.0));
        assert_eq!(third_marks(100.0), (33.0, 67.0));
    }
}
