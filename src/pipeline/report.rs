//! User-facing diagnostic report for one conversion run.

use crate::defaults;
use crate::pitch::PitchError;

/// Qualitative rating of a segment's mean pitch deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Excellent,
    Acceptable,
    Borderline,
    Poor,
}

/// Rate a mean deviation against the reference thresholds.
///
/// The sign of the deviation only says which direction the pitch drifted;
/// the rating goes by magnitude.
pub fn rate_deviation(mean_deviation: f32) -> Rating {
    let magnitude = mean_deviation.abs();
    if magnitude <= defaults::DEVIATION_EXCELLENT {
        Rating::Excellent
    } else if magnitude <= defaults::DEVIATION_ACCEPTABLE {
        Rating::Acceptable
    } else if magnitude <= defaults::DEVIATION_BORDERLINE {
        Rating::Borderline
    } else {
        Rating::Poor
    }
}

/// Render the aggregated per-segment diagnostics as a single text block.
///
/// Layout: an explanation of the deviation thresholds, then the ordered
/// per-segment mean deviations, then the ordered per-segment variances.
/// Both lists are positionally aligned with segment order, so entry `i`
/// maps back to the time range `i * max_segment_seconds` onwards.
pub fn render_report(diagnostics: &[PitchError]) -> String {
    let deviations: Vec<String> = diagnostics
        .iter()
        .map(|d| format!("{:.3}", d.mean_deviation))
        .collect();
    let variances: Vec<String> = diagnostics
        .iter()
        .map(|d| format!("{:.3}", d.variance))
        .collect();

    format!(
        "Per-segment deviation guide: ~{} is excellent, ~{} is acceptable, \
         {}-{} is borderline.\n\
         If the deviation is larger, adjust the transposition; if it stays \
         large after several adjustments, the song is outside the target \
         voice's range.\n\
         Semitone deviation: [{}]\n\
         Semitone variance: [{}]",
        defaults::DEVIATION_EXCELLENT,
        defaults::DEVIATION_ACCEPTABLE,
        0.8,
        defaults::DEVIATION_BORDERLINE,
        deviations.join(", "),
        variances.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(mean: f32, variance: f32) -> PitchError {
        PitchError {
            mean_deviation: mean,
            variance,
            voiced_frames: 10,
        }
    }

    #[test]
    fn rating_boundaries() {
        assert_eq!(rate_deviation(0.0), Rating::Excellent);
        assert_eq!(rate_deviation(0.3), Rating::Excellent);
        assert_eq!(rate_deviation(0.45), Rating::Acceptable);
        assert_eq!(rate_deviation(0.9), Rating::Borderline);
        assert_eq!(rate_deviation(1.5), Rating::Poor);
    }

    #[test]
    fn rating_uses_magnitude() {
        assert_eq!(rate_deviation(-0.2), Rating::Excellent);
        assert_eq!(rate_deviation(-2.0), Rating::Poor);
    }

    #[test]
    fn report_lists_values_in_segment_order() {
        let report = render_report(&[diag(0.1, 0.01), diag(-0.52, 0.2), diag(0.9, 0.33)]);

        assert!(report.contains("Semitone deviation: [0.100, -0.520, 0.900]"));
        assert!(report.contains("Semitone variance: [0.010, 0.200, 0.330]"));
    }

    #[test]
    fn report_starts_with_the_threshold_explanation() {
        let report = render_report(&[diag(0.1, 0.0)]);
        assert!(report.starts_with("Per-segment deviation guide"));
        assert!(report.contains("0.3"));
        assert!(report.contains("0.5"));
        assert!(report.contains("0.8-1"));
    }

    #[test]
    fn empty_diagnostics_render_empty_lists() {
        let report = render_report(&[]);
        assert!(report.contains("Semitone deviation: []"));
        assert!(report.contains("Semitone variance: []"));
    }
}
