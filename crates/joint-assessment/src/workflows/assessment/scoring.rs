//! Composite disease-activity scoring.
//!
//! The score is the sum of the tender joint count, the swollen joint count, PGA and EGA rescaled
//! from 0–100 mm to 0–10, and CRP in mg/L as entered.

use super::domain::ClinicalInputs;

/// Rescale a 0–100 mm visual-analog value to the 0–10 range used by the score.
pub fn scale_visual_analog(millimetres: f64) -> f64 {
    millimetres / 100.0 * 10.0
}

pub fn composite_score(tender_count: usize, swollen_count: usize, inputs: &ClinicalInputs) -> f64 {
    let raw = tender_count as f64
        + swollen_count as f64
        + scale_visual_analog(inputs.pga())
        + scale_visual_analog(inputs.ega())
        + inputs.crp();
    round_to_hundredths(raw)
}

/// Half-away-from-zero rounding to two decimals.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_score_matches_documented_example() {
        let inputs = ClinicalInputs::new(50.0, 20.0, 10.0);
        assert_eq!(composite_score(2, 1, &inputs), 20.0);
    }

    #[test]
    fn zero_inputs_score_zero() {
        assert_eq!(composite_score(0, 0, &ClinicalInputs::default()), 0.0);
    }

    #[test]
    fn fractional_slider_values_round_to_two_decimals() {
        let inputs = ClinicalInputs::new(33.333, 0.0, 1.2345);
        // 3.3333 + 1.2345 = 4.5678
        assert_eq!(composite_score(0, 0, &inputs), 4.57);
    }

    #[test]
    fn maximum_inputs_stay_bounded() {
        let inputs = ClinicalInputs::new(100.0, 100.0, 300.0);
        assert_eq!(composite_score(15, 15, &inputs), 350.0);
    }
}
