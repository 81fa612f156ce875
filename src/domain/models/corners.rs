//! Football corners: the match corner count as a negative binomial around
//! the two teams' averages.

use serde::{Deserialize, Serialize};

use crate::domain::distributions::{LineSplit, TotalProbs, neg_bin_series};

pub const DEFAULT_HOME_CORNERS: f64 = 5.5;
pub const DEFAULT_AWAY_CORNERS: f64 = 4.5;
pub const DEFAULT_DISPERSION: f64 = 2.2;
const MIN_SUPPORT: usize = 40;
const MIN_MEAN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornersInputs {
    pub home_avg: f64,
    pub away_avg: f64,
    #[serde(default = "default_dispersion")]
    pub dispersion: f64,
}

const fn default_dispersion() -> f64 {
    DEFAULT_DISPERSION
}

impl Default for CornersInputs {
    fn default() -> Self {
        Self {
            home_avg: DEFAULT_HOME_CORNERS,
            away_avg: DEFAULT_AWAY_CORNERS,
            dispersion: DEFAULT_DISPERSION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornersModel {
    mean: f64,
    dispersion: f64,
}

impl CornersModel {
    /// Non-finite averages fall back to the defaults.
    pub fn fit(inputs: &CornersInputs) -> Self {
        let or = |v: f64, d: f64| if v.is_finite() { v } else { d };
        let home = or(inputs.home_avg, DEFAULT_HOME_CORNERS);
        let away = or(inputs.away_avg, DEFAULT_AWAY_CORNERS);
        Self {
            mean: (home + away).max(MIN_MEAN),
            dispersion: or(inputs.dispersion, DEFAULT_DISPERSION),
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Push-aware over/under on the match corner count.
    pub fn total_probs(&self, line: f64) -> TotalProbs {
        if !line.is_finite() || line < 0.0 {
            return LineSplit::NAN.into();
        }
        let support = MIN_SUPPORT.max(line.floor() as usize + 15);
        let pmf = neg_bin_series(self.mean, self.dispersion, support);
        LineSplit::discrete(&pmf, line).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mean_and_split() {
        let m = CornersModel::fit(&CornersInputs::default());
        assert_eq!(m.mean(), 10.0);

        let half = m.total_probs(9.5);
        assert_eq!(half.push, 0.0);
        assert!((half.over + half.under - 1.0).abs() < 1e-12);
        // right-skewed: the median sits under the mean
        assert!(half.over > 0.4 && half.over < 0.5, "over {}", half.over);

        let whole = m.total_probs(10.0);
        assert!(whole.push > 0.0);
        assert!((whole.over + whole.push + whole.under - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_more_corners_more_overs() {
        let quiet = CornersModel::fit(&CornersInputs {
            home_avg: 4.0,
            away_avg: 3.5,
            ..CornersInputs::default()
        });
        let busy = CornersModel::fit(&CornersInputs {
            home_avg: 7.0,
            away_avg: 6.0,
            ..CornersInputs::default()
        });
        assert!(busy.total_probs(9.5).over > quiet.total_probs(9.5).over);
    }

    #[test]
    fn test_invalid_inputs() {
        let m = CornersModel::fit(&CornersInputs {
            home_avg: f64::NAN,
            away_avg: 4.5,
            dispersion: f64::INFINITY,
        });
        assert_eq!(m.mean(), 10.0);
        assert!(m.total_probs(f64::NAN).over.is_nan());
        assert!(m.total_probs(-1.0).over.is_nan());
    }
}
