//! Cumulative reward series, one per strategy, with an append-only contract.

use std::collections::BTreeMap;

use arena_core::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardHistory {
    series: BTreeMap<String, Vec<f64>>,
}

impl RewardHistory {
    /// History managing exactly the series in `names`.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            series: names.into_iter().map(|n| (n.into(), Vec::new())).collect(),
        }
    }

    /// Fold the newly exposed suffix of `observed_so_far` into the cumulative
    /// series for `name`. Equal length is a no-op; shorter input is rejected.
    pub fn append(&mut self, name: &str, observed_so_far: &[f64]) -> ArenaResult<()> {
        let series = self
            .series
            .get_mut(name)
            .ok_or_else(|| ArenaError::UnknownSeries(name.to_string()))?;

        if let Some(bad) = observed_so_far.iter().find(|r| !r.is_finite()) {
            return Err(ArenaError::InvalidInput(format!(
                "observed rewards for `{name}` contain a non-finite value {bad}"
            )));
        }
        if observed_so_far.len() < series.len() {
            return Err(ArenaError::InvalidInput(format!(
                "observed rewards for `{name}` shrank from {} to {}",
                series.len(),
                observed_so_far.len()
            )));
        }

        let mut running = series.last().copied().unwrap_or(0.0);
        for &reward in &observed_so_far[series.len()..] {
            running += reward;
            series.push(running);
        }
        Ok(())
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Last cumulative value, 0 for an empty series.
    pub fn final_value(&self, name: &str) -> Option<f64> {
        self.series
            .get(name)
            .map(|s| s.last().copied().unwrap_or(0.0))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Empty every series in place, keeping the managed names.
    pub fn reset(&mut self) {
        self.series.values_mut().for_each(Vec::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_accumulates_suffix() {
        let mut history = RewardHistory::new(["greedy", "manual"]);
        history.append("greedy", &[1.0, 0.0, 2.0]).unwrap();
        assert_eq!(history.series("greedy").unwrap(), &[1.0, 1.0, 3.0]);

        history.append("greedy", &[1.0, 0.0, 2.0, 4.0, 0.5]).unwrap();
        assert_eq!(history.series("greedy").unwrap(), &[1.0, 1.0, 3.0, 7.0, 7.5]);
        assert_eq!(history.final_value("greedy"), Some(7.5));
        assert_eq!(history.final_value("manual"), Some(0.0));
    }

    #[test]
    fn test_append_unchanged_is_idempotent() {
        let mut history = RewardHistory::new(["manual"]);
        let observed = [1.0, 1.0];
        history.append("manual", &observed).unwrap();
        history.append("manual", &observed).unwrap();
        history.append("manual", &observed).unwrap();
        assert_eq!(history.series("manual").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_append_rejects_shrinking_input() {
        let mut history = RewardHistory::new(["ucb"]);
        history.append("ucb", &[1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            history.append("ucb", &[1.0, 2.0]),
            Err(ArenaError::InvalidInput(_))
        ));
        assert_eq!(history.series("ucb").unwrap(), &[1.0, 3.0, 6.0]);
    }

    #[test]
    fn test_append_rejects_non_numbers_and_unknown_series() {
        let mut history = RewardHistory::new(["ucb"]);
        assert!(matches!(
            history.append("ucb", &[1.0, f64::NAN]),
            Err(ArenaError::InvalidInput(_))
        ));
        assert!(history.series("ucb").unwrap().is_empty());
        assert!(matches!(
            history.append("thompson", &[1.0]),
            Err(ArenaError::UnknownSeries(_))
        ));
        assert!(history.series("thompson").is_none());
        assert!(history.final_value("thompson").is_none());
    }

    #[test]
    fn test_reset_keeps_series_names() {
        let mut history = RewardHistory::new(["a", "b"]);
        history.append("a", &[2.0]).unwrap();
        history.reset();
        assert_eq!(history.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(history.series("a").unwrap().is_empty());
        history.append("a", &[3.0]).unwrap();
        assert_eq!(history.series("a").unwrap(), &[3.0]);
    }
}
