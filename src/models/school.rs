use serde::{Deserialize, Serialize};

/// A break between two periods.
///
/// Only `after_period` is semantically relevant to scheduling: it marks the
/// period after which teaching stops for a while, which forbids a double
/// lesson from starting at `after_period` (it would span the break).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSlot {
    pub after_period: u32,
    #[serde(default)]
    pub duration: u32,
}

/// One teaching day. Names are opaque identifiers; their ordering in
/// `SchoolConfig::days_of_week` is the day dimension's canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOfWeek {
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
}

/// School-wide scheduling parameters: period count, breaks, and the set of
/// teaching days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolConfig {
    pub number_of_periods: u32,
    #[serde(default)]
    pub interval_slots: Vec<IntervalSlot>,
    pub days_of_week: Vec<DayOfWeek>,
}

impl SchoolConfig {
    /// Checks the invariants from the data model: at least two periods per
    /// day, and every interval falls strictly inside the day.
    pub fn validate(&self) -> Result<(), String> {
        if self.number_of_periods < 2 {
            return Err(format!(
                "numberOfPeriods must be >= 2, got {}",
                self.number_of_periods
            ));
        }
        if self.days_of_week.is_empty() {
            return Err("daysOfWeek must not be empty".to_string());
        }
        for slot in &self.interval_slots {
            if slot.after_period < 1 || slot.after_period >= self.number_of_periods {
                return Err(format!(
                    "intervalSlot.afterPeriod must be in [1, {}], got {}",
                    self.number_of_periods - 1,
                    slot.after_period
                ));
            }
        }
        Ok(())
    }

    /// Periods at which a double lesson may legally begin: `[1, periods)`
    /// minus every period an interval immediately follows.
    pub fn valid_double_starts(&self) -> Vec<u32> {
        let blocked: std::collections::HashSet<u32> =
            self.interval_slots.iter().map(|s| s.after_period).collect();
        (1..self.number_of_periods)
            .filter(|p| !blocked.contains(p))
            .collect()
    }

    pub fn num_days(&self) -> usize {
        self.days_of_week.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(periods: u32, intervals: &[u32]) -> SchoolConfig {
        SchoolConfig {
            number_of_periods: periods,
            interval_slots: intervals
                .iter()
                .map(|&p| IntervalSlot {
                    after_period: p,
                    duration: 0,
                })
                .collect(),
            days_of_week: vec![DayOfWeek {
                name: "Mon".to_string(),
                abbreviation: "M".to_string(),
            }],
        }
    }

    #[test]
    fn rejects_too_few_periods() {
        assert!(config(1, &[]).validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_interval() {
        assert!(config(4, &[4]).validate().is_err());
        assert!(config(4, &[0]).validate().is_err());
    }

    #[test]
    fn valid_double_starts_excludes_interval_period() {
        let cfg = config(3, &[2]);
        assert_eq!(cfg.valid_double_starts(), vec![1]);
    }

    #[test]
    fn valid_double_starts_without_interval_covers_all_but_last() {
        let cfg = config(4, &[]);
        assert_eq!(cfg.valid_double_starts(), vec![1, 2, 3]);
    }
}
