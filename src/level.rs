//! Level classification: daily counts into intensity levels.
//!
//! Two policies are supported. `Fixed` uses absolute thresholds and looks at
//! one count at a time. `Relative` scales each count against the largest
//! count in its scope, so the scope maximum must be known first.

use serde::{Deserialize, Serialize};

use crate::types::{ActivityCount, Level};

/// Inclusive upper bound of levels 1, 2 and 3 under the fixed policy.
/// Anything above the last bound is level 4.
pub const FIXED_LEVEL_BOUNDS: [u64; 3] = [2, 5, 8];

/// How counts become levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelPolicy {
    /// `0 → 0, 1-2 → 1, 3-5 → 2, 6-8 → 3, >8 → 4`
    #[default]
    Fixed,
    /// `round(4 × count / max)`
    Relative,
}

/// Which days contribute to the maximum used by relative levels and
/// gradient colours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxScope {
    /// Each rendered month is scaled on its own.
    #[default]
    Month,
    /// Every rendered month shares the maximum over the whole data set.
    All,
}

/// Fixed-threshold level for a count.
#[must_use]
pub fn fixed_level(count: ActivityCount) -> Level {
    let count = count.get();
    if count == 0 {
        return Level::NONE;
    }
    let above = FIXED_LEVEL_BOUNDS.iter().filter(|&&bound| count > bound).count();
    // above is at most 3, so the level is 1..=4
    Level::saturating(u8::try_from(above + 1).unwrap_or(u8::MAX))
}

/// Max-normalised level for a count.
///
/// Zero when either the count or the maximum is zero. Counts above `max`
/// are treated as the maximum.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn relative_level(count: ActivityCount, max: ActivityCount) -> Level {
    if count.is_zero() || max.is_zero() {
        return Level::NONE;
    }
    let ratio = (count.as_f64() / max.as_f64()).min(1.0);
    let scaled = (f64::from(Level::MAX.get()) * ratio).round();
    Level::saturating(scaled as u8)
}

/// Level for a count under `policy`. `max` is ignored by the fixed policy.
#[must_use]
pub fn classify(count: ActivityCount, policy: LevelPolicy, max: ActivityCount) -> Level {
    match policy {
        LevelPolicy::Fixed => fixed_level(count),
        LevelPolicy::Relative => relative_level(count, max),
    }
}

/// Continuous intensity `count / max(1, max)` clamped to `[0, 1]`.
#[must_use]
pub fn intensity(count: ActivityCount, max: ActivityCount) -> f64 {
    if count.is_zero() {
        return 0.0;
    }
    let denominator = max.get().max(1);
    (count.as_f64() / ActivityCount::new(denominator).as_f64()).clamp(0.0, 1.0)
}

/// A level policy bound to the maximum of one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    policy: LevelPolicy,
    max: ActivityCount,
}

impl Classifier {
    /// Fixed-threshold classifier. Needs no scope maximum.
    #[must_use]
    pub const fn fixed() -> Self {
        Self {
            policy: LevelPolicy::Fixed,
            max: ActivityCount::ZERO,
        }
    }

    /// Relative classifier with a known maximum.
    #[must_use]
    pub const fn relative(max: ActivityCount) -> Self {
        Self {
            policy: LevelPolicy::Relative,
            max,
        }
    }

    /// Classifier for `policy` with a scope maximum computed elsewhere.
    #[must_use]
    pub const fn new(policy: LevelPolicy, max: ActivityCount) -> Self {
        Self { policy, max }
    }

    /// First pass: take the maximum of `counts` for later classification.
    pub fn for_counts<I>(policy: LevelPolicy, counts: I) -> Self
    where
        I: IntoIterator<Item = ActivityCount>,
    {
        let max = counts.into_iter().max().unwrap_or_default();
        Self { policy, max }
    }

    /// Second pass: level of one count.
    #[must_use]
    pub fn classify(&self, count: ActivityCount) -> Level {
        classify(count, self.policy, self.max)
    }

    /// Continuous intensity of one count against this scope.
    #[must_use]
    pub fn intensity(&self, count: ActivityCount) -> f64 {
        intensity(count, self.max)
    }

    #[must_use]
    pub const fn policy(&self) -> LevelPolicy {
        self.policy
    }

    #[must_use]
    pub const fn max(&self) -> ActivityCount {
        self.max
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::fixed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(n: u64) -> ActivityCount {
        ActivityCount::new(n)
    }

    #[test]
    fn fixed_thresholds() {
        let expected = [
            (0, 0),
            (1, 1),
            (2, 1),
            (3, 2),
            (5, 2),
            (6, 3),
            (8, 3),
            (9, 4),
            (1000, 4),
        ];
        for (count, level) in expected {
            assert_eq!(fixed_level(c(count)).get(), level, "count {count}");
        }
    }

    #[test]
    fn fixed_is_monotonic() {
        let levels: Vec<Level> = (0..200).map(|n| fixed_level(c(n))).collect();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn relative_scales_against_max() {
        assert_eq!(relative_level(c(10), c(10)), Level::MAX);
        assert_eq!(relative_level(c(5), c(10)).get(), 2);
        assert_eq!(relative_level(c(1), c(10)).get(), 0);
        assert_eq!(relative_level(c(2), c(10)).get(), 1);
        assert_eq!(relative_level(c(30), c(10)), Level::MAX);
    }

    #[test]
    fn zero_max_means_level_zero() {
        assert_eq!(relative_level(c(3), c(0)), Level::NONE);
        assert_eq!(classify(c(0), LevelPolicy::Relative, c(0)), Level::NONE);
    }

    #[test]
    fn zero_count_is_always_level_zero() {
        for policy in [LevelPolicy::Fixed, LevelPolicy::Relative] {
            for max in [0, 1, 50] {
                assert_eq!(classify(c(0), policy, c(max)), Level::NONE);
            }
        }
    }

    #[test]
    fn relative_is_monotonic_within_scope() {
        let max = c(37);
        let levels: Vec<Level> = (0..=37).map(|n| relative_level(c(n), max)).collect();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn intensity_bounds() {
        assert!(intensity(c(0), c(10)).abs() < f64::EPSILON);
        assert!((intensity(c(10), c(10)) - 1.0).abs() < f64::EPSILON);
        assert!((intensity(c(5), c(10)) - 0.5).abs() < f64::EPSILON);
        assert!((intensity(c(20), c(10)) - 1.0).abs() < f64::EPSILON);
        // max of zero is treated as one
        assert!((intensity(c(1), c(0)) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn two_pass_classifier() {
        let counts = [c(0), c(4), c(8), c(2)];
        let classifier = Classifier::for_counts(LevelPolicy::Relative, counts);
        assert_eq!(classifier.max(), c(8));
        let levels: Vec<u8> = counts.iter().map(|&n| classifier.classify(n).get()).collect();
        assert_eq!(levels, vec![0, 2, 4, 1]);

        let empty = Classifier::for_counts(LevelPolicy::Relative, std::iter::empty());
        assert_eq!(empty.classify(c(5)), Level::NONE);
    }

    #[test]
    fn policy_names() {
        let policy: LevelPolicy = serde_json::from_str("\"relative\"").unwrap();
        assert_eq!(policy, LevelPolicy::Relative);
        let scope: MaxScope = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(scope, MaxScope::All);
    }
}
