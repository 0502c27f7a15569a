//! Domain-specific newtypes for type safety.
//!
//! Counts and intensity levels are both small integers, so they get their
//! own wrappers to keep them from being mixed up. Uses `derive_more` for the
//! arithmetic boilerplate.

use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;

use derive_more::{Add as DeriveAdd, From, Into};
use serde::{Deserialize, Serialize};

// ============================================================================
// Macros for reducing boilerplate
// ============================================================================

/// Generates common accessors for integer newtypes.
macro_rules! impl_newtype_common {
    ($type:ty, $inner:ty) => {
        impl $type {
            /// Get the inner value.
            #[must_use]
            pub const fn get(self) -> $inner {
                self.0
            }

            /// Check if the value is zero.
            #[must_use]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

// ============================================================================
// ActivityCount
// ============================================================================

/// Number of events recorded on one calendar day.
///
/// Never negative; a day with no events has a count of zero.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    DeriveAdd,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ActivityCount(pub u64);

impl_newtype_common!(ActivityCount, u64);

impl ActivityCount {
    /// A count of zero.
    pub const ZERO: Self = Self(0);

    /// Create a new count.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Lossy conversion for ratio math.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl AddAssign for ActivityCount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for ActivityCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |mut acc, c| {
            acc += c;
            acc
        })
    }
}

impl From<u32> for ActivityCount {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

// ============================================================================
// Level
// ============================================================================

/// Discrete intensity bucket, `0` (no activity) to `4` (highest).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl_newtype_common!(Level, u8);

impl Level {
    /// No activity.
    pub const NONE: Self = Self(0);

    /// Highest intensity.
    pub const MAX: Self = Self(4);

    /// Number of distinct levels.
    pub const COUNT: usize = 5;

    /// Create a level, rejecting values above [`Level::MAX`].
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a level, clamping to [`Level::MAX`].
    #[must_use]
    pub const fn saturating(value: u8) -> Self {
        if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// All levels in ascending order.
    #[must_use]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self(0), Self(1), Self(2), Self(3), Self(4)]
    }

    /// Index into a five-entry palette.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("level must be 0-4, got {value}"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

// ============================================================================
// Tests
// ============================================================================
