use crate::models::Track;

/// Band outside the acceptable window that still counts as "almost there"
pub const GRACE_MS: u64 = 30_000;

/// Target duration with its acceptable bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationWindow {
    pub target_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
}

/// How a duration sum relates to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DurationVerdict {
    TooShort,
    WithinGraceShort,
    Acceptable,
    WithinGraceLong,
    TooLong,
}

impl DurationVerdict {
    /// Below the window, grace band included
    pub fn is_short(self) -> bool {
        matches!(self, DurationVerdict::TooShort | DurationVerdict::WithinGraceShort)
    }

    /// Above the window, grace band included
    pub fn is_long(self) -> bool {
        matches!(self, DurationVerdict::TooLong | DurationVerdict::WithinGraceLong)
    }
}

impl DurationWindow {
    /// Window of `target ± target * moe`. Negative tolerances are treated as zero.
    pub fn new(target_ms: u64, moe: f64) -> Self {
        let slack = (target_ms as f64 * moe.max(0.0)).round() as u64;
        Self {
            target_ms,
            min_ms: target_ms.saturating_sub(slack),
            max_ms: target_ms.saturating_add(slack),
        }
    }

    /// Same target with a different tolerance
    pub fn widened(&self, moe: f64) -> Self {
        Self::new(self.target_ms, moe)
    }

    pub fn classify(&self, sum_ms: u64) -> DurationVerdict {
        if sum_ms < self.min_ms {
            if self.min_ms - sum_ms <= GRACE_MS {
                DurationVerdict::WithinGraceShort
            } else {
                DurationVerdict::TooShort
            }
        } else if sum_ms > self.max_ms {
            if sum_ms - self.max_ms <= GRACE_MS {
                DurationVerdict::WithinGraceLong
            } else {
                DurationVerdict::TooLong
            }
        } else {
            DurationVerdict::Acceptable
        }
    }
}

/// Sum of track durations in milliseconds
pub fn total_duration<'a, I>(tracks: I) -> u64
where
    I: IntoIterator<Item = &'a Track>,
{
    tracks.into_iter().map(|t| t.duration_ms).sum()
}

/// Finite sequence of tolerances a retry loop walks through
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceSchedule {
    pub base: f64,
    pub step: f64,
    pub ceiling: f64,
    pub max_attempts: usize,
}

impl ToleranceSchedule {
    pub fn new(base: f64, step: f64, ceiling: f64, max_attempts: usize) -> Self {
        Self {
            base,
            step,
            ceiling: ceiling.max(base),
            max_attempts,
        }
    }

    /// Tolerance used on the given zero-based attempt
    pub fn tolerance_at(&self, attempt: usize) -> f64 {
        (self.base + self.step * attempt as f64).min(self.ceiling)
    }

    /// `(attempt, tolerance)` pairs; the tolerance stops growing at the ceiling
    pub fn attempts(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.max_attempts).map(move |attempt| (attempt, self.tolerance_at(attempt)))
    }

    /// Tolerance reached once every attempt has been used
    pub fn final_tolerance(&self) -> f64 {
        self.tolerance_at(self.max_attempts.saturating_sub(1))
    }
}
