use super::window::{DurationVerdict, DurationWindow, total_duration};
use crate::models::Track;
use std::collections::HashSet;

/// Segment count above which the 2^n combination search refuses to run
pub const MAX_COMBINATION_SEGMENTS: usize = 16;

/// Halving stops once a jump moves fewer columns than this
const MIN_HALVING_STEP: usize = 4;
/// Halving stops once the column is this close to the last one
const MIN_BOUNDARY_DISTANCE: usize = 3;

/// Result of a bounded duration search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T> {
    Found(T),
    /// Every candidate arrangement was tried without a fit
    Exhausted,
    /// The pool cannot contain a fit at all, so only a different fetch can help
    Infeasible(Infeasibility),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    ShortestTooLong,
    LongestTooShort,
    PoolTooSmall,
}

impl<T> SearchOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            SearchOutcome::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Picks one track per segment by rank across equally sized sorted pools.
///
/// Column `c` is the `c`-th shortest track of every pool. Because every pool is
/// sorted by duration, column sums grow with `c`, which is what makes the
/// halving search valid.
pub struct ColumnSearch;

impl ColumnSearch {
    /// Number of columns shared by every pool
    pub fn column_count(pools: &[Vec<Track>]) -> usize {
        pools.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn column(pools: &[Vec<Track>], column: usize) -> Vec<Track> {
        pools.iter().map(|pool| pool[column].clone()).collect()
    }

    pub fn column_duration(pools: &[Vec<Track>], column: usize) -> u64 {
        pools.iter().map(|pool| pool[column].duration_ms).sum()
    }

    fn classify(pools: &[Vec<Track>], column: usize, window: &DurationWindow) -> DurationVerdict {
        window.classify(Self::column_duration(pools, column))
    }

    /// Index of the column whose total duration is closest to the window
    pub fn find_closest_column(
        pools: &[Vec<Track>],
        window: &DurationWindow,
    ) -> SearchOutcome<usize> {
        let limit = Self::column_count(pools);
        if pools.is_empty() || limit == 0 {
            return SearchOutcome::Infeasible(Infeasibility::PoolTooSmall);
        }
        let last = limit - 1;

        if Self::classify(pools, 0, window) == DurationVerdict::TooLong {
            return SearchOutcome::Infeasible(Infeasibility::ShortestTooLong);
        }
        if Self::classify(pools, last, window) == DurationVerdict::TooShort {
            return SearchOutcome::Infeasible(Infeasibility::LongestTooShort);
        }

        let mut current = limit / 2;
        let mut scope = current;
        loop {
            let next = match Self::classify(pools, current, window) {
                DurationVerdict::TooShort => (current + 1 + scope / 2).min(last),
                DurationVerdict::TooLong => current.saturating_sub(1 + scope / 2),
                _ => break,
            };
            let moved = next.abs_diff(current);
            current = next;
            scope /= 2;
            if moved < MIN_HALVING_STEP || last - current < MIN_BOUNDARY_DISTANCE {
                break;
            }
        }

        let column = match Self::classify(pools, current, window) {
            DurationVerdict::Acceptable => current,
            verdict if verdict.is_short() => Self::walk_longer(pools, current, window),
            _ => Self::walk_shorter(pools, current, window),
        };
        log::debug!(
            "Closest column {} of {} sums to {}ms for window {}..{}ms",
            column,
            limit,
            Self::column_duration(pools, column),
            window.min_ms,
            window.max_ms
        );
        SearchOutcome::Found(column)
    }

    /// Step toward longer columns while short; stop at a fit, an overshoot, or the end
    fn walk_longer(pools: &[Vec<Track>], mut column: usize, window: &DurationWindow) -> usize {
        let limit = Self::column_count(pools);
        while column + 1 < limit {
            let verdict = Self::classify(pools, column + 1, window);
            if verdict == DurationVerdict::Acceptable {
                return column + 1;
            }
            if verdict.is_long() {
                return column;
            }
            column += 1;
        }
        column
    }

    fn walk_shorter(pools: &[Vec<Track>], mut column: usize, window: &DurationWindow) -> usize {
        while column > 0 {
            let verdict = Self::classify(pools, column - 1, window);
            if verdict == DurationVerdict::Acceptable {
                return column - 1;
            }
            if verdict.is_short() {
                return column;
            }
            column -= 1;
        }
        column
    }

    /// The chosen column if it fits, else the best mix of it and its neighbor
    pub fn best_fit(
        pools: &[Vec<Track>],
        column: usize,
        window: &DurationWindow,
    ) -> SearchOutcome<Vec<Track>> {
        let limit = Self::column_count(pools);
        if column >= limit {
            return SearchOutcome::Infeasible(Infeasibility::PoolTooSmall);
        }

        let verdict = Self::classify(pools, column, window);
        if verdict == DurationVerdict::Acceptable {
            return SearchOutcome::Found(Self::column(pools, column));
        }

        let neighbor = if verdict.is_short() {
            (column + 1 < limit).then_some(column + 1)
        } else {
            column.checked_sub(1)
        };
        let Some(neighbor) = neighbor else {
            return SearchOutcome::Exhausted;
        };

        let pairs: Vec<[Track; 2]> = pools
            .iter()
            .map(|pool| [pool[column].clone(), pool[neighbor].clone()])
            .collect();
        CombinationSearch::find(&pairs, window)
    }
}

/// Exhaustive search over one-of-two choices per segment
pub struct CombinationSearch;

impl CombinationSearch {
    /// First assignment, in segment-major order with the first choice tried
    /// before the second, whose total duration is acceptable
    pub fn find(pairs: &[[Track; 2]], window: &DurationWindow) -> SearchOutcome<Vec<Track>> {
        if pairs.is_empty() || pairs.len() > MAX_COMBINATION_SEGMENTS {
            return SearchOutcome::Exhausted;
        }
        match Self::extend(pairs, window, Vec::with_capacity(pairs.len()), 0) {
            Some(choices) => SearchOutcome::Found(
                choices
                    .iter()
                    .zip(pairs)
                    .map(|(&choice, pair)| pair[choice].clone())
                    .collect(),
            ),
            None => SearchOutcome::Exhausted,
        }
    }

    fn extend(
        pairs: &[[Track; 2]],
        window: &DurationWindow,
        choices: Vec<usize>,
        partial_ms: u64,
    ) -> Option<Vec<usize>> {
        let row = choices.len();
        if row == pairs.len() {
            return (window.classify(partial_ms) == DurationVerdict::Acceptable).then_some(choices);
        }
        (0..2).find_map(|choice| {
            let mut next = choices.clone();
            next.push(choice);
            Self::extend(pairs, window, next, partial_ms + pairs[row][choice].duration_ms)
        })
    }
}

/// Contiguous runs over a single duration-sorted pool
pub struct WindowSearch;

impl WindowSearch {
    /// First run of `run_len` consecutive tracks whose total is acceptable.
    /// Stops at the first run that overshoots the window.
    pub fn find_run(
        pool: &[Track],
        run_len: usize,
        window: &DurationWindow,
    ) -> SearchOutcome<Vec<Track>> {
        if run_len == 0 || pool.len() < run_len {
            return SearchOutcome::Infeasible(Infeasibility::PoolTooSmall);
        }

        let mut sum = total_duration(&pool[..run_len]);
        let verdict = window.classify(sum);
        if verdict == DurationVerdict::Acceptable {
            return SearchOutcome::Found(pool[..run_len].to_vec());
        }
        if verdict.is_long() {
            return SearchOutcome::Infeasible(Infeasibility::ShortestTooLong);
        }

        for start in 1..=pool.len() - run_len {
            sum = sum - pool[start - 1].duration_ms + pool[start + run_len - 1].duration_ms;
            let verdict = window.classify(sum);
            if verdict == DurationVerdict::Acceptable {
                return SearchOutcome::Found(pool[start..start + run_len].to_vec());
            }
            if verdict.is_long() {
                return SearchOutcome::Exhausted;
            }
        }

        // Every run was short, including the longest one
        SearchOutcome::Infeasible(Infeasibility::LongestTooShort)
    }

    /// Carve up to `segments` acceptable runs out of one pool.
    ///
    /// After each run is found its tracks leave the pool and the search restarts
    /// from the shortest remaining track. Returns the runs found, possibly fewer
    /// than requested.
    pub fn fill_segments(
        pool: &[Track],
        segments: usize,
        run_len: usize,
        window: &DurationWindow,
    ) -> Vec<Vec<Track>> {
        let mut remaining = pool.to_vec();
        let mut filled = Vec::with_capacity(segments);

        while filled.len() < segments {
            let SearchOutcome::Found(run) = Self::find_run(&remaining, run_len, window) else {
                break;
            };
            let used: HashSet<&str> = run.iter().map(|t| t.id.as_str()).collect();
            remaining.retain(|t| !used.contains(t.id.as_str()));
            filled.push(run);
        }

        log::debug!(
            "Filled {}/{} segments of {} tracks from a pool of {}",
            filled.len(),
            segments,
            run_len,
            pool.len()
        );
        filled
    }
}
