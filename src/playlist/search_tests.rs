#[cfg(test)]
mod tests {
    use super::super::search::*;
    use super::super::test_support::pool_of;
    use super::super::window::*;
    use approx::assert_relative_eq;

    fn ids(tracks: &[crate::models::Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    /// Pool of 21 tracks at 100s, 110s, ..., 300s
    fn stepped_pool(prefix: &str) -> Vec<crate::models::Track> {
        let durations: Vec<u64> = (0..21).map(|i| 100_000 + i * 10_000).collect();
        pool_of(prefix, &durations)
    }

    #[test]
    fn test_window_bounds_from_tolerance() {
        let window = DurationWindow::new(600_000, 0.02);
        assert_eq!(window.min_ms, 588_000);
        assert_eq!(window.target_ms, 600_000);
        assert_eq!(window.max_ms, 612_000);

        let widened = window.widened(0.05);
        assert_eq!(widened.min_ms, 570_000);
        assert_eq!(widened.max_ms, 630_000);
    }

    #[test]
    fn test_window_always_brackets_target() {
        for target in [0, 1, 59_999, 210_000, 3_600_000] {
            for moe in [0.0, 0.005, 0.02, 0.5, 0.99, -0.1] {
                let window = DurationWindow::new(target, moe);
                assert!(window.min_ms <= window.target_ms, "{target} {moe}");
                assert!(window.target_ms <= window.max_ms, "{target} {moe}");
            }
        }
    }

    #[test]
    fn test_classify_grace_bands() {
        let window = DurationWindow::new(600_000, 0.02);

        assert_eq!(window.classify(585_000), DurationVerdict::WithinGraceShort);
        // 28s short of the 588s minimum is still inside the grace band
        assert_eq!(window.classify(560_000), DurationVerdict::WithinGraceShort);
        assert_eq!(window.classify(558_000), DurationVerdict::WithinGraceShort);
        assert_eq!(window.classify(557_999), DurationVerdict::TooShort);
        assert_eq!(window.classify(588_000), DurationVerdict::Acceptable);
        assert_eq!(window.classify(600_000), DurationVerdict::Acceptable);
        assert_eq!(window.classify(612_000), DurationVerdict::Acceptable);
        assert_eq!(window.classify(612_001), DurationVerdict::WithinGraceLong);
        assert_eq!(window.classify(642_000), DurationVerdict::WithinGraceLong);
        assert_eq!(window.classify(642_001), DurationVerdict::TooLong);
        assert_eq!(window.classify(0), DurationVerdict::TooShort);
    }

    #[test]
    fn test_classify_is_monotonic_in_sum() {
        let window = DurationWindow::new(400_000, 0.02);
        let mut previous = window.classify(0);
        for sum in (0..1_000_000).step_by(500) {
            let verdict = window.classify(sum);
            assert!(verdict >= previous, "verdict went backwards at {sum}");
            previous = verdict;
        }
    }

    #[test]
    fn test_total_duration_sums_tracks() {
        let pool = pool_of("t", &[200_000, 200_000, 200_000]);
        let window = DurationWindow::new(600_000, 0.0);
        assert_eq!(total_duration(&pool), 600_000);
        assert_eq!(window.classify(total_duration(&pool)), DurationVerdict::Acceptable);
    }

    #[test]
    fn test_tolerance_schedule_is_bounded() {
        let schedule = ToleranceSchedule::new(0.02, 0.01, 0.05, 6);
        let tolerances: Vec<f64> = schedule.attempts().map(|(_, moe)| moe).collect();

        assert_eq!(tolerances.len(), 6);
        assert_relative_eq!(tolerances[0], 0.02);
        assert_relative_eq!(tolerances[1], 0.03);
        assert_relative_eq!(tolerances[3], 0.05);
        assert_relative_eq!(tolerances[5], 0.05);
        assert_relative_eq!(schedule.final_tolerance(), 0.05);
    }

    #[test]
    fn test_column_search_finds_middle_column() {
        let pools = vec![stepped_pool("a"), stepped_pool("b")];
        // Column c sums to 200s + 20s * c
        let window = DurationWindow::new(400_000, 0.01);

        assert_eq!(ColumnSearch::find_closest_column(&pools, &window), SearchOutcome::Found(10));
    }

    #[test]
    fn test_column_search_walks_back_after_overshoot() {
        let pools = vec![stepped_pool("a"), stepped_pool("b")];
        let window = DurationWindow::new(500_000, 0.01);

        // Halving jumps from column 10 to 16, which is slightly long
        assert_eq!(ColumnSearch::find_closest_column(&pools, &window), SearchOutcome::Found(15));
    }

    #[test]
    fn test_column_search_rejects_unbracketed_window() {
        let pools = vec![stepped_pool("a"), stepped_pool("b")];

        let too_short_target = DurationWindow::new(100_000, 0.02);
        assert_eq!(
            ColumnSearch::find_closest_column(&pools, &too_short_target),
            SearchOutcome::Infeasible(Infeasibility::ShortestTooLong)
        );

        let too_long_target = DurationWindow::new(1_000_000, 0.02);
        assert_eq!(
            ColumnSearch::find_closest_column(&pools, &too_long_target),
            SearchOutcome::Infeasible(Infeasibility::LongestTooShort)
        );

        assert_eq!(
            ColumnSearch::find_closest_column(&[], &too_long_target),
            SearchOutcome::Infeasible(Infeasibility::PoolTooSmall)
        );
    }

    #[test]
    fn test_column_search_stays_at_boundary() {
        let pools = vec![pool_of("a", &[100_000, 110_000, 120_000])];
        // Longest column is short but inside the grace band
        let window = DurationWindow::new(140_000, 0.01);

        assert_eq!(ColumnSearch::find_closest_column(&pools, &window), SearchOutcome::Found(2));
    }

    #[test]
    fn test_best_fit_mixes_neighbor_column() {
        let pools = vec![stepped_pool("a"), stepped_pool("b")];
        // Column 10 is 400s and column 11 is 420s; only a mix lands on 410s
        let window = DurationWindow::new(410_000, 0.001);

        let column = ColumnSearch::find_closest_column(&pools, &window).found();
        assert_eq!(column, Some(10));

        let tracks = ColumnSearch::best_fit(&pools, 10, &window).found().expect("mix should fit");
        assert_eq!(ids(&tracks), vec!["a10", "b11"]);
    }

    #[test]
    fn test_best_fit_returns_fitting_column_unchanged() {
        let pools = vec![stepped_pool("a"), stepped_pool("b")];
        let window = DurationWindow::new(400_000, 0.01);

        let tracks = ColumnSearch::best_fit(&pools, 10, &window).found().expect("column fits");
        assert_eq!(ids(&tracks), vec!["a10", "b10"]);
    }

    #[test]
    fn test_best_fit_without_neighbor_is_exhausted() {
        let pools = vec![pool_of("a", &[100_000, 110_000])];
        let window = DurationWindow::new(125_000, 0.01);

        assert_eq!(ColumnSearch::best_fit(&pools, 1, &window), SearchOutcome::Exhausted);
    }

    #[test]
    fn test_combination_search_prefers_first_choice_order() {
        let a = pool_of("a", &[100, 200]);
        let b = pool_of("b", &[100, 200]);
        let pairs = vec![[a[0].clone(), a[1].clone()], [b[0].clone(), b[1].clone()]];
        let window = DurationWindow::new(300, 0.0);

        let tracks = CombinationSearch::find(&pairs, &window).found().expect("combination exists");
        // (first, second) is tried before (second, first)
        assert_eq!(ids(&tracks), vec!["a0", "b1"]);
    }

    #[test]
    fn test_combination_search_exhausts_all_assignments() {
        let a = pool_of("a", &[100, 200]);
        let pairs = vec![[a[0].clone(), a[1].clone()], [a[0].clone(), a[1].clone()]];
        let window = DurationWindow::new(1_000_000, 0.0);

        assert_eq!(CombinationSearch::find(&pairs, &window), SearchOutcome::Exhausted);
    }

    #[test]
    fn test_combination_search_refuses_large_segment_counts() {
        let a = pool_of("a", &[100, 200]);
        let pairs = vec![[a[0].clone(), a[1].clone()]; MAX_COMBINATION_SEGMENTS + 1];
        let window = DurationWindow::new(100 * (MAX_COMBINATION_SEGMENTS as u64 + 1), 0.0);

        assert_eq!(CombinationSearch::find(&pairs, &window), SearchOutcome::Exhausted);
    }

    #[test]
    fn test_sliding_window_finds_first_fitting_run() {
        let pool = pool_of("p", &[100, 200, 300, 400, 500]);
        let window = DurationWindow::new(700, 0.0);

        let run = WindowSearch::find_run(&pool, 2, &window).found().expect("run exists");
        assert_eq!(ids(&run), vec!["p2", "p3"]);
    }

    #[test]
    fn test_sliding_window_first_window_too_long() {
        let pool = pool_of("p", &[50_000, 60_000]);
        let window = DurationWindow::new(10_000, 0.0);

        assert_eq!(
            WindowSearch::find_run(&pool, 2, &window),
            SearchOutcome::Infeasible(Infeasibility::ShortestTooLong)
        );
    }

    #[test]
    fn test_sliding_window_stops_at_first_long_window() {
        // Not sorted: a fitting track sits after the overshoot and must not be reached
        let pool = pool_of("p", &[10_000, 100_000, 50_000]);
        let window = DurationWindow::new(50_000, 0.0);

        assert_eq!(WindowSearch::find_run(&pool, 1, &window), SearchOutcome::Exhausted);
    }

    #[test]
    fn test_sliding_window_pool_too_short_or_small() {
        let pool = pool_of("p", &[1_000, 2_000]);
        let window = DurationWindow::new(100_000, 0.0);

        assert_eq!(
            WindowSearch::find_run(&pool, 1, &window),
            SearchOutcome::Infeasible(Infeasibility::LongestTooShort)
        );
        assert_eq!(
            WindowSearch::find_run(&pool, 3, &window),
            SearchOutcome::Infeasible(Infeasibility::PoolTooSmall)
        );
        assert_eq!(
            WindowSearch::find_run(&pool, 0, &window),
            SearchOutcome::Infeasible(Infeasibility::PoolTooSmall)
        );
    }

    #[test]
    fn test_fill_segments_restarts_on_remaining_tracks() {
        let pool = pool_of(
            "p",
            &[100_000, 100_000, 200_000, 200_000, 300_000, 300_000],
        );
        let window = DurationWindow::new(400_000, 0.0);

        let runs = WindowSearch::fill_segments(&pool, 3, 2, &window);

        assert_eq!(runs.len(), 3);
        assert_eq!(ids(&runs[0]), vec!["p2", "p3"]);
        assert_eq!(ids(&runs[1]), vec!["p1", "p4"]);
        assert_eq!(ids(&runs[2]), vec!["p0", "p5"]);
    }

    #[test]
    fn test_fill_segments_returns_partial_fill() {
        let pool = pool_of("p", &[100_000, 300_000, 400_000]);
        let window = DurationWindow::new(400_000, 0.0);

        let runs = WindowSearch::fill_segments(&pool, 3, 1, &window);

        assert_eq!(runs.len(), 1);
        assert_eq!(ids(&runs[0]), vec!["p2"]);
    }
}
