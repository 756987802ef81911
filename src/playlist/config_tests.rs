#[cfg(test)]
mod tests {
    use super::super::profile::*;
    use super::super::schedule::*;
    use super::super::seeds::SeedSelection;
    use super::super::*;
    use crate::error::GenerationError;
    use approx::assert_relative_eq;

    fn create_test_request(style: PlaylistStyle) -> GenerationRequest {
        GenerationRequest {
            age: 33,
            intensity: Intensity::Low,
            workout_length_min: 44,
            style,
            genres: vec!["pop".to_string()],
            personalized: false,
        }
    }

    fn create_test_profile(workout_length_min: u32, target_tempo: f64) -> WorkoutProfile {
        WorkoutProfile {
            workout_length_min,
            resting_tempo: 80.0,
            target_tempo,
            starting_energy: 0.5,
            target_energy: 0.8,
        }
    }

    #[test]
    fn test_heart_rate_table_by_age_bracket() {
        assert_relative_eq!(target_tempo(25, Intensity::Medium), 125.0);
        assert_relative_eq!(target_tempo(33, Intensity::Low), 105.0);
        assert_relative_eq!(target_tempo(34, Intensity::High), 162.0);
        assert_relative_eq!(target_tempo(35, Intensity::Low), 103.0);
        assert_relative_eq!(target_tempo(69, Intensity::High), 132.0);
        assert_relative_eq!(target_tempo(70, Intensity::High), 128.0);
        assert_relative_eq!(target_tempo(95, Intensity::Low), 85.0);
    }

    #[test]
    fn test_energy_table_by_age_bracket() {
        assert_relative_eq!(target_energy(20, Intensity::High), 0.85);
        assert_relative_eq!(target_energy(33, Intensity::Low), 0.78);
        assert_relative_eq!(target_energy(72, Intensity::Medium), 0.67);
        assert_eq!(age_bracket(29), 0);
        assert_eq!(age_bracket(30), 1);
        assert_eq!(age_bracket(64), 7);
        assert_eq!(age_bracket(70), 9);
    }

    #[test]
    fn test_profile_from_request() {
        let request = create_test_request(PlaylistStyle::Classic);
        let profile = WorkoutProfile::from_request(&request, &SearchSettings::default());

        assert_relative_eq!(profile.target_tempo, 105.0);
        assert_relative_eq!(profile.target_energy, 0.78);
        assert_relative_eq!(profile.resting_tempo, 80.0);
        assert_eq!(profile.workout_ms(), 2_640_000);
    }

    #[test]
    fn test_ramp_steps_evenly_split_the_climb() {
        let settings = SearchSettings::default();
        let (count, step) = RampPlan::ramp_steps(14.0, 80.0, 120.0, &settings);
        assert_eq!(count, 4);
        assert_relative_eq!(step, 10.0);

        let plan = RampPlan::new(&create_test_profile(140, 120.0), &settings).expect("plan");
        let warmup: Vec<f64> = plan.warmup.iter().map(|s| s.target_tempo).collect();
        let wind_down: Vec<f64> = plan.wind_down.iter().map(|s| s.target_tempo).collect();
        assert_eq!(warmup, vec![90.0, 100.0, 110.0, 120.0]);
        assert_eq!(wind_down, vec![110.0, 100.0, 90.0, 80.0]);
        assert_eq!(plan.transition_ms, 840_000);
    }

    #[test]
    fn test_short_transition_collapses_to_midpoint() {
        let settings = SearchSettings::default();
        let request = create_test_request(PlaylistStyle::Classic);
        let profile = WorkoutProfile::from_request(&request, &settings);

        let plan = RampPlan::new(&profile, &settings).expect("plan");

        assert_eq!(plan.warmup.len(), 1);
        assert_eq!(plan.wind_down.len(), 1);
        assert_relative_eq!(plan.tempo_step, 12.5);
        assert_relative_eq!(plan.warmup[0].target_tempo, 92.5);
        assert_relative_eq!(plan.wind_down[0].target_tempo, 92.5);
        assert_eq!(plan.transition_ms, 264_000);
        assert_eq!(plan.target.target_duration_ms, 2_112_000);
        assert_eq!(plan.target.tracks_needed, 10);
        assert_relative_eq!(plan.target.min_tempo, 102.0);
        assert_relative_eq!(plan.target.max_tempo, 108.0);
    }

    #[test]
    fn test_short_workouts_use_one_song_transitions() {
        let settings = SearchSettings::default();
        assert_relative_eq!(RampPlan::transition_minutes(30, &settings), 3.5);
        assert_relative_eq!(RampPlan::transition_minutes(60, &settings), 6.0);

        let result = RampPlan::new(&create_test_profile(7, 120.0), &settings);
        assert!(matches!(result, Err(GenerationError::InvalidRequest(_))));
    }

    #[test]
    fn test_interval_counts_are_forced_odd() {
        assert_eq!(IntervalPlan::segment_counts(6), (7, 4, 3));
        assert_eq!(IntervalPlan::segment_counts(7), (7, 4, 3));
        assert_eq!(IntervalPlan::segment_counts(8), (9, 5, 4));
        assert_eq!(IntervalPlan::segment_counts(0), (3, 2, 1));
    }

    #[test]
    fn test_interval_plan_tiers() {
        let settings = SearchSettings::default();
        assert_eq!(IntervalPlan::tracks_per_segment(30), 1);
        assert_eq!(IntervalPlan::tracks_per_segment(45), 2);
        assert_eq!(IntervalPlan::tracks_per_segment(90), 3);
        assert_eq!(IntervalPlan::tracks_per_segment(150), 4);

        let plan = IntervalPlan::new(&create_test_profile(60, 140.0), &settings).expect("plan");
        assert_eq!(plan.tracks_per_segment, 2);
        assert_eq!(plan.segment_count, 9);
        assert_eq!(plan.slow_count, 5);
        assert_eq!(plan.fast_count, 4);
        assert_eq!(plan.segment_ms, 400_000);
        assert_eq!(plan.pool_limit, 33);

        let short = IntervalPlan::new(&create_test_profile(20, 140.0), &settings).expect("plan");
        assert_eq!(short.pool_limit, settings.candidate_limit);
    }

    #[test]
    fn test_short_workouts_cannot_hold_three_intervals() {
        let settings = SearchSettings::default();

        let result = IntervalPlan::new(&create_test_profile(5, 140.0), &settings);
        assert!(matches!(result, Err(GenerationError::InvalidRequest(_))));
        assert!(IntervalPlan::new(&create_test_profile(10, 140.0), &settings).is_err());

        // 11 minutes is the first length with room for three average songs
        let plan = IntervalPlan::new(&create_test_profile(11, 140.0), &settings).expect("plan");
        assert_eq!(plan.segment_count, 3);
        assert!(plan.segment_ms >= 210_000);
    }

    #[test]
    fn test_short_workouts_cannot_relax() {
        let settings = SearchSettings::default();

        let result = RelaxPlan::new(120, &create_test_profile(5, 120.0), &settings);
        assert!(matches!(result, Err(GenerationError::InvalidRequest(_))));

        let plan = RelaxPlan::new(120, &create_test_profile(11, 120.0), &settings).expect("plan");
        assert_eq!(plan.segments.len(), 3);
        for segment in &plan.segments {
            assert!(segment.target_duration_ms >= 210_000, "{segment:?}");
        }
    }

    #[test]
    fn test_pyramid_levels() {
        let (levels, has_peak) = pyramid_levels(80.0, 120.0, 3);
        assert_eq!(levels, vec![100.0]);
        assert!(has_peak);

        let (levels, has_peak) = pyramid_levels(80.0, 120.0, 4);
        assert_eq!(levels, vec![100.0, 120.0]);
        assert!(!has_peak);

        let (levels, has_peak) = pyramid_levels(80.0, 120.0, 2);
        assert_eq!(levels, vec![120.0]);
        assert!(!has_peak);

        let (levels, has_peak) = pyramid_levels(80.0, 120.0, 1);
        assert!(levels.is_empty());
        assert!(has_peak);
    }

    #[test]
    fn test_relax_plan_descends_to_floor() {
        let settings = SearchSettings::default();
        let plan = RelaxPlan::new(120, &create_test_profile(30, 120.0), &settings).expect("plan");

        // 60 bpm of decay at 7 bpm per minute gives 8 steps, capped by what fits in 30 minutes
        assert_eq!(plan.segments.len(), 8);
        assert_relative_eq!(plan.segments[0].target_tempo, 120.0);
        assert_relative_eq!(plan.tempo_step, 60.0 / 7.0);
        for pair in plan.segments.windows(2) {
            assert!(pair[0].target_tempo > pair[1].target_tempo);
        }

        let floor = plan.segments.last().expect("floor segment");
        assert_eq!(floor.phase, Phase::Floor);
        assert_relative_eq!(floor.min_tempo, 60.0);
        assert_relative_eq!(floor.max_tempo, 75.0);
        assert_eq!(floor.target_duration_ms, 225_000);
        assert_eq!(floor.tracks_needed, 1);
    }

    #[test]
    fn test_relax_plan_clamps_low_start() {
        let settings = SearchSettings::default();
        let plan = RelaxPlan::new(50, &create_test_profile(30, 120.0), &settings).expect("plan");

        assert_relative_eq!(plan.start_tempo, 75.0);
        let tempos: Vec<f64> = plan.segments.iter().map(|s| s.target_tempo).collect();
        assert_eq!(tempos, vec![75.0, 67.5, 60.0]);
    }

    #[test]
    fn test_seed_counts_by_genre_count() {
        assert_eq!(SeedSelection::seed_counts(1, true), (2, 2));
        assert_eq!(SeedSelection::seed_counts(2, true), (1, 2));
        assert_eq!(SeedSelection::seed_counts(3, true), (1, 1));
        assert_eq!(SeedSelection::seed_counts(2, false), (0, 0));
    }

    #[test]
    fn test_normalize_genre() {
        assert_eq!(SeedSelection::normalize_genre("hip-hop"), "hip hop");
        assert_eq!(SeedSelection::normalize_genre("R-N-B"), "r&b");
        assert_eq!(SeedSelection::normalize_genre("world-music"), "world");
        assert_eq!(SeedSelection::normalize_genre(" Rock "), "rock");
    }

    #[test]
    fn test_request_validation() {
        assert!(create_test_request(PlaylistStyle::Steady).validate().is_ok());

        let mut too_many_genres = create_test_request(PlaylistStyle::Steady);
        too_many_genres.genres = vec!["a", "b", "c", "d"].into_iter().map(String::from).collect();
        assert!(matches!(
            too_many_genres.validate(),
            Err(GenerationError::InvalidRequest(_))
        ));

        let mut no_genres = create_test_request(PlaylistStyle::Steady);
        no_genres.genres.clear();
        assert!(no_genres.validate().is_err());

        let racing_heart = create_test_request(PlaylistStyle::Relax { current_bpm: 150 });
        assert!(racing_heart.validate().is_err());

        let calm = create_test_request(PlaylistStyle::Relax { current_bpm: 100 });
        assert!(calm.validate().is_ok());
    }

    #[test]
    fn test_settings_fill_missing_fields_with_defaults() {
        let settings: SearchSettings =
            serde_json::from_str(r#"{"max_attempts": 5, "base_tolerance": 0.03}"#).expect("valid json");

        assert_eq!(settings.max_attempts, 5);
        assert_relative_eq!(settings.base_tolerance, 0.03);
        assert_eq!(settings.candidate_limit, 21);
        assert_relative_eq!(settings.avg_song_minutes, 3.5);
    }

    #[test]
    fn test_style_labels_and_serde_shape() {
        let style = PlaylistStyle::Interval {
            shape: IntervalShape::Pyramid,
        };
        assert_eq!(style.label(), "pyramid interval");
        assert!(style.mixes_genre_only_candidates());
        assert!(!PlaylistStyle::Classic.mixes_genre_only_candidates());

        let json = serde_json::to_string(&PlaylistStyle::Relax { current_bpm: 110 }).expect("serialize");
        assert_eq!(json, r#"{"style":"relax","current_bpm":110}"#);
    }
}
