use super::config::{GenerationRequest, Intensity, SearchSettings};

/// Target heart rate (and so target tempo) per intensity, for one age bracket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateZone {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

/// Target track energy per intensity, for one age bracket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyZone {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

// Brackets: under 30, 30-34, 35-39, ..., 65-69, 70 and over
const HEART_RATE_ZONES: [HeartRateZone; 10] = [
    HeartRateZone { low: 110.0, medium: 125.0, high: 140.0 },
    HeartRateZone { low: 105.0, medium: 133.0, high: 162.0 },
    HeartRateZone { low: 103.0, medium: 130.0, high: 157.0 },
    HeartRateZone { low: 100.0, medium: 126.0, high: 153.0 },
    HeartRateZone { low: 98.0, medium: 124.0, high: 149.0 },
    HeartRateZone { low: 95.0, medium: 120.0, high: 145.0 },
    HeartRateZone { low: 93.0, medium: 117.0, high: 140.0 },
    HeartRateZone { low: 90.0, medium: 113.0, high: 136.0 },
    HeartRateZone { low: 88.0, medium: 110.0, high: 132.0 },
    HeartRateZone { low: 85.0, medium: 107.0, high: 128.0 },
];

const ENERGY_ZONES: [EnergyZone; 10] = [
    EnergyZone { low: 0.75, medium: 0.80, high: 0.85 },
    EnergyZone { low: 0.78, medium: 0.83, high: 0.88 },
    EnergyZone { low: 0.76, medium: 0.81, high: 0.86 },
    EnergyZone { low: 0.74, medium: 0.79, high: 0.84 },
    EnergyZone { low: 0.72, medium: 0.77, high: 0.82 },
    EnergyZone { low: 0.70, medium: 0.75, high: 0.80 },
    EnergyZone { low: 0.68, medium: 0.73, high: 0.78 },
    EnergyZone { low: 0.66, medium: 0.71, high: 0.76 },
    EnergyZone { low: 0.64, medium: 0.69, high: 0.74 },
    EnergyZone { low: 0.62, medium: 0.67, high: 0.72 },
];

/// Index into the zone tables for an age
pub fn age_bracket(age: u32) -> usize {
    if age < 30 {
        0
    } else {
        (((age - 30) / 5) as usize + 1).min(HEART_RATE_ZONES.len() - 1)
    }
}

pub fn heart_rate_zone(age: u32) -> HeartRateZone {
    HEART_RATE_ZONES[age_bracket(age)]
}

pub fn energy_zone(age: u32) -> EnergyZone {
    ENERGY_ZONES[age_bracket(age)]
}

pub fn target_tempo(age: u32, intensity: Intensity) -> f64 {
    let zone = heart_rate_zone(age);
    match intensity {
        Intensity::Low => zone.low,
        Intensity::Medium => zone.medium,
        Intensity::High => zone.high,
    }
}

pub fn target_energy(age: u32, intensity: Intensity) -> f64 {
    let zone = energy_zone(age);
    match intensity {
        Intensity::Low => zone.low,
        Intensity::Medium => zone.medium,
        Intensity::High => zone.high,
    }
}

/// The numbers every style schedules against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutProfile {
    pub workout_length_min: u32,
    pub resting_tempo: f64,
    pub target_tempo: f64,
    pub starting_energy: f64,
    pub target_energy: f64,
}

impl WorkoutProfile {
    pub fn from_request(request: &GenerationRequest, settings: &SearchSettings) -> Self {
        Self {
            workout_length_min: request.workout_length_min,
            resting_tempo: settings.resting_tempo,
            target_tempo: target_tempo(request.age, request.intensity),
            starting_energy: settings.starting_energy,
            target_energy: target_energy(request.age, request.intensity),
        }
    }

    pub fn workout_ms(&self) -> u64 {
        u64::from(self.workout_length_min) * 60_000
    }
}
