use anyhow::Result;
use clap::{Parser, ValueEnum};

mod client;
mod config;
mod error;
mod models;
mod playlist;


use crate::client::SpotifyClient;
use crate::config::load_config;
use crate::error::GenerationError;
use crate::playlist::utils::ToTitleCase;
use crate::playlist::{
    GenerationRequest, Intensity, IntervalShape, PlaylistGenerator, PlaylistStyle, SearchSettings,
};

/// Style names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    Classic,
    Steady,
    Interval,
    Pyramid,
    Relax,
}

#[derive(Parser)]
#[command(name = "heartbeat-playlists")]
#[command(about = "Workout playlists that follow your heart rate")]
#[command(version)]
struct Args {
    /// Listener age, used to pick the target heart rate
    #[arg(short, long)]
    age: u32,

    #[arg(short, long, value_enum, default_value = "medium")]
    intensity: Intensity,

    /// Workout length in minutes
    #[arg(short, long, default_value_t = 45)]
    length: u32,

    #[arg(short, long, value_enum, default_value = "classic")]
    style: StyleArg,

    /// Comma separated genre seeds, at most three
    #[arg(short, long, value_delimiter = ',', required = true)]
    genres: Vec<String>,

    /// Seed recommendations with your own top artists and tracks
    #[arg(short, long)]
    personalized: bool,

    /// Current heart rate, required for the relax style
    #[arg(long)]
    current_bpm: Option<u32>,

    /// Path to a JSON file overriding search settings
    #[arg(long)]
    settings: Option<String>,

    /// Enable debug mode - print playlist details to stdout instead of uploading
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Quiet mode - only warnings and errors are logged
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Log every search step
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Args {
    fn style(&self) -> Result<PlaylistStyle> {
        Ok(match self.style {
            StyleArg::Classic => PlaylistStyle::Classic,
            StyleArg::Steady => PlaylistStyle::Steady,
            StyleArg::Interval => PlaylistStyle::Interval {
                shape: IntervalShape::Flat,
            },
            StyleArg::Pyramid => PlaylistStyle::Interval {
                shape: IntervalShape::Pyramid,
            },
            StyleArg::Relax => match self.current_bpm {
                Some(current_bpm) => PlaylistStyle::Relax { current_bpm },
                None => {
                    return Err(anyhow::anyhow!(
                        "--current-bpm is required for the relax style"
                    ));
                }
            },
        })
    }
}

fn init_logging(args: &Args) {
    let level = if args.quiet {
        log::LevelFilter::Warn
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let settings = match &args.settings {
        Some(path) => {
            println!("Loading search settings from: {path}");
            SearchSettings::load_from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load search settings: {}", e))?
        }
        None => SearchSettings::default(),
    };

    let request = GenerationRequest {
        age: args.age,
        intensity: args.intensity,
        workout_length_min: args.length,
        style: args.style()?,
        genres: args.genres.clone(),
        personalized: args.personalized,
    };

    // Load configuration from .env
    let config = load_config()?;
    let client = SpotifyClient::new(config);

    println!("Looking up listener profile...");
    let generator = match PlaylistGenerator::prepare(&client, request.clone(), settings) {
        Ok(generator) => {
            let user = generator.user();
            println!(
                "✓ Signed in as {}",
                user.display_name.as_deref().unwrap_or(&user.id)
            );
            generator
        }
        Err(e) => {
            eprintln!("✗ {e}");
            return Err(e.into());
        }
    };

    let profile = generator.profile();
    println!(
        "\nGenerating a {} minute {} playlist: {:.0} bpm target, {:.2} energy",
        request.workout_length_min,
        request.style.label(),
        profile.target_tempo,
        profile.target_energy
    );

    let plan = match generator.generate() {
        Ok(plan) => plan,
        Err(e) => {
            report_failure(&e);
            return Err(e.into());
        }
    };

    println!("\n{}", plan.name);
    println!("{}", "=".repeat(plan.name.len()));
    println!("\n📊 Playlist Details:");
    println!(
        "   Tracks: {} | Duration: {}m{:02}s | Avg BPM: {:.1}",
        plan.metadata.total_tracks,
        plan.metadata.total_duration_ms / 60_000,
        plan.metadata.total_duration_ms / 1_000 % 60,
        plan.metadata.average_tempo
    );
    println!(
        "   Unique Artists: {} | BPM Range: {:.0}-{:.0} | Avg Energy: {:.2}",
        plan.metadata.artist_count,
        plan.metadata.tempo_range.0,
        plan.metadata.tempo_range.1,
        plan.metadata.average_energy
    );

    if args.debug || !args.quiet {
        let mut position = 0;
        for segment in &plan.segments {
            println!(
                "\n   {} @ {:.1} bpm ({}m{:02}s of {}m{:02}s)",
                segment.phase.to_string().to_title_case(),
                segment.target_tempo,
                segment.duration_ms() / 60_000,
                segment.duration_ms() / 1_000 % 60,
                segment.target_duration_ms / 60_000,
                segment.target_duration_ms / 1_000 % 60
            );
            for track in &segment.tracks {
                position += 1;
                println!(
                    "     {}. \"{}\" by {} [{:.0}bpm] {}:{:02} | E:{:.2}",
                    position,
                    track.name,
                    track.artist_display(),
                    track.tempo,
                    track.duration_ms / 60_000,
                    track.duration_ms / 1_000 % 60,
                    track.energy
                );
            }
        }
    }

    if args.debug {
        println!("\n🔍 DEBUG MODE: Playlist '{}' (would create via API)", plan.name);
        println!("   {}", plan.description);
        return Ok(());
    }

    println!("\n🎵 Creating playlist '{}' via API...", plan.name);
    match generator.publish(&plan) {
        Ok(playlist_id) => {
            println!(
                "✓ Successfully created playlist '{}' with ID: {}",
                plan.name, playlist_id
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Failed to create playlist '{}': {}", plan.name, e);
            Err(e.into())
        }
    }
}

fn report_failure(err: &GenerationError) {
    if err.is_infeasible() {
        eprintln!("✗ The requested workout could not be filled: {err}");
        eprintln!("  Try a different length, style or genre mix.");
    } else if let GenerationError::Collaborator { .. } = err {
        eprintln!("✗ The music service failed: {err}");
    } else {
        eprintln!("✗ {err}");
    }
}
