//! genefield headless runner
//!
//! Plays a timeline to completion, settles the force field on the first time
//! point, and prints a JSON summary of both final states.
//!
//! Usage: `genefield-runner <timeline.json> [config.json] [pathways.json] [--realtime]`
//!
//! With `--realtime` playback is paced at the configured frame rate instead
//! of running as fast as possible. Set `RUST_LOG=debug` for progress output.

use genefield::prelude::*;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// Force field steps taken to settle the art view.
const SETTLE_STEPS: usize = 300;

#[derive(Serialize)]
struct Summary<'a> {
    title: &'a str,
    frames: usize,
    time_points: usize,
    palette: PaletteMode,
    animation: &'a Snapshot,
    field: &'a Snapshot,
}

struct Args {
    timeline: PathBuf,
    config: Option<PathBuf>,
    pathways: Option<PathBuf>,
    realtime: bool,
}

fn parse_args() -> Option<Args> {
    let mut realtime = false;
    let mut paths = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--realtime" {
            realtime = true;
        } else {
            paths.push(PathBuf::from(arg));
        }
    }

    let mut paths = paths.into_iter();
    Some(Args {
        timeline: paths.next()?,
        config: paths.next(),
        pathways: paths.next(),
        realtime,
    })
}

fn main() -> ExitCode {
    env_logger::init();

    let Some(args) = parse_args() else {
        eprintln!("Usage: genefield-runner <timeline.json> [config.json] [pathways.json] [--realtime]");
        return ExitCode::FAILURE;
    };

    let timeline = match Timeline::load(&args.timeline) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to load timeline from {:?}: {}", args.timeline, e);
            return ExitCode::FAILURE;
        }
    };

    let config = match &args.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config from {:?}: {}", path, e);
                eprintln!("Using default configuration.");
                EngineConfig::default()
            }
        },
        None => EngineConfig::default(),
    };

    let pathways = match &args.pathways {
        Some(path) => match PathwayTable::load(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to load pathways from {:?}: {}", path, e);
                eprintln!("Continuing without relatedness.");
                PathwayTable::new()
            }
        },
        None => PathwayTable::new(),
    };
    log::info!("{} pathways loaded", pathways.len());

    let first = normalize(&timeline.time_points()[0].entities);

    let mut driver = match AnimationDriver::new(
        timeline,
        config.area,
        config.animation.clone(),
        pathways.clone(),
        PaletteColorMapper::default(),
    ) {
        Ok(d) => d.with_palette(config.palette),
        Err(e) => {
            eprintln!("Invalid animation settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    // A looping timeline would never finish.
    driver.set_looping(false);

    driver.play();
    if args.realtime {
        let mut clock = FrameClock::new(driver.config().fps);
        while driver.is_playing() {
            std::thread::sleep(clock.until_next());
            for _ in 0..clock.update() {
                driver.tick();
            }
        }
    } else {
        while driver.tick().is_some() {}
    }

    let mut field = ForceField::new(
        config.area,
        config.force.clone(),
        pathways,
        PaletteColorMapper::default(),
    )
    .with_palette(config.palette);
    field.update(&first);
    for _ in 0..SETTLE_STEPS {
        field.step();
    }

    let animation = driver.snapshot();
    let settled = field.snapshot();
    let summary = Summary {
        title: driver.timeline().title(),
        frames: driver.frame_count(),
        time_points: driver.timeline().time_points().len(),
        palette: driver.palette(),
        animation: &animation,
        field: &settled,
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize summary: {}", e);
            ExitCode::FAILURE
        }
    }
}
