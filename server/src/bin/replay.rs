//! Headless auto-play replay.
//!
//! Runs the rotation state machine on a virtual clock (no waiting) and prints
//! every rendered frame, either as one JSON object per line or as an ASCII
//! drawing of the half-court.
//!
//! Usage: cargo run --bin replay -- [OPTIONS]
//!
//! Options:
//!   --rotations N      Rotation advances to play through (default: 6)
//!   --transition-ms T  Formation change duration (default: 800)
//!   --start N          Rotation to start from (default: 1)
//!   --ascii            Draw the court instead of printing JSON

use serde::Serialize;
use volley_server::machine::{run_until, RotationStateMachine};
use volley_server::render::{AsciiCourt, AsciiRenderer, Renderer};
use volley_shared::config::AnimationConfig;
use volley_shared::frame::Frame;
use volley_shared::rotation::FormationState;
use volley_shared::table::PositionTable;

#[derive(Serialize)]
struct TimedFrame<'a> {
    at_ms: u64,
    frame: &'a Frame,
}

fn emit<R: Renderer>(frames: &mut Vec<Frame>, at_ms: u64, ascii: Option<&mut R>) {
    match ascii {
        Some(renderer) => {
            for frame in frames.drain(..) {
                println!("t = {} ms", at_ms);
                renderer.render(&frame);
            }
        }
        None => {
            for frame in frames.drain(..) {
                match serde_json::to_string(&TimedFrame { at_ms, frame: &frame }) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Failed to encode frame: {}", e),
                }
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();

    let mut rotations: u32 = 6;
    let mut start: i64 = 1;
    let mut ascii = false;
    let mut config = AnimationConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rotations" => {
                i += 1;
                rotations = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(6);
            }
            "--transition-ms" => {
                i += 1;
                config.transition_ms = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(800);
            }
            "--start" => {
                i += 1;
                start = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(1);
            }
            "--ascii" => ascii = true,
            other => eprintln!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid animation configuration: {}", e);
        std::process::exit(1);
    }
    let table = PositionTable::standard();
    if let Err(e) = table.validate() {
        eprintln!("Invalid position table: {}", e);
        std::process::exit(1);
    }

    let court = AsciiCourt::new(41, 21, table.meta.attack_line_y);
    let mut machine = RotationStateMachine::new(table, config);
    machine.go_to(start, FormationState::Base);
    machine.toggle_play();

    tracing::info!(
        rotations,
        cycle_period_ms = config.cycle_period_ms(),
        "Replaying auto-play"
    );

    let mut ascii_out = AsciiRenderer::new(court, std::io::stdout());
    let mut frames: Vec<Frame> = Vec::new();
    let mut last_rotation = machine.state().rotation_index;
    let mut advanced = 0;

    machine.render_if_dirty(&mut frames);
    emit(&mut frames, machine.now_ms(), ascii.then_some(&mut ascii_out));
    while advanced < rotations {
        let Some(deadline) = machine.next_deadline_ms() else {
            break;
        };
        run_until(&mut machine, deadline, &mut frames);

        for frame in &frames {
            if frame.rotation != last_rotation {
                last_rotation = frame.rotation;
                advanced += 1;
            }
        }
        emit(&mut frames, machine.now_ms(), ascii.then_some(&mut ascii_out));
    }

    machine.shutdown();
    tracing::info!(end_ms = machine.now_ms(), advanced, "Replay finished");
}
