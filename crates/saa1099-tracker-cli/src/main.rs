//! SAA-1099 tracker song renderer
//!
//! Loads a song file, simulates it to build the seek tables and renders it to
//! a 16-bit stereo WAV file with the bit-exact SAA-1099 emulator.

mod args;
mod render;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use saa1099_common::{ChiptunePlayerBase, MetadataFields};
use saa1099_tracker::{Player, PlayerConfig, Song, format, tone_name};

use args::CliArgs;
use render::render_wav;

fn print_info(song: &Song) {
    let title = if song.title().is_empty() { "(untitled)" } else { song.title() };
    println!("Title:     {title}");
    println!("Author:    {}", song.author());
    println!("Format:    {}", song.format());
    println!("Interrupt: {} Hz", song.frame_rate());
    println!("Patterns:  {}", song.pattern_count() - 1);
    println!("Positions: {}", song.position_count());
    if let Some(frames) = song.frame_count() {
        let seconds = frames as f32 / song.frame_rate() as f32;
        println!("Length:    {frames} ticks ({seconds:.1} s)");
    }
    if let Some(frame) = song.loop_frame() {
        println!("Loops to:  position {} (tick {frame})", song.repeat_position());
    }

    for (i, position) in song.positions().iter().enumerate() {
        let channels: Vec<String> = position
            .channels
            .iter()
            .map(|c| format!("{:3}{:+3}", c.pattern, c.pitch))
            .collect();
        let first_note = position
            .channels
            .iter()
            .map(|c| song.pattern(c.pattern).line(0).tone)
            .find(|&t| t != 0)
            .unwrap_or(0);
        println!(
            "  {i:3}: len {:2} spd {:2} | {} | {}",
            position.length(),
            position.speed,
            channels.join(" "),
            tone_name(first_note)
        );
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let song = format::load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!("loaded '{}' by '{}'", song.title, song.author);

    let config = PlayerConfig {
        sample_rate: args.sample_rate,
        loop_mode: !args.no_loop,
    };
    let mut player = Player::with_config(song, config)?;
    player.count_position_frames(None);

    if args.info {
        print_info(player.song());
        return Ok(());
    }

    let available = player.song().position_count();
    if args.position >= available {
        bail!("position {} out of range (song has {available})", args.position);
    }
    player.set_cursor(args.position, 0)?;
    player.play_position(false, true, true);

    let max_frames = (args.max_seconds.max(0.0) * args.sample_rate as f32) as usize;
    let output = args.output_path();
    let summary = render_wav(&mut player, &output, max_frames)?;

    let seconds = summary.frames as f32 / player.sample_rate() as f32;
    info!(
        "wrote {} ({seconds:.1} s{})",
        output.display(),
        if summary.finished { "" } else { ", length limit reached" }
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();
    run(&args)
}
