//! Command-line arguments for `saa-render`.

use std::path::PathBuf;

use clap::Parser;
use saa1099_common::DEFAULT_SAMPLE_RATE;

/// Render an SAA-1099 tracker song to a stereo WAV file
#[derive(Debug, Parser)]
#[command(name = "saa-render", version, about)]
pub struct CliArgs {
    /// Song file (JSON, version 1.1 or 1.2)
    pub input: PathBuf,

    /// Output WAV path (defaults to the input name with a .wav extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output sample rate in Hz
    #[arg(short = 'r', long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Stop at the end of the song instead of looping to the repeat position
    #[arg(long)]
    pub no_loop: bool,

    /// Position to start playback from
    #[arg(short, long, default_value_t = 0)]
    pub position: usize,

    /// Maximum length of the rendered audio in seconds
    #[arg(short = 't', long, default_value_t = 300.0)]
    pub max_seconds: f32,

    /// Print song information and exit
    #[arg(long)]
    pub info: bool,
}

impl CliArgs {
    /// Output path, derived from the input when not given
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("wav"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::parse_from(["saa-render", "song.json"]);
        assert_eq!(args.sample_rate, 44_100);
        assert_eq!(args.position, 0);
        assert!(!args.no_loop);
        assert!(!args.info);
        assert_eq!(args.output_path(), PathBuf::from("song.wav"));
    }

    #[test]
    fn explicit_options() {
        let args = CliArgs::parse_from([
            "saa-render",
            "song.json",
            "-o",
            "out.wav",
            "--sample-rate",
            "22050",
            "--no-loop",
            "--position",
            "3",
            "--max-seconds",
            "12.5",
        ]);
        assert_eq!(args.output_path(), PathBuf::from("out.wav"));
        assert_eq!(args.sample_rate, 22_050);
        assert!(args.no_loop);
        assert_eq!(args.position, 3);
        assert_eq!(args.max_seconds, 12.5);
    }
}
