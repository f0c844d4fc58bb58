use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    version,
    name = "ARCADE-RS",
    about = "A frame-driven arcade race simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing
    #[arg(short, long)]
    pub debug: bool,

    /// Activate GUI (race is then driven by the keyboard in real-time)
    #[arg(short, long)]
    pub gui: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the simulation parameter file (built-in parameters are used if not set)
    #[arg(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set path to a track file (CSV segments), overrides the segments of the parameter file
    #[arg(long)]
    pub trackfile_path: Option<PathBuf>,

    /// Set path of the JSON file the race results are written to
    #[arg(short, long)]
    pub result_path: Option<PathBuf>,

    /// Set simulation timestep size in seconds for headless runs
    #[arg(short, long, default_value_t = 0.05)]
    pub timestep_size: f64,

    /// Set frame rate in Hz for the real-time simulation
    #[arg(short, long, default_value_t = 60.0)]
    pub frame_rate: f64,
}
