use crate::core::autopilot::AutopilotPars;
use crate::core::track::{read_segments_csv, TrackPars};
use crate::core::vehicle::VehiclePars;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs. Missing entries in the parameter file
/// fall back to the built-in defaults.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimPars {
    pub track_pars: TrackPars,
    pub vehicle_pars: VehiclePars,
    pub autopilot_pars_all: Vec<AutopilotPars>,
}

impl Default for SimPars {
    fn default() -> Self {
        SimPars {
            track_pars: TrackPars::default(),
            vehicle_pars: VehiclePars::default(),
            autopilot_pars_all: vec![
                AutopilotPars::default(),
                AutopilotPars {
                    name: String::from("careful"),
                    corner_margin: 8.0,
                    use_nitro: false,
                    ..AutopilotPars::default()
                },
                AutopilotPars {
                    name: String::from("aggressive"),
                    corner_margin: 0.0,
                    nitro_reserve: 0.0,
                    ..AutopilotPars::default()
                },
            ],
        }
    }
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;

    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}

/// load_sim_pars returns the parameters according to the simulation options: the parameter file
/// if one is set (built-in parameters otherwise), with the track segments replaced by the track
/// file if one is set.
pub fn load_sim_pars(sim_opts: &SimOpts) -> anyhow::Result<SimPars> {
    let mut sim_pars = match &sim_opts.parfile_path {
        Some(parfile_path) => read_sim_pars(parfile_path)?,
        None => SimPars::default(),
    };

    if let Some(trackfile_path) = &sim_opts.trackfile_path {
        sim_pars.track_pars.segments = read_segments_csv(trackfile_path)?;

        if let Some(stem) = trackfile_path.file_stem() {
            sim_pars.track_pars.name = stem.to_string_lossy().into_owned();
        }
    }

    Ok(sim_pars)
}
