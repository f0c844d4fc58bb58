use crate::core::race::{format_time_ms, RaceOutcome};
use crate::core::track::Track;
use crate::core::vehicle::VehicleState;
use anyhow::Context;
use helpers::general::{argsort, SortOrder};
use serde::Serialize;
use std::fmt::Write;
use std::fs::OpenOptions;
use std::path::Path;

/// RaceResult contains all information about a run that is required for post-processing and for
/// handing the time over to the submission.
///
/// * `submission_ms` - Race time in whole milliseconds (only for completed runs)
/// * `dnf_elapsed_ms` - Partial time of a run that was stopped before the finish
#[derive(Debug, Clone, Serialize)]
pub struct RaceResult {
    pub profile: String,
    pub track_name: String,
    pub track_length: f64,
    pub outcome: Option<RaceOutcome>,
    pub submission_ms: Option<u32>,
    pub dnf_elapsed_ms: Option<f64>,
    pub frames: u64,
    pub off_track_frames: u64,
    pub slipping_frames: u64,
    pub top_speed: f64,
}

impl RaceResult {
    pub fn new(profile: &str, track: &Track) -> RaceResult {
        RaceResult {
            profile: profile.to_owned(),
            track_name: track.name.to_owned(),
            track_length: track.length,
            outcome: None,
            submission_ms: None,
            dnf_elapsed_ms: None,
            frames: 0,
            off_track_frames: 0,
            slipping_frames: 0,
            top_speed: 0.0,
        }
    }

    pub fn record_frame(&mut self, vehicle: &VehicleState) {
        self.frames += 1;
        if vehicle.off_track {
            self.off_track_frames += 1;
        }
        if vehicle.slipping {
            self.slipping_frames += 1;
        }
        self.top_speed = self.top_speed.max(vehicle.speed);
    }

    pub fn set_outcome(&mut self, outcome: RaceOutcome) {
        self.outcome = Some(outcome);
        self.submission_ms = Some(outcome.submission_ms());
    }

    /// Race time in ms, NaN for runs that did not finish.
    pub fn get_time_ms(&self) -> f64 {
        self.outcome.map_or(f64::NAN, |outcome| outcome.elapsed_ms)
    }
}

/// print_results prints the results ranked by race time (runs that did not finish last) to the
/// console output.
pub fn print_results(race_results: &[RaceResult]) {
    let times: Vec<f64> = race_results.iter().map(|x| x.get_time_ms()).collect();
    let mut tmp_string = String::from(
        "pos, profile         ,     time, submission, top speed, off-track, slipping\n",
    );

    for (pos, &idx) in argsort(&times, SortOrder::Ascending).iter().enumerate() {
        let race_result = &race_results[idx];

        let (time, submission) = match race_result.outcome {
            Some(outcome) => (outcome.format_time(), outcome.submission_ms().to_string()),
            None => (
                format!(
                    "DNF ({})",
                    format_time_ms(race_result.dnf_elapsed_ms.unwrap_or(0.0))
                ),
                String::from("-"),
            ),
        };

        writeln!(
            &mut tmp_string,
            "{:3}, {:15}, {:>8}, {:>10}, {:6.1}m/s, {:9}, {:8}",
            pos + 1,
            race_result.profile,
            time,
            submission,
            race_result.top_speed,
            race_result.off_track_frames,
            race_result.slipping_frames
        )
        .unwrap();
    }

    if let Some(race_result) = race_results.first() {
        println!(
            "RESULT: Track {} ({:.0}m)",
            race_result.track_name, race_result.track_length
        );
    }
    println!("{}", tmp_string);
}

/// write_results_json writes the results to a JSON file. The file is the hand-over point for the
/// submission of the race time.
pub fn write_results_json(filepath: &Path, race_results: &[RaceResult]) -> anyhow::Result<()> {
    let fh = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(filepath)
        .context(format!(
            "Failed to open result file {}!",
            filepath.display()
        ))?;

    serde_json::to_writer_pretty(&fh, race_results).context(format!(
        "Failed to write result file {}!",
        filepath.display()
    ))?;
    Ok(())
}
