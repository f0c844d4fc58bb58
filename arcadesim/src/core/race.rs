use crate::core::input::InputState;
use crate::core::track::{Track, TrackPars};
use crate::core::vehicle::{update_vehicle_state, VehiclePars, VehicleState};
use helpers::general::sanitize_timestep;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Possible states of the race:
/// * `Idle` -> track built, car parked (or standing where a run ended), no time accrual
/// * `Running` -> the car is advanced in every simulated frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    Idle,
    Running,
}

impl Default for RacePhase {
    fn default() -> Self {
        RacePhase::Idle
    }
}

/// RaceOutcome is emitted exactly once per completed run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceOutcome {
    pub elapsed_ms: f64,
}

impl RaceOutcome {
    /// Race time as whole milliseconds, the value handed over for submission (uint32 on chain).
    pub fn submission_ms(&self) -> u32 {
        self.elapsed_ms.floor() as u32
    }

    pub fn format_time(&self) -> String {
        format_time_ms(self.elapsed_ms)
    }
}

/// format_time_ms formats a time in milliseconds as mm:ss.cc.
pub fn format_time_ms(ms: f64) -> String {
    let ms = ms.max(0.0) as u64;
    format!(
        "{:02}:{:02}.{:02}",
        ms / 60000,
        (ms % 60000) / 1000,
        (ms % 1000) / 10
    )
}

/// RaceSnapshot contains everything the HUD shows. It can be requested after every frame and is
/// computed from the current state only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub phase: RacePhase,
    pub speed: f64,
    pub suggested_speed: f64,
    pub distance: f64,
    pub track_length: f64,
    pub elapsed_ms: f64,
    pub nitro: f64,
    pub off_track: bool,
    pub slipping: bool,
    pub lateral: f64,
}

impl RaceSnapshot {
    /// Race progress in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.track_length > 0.0 {
            (self.distance / self.track_length).max(0.0).min(1.0)
        } else {
            0.0
        }
    }
}

impl Default for RaceSnapshot {
    fn default() -> Self {
        RaceSnapshot {
            phase: RacePhase::Idle,
            speed: 0.0,
            suggested_speed: 0.0,
            distance: 0.0,
            track_length: 0.0,
            elapsed_ms: 0.0,
            nitro: 0.0,
            off_track: false,
            slipping: false,
            lateral: 0.0,
        }
    }
}

pub type FinishCallback = Box<dyn FnMut(&RaceOutcome)>;

pub struct Race {
    pub track: Track,
    vehicle_pars: VehiclePars,
    phase: RacePhase,
    vehicle: VehicleState,
    elapsed: f64,
    frame_no: u64,
    outcome: Option<RaceOutcome>,
    on_finish: Option<FinishCallback>,
}

impl fmt::Debug for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Race")
            .field("track", &self.track.name)
            .field("phase", &self.phase)
            .field("vehicle", &self.vehicle)
            .field("elapsed", &self.elapsed)
            .field("frame_no", &self.frame_no)
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl Race {
    pub fn new(track_pars: &TrackPars, vehicle_pars: &VehiclePars) -> Race {
        Race {
            track: Track::new(track_pars),
            vehicle_pars: vehicle_pars.to_owned(),
            phase: RacePhase::Idle,
            vehicle: VehicleState::parked(),
            elapsed: 0.0,
            frame_no: 0,
            outcome: None,
            on_finish: None,
        }
    }

    /// Registers the callback that is invoked with the outcome when a run is completed.
    pub fn on_finish<F>(&mut self, callback: F)
    where
        F: FnMut(&RaceOutcome) + 'static,
    {
        self.on_finish = Some(Box::new(callback));
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn vehicle_pars(&self) -> &VehiclePars {
        &self.vehicle_pars
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed * 1000.0
    }

    pub fn frame_no(&self) -> u64 {
        self.frame_no
    }

    /// Outcome of the last completed run (cleared by start and reset).
    pub fn outcome(&self) -> Option<RaceOutcome> {
        self.outcome
    }

    /// Parks the car on the start line and switches to Idle.
    pub fn reset(&mut self) {
        self.phase = RacePhase::Idle;
        self.vehicle = VehicleState::parked();
        self.elapsed = 0.0;
        self.frame_no = 0;
        self.outcome = None;
    }

    /// Starts a new run from the start line, whatever state the race was in before.
    pub fn start(&mut self) {
        self.reset();
        self.phase = RacePhase::Running;
        info!("Race started on track {} ({:.0}m)", self.track.name, self.track.length);
    }

    /// Aborts a running race without emitting an outcome. The partial time (ms) is returned such
    /// that the caller can decide what to do with it.
    pub fn stop(&mut self) -> Option<f64> {
        if self.phase != RacePhase::Running {
            return None;
        }

        self.phase = RacePhase::Idle;
        info!(
            "Race stopped after {:.0}m of {:.0}m (DNF at {:.3}s)",
            self.vehicle.s,
            self.track.length,
            self.elapsed
        );
        Some(self.elapsed_ms())
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method simulates one frame of duration dt (s) with the given inputs. Nothing happens in
    /// state Idle. Execution order in state Running:
    /// 1. Accumulate the (sanitized) time step into the elapsed time.
    /// 2. Update the vehicle state.
    /// 3. If the distance reached the track length, switch to Idle and emit the outcome via return
    /// value and finish callback.
    pub fn simulate_frame(&mut self, dt: f64, input: &InputState) -> Option<RaceOutcome> {
        if self.phase != RacePhase::Running {
            return None;
        }

        let dt = sanitize_timestep(dt);
        self.elapsed += dt;
        self.frame_no += 1;
        self.vehicle = update_vehicle_state(
            self.vehicle,
            input,
            &self.track,
            &self.vehicle_pars,
            dt,
        );

        if self.vehicle.slipping || self.vehicle.off_track {
            debug!(
                "Frame {}: s = {:.1}m, v = {:.1}m/s, slipping = {}, off-track = {}",
                self.frame_no,
                self.vehicle.s,
                self.vehicle.speed,
                self.vehicle.slipping,
                self.vehicle.off_track
            );
        }

        if self.vehicle.s < self.track.length {
            return None;
        }

        // race finished -> stop advancing before the outcome leaves the race
        self.phase = RacePhase::Idle;
        let outcome = RaceOutcome {
            elapsed_ms: self.elapsed_ms(),
        };
        self.outcome = Some(outcome);

        info!(
            "Race finished on track {} in {} ({} frames)",
            self.track.name,
            outcome.format_time(),
            self.frame_no
        );

        if let Some(callback) = self.on_finish.as_mut() {
            callback(&outcome);
        }

        Some(outcome)
    }

    pub fn get_snapshot(&self) -> RaceSnapshot {
        let suggested_speed = self
            .track
            .get_point(self.vehicle.s)
            .map_or(self.vehicle_pars.base_max_speed, |point| point.vmax);

        RaceSnapshot {
            phase: self.phase,
            speed: self.vehicle.speed,
            suggested_speed,
            distance: self.vehicle.s,
            track_length: self.track.length,
            elapsed_ms: self.elapsed_ms(),
            nitro: self.vehicle.nitro,
            off_track: self.vehicle.off_track,
            slipping: self.vehicle.slipping,
            lateral: self.vehicle.lateral,
        }
    }
}
