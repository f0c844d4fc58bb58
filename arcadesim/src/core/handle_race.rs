use crate::core::autopilot::{Autopilot, AutopilotPars};
use crate::core::input::InputState;
use crate::core::race::{Race, RacePhase};
use crate::interfaces::gui_interface::{
    parse_color, RaceState, RgbColor, SimCommand, MAX_GUI_UPDATE_FREQUENCY,
};
use crate::post::race_result::RaceResult;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::{Receiver, Sender, TryRecvError};
use helpers::general::InputValueError;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// (s) Simulated time after which a headless run is aborted (DNF).
pub const MAX_RACE_TIME: f64 = 600.0;

/// handle_race simulates a single run driven by the autopilot with a fixed time step size and
/// returns the result for post-processing.
pub fn handle_race(
    sim_pars: &SimPars,
    autopilot_pars: &AutopilotPars,
    timestep_size: f64,
    print_debug: bool,
) -> anyhow::Result<RaceResult> {
    if !(timestep_size > 0.0) {
        return Err(InputValueError).context(format!(
            "timestep_size must be positive, but is {}!",
            timestep_size
        ));
    }

    let mut race = Race::new(&sim_pars.track_pars, &sim_pars.vehicle_pars);
    let autopilot = Autopilot::new(autopilot_pars, &sim_pars.vehicle_pars);
    let mut race_result = RaceResult::new(autopilot.name(), &race.track);

    race.start();

    while race.phase() == RacePhase::Running {
        if race.elapsed_ms() >= MAX_RACE_TIME * 1000.0 {
            race_result.dnf_elapsed_ms = race.stop();
            warn!(
                "Profile {} did not finish within {:.0}s",
                autopilot.name(),
                MAX_RACE_TIME
            );
            break;
        }

        let input = autopilot.decide(race.vehicle(), &race.track);

        if let Some(outcome) = race.simulate_frame(timestep_size, &input) {
            race_result.set_outcome(outcome);
        }

        race_result.record_frame(race.vehicle());
    }

    if print_debug {
        debug!(
            "Profile {}: {} frames, {} off-track, {} slipping, top speed {:.1}m/s",
            autopilot.name(),
            race_result.frames,
            race_result.off_track_frames,
            race_result.slipping_frames,
            race_result.top_speed
        );
    }

    Ok(race_result)
}

/// Effects of the commands received since the last frame.
#[derive(Debug, Default)]
struct PendingUpdate {
    send_now: bool,
    restart_clock: bool,
    dnf_elapsed_ms: Option<f64>,
    shutdown: bool,
}

fn apply_command(
    race: &mut Race,
    input: &mut InputState,
    command: SimCommand,
    pending: &mut PendingUpdate,
) {
    match command {
        SimCommand::Input(new_input) => *input = new_input,
        SimCommand::Start => {
            race.start();
            pending.send_now = true;
            pending.restart_clock = true;
        }
        SimCommand::Stop => {
            if let Some(elapsed_ms) = race.stop() {
                pending.dnf_elapsed_ms = Some(elapsed_ms);
            }
            pending.send_now = true;
        }
        SimCommand::Reset => {
            race.reset();
            pending.send_now = true;
        }
        SimCommand::Shutdown => pending.shutdown = true,
    }
}

/// handle_race_realtime runs the interactive race loop until it receives a shutdown command or
/// the command channel is disconnected. While running, one frame is simulated per frame period
/// with the measured wall-clock time step. While idle, the loop blocks on the command channel, so
/// no frames are simulated after a stop or a finish. The outcome of a completed run is sent after
/// the race switched back to idle.
pub fn handle_race_realtime(
    sim_pars: &SimPars,
    frame_rate: f64,
    rx: Receiver<SimCommand>,
    tx: Sender<RaceState>,
) -> anyhow::Result<()> {
    if !(frame_rate > 0.0) {
        return Err(InputValueError).context(format!(
            "frame_rate must be positive, but is {}!",
            frame_rate
        ));
    }

    let color = parse_color(&sim_pars.vehicle_pars.color)?;
    let color_off_track = parse_color(&sim_pars.vehicle_pars.color_off_track)?;
    let frame_duration = Duration::from_secs_f64(1.0 / frame_rate);
    let gui_update_period = Duration::from_secs_f64(1.0 / MAX_GUI_UPDATE_FREQUENCY);

    let mut race = Race::new(&sim_pars.track_pars, &sim_pars.vehicle_pars);
    let mut input = InputState::default();
    let mut t_prev_frame = Instant::now();
    let mut t_prev_gui_update: Option<Instant> = None;

    info!("Real-time simulation ready at {:.0} Hz", frame_rate);

    loop {
        let mut pending = PendingUpdate::default();

        // nothing to simulate -> wait for the next command
        if race.phase() == RacePhase::Idle {
            match rx.recv() {
                Ok(command) => apply_command(&mut race, &mut input, command, &mut pending),
                Err(_) => break,
            }
        }

        // apply all further commands that arrived in the meantime
        let mut disconnected = false;

        while !pending.shutdown {
            match rx.try_recv() {
                Ok(command) => apply_command(&mut race, &mut input, command, &mut pending),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if pending.shutdown || disconnected {
            break;
        }

        // simulate frame with the wall-clock time step (zero for the first frame of a run)
        let t_start = Instant::now();

        if pending.restart_clock {
            t_prev_frame = t_start;
        }

        let dt = t_start.duration_since(t_prev_frame).as_secs_f64();
        t_prev_frame = t_start;

        let outcome = race.simulate_frame(dt, &input);

        // update GUI
        let gui_update_due = t_prev_gui_update
            .map_or(true, |t_prev| t_prev.elapsed() >= gui_update_period);

        if pending.send_now || outcome.is_some() || gui_update_due {
            let snapshot = race.get_snapshot();
            let race_state = RaceState {
                snapshot,
                car_color: select_car_color(snapshot.off_track, color, color_off_track),
                outcome,
                dnf_elapsed_ms: pending.dnf_elapsed_ms,
            };

            if tx.send(race_state).is_err() {
                info!("GUI disconnected, ending real-time simulation");
                break;
            }
            t_prev_gui_update = Some(Instant::now());
        }

        // sleep until the frame is finished in real-time as well
        if race.phase() == RacePhase::Running {
            match frame_duration.checked_sub(t_start.elapsed()) {
                Some(t_sleep) => sleep(t_sleep),
                None => warn!("Could not keep up with real-time!"),
            }
        }
    }

    info!("Real-time simulation shut down");
    Ok(())
}

fn select_car_color(off_track: bool, color: RgbColor, color_off_track: RgbColor) -> RgbColor {
    if off_track {
        color_off_track
    } else {
        color
    }
}
