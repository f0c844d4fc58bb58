use crate::interfaces::gui_interface::parse_color;
use crate::pre::read_sim_pars::SimPars;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use helpers::general::InputValueError;

/// check_sim_opts_pars assures that the inserted options and parameters are within reasonable
/// limits and raises an error if not.
pub fn check_sim_opts_pars(sim_opts: &SimOpts, sim_pars: &SimPars) -> anyhow::Result<()> {
    let track_pars = &sim_pars.track_pars;
    let vehicle_pars = &sim_pars.vehicle_pars;

    // PART 1: SIMULATION OPTIONS
    if !(0.001 <= sim_opts.timestep_size && sim_opts.timestep_size <= vehicle_pars.max_timestep) {
        return Err(InputValueError).context(format!(
            "timestep_size is {:.3}s, which is not within the reasonable range of [0.001, {:.3}]s!",
            sim_opts.timestep_size, vehicle_pars.max_timestep
        ));
    }

    if sim_opts.gui && !(10.0 <= sim_opts.frame_rate && sim_opts.frame_rate <= 240.0) {
        return Err(InputValueError).context(format!(
            "frame_rate is {:.1}Hz, which is not within the reasonable range of [10.0, 240.0]Hz!",
            sim_opts.frame_rate
        ));
    }

    // PART 2: SIMULATION PARAMETERS
    // TRACK ---------------------------------------------------------------------------------------
    if !(track_pars.ds > 0.0) {
        return Err(InputValueError).context("ds must be positive!");
    }
    if !(track_pars.half_width > 0.0) {
        return Err(InputValueError).context("half_width must be positive!");
    }
    if !(0.0 <= track_pars.margin && track_pars.margin < track_pars.half_width) {
        return Err(InputValueError)
            .context("margin is not within the required range [0.0, half_width)!");
    }
    if track_pars.segments.is_empty() {
        return Err(InputValueError).context(format!(
            "Track {} does not contain any segments!",
            track_pars.name
        ));
    }

    for (i, seg) in track_pars.segments.iter().enumerate() {
        if !(seg.len >= track_pars.ds) {
            return Err(InputValueError).context(format!(
                "Segment {} is {}m long, which is shorter than the sampling step of {}m!",
                i + 1,
                seg.len,
                track_pars.ds
            ));
        }
        if !seg.kappa.is_finite() {
            return Err(InputValueError)
                .context(format!("Segment {} has a non-finite curvature!", i + 1));
        }
        if !(seg.vmax > 0.0) {
            return Err(InputValueError).context(format!(
                "Segment {} has a suggested speed of {}m/s, but it must be positive!",
                i + 1,
                seg.vmax
            ));
        }
    }

    // VEHICLE -------------------------------------------------------------------------------------
    let rates = [
        ("base_max_speed", vehicle_pars.base_max_speed),
        ("accel", vehicle_pars.accel),
        ("friction", vehicle_pars.friction),
        ("steer_strength", vehicle_pars.steer_strength),
        ("centering", vehicle_pars.centering),
        ("nitro_use_rate", vehicle_pars.nitro_use_rate),
        ("nitro_recharge", vehicle_pars.nitro_recharge),
        ("nitro_boost", vehicle_pars.nitro_boost),
        ("nitro_top_up", vehicle_pars.nitro_top_up),
        ("overspeed_push", vehicle_pars.overspeed_push),
        ("overspeed_decel", vehicle_pars.overspeed_decel),
        ("offtrack_decel", vehicle_pars.offtrack_decel),
        ("max_timestep", vehicle_pars.max_timestep),
    ];

    if let Some((name, val)) = rates.iter().find(|(_, val)| !(*val > 0.0 && val.is_finite())) {
        return Err(InputValueError).context(format!(
            "Vehicle parameter {} is {}, but it must be positive!",
            name, val
        ));
    }

    let factors = [
        ("lateral_drag", vehicle_pars.lateral_drag),
        ("offtrack_damping", vehicle_pars.offtrack_damping),
    ];

    if let Some((name, val)) = factors.iter().find(|(_, val)| !(0.0 <= *val && *val <= 1.0)) {
        return Err(InputValueError).context(format!(
            "Vehicle parameter {} is {}, which is not within the required range [0.0, 1.0]!",
            name, val
        ));
    }

    parse_color(&vehicle_pars.color)?;
    parse_color(&vehicle_pars.color_off_track)?;

    // AUTOPILOT -----------------------------------------------------------------------------------
    if sim_pars.autopilot_pars_all.is_empty() {
        return Err(InputValueError)
            .context("There must be at least one autopilot profile for headless runs!");
    }

    for autopilot_pars in sim_pars.autopilot_pars_all.iter() {
        if !(autopilot_pars.lookahead >= 0.0) || !(autopilot_pars.lateral_deadband >= 0.0) {
            return Err(InputValueError).context(format!(
                "lookahead and lateral_deadband of profile {} must not be negative!",
                autopilot_pars.name
            ));
        }
    }

    Ok(())
}
