use crate::core::input::InputState;
use crate::core::track::Track;
use helpers::general::{sanitize_timestep, sign};
use serde::Deserialize;

/// * `color` - Hex-code of the car color (used for plotting)
/// * `color_off_track` - Hex-code of the car color while off-track
/// * `base_max_speed` - (m/s) Top speed without nitro
/// * `accel` - (m/s^2) Acceleration while the throttle is pressed
/// * `friction` - (m/s^2) Deceleration while the throttle is released
/// * `steer_strength` - (m/s^2) Lateral acceleration of a full steering input at top speed
/// * `centering` - (1/s^2) Spring constant pulling the car back to the centerline
/// * `lateral_drag` - (-) Factor the lateral velocity is multiplied with in every frame
/// * `nitro_use_rate` - (%/s) Gauge depletion while boosting
/// * `nitro_recharge` - (%/s) Gauge recharge while not boosting
/// * `nitro_boost` - (m/s^2) Additional acceleration while boosting
/// * `nitro_top_up` - (m/s) Additional top speed while boosting
/// * `overspeed_push` - (1/s) Lateral push per m/s above the suggested speed in a curve
/// * `overspeed_decel` - (m/s^2) Deceleration while above the suggested speed in a curve
/// * `offtrack_decel` - (m/s^2) Deceleration while off-track
/// * `offtrack_damping` - (-) Factor the lateral velocity is multiplied with when hitting the
/// boundary
/// * `max_timestep` - (s) Upper bound of the physics time step (avoids jumps after stalls)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VehiclePars {
    pub color: String,
    pub color_off_track: String,
    pub base_max_speed: f64,
    pub accel: f64,
    pub friction: f64,
    pub steer_strength: f64,
    pub centering: f64,
    pub lateral_drag: f64,
    pub nitro_use_rate: f64,
    pub nitro_recharge: f64,
    pub nitro_boost: f64,
    pub nitro_top_up: f64,
    pub overspeed_push: f64,
    pub overspeed_decel: f64,
    pub offtrack_decel: f64,
    pub offtrack_damping: f64,
    pub max_timestep: f64,
}

impl Default for VehiclePars {
    fn default() -> Self {
        VehiclePars {
            color: String::from("#38bdf8"),
            color_off_track: String::from("#f87171"),
            base_max_speed: 85.0,
            accel: 60.0,
            friction: 28.0,
            steer_strength: 18.0,
            centering: 0.9,
            lateral_drag: 0.98,
            nitro_use_rate: 30.0,
            nitro_recharge: 12.0,
            nitro_boost: 55.0,
            nitro_top_up: 35.0,
            overspeed_push: 10.0,
            overspeed_decel: 12.0,
            offtrack_decel: 25.0,
            offtrack_damping: 0.5,
            max_timestep: 0.05,
        }
    }
}

pub const NITRO_FULL: f64 = 100.0;

/// VehicleState is the complete mutable state of the car. It is owned by the race and replaced by
/// the result of update_vehicle_state in every frame.
///
/// * `speed` - (m/s) Longitudinal speed
/// * `lateral` - (m) Offset from the centerline (positive: left of the driving direction)
/// * `lateral_vel` - (m/s) Lateral velocity
/// * `s` - (m) Distance traveled along the track
/// * `nitro` - (%) Nitro gauge in [0, 100]
/// * `off_track` - True if the car hit the track boundary in the last frame
/// * `slipping` - True if the car was above the suggested speed in a curve in the last frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub speed: f64,
    pub lateral: f64,
    pub lateral_vel: f64,
    pub s: f64,
    pub nitro: f64,
    pub off_track: bool,
    pub slipping: bool,
}

impl VehicleState {
    /// Car standing on the start line with a full nitro gauge.
    pub fn parked() -> VehicleState {
        VehicleState {
            speed: 0.0,
            lateral: 0.0,
            lateral_vel: 0.0,
            s: 0.0,
            nitro: NITRO_FULL,
            off_track: false,
            slipping: false,
        }
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        VehicleState::parked()
    }
}

/// update_vehicle_state advances the vehicle by one frame of duration dt and returns the new
/// state. Execution order:
/// 1. Look up suggested speed and curvature at the current distance.
/// 2. Determine the longitudinal acceleration (throttle or friction, plus nitro boost while the
/// gauge is not empty) and deplete or recharge the gauge.
/// 3. Integrate speed (clamped to [0, top speed]) and distance.
/// 4. Update the lateral velocity from steering (scaled by the speed ratio), the centering spring,
/// and the overspeed penalty that pushes the car to the outside of a curve and costs speed.
/// 5. Integrate the lateral offset and clamp it at the boundary, which costs speed and damps the
/// lateral velocity.
/// 6. Apply lateral drag.
///
/// Negative and non-finite time steps are treated as zero, time steps above max_timestep are
/// clamped.
pub fn update_vehicle_state(
    state: VehicleState,
    input: &InputState,
    track: &Track,
    pars: &VehiclePars,
    dt: f64,
) -> VehicleState {
    let dt = sanitize_timestep(dt).min(pars.max_timestep);
    let mut next = state;

    // suggested speed and curvature at the current position (straight without speed limit in
    // case of an empty track)
    let (vmax, kappa) = match track.get_point(state.s) {
        Some(point) => (point.vmax, point.kappa),
        None => (f64::INFINITY, 0.0),
    };

    // longitudinal acceleration and nitro gauge
    let mut a = if input.accel {
        pars.accel
    } else {
        -pars.friction
    };

    let nitro_act = input.nitro && state.nitro > 0.0;

    if nitro_act {
        a += pars.nitro_boost;
        next.nitro = (state.nitro - pars.nitro_use_rate * dt).max(0.0);
    } else {
        next.nitro = (state.nitro + pars.nitro_recharge * dt).min(NITRO_FULL);
    }

    // speed and distance
    let top = if nitro_act {
        pars.base_max_speed + pars.nitro_top_up
    } else {
        pars.base_max_speed
    };

    next.speed = (state.speed + a * dt).max(0.0).min(top);
    next.s = state.s + next.speed * dt;

    // lateral dynamics: steering is more effective at higher speeds
    let speed_ratio = if top > 0.0 { next.speed / top } else { 0.0 };
    next.lateral_vel += input.steer() * pars.steer_strength * speed_ratio * dt;
    next.lateral_vel -= state.lateral * pars.centering * dt;

    // overspeed in a curve -> pushed to the outside and losing speed
    next.slipping = next.speed > vmax && kappa != 0.0;

    if next.slipping {
        next.lateral_vel -= sign(kappa) * pars.overspeed_push * (next.speed - vmax) * dt;
        next.speed = (next.speed - pars.overspeed_decel * dt).max(0.0);
    }

    next.lateral = state.lateral + next.lateral_vel * dt;

    // boundary contact
    let lateral_limit = track.lateral_limit().max(0.0);
    next.off_track = next.lateral.abs() > lateral_limit;

    if next.off_track {
        next.lateral = sign(next.lateral) * lateral_limit;
        next.speed = (next.speed - pars.offtrack_decel * dt).max(0.0);
        next.lateral_vel *= pars.offtrack_damping;
    }

    next.lateral_vel *= pars.lateral_drag;

    next
}
