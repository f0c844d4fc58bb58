use crate::core::input::InputState;
use crate::core::track::Track;
use crate::core::vehicle::{VehiclePars, VehicleState};
use serde::Deserialize;

/// * `name` - Name of the driving profile, e.g. careful
/// * `corner_margin` - (m/s) Speed kept below the suggested speed of curves
/// * `lookahead` - (m) Distance ahead in which curves are considered for the target speed
/// * `use_nitro` - Boolean to determine whether nitro is used
/// * `nitro_reserve` - (%) Nitro is only used while the gauge is above this level
/// * `lateral_deadband` - (m) Lateral offset that is tolerated before steering back
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AutopilotPars {
    pub name: String,
    pub corner_margin: f64,
    pub lookahead: f64,
    pub use_nitro: bool,
    pub nitro_reserve: f64,
    pub lateral_deadband: f64,
}

impl Default for AutopilotPars {
    fn default() -> Self {
        AutopilotPars {
            name: String::from("steady"),
            corner_margin: 3.0,
            lookahead: 300.0,
            use_nitro: true,
            nitro_reserve: 20.0,
            lateral_deadband: 0.5,
        }
    }
}

/// Autopilot replaces the keyboard in headless runs. It has no brake, it only lifts the throttle
/// such that friction brings the car down to the speed of the next curve in time.
#[derive(Debug, Clone)]
pub struct Autopilot {
    pars: AutopilotPars,
    friction: f64,
    nitro_top_speed: f64,
}

impl Autopilot {
    pub fn new(autopilot_pars: &AutopilotPars, vehicle_pars: &VehiclePars) -> Autopilot {
        Autopilot {
            pars: autopilot_pars.to_owned(),
            friction: vehicle_pars.friction,
            nitro_top_speed: vehicle_pars.base_max_speed + vehicle_pars.nitro_top_up,
        }
    }

    pub fn name(&self) -> &str {
        &self.pars.name
    }

    /// The method returns the highest speed from which the car can still coast down to the
    /// suggested speed (minus margin) of every curve within the lookahead. Unlimited if there is
    /// no curve ahead.
    pub fn calc_target_speed(&self, vehicle: &VehicleState, track: &Track) -> f64 {
        track
            .points_ahead(vehicle.s, self.pars.lookahead)
            .filter(|point| point.kappa != 0.0)
            .map(|point| {
                let v_curve = (point.vmax - self.pars.corner_margin).max(0.0);
                let dist = (point.s - vehicle.s).max(0.0);
                (v_curve.powi(2) + 2.0 * self.friction * dist).sqrt()
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// The method returns the inputs for the next frame based on the current vehicle state.
    pub fn decide(&self, vehicle: &VehicleState, track: &Track) -> InputState {
        let target_speed = self.calc_target_speed(vehicle, track);
        let accel = vehicle.speed < target_speed;

        InputState {
            left: vehicle.lateral < -self.pars.lateral_deadband,
            right: vehicle.lateral > self.pars.lateral_deadband,
            accel,
            nitro: self.pars.use_nitro
                && accel
                && target_speed > self.nitro_top_speed
                && vehicle.nitro > self.pars.nitro_reserve,
        }
    }
}
