pub mod core {
    pub mod autopilot;
    pub mod handle_race;
    pub mod input;
    pub mod race;
    pub mod track;
    pub mod vehicle;
}

pub mod interfaces {
    pub mod gui_interface;
}

pub mod post {
    pub mod race_result;
}

pub mod pre {
    pub mod check_sim_opts_pars;
    pub mod read_sim_pars;
    pub mod sim_opts;
}



#[cfg(test)]
mod vehicle_tests {
    use crate::core::input::{Control, InputState};
    use crate::core::track::{Track, TrackPars};
    use crate::core::vehicle::{update_vehicle_state, VehiclePars, VehicleState, NITRO_FULL};
    use crate::test_support::{curve_track_pars, straight_track_pars};
    use approx::{assert_relative_eq, assert_ulps_eq};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const ACCEL: InputState = InputState {
        left: false,
        right: false,
        accel: true,
        nitro: false,
    };
    const ACCEL_NITRO: InputState = InputState {
        left: false,
        right: false,
        accel: true,
        nitro: true,
    };

    fn run_frames(
        input: &InputState,
        track: &Track,
        pars: &VehiclePars,
        no_frames: usize,
    ) -> Vec<VehicleState> {
        let mut state = VehicleState::parked();
        let mut states = Vec::with_capacity(no_frames);
        for _ in 0..no_frames {
            state = update_vehicle_state(state, input, track, pars, 0.05);
            states.push(state);
        }
        states
    }

    #[test]
    fn test_parked_state() {
        let state = VehicleState::parked();
        assert_ulps_eq!(state.s, 0.0);
        assert_ulps_eq!(state.speed, 0.0);
        assert_ulps_eq!(state.nitro, NITRO_FULL);
        assert_eq!(state, VehicleState::default());
    }

    #[test]
    fn test_accelerate_one_frame() {
        let track = Track::new(&straight_track_pars(1300.0));
        let state = update_vehicle_state(
            VehicleState::parked(),
            &ACCEL,
            &track,
            &VehiclePars::default(),
            0.05,
        );
        assert_relative_eq!(state.speed, 3.0, epsilon = 1e-12);
        assert_relative_eq!(state.s, 0.15, epsilon = 1e-12);
        assert_ulps_eq!(state.nitro, NITRO_FULL);
        assert!(!state.off_track && !state.slipping);
    }

    #[test]
    fn test_friction_never_reverses() {
        let track = Track::new(&straight_track_pars(1300.0));
        let pars = VehiclePars::default();
        let mut state = VehicleState {
            speed: 1.0,
            ..VehicleState::parked()
        };
        for _ in 0..10 {
            let next = update_vehicle_state(state, &InputState::default(), &track, &pars, 0.05);
            assert!(next.speed >= 0.0);
            assert!(next.s >= state.s);
            state = next;
        }
        assert_ulps_eq!(state.speed, 0.0);
    }

    #[test]
    fn test_invalid_timestep_is_treated_as_zero() {
        let track = Track::new(&straight_track_pars(1300.0));
        let pars = VehiclePars::default();
        let state = VehicleState {
            speed: 40.0,
            s: 100.0,
            nitro: 50.0,
            ..VehicleState::parked()
        };
        for &dt in [-0.05, f64::NAN, f64::NEG_INFINITY, f64::INFINITY].iter() {
            let next = update_vehicle_state(state, &ACCEL_NITRO, &track, &pars, dt);
            assert_ulps_eq!(next.s, state.s);
            assert_ulps_eq!(next.speed, state.speed);
            assert_ulps_eq!(next.nitro, state.nitro);
        }
    }

    #[test]
    fn test_large_timestep_is_clamped() {
        let track = Track::new(&straight_track_pars(1300.0));
        let pars = VehiclePars::default();
        let stalled = update_vehicle_state(VehicleState::parked(), &ACCEL, &track, &pars, 2.0);
        let regular = update_vehicle_state(VehicleState::parked(), &ACCEL, &track, &pars, 0.05);
        assert_eq!(stalled, regular);
    }

    #[test]
    fn test_top_speed_without_nitro() {
        let track = Track::new(&straight_track_pars(5000.0));
        let pars = VehiclePars::default();
        let states = run_frames(&ACCEL, &track, &pars, 100);
        let top_speed = states.iter().fold(0.0_f64, |v, x| v.max(x.speed));
        assert_ulps_eq!(top_speed, pars.base_max_speed);
    }

    #[test]
    fn test_nitro_raises_top_speed() {
        let track = Track::new(&straight_track_pars(5000.0));
        let pars = VehiclePars::default();
        let top_speed = |input: &InputState| {
            run_frames(input, &track, &pars, 60)
                .iter()
                .fold(0.0_f64, |v, x| v.max(x.speed))
        };
        assert!(top_speed(&ACCEL_NITRO) > top_speed(&ACCEL));
        assert!(top_speed(&ACCEL_NITRO) <= pars.base_max_speed + pars.nitro_top_up);
    }

    #[test]
    fn test_nitro_gauge_bounds() {
        let track = Track::new(&straight_track_pars(50000.0));
        let pars = VehiclePars::default();
        let states = run_frames(&ACCEL_NITRO, &track, &pars, 400);
        assert!(states.iter().all(|x| 0.0 <= x.nitro && x.nitro <= NITRO_FULL));
        // 100% at 30%/s are used up within 3.4s
        assert!(states[..80].iter().any(|x| x.nitro == 0.0));

        let states = run_frames(&ACCEL, &track, &pars, 400);
        assert!(states.iter().all(|x| x.nitro == NITRO_FULL));
    }

    #[test]
    fn test_nitro_recharges() {
        let track = Track::new(&straight_track_pars(1300.0));
        let pars = VehiclePars::default();
        let state = VehicleState {
            nitro: 10.0,
            ..VehicleState::parked()
        };
        let next = update_vehicle_state(state, &ACCEL, &track, &pars, 0.05);
        assert_relative_eq!(next.nitro, 10.0 + 12.0 * 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_overspeed_in_curve_costs_speed() {
        let pars = VehiclePars::default();
        let state = VehicleState {
            speed: 70.0,
            s: 100.0,
            ..VehicleState::parked()
        };
        let tight = Track::new(&curve_track_pars(0.006, 55.0));
        let loose = Track::new(&curve_track_pars(0.006, 200.0));

        let next_tight = update_vehicle_state(state, &ACCEL, &tight, &pars, 0.05);
        let next_loose = update_vehicle_state(state, &ACCEL, &loose, &pars, 0.05);

        assert!(next_tight.slipping);
        assert!(!next_loose.slipping);
        assert!(next_tight.speed < next_loose.speed);
    }

    #[test]
    fn test_overspeed_pushes_to_outside() {
        let pars = VehiclePars::default();
        let state = VehicleState {
            speed: 70.0,
            s: 100.0,
            ..VehicleState::parked()
        };
        // left curve -> outside is right (negative lateral)
        let left = update_vehicle_state(
            state,
            &ACCEL,
            &Track::new(&curve_track_pars(0.006, 55.0)),
            &pars,
            0.05,
        );
        assert!(left.lateral_vel < 0.0);
        // right curve -> outside is left (positive lateral)
        let right = update_vehicle_state(
            state,
            &ACCEL,
            &Track::new(&curve_track_pars(-0.006, 55.0)),
            &pars,
            0.05,
        );
        assert!(right.lateral_vel > 0.0);
    }

    #[test]
    fn test_overspeed_on_straight_is_not_penalized() {
        let pars = VehiclePars::default();
        let track = Track::new(&straight_track_pars(1300.0));
        let state = VehicleState {
            speed: 84.0,
            s: 100.0,
            ..VehicleState::parked()
        };
        let next = update_vehicle_state(state, &ACCEL, &track, &pars, 0.05);
        assert!(!next.slipping);
        assert_ulps_eq!(next.speed, 85.0);
    }

    #[test]
    fn test_boundary_contact() {
        let pars = VehiclePars::default();
        let track = Track::new(&straight_track_pars(1300.0));
        let state = VehicleState {
            speed: 50.0,
            s: 100.0,
            lateral: 9.9,
            lateral_vel: 20.0,
            ..VehicleState::parked()
        };
        let next = update_vehicle_state(state, &InputState::default(), &track, &pars, 0.05);
        assert!(next.off_track);
        assert_ulps_eq!(next.lateral, track.lateral_limit());
        let v_expected = 50.0 - pars.friction * 0.05 - pars.offtrack_decel * 0.05;
        assert_relative_eq!(next.speed, v_expected, epsilon = 1e-12);
        assert!(next.lateral_vel < state.lateral_vel * pars.offtrack_damping);

        let mirrored = VehicleState {
            lateral: -9.9,
            lateral_vel: -20.0,
            ..state
        };
        let next = update_vehicle_state(mirrored, &InputState::default(), &track, &pars, 0.05);
        assert!(next.off_track);
        assert_ulps_eq!(next.lateral, -track.lateral_limit());
    }

    #[test]
    fn test_steering_direction() {
        let pars = VehiclePars::default();
        let track = Track::new(&straight_track_pars(1300.0));
        let state = VehicleState {
            speed: 60.0,
            s: 100.0,
            ..VehicleState::parked()
        };
        let steer_left = InputState {
            left: true,
            ..ACCEL
        };
        let steer_right = InputState {
            right: true,
            ..ACCEL
        };
        assert!(update_vehicle_state(state, &steer_left, &track, &pars, 0.05).lateral > 0.0);
        assert!(update_vehicle_state(state, &steer_right, &track, &pars, 0.05).lateral < 0.0);
    }

    #[test]
    fn test_input_controls() {
        let mut input = InputState::default();
        assert_ulps_eq!(input.steer(), 0.0);

        input.set(Control::Left, true);
        assert_ulps_eq!(input.steer(), 1.0);

        // both directions cancel out
        input.set(Control::Right, true);
        assert_ulps_eq!(input.steer(), 0.0);

        input.set(Control::Left, false);
        input.set(Control::Nitro, true);
        assert_ulps_eq!(input.steer(), -1.0);
        assert!(input.nitro && !input.accel);
    }

    #[test]
    fn test_invariants_under_random_inputs() {
        let track = Track::new(&TrackPars::default());
        let pars = VehiclePars::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = VehicleState::parked();

        for _ in 0..20000 {
            let input = InputState {
                left: rng.gen::<bool>(),
                right: rng.gen::<bool>(),
                accel: rng.gen_bool(0.75),
                nitro: rng.gen::<bool>(),
            };
            // zero, negative and oversized time steps mixed into regular ones
            let dt = match rng.gen_range(0..6) {
                0 => 0.0,
                1 => -0.02,
                2 => 0.2,
                _ => rng.gen_range(0.0..0.05),
            };

            let next = update_vehicle_state(state, &input, &track, &pars, dt);

            assert!(next.s >= state.s);
            assert!(next.lateral.abs() <= track.half_width);
            assert!(0.0 <= next.nitro && next.nitro <= NITRO_FULL);
            assert!(next.speed >= 0.0);
            state = next;
        }
    }
}



#[cfg(test)]
mod pre_tests {
    use crate::core::track::SegmentPars;
    use crate::pre::check_sim_opts_pars::check_sim_opts_pars;
    use crate::pre::read_sim_pars::{load_sim_pars, read_sim_pars, SimPars};
    use crate::pre::sim_opts::SimOpts;
    use approx::assert_ulps_eq;
    use clap::Parser;
    use std::path::{Path, PathBuf};

    fn input_path(rel_path: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../input")
            .join(rel_path)
    }

    fn default_opts() -> SimOpts {
        SimOpts::parse_from(["arcadesim"].iter())
    }

    fn check_err(sim_opts: &SimOpts, sim_pars: &SimPars) -> String {
        format!("{:#}", check_sim_opts_pars(sim_opts, sim_pars).unwrap_err())
    }

    #[test]
    fn test_default_opts() {
        let sim_opts = default_opts();
        assert!(!sim_opts.gui && !sim_opts.debug);
        assert!(sim_opts.parfile_path.is_none());
        assert_ulps_eq!(sim_opts.timestep_size, 0.05);
        assert_ulps_eq!(sim_opts.frame_rate, 60.0);
    }

    #[test]
    fn test_defaults_pass_check() {
        assert!(check_sim_opts_pars(&default_opts(), &SimPars::default()).is_ok());
    }

    #[test]
    fn test_parameter_file_matches_defaults() {
        let sim_pars = read_sim_pars(&input_path("parameters/pars_sprint.json")).unwrap();
        let defaults = SimPars::default();
        assert_eq!(sim_pars.track_pars.segments, defaults.track_pars.segments);
        assert_ulps_eq!(sim_pars.vehicle_pars.accel, defaults.vehicle_pars.accel);
        assert_eq!(sim_pars.autopilot_pars_all.len(), 3);
        assert!(check_sim_opts_pars(&default_opts(), &sim_pars).is_ok());
    }

    #[test]
    fn test_partial_parameter_file_uses_defaults() {
        let sim_pars: SimPars =
            serde_json::from_str(r#"{"vehicle_pars": {"accel": 40.0}}"#).unwrap();
        assert_ulps_eq!(sim_pars.vehicle_pars.accel, 40.0);
        assert_ulps_eq!(sim_pars.vehicle_pars.friction, 28.0);
        assert_eq!(sim_pars.track_pars.segments.len(), 7);
    }

    #[test]
    fn test_load_sim_pars_with_trackfile() {
        let trackfile = input_path("tracks/hairpin.csv");
        let sim_opts = SimOpts::parse_from(
            ["arcadesim", "--trackfile-path", trackfile.to_str().unwrap()].iter(),
        );
        let sim_pars = load_sim_pars(&sim_opts).unwrap();
        assert_eq!(sim_pars.track_pars.name, "hairpin");
        assert_eq!(sim_pars.track_pars.segments.len(), 5);
    }

    #[test]
    fn test_missing_parameter_file() {
        let err = read_sim_pars(Path::new("does/not/exist.json")).unwrap_err();
        assert!(format!("{}", err).contains("Failed to open parameter file"));
    }

    #[test]
    fn test_check_rejects_timestep() {
        let sim_opts = SimOpts::parse_from(["arcadesim", "-t", "0.1"].iter());
        assert!(check_err(&sim_opts, &SimPars::default()).contains("timestep_size"));
    }

    #[test]
    fn test_check_rejects_frame_rate_in_gui_mode() {
        let sim_opts = SimOpts::parse_from(["arcadesim", "--gui", "-f", "500"].iter());
        assert!(check_err(&sim_opts, &SimPars::default()).contains("frame_rate"));
    }

    #[test]
    fn test_check_rejects_track() {
        let mut sim_pars = SimPars::default();
        sim_pars.track_pars.segments.clear();
        assert!(check_err(&default_opts(), &sim_pars).contains("does not contain any segments"));

        let mut sim_pars = SimPars::default();
        sim_pars.track_pars.segments.push(SegmentPars {
            len: 2.0,
            kappa: 0.0,
            vmax: 80.0,
        });
        assert!(check_err(&default_opts(), &sim_pars).contains("Segment 8"));

        let mut sim_pars = SimPars::default();
        sim_pars.track_pars.margin = 12.0;
        assert!(check_err(&default_opts(), &sim_pars).contains("margin"));
    }

    #[test]
    fn test_check_rejects_vehicle() {
        let mut sim_pars = SimPars::default();
        sim_pars.vehicle_pars.friction = -1.0;
        assert!(check_err(&default_opts(), &sim_pars).contains("friction"));

        let mut sim_pars = SimPars::default();
        sim_pars.vehicle_pars.lateral_drag = 1.5;
        assert!(check_err(&default_opts(), &sim_pars).contains("lateral_drag"));

        let mut sim_pars = SimPars::default();
        sim_pars.vehicle_pars.color = String::from("not a color");
        assert!(check_err(&default_opts(), &sim_pars).contains("Could not parse hex color"));
    }

    #[test]
    fn test_check_rejects_missing_autopilot() {
        let mut sim_pars = SimPars::default();
        sim_pars.autopilot_pars_all.clear();
        assert!(check_err(&default_opts(), &sim_pars).contains("autopilot"));
    }
}

#[cfg(test)]
mod result_tests {
    use crate::core::race::RaceOutcome;
    use crate::core::track::{Track, TrackPars};
    use crate::core::vehicle::VehicleState;
    use crate::interfaces::gui_interface::{parse_color, RgbColor};
    use crate::post::race_result::{write_results_json, RaceResult};
    use approx::assert_ulps_eq;

    #[test]
    fn test_record_frames() {
        let track = Track::new(&TrackPars::default());
        let mut race_result = RaceResult::new("steady", &track);
        race_result.record_frame(&VehicleState {
            speed: 50.0,
            off_track: true,
            ..VehicleState::parked()
        });
        race_result.record_frame(&VehicleState {
            speed: 40.0,
            slipping: true,
            ..VehicleState::parked()
        });
        assert_eq!(race_result.frames, 2);
        assert_eq!(race_result.off_track_frames, 1);
        assert_eq!(race_result.slipping_frames, 1);
        assert_ulps_eq!(race_result.top_speed, 50.0);
        assert!(race_result.get_time_ms().is_nan());

        race_result.set_outcome(RaceOutcome {
            elapsed_ms: 17234.6,
        });
        assert_eq!(race_result.submission_ms, Some(17234));
        assert_ulps_eq!(race_result.get_time_ms(), 17234.6);
    }

    #[test]
    fn test_write_results_json() {
        let track = Track::new(&TrackPars::default());
        let mut race_result = RaceResult::new("steady", &track);
        race_result.set_outcome(RaceOutcome {
            elapsed_ms: 16500.0,
        });

        let filepath = std::env::temp_dir().join(format!(
            "arcadesim_results_{}.json",
            std::process::id()
        ));
        write_results_json(&filepath, &[race_result]).unwrap();

        let content = std::fs::read_to_string(&filepath).unwrap();
        std::fs::remove_file(&filepath).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json[0]["profile"], "steady");
        assert_eq!(json[0]["submission_ms"], 16500);
        assert_eq!(json[0]["dnf_elapsed_ms"], serde_json::Value::Null);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(
            parse_color("#38bdf8").unwrap(),
            RgbColor {
                r: 0x38,
                g: 0xbd,
                b: 0xf8
            }
        );
        assert!(parse_color("#zzz").is_err());
    }
}
