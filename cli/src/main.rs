use arcadesim::core::handle_race::{handle_race, handle_race_realtime};
use arcadesim::post::race_result::{print_results, write_results_json, RaceResult};
use arcadesim::pre::check_sim_opts_pars::check_sim_opts_pars;
use arcadesim::pre::read_sim_pars::load_sim_pars;
use arcadesim::pre::sim_opts::SimOpts;
use clap::Parser;
use gui::core::gui::RacePlot;
use rayon::prelude::*;
use std::thread;
use std::time::Instant;
use tracing::{error, info};

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments and load simulation parameters
    let sim_opts: SimOpts = SimOpts::parse();
    init_tracing(sim_opts.debug);

    let sim_pars = load_sim_pars(&sim_opts)?;

    // check simulation options and parameters
    check_sim_opts_pars(&sim_opts, &sim_pars)?;

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.gui {
        // NON-GUI CASE ----------------------------------------------------------------------------
        info!(
            "Simulating track {} with {} autopilot profile(s) and a time step size of {:.3}s",
            sim_pars.track_pars.name,
            sim_pars.autopilot_pars_all.len(),
            sim_opts.timestep_size
        );
        let t_start = Instant::now();

        // every profile drives its own race, the runs are independent of each other
        let race_results = sim_pars
            .autopilot_pars_all
            .par_iter()
            .map(|autopilot_pars| {
                handle_race(
                    &sim_pars,
                    autopilot_pars,
                    sim_opts.timestep_size,
                    sim_opts.debug,
                )
            })
            .collect::<anyhow::Result<Vec<RaceResult>>>()?;

        info!(
            "Execution time (total): {}ms",
            t_start.elapsed().as_millis()
        );

        // POST-PROCESSING -------------------------------------------------------------------------
        print_results(&race_results);

        if let Some(result_path) = &sim_opts.result_path {
            write_results_json(result_path, &race_results)?;
            info!("Results written to {}", result_path.display());
        }
    } else {
        // GUI CASE --------------------------------------------------------------------------------
        info!(
            "Starting track {} in real-time at {:.0} Hz",
            sim_pars.track_pars.name, sim_opts.frame_rate
        );

        // create channels for the communication between GUI and simulation
        let (tx_cmd, rx_cmd) = flume::unbounded();
        let (tx_state, rx_state) = flume::unbounded();

        // create a separate thread for the real-time simulation -> sim_pars gets moved and must
        // therefore be copied to be still available afterwards
        let sim_pars_thread = sim_pars.clone();
        let frame_rate = sim_opts.frame_rate;

        let _ = thread::spawn(move || {
            if let Err(e) = handle_race_realtime(&sim_pars_thread, frame_rate, rx_cmd, tx_state) {
                error!("{:?}", e);
            }
        });

        // start GUI (must be done in the main thread)
        let gui = RacePlot::new(
            rx_state,
            tx_cmd,
            &sim_pars.track_pars,
            sim_opts.result_path.to_owned(),
        );
        let native_options = eframe::NativeOptions::default();
        eframe::run_native(Box::new(gui), native_options);
    }

    Ok(())
}
