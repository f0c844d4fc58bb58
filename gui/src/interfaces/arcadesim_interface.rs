use arcadesim::core::race::RaceOutcome;
use arcadesim::interfaces::gui_interface::{RaceState, SimCommand};
use flume::{Receiver, Sender};
use tracing::warn;

/// Events of the simulation thread that must not get lost while draining the channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RaceEvent {
    Finished(RaceOutcome),
    Stopped(f64),
}

#[derive(Debug)]
pub struct ArcadesimInterface {
    pub rx: Receiver<RaceState>,
    pub tx: Sender<SimCommand>,
    pub race_state: RaceState,
}

impl ArcadesimInterface {
    pub fn new(rx: Receiver<RaceState>, tx: Sender<SimCommand>) -> ArcadesimInterface {
        ArcadesimInterface {
            rx,
            tx,
            race_state: Default::default(),
        }
    }

    /// update drains the channel such that the latest race state is kept. Outcomes contained in
    /// older messages are returned as events.
    pub fn update(&mut self) -> Vec<RaceEvent> {
        let mut events = vec![];

        for message in self.rx.try_iter() {
            if let Some(outcome) = message.outcome {
                events.push(RaceEvent::Finished(outcome));
            }
            if let Some(elapsed_ms) = message.dnf_elapsed_ms {
                events.push(RaceEvent::Stopped(elapsed_ms));
            }
            self.race_state = message;
        }

        events
    }

    pub fn send_command(&self, command: SimCommand) {
        if self.tx.send(command).is_err() {
            warn!("Simulation thread is gone, could not send {:?}", command);
        }
    }
}
