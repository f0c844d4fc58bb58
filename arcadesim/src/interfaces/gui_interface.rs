use crate::core::input::InputState;
use crate::core::race::{RaceOutcome, RaceSnapshot};
use anyhow::Context;

pub const MAX_GUI_UPDATE_FREQUENCY: f64 = 60.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// parse_color converts a hex color, e.g. #38bdf8, to a rgb color.
pub fn parse_color(hex: &str) -> anyhow::Result<RgbColor> {
    let tmp_color = hex
        .parse::<css_color_parser::Color>()
        .context(format!("Could not parse hex color {}!", hex))?;

    Ok(RgbColor {
        r: tmp_color.r,
        g: tmp_color.g,
        b: tmp_color.b,
    })
}

/// Commands sent from the GUI to the simulation thread. Input always carries the complete control
/// snapshot, the simulation uses the latest one it received before a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    Start,
    Stop,
    Reset,
    Input(InputState),
    Shutdown,
}

/// RaceState is sent from the simulation thread to the GUI.
///
/// * `snapshot` - HUD data of the current frame
/// * `car_color` - Color the car must be drawn with (depends on off-track state)
/// * `outcome` - Set in the message that reports a completed run
/// * `dnf_elapsed_ms` - Set in the message that reports a stopped run
#[derive(Debug, Clone, Default)]
pub struct RaceState {
    pub snapshot: RaceSnapshot,
    pub car_color: RgbColor,
    pub outcome: Option<RaceOutcome>,
    pub dnf_elapsed_ms: Option<f64>,
}
