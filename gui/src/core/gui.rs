use crate::core::scene::{build_scene, Banner, Primitive, Rgba, Scene, TextSize, Viewport};
use crate::interfaces::arcadesim_interface::{ArcadesimInterface, RaceEvent};
use arcadesim::core::input::InputState;
use arcadesim::core::race::RacePhase;
use arcadesim::core::track::{Track, TrackPars};
use arcadesim::interfaces::gui_interface::{RaceState, SimCommand};
use arcadesim::post::race_result::{write_results_json, RaceResult};
use eframe::{egui, epi};
use flume::{Receiver, Sender};
use helpers::buffer::RingBuffer;
use helpers::geometry::Point2d;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

const STEER_LEFT_KEYS: [egui::Key; 2] = [egui::Key::ArrowLeft, egui::Key::A];
const STEER_RIGHT_KEYS: [egui::Key; 2] = [egui::Key::ArrowRight, egui::Key::D];
const ACCEL_KEYS: [egui::Key; 3] = [egui::Key::ArrowUp, egui::Key::W, egui::Key::Space];
const NITRO_KEYS: [egui::Key; 1] = [egui::Key::N];

/// map_keys converts the currently held keys into the control snapshot sent to the simulation.
/// Shift activates nitro as well.
pub fn map_keys<F>(key_down: F, shift: bool) -> InputState
where
    F: Fn(egui::Key) -> bool,
{
    InputState {
        left: STEER_LEFT_KEYS.iter().any(|&key| key_down(key)),
        right: STEER_RIGHT_KEYS.iter().any(|&key| key_down(key)),
        accel: ACCEL_KEYS.iter().any(|&key| key_down(key)),
        nitro: shift || NITRO_KEYS.iter().any(|&key| key_down(key)),
    }
}

#[derive(Debug)]
pub struct RacePlot {
    pub arcadesim_interface: ArcadesimInterface,
    pub track: Track,
    pub input: InputState,
    pub banner: Banner,
    pub top_speed: f64,
    pub result_path: Option<PathBuf>,
    pub prev_update: Instant,
    pub prev_update_durations: RingBuffer<u32>,
}

impl RacePlot {
    pub fn new(
        rx: Receiver<RaceState>,
        tx: Sender<SimCommand>,
        track_pars: &TrackPars,
        result_path: Option<PathBuf>,
    ) -> RacePlot {
        RacePlot {
            arcadesim_interface: ArcadesimInterface::new(rx, tx),
            track: Track::new(track_pars),
            input: InputState::default(),
            banner: Banner::Ready,
            top_speed: 0.0,
            result_path,
            prev_update: Instant::now(),
            prev_update_durations: RingBuffer::new(10),
        }
    }

    fn phase(&self) -> RacePhase {
        self.arcadesim_interface.race_state.snapshot.phase
    }

    fn start_race(&mut self) {
        self.top_speed = 0.0;
        self.arcadesim_interface.send_command(SimCommand::Start);
    }

    /// handle_keyboard forwards changed controls and handles the race control keys. Pressing accel
    /// while the start banner is shown starts the race, after a run Enter starts a new one.
    fn handle_keyboard(&mut self, input: &egui::InputState) {
        let controls = map_keys(|key| input.key_down(key), input.modifiers.shift);

        if controls != self.input {
            self.input = controls;
            self.arcadesim_interface
                .send_command(SimCommand::Input(controls));
        }

        if self.phase() == RacePhase::Idle {
            let accel_pressed = ACCEL_KEYS.iter().any(|&key| input.key_pressed(key));

            if input.key_pressed(egui::Key::Enter)
                || (accel_pressed && self.banner == Banner::Ready)
            {
                self.start_race();
            } else if input.key_pressed(egui::Key::R) {
                self.banner = Banner::Ready;
                self.arcadesim_interface.send_command(SimCommand::Reset);
            }
        } else if input.key_pressed(egui::Key::Escape) {
            self.arcadesim_interface.send_command(SimCommand::Stop);
        }
    }

    fn handle_event(&mut self, event: RaceEvent) {
        let mut race_result = RaceResult::new("keyboard", &self.track);
        race_result.top_speed = self.top_speed;

        match event {
            RaceEvent::Finished(outcome) => {
                info!("Finished in {}", outcome.format_time());
                race_result.set_outcome(outcome);
                self.banner = Banner::Finished(outcome);
            }
            RaceEvent::Stopped(elapsed_ms) => {
                race_result.dnf_elapsed_ms = Some(elapsed_ms);
                self.banner = Banner::Dnf(elapsed_ms);
            }
        }

        if let Some(result_path) = &self.result_path {
            if let Err(e) = write_results_json(result_path, &[race_result]) {
                error!("{:?}", e);
            }
        }
    }

    pub fn set_ui_content(&mut self, ui: &mut egui::Ui) -> egui::Response {
        // PREPARATIONS ----------------------------------------------------------------------------
        // get UI handles
        let (response, painter) =
            ui.allocate_painter(ui.available_size_before_wrap_finite(), egui::Sense::hover());

        let origin = response.rect.min;
        let viewport = Viewport {
            width: response.rect.width() as f64,
            height: response.rect.height() as f64,
        };

        // SCENE -----------------------------------------------------------------------------------
        let race_state = &self.arcadesim_interface.race_state;
        let scene = build_scene(
            &self.track,
            &race_state.snapshot,
            race_state.car_color,
            Some(self.banner),
            viewport,
        );

        let mut shapes = vec![egui::Shape::rect_filled(
            response.rect,
            0.0,
            to_color32(scene.background),
        )];
        shapes.extend(to_shapes(ui, &scene, origin));

        // UPDATE FREQUENCY ------------------------------------------------------------------------
        // calculate current UI update duration, append it to the buffer, and set update time
        self.prev_update_durations
            .push(self.prev_update.elapsed().as_millis() as u32);
        self.prev_update = Instant::now();

        if let Some(avg_duration) = self.prev_update_durations.get_avg() {
            if avg_duration > 0.0 {
                shapes.push(egui::Shape::text(
                    ui.fonts(),
                    egui::Pos2 {
                        x: response.rect.max.x - 16.0,
                        y: origin.y + 16.0,
                    },
                    egui::Align2::RIGHT_TOP,
                    format!("GUI update frequency: {:.0} Hz", 1000.0 / avg_duration),
                    egui::TextStyle::Small,
                    egui::Color32::GRAY,
                ));
            }
        }

        // DRAWING ---------------------------------------------------------------------------------
        painter.extend(shapes);
        response
    }
}

fn to_color32(color: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn to_pos2(p: &Point2d, origin: egui::Pos2) -> egui::Pos2 {
    egui::Pos2 {
        x: origin.x + p.x as f32,
        y: origin.y + p.y as f32,
    }
}

/// to_shapes converts the scene primitives (relative to the painter origin) into egui shapes.
fn to_shapes(ui: &egui::Ui, scene: &Scene, origin: egui::Pos2) -> Vec<egui::Shape> {
    scene
        .primitives
        .iter()
        .map(|primitive| match primitive {
            Primitive::ConvexPolygon { points, fill } => egui::Shape::convex_polygon(
                points.iter().map(|p| to_pos2(p, origin)).collect(),
                to_color32(*fill),
                egui::Stroke::none(),
            ),
            Primitive::Line {
                points,
                width,
                color,
            } => egui::Shape::line(
                points.iter().map(|p| to_pos2(p, origin)).collect(),
                egui::Stroke::new(*width as f32, to_color32(*color)),
            ),
            Primitive::RectFilled { min, max, fill } => egui::Shape::rect_filled(
                egui::Rect::from_min_max(to_pos2(min, origin), to_pos2(max, origin)),
                0.0,
                to_color32(*fill),
            ),
            Primitive::RectStroke {
                min,
                max,
                width,
                color,
            } => egui::Shape::rect_stroke(
                egui::Rect::from_min_max(to_pos2(min, origin), to_pos2(max, origin)),
                0.0,
                egui::Stroke::new(*width as f32, to_color32(*color)),
            ),
            Primitive::Text {
                pos,
                text,
                size,
                color,
            } => egui::Shape::text(
                ui.fonts(),
                to_pos2(pos, origin),
                egui::Align2::LEFT_TOP,
                text,
                match size {
                    TextSize::Small => egui::TextStyle::Small,
                    TextSize::Body => egui::TextStyle::Body,
                    TextSize::Heading => egui::TextStyle::Heading,
                },
                to_color32(*color),
            ),
        })
        .collect()
}

impl epi::App for RacePlot {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::CtxRef, _frame: &mut epi::Frame) {
        // update race interface
        let events = self.arcadesim_interface.update();
        let speed = self.arcadesim_interface.race_state.snapshot.speed;
        self.top_speed = self.top_speed.max(speed);

        for event in events {
            self.handle_event(event);
        }

        // forward keyboard input to the simulation
        self.handle_keyboard(ctx.input());

        // update UI content
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::dark_canvas(ui.style()).show(ui, |ui| {
                self.set_ui_content(ui);
            });
        });

        // request repaint of the UI
        ctx.request_repaint();
    }

    fn on_exit(&mut self) {
        self.arcadesim_interface
            .send_command(SimCommand::Shutdown);
    }

    fn name(&self) -> &str {
        "Arcade Race"
    }
}
