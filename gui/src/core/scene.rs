use arcadesim::core::race::{format_time_ms, RaceOutcome, RacePhase, RaceSnapshot};
use arcadesim::core::track::Track;
use arcadesim::interfaces::gui_interface::RgbColor;
use helpers::geometry::{Point2d, Vector2d};

// camera
const SCALE: f64 = 4.0; // px/m
const CAR_ANCHOR_BOTTOM: f64 = 120.0; // px between car and lower window border
const VIEW_RADIUS_FACTOR: f64 = 1.2;

// car shape (m)
const CAR_NOSE: f64 = 4.0;
const CAR_TAIL: f64 = 3.0;
const CAR_HALF_WIDTH: f64 = 2.5;

const FINISH_VISIBLE_DIST: f64 = 60.0;
const FINISH_TILE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba {
    Rgba { r, g, b, a }
}

pub const BACKGROUND: Rgba = rgba(11, 18, 32, 255);
const TRACK_SURFACE: Rgba = rgba(15, 23, 42, 255);
const EDGE_LEFT: Rgba = rgba(37, 99, 235, 90);
const EDGE_RIGHT: Rgba = rgba(239, 68, 68, 90);
const CENTERLINE: Rgba = rgba(148, 163, 184, 90);
const TILE_LIGHT: Rgba = rgba(255, 255, 255, 230);
const TILE_DARK: Rgba = rgba(30, 41, 59, 230);
const PANEL: Rgba = rgba(10, 14, 26, 153);
const PANEL_BORDER: Rgba = rgba(37, 99, 235, 153);
const TEXT: Rgba = rgba(224, 230, 237, 255);
const BAR_BACKGROUND: Rgba = rgba(148, 163, 184, 51);
const PROGRESS: Rgba = rgba(37, 99, 235, 204);
const NITRO: Rgba = rgba(56, 189, 248, 230);
const WARNING: Rgba = rgba(239, 68, 68, 230);
const HINT: Rgba = rgba(251, 191, 36, 230);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Body,
    Heading,
}

/// Screen-space drawing primitives (pixels, y pointing down).
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    ConvexPolygon {
        points: Vec<Point2d>,
        fill: Rgba,
    },
    Line {
        points: Vec<Point2d>,
        width: f64,
        color: Rgba,
    },
    RectFilled {
        min: Point2d,
        max: Point2d,
        fill: Rgba,
    },
    RectStroke {
        min: Point2d,
        max: Point2d,
        width: f64,
        color: Rgba,
    },
    Text {
        pos: Point2d,
        text: String,
        size: TextSize,
        color: Rgba,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Rgba,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Message shown below the HUD panel while no race is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Banner {
    Ready,
    Finished(RaceOutcome),
    Dnf(f64),
}

/// Maps world coordinates (m, y up) to screen coordinates (px, y down) such that the car stays at
/// a fixed screen position.
struct Camera {
    world_anchor: Point2d,
    screen_anchor: Point2d,
    view_radius: f64,
}

impl Camera {
    fn to_screen(&self, p: &Point2d) -> Point2d {
        Point2d {
            x: self.screen_anchor.x + (p.x - self.world_anchor.x) * SCALE,
            y: self.screen_anchor.y - (p.y - self.world_anchor.y) * SCALE,
        }
    }

    fn is_visible(&self, p: &Point2d) -> bool {
        p.as_vector2d().sub(&self.world_anchor.as_vector2d()).abs() < self.view_radius
    }
}

/// build_scene returns everything that must be drawn for the given race snapshot. It only depends
/// on its arguments, so calling it repeatedly for the same snapshot yields the same scene.
pub fn build_scene(
    track: &Track,
    snapshot: &RaceSnapshot,
    car_color: RgbColor,
    banner: Option<Banner>,
    viewport: Viewport,
) -> Scene {
    let mut primitives = vec![];

    // car position in world coordinates
    let car_point = track.get_point(snapshot.distance);
    let (car_coords, heading, normal) = match car_point {
        Some(point) => {
            let heading = Vector2d::from_heading(point.theta);
            let normal = point.normal_vector();
            // interpolate within the sample interval
            let coords = point
                .coords
                .shift(&heading.mult((snapshot.distance - point.s).max(0.0).min(track.ds)))
                .shift(&normal.mult(snapshot.lateral));
            (coords, heading, normal)
        }
        None => (
            Point2d { x: 0.0, y: 0.0 },
            Vector2d { dx: 0.0, dy: 1.0 },
            Vector2d { dx: -1.0, dy: 0.0 },
        ),
    };

    let camera = Camera {
        world_anchor: car_coords,
        screen_anchor: Point2d {
            x: viewport.width / 2.0,
            y: viewport.height - CAR_ANCHOR_BOTTOM,
        },
        view_radius: viewport.width.max(viewport.height) / SCALE * VIEW_RADIUS_FACTOR,
    };

    add_track(&mut primitives, track, &camera);

    if snapshot.track_length - snapshot.distance < FINISH_VISIBLE_DIST {
        add_finish_line(&mut primitives, track, &camera);
    }

    // car
    let car_shape = [
        car_coords.shift(&heading.mult(CAR_NOSE)),
        car_coords
            .shift(&heading.mult(-CAR_TAIL))
            .shift(&normal.mult(CAR_HALF_WIDTH)),
        car_coords
            .shift(&heading.mult(-CAR_TAIL))
            .shift(&normal.mult(-CAR_HALF_WIDTH)),
    ];
    primitives.push(Primitive::ConvexPolygon {
        points: car_shape.iter().map(|p| camera.to_screen(p)).collect(),
        fill: rgba(car_color.r, car_color.g, car_color.b, 255),
    });

    add_hud(&mut primitives, snapshot, banner, viewport);

    Scene {
        background: BACKGROUND,
        primitives,
    }
}

fn add_track(primitives: &mut Vec<Primitive>, track: &Track, camera: &Camera) {
    // sample points incl. the finish, each with its normal vector
    let mut samples: Vec<(Point2d, Vector2d)> = track
        .path
        .iter()
        .map(|point| (point.coords, point.normal_vector()))
        .collect();

    if let Some(last) = track.path.last() {
        samples.push((track.finish_coords, last.normal_vector()));
    }

    let mut edge_left = vec![];
    let mut edge_right = vec![];

    for (i, pair) in samples.windows(2).enumerate() {
        let (p0, n0) = pair[0];
        let (p1, n1) = pair[1];

        if !camera.is_visible(&p0) && !camera.is_visible(&p1) {
            continue;
        }

        let w = track.half_width;
        let quad = [
            p0.shift(&n0.mult(w)),
            p1.shift(&n1.mult(w)),
            p1.shift(&n1.mult(-w)),
            p0.shift(&n0.mult(-w)),
        ];
        primitives.push(Primitive::ConvexPolygon {
            points: quad.iter().map(|p| camera.to_screen(p)).collect(),
            fill: TRACK_SURFACE,
        });

        edge_left.push(camera.to_screen(&quad[0]));
        edge_left.push(camera.to_screen(&quad[1]));
        edge_right.push(camera.to_screen(&quad[3]));
        edge_right.push(camera.to_screen(&quad[2]));

        // dashed centerline fixed to the track, so it scrolls with the car
        if i % 4 < 2 {
            primitives.push(Primitive::Line {
                points: vec![camera.to_screen(&p0), camera.to_screen(&p1)],
                width: 2.0,
                color: CENTERLINE,
            });
        }
    }

    for (edge, color) in [(edge_left, EDGE_LEFT), (edge_right, EDGE_RIGHT)].iter() {
        if edge.len() >= 2 {
            primitives.push(Primitive::Line {
                points: edge.to_owned(),
                width: 2.0,
                color: *color,
            });
        }
    }
}

fn add_finish_line(primitives: &mut Vec<Primitive>, track: &Track, camera: &Camera) {
    let last = match track.path.last() {
        Some(x) => x,
        None => return,
    };
    let heading = Vector2d::from_heading(last.theta);
    let normal = last.normal_vector();
    let no_tiles = (2.0 * track.half_width / FINISH_TILE).ceil() as i32;

    for row in 0..2 {
        for i in 0..no_tiles {
            let offset = -track.half_width + i as f64 * FINISH_TILE;
            let corner = track
                .finish_coords
                .shift(&normal.mult(offset))
                .shift(&heading.mult(row as f64 * FINISH_TILE));
            let tile = [
                corner,
                corner.shift(&normal.mult(FINISH_TILE)),
                corner
                    .shift(&normal.mult(FINISH_TILE))
                    .shift(&heading.mult(FINISH_TILE)),
                corner.shift(&heading.mult(FINISH_TILE)),
            ];
            primitives.push(Primitive::ConvexPolygon {
                points: tile.iter().map(|p| camera.to_screen(p)).collect(),
                fill: if (i + row) % 2 == 0 { TILE_LIGHT } else { TILE_DARK },
            });
        }
    }
}

fn add_hud(
    primitives: &mut Vec<Primitive>,
    snapshot: &RaceSnapshot,
    banner: Option<Banner>,
    viewport: Viewport,
) {
    let p = |x: f64, y: f64| Point2d { x, y };
    let text = |x: f64, y: f64, text: String, size: TextSize, color: Rgba| Primitive::Text {
        pos: p(x, y),
        text,
        size,
        color,
    };

    // info panel
    primitives.push(Primitive::RectFilled {
        min: p(16.0, 16.0),
        max: p(316.0, 144.0),
        fill: PANEL,
    });
    primitives.push(Primitive::RectStroke {
        min: p(16.0, 16.0),
        max: p(316.0, 144.0),
        width: 1.0,
        color: PANEL_BORDER,
    });

    let lines = [
        format!("Speed: {:.0} m/s", snapshot.speed),
        format!("Suggested speed: {:.0} m/s", snapshot.suggested_speed),
        format!(
            "Distance: {:.0} / {:.0} m",
            snapshot.distance, snapshot.track_length
        ),
        format!("Time: {:.2} s", snapshot.elapsed_ms / 1000.0),
    ];
    for (i, line) in lines.iter().enumerate() {
        primitives.push(text(
            28.0,
            28.0 + i as f64 * 26.0,
            line.to_owned(),
            TextSize::Body,
            TEXT,
        ));
    }

    // progress bar
    let bar_width = (viewport.width - 32.0).max(0.0);
    let bar_y = viewport.height - 32.0;
    primitives.push(Primitive::RectFilled {
        min: p(16.0, bar_y),
        max: p(16.0 + bar_width, bar_y + 12.0),
        fill: BAR_BACKGROUND,
    });
    primitives.push(Primitive::RectFilled {
        min: p(16.0, bar_y),
        max: p(16.0 + bar_width * snapshot.progress(), bar_y + 12.0),
        fill: PROGRESS,
    });

    // nitro bar
    let nitro_y = viewport.height - 56.0;
    let nitro_frac = (snapshot.nitro / 100.0).max(0.0).min(1.0);
    primitives.push(Primitive::RectFilled {
        min: p(16.0, nitro_y),
        max: p(236.0, nitro_y + 12.0),
        fill: BAR_BACKGROUND,
    });
    primitives.push(Primitive::RectFilled {
        min: p(16.0, nitro_y),
        max: p(16.0 + 220.0 * nitro_frac, nitro_y + 12.0),
        fill: NITRO,
    });
    primitives.push(Primitive::RectStroke {
        min: p(16.0, nitro_y),
        max: p(236.0, nitro_y + 12.0),
        width: 1.0,
        color: NITRO,
    });

    // warnings
    if snapshot.off_track {
        primitives.push(text(
            340.0,
            40.0,
            String::from("OFF TRACK"),
            TextSize::Heading,
            WARNING,
        ));
    } else if snapshot.slipping {
        primitives.push(text(
            340.0,
            40.0,
            String::from("TOO FAST FOR THIS CURVE"),
            TextSize::Heading,
            HINT,
        ));
    }

    if snapshot.phase == RacePhase::Running {
        return;
    }

    let banner_text = match banner {
        Some(Banner::Ready) => String::from("Press W / Up / Space to start"),
        Some(Banner::Finished(outcome)) => format!(
            "Finished in {} - Enter: new race, R: reset",
            outcome.format_time()
        ),
        Some(Banner::Dnf(elapsed_ms)) => format!(
            "DNF after {} - Enter: new race, R: reset",
            format_time_ms(elapsed_ms)
        ),
        None => return,
    };
    primitives.push(text(
        28.0,
        160.0,
        banner_text,
        TextSize::Heading,
        HINT,
    ));
}
