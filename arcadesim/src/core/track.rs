use anyhow::Context;
use helpers::geometry::{Point2d, Vector2d};
use serde::Deserialize;
use std::f64::consts::FRAC_PI_2;
use std::fs::OpenOptions;
use std::path::Path;

/// * `len` - (m) Length of the segment
/// * `kappa` - (1/m) Constant curvature of the segment (positive: left turn, negative: right turn,
/// zero: straight)
/// * `vmax` - (m/s) Suggested maximum speed in the segment, exceeding it in a curve is penalized
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SegmentPars {
    pub len: f64,
    pub kappa: f64,
    pub vmax: f64,
}

/// * `name` - Track name
/// * `ds` - (m) Sampling step size of the path
/// * `half_width` - (m) Half width of the track (distance between centerline and boundary)
/// * `margin` - (m) Distance to the boundary at which the car is considered off-track
/// * `segments` - Ordered list of curvature segments the track consists of
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrackPars {
    pub name: String,
    pub ds: f64,
    pub half_width: f64,
    pub margin: f64,
    pub segments: Vec<SegmentPars>,
}

impl Default for TrackPars {
    fn default() -> Self {
        let seg = |len: f64, kappa: f64, vmax: f64| SegmentPars { len, kappa, vmax };

        TrackPars {
            name: String::from("Sprint"),
            ds: 5.0,
            half_width: 12.0,
            margin: 2.0,
            segments: vec![
                seg(200.0, 0.0, 80.0),
                seg(180.0, 0.006, 55.0),
                seg(140.0, 0.0, 80.0),
                seg(200.0, -0.007, 52.0),
                seg(160.0, 0.0, 80.0),
                seg(220.0, 0.004, 62.0),
                seg(200.0, 0.0, 80.0),
            ],
        }
    }
}

/// Track file row, see input/tracks.
#[derive(Debug, Deserialize)]
struct CsvSegment {
    len_m: f64,
    kappa_1pm: f64,
    vmax_mps: f64,
}

/// read_segments_csv reads the curvature segments of a track from a CSV file with the columns
/// `len_m`, `kappa_1pm`, and `vmax_mps`.
pub fn read_segments_csv(trackfile_path: &Path) -> anyhow::Result<Vec<SegmentPars>> {
    let fh = OpenOptions::new()
        .read(true)
        .open(trackfile_path)
        .context(format!(
            "Failed to open track file {}!",
            trackfile_path.display()
        ))?;

    let mut csv_reader = csv::Reader::from_reader(&fh);
    let mut segments = vec![];

    for result in csv_reader.deserialize() {
        let csv_segment: CsvSegment = result.context(format!(
            "Failed to parse track file {}!",
            trackfile_path.display()
        ))?;
        segments.push(SegmentPars {
            len: csv_segment.len_m,
            kappa: csv_segment.kappa_1pm,
            vmax: csv_segment.vmax_mps,
        });
    }

    Ok(segments)
}

/// PathPoint is a sample of the track centerline. It covers the track interval [s, s + ds) and
/// carries the heading and curvature of that interval.
#[derive(Debug, Clone)]
pub struct PathPoint {
    pub s: f64,
    pub coords: Point2d,
    pub theta: f64,
    pub kappa: f64,
    pub vmax: f64,
}

impl PathPoint {
    /// Left-hand normal vector of the path at this point, lateral offsets are measured along it.
    pub fn normal_vector(&self) -> Vector2d {
        Vector2d::from_heading(self.theta).normal_vector()
    }
}

#[derive(Debug)]
pub struct Track {
    pub name: String,
    pub ds: f64,
    pub half_width: f64,
    pub margin: f64,
    pub length: f64,
    pub path: Vec<PathPoint>,
    pub finish_coords: Point2d,
}

impl Track {
    /// Samples the segments every ds meters. Heading starts at pi/2 and is integrated with
    /// dtheta/ds = kappa. Segments shorter than ds do not produce samples, a non-positive ds
    /// yields an empty track.
    pub fn new(track_pars: &TrackPars) -> Track {
        let ds = track_pars.ds;
        let mut path = Vec::new();
        let mut theta = FRAC_PI_2;
        let mut pos = Vector2d { dx: 0.0, dy: 0.0 };
        let mut s = 0.0;

        let segments = if ds > 0.0 {
            track_pars.segments.as_slice()
        } else {
            &[]
        };

        for seg in segments.iter() {
            let no_steps = (seg.len / ds).floor() as usize;

            for _ in 0..no_steps {
                theta += seg.kappa * ds;
                path.push(PathPoint {
                    s,
                    coords: pos.as_point2d(),
                    theta,
                    kappa: seg.kappa,
                    vmax: seg.vmax,
                });
                pos = pos.add(&Vector2d::from_heading(theta).mult(ds));
                s += ds;
            }
        }

        Track {
            name: track_pars.name.to_owned(),
            ds,
            half_width: track_pars.half_width,
            margin: track_pars.margin,
            length: s,
            path,
            finish_coords: pos.as_point2d(),
        }
    }

    /// Maximum absolute lateral offset before the car is clamped and considered off-track.
    pub fn lateral_limit(&self) -> f64 {
        self.half_width - self.margin
    }

    /// The method returns the index of the path point that covers the distance s (clamped to the
    /// first and last point).
    pub fn get_point_idx(&self, s: f64) -> usize {
        if self.path.is_empty() || !(s > 0.0) {
            return 0;
        }
        ((s / self.ds) as usize).min(self.path.len() - 1)
    }

    pub fn get_point(&self, s: f64) -> Option<&PathPoint> {
        self.path.get(self.get_point_idx(s))
    }

    /// The method returns the path points covering [s, s + lookahead].
    pub fn points_ahead(&self, s: f64, lookahead: f64) -> impl Iterator<Item = &PathPoint> {
        let start_idx = self.get_point_idx(s);
        let end_idx = self.get_point_idx(s + lookahead.max(0.0));
        let end_idx = if self.path.is_empty() { 0 } else { end_idx + 1 };
        self.path[start_idx.min(end_idx)..end_idx].iter()
    }
}
