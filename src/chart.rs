//! Regression charts.
//!
//! The interpreter only decides whether a chart is drawn and for which
//! columns. Drawing goes through [`ChartRenderer`]; the default
//! [`PngChartRenderer`] paints a scatter plot with the fitted line onto a
//! `tiny-skia` pixmap and encodes it as PNG.

use thiserror::Error;
use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no complete observations to plot")]
    EmptyData,

    #[error("cannot allocate a {width}x{height} chart")]
    InvalidSize { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// A scatter of `(x, y)` points with the line `y = intercept + slope * x`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub intercept: f64,
    pub slope: f64,
}

pub trait ChartRenderer {
    /// Encoded image bytes.
    fn render(&self, chart: &ScatterChart) -> Result<Vec<u8>, ChartError>;
}

#[derive(Debug, Clone, Copy)]
pub struct PngChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        PngChartRenderer {
            width: 640,
            height: 480,
        }
    }
}

const MARGIN: f32 = 40.0;
const POINT_RADIUS: f32 = 3.0;

const AXIS: [u8; 3] = [60, 60, 60];
const POINT: [u8; 3] = [31, 119, 180];
const FIT: [u8; 3] = [214, 39, 40];

impl ChartRenderer for PngChartRenderer {
    fn render(&self, chart: &ScatterChart) -> Result<Vec<u8>, ChartError> {
        let pixmap = self.paint(chart)?;
        tracing::debug!(
            x = %chart.x_label,
            y = %chart.y_label,
            points = chart.points.len(),
            "rendered regression chart"
        );
        Ok(pixmap.encode_png()?)
    }
}

impl PngChartRenderer {
    /// Axes, then the fitted line, then the points on top.
    fn paint(&self, chart: &ScatterChart) -> Result<Pixmap, ChartError> {
        let points: Vec<(f64, f64)> = chart
            .points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if points.is_empty() {
            return Err(ChartError::EmptyData);
        }

        let mut pixmap = Pixmap::new(self.width, self.height).ok_or(ChartError::InvalidSize {
            width: self.width,
            height: self.height,
        })?;
        pixmap.fill(Color::WHITE);

        let x_domain = padded_extent(points.iter().map(|p| p.0));
        let line_y = [
            chart.intercept + chart.slope * x_domain.0,
            chart.intercept + chart.slope * x_domain.1,
        ];
        let y_domain = padded_extent(
            points
                .iter()
                .map(|p| p.1)
                .chain(line_y.into_iter().filter(|y| y.is_finite())),
        );

        let width = self.width as f32;
        let height = self.height as f32;
        let (left, right) = (MARGIN, width - MARGIN);
        let (top, bottom) = (MARGIN, height - MARGIN);
        let x_scale = LinearScale::new(x_domain, (left, right));
        // pixel rows grow downwards
        let y_scale = LinearScale::new(y_domain, (bottom, top));

        let axes = polyline(&[(left, top), (left, bottom), (right, bottom)]);
        stroke(&mut pixmap, axes, AXIS, 1.0);

        if line_y.iter().all(|y| y.is_finite()) {
            let fit = polyline(&[
                (x_scale.map(x_domain.0), y_scale.map(line_y[0])),
                (x_scale.map(x_domain.1), y_scale.map(line_y[1])),
            ]);
            stroke(&mut pixmap, fit, FIT, 2.0);
        }

        let fill = paint(POINT);
        for (x, y) in &points {
            let disc = PathBuilder::from_circle(x_scale.map(*x), y_scale.map(*y), POINT_RADIUS);
            if let Some(disc) = disc {
                pixmap.fill_path(&disc, &fill, FillRule::Winding, Transform::identity(), None);
            }
        }

        Ok(pixmap)
    }
}

fn paint(rgb: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], 255);
    paint.anti_alias = true;
    paint
}

fn polyline(points: &[(f32, f32)]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.0, first.1);
    for (x, y) in rest {
        builder.line_to(*x, *y);
    }
    builder.finish()
}

fn stroke(pixmap: &mut Pixmap, path: Option<Path>, rgb: [u8; 3], width: f32) {
    let Some(path) = path else {
        return;
    };
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint(rgb), &stroke, Transform::identity(), None);
}

/// Min and max widened by 5% so points do not sit on the axes.
fn padded_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let span = max - min;
    if span == 0.0 {
        return (min - 1.0, max + 1.0);
    }
    (min - span * 0.05, max + span * 0.05)
}

/// Maps a domain interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        LinearScale { domain, range }
    }

    fn map(&self, x: f64) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = (f64::from(self.range.0), f64::from(self.range.1));
        let denom = d1 - d0;
        if denom == 0.0 {
            return self.range.0;
        }
        (r0 + (x - d0) / denom * (r1 - r0)) as f32
    }
}
