// src/renderer.rs

use crate::error::RenderError;
use crate::model::*;
use image::{Rgb, RgbImage};
use indicatif::{ParallelProgressIterator, ProgressBar};
use palette::{FromColor, Lch, Srgb};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const MARGIN: u32 = 40;
const GRID_LINES: u32 = 5;
const SWATCH: i64 = 12;
const BACKGROUND: Rgb<u8> = Rgb([8, 8, 12]);
const AXIS: Rgb<u8> = Rgb([140, 140, 150]);
const GRID: Rgb<u8> = Rgb([32, 32, 40]);

/// One plotted line
#[derive(Debug, Clone)]
pub struct Line {
    pub label: &'static str,
    pub color: Rgb<u8>,
    pub points: Vec<(Day, usize)>,
}

impl Line {
    pub fn from_series(label: &'static str, color: Rgb<u8>, series: &DaySeries) -> Self {
        Self { label, color, points: series.iter().collect() }
    }
}

#[derive(Debug, Clone)]
pub struct Chart {
    pub title: &'static str,
    pub path: PathBuf,
    pub lines: Vec<Line>,
}

/// Image size and the inclusive day range shown on the x axis
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub first_day: Day,
    pub last_day: Day,
}

/// Where each of the four charts is written
#[derive(Debug, Clone)]
pub struct ChartPaths {
    pub open: PathBuf,
    pub closed: PathBuf,
    pub spoiled: PathBuf,
    pub joint: PathBuf,
}

pub fn open_color() -> Rgb<u8> {
    lch_to_rgb(Lch::new(55.0f32, 70.0f32, 270.0f32))
}

pub fn closed_color() -> Rgb<u8> {
    lch_to_rgb(Lch::new(55.0f32, 80.0f32, 30.0f32))
}

pub fn spoiled_color() -> Rgb<u8> {
    lch_to_rgb(Lch::new(70.0f32, 70.0f32, 135.0f32))
}

/// The open, closed, spoiled and joint charts for a report.
pub fn report_charts(report: &TimelineReport, paths: &ChartPaths) -> Vec<Chart> {
    let open = Line::from_series("Open Issues", open_color(), &report.open);
    let closed = Line::from_series("Closed Issues", closed_color(), &report.closed);
    let spoiled = Line::from_series("Spoiled Issues", spoiled_color(), &report.spoiled_series());

    vec![
        Chart { title: "Number of Open Issues Per Day", path: paths.open.clone(), lines: vec![open.clone()] },
        Chart { title: "Number of Closed Issues Per Day", path: paths.closed.clone(), lines: vec![closed.clone()] },
        Chart { title: "Number of Spoiled Issues Per Day", path: paths.spoiled.clone(), lines: vec![spoiled.clone()] },
        Chart { title: "Number of Issues Per Day", path: paths.joint.clone(), lines: vec![open, closed, spoiled] },
    ]
}

/// Render every chart in parallel.
pub fn render_charts(charts: &[Chart], layout: Layout) -> Result<(), RenderError> {
    let bar = ProgressBar::new(charts.len() as u64);
    bar.set_message("Rendering charts");
    charts
        .par_iter()
        .progress_with(bar)
        .try_for_each(|chart| render_chart(chart, layout))
}

pub fn render_chart(chart: &Chart, layout: Layout) -> Result<(), RenderError> {
    if let Some(dir) = chart.path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| RenderError::Io { path: chart.path.clone(), source })?;
    }
    let image = draw_chart(chart, layout);
    image
        .save(&chart.path)
        .map_err(|source| RenderError::Image { path: chart.path.clone(), source })?;
    let legend: Vec<&str> = chart.lines.iter().map(|l| l.label).collect();
    debug!(title = chart.title, ?legend, path = %chart.path.display(), "rendered chart");
    Ok(())
}

/// Draw `chart` into a fresh image without touching the filesystem.
pub fn draw_chart(chart: &Chart, layout: Layout) -> RgbImage {
    let mut image = RgbImage::from_pixel(layout.width, layout.height, BACKGROUND);
    let plot = PlotArea::new(layout, y_max(chart, layout));

    for i in 1..=GRID_LINES {
        let y = plot.bottom - (plot.bottom - plot.top) * i64::from(i) / i64::from(GRID_LINES);
        draw_line(&mut image, (plot.left, y), (plot.right, y), GRID);
    }
    draw_line(&mut image, (plot.left, plot.top), (plot.left, plot.bottom), AXIS);
    draw_line(&mut image, (plot.left, plot.bottom), (plot.right, plot.bottom), AXIS);

    for line in &chart.lines {
        let visible: Vec<(i64, i64)> = line
            .points
            .iter()
            .filter(|(day, _)| (layout.first_day..=layout.last_day).contains(day))
            .map(|&(day, count)| plot.project(day, count))
            .collect();
        if let [only] = visible.as_slice() {
            draw_line(&mut image, *only, *only, line.color);
        }
        for pair in visible.windows(2) {
            draw_line(&mut image, pair[0], pair[1], line.color);
            // second pass one pixel lower for a 2px stroke
            draw_line(&mut image, (pair[0].0, pair[0].1 + 1), (pair[1].0, pair[1].1 + 1), line.color);
        }
    }

    // legend: one swatch per line, stacked down the top-right corner of the plot
    if chart.lines.len() > 1 {
        for (slot, line) in chart.lines.iter().enumerate() {
            let (x, y) = plot.legend_slot(slot);
            for dy in 0..SWATCH {
                draw_line(&mut image, (x, y + dy), (x + SWATCH - 1, y + dy), line.color);
            }
        }
    }
    image
}

fn y_max(chart: &Chart, layout: Layout) -> usize {
    chart
        .lines
        .iter()
        .flat_map(|l| l.points.iter())
        .filter(|(day, _)| (layout.first_day..=layout.last_day).contains(day))
        .map(|&(_, count)| count)
        .max()
        .unwrap_or(0)
        .max(1)
}

struct PlotArea {
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
    first_day: i128,
    day_span: i128,
    y_max: i64,
}

impl PlotArea {
    fn new(layout: Layout, y_max: usize) -> Self {
        let margin_x = MARGIN.min(layout.width / 4);
        let margin_y = MARGIN.min(layout.height / 4);
        let left = i64::from(margin_x);
        let top = i64::from(margin_y);
        Self {
            left,
            right: (i64::from(layout.width) - i64::from(margin_x)).max(left + 1),
            top,
            bottom: (i64::from(layout.height) - i64::from(margin_y)).max(top + 1),
            first_day: i128::from(layout.first_day),
            // i128 so that extreme user bounds cannot overflow
            day_span: (i128::from(layout.last_day) - i128::from(layout.first_day)).max(1),
            y_max: i64::try_from(y_max).unwrap_or(i64::MAX),
        }
    }

    fn project(&self, day: Day, count: usize) -> (i64, i64) {
        let count = i128::from(i64::try_from(count).unwrap_or(i64::MAX).min(self.y_max));
        let width = i128::from(self.right - self.left);
        let height = i128::from(self.bottom - self.top);
        let dx = (i128::from(day) - self.first_day) * width / self.day_span;
        let dy = count * height / i128::from(self.y_max);
        let x = self.left + i64::try_from(dx).unwrap_or(i64::MAX / 2).min(i64::MAX / 2);
        let y = self.bottom - i64::try_from(dy).unwrap_or(0);
        (x, y)
    }

    /// Top-left corner of the `slot`-th legend swatch
    fn legend_slot(&self, slot: usize) -> (i64, i64) {
        let slot = i64::try_from(slot).unwrap_or(0);
        (self.right - SWATCH - 4, self.top + 4 + slot * (SWATCH + 4))
    }
}

// Bresenham; pixels outside the image are dropped
fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) {
            if px < image.width() && py < image.height() {
                image.put_pixel(px, py, color);
            }
        }
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn lch_to_rgb(color: Lch) -> Rgb<u8> {
    let srgb: Srgb<f32> = Srgb::from_color(color);
    let (r, g, b) = srgb.into_components();
    Rgb([
        (r.clamp(0.0, 1.0) * 255.0f32) as u8,
        (g.clamp(0.0, 1.0) * 255.0f32) as u8,
        (b.clamp(0.0, 1.0) * 255.0f32) as u8,
    ])
}

/// True if `path` names a file the image encoder can write.
pub fn is_supported_image(path: &Path) -> bool {
    image::ImageFormat::from_path(path).is_ok()
}
