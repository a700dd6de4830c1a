//! Histogram charts of simulated returns, rendered to an RGBA raster and
//! encoded as PNG (static) or as an APNG or GIF animation (progressive).
//!
//! Layout follows a classic overlaid-histogram plot: two translucent bar
//! sets, dashed vertical markers at each series mean, a light grid, tick
//! values, a title with axis labels and a labelled legend in the upper right.

use crate::report::glyphs;
use crate::report::ReportError;
use crate::simulation::returns::{mean, ReturnSeries};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

type Rgb = [u8; 3];

const WHITE: Rgb = [255, 255, 255];
const BLACK: Rgb = [0, 0, 0];
const GRID: Rgb = [176, 176, 176];
const PORTFOLIO_BAR: Rgb = [31, 119, 180];
const BENCHMARK_BAR: Rgb = [255, 127, 14];
const PORTFOLIO_MEAN: Rgb = [0, 0, 255];
const BENCHMARK_MEAN: Rgb = [255, 165, 0];

const BAR_ALPHA: f32 = 0.5;
const MARGIN_LEFT: u32 = 80;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_TOP: u32 = 50;
const MARGIN_BOTTOM: u32 = 60;
const GRID_LINES: u32 = 5;
const TITLE_SCALE: u32 = 2;
const LABEL_SCALE: u32 = 2;
const TICK_SCALE: u32 = 1;
#[cfg(feature = "gif")]
const GIF_QUANTIZE_SPEED: i32 = 20;

/// Title of the static chart; animation frames append `(Frame N)`.
pub const CHART_TITLE: &str = "Simulated Returns Distribution";
pub const X_LABEL: &str = "Returns";
pub const Y_LABEL: &str = "Frequency";
pub const PORTFOLIO_LABEL: &str = "Portfolio Returns";
pub const BENCHMARK_LABEL: &str = "Benchmark Returns";

/// Title of the animation frame showing the first `prefix` samples.
pub fn frame_title(prefix: usize) -> String {
    format!("{} (Frame {})", CHART_TITLE, prefix)
}

/// Chart geometry and binning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub bins: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            bins: 30,
        }
    }
}

/// Container format for the progressive animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationFormat {
    /// Animated PNG, encoded in-process.
    Apng,
    /// GIF, available with the `gif` feature. Without it a request reports
    /// the backend as unavailable.
    Gif,
}

impl std::fmt::Display for AnimationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimationFormat::Apng => write!(f, "apng"),
            AnimationFormat::Gif => write!(f, "gif"),
        }
    }
}

/// Frame schedule for the progressive animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub format: AnimationFormat,
    /// Prefix growth per frame; the first frame shows this many samples.
    pub frame_step: usize,
    pub fps: u16,
    /// Number of times to play; 0 loops forever.
    pub plays: u32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            format: AnimationFormat::Apng,
            frame_step: 10,
            fps: 10,
            plays: 1,
        }
    }
}

impl AnimationSettings {
    /// Prefix lengths drawn for a series of `len` samples: `step, 2·step, …`
    /// strictly below `len`.
    pub fn frame_prefixes(&self, len: usize) -> Vec<usize> {
        if self.frame_step == 0 {
            return Vec::new();
        }
        (self.frame_step..len).step_by(self.frame_step).collect()
    }
}

/// Result of an animation save request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnimationOutcome {
    Saved { path: PathBuf, frames: usize },
    BackendUnavailable {
        format: AnimationFormat,
        reason: String,
    },
}

/// Equal-width histogram over the sample range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bin `samples` into `bins` equal-width bins spanning `[min, max]`.
    ///
    /// The last bin is closed on the right. A constant sample set is centred
    /// in a unit-wide range; an empty one spans `[0, 1]`.
    pub fn from_samples(samples: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (lo, hi) = match finite_range(samples) {
            Some((lo, hi)) if lo < hi => (lo, hi),
            Some((v, _)) => (v - 0.5, v + 0.5),
            None => (0.0, 1.0),
        };
        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0; bins];
        for &x in samples.iter().filter(|x| x.is_finite()) {
            let idx = (((x - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Self { edges, counts }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    fn range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }
}

fn finite_range(samples: &[f64]) -> Option<(f64, f64)> {
    samples
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .fold(None, |acc, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
}

/// An RGBA8 raster with a white background.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = [WHITE[0], WHITE[1], WHITE[2], 255]
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgb, alpha: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        for (c, &src) in color.iter().enumerate() {
            let dst = self.pixels[i + c] as f32;
            self.pixels[i + c] = (src as f32 * alpha + dst * (1.0 - alpha)).round() as u8;
        }
    }

    /// Fill the half-open rectangle `[x0, x1) × [y0, y1)`.
    fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb, alpha: f32) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.blend(x, y, color, alpha);
            }
        }
    }

    fn hline(&mut self, x0: u32, x1: u32, y: u32, color: Rgb) {
        self.fill_rect(x0, y, x1 + 1, y + 1, color, 1.0);
    }

    fn vline(&mut self, x: u32, y0: u32, y1: u32, color: Rgb) {
        self.fill_rect(x, y0, x + 1, y1 + 1, color, 1.0);
    }

    fn dashed_vline(&mut self, x: u32, y0: u32, y1: u32, color: Rgb) {
        for y in y0..=y1 {
            // 6 on, 4 off
            if (y - y0) % 10 < 6 {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`. Pixels falling off
    /// the canvas are dropped.
    fn text(&mut self, x: u32, y: u32, text: &str, scale: u32, color: Rgb) {
        for (dx, dy) in glyphs::lit_pixels(text, scale) {
            self.blend(x + dx, y + dy, color, 1.0);
        }
    }

    /// Draw `text` turned a quarter counter-clockwise, reading bottom to top,
    /// inside the box whose top-left corner is `(x, y)`.
    fn text_vertical(&mut self, x: u32, y: u32, text: &str, scale: u32, color: Rgb) {
        let length = glyphs::text_width(text, scale);
        for (dx, dy) in glyphs::lit_pixels(text, scale) {
            self.blend(x + dy, y + (length - 1 - dx), color, 1.0);
        }
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn write_png<W: Write>(&self, out: W) -> Result<(), ReportError> {
        let mut encoder = png::Encoder::new(out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;
        Ok(())
    }
}

/// Plot-area geometry and data-to-pixel mapping.
struct Frame {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
    x_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Frame {
    fn x(&self, value: f64) -> u32 {
        let t = ((value - self.x_min) / (self.x_max - self.x_min)).clamp(0.0, 1.0);
        self.left + (t * (self.right - self.left) as f64).round() as u32
    }

    fn y(&self, count: f64) -> u32 {
        let t = (count / self.y_max).clamp(0.0, 1.0);
        self.bottom - (t * (self.bottom - self.top) as f64).round() as u32
    }
}

fn check_size(style: &ChartStyle) -> Result<(), ReportError> {
    if style.width <= MARGIN_LEFT + MARGIN_RIGHT + 10 || style.height <= MARGIN_TOP + MARGIN_BOTTOM + 10
    {
        return Err(ReportError::CanvasTooSmall {
            width: style.width,
            height: style.height,
        });
    }
    Ok(())
}

/// Draw overlaid histograms of the portfolio and benchmark samples under
/// `title`.
///
/// Each series is binned over its own range; the x axis spans both.
pub fn render_distribution(
    portfolio: &[f64],
    benchmark: &[f64],
    style: &ChartStyle,
    title: &str,
) -> Canvas {
    let mut canvas = Canvas::new(style.width, style.height);
    if check_size(style).is_err() {
        return canvas;
    }
    let portfolio_hist = Histogram::from_samples(portfolio, style.bins);
    let benchmark_hist = Histogram::from_samples(benchmark, style.bins);

    let (p_lo, p_hi) = portfolio_hist.range();
    let (b_lo, b_hi) = benchmark_hist.range();
    let (x_lo, x_hi) = (p_lo.min(b_lo), p_hi.max(b_hi));
    let pad = (x_hi - x_lo) * 0.05;
    let peak = portfolio_hist.max_count().max(benchmark_hist.max_count()).max(1);

    let frame = Frame {
        left: MARGIN_LEFT,
        right: style.width - MARGIN_RIGHT,
        top: MARGIN_TOP,
        bottom: style.height - MARGIN_BOTTOM,
        x_min: x_lo - pad,
        x_max: x_hi + pad,
        y_max: peak as f64 * 1.05,
    };

    for i in 0..=GRID_LINES {
        let gx = frame.left + (frame.right - frame.left) * i / GRID_LINES;
        let gy = frame.top + (frame.bottom - frame.top) * i / GRID_LINES;
        canvas.vline(gx, frame.top, frame.bottom, GRID);
        canvas.hline(frame.left, frame.right, gy, GRID);
    }

    draw_bars(&mut canvas, &frame, &portfolio_hist, PORTFOLIO_BAR);
    draw_bars(&mut canvas, &frame, &benchmark_hist, BENCHMARK_BAR);

    if !portfolio.is_empty() {
        canvas.dashed_vline(frame.x(mean(portfolio)), frame.top, frame.bottom, PORTFOLIO_MEAN);
    }
    if !benchmark.is_empty() {
        canvas.dashed_vline(frame.x(mean(benchmark)), frame.top, frame.bottom, BENCHMARK_MEAN);
    }

    // Axis frame
    canvas.hline(frame.left, frame.right, frame.top, BLACK);
    canvas.hline(frame.left, frame.right, frame.bottom, BLACK);
    canvas.vline(frame.left, frame.top, frame.bottom, BLACK);
    canvas.vline(frame.right, frame.top, frame.bottom, BLACK);

    draw_ticks(&mut canvas, &frame);
    draw_captions(&mut canvas, &frame, style, title);
    draw_legend(&mut canvas, &frame);
    canvas
}

fn draw_bars(canvas: &mut Canvas, frame: &Frame, hist: &Histogram, color: Rgb) {
    let edges = hist.edges();
    for (i, &count) in hist.counts().iter().enumerate() {
        if count == 0 {
            continue;
        }
        let x0 = frame.x(edges[i]);
        let x1 = frame.x(edges[i + 1]).max(x0 + 1);
        let y0 = frame.y(count as f64);
        canvas.fill_rect(x0, y0, x1, frame.bottom, color, BAR_ALPHA);
    }
}

/// Values under each vertical grid line and counts beside each horizontal one.
fn draw_ticks(canvas: &mut Canvas, frame: &Frame) {
    let glyph_height = glyphs::GLYPH_HEIGHT * TICK_SCALE;
    for i in 0..=GRID_LINES {
        let gx = frame.left + (frame.right - frame.left) * i / GRID_LINES;
        let value = frame.x_min + (frame.x_max - frame.x_min) * f64::from(i) / f64::from(GRID_LINES);
        let label = format!("{:.2}", value);
        let half = glyphs::text_width(&label, TICK_SCALE) / 2;
        canvas.text(gx.saturating_sub(half), frame.bottom + 8, &label, TICK_SCALE, BLACK);

        let gy = frame.top + (frame.bottom - frame.top) * i / GRID_LINES;
        let count = frame.y_max * f64::from(GRID_LINES - i) / f64::from(GRID_LINES);
        let label = format!("{:.0}", count);
        let width = glyphs::text_width(&label, TICK_SCALE);
        canvas.text(
            frame.left.saturating_sub(width + 6),
            gy.saturating_sub(glyph_height / 2),
            &label,
            TICK_SCALE,
            BLACK,
        );
    }
}

/// Title centred above the plot, x label below the ticks, y label turned
/// along the left edge.
fn draw_captions(canvas: &mut Canvas, frame: &Frame, style: &ChartStyle, title: &str) {
    let title_width = glyphs::text_width(title, TITLE_SCALE);
    let title_height = glyphs::GLYPH_HEIGHT * TITLE_SCALE;
    canvas.text(
        style.width.saturating_sub(title_width) / 2,
        MARGIN_TOP.saturating_sub(title_height) / 2,
        title,
        TITLE_SCALE,
        BLACK,
    );

    let plot_mid_x = (frame.left + frame.right) / 2;
    let x_label_width = glyphs::text_width(X_LABEL, LABEL_SCALE);
    canvas.text(
        plot_mid_x.saturating_sub(x_label_width / 2),
        frame.bottom + 28,
        X_LABEL,
        LABEL_SCALE,
        BLACK,
    );

    let plot_mid_y = (frame.top + frame.bottom) / 2;
    let y_label_length = glyphs::text_width(Y_LABEL, LABEL_SCALE);
    canvas.text_vertical(
        12,
        plot_mid_y.saturating_sub(y_label_length / 2),
        Y_LABEL,
        LABEL_SCALE,
        BLACK,
    );
}

fn draw_legend(canvas: &mut Canvas, frame: &Frame) {
    let label_width = glyphs::text_width(PORTFOLIO_LABEL, 1).max(glyphs::text_width(BENCHMARK_LABEL, 1));
    let box_width = 8 + 34 + 6 + label_width + 8;
    let x0 = frame.right.saturating_sub(box_width + 10);
    let y0 = frame.top + 10;
    canvas.fill_rect(x0, y0, x0 + box_width, y0 + 40, WHITE, 0.8);
    canvas.hline(x0, x0 + box_width, y0, GRID);
    canvas.hline(x0, x0 + box_width, y0 + 40, GRID);
    canvas.vline(x0, y0, y0 + 40, GRID);
    canvas.vline(x0 + box_width, y0, y0 + 40, GRID);
    canvas.fill_rect(x0 + 8, y0 + 8, x0 + 42, y0 + 16, PORTFOLIO_BAR, BAR_ALPHA);
    canvas.fill_rect(x0 + 8, y0 + 24, x0 + 42, y0 + 32, BENCHMARK_BAR, BAR_ALPHA);
    canvas.text(x0 + 48, y0 + 9, PORTFOLIO_LABEL, 1, BLACK);
    canvas.text(x0 + 48, y0 + 25, BENCHMARK_LABEL, 1, BLACK);
}

fn create(path: &Path) -> Result<BufWriter<File>, ReportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Render the full blended-vs-benchmark histogram and write it as PNG.
pub fn save_chart(series: &ReturnSeries, style: &ChartStyle, path: &Path) -> Result<(), ReportError> {
    check_size(style)?;
    let canvas = render_distribution(series.blended(), series.benchmark(), style, CHART_TITLE);
    canvas.write_png(create(path)?)?;
    log::info!("chart written to {}", path.display());
    Ok(())
}

/// Render one frame per growing prefix of the series and save them as an
/// animation titled with the prefix length.
///
/// A format whose encoder is not compiled in yields
/// [`AnimationOutcome::BackendUnavailable`] and writes nothing.
pub fn save_animation(
    series: &ReturnSeries,
    style: &ChartStyle,
    settings: &AnimationSettings,
    path: &Path,
) -> Result<AnimationOutcome, ReportError> {
    if let Some(reason) = unavailable_reason(settings.format) {
        return Ok(AnimationOutcome::BackendUnavailable {
            format: settings.format,
            reason,
        });
    }
    check_size(style)?;

    let prefixes = settings.frame_prefixes(series.len());
    if prefixes.is_empty() {
        return Err(ReportError::EmptyAnimation {
            len: series.len(),
            step: settings.frame_step,
        });
    }

    let frames = prefixes.iter().map(|&end| {
        render_distribution(
            &series.blended()[..end],
            &series.benchmark()[..end],
            style,
            &frame_title(end),
        )
    });
    match settings.format {
        #[cfg(feature = "gif")]
        AnimationFormat::Gif => write_gif(frames, style, settings, path)?,
        _ => write_apng(frames, prefixes.len(), style, settings, path)?,
    }

    log::info!(
        "{} animation with {} frames written to {}",
        settings.format,
        prefixes.len(),
        path.display()
    );
    Ok(AnimationOutcome::Saved {
        path: path.to_path_buf(),
        frames: prefixes.len(),
    })
}

#[cfg(feature = "gif")]
fn unavailable_reason(_format: AnimationFormat) -> Option<String> {
    None
}

#[cfg(not(feature = "gif"))]
fn unavailable_reason(format: AnimationFormat) -> Option<String> {
    (format == AnimationFormat::Gif)
        .then(|| "built without the `gif` feature; use \"apng\" or rebuild with it".to_string())
}

fn write_apng(
    frames: impl Iterator<Item = Canvas>,
    count: usize,
    style: &ChartStyle,
    settings: &AnimationSettings,
    path: &Path,
) -> Result<(), ReportError> {
    let mut encoder = png::Encoder::new(create(path)?, style.width, style.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_animated(count as u32, settings.plays)?;
    encoder.set_frame_delay(1, settings.fps.max(1))?;
    let mut writer = encoder.write_header()?;
    for canvas in frames {
        writer.write_image_data(canvas.pixels())?;
    }
    writer.finish()?;
    Ok(())
}

#[cfg(feature = "gif")]
fn write_gif(
    frames: impl Iterator<Item = Canvas>,
    style: &ChartStyle,
    settings: &AnimationSettings,
    path: &Path,
) -> Result<(), ReportError> {
    let too_large = || ReportError::TooLargeForGif {
        width: style.width,
        height: style.height,
    };
    let width = u16::try_from(style.width).map_err(|_| too_large())?;
    let height = u16::try_from(style.height).map_err(|_| too_large())?;

    let mut encoder = gif::Encoder::new(create(path)?, width, height, &[])?;
    // Without a loop extension viewers play the sequence once
    match settings.plays {
        0 => encoder.set_repeat(gif::Repeat::Infinite)?,
        1 => {}
        n => encoder.set_repeat(gif::Repeat::Finite(
            u16::try_from(n - 1).unwrap_or(u16::MAX),
        ))?,
    }
    // Hundredths of a second
    let delay = (100 / settings.fps.max(1)).max(1);
    for canvas in frames {
        let mut pixels = canvas.into_pixels();
        let mut frame = gif::Frame::from_rgba_speed(width, height, &mut pixels, GIF_QUANTIZE_SPEED);
        frame.delay = delay;
        encoder.write_frame(&frame)?;
    }
    encoder
        .into_inner()
        .and_then(|mut out| out.flush())
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
}
