//! Figure rendering
//!
//! Each scorer configuration becomes one cell of a grid: a scatter of
//! bitscore against mismatch count (misses stacked below zero in a second
//! color) with the per-level match rate drawn on a secondary axis. Cells
//! are buffered until every sweep has finished, so a failed run never
//! leaves a partial figure on disk.

use anyhow::{bail, Context, Result};
use ordered_float::OrderedFloat;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;

use crate::grid::{EdgeFlags, GridLayout};
use crate::sampler::{SampleSet, SweepParams, ZERO_SCALE};
use crate::sensitivity::ScorerConfig;

/// Figure size in pixels
pub const FIGURE_SIZE: (u32, u32) = (1200, 900);

/// steelblue
pub const MATCH_COLOR: RGBColor = RGBColor(70, 130, 180);
/// tomato
pub const MISS_COLOR: RGBColor = RGBColor(255, 99, 71);
pub const RATE_COLOR: RGBColor = RGBColor(31, 119, 180);

const X_DESC: &str = "AA mismatches";
const Y_DESC: &str = "DIAMOND bitscore";
const RATE_DESC: &str = "DIAMOND match detection rate";

const TITLE_HEIGHT: u32 = 90;

/// Pixels per typographic point at the figure's 100 dpi
const PX_PER_PT: f64 = 100.0 / 72.0;

#[derive(Debug, Clone, Copy)]
pub struct PlotStyle {
    /// Scatter marker area in pt², matplotlib's `s`
    pub dotsize: u32,
}

impl PlotStyle {
    /// Marker radius in pixels for a marker of area `dotsize` pt²
    pub fn marker_radius(&self) -> u32 {
        let radius = (self.dotsize as f64).sqrt() / 2.0 * PX_PER_PT;
        radius.round().max(1.0) as u32
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle { dotsize: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub matched: bool,
}

/// Plot-ready series for one cell
#[derive(Debug, Clone)]
pub struct CellSeries {
    pub title: String,
    pub length: usize,
    pub iterations: usize,
    pub points: Vec<ScatterPoint>,
    /// (mismatch count, fraction of trials matched)
    pub match_rate: Vec<(f64, f64)>,
}

impl CellSeries {
    /// Turn a finished sweep into plot series, consuming its samples
    pub fn from_sample_set(samples: SampleSet, config: &ScorerConfig) -> Self {
        let match_rate = samples
            .match_rates()
            .into_iter()
            .map(|(level, rate)| (level as f64, rate))
            .collect();

        let points = samples
            .outcomes
            .iter()
            .map(|o| ScatterPoint {
                x: o.mismatches as f64,
                y: o.plotted,
                matched: o.matched,
            })
            .collect();

        CellSeries {
            title: format!("{} ({}s)", config.label(), samples.elapsed.as_secs()),
            length: samples.params.length,
            iterations: samples.params.iterations,
            points,
            match_rate,
        }
    }

    pub fn x_range(&self) -> Range<f64> {
        0.0..(self.length + 1) as f64
    }

    /// Room for every stacked miss below zero and 5 units above the best score
    pub fn y_range(&self) -> Range<f64> {
        let low = -((self.iterations + 1) as f64) * ZERO_SCALE;
        let max = self
            .points
            .iter()
            .map(|p| OrderedFloat(p.y))
            .max()
            .map_or(0.0, |m| m.0);
        low..(max + 5.0)
    }
}

/// A complete figure: title lines plus one series per grid cell
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: Vec<String>,
    pub layout: GridLayout,
    pub cells: Vec<CellSeries>,
}

impl Figure {
    pub fn check_fits(&self) -> Result<()> {
        if self.cells.len() > self.layout.cells() {
            bail!(
                "{} cells do not fit a {}x{} grid",
                self.cells.len(),
                self.layout.rows,
                self.layout.cols
            );
        }
        Ok(())
    }
}

/// Three-line figure title
pub fn figure_title(
    version: &str,
    params: &SweepParams,
    timestamp: &str,
    system: &str,
    release: &str,
) -> Vec<String> {
    vec![
        format!("AA mismatch count vs DIAMOND (v{version}) bitscore."),
        format!(
            "Sequence length {} with {} iterations at each identity level.",
            params.length, params.iterations
        ),
        format!("Run at {timestamp} on {system} (release {release})"),
    ]
}

/// Output format, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Bitmap,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" | "jpg" | "jpeg" | "bmp" => Ok(OutputFormat::Bitmap),
            "" => bail!("Output file {} has no extension", path.display()),
            other => bail!("Unsupported output format '.{other}'. Use .svg, .png, .jpg or .bmp"),
        }
    }
}

/// Render one cell into `area`
pub fn render_cell<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    cell: &CellSeries,
    edges: EdgeFlags,
    style: &PlotStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let x_range = cell.x_range();

    let mut chart = ChartBuilder::on(area)
        .caption(&cell.title, ("sans-serif", 16))
        .margin(8)
        .x_label_area_size(if edges.bottom { 40 } else { 25 })
        .y_label_area_size(if edges.left { 55 } else { 40 })
        .right_y_label_area_size(if edges.right { 55 } else { 10 })
        .build_cartesian_2d(x_range.clone(), cell.y_range())?
        .set_secondary_coord(x_range, 0.0f64..1.05f64);

    {
        let mut mesh = chart.configure_mesh();
        mesh.label_style(("sans-serif", 11))
            .axis_desc_style(("sans-serif", 12));
        if edges.bottom {
            mesh.x_desc(X_DESC);
        }
        if edges.left {
            mesh.y_desc(Y_DESC);
        }
        mesh.draw()?;
    }

    if edges.right {
        chart
            .configure_secondary_axes()
            .label_style(("sans-serif", 11))
            .axis_desc_style(("sans-serif", 12))
            .y_desc(RATE_DESC)
            .draw()?;
    }

    chart.draw_series(cell.points.iter().map(|p| {
        let color = if p.matched { MATCH_COLOR } else { MISS_COLOR };
        Circle::new((p.x, p.y), style.marker_radius(), color.filled())
    }))?;

    chart.draw_secondary_series(LineSeries::new(cell.match_rate.iter().copied(), &RATE_COLOR))?;

    Ok(())
}

/// Draw the whole figure onto `root`
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    style: &PlotStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    figure.check_fits()?;

    root.fill(&WHITE)?;
    let (header, body) = root.split_vertically(TITLE_HEIGHT);

    let (width, _) = header.dim_in_pixel();
    let title_style = TextStyle::from(("sans-serif", 18).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (i, line) in figure.title.iter().enumerate() {
        header.draw_text(line, &title_style, ((width / 2) as i32, 8 + 26 * i as i32))?;
    }

    let areas = body.split_evenly((figure.layout.rows, figure.layout.cols));
    let mut cursor = figure.layout.cursor();
    for cell in &figure.cells {
        let pos = cursor.next().context("Grid has no free cell")?;
        render_cell(&areas[pos.index], cell, figure.layout.edges(pos), style)?;
    }

    // Trailing cells of the last row stay empty
    for pos in cursor {
        areas[pos.index].fill(&WHITE)?;
    }

    Ok(())
}

/// Render `figure` to `path`, in the format implied by its extension
///
/// The image is drawn into a temporary file next to `path` and only moved
/// into place once rendering succeeded, so `path` is untouched on error.
pub fn save_figure(path: &Path, figure: &Figure, style: &PlotStyle) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    figure.check_fits()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Bitmap encoding is picked from the extension, so the temporary keeps it
    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let tmp = tempfile::Builder::new()
        .prefix(".scoresweep_")
        .suffix(&suffix)
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    match format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(tmp.path(), FIGURE_SIZE).into_drawing_area();
            draw_figure(&root, figure, style)?;
            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        OutputFormat::Bitmap => {
            let root = BitMapBackend::new(tmp.path(), FIGURE_SIZE).into_drawing_area();
            draw_figure(&root, figure, style)?;
            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
