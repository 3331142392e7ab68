//! Pairwise-marginal histogram grids and their SVG rendering.
//!
//! Presentation only: the grid consumes a finished sample batch and caller
//! supplied axis limits, never the inferential objects themselves.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use sbi_core::errors::ErrorInfo;
use sbi_core::SbiError;

/// Settings for a pairplot computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairplotConfig {
    /// Number of histogram bins per axis.
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Ordered axis labels with their (low, high) limits.
    pub axes: IndexMap<String, (f64, f64)>,
}

fn default_bins() -> usize {
    30
}

impl PairplotConfig {
    /// Creates a config with the default bin count.
    pub fn new(axes: IndexMap<String, (f64, f64)>) -> Self {
        Self {
            bins: default_bins(),
            axes,
        }
    }
}

/// One-dimensional marginal histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1d {
    /// Lower axis limit.
    pub low: f64,
    /// Upper axis limit.
    pub high: f64,
    /// Per-bin sample counts.
    pub counts: Vec<usize>,
}

/// Two-dimensional marginal histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist2d {
    /// Limits of the first dimension.
    pub x_limits: (f64, f64),
    /// Limits of the second dimension.
    pub y_limits: (f64, f64),
    /// Counts indexed as `counts[x_bin][y_bin]`.
    pub counts: Vec<Vec<usize>>,
}

/// Off-diagonal panel of a pairplot grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPanel {
    /// Dimension indices (row, column) of the panel.
    pub dims: (usize, usize),
    /// Joint histogram of the two dimensions.
    pub hist: Hist2d,
}

/// Computed pairplot: 1-D marginals on the diagonal, joints above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairplotGrid {
    /// Axis labels in dimension order.
    pub labels: Vec<String>,
    /// Axis limits in dimension order.
    pub limits: Vec<(f64, f64)>,
    /// Bins per axis.
    pub bins: usize,
    /// Diagonal marginal histograms, one per dimension.
    pub diag: Vec<Hist1d>,
    /// Upper-triangle joint histograms.
    pub upper: Vec<PairPanel>,
}

/// Computes the pairplot grid for a sample batch.
///
/// Samples outside a panel's limits are ignored for that panel; nothing is
/// clamped into the edge bins.
pub fn pairplot(
    samples: ArrayView2<'_, f64>,
    config: &PairplotConfig,
) -> Result<PairplotGrid, SbiError> {
    if config.bins == 0 {
        return Err(SbiError::Shape(ErrorInfo::new(
            "zero-bins",
            "pairplot needs at least one bin",
        )));
    }
    if config.axes.len() != samples.ncols() {
        return Err(SbiError::Shape(
            ErrorInfo::new("axes-dim", "axis count disagrees with sample width")
                .with_context("axes", config.axes.len().to_string())
                .with_context("samples", samples.ncols().to_string()),
        ));
    }
    let mut labels = Vec::with_capacity(config.axes.len());
    let mut limits = Vec::with_capacity(config.axes.len());
    for (label, &(low, high)) in &config.axes {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(SbiError::Shape(
                ErrorInfo::new("axis-limits", "axis limits must be finite with low < high")
                    .with_context("axis", label.clone()),
            ));
        }
        labels.push(label.clone());
        limits.push((low, high));
    }

    let bins = config.bins;
    let dim = limits.len();

    let mut diag = Vec::with_capacity(dim);
    for (index, &(low, high)) in limits.iter().enumerate() {
        let mut counts = vec![0usize; bins];
        for row in samples.rows() {
            if let Some(bin) = bin_index(row[index], low, high, bins) {
                counts[bin] += 1;
            }
        }
        diag.push(Hist1d { low, high, counts });
    }

    let mut upper = Vec::new();
    for i in 0..dim {
        for j in (i + 1)..dim {
            let (x_limits, y_limits) = (limits[i], limits[j]);
            let mut counts = vec![vec![0usize; bins]; bins];
            for row in samples.rows() {
                let x_bin = bin_index(row[i], x_limits.0, x_limits.1, bins);
                let y_bin = bin_index(row[j], y_limits.0, y_limits.1, bins);
                if let (Some(x_bin), Some(y_bin)) = (x_bin, y_bin) {
                    counts[x_bin][y_bin] += 1;
                }
            }
            upper.push(PairPanel {
                dims: (i, j),
                hist: Hist2d {
                    x_limits,
                    y_limits,
                    counts,
                },
            });
        }
    }

    Ok(PairplotGrid {
        labels,
        limits,
        bins,
        diag,
        upper,
    })
}

fn bin_index(value: f64, low: f64, high: f64, bins: usize) -> Option<usize> {
    if !value.is_finite() || value < low || value > high {
        return None;
    }
    let fraction = (value - low) / (high - low);
    Some(((fraction * bins as f64) as usize).min(bins - 1))
}

const PANEL_SIZE: f64 = 140.0;
const PANEL_GAP: f64 = 24.0;
const MARGIN: f64 = 40.0;

/// Renders the grid as a standalone SVG document.
pub fn svg_document(grid: &PairplotGrid) -> String {
    let dim = grid.labels.len();
    let extent = MARGIN * 2.0 + dim as f64 * PANEL_SIZE + (dim as f64 - 1.0).max(0.0) * PANEL_GAP;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{extent}" height="{extent}" viewBox="0 0 {extent} {extent}">"#
    );
    let _ = writeln!(svg, r#"<rect width="{extent}" height="{extent}" fill="white"/>"#);

    for (index, hist) in grid.diag.iter().enumerate() {
        let origin = panel_origin(index, index);
        render_panel_frame(&mut svg, origin, &grid.labels[index]);
        render_hist1d(&mut svg, origin, hist);
    }
    for panel in &grid.upper {
        let (row, column) = panel.dims;
        let origin = panel_origin(row, column);
        render_panel_frame(&mut svg, origin, "");
        render_hist2d(&mut svg, origin, &panel.hist, grid.bins);
    }

    svg.push_str("</svg>\n");
    svg
}

/// Writes the SVG document to a file.
pub fn render_svg(grid: &PairplotGrid, path: &Path) -> Result<(), SbiError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("pairplot-mkdir", err.to_string())
                    .with_context("path", parent.display().to_string()),
            )
        })?;
    }
    fs::write(path, svg_document(grid)).map_err(|err| {
        SbiError::Serde(
            ErrorInfo::new("pairplot-write", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

fn panel_origin(row: usize, column: usize) -> (f64, f64) {
    (
        MARGIN + column as f64 * (PANEL_SIZE + PANEL_GAP),
        MARGIN + row as f64 * (PANEL_SIZE + PANEL_GAP),
    )
}

fn render_panel_frame(svg: &mut String, origin: (f64, f64), label: &str) {
    let (x, y) = origin;
    let _ = writeln!(
        svg,
        r##"<rect x="{x}" y="{y}" width="{PANEL_SIZE}" height="{PANEL_SIZE}" fill="none" stroke="#444" stroke-width="1"/>"##
    );
    if !label.is_empty() {
        let label_x = x + PANEL_SIZE / 2.0;
        let label_y = y - 6.0;
        let _ = writeln!(
            svg,
            r##"<text x="{label_x}" y="{label_y}" font-size="11" text-anchor="middle" fill="#222">{label}</text>"##
        );
    }
}

fn render_hist1d(svg: &mut String, origin: (f64, f64), hist: &Hist1d) {
    let max = hist.counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return;
    }
    let (x0, y0) = origin;
    let bar_width = PANEL_SIZE / hist.counts.len() as f64;
    for (bin, &count) in hist.counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let height = PANEL_SIZE * count as f64 / max as f64;
        let x = x0 + bin as f64 * bar_width;
        let y = y0 + PANEL_SIZE - height;
        let _ = writeln!(
            svg,
            r##"<rect x="{x:.2}" y="{y:.2}" width="{bar_width:.2}" height="{height:.2}" fill="#3b6ea5"/>"##
        );
    }
}

fn render_hist2d(svg: &mut String, origin: (f64, f64), hist: &Hist2d, bins: usize) {
    let max = hist
        .counts
        .iter()
        .flat_map(|column| column.iter().copied())
        .max()
        .unwrap_or(0);
    if max == 0 {
        return;
    }
    let (x0, y0) = origin;
    let cell = PANEL_SIZE / bins as f64;
    for (x_bin, column) in hist.counts.iter().enumerate() {
        for (y_bin, &count) in column.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let opacity = count as f64 / max as f64;
            let x = x0 + x_bin as f64 * cell;
            // SVG y grows downward; flip so larger values sit higher.
            let y = y0 + PANEL_SIZE - (y_bin + 1) as f64 * cell;
            let _ = writeln!(
                svg,
                r##"<rect x="{x:.2}" y="{y:.2}" width="{cell:.2}" height="{cell:.2}" fill="#3b6ea5" fill-opacity="{opacity:.3}"/>"##
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn axes2() -> IndexMap<String, (f64, f64)> {
        let mut axes = IndexMap::new();
        axes.insert("theta0".to_string(), (-1.0, 1.0));
        axes.insert("theta1".to_string(), (-1.0, 1.0));
        axes
    }

    #[test]
    fn counts_cover_in_range_samples() {
        let samples = array![[0.0, 0.0], [0.5, -0.5], [2.0, 0.0]];
        let grid = pairplot(samples.view(), &PairplotConfig::new(axes2())).unwrap();
        // The third row is outside the first axis and ignored everywhere it appears.
        assert_eq!(grid.diag[0].counts.iter().sum::<usize>(), 2);
        assert_eq!(grid.diag[1].counts.iter().sum::<usize>(), 3);
        assert_eq!(grid.upper.len(), 1);
        let joint: usize = grid.upper[0]
            .hist
            .counts
            .iter()
            .flat_map(|column| column.iter())
            .sum();
        assert_eq!(joint, 2);
    }

    #[test]
    fn axis_count_must_match_sample_width() {
        let samples = array![[0.0, 0.0, 0.0]];
        let err = pairplot(samples.view(), &PairplotConfig::new(axes2())).unwrap_err();
        assert_eq!(err.info().code, "axes-dim");
    }

    #[test]
    fn svg_contains_panels_and_labels() {
        let samples = array![[0.0, 0.0], [0.5, -0.5], [-0.25, 0.75]];
        let grid = pairplot(samples.view(), &PairplotConfig::new(axes2())).unwrap();
        let svg = svg_document(&grid);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("theta0"));
        assert!(svg.ends_with("</svg>\n"));
    }
}
