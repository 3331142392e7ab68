use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use indexmap::IndexMap;
use ndarray::Array2;
use serde::Serialize;

use sbi_analysis::{pairplot, render_svg, PairplotConfig};

#[derive(Args, Debug)]
pub struct PairplotArgs {
    /// Samples CSV produced by the `sample` command.
    #[arg(long)]
    pub samples: PathBuf,
    /// Output path for the SVG document.
    #[arg(long, default_value = "pairplot.svg")]
    pub out: PathBuf,
    /// Axis limits as `low:high` pairs, comma separated, one per column.
    /// Derived from the data with a 5% pad when absent.
    #[arg(long)]
    pub limits: Option<String>,
    /// Histogram bins per axis.
    #[arg(long, default_value_t = 30)]
    pub bins: usize,
}

#[derive(Debug, Serialize)]
struct PairplotReport {
    svg_file: String,
    num_samples: usize,
    dimensions: usize,
}

pub fn run(args: &PairplotArgs) -> Result<(), Box<dyn Error>> {
    let (labels, samples) = read_samples(&args.samples)?;

    let limits = match &args.limits {
        Some(raw) => parse_limits(raw, labels.len())?,
        None => padded_limits(&samples),
    };

    let mut axes = IndexMap::new();
    for (label, limit) in labels.iter().zip(limits) {
        axes.insert(label.clone(), limit);
    }

    let mut config = PairplotConfig::new(axes);
    config.bins = args.bins;
    let grid = pairplot(samples.view(), &config)?;
    render_svg(&grid, &args.out)?;

    let report = PairplotReport {
        svg_file: args.out.display().to_string(),
        num_samples: samples.nrows(),
        dimensions: samples.ncols(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_samples(path: &PathBuf) -> Result<(Vec<String>, Array2<f64>), Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|err| format!("cannot open {}: {err}", path.display()))?;
    let labels: Vec<String> = reader
        .headers()?
        .iter()
        .map(|field| field.to_string())
        .collect();
    if labels.is_empty() {
        return Err("samples file has no columns".into());
    }
    let mut values = Vec::new();
    let mut rows = 0usize;
    for record in reader.records() {
        let record = record?;
        if record.len() != labels.len() {
            return Err(format!(
                "row {} has {} fields, expected {}",
                rows + 1,
                record.len(),
                labels.len()
            )
            .into());
        }
        for field in record.iter() {
            values.push(field.trim().parse::<f64>()?);
        }
        rows += 1;
    }
    let samples = Array2::from_shape_vec((rows, labels.len()), values)?;
    Ok((labels, samples))
}

fn parse_limits(raw: &str, dims: usize) -> Result<Vec<(f64, f64)>, Box<dyn Error>> {
    let parsed: Result<Vec<(f64, f64)>, Box<dyn Error>> = raw
        .split(',')
        .map(|piece| {
            let mut halves = piece.trim().split(':');
            let low = halves.next().ok_or("missing low limit")?.parse::<f64>()?;
            let high = halves.next().ok_or("missing high limit")?.parse::<f64>()?;
            Ok((low, high))
        })
        .collect();
    let parsed = parsed?;
    if parsed.len() != dims {
        return Err(format!("{} limit pairs supplied, expected {dims}", parsed.len()).into());
    }
    Ok(parsed)
}

fn padded_limits(samples: &Array2<f64>) -> Vec<(f64, f64)> {
    samples
        .columns()
        .into_iter()
        .map(|column| {
            let mut low = f64::INFINITY;
            let mut high = f64::NEG_INFINITY;
            for &value in column.iter() {
                low = low.min(value);
                high = high.max(value);
            }
            if !low.is_finite() || !high.is_finite() || low == high {
                (low - 1.0, high + 1.0)
            } else {
                let pad = 0.05 * (high - low);
                (low - pad, high + pad)
            }
        })
        .collect()
}
