use crate::error::Result;
use crate::{Cell, Scalar};
use itertools::izip;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the z-integrated density projection as a plain-text P3 image.
///
/// Pixels are normalised so the mean projected density maps to 255, then
/// split into three clamped/offset intensity bands so over-dense pixels roll
/// from red through white as they saturate successive channels.
pub fn save_density_image(density: &[Cell], n_cells: usize, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "P3")?;
    writeln!(file, "{} {}", n_cells, n_cells)?;
    writeln!(file, "255")?;

    let mut projected = vec![0.0; n_cells * n_cells];
    for i in 0..n_cells {
        for j in 0..n_cells {
            for k in 0..n_cells {
                projected[i * n_cells + j] += density[k + n_cells * (j + n_cells * i)].re;
            }
        }
    }

    let mean: Scalar = projected.iter().sum::<Scalar>() / (n_cells * n_cells) as Scalar;
    let norm = 255.0 / mean;

    for value in &projected {
        let v = value * norm;
        let r = (v as i64).min(255);
        let g = (v as i64 - 255).clamp(0, 255);
        let b = (v as i64 - 550).clamp(0, 255);
        writeln!(file, "{} {} {}", r, g, b)?;
    }
    Ok(())
}

/// One correlation-function column per labelled run, comma separated.
/// Ragged columns are padded with empty fields.
pub fn save_correlations_csv(
    columns: &[Vec<Scalar>],
    labels: &[String],
    path: &Path,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{}", labels.join(","))?;

    let rows = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    for row in 0..rows {
        let line: Vec<String> = columns
            .iter()
            .map(|col| {
                col.get(row)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        writeln!(file, "{}", line.join(","))?;
    }
    Ok(())
}

/// Two-column text dump, used to eyeball the potential against the radial
/// distance from a source.
pub fn save_potential_profile(
    potential: &[Scalar],
    distance: &[Scalar],
    path: &Path,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for (p, d) in potential.iter().zip(distance) {
        writeln!(file, "{} {}", p, d)?;
    }
    Ok(())
}

/// Six-column text dump of a single particle's trajectory.
pub fn save_trajectory(
    position: [&[Scalar]; 3],
    velocity: [&[Scalar]; 3],
    path: &Path,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    for (px, py, pz, vx, vy, vz) in izip!(
        position[0],
        position[1],
        position[2],
        velocity[0],
        velocity[1],
        velocity[2]
    ) {
        writeln!(file, "{} {} {} {} {} {}", px, py, pz, vx, vy, vz)?;
    }
    Ok(())
}

/// Trims trailing zeros from a six-decimal rendering of `number`, keeping
/// the decimal point so labels like `1.5` and `2.` stay distinguishable from
/// integers ("findsigfig" in the run labels).
pub fn trim_trailing_zeros(number: Scalar) -> String {
    let rendered = format!("{:.6}", number);
    match rendered.rfind(|c: char| c != '0') {
        Some(last) => rendered[..=last].to_string(),
        None => rendered,
    }
}

/// Fixed-decimal rendering.
pub fn format_decimal(value: Scalar, decimal_places: usize) -> String {
    format!("{:.*}", decimal_places, value)
}

/// Rounds to the fewest decimal places (up to `max_dp`) that already
/// represent the value: `2.50003 → 2.5`, `2.05 → 2`, `42.0 → 42`.
pub fn round_trailing_decimal_places(value: Scalar, max_dp: usize) -> String {
    let mut chosen = max_dp.saturating_sub(1);
    for dp in 0..max_dp.saturating_sub(1) {
        let coarse: Scalar = format_decimal(value, dp).parse().unwrap_or(value);
        let fine: Scalar = format_decimal(value, dp + 1).parse().unwrap_or(value);
        if coarse == fine {
            chosen = dp;
            break;
        }
    }
    format_decimal(value, chosen)
}
