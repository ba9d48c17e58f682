//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - curve: `-` line
//! - overlay points (e.g. fleet vehicles): `o`

use crate::domain::SweepGrid;

/// Render a mileage sweep: levelized EUR/km over annual km.
///
/// `overlay` points (annual km, EUR/km) are drawn as `o`, e.g. the fleet's
/// actual vehicles on top of the sweep curve.
pub fn render_sweep_plot(
    grid: &SweepGrid,
    overlay: &[(f64, f64)],
    width: usize,
    height: usize,
) -> String {
    let curve: Vec<(f64, f64)> = grid
        .annual_km
        .iter()
        .zip(grid.eur_per_km.iter())
        .map(|(&x, &y)| (x, y))
        .collect();
    render_plot(
        &curve,
        overlay,
        width,
        height,
        "annual km (thousands)",
        |x| format!("{:.0}", x / 1_000.0),
        |y| format!("{y:.2}"),
    )
}

/// Render a residual-value retention curve: share of gross over asset age.
pub fn render_retention_plot(retention: &[f64], width: usize, height: usize) -> String {
    let curve: Vec<(f64, f64)> = retention
        .iter()
        .enumerate()
        .map(|(year, &share)| (year as f64, share))
        .collect();
    render_plot(
        &curve,
        &[],
        width,
        height,
        "age (years)",
        |x| format!("{x:.0}"),
        |y| format!("{y:.2}"),
    )
}

fn render_plot(
    curve: &[(f64, f64)],
    overlay: &[(f64, f64)],
    width: usize,
    height: usize,
    x_label: &str,
    fmt_x: impl Fn(f64) -> String,
    fmt_y: impl Fn(f64) -> String,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = x_range(curve, overlay) else {
        return "(empty plot)\n".to_string();
    };
    let (y_min, y_max) = y_range(curve, overlay).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for &(x, y) in curve {
        if let Some((col, row)) = to_cell(x, y, x_min, x_max, y_min, y_max, width, height) {
            grid[row][col] = '-';
        }
    }
    // Points overlay the curve.
    for &(x, y) in overlay {
        if let Some((col, row)) = to_cell(x, y, x_min, x_max, y_min, y_max, width, height) {
            grid[row][col] = 'o';
        }
    }

    let mut out = String::new();
    for (i, row) in grid.iter().enumerate() {
        let label = if i == 0 {
            fmt_y(y_max)
        } else if i == height - 1 {
            fmt_y(y_min)
        } else {
            String::new()
        };
        out.push_str(&format!("{label:>8} |"));
        out.extend(row.iter());
        out.push('\n');
    }
    out.push_str(&format!("{:>8} +{}\n", "", "-".repeat(width)));
    out.push_str(&format!(
        "{:>8}  {}{}{}\n",
        "",
        fmt_x(x_min),
        " ".repeat(width.saturating_sub(fmt_x(x_min).len() + fmt_x(x_max).len())),
        fmt_x(x_max)
    ));
    out.push_str(&format!("{:>8}  {x_label}\n", ""));
    out
}

fn to_cell(
    x: f64,
    y: f64,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
) -> Option<(usize, usize)> {
    if !(x.is_finite() && y.is_finite()) || x < x_min || x > x_max || y < y_min || y > y_max {
        return None;
    }
    let u = if x_max > x_min {
        (x - x_min) / (x_max - x_min)
    } else {
        0.5
    };
    let v = if y_max > y_min {
        (y - y_min) / (y_max - y_min)
    } else {
        0.5
    };
    let col = ((u * (width as f64 - 1.0)).round() as usize).min(width - 1);
    // Row 0 is the top of the plot.
    let row = (((1.0 - v) * (height as f64 - 1.0)).round() as usize).min(height - 1);
    Some((col, row))
}

fn x_range(curve: &[(f64, f64)], overlay: &[(f64, f64)]) -> Option<(f64, f64)> {
    minmax(curve.iter().chain(overlay).map(|p| p.0))
}

fn y_range(curve: &[(f64, f64)], overlay: &[(f64, f64)]) -> Option<(f64, f64)> {
    minmax(curve.iter().chain(overlay).map(|p| p.1))
}

fn minmax(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() && hi >= lo {
        Some((lo, hi))
    } else {
        None
    }
}

fn pad_range(lo: f64, hi: f64, pad: f64) -> (f64, f64) {
    let span = (hi - lo).abs().max(1e-9);
    (lo - span * pad, hi + span * pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> SweepGrid {
        let annual_km: Vec<f64> = (0..25).map(|i| 40_000.0 + 5_000.0 * i as f64).collect();
        let eur_per_km: Vec<f64> = annual_km.iter().map(|km| 2.0e5 / km + 0.6).collect();
        SweepGrid {
            annual_km,
            eur_per_km,
        }
    }

    #[test]
    fn sweep_plot_is_deterministic_and_sized() {
        let grid = sample_grid();
        let a = render_sweep_plot(&grid, &[], 60, 15);
        let b = render_sweep_plot(&grid, &[], 60, 15);
        assert_eq!(a, b);
        // 15 plot rows + axis + x labels + x title.
        assert_eq!(a.lines().count(), 18);
        assert!(a.contains('-'));
    }

    #[test]
    fn overlay_points_are_drawn() {
        let grid = sample_grid();
        let plot = render_sweep_plot(&grid, &[(100_000.0, 2.6)], 60, 15);
        assert!(plot.contains('o'), "overlay point missing:\n{plot}");
    }

    #[test]
    fn retention_plot_handles_short_curves() {
        let plot = render_retention_plot(&[1.0, 0.7, 0.55, 0.45], 40, 10);
        assert!(plot.contains("age (years)"));
    }

    #[test]
    fn empty_input_does_not_panic() {
        let grid = SweepGrid {
            annual_km: vec![],
            eur_per_km: vec![],
        };
        let plot = render_sweep_plot(&grid, &[], 40, 10);
        assert!(plot.contains("empty plot"));
    }
}
