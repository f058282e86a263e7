//! Energy-versus-active-orbitals plot of a sweep.
//!
//! The backend follows the file extension: `.svg` gets a caption and axis
//! labels, anything else is written as a bitmap with frame, line and
//! markers only, since bitmap text needs system fonts.

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

use crate::error::{Result, VqeError};
use crate::sweep::SweepPoint;

const SIZE: (u32, u32) = (640, 480);
const MARKER_RADIUS: i32 = 4;

type Ranges = (std::ops::Range<f64>, std::ops::Range<f64>);

fn axis_ranges(points: &[SweepPoint]) -> Ranges {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        let x = p.n_active_orb as f64;
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(p.energy);
        y_max = y_max.max(p.energy);
    }
    let y_pad = ((y_max - y_min) * 0.1).max(1e-3);
    (x_min - 1.0..x_max + 1.0, y_min - y_pad..y_max + y_pad)
}

fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    points: &[SweepPoint],
    labelled: bool,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (x_range, y_range) = axis_ranges(points);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if labelled {
        builder
            .caption("LiH energy vs active space", ("sans-serif", 22))
            .x_label_area_size(40)
            .y_label_area_size(70);
    }
    let mut chart = builder.build_cartesian_2d(x_range.clone(), y_range.clone())?;

    if labelled {
        chart
            .configure_mesh()
            .x_desc("# of active orbitals")
            .y_desc("Energy (Hartree/LiH)")
            .draw()?;
    } else {
        chart.plotting_area().draw(&Rectangle::new(
            [(x_range.start, y_range.start), (x_range.end, y_range.end)],
            BLACK.stroke_width(1),
        ))?;
    }

    let coords: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.n_active_orb as f64, p.energy))
        .collect();
    chart.draw_series(LineSeries::new(coords.iter().copied(), &BLUE))?;
    chart.draw_series(
        coords
            .iter()
            .map(|&c| Circle::new(c, MARKER_RADIUS, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Draw `points` to `path` with one marker per point.
pub fn plot_energies<P: AsRef<Path>>(points: &[SweepPoint], path: P) -> Result<()> {
    if points.is_empty() {
        return Err(VqeError::Plot("no sweep points to plot".to_string()));
    }
    let path = path.as_ref();
    let is_svg = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if is_svg {
        let root = SVGBackend::new(path, SIZE).into_drawing_area();
        draw(root, points, true).map_err(|e| VqeError::Plot(e.to_string()))
    } else {
        let root = BitMapBackend::new(path, SIZE).into_drawing_area();
        draw(root, points, false).map_err(|e| VqeError::Plot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<SweepPoint> {
        [(0, -7.9), (2, -7.9), (4, -7.95), (6, -7.97)]
            .iter()
            .map(|&(n_active_orb, energy)| SweepPoint {
                n_active_el: if n_active_orb == 0 { 0 } else { 2 },
                n_active_orb,
                energy,
                iterations: 0,
                converged: true,
            })
            .collect()
    }

    #[test]
    fn test_svg_has_one_marker_per_point() {
        let path = std::env::temp_dir().join("rust_vqe_plot_markers.svg");
        plot_energies(&points(), &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains("Energy (Hartree/LiH)"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_png_written() {
        let path = std::env::temp_dir().join("rust_vqe_plot.png");
        plot_energies(&points(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_points_rejected() {
        let path = std::env::temp_dir().join("rust_vqe_empty.svg");
        assert!(matches!(
            plot_energies(&[], &path),
            Err(VqeError::Plot(_))
        ));
    }

    #[test]
    fn test_axis_ranges_pad_flat_data() {
        let flat = vec![points()[0].clone()];
        let (x, y) = axis_ranges(&flat);
        assert!(x.start < 0.0 && x.end > 0.0);
        assert!(y.end - y.start > 0.0);
    }
}
