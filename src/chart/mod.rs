//! Four-panel dashboard rendering with plotters
//!
//! Panels, left to right and top to bottom: histogram of average marks over
//! the distribution buckets, mean score per subject, study hours against
//! average coloured by attendance, and grade shares as a pie.
//!
//! Text is only drawn when the `chart-text` feature is enabled. Without a
//! font backend plotters cannot rasterise glyphs, so the default build skips
//! captions, axis labels and the label areas and draws the shapes alone.

use std::f64::consts::PI;
use std::path::Path;

use anyhow::{anyhow, Result};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::pipeline::{
    analyze_distribution, grade_counts, subject_means, AnalysisError, DistributionBucket, Grade,
    StudentRecord,
};

/// Output image size in pixels
pub const DASHBOARD_SIZE: (u32, u32) = (1800, 1200);

/// Whether captions and labels are drawn
const DRAW_TEXT: bool = cfg!(feature = "chart-text");

const CAPTION_FONT: (&str, u32) = ("sans-serif", 30);

const HIST_FILL: RGBColor = RGBColor(135, 206, 235);
const SUBJECT_COLORS: [RGBColor; 3] = [
    RGBColor(255, 107, 107),
    RGBColor(78, 205, 196),
    RGBColor(69, 183, 209),
];
const GRADE_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),  // A
    RGBColor(255, 127, 14),  // B
    RGBColor(44, 160, 44),   // C
    RGBColor(214, 39, 40),   // D
];

/// Stops of the attendance colour ramp, low to high
const RAMP: [RGBColor; 3] = [
    RGBColor(68, 1, 84),
    RGBColor(33, 145, 140),
    RGBColor(253, 231, 37),
];

/// One student in the study-hours scatter
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub study_hours: f64,
    pub average: f64,
    pub attendance: f64,
}

/// Everything the dashboard draws
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub buckets: Vec<DistributionBucket>,
    pub subject_means: Vec<(String, f64)>,
    pub points: Vec<ScatterPoint>,
    pub grade_counts: Vec<(Grade, usize)>,
}

impl ChartData {
    /// Collect chart inputs from records that already carry their averages
    pub fn from_records(records: &[StudentRecord]) -> Result<Self, AnalysisError> {
        let points = records
            .iter()
            .map(|r| {
                Ok(ScatterPoint {
                    study_hours: r.study_hours as f64,
                    average: r.require_average()?,
                    attendance: r.attendance as f64,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        Ok(Self {
            buckets: analyze_distribution(records)?,
            subject_means: subject_means(records)?
                .iter()
                .map(|(name, mean)| (name.to_string(), *mean))
                .collect(),
            points,
            grade_counts: grade_counts(records),
        })
    }
}

/// Label area size, collapsed to zero when text is off so plotters never
/// lays out tick labels
fn label_area(size: u32) -> u32 {
    if DRAW_TEXT {
        size
    } else {
        0
    }
}

/// Cartesian panel builder with the shared margin, label areas and caption
fn panel<'a, 'b, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    caption: &str,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder
        .margin(20)
        .x_label_area_size(label_area(40))
        .y_label_area_size(label_area(50));
    if DRAW_TEXT {
        builder.caption(caption, CAPTION_FONT);
    }
    builder
}

fn draw_err<E: std::fmt::Display>(what: &'static str) -> impl FnOnce(E) -> anyhow::Error {
    move |e| anyhow!("{} error: {}", what, e)
}

/// Render the 2x2 dashboard to a PNG at `path`.
///
/// The image is flushed to disk before returning.
pub fn render_dashboard(path: &Path, data: &ChartData) -> Result<()> {
    let root = BitMapBackend::new(path, DASHBOARD_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err("Chart fill"))?;

    let panels = root.split_evenly((2, 2));
    draw_histogram(&panels[0], &data.buckets)?;
    draw_subject_bars(&panels[1], &data.subject_means)?;
    draw_study_scatter(&panels[2], &data.points)?;
    draw_grade_pie(&panels[3], &data.grade_counts)?;

    root.present().map_err(draw_err("Present"))?;
    tracing::info!(path = %path.display(), "rendered dashboard");
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    buckets: &[DistributionBucket],
) -> Result<()> {
    let y_max = buckets.iter().map(|b| b.count).max().unwrap_or(0) as f64 + 1.0;

    let mut chart = panel(area, "Distribution of Student Average Marks")
        .build_cartesian_2d(0f64..100f64, 0f64..y_max)
        .map_err(draw_err("Histogram build"))?;

    chart
        .configure_mesh()
        .x_desc("Marks Range")
        .y_desc("Number of Students")
        .draw()
        .map_err(draw_err("Histogram mesh"))?;

    chart
        .draw_series(buckets.iter().map(|b| {
            Rectangle::new(
                [(b.lower, 0.0), (b.upper, b.count as f64)],
                HIST_FILL.mix(0.7).filled(),
            )
        }))
        .map_err(draw_err("Histogram series"))?;

    // Outlines
    chart
        .draw_series(
            buckets
                .iter()
                .filter(|b| b.count > 0)
                .map(|b| {
                    Rectangle::new(
                        [(b.lower, 0.0), (b.upper, b.count as f64)],
                        BLACK.stroke_width(1),
                    )
                }),
        )
        .map_err(draw_err("Histogram outline"))?;

    Ok(())
}

fn draw_subject_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    means: &[(String, f64)],
) -> Result<()> {
    let n = means.len() as f64;
    let names: Vec<String> = means.iter().map(|(name, _)| name.clone()).collect();
    let label = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < names.len() {
            names[i as usize].clone()
        } else {
            String::new()
        }
    };

    let mut chart = panel(area, "Average Performance by Subject")
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..100f64)
        .map_err(draw_err("Bar chart build"))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(means.len().max(1))
        .x_label_formatter(&label)
        .y_desc("Average Score")
        .draw()
        .map_err(draw_err("Bar chart mesh"))?;

    chart
        .draw_series(means.iter().enumerate().map(|(i, (_, mean))| {
            let x = i as f64;
            Rectangle::new(
                [(x - 0.35, 0.0), (x + 0.35, *mean)],
                SUBJECT_COLORS[i % SUBJECT_COLORS.len()].filled(),
            )
        }))
        .map_err(draw_err("Bar chart series"))?;

    Ok(())
}

fn draw_study_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    points: &[ScatterPoint],
) -> Result<()> {
    let x_max = points.iter().map(|p| p.study_hours).fold(0.0, f64::max) + 1.0;
    let (att_min, att_max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p.attendance), hi.max(p.attendance))
    });

    let mut chart = panel(area, "Study Hours vs Performance (Color: Attendance)")
        .build_cartesian_2d(0f64..x_max, 0f64..100f64)
        .map_err(draw_err("Scatter build"))?;

    chart
        .configure_mesh()
        .x_desc("Study Hours per Day")
        .y_desc("Average Marks")
        .draw()
        .map_err(draw_err("Scatter mesh"))?;

    chart
        .draw_series(points.iter().map(|p| {
            let color = attendance_color(p.attendance, att_min, att_max);
            Circle::new((p.study_hours, p.average), 10, color.mix(0.8).filled())
        }))
        .map_err(draw_err("Scatter series"))?;

    Ok(())
}

fn draw_grade_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    counts: &[(Grade, usize)],
) -> Result<()> {
    let area = if DRAW_TEXT {
        area.titled("Grade Distribution", CAPTION_FONT)
            .map_err(draw_err("Pie title"))?
    } else {
        area.clone()
    };

    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.38;
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Ok(());
    }

    for (grade, start, sweep) in wedges(counts) {
        let color = GRADE_COLORS[grade.index()];
        area.draw(&Polygon::new(
            wedge_outline(center, radius, start, sweep),
            color.filled(),
        ))
        .map_err(draw_err("Pie wedge"))?;

        if DRAW_TEXT {
            let label_at = polar(center, radius * 1.12, start + sweep / 2.0);
            let pct = sweep / (2.0 * PI) * 100.0;
            area.draw(&Text::new(
                format!("{} {:.1}%", grade, pct),
                label_at,
                ("sans-serif", 24).into_font().color(&BLACK),
            ))
            .map_err(draw_err("Pie label"))?;
        }
    }

    Ok(())
}

/// `(grade, start angle, sweep)` per wedge, in radians.
///
/// The first wedge starts at the top and wedges run counter-clockwise.
fn wedges(counts: &[(Grade, usize)]) -> Vec<(Grade, f64, f64)> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut start = PI / 2.0;
    counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|&(grade, count)| {
            let sweep = count as f64 / total as f64 * 2.0 * PI;
            let wedge = (grade, start, sweep);
            start += sweep;
            wedge
        })
        .collect()
}

/// Pixel position at `angle` (counter-clockwise from the x axis)
fn polar(center: (f64, f64), radius: f64, angle: f64) -> (i32, i32) {
    (
        (center.0 + radius * angle.cos()).round() as i32,
        (center.1 - radius * angle.sin()).round() as i32,
    )
}

fn wedge_outline(center: (f64, f64), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;
    let mut outline = Vec::with_capacity(steps + 2);
    outline.push((center.0.round() as i32, center.1.round() as i32));
    outline.extend((0..=steps).map(|s| polar(center, radius, start + sweep * s as f64 / steps as f64)));
    outline
}

/// Colour for an attendance value on a purple-teal-yellow ramp
pub fn attendance_color(value: f64, min: f64, max: f64) -> RGBColor {
    let t = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.5
    };

    let scaled = t * (RAMP.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(RAMP.len() - 2);
    let frac = scaled - i as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    let (lo, hi) = (RAMP[i], RAMP[i + 1]);
    RGBColor(lerp(lo.0, hi.0), lerp(lo.1, hi.1), lerp(lo.2, hi.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{derive_averages, student_records};

    #[test]
    fn test_chart_data_from_records() {
        let data = ChartData::from_records(&derive_averages(&student_records())).unwrap();

        assert_eq!(data.buckets.len(), 7);
        assert_eq!(data.points.len(), 15);
        assert_eq!(data.subject_means.len(), 3);
        assert_eq!(data.subject_means[0].0, "math");
        assert_eq!(
            data.grade_counts,
            vec![(Grade::A, 5), (Grade::B, 6), (Grade::C, 2), (Grade::D, 2)]
        );
    }

    #[test]
    fn test_chart_data_requires_averages() {
        assert!(ChartData::from_records(&student_records()).is_err());
    }

    #[test]
    fn test_wedges_cover_full_circle() {
        let w = wedges(&[(Grade::A, 5), (Grade::B, 6), (Grade::C, 2), (Grade::D, 2)]);
        assert_eq!(w.len(), 4);
        assert!((w[0].1 - PI / 2.0).abs() < 1e-12);
        let swept: f64 = w.iter().map(|(_, _, s)| s).sum();
        assert!((swept - 2.0 * PI).abs() < 1e-9);
        assert!(wedges(&[]).is_empty());
    }

    #[test]
    fn test_attendance_color_endpoints() {
        assert_eq!(attendance_color(65.0, 65.0, 99.0), RAMP[0]);
        assert_eq!(attendance_color(99.0, 65.0, 99.0), RAMP[2]);
        assert_eq!(attendance_color(82.0, 65.0, 99.0), RAMP[1]);
        assert_eq!(attendance_color(80.0, 80.0, 80.0), RAMP[1]);
    }

    #[test]
    fn test_render_dashboard_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.png");
        let data = ChartData::from_records(&derive_averages(&student_records())).unwrap();

        render_dashboard(&path, &data).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > 8);
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
