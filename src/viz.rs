//! Chart rendering to SVG.
//!
//! Renders the shaped [`ChartPayload`] the way the dashboard draws it:
//! lines with point markers and per-point value labels, grouped bars
//! growing from zero, and pie or doughnut sectors with value/percentage
//! labels and a wrapped legend underneath. Colors come from the shared
//! palettes, so the SVG matches the saved payload.

use crate::chart::{ChartPayload, percentages};
use crate::format;
use crate::models::{ChartKind, NumberFormat};
use crate::style;
use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Render a shaped payload as an SVG file.
pub fn render_chart<P: AsRef<Path>>(
    payload: &ChartPayload,
    kind: ChartKind,
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
    unit: &str,
    format: NumberFormat,
) -> Result<()> {
    if payload.datasets.is_empty() {
        return Err(anyhow!("no data to plot"));
    }

    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();

    match kind {
        ChartKind::Line => draw_lines(root, payload, title, unit, format),
        ChartKind::Bar => draw_bars(root, payload, title, unit, format),
        ChartKind::Pie => draw_slices(root, payload, title, format, false),
        ChartKind::Doughnut => draw_slices(root, payload, title, format, true),
    }
}

/// Finite values across all datasets, as a plotting range.
fn value_range(payload: &ChartPayload) -> Result<(f64, f64)> {
    let values: Vec<f64> = payload
        .datasets
        .iter()
        .flat_map(|d| d.data.iter().copied())
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(anyhow!("no numeric values to plot"));
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Ok((min, max))
}

/// Split a series into runs of consecutive finite points, keeping their
/// column positions. Gaps break the line instead of bridging it.
fn finite_runs(values: &[f64]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut run: Vec<(usize, f64)> = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        if v.is_finite() {
            run.push((i, v));
        } else if !run.is_empty() {
            runs.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

/// Rough pixel width of text; plotters cannot measure text without a font.
fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

fn draw_lines<DB>(
    root: DrawingArea<DB, Shift>,
    payload: &ChartPayload,
    title: &str,
    unit: &str,
    format: NumberFormat,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let n = payload.labels.len();
    let x_max = (n as i32 - 1).max(1);
    let (mut min_val, mut max_val) = value_range(payload)?;
    if (max_val - min_val).abs() < f64::EPSILON {
        min_val -= 1.0;
        max_val += 1.0;
    }
    // Headroom so the value labels above the top points stay inside.
    max_val += (max_val - min_val) * 0.08;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(-1..(x_max + 1), min_val..max_val)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |x: &i32| match usize::try_from(*x) {
        Ok(i) => payload.labels.get(i).cloned().unwrap_or_default(),
        Err(_) => String::new(),
    };

    // The dashboard's line chart hides the y ticks and labels every data
    // point instead.
    chart
        .configure_mesh()
        .disable_mesh()
        .y_desc(unit)
        .x_labels((n + 2).min(12))
        .y_labels(0)
        .x_label_formatter(&x_label_fmt)
        .label_style(("sans-serif", 12))
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (idx, ds) in payload.datasets.iter().enumerate() {
        let color = style::series_color(idx).to_plotters();
        let line_style = ShapeStyle {
            color: color.clone(),
            filled: false,
            stroke_width: 2,
        };
        let mut labeled = false;
        for run in finite_runs(&ds.data) {
            let series = LineSeries::new(
                run.iter().map(|&(i, v)| (i as i32, v)),
                line_style.clone(),
            )
            .point_size(3);
            let elem = chart.draw_series(series).map_err(|e| anyhow!("{:?}", e))?;
            if !labeled {
                let legend_color = color.clone();
                elem.label(ds.label.clone()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 24, y)], legend_color.clone())
                });
                labeled = true;
            }
            chart
                .draw_series(run.iter().map(|&(i, v)| {
                    EmptyElement::at((i as i32, v))
                        + Text::new(
                            format::format_value(v, format),
                            (0, -16),
                            ("sans-serif", 12),
                        )
                }))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .position(SeriesLabelPosition::LowerMiddle)
        .background_style(&WHITE.mix(0.85))
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_bars<DB>(
    root: DrawingArea<DB, Shift>,
    payload: &ChartPayload,
    title: &str,
    unit: &str,
    format: NumberFormat,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let n = payload.labels.len();
    let x_max = (n as f64 - 1.0).max(1.0);
    let (data_min, data_max) = value_range(payload)?;
    // Bars grow from zero even when every value is far above it.
    let min_val = 0.0f64.min(data_min);
    let mut max_val = 0.0f64.max(data_max);
    if (max_val - min_val).abs() < f64::EPSILON {
        max_val += 1.0;
    }

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(-1.0..(x_max + 1.0), min_val..max_val)
        .map_err(|e| anyhow!("{:?}", e))?;

    // Only the whole-number positions carry a column name.
    let x_label_fmt = |x: &f64| {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        payload
            .labels
            .get(rounded as usize)
            .cloned()
            .unwrap_or_default()
    };
    let y_label_fmt = |v: &f64| format::format_value(*v, format);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(unit)
        .x_labels((n + 2).min(12))
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style(("sans-serif", 12))
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let n_series = payload.datasets.len().max(1);
    let group_width = 0.8f64;
    let bar_w = group_width / n_series as f64;

    for (idx, ds) in payload.datasets.iter().enumerate() {
        let color = style::series_color(idx).to_plotters();
        let mut labeled = false;
        for (i, &v) in ds.data.iter().enumerate() {
            if !v.is_finite() {
                continue;
            }
            let x_center = i as f64;
            let x0 = x_center - group_width / 2.0 + idx as f64 * bar_w;
            let x1 = x0 + bar_w;
            let y0 = 0.0f64.min(v);
            let y1 = 0.0f64.max(v);
            let rect = Rectangle::new([(x0, y0), (x1, y1)], color.clone().filled());
            let elem = chart
                .draw_series(std::iter::once(rect))
                .map_err(|e| anyhow!("{:?}", e))?;
            if !labeled {
                let legend_color = color.clone();
                elem.label(ds.label.clone()).legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], legend_color.clone().filled())
                });
                labeled = true;
            }
        }
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperMiddle)
        .background_style(&WHITE.mix(0.85))
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_slices<DB>(
    root: DrawingArea<DB, Shift>,
    payload: &ChartPayload,
    title: &str,
    format: NumberFormat,
    doughnut: bool,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let Some(ds) = payload.datasets.first() else {
        return Err(anyhow!("no data to plot"));
    };
    let values: Vec<f64> = ds
        .data
        .iter()
        .map(|v| if v.is_finite() { *v } else { 0.0 })
        .collect();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(anyhow!("no positive values to plot"));
    }
    let shares = percentages(&values);

    let root = root
        .titled(title, ("sans-serif", 24))
        .map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = root.dim_in_pixel();

    let legend_font = 12u32;
    let legend_rows = legend_row_count(&payload.labels, w, legend_font);
    let legend_h = (legend_rows as u32) * 18 + 10;
    let (plot, legend) = root.split_vertically(h.saturating_sub(legend_h).max(40));

    let (pw, ph) = plot.dim_in_pixel();
    let cx = pw as i32 / 2;
    let cy = ph as i32 / 2;
    let r_outer = (pw.min(ph) as f64) * 0.38;
    let r_inner = if doughnut { r_outer * 0.5 } else { 0.0 };

    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (i, &v) in values.iter().enumerate() {
        let span = (v / total) * std::f64::consts::TAU;
        let end = angle + span;
        let fill = style::slice_color(i);

        let outline = sector_points(cx, cy, r_inner, r_outer, angle, end);
        plot.draw(&Polygon::new(
            outline.clone(),
            fill.to_plotters().filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        let mut border = outline;
        if let Some(first) = border.first().copied() {
            border.push(first);
        }
        plot.draw(&PathElement::new(
            border,
            fill.opaque().to_plotters().stroke_width(1),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;

        if span > 0.0 {
            let mid = angle + span / 2.0;
            let label_r = if doughnut {
                (r_inner + r_outer) / 2.0
            } else {
                r_outer * 0.55
            };
            let lx = cx + (label_r * mid.cos()).round() as i32;
            let ly = cy + (label_r * mid.sin()).round() as i32;
            let text = format!(
                "{} ({:.2}%)",
                format::format_value(v, format),
                shares[i]
            );
            plot.draw(&Text::new(text, (lx, ly), ("sans-serif", 12)))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        angle = end;
    }

    // Wrapped swatch legend below the circle.
    let mut x = 10i32;
    let mut y = 4i32;
    for (i, label) in payload.labels.iter().enumerate() {
        let entry_w = 18 + estimate_text_width_px(label, legend_font) as i32 + 16;
        if x + entry_w > w as i32 - 10 && x > 10 {
            x = 10;
            y += 18;
        }
        legend
            .draw(&Rectangle::new(
                [(x, y), (x + 12, y + 12)],
                style::slice_color(i).to_plotters().filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        legend
            .draw(&Text::new(
                label.clone(),
                (x + 18, y + 1),
                ("sans-serif", legend_font),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        x += entry_w;
    }

    plot.present().map_err(|e| anyhow!("{:?}", e))?;
    legend.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// How many rows the wrapped legend needs at the given width.
fn legend_row_count(labels: &[String], width: u32, font_px: u32) -> usize {
    let mut rows = 1usize;
    let mut x = 10i32;
    for label in labels {
        let entry_w = 18 + estimate_text_width_px(label, font_px) as i32 + 16;
        if x + entry_w > width as i32 - 10 && x > 10 {
            rows += 1;
            x = 10;
        }
        x += entry_w;
    }
    rows
}

/// Sample the outline of an annular sector; a zero inner radius closes the
/// wedge at the center instead.
fn sector_points(
    cx: i32,
    cy: i32,
    r_inner: f64,
    r_outer: f64,
    from: f64,
    to: f64,
) -> Vec<(i32, i32)> {
    let steps = (((to - from).abs() / 0.03).ceil() as usize).max(2);
    let mut pts = Vec::with_capacity(steps * 2 + 2);
    for s in 0..=steps {
        let a = from + (to - from) * (s as f64 / steps as f64);
        pts.push((
            cx + (r_outer * a.cos()).round() as i32,
            cy + (r_outer * a.sin()).round() as i32,
        ));
    }
    if r_inner > 0.0 {
        for s in (0..=steps).rev() {
            let a = from + (to - from) * (s as f64 / steps as f64);
            pts.push((
                cx + (r_inner * a.cos()).round() as i32,
                cy + (r_inner * a.sin()).round() as i32,
            ));
        }
    } else {
        pts.push((cx, cy));
    }
    pts
}
