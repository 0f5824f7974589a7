//! Grid and axis geometry.
//!
//! Everything here is computed in the normalized `[-1, 1]^3` cube and then
//! projected, so the grid always frames the value range regardless of the
//! data units.

use crate::core::camera::{project_normalized, DisplaySettings, ViewState};
use crate::core::range::Axis;
use crate::error::Result;
use crate::scene::primitives::{Line, Plane, PrimitiveKey, Text};
use glam::DVec3;

/// Normalized tick position `i` of `divisions`.
fn tick_position(i: usize, divisions: usize) -> f64 {
    if i == divisions {
        return 1.0;
    }
    -1.0 + 2.0 * (i as f64) / (divisions as f64)
}

fn with_axis(mut p: DVec3, axis: Axis, value: f64) -> DVec3 {
    match axis {
        Axis::X => p.x = value,
        Axis::Y => p.y = value,
        Axis::Z => p.z = value,
    }
    p
}

fn segment(
    key: PrimitiveKey,
    from: DVec3,
    to: DVec3,
    view: &ViewState,
    display: &DisplaySettings,
) -> Result<Line> {
    let a = project_normalized(from, view, display)?;
    let b = project_normalized(to, view, display)?;
    Ok(Line {
        key,
        x1: a.x,
        y1: a.y,
        x2: b.x,
        y2: b.y,
    })
}

/// Grid lines on the three back planes.
///
/// Planes are emitted XY (at z = min), XZ (at y = min), YZ (at x = min).
/// Within a plane, lines of constant first axis come first, then lines of
/// constant second axis. Each run covers ticks `0..=divisions`, so both
/// boundary lines are always present.
pub fn grid_lines(
    divisions: usize,
    view: &ViewState,
    display: &DisplaySettings,
) -> Result<Vec<Line>> {
    let divisions = divisions.max(1);
    let mut lines = Vec::with_capacity(6 * (divisions + 1));
    for plane in Plane::ALL {
        let base = with_axis(DVec3::ZERO, plane.normal(), -1.0);
        let (a, b) = plane.axes();
        for (fixed, sweep) in [(a, b), (b, a)] {
            for i in 0..=divisions {
                let t = tick_position(i, divisions);
                let p = with_axis(base, fixed, t);
                lines.push(segment(
                    PrimitiveKey::Grid {
                        plane,
                        axis: fixed,
                        index: i,
                    },
                    with_axis(p, sweep, -1.0),
                    with_axis(p, sweep, 1.0),
                    view,
                    display,
                )?);
            }
        }
    }
    Ok(lines)
}

/// Normalized anchor of the tick label for `axis` at tick position `t`.
///
/// X and Z ticks sit on the front edges of the floor, Y ticks on the front
/// edge of the side wall. Each is the far endpoint of a grid line.
fn grid_label_anchor(axis: Axis, t: f64) -> DVec3 {
    match axis {
        Axis::X => DVec3::new(t, -1.0, 1.0),
        Axis::Y => DVec3::new(-1.0, t, 1.0),
        Axis::Z => DVec3::new(1.0, -1.0, t),
    }
}

/// Tick labels for every axis, in x, y, z order.
pub fn grid_labels(
    divisions: usize,
    offset: (f64, f64),
    precision: usize,
    view: &ViewState,
    display: &DisplaySettings,
) -> Result<Vec<Text>> {
    let divisions = divisions.max(1);
    let mut labels = Vec::with_capacity(3 * (divisions + 1));
    for axis in Axis::ALL {
        let extent = view.range.axis(axis);
        for i in 0..=divisions {
            let anchor = project_normalized(
                grid_label_anchor(axis, tick_position(i, divisions)),
                view,
                display,
            )?;
            labels.push(Text {
                key: PrimitiveKey::GridLabel { axis, index: i },
                x: anchor.x,
                y: anchor.y,
                dx: offset.0,
                dy: offset.1,
                text: format_tick(extent.tick(i, divisions), precision),
            });
        }
    }
    Ok(labels)
}

/// The three axis lines through the clamped data origin, x then y then z.
pub fn axis_lines(view: &ViewState, display: &DisplaySettings) -> Result<Vec<Line>> {
    let origin = view.range.normalize(view.range.clamped_origin());
    Axis::ALL
        .iter()
        .map(|&axis| {
            segment(
                PrimitiveKey::Axis { axis },
                with_axis(origin, axis, -1.0),
                with_axis(origin, axis, 1.0),
                view,
                display,
            )
        })
        .collect()
}

/// One label per axis line, anchored at its far endpoint.
pub fn axis_labels(axes: &[Line], names: &[String; 3], offset: (f64, f64)) -> Vec<Text> {
    axes.iter()
        .filter_map(|line| match line.key {
            PrimitiveKey::Axis { axis } => {
                let (x, y) = line.end();
                Some(Text {
                    key: PrimitiveKey::AxisLabel { axis },
                    x,
                    y,
                    dx: offset.0,
                    dy: offset.1,
                    text: names[axis.index()].clone(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Format a tick value with at most `precision` decimals, trimming zeros.
pub fn format_tick(value: f64, precision: usize) -> String {
    let mut s = format!("{value:.precision$}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
