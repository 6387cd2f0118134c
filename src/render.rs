//! Rendering: paints the gesture overlay onto a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! The overlay canvas sits above the diagram; everything drawn here is
//! transient and redrawn from [`Overlay`] on every frame. Shapes themselves
//! are painted by the host.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::geom::{Direction, Point, Rect};
use crate::overlay::{Affordance, AffordanceVisual, Overlay, Preview};

/// Affordance fill colour.
const ACCENT: &str = "#29B6F2";

/// Preview dash segment length in screen pixels.
const PREVIEW_DASH_PX: f64 = 3.0;

/// Draw the overlay. `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is
/// the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw_overlay(
    ctx: &CanvasRenderingContext2d,
    overlay: &Overlay,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);

    if let Some(h) = overlay.highlight {
        draw_highlight(ctx, h);
    }
    draw_preview(ctx, &overlay.preview)?;
    for visual in &overlay.affordances {
        draw_affordance(ctx, visual)?;
    }
    ctx.set_global_alpha(1.0);
    Ok(())
}

// =============================================================
// Target and preview
// =============================================================

fn draw_highlight(ctx: &CanvasRenderingContext2d, r: Rect) {
    ctx.set_global_alpha(1.0);
    ctx.set_stroke_style_str("#00A8FF");
    ctx.set_line_width(2.0);
    ctx.stroke_rect(r.x, r.y, r.width, r.height);
}

fn draw_preview(ctx: &CanvasRenderingContext2d, preview: &Preview) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_global_alpha(1.0);
    ctx.set_stroke_style_str("#1E90FF");
    ctx.set_line_width(1.0);
    let dash_array = js_sys::Array::new();
    dash_array.push(&PREVIEW_DASH_PX.into());
    dash_array.push(&PREVIEW_DASH_PX.into());
    ctx.set_line_dash(&dash_array)?;

    if let Some(b) = preview.bounds {
        ctx.stroke_rect(b.x, b.y, b.width, b.height);
    }
    if let Some((from, to)) = preview.connector {
        ctx.begin_path();
        ctx.move_to(from.x, from.y);
        ctx.line_to(to.x, to.y);
        ctx.stroke();
    }

    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Affordances
// =============================================================

fn draw_affordance(ctx: &CanvasRenderingContext2d, visual: &AffordanceVisual) -> Result<(), JsValue> {
    ctx.set_global_alpha(f64::from(visual.opacity) / 100.0);
    ctx.set_fill_style_str(ACCENT);
    ctx.set_stroke_style_str(ACCENT);
    let b = visual.bounds;
    match visual.affordance {
        Affordance::Arrow(dir) => draw_arrow(ctx, b, dir),
        Affordance::Endpoint(_) => {
            ctx.begin_path();
            ctx.arc(b.center().x, b.center().y, b.width.min(b.height) / 2.0, 0.0, 2.0 * PI)?;
            ctx.fill();
        }
        Affordance::StyleReplace => {
            ctx.set_line_width(2.0);
            ctx.stroke_rect(b.x + 1.0, b.y + 1.0, b.width - 2.0, b.height - 2.0);
            // Two nested squares read as "apply this style".
            ctx.fill_rect(b.x + b.width * 0.3, b.y + b.height * 0.3, b.width * 0.4, b.height * 0.4);
        }
        Affordance::DragHandle => {
            ctx.begin_path();
            ctx.arc(b.center().x, b.center().y, b.width.min(b.height) / 2.0, 0.0, 2.0 * PI)?;
            ctx.stroke();
        }
    }
    Ok(())
}

/// Triangle filling `b`, pointing in `dir`.
fn draw_arrow(ctx: &CanvasRenderingContext2d, b: Rect, dir: Direction) {
    let c = b.center();
    let (tip, left, right) = match dir {
        Direction::North => (Point::new(c.x, b.y), Point::new(b.x, b.bottom()), Point::new(b.right(), b.bottom())),
        Direction::East => (Point::new(b.right(), c.y), Point::new(b.x, b.y), Point::new(b.x, b.bottom())),
        Direction::South => (Point::new(c.x, b.bottom()), Point::new(b.right(), b.y), Point::new(b.x, b.y)),
        Direction::West => (Point::new(b.x, c.y), Point::new(b.right(), b.bottom()), Point::new(b.right(), b.y)),
    };
    ctx.begin_path();
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(left.x, left.y);
    ctx.line_to(right.x, right.y);
    ctx.close_path();
    ctx.fill();
}
