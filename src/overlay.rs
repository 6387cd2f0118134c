//! Transient affordances handed to a renderer.
//!
//! The controllers describe what should be on screen; they never draw. All
//! rectangles are in screen space.

use serde::Serialize;

use crate::geom::{Direction, Point, Rect};
use crate::model::EdgeEnd;

/// A control offered during hover or drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Affordance {
    Arrow(Direction),
    StyleReplace,
    Endpoint(EdgeEnd),
    DragHandle,
}

/// One affordance as it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AffordanceVisual {
    pub affordance: Affordance,
    pub bounds: Rect,
    /// 0–100.
    pub opacity: u8,
}

/// Outline of what a drop or connect would produce.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Preview {
    /// Bounds of the cells that would be inserted or restyled.
    pub bounds: Option<Rect>,
    /// Connector from the source to the new cell, if one would be created.
    pub connector: Option<(Point, Point)>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Overlay {
    pub affordances: Vec<AffordanceVisual>,
    pub preview: Preview,
    /// Bounds of the current drop or connect target.
    pub highlight: Option<Rect>,
}

impl Overlay {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.affordances.is_empty() && self.preview.bounds.is_none() && self.preview.connector.is_none() && self.highlight.is_none()
    }

    /// Visual for one affordance.
    #[must_use]
    pub fn find(&self, affordance: Affordance) -> Option<&AffordanceVisual> {
        self.affordances.iter().find(|a| a.affordance == affordance)
    }
}
