//! Style cascade: the session's "last used" vertex and edge styles.
//!
//! The cascade watches style edits and remembers the keys it cares about, then
//! applies what it remembers to newly inserted cells. A key the new cell sets
//! explicitly always wins over the cascade.

#[cfg(test)]
#[path = "cascade_test.rs"]
mod cascade_test;

use tracing::debug;

use crate::model::{CellId, Model, ModelError};
use crate::style::{Style, StyleKey};

/// Keys the cascade memorises at all.
pub const CASCADE_KEYS: &[StyleKey] = &[
    StyleKey::Rounded,
    StyleKey::Shadow,
    StyleKey::Glass,
    StyleKey::Dashed,
    StyleKey::DashPattern,
    StyleKey::LabelBackgroundColor,
    StyleKey::StrokeColor,
    StyleKey::StrokeWidth,
    StyleKey::FillColor,
    StyleKey::GradientColor,
    StyleKey::GradientDirection,
    StyleKey::Opacity,
    StyleKey::FontFamily,
    StyleKey::FontSize,
    StyleKey::FontColor,
    StyleKey::FontStyle,
    StyleKey::Align,
    StyleKey::VerticalAlign,
    StyleKey::Html,
    StyleKey::WhiteSpace,
    StyleKey::StartArrow,
    StyleKey::EndArrow,
    StyleKey::StartFill,
    StyleKey::EndFill,
    StyleKey::StartSize,
    StyleKey::EndSize,
    StyleKey::SourcePerimeterSpacing,
    StyleKey::TargetPerimeterSpacing,
    StyleKey::JumpStyle,
    StyleKey::JumpSize,
];

/// Keys that describe a connector and only ever update the edge style.
pub const CONNECTION_KEYS: &[StyleKey] = &[
    StyleKey::Shape,
    StyleKey::EdgeStyle,
    StyleKey::Curved,
    StyleKey::Rounded,
    StyleKey::Elbow,
    StyleKey::JumpStyle,
    StyleKey::JumpSize,
];

/// Keys that update the edge style even when the edit touched no edge.
pub const ALWAYS_EDGE_KEYS: &[StyleKey] = &[
    StyleKey::EdgeStyle,
    StyleKey::StartArrow,
    StyleKey::StartFill,
    StyleKey::StartSize,
    StyleKey::EndArrow,
    StyleKey::EndFill,
    StyleKey::EndSize,
];

/// Label keys shared by vertices and edges. Text insertion applies only these.
pub const SHARED_KEYS: &[StyleKey] = &[StyleKey::FontFamily, StyleKey::FontSize, StyleKey::FontColor];

/// Keys applied as a unit: if a new cell sets any key of a group, the cascade
/// applies none of that group.
pub const KEY_GROUPS: &[&[StyleKey]] = &[
    &[StyleKey::StartFill, StyleKey::StartArrow, StyleKey::StartSize, StyleKey::SourcePerimeterSpacing],
    &[StyleKey::EndFill, StyleKey::EndArrow, StyleKey::EndSize, StyleKey::TargetPerimeterSpacing],
    &[StyleKey::StrokeColor, StyleKey::StrokeWidth],
    &[StyleKey::FillColor, StyleKey::GradientColor, StyleKey::GradientDirection],
    &[StyleKey::Opacity],
    &[StyleKey::Html],
];

/// Keys written into every new connecting edge, after `edgeStyle`.
const EDGE_STYLE_KEYS: &[StyleKey] = &[
    StyleKey::Shape,
    StyleKey::Curved,
    StyleKey::Rounded,
    StyleKey::Elbow,
    StyleKey::JumpStyle,
    StyleKey::JumpSize,
];

/// Session-scoped "current style" for new vertices and edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleCascade {
    pub current_vertex_style: Style,
    pub current_edge_style: Style,
}

impl StyleCascade {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything. Called on document load.
    pub fn reset(&mut self) {
        self.current_vertex_style = Style::new();
        self.current_edge_style = Style::new();
    }

    /// Replace both dictionaries with explicitly chosen defaults.
    pub fn seed(&mut self, vertex: Style, edge: Style) {
        self.current_vertex_style = vertex;
        self.current_edge_style = edge;
    }

    /// Update the memorised styles from one style edit.
    ///
    /// `has_vertex`/`has_edge` describe the edited cells; an edit with no cells
    /// counts as both. Transparent or cleared stroke colours are ignored. A
    /// `None` value removes the key.
    pub fn observe_style_change(&mut self, keys: &[StyleKey], values: &[Option<String>], has_vertex: bool, has_edge: bool) {
        let (vertex, edge) = if has_vertex || has_edge { (has_vertex, has_edge) } else { (true, true) };
        for (key, value) in keys.iter().zip(values) {
            let key = *key;
            let value = value.as_deref();
            if key == StyleKey::StrokeColor && value.is_none_or(|v| v == "none") {
                continue;
            }
            let shared = SHARED_KEYS.contains(&key);
            let always_edge = ALWAYS_EDGE_KEYS.contains(&key);
            let cascaded = CASCADE_KEYS.contains(&key);
            if CONNECTION_KEYS.contains(&key) {
                if edge || always_edge {
                    self.current_edge_style.put(key, value);
                }
            } else if cascaded {
                if vertex || shared {
                    self.current_vertex_style.put(key, value);
                }
                if edge || shared || always_edge {
                    self.current_edge_style.put(key, value);
                }
            }
        }
        debug!(keys = keys.len(), vertex, edge, "cascade: style change observed");
    }

    /// Style for a new connecting edge: `edgeStyle` (default `none`), the
    /// remembered connector keys, and `html=1` unless remembered otherwise.
    #[must_use]
    pub fn create_current_edge_style(&self) -> Style {
        let current = &self.current_edge_style;
        let mut style = Style::new().with(StyleKey::EdgeStyle, current.get(StyleKey::EdgeStyle).unwrap_or("none"));
        for key in EDGE_STYLE_KEYS {
            if let Some(v) = current.get(*key) {
                style.set(*key, v);
            }
        }
        style.set(StyleKey::Html, current.get(StyleKey::Html).unwrap_or("1"));
        style
    }

    /// Style `cell` would get from the cascade. `as_text` restricts the applied
    /// keys to the shared label keys.
    #[must_use]
    pub fn styled(&self, style: &Style, is_edge: bool, as_text: bool) -> Style {
        let current = if is_edge { &self.current_edge_style } else { &self.current_vertex_style };
        let mut out = style.clone();
        let candidates: Vec<StyleKey> = if as_text {
            SHARED_KEYS.to_vec()
        } else if is_edge {
            let mut keys = CASCADE_KEYS.to_vec();
            keys.extend(CONNECTION_KEYS.iter().filter(|k| !CASCADE_KEYS.contains(k)));
            keys
        } else {
            CASCADE_KEYS.to_vec()
        };
        for key in candidates {
            if style.contains(key) || group_blocked(style, key) {
                continue;
            }
            if !is_edge && matches!(key, StyleKey::EdgeStyle | StyleKey::Shape) {
                continue;
            }
            if let Some(v) = current.get(key) {
                out.set(key, v);
            }
        }
        out
    }

    /// Apply the cascade to `cells` and their descendants, in place. Text
    /// labels (cells using the `text` named style) only take the shared keys.
    ///
    /// # Errors
    ///
    /// Propagates model errors; the caller's transaction rolls back.
    pub fn apply_to_inserted<M: Model + ?Sized>(&self, model: &mut M, cells: &[CellId]) -> Result<(), ModelError> {
        let mut stack: Vec<CellId> = cells.to_vec();
        while let Some(id) = stack.pop() {
            let Some(cell) = model.cell(id) else {
                continue;
            };
            stack.extend(cell.children.iter().copied());
            let as_text = cell.style.names().iter().any(|n| n == "text");
            let styled = self.styled(&cell.style, cell.is_edge(), as_text);
            if styled != cell.style {
                model.replace_style(id, styled)?;
            }
        }
        Ok(())
    }
}

/// Whether `style` sets another key of the group `key` belongs to.
fn group_blocked(style: &Style, key: StyleKey) -> bool {
    KEY_GROUPS
        .iter()
        .filter(|group| group.contains(&key))
        .any(|group| group.iter().any(|k| style.contains(*k)))
}
