//! Selection state and the selection chrome that affordances must avoid.
//!
//! Selected vertices carry resize handles and a rotation handle. Affordances
//! are laid out around a *decorated* box that includes this chrome, and a drag
//! gesture temporarily hides the handles of its target through a
//! [`HandlesHidden`] guard that restores them when dropped, on every exit path.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::rc::Rc;

use crate::consts::{HANDLE_SIZE_PX, ROTATE_HANDLE_OFFSET_PX, ROTATE_HANDLE_RADIUS_PX};
use crate::geom::{Point, Rect};
use crate::model::{CellId, ModelRead};
use crate::style::StyleKey;
use crate::view::ViewState;

/// Selection capability.
pub trait Selection {
    /// Currently selected cells in selection order.
    fn current(&self) -> &[CellId];

    /// Replace the selection.
    fn set(&mut self, cells: Vec<CellId>);

    fn is_selected(&self, cell: CellId) -> bool {
        self.current().contains(&cell)
    }
}

/// Shared hide counter for selection handles.
#[derive(Debug, Clone, Default)]
pub struct HandleVisibility {
    hidden: Rc<std::cell::Cell<usize>>,
}

impl HandleVisibility {
    /// Hide handles until the returned guard is dropped.
    #[must_use]
    pub fn hide(&self) -> HandlesHidden {
        self.hidden.set(self.hidden.get() + 1);
        HandlesHidden { hidden: Rc::clone(&self.hidden) }
    }

    #[must_use]
    pub fn visible(&self) -> bool {
        self.hidden.get() == 0
    }
}

/// Scoped "handles hidden" acquisition. Dropping it releases the hide.
#[derive(Debug)]
pub struct HandlesHidden {
    hidden: Rc<std::cell::Cell<usize>>,
}

impl Drop for HandlesHidden {
    fn drop(&mut self) {
        self.hidden.set(self.hidden.get().saturating_sub(1));
    }
}

/// Extra chrome drawn around a selected vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionChrome {
    /// Horizontal padding added so handles of small shapes sit outside them.
    pub horizontal_offset: f64,
    /// Vertical padding, as above.
    pub vertical_offset: f64,
    /// Bounds of the visible rotation handle, if any.
    pub rotation_handle: Option<Rect>,
}

/// The editor's selection plus handle visibility.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    cells: Vec<CellId>,
    handles: HandleVisibility,
}

impl SelectionModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn handles(&self) -> &HandleVisibility {
        &self.handles
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop selected cells that no longer exist.
    pub fn retain_existing(&mut self, model: &impl ModelRead) {
        self.cells.retain(|id| model.contains(*id));
    }

    /// Chrome for `state` if its cell is selected and handles are showing.
    ///
    /// Handles of a shape too small to hold two handles plus tolerance on an
    /// axis are pushed outward; the rotation handle is only shown for a
    /// single selected, rotatable vertex.
    #[must_use]
    pub fn chrome_for(&self, state: &ViewState, tolerance: f64) -> Option<SelectionChrome> {
        if !self.is_selected(state.cell) || !self.handles.visible() || state.is_edge() {
            return None;
        }
        let b = state.bounds;
        let mut chrome = SelectionChrome::default();
        if b.width < 2.0 * HANDLE_SIZE_PX + 2.0 * tolerance || b.height < 2.0 * HANDLE_SIZE_PX + 2.0 * tolerance {
            let tol = tolerance / 2.0;
            chrome.horizontal_offset = HANDLE_SIZE_PX + tol;
            chrome.vertical_offset = HANDLE_SIZE_PX + tol;
        }
        if self.cells.len() == 1 && state.style.flag(StyleKey::Rotatable, true) {
            let top = b.y - chrome.vertical_offset / 2.0 - ROTATE_HANDLE_OFFSET_PX;
            let center = Point::new(b.center().x, top);
            chrome.rotation_handle = Some(Rect::centered(center, 2.0 * ROTATE_HANDLE_RADIUS_PX, 2.0 * ROTATE_HANDLE_RADIUS_PX));
        }
        Some(chrome)
    }
}

impl Selection for SelectionModel {
    fn current(&self) -> &[CellId] {
        &self.cells
    }

    fn set(&mut self, cells: Vec<CellId>) {
        self.cells = cells;
    }
}
