//! Drop-and-connect interaction engine for a graph diagram editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser next to the
//! diagram canvas. It owns the drag-and-drop and quick-connect gestures: hover
//! arrows around a vertex, drop-target resolution while a palette payload is
//! dragged, the solver that positions the result, and the style cascade that
//! remembers the last edge and vertex styles the user picked. The host
//! JavaScript layer wires DOM events into [`engine::Engine`] and reacts to the
//! [`engine::Action`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`model`] | Cell store, transactions and change events |
//! | [`view`] | Screen-space cell states and hit-testing |
//! | [`geom`] | Points, rectangles and directions |
//! | [`style`] | Style maps and the default stylesheet |
//! | [`selection`] | Selection set and handle visibility |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hover`] | Hover arrows and click/drag-to-connect |
//! | [`drag`] | Drag session, drop intents and the affordances they show |
//! | [`hit`] | Drop target and hover target rules |
//! | [`solver`] | Placement geometry for drops, clones and connections |
//! | [`ops`] | Commit plans and their transactional execution |
//! | [`cascade`] | Current edge and vertex style bookkeeping |
//! | [`overlay`] | Transient visuals handed to the renderer |
//! | [`render`] | Overlay painting on a 2D context |
//! | [`schedule`] | Deferred timers for dwell-based activation |
//! | [`clock`] | Time sources (system, browser, manual) |
//! | [`config`] | Tunable thresholds loaded from JSON or the environment |
//! | [`consts`] | Shared numeric constants (delays, sizes, tolerances) |

pub mod cascade;
pub mod clock;
pub mod config;
pub mod consts;
pub mod drag;
pub mod engine;
pub mod geom;
pub mod hit;
pub mod hover;
pub mod input;
pub mod model;
pub mod ops;
pub mod overlay;
pub mod render;
pub mod schedule;
pub mod selection;
pub mod solver;
pub mod style;
pub mod view;
