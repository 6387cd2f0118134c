//! Cell styles: a typed key enum over a sparse string map.
//!
//! A style is written as `name;key=value;key=value`, the way diagram files
//! store it. Bare tokens without `=` are named stylesheet entries (`ellipse`,
//! `text`). Keys the engine understands parse into [`StyleKey`]; anything
//! else is kept verbatim so round-tripping a style never loses data.
//!
//! [`Stylesheet`] supplies the defaults that a [`crate::view::ViewState`]
//! merges under the cell's own style.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Style properties with engine-level meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StyleKey {
    Shape,
    Rotation,
    Locked,
    Connectable,
    Container,
    Rotatable,
    PortConstraint,
    Image,
    StrokeColor,
    StrokeWidth,
    FillColor,
    GradientColor,
    GradientDirection,
    Opacity,
    Shadow,
    Dashed,
    DashPattern,
    Rounded,
    Glass,
    FontFamily,
    FontSize,
    FontColor,
    FontStyle,
    Align,
    VerticalAlign,
    LabelBackgroundColor,
    Html,
    WhiteSpace,
    EdgeStyle,
    Curved,
    Elbow,
    JumpStyle,
    JumpSize,
    StartArrow,
    EndArrow,
    StartFill,
    EndFill,
    StartSize,
    EndSize,
    SourcePerimeterSpacing,
    TargetPerimeterSpacing,
}

impl StyleKey {
    /// Every known key, in serialization order.
    pub const ALL: &'static [StyleKey] = &[
        Self::Shape,
        Self::Rotation,
        Self::Locked,
        Self::Connectable,
        Self::Container,
        Self::Rotatable,
        Self::PortConstraint,
        Self::Image,
        Self::StrokeColor,
        Self::StrokeWidth,
        Self::FillColor,
        Self::GradientColor,
        Self::GradientDirection,
        Self::Opacity,
        Self::Shadow,
        Self::Dashed,
        Self::DashPattern,
        Self::Rounded,
        Self::Glass,
        Self::FontFamily,
        Self::FontSize,
        Self::FontColor,
        Self::FontStyle,
        Self::Align,
        Self::VerticalAlign,
        Self::LabelBackgroundColor,
        Self::Html,
        Self::WhiteSpace,
        Self::EdgeStyle,
        Self::Curved,
        Self::Elbow,
        Self::JumpStyle,
        Self::JumpSize,
        Self::StartArrow,
        Self::EndArrow,
        Self::StartFill,
        Self::EndFill,
        Self::StartSize,
        Self::EndSize,
        Self::SourcePerimeterSpacing,
        Self::TargetPerimeterSpacing,
    ];

    /// The key as written in a style string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shape => "shape",
            Self::Rotation => "rotation",
            Self::Locked => "locked",
            Self::Connectable => "connectable",
            Self::Container => "container",
            Self::Rotatable => "rotatable",
            Self::PortConstraint => "portConstraint",
            Self::Image => "image",
            Self::StrokeColor => "strokeColor",
            Self::StrokeWidth => "strokeWidth",
            Self::FillColor => "fillColor",
            Self::GradientColor => "gradientColor",
            Self::GradientDirection => "gradientDirection",
            Self::Opacity => "opacity",
            Self::Shadow => "shadow",
            Self::Dashed => "dashed",
            Self::DashPattern => "dashPattern",
            Self::Rounded => "rounded",
            Self::Glass => "glass",
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::FontColor => "fontColor",
            Self::FontStyle => "fontStyle",
            Self::Align => "align",
            Self::VerticalAlign => "verticalAlign",
            Self::LabelBackgroundColor => "labelBackgroundColor",
            Self::Html => "html",
            Self::WhiteSpace => "whiteSpace",
            Self::EdgeStyle => "edgeStyle",
            Self::Curved => "curved",
            Self::Elbow => "elbow",
            Self::JumpStyle => "jumpStyle",
            Self::JumpSize => "jumpSize",
            Self::StartArrow => "startArrow",
            Self::EndArrow => "endArrow",
            Self::StartFill => "startFill",
            Self::EndFill => "endFill",
            Self::StartSize => "startSize",
            Self::EndSize => "endSize",
            Self::SourcePerimeterSpacing => "sourcePerimeterSpacing",
            Self::TargetPerimeterSpacing => "targetPerimeterSpacing",
        }
    }

    /// Parse a key name. Unknown names return `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<StyleKey> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sparse style dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Style {
    names: Vec<String>,
    known: BTreeMap<StyleKey, String>,
    custom: BTreeMap<String, String>,
}

impl Style {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `name;key=value;…` style string. Empty tokens are skipped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut style = Self::new();
        for token in raw.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            match token.split_once('=') {
                Some((key, value)) => match StyleKey::from_name(key) {
                    Some(k) => {
                        style.known.insert(k, value.to_owned());
                    }
                    None => {
                        style.custom.insert(key.to_owned(), value.to_owned());
                    }
                },
                None => style.names.push(token.to_owned()),
            }
        }
        style
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, key: StyleKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: StyleKey) -> Option<&str> {
        self.known.get(&key).map(String::as_str)
    }

    /// Whether the key is explicitly present in this style.
    #[must_use]
    pub fn contains(&self, key: StyleKey) -> bool {
        self.known.contains_key(&key)
    }

    pub fn set(&mut self, key: StyleKey, value: impl Into<String>) {
        self.known.insert(key, value.into());
    }

    /// Set or, for `None`, remove a key.
    pub fn put(&mut self, key: StyleKey, value: Option<&str>) {
        match value {
            Some(v) => self.set(key, v),
            None => {
                self.remove(key);
            }
        }
    }

    pub fn remove(&mut self, key: StyleKey) -> Option<String> {
        self.known.remove(&key)
    }

    #[must_use]
    pub fn get_custom(&self, key: &str) -> Option<&str> {
        self.custom.get(key).map(String::as_str)
    }

    pub fn set_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.insert(key.into(), value.into());
    }

    /// Named stylesheet entries in declaration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Known keys and their values in key order.
    pub fn entries(&self) -> impl Iterator<Item = (StyleKey, &str)> {
        self.known.iter().map(|(k, v)| (*k, v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.known.is_empty() && self.custom.is_empty()
    }

    /// `1`/`true` flags. Absent keys are `default`.
    #[must_use]
    pub fn flag(&self, key: StyleKey, default: bool) -> bool {
        match self.get(key) {
            Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
            None => default,
        }
    }

    #[must_use]
    pub fn number(&self, key: StyleKey) -> Option<f64> {
        let raw = self.get(key)?;
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Some(n),
            _ => None,
        }
    }

    /// Copy of this style with every key of `defaults` it lacks filled in.
    #[must_use]
    pub fn merged_over(&self, defaults: &Style) -> Style {
        let mut out = defaults.clone();
        out.names.clone_from(&self.names);
        for (k, v) in &self.known {
            out.known.insert(*k, v.clone());
        }
        for (k, v) in &self.custom {
            out.custom.insert(k.clone(), v.clone());
        }
        out
    }

    /// Coarse shape family used to decide whether two shapes are "the same
    /// kind of thing". `mxgraph.flowchart.process` belongs to
    /// `mxgraph.flowchart`; an absent shape is a rectangle.
    #[must_use]
    pub fn shape_family(&self) -> String {
        let shape = self
            .get(StyleKey::Shape)
            .or_else(|| self.names.first().map(String::as_str))
            .unwrap_or("rectangle");
        let shape = if shape == "rect" { "rectangle" } else { shape };
        match shape.rsplit_once('.') {
            Some((family, _)) => family.to_owned(),
            None => shape.to_owned(),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if !first {
                f.write_str(";")?;
            }
            first = false;
            Ok(())
        };
        for name in &self.names {
            sep(f)?;
            f.write_str(name)?;
        }
        for (k, v) in &self.known {
            sep(f)?;
            write!(f, "{k}={v}")?;
        }
        for (k, v) in &self.custom {
            sep(f)?;
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl From<String> for Style {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for Style {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<Style> for String {
    fn from(style: Style) -> Self {
        style.to_string()
    }
}

/// Default styles merged under every cell's own style.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub default_vertex: Style,
    pub default_edge: Style,
    named: BTreeMap<String, Style>,
}

impl Default for Stylesheet {
    fn default() -> Self {
        let default_vertex = Style::new()
            .with(StyleKey::Shape, "rectangle")
            .with(StyleKey::StrokeColor, "#000000")
            .with(StyleKey::FillColor, "#FFFFFF")
            .with(StyleKey::FontColor, "#000000")
            .with(StyleKey::FontSize, "11");
        let default_edge = Style::new()
            .with(StyleKey::Shape, "connector")
            .with(StyleKey::EndArrow, "classic")
            .with(StyleKey::StrokeColor, "#000000")
            .with(StyleKey::FontSize, "11");

        let mut named = BTreeMap::new();
        named.insert("ellipse".to_owned(), Style::new().with(StyleKey::Shape, "ellipse"));
        named.insert("rhombus".to_owned(), Style::new().with(StyleKey::Shape, "rhombus"));
        named.insert("triangle".to_owned(), Style::new().with(StyleKey::Shape, "triangle"));
        named.insert(
            "swimlane".to_owned(),
            Style::new().with(StyleKey::Shape, "swimlane").with(StyleKey::Container, "1"),
        );
        named.insert(
            "text".to_owned(),
            Style::new()
                .with(StyleKey::StrokeColor, "none")
                .with(StyleKey::FillColor, "none"),
        );
        named.insert("group".to_owned(), Style::new().with(StyleKey::Connectable, "0"));

        Self { default_vertex, default_edge, named }
    }
}

impl Stylesheet {
    /// Register or replace a named style.
    pub fn put_named(&mut self, name: impl Into<String>, style: Style) {
        self.named.insert(name.into(), style);
    }

    /// Resolve a cell style: defaults, then named entries, then explicit keys.
    #[must_use]
    pub fn resolve(&self, style: &Style, is_edge: bool) -> Style {
        let mut base = if is_edge { self.default_edge.clone() } else { self.default_vertex.clone() };
        for name in style.names() {
            if let Some(named) = self.named.get(name) {
                base = named.merged_over(&base);
            }
        }
        style.merged_over(&base)
    }
}
