//! Decoded drawing primitives
//!
//! The vector-drawing decoder runs outside this crate and hands over its
//! output as JSON: wire segments, symbol instances and text annotations,
//! each tagged with the drawing layer it came from.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::{LayerConfig, WireConfig};
use crate::geometry::{Point, Segment};

#[derive(Debug, Error)]
pub enum PrimitiveParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid primitives JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A straight wire between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePrimitive {
    pub p1: Point,
    pub p2: Point,
    #[serde(default)]
    pub layer: String,
}

impl WirePrimitive {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            layer: String::new(),
        }
    }

    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    pub fn segment(&self) -> Segment {
        Segment::new(self.p1, self.p2)
    }
}

/// An inserted block/symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInstance {
    pub name: String,
    pub position: Point,
    #[serde(default)]
    pub layer: String,
}

impl SymbolInstance {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
            layer: String::new(),
        }
    }

    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub text: String,
    pub position: Point,
    #[serde(default)]
    pub layer: String,
}

impl TextAnnotation {
    pub fn new(text: impl Into<String>, position: Point) -> Self {
        Self {
            text: text.into(),
            position,
            layer: String::new(),
        }
    }

    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }
}

/// All primitives of one drawing, in decoder order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Primitives {
    #[serde(default)]
    pub wires: Vec<WirePrimitive>,
    #[serde(default)]
    pub symbols: Vec<SymbolInstance>,
    #[serde(default)]
    pub texts: Vec<TextAnnotation>,
}

impl Primitives {
    pub fn from_json_str(content: &str) -> Result<Self, PrimitiveParseError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, PrimitiveParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty() && self.symbols.is_empty() && self.texts.is_empty()
    }

    /// Keep only primitives on accepted layers.
    ///
    /// `layers` applies to every kind; `wires.layers`, when non-empty, further
    /// restricts which segments count as wires.
    pub fn filter_layers(&self, layers: &LayerConfig, wires: &WireConfig) -> Primitives {
        let filtered = Primitives {
            wires: self
                .wires
                .iter()
                .filter(|w| layers.accepts(&w.layer))
                .filter(|w| wires.layers.is_empty() || wires.layers.contains(&w.layer))
                .cloned()
                .collect(),
            symbols: self
                .symbols
                .iter()
                .filter(|s| layers.accepts(&s.layer))
                .cloned()
                .collect(),
            texts: self
                .texts
                .iter()
                .filter(|t| layers.accepts(&t.layer))
                .cloned()
                .collect(),
        };

        tracing::debug!(
            "Layer filter kept {}/{} wires, {}/{} symbols, {}/{} texts",
            filtered.wires.len(),
            self.wires.len(),
            filtered.symbols.len(),
            self.symbols.len(),
            filtered.texts.len(),
            self.texts.len()
        );
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let json = r#"{
            "wires": [{"p1": {"x": 0, "y": 0}, "p2": {"x": 10, "y": 0}, "layer": "WIRE"}],
            "symbols": [{"name": "GND", "position": {"x": 0.5, "y": 0.5}}]
        }"#;
        let prims = Primitives::from_json_str(json).expect("valid primitives");

        assert_eq!(prims.wires.len(), 1);
        assert_eq!(prims.wires[0].layer, "WIRE");
        assert_eq!(prims.wires[0].segment().length(), 10.0);
        assert_eq!(prims.symbols[0].layer, "");
        assert!(prims.texts.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = Primitives::from_json_str("{\"wires\": 3}").unwrap_err();
        assert!(matches!(err, PrimitiveParseError::Json(_)));
    }

    #[test]
    fn test_filter_layers() {
        let prims = Primitives {
            wires: vec![
                WirePrimitive::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0)).on_layer("WIRE"),
                WirePrimitive::new(Point::new(0.0, 0.0), Point::new(0.0, 1.0)).on_layer("FRAME"),
                WirePrimitive::new(Point::new(2.0, 0.0), Point::new(3.0, 0.0)).on_layer("HATCH"),
            ],
            symbols: vec![
                SymbolInstance::new("CT1", Point::new(0.0, 0.0)).on_layer("WIRE"),
                SymbolInstance::new("TITLE", Point::new(0.0, 0.0)).on_layer("FRAME"),
            ],
            texts: vec![TextAnnotation::new("Sheet 1", Point::new(0.0, 0.0)).on_layer("FRAME")],
        };

        let layers = LayerConfig {
            include: vec![],
            exclude: vec!["FRAME".to_string()],
        };
        let wires = WireConfig {
            layers: vec!["WIRE".to_string()],
        };
        let kept = prims.filter_layers(&layers, &wires);

        assert_eq!(kept.wires.len(), 1);
        assert_eq!(kept.wires[0].layer, "WIRE");
        assert_eq!(kept.symbols.len(), 1);
        assert_eq!(kept.symbols[0].name, "CT1");
        assert!(kept.texts.is_empty());
        assert!(!kept.is_empty());

        let only = LayerConfig {
            include: vec!["ANNOTATION".to_string()],
            exclude: vec![],
        };
        assert!(prims.filter_layers(&only, &WireConfig::default()).is_empty());
    }
}
