//! Input side of the audit: decoded drawing primitives.

pub mod primitives;

pub use primitives::{PrimitiveParseError, Primitives, SymbolInstance, TextAnnotation, WirePrimitive};
