//! Render layers for primitive z-ordering.
//!
//! Every [`Primitive`](crate::draw::Primitive) carries a [`Layer`]. The
//! render pipeline draws layers from bottom to top in declaration order and
//! only then consults a primitive's explicit z-index.

/// Defines the rendering layers of a figure.
///
/// Layers are rendered from bottom to top in the order defined by variant
/// declaration. The `Ord` derive uses declaration order, so the first variant
/// renders first (bottom) and the last variant renders last (top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Figure and cell backgrounds
    Background,
    /// Grid lines of charts and tables
    Grid,
    /// Value and category axes
    Axis,
    /// Filled areas and flow links
    Area,
    /// Series lines
    Line,
    /// Bars and diagram nodes
    Bar,
    /// Point markers
    Point,
    /// Data labels, cell text, axis and node labels
    Label,
    /// Legend entries
    Legend,
    /// Caption, sub-caption and footnote
    Surround,
}

impl Layer {
    /// All layers, bottom to top.
    pub const ALL: [Layer; 10] = [
        Self::Background,
        Self::Grid,
        Self::Axis,
        Self::Area,
        Self::Line,
        Self::Bar,
        Self::Point,
        Self::Label,
        Self::Legend,
        Self::Surround,
    ];

    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Grid => "grid",
            Self::Axis => "axis",
            Self::Area => "area",
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Point => "point",
            Self::Label => "label",
            Self::Legend => "legend",
            Self::Surround => "surround",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_order_matches_declaration() {
        let mut sorted = Layer::ALL;
        sorted.sort();
        assert_eq!(sorted, Layer::ALL);
        assert!(Layer::Background < Layer::Grid);
        assert!(Layer::Bar < Layer::Point);
        assert!(Layer::Label < Layer::Surround);
    }

    #[test]
    fn test_layer_names_are_unique() {
        let names: std::collections::HashSet<_> = Layer::ALL.iter().map(Layer::name).collect();
        assert_eq!(names.len(), Layer::ALL.len());
    }
}
