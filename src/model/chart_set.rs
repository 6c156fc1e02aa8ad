use std::collections::BTreeMap;
use std::fmt;

/// Root element every chart diagram must contain.
pub const SVG_MARKER: &str = "<svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    /// Primary birth chart (D1).
    Lagna,
    /// Ninth-harmonic divisional chart (D9).
    Navamsa,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Lagna, ChartKind::Navamsa];

    /// Value sent as `chart_code`.
    pub fn code(self) -> &'static str {
        match self {
            ChartKind::Lagna => "Lagna",
            ChartKind::Navamsa => "Navamsa",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Lagna => "Lagna Chart (Birth Chart)",
            ChartKind::Navamsa => "Navamsa Chart (D9)",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// True when `markup` is worth handing to the renderer.
pub fn looks_like_svg(markup: &str) -> bool {
    !markup.trim().is_empty() && markup.contains(SVG_MARKER)
}

/// Chart diagrams that survived normalization. A kind with no entry is
/// simply not drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSet {
    charts: BTreeMap<ChartKind, String>,
}

impl ChartSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `markup` only if it carries the SVG root marker.
    pub fn insert(&mut self, kind: ChartKind, markup: String) -> bool {
        if !looks_like_svg(&markup) {
            return false;
        }
        self.charts.insert(kind, markup);
        true
    }

    pub fn get(&self, kind: ChartKind) -> Option<&str> {
        self.charts.get(&kind).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
