use std::fmt::Write as _;
use std::path::Path;

use crate::engine::error::ReportResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
}

impl TextStyle {
    pub const TITLE: TextStyle = TextStyle { size: 24.0, bold: true };
    pub const SUBTITLE: TextStyle = TextStyle { size: 18.0, bold: true };
    pub const HEADING: TextStyle = TextStyle { size: 20.0, bold: true };
    pub const CHART_LABEL: TextStyle = TextStyle { size: 16.0, bold: true };
    pub const LABEL: TextStyle = TextStyle { size: 14.0, bold: false };
    pub const DETAIL: TextStyle = TextStyle { size: 12.0, bold: false };
    pub const SECTION_HEADER: TextStyle = TextStyle { size: 12.0, bold: true };
    pub const BODY: TextStyle = TextStyle { size: 10.0, bold: false };
}

/// Drawing surface behind `DocumentBuilder`.
///
/// Coordinates are PDF points with the origin at the bottom-left corner.
/// The canvas starts with one open page.
pub trait PageCanvas {
    /// Converted vector drawing, ready to place.
    type Vector;

    fn start_page(&mut self);

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);

    /// Convert SVG markup to native drawing primitives without touching
    /// any page. One SVG user unit becomes one point.
    fn prepare_vector(&self, markup: &str) -> Result<Self::Vector, String>;

    /// Place a prepared drawing with its bottom-left corner at `(x, y)`,
    /// scaled uniformly by `scale`.
    fn draw_vector(&mut self, vector: Self::Vector, x: f32, y: f32, scale: f32);

    /// Serialize every page to `path`.
    fn save(self, path: &Path) -> ReportResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        x: f32,
        y: f32,
        style: TextStyle,
        text: String,
    },
    Vector {
        page: usize,
        x: f32,
        y: f32,
        scale: f32,
    },
}

/// Canvas that keeps every operation in memory and saves a plain-text
/// listing of them. Used to inspect layout without producing a PDF.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    page: usize,
    ops: Vec<DrawOp>,
    reject_vectors: bool,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `prepare_vector` call fails, as with markup the converter rejects.
    pub fn rejecting_vectors() -> Self {
        Self {
            reject_vectors: true,
            ..Self::default()
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    /// Text drawn on `page`, top to bottom in drawing order.
    pub fn texts_on(&self, page: usize) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { page: p, text, .. } if *p == page => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn vectors_on(&self, page: usize) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Vector { page: p, .. } if *p == page))
            .count()
    }

    pub fn listing(&self) -> String {
        let mut out = String::new();
        for op in &self.ops {
            let _ = match op {
                DrawOp::Text { page, y, text, .. } => writeln!(out, "[{}] {:>7.2} {}", page + 1, y, text),
                DrawOp::Vector { page, y, scale, .. } => {
                    writeln!(out, "[{}] {:>7.2} <vector x{}>", page + 1, y, scale)
                }
            };
        }
        out
    }
}

impl PageCanvas for RecordingCanvas {
    type Vector = ();

    fn start_page(&mut self) {
        self.page += 1;
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            page: self.page,
            x,
            y,
            style,
            text: text.to_string(),
        });
    }

    fn prepare_vector(&self, _markup: &str) -> Result<(), String> {
        if self.reject_vectors {
            return Err("vector conversion rejected".into());
        }
        Ok(())
    }

    fn draw_vector(&mut self, _vector: (), x: f32, y: f32, scale: f32) {
        self.ops.push(DrawOp::Vector {
            page: self.page,
            x,
            y,
            scale,
        });
    }

    fn save(self, path: &Path) -> ReportResult<()> {
        std::fs::write(path, self.listing())?;
        Ok(())
    }
}
