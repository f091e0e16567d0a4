//! Label extent measurement.
//!
//! The label pass only needs a width and height per label. Real glyph metrics
//! depend on the renderer, so measurement sits behind [`TextMeasure`]; the
//! default [`MonospaceMeasure`] approximates every glyph with the same advance.

use unicode_width::UnicodeWidthStr;

/// Computes the rendered extent of a label.
pub trait TextMeasure {
    /// Width and height of `text` rendered at `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// Fixed-advance metric.
///
/// Width is the widest line's display columns times `char_width * font_size`
/// (East Asian wide glyphs count as two columns). Height is the number of lines
/// times `line_height * font_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub char_width: f64,
    pub line_height: f64,
}

impl MonospaceMeasure {
    pub fn new(char_width: f64, line_height: f64) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(0.6, 1.2)
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let mut columns = 0;
        let mut lines = 0;
        for line in text.lines() {
            columns = columns.max(line.width());
            lines += 1;
        }
        // "a\n" has one line, "\n" has one empty line
        let lines = lines.max(1);
        (
            columns as f64 * self.char_width * font_size,
            lines as f64 * self.line_height * font_size,
        )
    }
}
