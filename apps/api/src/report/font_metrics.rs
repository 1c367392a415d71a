//! Static font-metric table for the PDF report font (Helvetica, a PDF standard font).
//!
//! Character widths are in em units (relative to font size), taken from the
//! Adobe Helvetica metrics. The table covers ASCII 0x20..=0x7E (95 printable characters);
//! index = (char as usize) - 32. Anything else falls back to `average_char_width`.

use serde::Serialize;

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Layout parameters for a single report page, in PDF points.
#[derive(Debug, Clone, Serialize)]
pub struct PageConfig {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
    pub font_size_pt: f32,
    pub heading_size_pt: f32,
    pub title_size_pt: f32,
    /// Baseline-to-baseline distance for body text.
    pub line_height_pt: f32,
}

impl PageConfig {
    /// Usable text width in em units at the body font size.
    pub fn text_width_em(&self) -> f32 {
        (self.width_pt - 2.0 * self.margin_pt) / self.font_size_pt
    }
}

/// A4 portrait, 50pt margins, 11pt body text.
/// text_width_em = (595 − 100) ÷ 11 = 45em.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        width_pt: 595.0,
        height_pt: 842.0,
        margin_pt: 50.0,
        font_size_pt: 11.0,
        heading_size_pt: 13.0,
        title_size_pt: 20.0,
        line_height_pt: 15.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

pub struct FontMetricTable {
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Greedy word-wrap at `max_width_em`.
    ///
    /// Words wider than a whole line are split across lines at character boundaries.
    /// Returns no lines for blank input.
    pub fn wrap(&self, s: &str, max_width_em: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            for piece in self.split_long_word(word, max_width_em) {
                let piece_w = self.measure_str(&piece);
                if current.is_empty() {
                    current = piece;
                    current_width = piece_w;
                } else if current_width + self.space_width + piece_w > max_width_em {
                    lines.push(std::mem::take(&mut current));
                    current = piece;
                    current_width = piece_w;
                } else {
                    current.push(' ');
                    current.push_str(&piece);
                    current_width += self.space_width + piece_w;
                }
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn split_long_word(&self, word: &str, max_width_em: f32) -> Vec<String> {
        if self.measure_str(word) <= max_width_em {
            return vec![word.to_string()];
        }
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut width = 0.0_f32;
        for c in word.chars() {
            let w = self.char_width(c);
            if !piece.is_empty() && width + w > max_width_em {
                pieces.push(std::mem::take(&mut piece));
                width = 0.0;
            }
            piece.push(c);
            width += w;
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

/// Helvetica (regular).
pub static HELVETICA: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};
