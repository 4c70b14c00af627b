use crate::errors::WebscanError;
use crate::report::finding::sanitize_text;

/// Hard cap on emitted pages. Hitting it means the geometry or input is
/// malformed, and the build fails rather than looping.
const MAX_PAGES: usize = 200;

pub const LINE_HEIGHT: f64 = 4.5;
pub const KEY_VALUE_LINE_HEIGHT: f64 = 4.4;
pub const TABLE_LINE_HEIGHT: f64 = 4.2;
pub const TABLE_HEADER_HEIGHT: f64 = 8.0;
pub const MIN_ROW_HEIGHT: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub mod colors {
    use super::Color;

    pub const TEXT: Color = Color::new(31, 41, 55);
    pub const TITLE: Color = Color::new(15, 23, 42);
    pub const SUMMARY_BOX_FILL: Color = Color::new(224, 242, 254);
    pub const SUMMARY_BOX_BORDER: Color = Color::new(3, 105, 161);
    pub const TABLE_HEADER_FILL: Color = Color::new(235, 244, 255);
    pub const TABLE_HEADER_TEXT: Color = Color::new(30, 58, 138);
    pub const TABLE_BORDER: Color = Color::new(209, 213, 219);
    pub const SQLI: Color = Color::new(185, 28, 28);
    pub const SQLI_FILL: Color = Color::new(254, 226, 226);
    pub const XSS: Color = Color::new(194, 65, 12);
    pub const XSS_FILL: Color = Color::new(255, 237, 213);
    pub const CSRF: Color = Color::new(29, 78, 216);
    pub const CSRF_FILL: Color = Color::new(219, 234, 254);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontKind,
    pub size: f64,
    pub color: Color,
}

impl TextStyle {
    pub fn regular(size: f64, color: Color) -> Self {
        Self {
            font: FontKind::Regular,
            size,
            color,
        }
    }

    pub fn bold(size: f64, color: Color) -> Self {
        Self {
            font: FontKind::Bold,
            size,
            color,
        }
    }
}

/// One primitive on a page. Coordinates are in millimetres from the
/// top-left corner; the PDF backend flips the axis.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        lines: Vec<String>,
        line_height: f64,
        style: TextStyle,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Fixed page geometry in millimetres. Defaults to A4 portrait with the
/// margins the report has always used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
        margin: 14.0,
    };

    pub fn content_width(&self) -> f64 {
        self.width - self.margin * 2.0
    }

    pub fn usable_height(&self) -> f64 {
        self.height - self.margin * 2.0
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Approximate rendered width of a string in millimetres for the built-in
/// Helvetica faces. Per-character em classes keep wrapping deterministic
/// without shipping font metric tables.
pub fn text_width(text: &str, size: f64) -> f64 {
    const PT_TO_MM: f64 = 25.4 / 72.0;
    let em: f64 = text
        .chars()
        .map(|c| match c {
            'i' | 'l' | 'j' | 'I' | '.' | ',' | ':' | ';' | '!' | '|' | '\'' => 0.30,
            ' ' | 't' | 'f' | 'r' | '(' | ')' | '[' | ']' | '-' | '/' | '\\' => 0.36,
            'm' | 'w' | 'M' | 'W' | '@' => 0.85,
            'A'..='Z' | '0'..='9' => 0.62,
            _ => 0.52,
        })
        .sum();
    em * size * PT_TO_MM
}

/// Greedy word wrap against a width budget. Words wider than the budget
/// are split at character granularity so no line ever overflows.
pub fn split_text_to_size(text: &str, max_width: f64, size: f64) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        for piece in split_long_word(word, max_width, size) {
            let candidate = if current.is_empty() {
                piece.clone()
            } else {
                format!("{} {}", current, piece)
            };
            if text_width(&candidate, size) <= max_width || current.is_empty() {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current = piece;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn split_long_word(word: &str, max_width: f64, size: f64) -> Vec<String> {
    if text_width(word, size) <= max_width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        let mut candidate = current.clone();
        candidate.push(c);
        if text_width(&candidate, size) <= max_width || current.is_empty() {
            current = candidate;
        } else {
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Stateful cursor-based writer producing a paginated list of draw ops.
/// Identical input and geometry always yield an identical page layout.
pub struct DocumentBuilder {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f64,
}

impl DocumentBuilder {
    pub fn new(geometry: PageGeometry) -> Result<Self, WebscanError> {
        if geometry.content_width() < 20.0 || geometry.usable_height() < LINE_HEIGHT * 4.0 {
            return Err(WebscanError::Rendering(format!(
                "page geometry too small: {}x{} with margin {}",
                geometry.width, geometry.height, geometry.margin
            )));
        }
        Ok(Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.margin,
        })
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    pub(crate) fn cursor_y(&self) -> f64 {
        self.y
    }

    /// Move the cursor down for spacing, clamped to the bottom margin so
    /// spacing can never push it into the unwritable band.
    pub(crate) fn advance(&mut self, delta: f64) {
        let limit = self.geometry.height - self.geometry.margin;
        self.y = (self.y + delta).min(limit);
    }

    fn new_page(&mut self) -> Result<(), WebscanError> {
        if self.pages.len() >= MAX_PAGES {
            return Err(WebscanError::Rendering(format!(
                "page budget of {} pages exhausted",
                MAX_PAGES
            )));
        }
        self.pages.push(Page::default());
        self.y = self.geometry.margin;
        Ok(())
    }

    fn push(&mut self, op: DrawOp) {
        // new() seeds one page, so last_mut always succeeds
        self.pages.last_mut().unwrap().ops.push(op);
    }

    /// Start a new page if the next block of `needed` height would cross
    /// the bottom margin. Must be called before every write with a known
    /// height. A block that can never fit on an empty page is a rendering
    /// fault, not an overflow.
    pub fn ensure_space(&mut self, needed: f64) -> Result<(), WebscanError> {
        if needed > self.geometry.usable_height() {
            return Err(WebscanError::Rendering(format!(
                "block of height {:.1}mm exceeds usable page height {:.1}mm",
                needed,
                self.geometry.usable_height()
            )));
        }
        if self.y + needed > self.geometry.height - self.geometry.margin {
            self.new_page()?;
        }
        Ok(())
    }

    /// Place text at an absolute position on the current page. Cursor is
    /// untouched; callers are responsible for having reserved the space.
    pub(crate) fn text_at(&mut self, x: f64, y: f64, text: &str, style: TextStyle) {
        self.push(DrawOp::Text {
            x,
            y,
            lines: vec![sanitize_text(text)],
            line_height: LINE_HEIGHT,
            style,
        });
    }

    /// Place text with its right edge at `x_right`.
    pub(crate) fn text_right(&mut self, x_right: f64, y: f64, text: &str, style: TextStyle) {
        let clean = sanitize_text(text);
        let x = x_right - text_width(&clean, style.size);
        self.text_at(x, y, &clean, style);
    }

    pub(crate) fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
    ) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        });
    }

    /// Centered document title at a fixed offset on the current page.
    pub fn write_title(&mut self, title: &str) -> Result<(), WebscanError> {
        let style = TextStyle::bold(22.0, colors::TITLE);
        let clean = sanitize_text(title);
        let x = (self.geometry.width - text_width(&clean, style.size)) / 2.0;
        self.push(DrawOp::Text {
            x,
            y: 28.0,
            lines: vec![clean],
            line_height: LINE_HEIGHT,
            style,
        });
        self.y = 40.0;
        Ok(())
    }

    pub fn write_section_title(&mut self, title: &str, color: Color) -> Result<(), WebscanError> {
        self.ensure_space(10.0)?;
        let style = TextStyle::bold(13.0, color);
        let x = self.geometry.margin;
        let y = self.y;
        self.text_at(x, y, title, style);
        self.y += 6.0;
        Ok(())
    }

    /// Bold label with a wrapped value column. The label column width
    /// adapts to the label's rendered width, clamped to [36, 80] mm.
    pub fn write_key_value(
        &mut self,
        key: &str,
        value: &str,
        indent: f64,
    ) -> Result<(), WebscanError> {
        let label_style = TextStyle::bold(10.0, colors::TEXT);
        let value_style = TextStyle::regular(10.0, colors::TEXT);

        let safe_key = sanitize_text(key);
        let label = format!("{}:", safe_key);
        let dynamic = text_width(&label, label_style.size).ceil() + 8.0;
        let label_width = dynamic.clamp(36.0, 80.0);

        let margin = self.geometry.margin;
        let value_x = margin + indent + label_width;
        let value_width = self.geometry.content_width() - indent - label_width - 2.0;
        let value = sanitize_text(value);
        let value = if value.is_empty() { "-" } else { value.as_str() };
        let wrapped = split_text_to_size(value, value_width.max(10.0), value_style.size);
        let block_height = (wrapped.len() as f64 * KEY_VALUE_LINE_HEIGHT).max(5.5);

        // Reserve the trailing gap too so the cursor never lands past the
        // bottom margin.
        self.ensure_space(block_height + 0.8)?;
        let y = self.y;
        self.text_at(margin + indent, y, &label, label_style);
        self.push(DrawOp::Text {
            x: value_x,
            y,
            lines: wrapped,
            line_height: KEY_VALUE_LINE_HEIGHT,
            style: value_style,
        });
        self.y += block_height + 0.8;
        Ok(())
    }

    pub fn write_wrapped(&mut self, text: &str, indent: f64, size: f64) -> Result<(), WebscanError> {
        let style = TextStyle::regular(size, colors::TEXT);
        let width = self.geometry.content_width() - indent;
        let wrapped = split_text_to_size(&sanitize_text(text), width, size);

        self.ensure_space((wrapped.len() + 1) as f64 * LINE_HEIGHT)?;
        let advance = wrapped.len() as f64 * LINE_HEIGHT;
        self.push(DrawOp::Text {
            x: self.geometry.margin + indent,
            y: self.y,
            lines: wrapped,
            line_height: LINE_HEIGHT,
            style,
        });
        self.y += advance;
        Ok(())
    }

    /// A titled, numbered list where each entry wraps independently.
    pub fn write_numbered_list(
        &mut self,
        title: &str,
        items: &[String],
        indent: f64,
        size: f64,
    ) -> Result<(), WebscanError> {
        let style = TextStyle::regular(size, colors::TEXT);
        let width = self.geometry.content_width() - indent - 2.0;

        let mut lines = vec![format!("{}:", sanitize_text(title))];
        for (idx, item) in items.iter().enumerate() {
            let numbered = format!("{}. {}", idx + 1, sanitize_text(item));
            lines.extend(split_text_to_size(&numbered, width, size));
        }

        self.ensure_space((lines.len() + 1) as f64 * LINE_HEIGHT)?;
        let advance = lines.len() as f64 * LINE_HEIGHT;
        self.push(DrawOp::Text {
            x: self.geometry.margin + indent,
            y: self.y,
            lines,
            line_height: LINE_HEIGHT,
            style,
        });
        self.y += advance;
        Ok(())
    }

    /// Bordered table: header row, then data rows whose height follows the
    /// tallest wrapped cell. Rows are reserved whole, so a row that does
    /// not fit moves entirely to the next page.
    pub fn draw_table(
        &mut self,
        headers: &[&str],
        rows: &[Vec<String>],
        col_widths: &[f64],
        header_fill: Color,
        header_text: Color,
    ) -> Result<(), WebscanError> {
        debug_assert_eq!(headers.len(), col_widths.len());

        let margin = self.geometry.margin;
        let content_width = self.geometry.content_width();

        self.ensure_space(TABLE_HEADER_HEIGHT + 10.0)?;

        let y = self.y;
        self.rect(
            margin,
            y,
            content_width,
            TABLE_HEADER_HEIGHT,
            Some(header_fill),
            Some(colors::TABLE_BORDER),
        );

        let header_style = TextStyle::bold(9.0, header_text);
        let mut x = margin;
        for (i, header) in headers.iter().enumerate() {
            self.text_at(x + 1.5, y + 5.2, header, header_style);
            x += col_widths[i];
            if i < headers.len() - 1 {
                self.push(DrawOp::Line {
                    x1: x,
                    y1: y,
                    x2: x,
                    y2: y + TABLE_HEADER_HEIGHT,
                    color: colors::TABLE_BORDER,
                });
            }
        }
        self.y += TABLE_HEADER_HEIGHT;

        let cell_style = TextStyle::regular(9.0, colors::TEXT);
        for row in rows {
            let wrapped_cells: Vec<Vec<String>> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let cell = sanitize_text(cell);
                    let cell = if cell.is_empty() { "-" } else { cell.as_str() };
                    split_text_to_size(cell, (col_widths[i] - 3.0).max(4.0), cell_style.size)
                })
                .collect();

            let max_lines = wrapped_cells.iter().map(|c| c.len()).max().unwrap_or(1);
            let row_height = (max_lines as f64 * TABLE_LINE_HEIGHT + 2.0).max(MIN_ROW_HEIGHT);
            self.ensure_space(row_height)?;

            let row_y = self.y;
            self.rect(
                margin,
                row_y,
                content_width,
                row_height,
                None,
                Some(colors::TABLE_BORDER),
            );

            let mut cell_x = margin;
            let cell_count = wrapped_cells.len();
            for (i, lines) in wrapped_cells.into_iter().enumerate() {
                self.push(DrawOp::Text {
                    x: cell_x + 1.5,
                    y: row_y + 4.5,
                    lines,
                    line_height: TABLE_LINE_HEIGHT,
                    style: cell_style,
                });
                cell_x += col_widths[i];
                if i < cell_count - 1 {
                    self.push(DrawOp::Line {
                        x1: cell_x,
                        y1: row_y,
                        x2: cell_x,
                        y2: row_y + row_height,
                        color: colors::TABLE_BORDER,
                    });
                }
            }

            self.y += row_height;
        }

        self.advance(2.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(PageGeometry::A4).unwrap()
    }

    fn assert_within_margin(b: &DocumentBuilder) {
        let limit = b.geometry.height - b.geometry.margin;
        assert!(
            b.cursor_y() <= limit + 1e-9,
            "cursor {} beyond limit {}",
            b.cursor_y(),
            limit
        );
    }

    #[test]
    fn rejects_malformed_geometry() {
        let geometry = PageGeometry {
            width: 30.0,
            height: 30.0,
            margin: 14.0,
        };
        assert!(DocumentBuilder::new(geometry).is_err());
    }

    #[test]
    fn wrap_splits_on_word_boundaries() {
        let lines = split_text_to_size("alpha beta gamma delta epsilon", 25.0, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0) <= 25.0);
        }
        assert_eq!(
            lines.join(" "),
            "alpha beta gamma delta epsilon"
        );
    }

    #[test]
    fn wrap_breaks_oversized_words() {
        let word = "a".repeat(200);
        let lines = split_text_to_size(&word, 30.0, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0) <= 30.0);
        }
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn wrap_of_empty_text_is_single_empty_line() {
        assert_eq!(split_text_to_size("", 50.0, 9.0), vec![String::new()]);
    }

    #[test]
    fn cursor_never_crosses_bottom_margin() {
        let mut b = builder();
        b.write_title("SCANNING REPORT").unwrap();
        for i in 0..200 {
            b.write_key_value("Affected URL", &format!("https://example.com/path/{}", i), 0.0)
                .unwrap();
            assert_within_margin(&b);
        }
        assert!(b.page_count() > 1);
    }

    #[test]
    fn wrapped_writes_respect_margin() {
        let mut b = builder();
        let long = "lorem ipsum dolor sit amet ".repeat(60);
        for _ in 0..30 {
            b.write_wrapped(&long, 0.0, 9.0).unwrap();
            assert_within_margin(&b);
        }
    }

    #[test]
    fn key_value_height_follows_wrapped_lines() {
        let mut b = builder();
        let before = b.cursor_y();
        b.write_key_value("URL", "short", 0.0).unwrap();
        let single = b.cursor_y() - before;

        let before = b.cursor_y();
        let long = "https://example.com/".to_string() + &"segment/".repeat(40);
        b.write_key_value("URL", &long, 0.0).unwrap();
        let multi = b.cursor_y() - before;

        assert!(multi > single);
    }

    #[test]
    fn table_row_height_driven_by_tallest_cell() {
        let mut b = builder();
        let widths = vec![40.0, 142.0];
        let tall_cell = "wrap me please ".repeat(12);

        let y_before = b.cursor_y();
        b.draw_table(
            &["A", "B"],
            &[vec![tall_cell.clone(), "one line".to_string()]],
            &widths,
            colors::TABLE_HEADER_FILL,
            colors::TABLE_HEADER_TEXT,
        )
        .unwrap();
        let tall_height = b.cursor_y() - y_before;

        let y_before = b.cursor_y();
        b.draw_table(
            &["A", "B"],
            &[vec!["x".to_string(), "one line".to_string()]],
            &widths,
            colors::TABLE_HEADER_FILL,
            colors::TABLE_HEADER_TEXT,
        )
        .unwrap();
        let short_height = b.cursor_y() - y_before;

        assert!(tall_height > short_height);
    }

    #[test]
    fn table_rows_never_split_across_pages() {
        let mut b = builder();
        let widths = vec![91.0, 91.0];
        let rows: Vec<Vec<String>> = (0..120)
            .map(|i| {
                vec![
                    format!("row {} with some wrapped content that spans lines", i),
                    "value ".repeat(10),
                ]
            })
            .collect();

        b.draw_table(
            &["Left", "Right"],
            &rows,
            &widths,
            colors::TABLE_HEADER_FILL,
            colors::TABLE_HEADER_TEXT,
        )
        .unwrap();

        assert!(b.page_count() > 1);
        // Every row rect must sit entirely inside its page's writable band.
        for page in b.into_pages() {
            for op in &page.ops {
                if let DrawOp::Rect { y, height, .. } = op {
                    assert!(y + height <= 297.0 - 14.0 + 1e-9);
                    assert!(*y >= 14.0 - 1e-9);
                }
            }
        }
    }

    #[test]
    fn oversized_block_is_a_rendering_error() {
        let mut b = builder();
        assert!(matches!(
            b.ensure_space(400.0),
            Err(WebscanError::Rendering(_))
        ));
    }

    #[test]
    fn layout_is_deterministic() {
        let build = || {
            let mut b = builder();
            b.write_title("SCANNING REPORT").unwrap();
            b.write_section_title("Severity Distribution", colors::TEXT)
                .unwrap();
            b.draw_table(
                &["Severity", "Count"],
                &[vec!["Critical".into(), "2".into()]],
                &[120.0, 62.0],
                colors::TABLE_HEADER_FILL,
                colors::TABLE_HEADER_TEXT,
            )
            .unwrap();
            b.into_pages()
        };
        assert_eq!(build(), build());
    }
}
