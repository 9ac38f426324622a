//! Word wrapping for styled lines.
//!
//! `textwrap` picks the break points on the text of the whole line, so a
//! word whose characters carry different styles is never split. The styles
//! are then laid back onto the wrapped rows character by character.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Wrap each line to at most `width` terminal cells.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

/// Wrap a single line. Lines that already fit are returned untouched.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if line.width() <= width {
        return vec![line];
    }

    let styled: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |ch| (ch, span.style)))
        .collect();
    let plain: String = styled.iter().map(|&(ch, _)| ch).collect();

    let mut rows = Vec::new();
    let mut next = 0;

    for row in textwrap::wrap(&plain, width) {
        let mut spans: Vec<Span<'static>> = Vec::new();

        for expected in row.chars() {
            // Whitespace at a break is dropped by textwrap.
            while styled
                .get(next)
                .is_some_and(|&(ch, _)| ch != expected && ch.is_whitespace())
            {
                next += 1;
            }
            let Some(&(ch, style)) = styled.get(next) else {
                break;
            };
            next += 1;

            match spans.last_mut() {
                Some(last) if last.style == style => last.content.to_mut().push(ch),
                _ => spans.push(Span::styled(ch.to_string(), style)),
            }
        }

        rows.push(Line::from(spans).style(line.style));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn row_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn rows(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(row_text).collect()
    }

    #[test]
    fn test_short_line_unchanged() {
        let lines = wrap_lines(vec![Line::from("hello")], 10);
        assert_eq!(rows(&lines), vec!["hello"]);
    }

    #[test]
    fn test_wraps_at_spaces() {
        let lines = wrap_lines(vec![Line::from("one two three")], 8);
        assert_eq!(rows(&lines), vec!["one two", "three"]);
    }

    #[test]
    fn test_long_word_is_split() {
        let lines = wrap_lines(vec![Line::from("abcdefghij")], 4);
        assert_eq!(rows(&lines), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wide_chars_count_two_cells() {
        let lines = wrap_lines(vec![Line::from("你好世界")], 4);
        assert_eq!(rows(&lines), vec!["你好", "世界"]);
    }

    #[test]
    fn test_styles_survive_wrapping() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::raw("plain "),
            Span::styled("bold words here", bold),
        ]);
        let lines = wrap_lines(vec![line], 11);

        assert_eq!(rows(&lines), vec!["plain bold", "words here"]);
        assert_eq!(lines[0].spans[1].style, bold);
        assert_eq!(lines[1].spans.len(), 1);
        assert_eq!(lines[1].spans[0].style, bold);
    }

    #[test]
    fn test_word_across_styles_stays_whole() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::raw("aaaaaaa "),
            Span::styled("Hi", bold),
            Span::raw(", there"),
        ]);
        let lines = wrap_lines(vec![line], 10);

        assert_eq!(rows(&lines), vec!["aaaaaaa", "Hi, there"]);
        assert_eq!(lines[1].spans[0], Span::styled("Hi", bold));
        assert_eq!(lines[1].spans[1], Span::raw(", there"));
    }

    #[test]
    fn test_empty_line_kept() {
        let lines = wrap_lines(vec![Line::default()], 5);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_zero_width_is_noop() {
        let lines = wrap_lines(vec![Line::from("anything at all")], 0);
        assert_eq!(lines.len(), 1);
    }
}
