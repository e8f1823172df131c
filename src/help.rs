use crate::terminal::{Cell, Terminal};
use crossterm::style::Color;

/// Keys understood by the live map
pub const HELP_TEXT: &str = "\
AirTraffic Live

q / Esc   quit
Space     pause / resume
1-9       frame interval (1 = fastest)
0         slowest frame interval
f         toggle status line
?         close this help";

/// Draw a centered help box over whatever is in the buffer.
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let (width, height) = term.size();
    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    let left = (width as usize).saturating_sub(box_width) / 2;
    let top = (height as usize).saturating_sub(box_height) / 2;
    let right = left + box_width - 1;
    let bottom = top + box_height - 1;

    let mut put = |x: usize, y: usize, ch: char, fg: Color| {
        term.set_cell(
            x as i32,
            y as i32,
            Cell {
                ch,
                fg: Some(fg),
                bg: Some(Color::Black),
                bold: false,
            },
        );
    };

    put(left, top, '┌', Color::White);
    put(right, top, '┐', Color::White);
    put(left, bottom, '└', Color::White);
    put(right, bottom, '┘', Color::White);
    for x in left + 1..right {
        put(x, top, '─', Color::White);
        put(x, bottom, '─', Color::White);
    }

    for (i, line) in lines.iter().enumerate() {
        let y = top + 1 + i;
        put(left, y, '│', Color::White);
        put(right, y, '│', Color::White);

        let padded = format!(" {:<max_width$} ", line);
        for (j, ch) in padded.chars().enumerate() {
            put(left + 1 + j, y, ch, Color::Grey);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_is_centered_and_opaque() {
        let mut term = Terminal::with_size(40, 20, false).unwrap();
        render_help_overlay(&mut term, "ab\ncd");

        // 6x4 box centered in 40x20
        let corner = term.cell(17, 8).unwrap();
        assert_eq!(corner.ch, '┌');
        assert_eq!(corner.bg, Some(Color::Black));
        assert_eq!(term.cell(22, 11).unwrap().ch, '┘');
        assert_eq!(term.cell(19, 9).unwrap().ch, 'a');
        assert_eq!(term.cell(19, 9).unwrap().bg, Some(Color::Black));
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut term = Terminal::with_size(10, 5, false).unwrap();
        render_help_overlay(&mut term, "");
        assert!(term.cell(0, 0).is_some_and(|c| c.bg.is_none()));
    }

    #[test]
    fn oversized_box_is_clipped() {
        let mut term = Terminal::with_size(4, 2, false).unwrap();
        render_help_overlay(&mut term, HELP_TEXT);
        assert_eq!(term.cell(0, 0).unwrap().ch, '┌');
    }
}
