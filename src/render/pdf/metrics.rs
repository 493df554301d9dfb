//! Helvetica metrics and WinAnsi encoding for the built-in PDF fonts.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em for printable ASCII
//! (32..=126). Anything outside that range uses [`FALLBACK_WIDTH`].

/// Advance width used for characters without a table entry.
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                   // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n'..'z'
    334, 260, 334, 584,                                                             // '{'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn char_width(c: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    match c as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, bold) as u32).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap to `max_width` points. Words longer than a line are
/// broken by character. Always returns at least one line.
pub fn wrap(text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate, size, bold) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, size, bold) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    current.push(c);
                    if text_width(&current, size, bold) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    }
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Encode text for a WinAnsi-encoded Type1 font.
///
/// Latin-1 maps straight through; the euro sign has its own slot; anything
/// else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            0x20ac => 0x80,
            0x2013 => 0x96,
            0x2014 => 0x97,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201c => 0x93,
            0x201d => 0x94,
            0x2022 => 0x95,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_width() {
        // ten digits at 10pt: 10 × 556 / 1000 × 10
        assert!((text_width("0123456789", 10.0, false) - 55.6).abs() < 1e-3);
    }

    #[test]
    fn test_bold_is_wider() {
        assert!(text_width("Invoice", 12.0, true) > text_width("Invoice", 12.0, false));
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(6);
        let lines = wrap(&text, 10.0, false, 120.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0, false) <= 120.0, "{line}");
        }
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let lines = wrap(&"W".repeat(50), 10.0, false, 50.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, 10.0, false) <= 50.0));
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap("", 10.0, false, 100.0), vec![String::new()]);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("GBP 1"), b"GBP 1".to_vec());
        assert_eq!(encode_win_ansi("€é"), vec![0x80, 0xe9]);
        assert_eq!(encode_win_ansi("日"), b"?".to_vec());
    }
}
