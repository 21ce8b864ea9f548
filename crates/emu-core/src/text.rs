//! Best-effort screen text reconstruction.

/// Maps a screen code to a character. `Some(' ')` is a blank cell;
/// `None` is a code with no text equivalent and reads as `'_'`.
pub type TextMap = fn(u8) -> Option<char>;

/// Plain 7-bit mapping: `0x00` and `0x20` are blanks, `0x21..=0x7E` map
/// to themselves, everything else has no text equivalent.
#[must_use]
pub fn ascii_char(code: u8) -> Option<char> {
    match code {
        0x00 | 0x20 => Some(' '),
        0x21..=0x7E => Some(char::from(code)),
        _ => None,
    }
}

const UNMAPPED: char = '_';

/// Read a `rows` x `cols` character raster into text.
///
/// Blanks are only emitted when a printable character follows on the
/// same row, so trailing spaces never appear. Each row ends in `'\n'`.
#[must_use]
pub fn extract_text(
    rows: usize,
    cols: usize,
    mut code_at: impl FnMut(usize, usize) -> u8,
    map: TextMap,
) -> String {
    let mut text = String::with_capacity(rows * (cols + 1));
    for row in 0..rows {
        let mut spaces = 0;
        for col in 0..cols {
            match map(code_at(row, col)) {
                Some(' ') => spaces += 1,
                other => {
                    text.extend(std::iter::repeat_n(' ', spaces));
                    spaces = 0;
                    text.push(other.unwrap_or(UNMAPPED));
                }
            }
        }
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_blanks_are_dropped() {
        let screen = [b"A B  ", b"\0\0x\0\0"];
        let text = extract_text(2, 5, |r, c| screen[r][c], ascii_char);
        assert_eq!(text, "A B\n  x\n");
    }

    #[test]
    fn unmapped_codes_read_as_underscore() {
        let row = [b'A', 0x80, b'B'];
        assert_eq!(extract_text(1, 3, |_, c| row[c], ascii_char), "A_B\n");
    }
}
