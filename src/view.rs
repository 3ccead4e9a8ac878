use std::fmt::Write;

use crate::engine::Engine;
use crate::io::Io;

/// A scrolling text window of tape cells centered on the address pointer.
///
/// Rows run from the highest address at the top to the lowest at the
/// bottom. The centered row is marked with `>`. The view only reads.
#[derive(Clone, Copy, Debug)]
pub struct TapeView {
    pub rows: usize,
}

impl Default for TapeView {
    fn default() -> Self {
        Self { rows: 9 }
    }
}

impl TapeView {
    pub fn new(rows: usize) -> Self {
        Self { rows }
    }

    pub fn render<I: Io>(&self, engine: &Engine<I>) -> String {
        let mut out = String::new();
        if self.rows == 0 {
            return out;
        }
        let center = engine.current_address();
        let above = (self.rows / 2) as i64;
        let below = (self.rows - 1) as i64 - above;
        let base = center.get() as i64;
        let cells = engine.read_range(base - below, base + above);

        for (row, value) in cells.iter().rev().enumerate() {
            let addr = center.offset(above - row as i64);
            let marker = if addr == center { '>' } else { ' ' };
            let _ = writeln!(out, "{marker} {addr} | {value:#04x}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::io::BufferIo;

    fn engine(source: &[u8]) -> Engine<BufferIo> {
        let mut e = Engine::new(EngineConfig::default(), BufferIo::new());
        e.load(source).unwrap();
        e
    }

    #[test]
    fn test_centered_on_address_zero_wraps() {
        let e = engine(b"");
        let text = TapeView::new(5).render(&e);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "  0x0002 | 0x02",
                "  0x0001 | 0x01",
                "> 0x0000 | 0x00",
                "  0xffff | 0x3f",
                "  0xfffe | 0x3e",
            ]
        );
    }

    #[test]
    fn test_follows_address_pointer() {
        let mut e = engine(b">>>+");
        e.run(None).unwrap();
        let text = TapeView::new(3).render(&e);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["  0x0004 | 0x04", "> 0x0003 | 0x04", "  0x0002 | 0x02"]
        );
    }

    #[test]
    fn test_even_row_count() {
        let e = engine(b"");
        let text = TapeView::new(4).render(&e);
        assert_eq!(text.lines().count(), 4);
        assert_eq!(text.lines().nth(2), Some("> 0x0000 | 0x00"));
    }

    #[test]
    fn test_zero_rows_is_empty() {
        let e = engine(b"");
        assert!(TapeView::new(0).render(&e).is_empty());
    }
}
