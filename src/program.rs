use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::instruction::{LBRACKET, RBRACKET};
use crate::tape::CAPACITY;

/// Position within the loaded program. `Ip(len)` is the halted position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ip(usize);

impl Ip {
    pub const START: Ip = Ip(0);

    pub fn new(raw: usize) -> Self {
        Ip(raw)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// The following position. Callers keep this within `[0, len]`.
    pub fn succ(self) -> Self {
        Ip(self.0 + 1)
    }
}

impl fmt::Display for Ip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of fetching at an instruction pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fetch {
    Instr(u8),
    Halted,
}

/// Immutable program bytes, at most [`CAPACITY`] long.
#[derive(Clone, Debug, Default)]
pub struct ProgramStore {
    bytes: Box<[u8]>,
}

impl ProgramStore {
    /// A store holding no program. Execution over it halts immediately.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy `source` into a new store.
    ///
    /// Fails without producing a store when `source` is longer than [`CAPACITY`].
    pub fn load(source: &[u8]) -> Result<Self> {
        if source.len() > CAPACITY {
            return Err(Error::CapacityExceeded {
                len: source.len(),
                capacity: CAPACITY,
            });
        }
        debug!(len = source.len(), "program loaded");
        Ok(Self {
            bytes: source.into(),
        })
    }

    pub fn at(&self, ip: Ip) -> Fetch {
        match self.bytes.get(ip.0) {
            Some(&byte) => Fetch::Instr(byte),
            None => Fetch::Halted,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Find the `]` matching the `[` at `open` and return the position one past it.
    pub fn scan_forward(&self, open: Ip) -> Result<Ip> {
        let mut depth: usize = 0;
        for pos in open.0 + 1..self.bytes.len() {
            match self.bytes[pos] {
                LBRACKET => depth += 1,
                RBRACKET if depth == 0 => return Ok(Ip(pos + 1)),
                RBRACKET => depth -= 1,
                _ => {}
            }
        }
        Err(Error::UnbalancedBracket { at: open })
    }

    /// Find the `[` matching the `]` at `close` and return the position one past it.
    pub fn scan_backward(&self, close: Ip) -> Result<Ip> {
        let mut depth: usize = 0;
        for pos in (0..close.0.min(self.bytes.len())).rev() {
            match self.bytes[pos] {
                RBRACKET => depth += 1,
                LBRACKET if depth == 0 => return Ok(Ip(pos + 1)),
                LBRACKET => depth -= 1,
                _ => {}
            }
        }
        Err(Error::UnbalancedBracket { at: close })
    }
}

/// Precomputed bracket landings.
///
/// `landing[i]` is where a taken jump at bracket `i` lands, or `None` when
/// the bracket is unmatched (or `i` is not a bracket). Matching is the same
/// as the counting scans, so a taken jump lands identically and an unmatched
/// one fails identically.
#[derive(Clone, Debug, Default)]
pub struct JumpTable {
    landing: Vec<Option<Ip>>,
}

impl JumpTable {
    pub fn build(program: &ProgramStore) -> Self {
        let bytes = program.as_bytes();
        let mut landing = vec![None; bytes.len()];
        let mut stack = Vec::new();

        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                LBRACKET => stack.push(i),
                RBRACKET => {
                    if let Some(open) = stack.pop() {
                        landing[open] = Some(Ip(i + 1));
                        landing[i] = Some(Ip(open + 1));
                    }
                    // Unmatched ']' stays None.
                }
                _ => {}
            }
        }
        // Whatever remains on the stack is an unmatched '['.

        Self { landing }
    }

    pub fn jump(&self, at: Ip) -> Result<Ip> {
        self.landing
            .get(at.0)
            .copied()
            .flatten()
            .ok_or(Error::UnbalancedBracket { at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sets_length() {
        let store = ProgramStore::load(b"++.").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.at(Ip::new(0)), Fetch::Instr(b'+'));
        assert_eq!(store.at(Ip::new(2)), Fetch::Instr(b'.'));
        assert_eq!(store.at(Ip::new(3)), Fetch::Halted);
    }

    #[test]
    fn test_load_at_capacity_succeeds() {
        let source = vec![b'+'; CAPACITY];
        let store = ProgramStore::load(&source).unwrap();
        assert_eq!(store.len(), CAPACITY);
    }

    #[test]
    fn test_load_over_capacity_fails() {
        let source = vec![b'+'; CAPACITY + 1];
        match ProgramStore::load(&source) {
            Err(Error::CapacityExceeded { len, capacity }) => {
                assert_eq!(len, CAPACITY + 1);
                assert_eq!(capacity, CAPACITY);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_store_is_halted() {
        let store = ProgramStore::empty();
        assert!(store.is_empty());
        assert_eq!(store.at(Ip::START), Fetch::Halted);
    }

    #[test]
    fn test_scan_forward_skips_nested() {
        //          0123456
        let store = ProgramStore::load(b"[[-]+]-").unwrap();
        assert_eq!(store.scan_forward(Ip::new(0)).unwrap(), Ip::new(6));
        assert_eq!(store.scan_forward(Ip::new(1)).unwrap(), Ip::new(4));
    }

    #[test]
    fn test_scan_backward_skips_nested() {
        let store = ProgramStore::load(b"[[-]+]-").unwrap();
        assert_eq!(store.scan_backward(Ip::new(5)).unwrap(), Ip::new(1));
        assert_eq!(store.scan_backward(Ip::new(3)).unwrap(), Ip::new(2));
    }

    #[test]
    fn test_scan_forward_unmatched() {
        let store = ProgramStore::load(b"[").unwrap();
        assert!(matches!(
            store.scan_forward(Ip::START),
            Err(Error::UnbalancedBracket { at }) if at == Ip::START
        ));
    }

    #[test]
    fn test_scan_backward_unmatched() {
        let store = ProgramStore::load(b"+]]").unwrap();
        assert!(matches!(
            store.scan_backward(Ip::new(1)),
            Err(Error::UnbalancedBracket { .. })
        ));
        assert!(matches!(
            store.scan_backward(Ip::new(2)),
            Err(Error::UnbalancedBracket { .. })
        ));
    }

    #[test]
    fn test_jump_table_nested() {
        let store = ProgramStore::load(b"[[]]").unwrap();
        let table = JumpTable::build(&store);
        assert_eq!(table.jump(Ip::new(0)).unwrap(), Ip::new(4));
        assert_eq!(table.jump(Ip::new(1)).unwrap(), Ip::new(3));
        assert_eq!(table.jump(Ip::new(2)).unwrap(), Ip::new(2));
        assert_eq!(table.jump(Ip::new(3)).unwrap(), Ip::new(1));
    }

    #[test]
    fn test_jump_table_unmatched() {
        let store = ProgramStore::load(b"[[]").unwrap();
        let table = JumpTable::build(&store);
        assert!(table.jump(Ip::new(0)).is_err());
        assert_eq!(table.jump(Ip::new(1)).unwrap(), Ip::new(3));
    }
}
