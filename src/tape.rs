use std::fmt;

/// Number of cells on the tape. Also the program store capacity.
pub const CAPACITY: usize = 1 << 16;

/// Seed period for the initial tape contents: cell `i` starts at `i % SEED_PERIOD`.
const SEED_PERIOD: usize = 64;

/// A tape address. Every constructor wraps modulo [`CAPACITY`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(u16);

impl Addr {
    pub const ZERO: Addr = Addr(0);
    pub const MAX: Addr = Addr(u16::MAX);

    /// Wrap an arbitrary signed address onto the tape.
    pub fn wrap(raw: i64) -> Self {
        Addr(raw.rem_euclid(CAPACITY as i64) as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// The address one to the right, wrapping past the top to zero.
    pub fn next(self) -> Self {
        Addr(self.0.wrapping_add(1))
    }

    /// The address one to the left, wrapping below zero to the top.
    pub fn prev(self) -> Self {
        Addr(self.0.wrapping_sub(1))
    }

    /// Signed offset from this address, wrapping in both directions.
    pub fn offset(self, delta: i64) -> Self {
        Addr::wrap(self.0 as i64 + delta)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for Addr {
    fn from(raw: u16) -> Self {
        Addr(raw)
    }
}

impl From<i32> for Addr {
    fn from(raw: i32) -> Self {
        Addr::wrap(raw as i64)
    }
}

impl From<i64> for Addr {
    fn from(raw: i64) -> Self {
        Addr::wrap(raw)
    }
}

impl From<usize> for Addr {
    fn from(raw: usize) -> Self {
        Addr((raw % CAPACITY) as u16)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Fixed-capacity byte memory.
///
/// Cell arithmetic wraps modulo 256. Because [`Addr`] is always below
/// [`CAPACITY`], indexing never leaves the buffer.
pub struct Tape {
    cells: Box<[u8]>,
}

impl Tape {
    /// A fresh tape with cell `i` holding `i % 64`.
    pub fn new() -> Self {
        let cells = (0..CAPACITY).map(|i| (i % SEED_PERIOD) as u8).collect();
        Self { cells }
    }

    pub fn read(&self, addr: Addr) -> u8 {
        self.cells[addr.index()]
    }

    /// Cells for every address in `lo..=hi`, each wrapped onto the tape.
    ///
    /// An inverted range yields nothing.
    pub fn read_range(&self, lo: i64, hi: i64) -> Vec<u8> {
        if lo > hi {
            return Vec::new();
        }
        (lo..=hi).map(|a| self.read(Addr::wrap(a))).collect()
    }

    pub fn write(&mut self, addr: Addr, value: u8) {
        self.cells[addr.index()] = value;
    }

    pub fn increment(&mut self, addr: Addr) {
        let cell = &mut self.cells[addr.index()];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement(&mut self, addr: Addr) {
        let cell = &mut self.cells[addr.index()];
        *cell = cell.wrapping_sub(1);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}
