use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::instruction::{Instruction, IoConvention};
use crate::io::Io;
use crate::program::{Fetch, Ip, JumpTable, ProgramStore};
use crate::tape::{Addr, Tape};

/// How taken bracket jumps find their landing position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JumpMode {
    /// Count brackets outward from the jump on every taken jump.
    #[default]
    Scan,
    /// Look the landing up in a table built once at load time.
    Table,
}

/// Configuration for an engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineConfig {
    pub convention: IoConvention,
    pub jumps: JumpMode,
}

/// Engine state as reported after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
    /// The input instruction found no byte. Nothing changed; the same
    /// instruction is retried by the next step.
    AwaitingInput,
}

/// Why [`Engine::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stop {
    Halted,
    AwaitingInput,
    StepLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Instructions executed during this run.
    pub steps: usize,
    pub stop: Stop,
}

/// The tape machine: one tape, one program, an address pointer, an
/// instruction pointer, and the adapter used by the two I/O instructions.
pub struct Engine<I> {
    tape: Tape,
    program: ProgramStore,
    jump_table: Option<JumpTable>,
    addr: Addr,
    ip: Ip,
    steps: usize,
    loaded: bool,
    config: EngineConfig,
    io: I,
}

impl<I: Io> Engine<I> {
    /// An engine with a freshly seeded tape and no program.
    pub fn new(config: EngineConfig, io: I) -> Self {
        Self {
            tape: Tape::new(),
            program: ProgramStore::empty(),
            jump_table: None,
            addr: Addr::ZERO,
            ip: Ip::START,
            steps: 0,
            loaded: false,
            config,
            io,
        }
    }

    /// Load the program. Only one load may succeed per engine; a failed
    /// load leaves the engine with no program.
    pub fn load(&mut self, source: &[u8]) -> Result<()> {
        if self.loaded {
            return Err(Error::AlreadyLoaded);
        }
        let program = ProgramStore::load(source)?;
        self.jump_table = match self.config.jumps {
            JumpMode::Table => Some(JumpTable::build(&program)),
            JumpMode::Scan => None,
        };
        self.program = program;
        self.ip = Ip::START;
        self.loaded = true;
        Ok(())
    }

    /// Execute exactly one instruction.
    ///
    /// Once halted this is a no-op that keeps returning [`Status::Halted`].
    pub fn step(&mut self) -> Result<Status> {
        let byte = match self.program.at(self.ip) {
            Fetch::Halted => return Ok(Status::Halted),
            Fetch::Instr(byte) => byte,
        };
        let instr = Instruction::decode(byte, self.config.convention);
        trace!(ip = %self.ip, addr = %self.addr, ?instr, "step");

        let next = match instr {
            Instruction::Inc => {
                self.tape.increment(self.addr);
                self.ip.succ()
            }
            Instruction::Dec => {
                self.tape.decrement(self.addr);
                self.ip.succ()
            }
            Instruction::Right => {
                self.addr = self.addr.next();
                self.ip.succ()
            }
            Instruction::Left => {
                self.addr = self.addr.prev();
                self.ip.succ()
            }
            Instruction::Output => {
                self.io.output(self.tape.read(self.addr))?;
                self.ip.succ()
            }
            Instruction::Input => match self.io.input()? {
                Some(value) => {
                    self.tape.write(self.addr, value);
                    self.ip.succ()
                }
                None => return Ok(Status::AwaitingInput),
            },
            Instruction::LoopStart if self.tape.read(self.addr) == 0 => self.jump(instr)?,
            Instruction::LoopEnd if self.tape.read(self.addr) != 0 => self.jump(instr)?,
            Instruction::LoopStart | Instruction::LoopEnd | Instruction::Nop(_) => self.ip.succ(),
        };

        self.ip = next;
        self.steps += 1;
        Ok(self.status())
    }

    /// Resolve a taken bracket jump from the current position.
    fn jump(&self, instr: Instruction) -> Result<Ip> {
        let landed = match (&self.jump_table, instr) {
            (Some(table), _) => table.jump(self.ip),
            (None, Instruction::LoopStart) => self.program.scan_forward(self.ip),
            (None, _) => self.program.scan_backward(self.ip),
        };
        match landed {
            Ok(target) => {
                trace!(from = %self.ip, to = %target, "jump");
                Ok(target)
            }
            Err(e) => {
                warn!(ip = %self.ip, "unbalanced bracket");
                Err(e)
            }
        }
    }

    /// Step until halted, awaiting input, or `limit` instructions have run.
    pub fn run(&mut self, limit: Option<usize>) -> Result<RunOutcome> {
        let mut steps = 0;
        loop {
            if self.is_halted() {
                return Ok(RunOutcome { steps, stop: Stop::Halted });
            }
            if limit.is_some_and(|l| steps >= l) {
                return Ok(RunOutcome { steps, stop: Stop::StepLimit });
            }
            if self.step()? == Status::AwaitingInput {
                return Ok(RunOutcome { steps, stop: Stop::AwaitingInput });
            }
            steps += 1;
        }
    }

    fn status(&self) -> Status {
        if self.is_halted() {
            Status::Halted
        } else {
            Status::Running
        }
    }

    pub fn is_halted(&self) -> bool {
        self.ip.get() == self.program.len()
    }

    pub fn current_address(&self) -> Addr {
        self.addr
    }

    pub fn read(&self, addr: impl Into<Addr>) -> u8 {
        self.tape.read(addr.into())
    }

    pub fn read_range(&self, lo: i64, hi: i64) -> Vec<u8> {
        self.tape.read_range(lo, hi)
    }

    pub fn instruction_pointer(&self) -> Ip {
        self.ip
    }

    /// The byte about to execute, or `None` once halted.
    pub fn current_instruction(&self) -> Option<u8> {
        match self.program.at(self.ip) {
            Fetch::Instr(byte) => Some(byte),
            Fetch::Halted => None,
        }
    }

    pub fn program(&self) -> &ProgramStore {
        &self.program
    }

    /// Instructions executed since the engine was created.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    pub fn into_io(self) -> I {
        self.io
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::io::BufferIo;
    use proptest::prelude::*;

    fn program() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(prop::sample::select(b"+-<>,.[]x".to_vec()), 0..48)
    }

    fn snapshot(e: &Engine<BufferIo>) -> (Addr, Ip, usize, Vec<u8>, Vec<u8>) {
        (
            e.current_address(),
            e.instruction_pointer(),
            e.steps(),
            e.read_range(-64, 64),
            e.io().written().to_vec(),
        )
    }

    proptest! {
        #[test]
        fn table_mode_matches_scan_mode(
            source in program(),
            input in prop::collection::vec(any::<u8>(), 0..8),
            limit in 1usize..500,
        ) {
            let mut engines = [JumpMode::Scan, JumpMode::Table].map(|jumps| {
                let mut e = Engine::new(
                    EngineConfig { jumps, ..EngineConfig::default() },
                    BufferIo::with_input(&input),
                );
                e.load(&source).unwrap();
                e
            });
            for _ in 0..limit {
                let [scan, table] = &mut engines;
                let a = scan.step();
                let b = table.step();
                prop_assert_eq!(snapshot(scan), snapshot(table));
                match (a, b) {
                    (Ok(x), Ok(y)) => prop_assert_eq!(x, y),
                    (Err(Error::UnbalancedBracket { at: x }), Err(Error::UnbalancedBracket { at: y })) => {
                        prop_assert_eq!(x, y);
                        break;
                    }
                    (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a, b),
                }
            }
        }

        #[test]
        fn arbitrary_programs_never_panic(
            source in prop::collection::vec(any::<u8>(), 0..256),
            limit in 0usize..2000,
        ) {
            let mut e = Engine::new(EngineConfig::default(), BufferIo::with_input(&[1, 2, 3]));
            e.load(&source).unwrap();
            if let Ok(outcome) = e.run(Some(limit)) {
                prop_assert!(outcome.steps <= limit);
                prop_assert!(e.instruction_pointer().get() <= e.program().len());
            }
        }

        #[test]
        fn halted_engine_is_frozen(source in program(), extra in 1usize..20) {
            let mut e = Engine::new(EngineConfig::default(), BufferIo::with_input(&[7; 16]));
            e.load(&source).unwrap();
            if let Ok(RunOutcome { stop: Stop::Halted, .. }) = e.run(Some(1000)) {
                let before = snapshot(&e);
                for _ in 0..extra {
                    prop_assert_eq!(e.step().unwrap(), Status::Halted);
                }
                prop_assert_eq!(before, snapshot(&e));
            }
        }
    }
}
