use std::fmt::Write;

const PLUS: u8 = b'+';
const MINUS: u8 = b'-';
const GREATER: u8 = b'>';
const LESS: u8 = b'<';
const COMMA: u8 = b',';
const DOT: u8 = b'.';
pub(crate) const LBRACKET: u8 = b'[';
pub(crate) const RBRACKET: u8 = b']';

/// Which of `,` and `.` performs output.
///
/// `Literal` keeps the historical mapping of this dialect (`,` writes,
/// `.` reads). `Conventional` swaps them to the usual Brainfuck meaning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IoConvention {
    #[default]
    Literal,
    Conventional,
}

/// A decoded instruction byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Inc,
    Dec,
    Right,
    Left,
    Output,
    Input,
    LoopStart,
    LoopEnd,
    /// Any other byte. Skipped as commentary.
    Nop(u8),
}

impl Instruction {
    pub fn decode(byte: u8, convention: IoConvention) -> Self {
        match (byte, convention) {
            (PLUS, _) => Instruction::Inc,
            (MINUS, _) => Instruction::Dec,
            (GREATER, _) => Instruction::Right,
            (LESS, _) => Instruction::Left,
            (COMMA, IoConvention::Literal) | (DOT, IoConvention::Conventional) => {
                Instruction::Output
            }
            (DOT, IoConvention::Literal) | (COMMA, IoConvention::Conventional) => {
                Instruction::Input
            }
            (LBRACKET, _) => Instruction::LoopStart,
            (RBRACKET, _) => Instruction::LoopEnd,
            (other, _) => Instruction::Nop(other),
        }
    }

    /// Returns true if the byte means something to the stepper.
    pub fn is_instruction(byte: u8) -> bool {
        matches!(
            byte,
            PLUS | MINUS | GREATER | LESS | COMMA | DOT | LBRACKET | RBRACKET
        )
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Instruction::Inc => "INC",
            Instruction::Dec => "DEC",
            Instruction::Right => "RIGHT",
            Instruction::Left => "LEFT",
            Instruction::Output => "OUT",
            Instruction::Input => "IN",
            Instruction::LoopStart => "LOOP",
            Instruction::LoopEnd => "END",
            Instruction::Nop(_) => "NOP",
        }
    }
}

/// List the meaningful instructions of a program with their offsets,
/// indenting loop bodies by nesting depth.
pub fn disassemble(program: &[u8], convention: IoConvention) -> String {
    let mut out = String::new();
    let mut depth: usize = 0;
    for (offset, &byte) in program.iter().enumerate() {
        let instr = Instruction::decode(byte, convention);
        if let Instruction::Nop(_) = instr {
            continue;
        }
        if instr == Instruction::LoopEnd {
            depth = depth.saturating_sub(1);
        }
        let _ = writeln!(
            out,
            "{offset:05}  {}{} {}",
            "  ".repeat(depth),
            byte as char,
            instr.mnemonic()
        );
        if instr == Instruction::LoopStart {
            depth += 1;
        }
    }
    out
}
