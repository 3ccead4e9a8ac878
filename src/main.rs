use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tapevm::instruction::disassemble;
use tapevm::io::StreamIo;
use tapevm::view::TapeView;
use tapevm::{Engine, EngineConfig, IoConvention, JumpMode, Status, Stop};

#[derive(Parser)]
#[command(name = "tapevm", about = "Step-wise interpreter for an 8-instruction tape language")]
struct Cli {
    /// Program file to run.
    #[arg(required_unless_present = "eval", conflicts_with = "eval")]
    file: Option<PathBuf>,

    /// Program source given inline.
    #[arg(short, long)]
    eval: Option<String>,

    /// Which of ',' and '.' writes output.
    #[arg(long, value_enum, default_value_t = Convention::Literal)]
    convention: Convention,

    /// How taken bracket jumps are resolved.
    #[arg(long, value_enum, default_value_t = Jumps::Scan)]
    jumps: Jumps,

    /// Stop after this many instructions.
    #[arg(long)]
    step_limit: Option<usize>,

    /// Render the tape around the address pointer after every step.
    #[arg(long)]
    trace: bool,

    /// Rows in the traced tape view.
    #[arg(long, default_value_t = 9)]
    view_rows: usize,

    /// Print a listing of the program and exit.
    #[arg(long)]
    disassemble: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Convention {
    /// ',' writes, '.' reads.
    Literal,
    /// '.' writes, ',' reads.
    Conventional,
}

#[derive(Clone, Copy, ValueEnum)]
enum Jumps {
    Scan,
    Table,
}

impl From<Convention> for IoConvention {
    fn from(c: Convention) -> Self {
        match c {
            Convention::Literal => IoConvention::Literal,
            Convention::Conventional => IoConvention::Conventional,
        }
    }
}

impl From<Jumps> for JumpMode {
    fn from(j: Jumps) -> Self {
        match j {
            Jumps::Scan => JumpMode::Scan,
            Jumps::Table => JumpMode::Table,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let source = match read_source(&cli) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Cannot read program: {e}");
            process::exit(1);
        }
    };

    let config = EngineConfig {
        convention: cli.convention.into(),
        jumps: cli.jumps.into(),
    };

    if cli.disassemble {
        print!("{}", disassemble(&source, config.convention));
        return;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut engine = Engine::new(config, StreamIo::new(stdin.lock(), stdout.lock()));
    if let Err(e) = engine.load(&source) {
        eprintln!("{e}");
        process::exit(1);
    }

    if let Err(e) = execute(&mut engine, &cli) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn read_source(cli: &Cli) -> io::Result<Vec<u8>> {
    match (&cli.eval, &cli.file) {
        (Some(inline), _) => Ok(inline.as_bytes().to_vec()),
        (None, Some(path)) => std::fs::read(path),
        (None, None) => Err(io::Error::new(io::ErrorKind::InvalidInput, "no program given")),
    }
}

fn execute<R: Read, W: Write>(
    engine: &mut Engine<StreamIo<R, W>>,
    cli: &Cli,
) -> tapevm::Result<()> {
    let stop = if cli.trace {
        trace_run(engine, cli.step_limit, TapeView::new(cli.view_rows))?
    } else {
        engine.run(cli.step_limit)?.stop
    };

    match stop {
        Stop::Halted => info!(steps = engine.steps(), "halted"),
        Stop::StepLimit => warn!(steps = engine.steps(), "step limit reached"),
        Stop::AwaitingInput => {
            warn!(ip = %engine.instruction_pointer(), "input exhausted while awaiting a byte")
        }
    }
    Ok(())
}

fn trace_run<R: Read, W: Write>(
    engine: &mut Engine<StreamIo<R, W>>,
    limit: Option<usize>,
    view: TapeView,
) -> tapevm::Result<Stop> {
    let mut steps = 0;
    loop {
        if limit.is_some_and(|l| steps >= l) && !engine.is_halted() {
            return Ok(Stop::StepLimit);
        }
        let ip = engine.instruction_pointer();
        let instr = engine.current_instruction();
        match engine.step()? {
            Status::Halted if instr.is_none() => return Ok(Stop::Halted),
            Status::AwaitingInput => return Ok(Stop::AwaitingInput),
            _ => {}
        }
        steps += 1;
        if let Some(byte) = instr {
            eprintln!("ip {ip:>5}  {}  addr {}", byte as char, engine.current_address());
        }
        eprint!("{}", view.render(engine));
    }
}
