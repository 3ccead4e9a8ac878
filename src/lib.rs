pub mod error;
pub mod tape;
pub mod program;
pub mod instruction;
pub mod io;
pub mod engine;
pub mod view;

pub use engine::{Engine, EngineConfig, JumpMode, RunOutcome, Status, Stop};
pub use error::{Error, Result};
pub use instruction::IoConvention;
