mod engine;
mod spec;

pub use engine::{Kettle, KettleSnapshot, KettleState, PourOutcome, TurnOnOutcome};
pub use spec::{KettleSpec, StepDelay, AMBIENT_TEMP};
