use thiserror::Error;

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("unknown system: {0:?}")]
    UnknownSystem(String),
}
