use thiserror::Error;

use crate::TermInt;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GameError {
    #[error("No free cell left on the board for food")]
    BoardFull,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Terminal too small: need {needed:?}, have {actual:?}")]
    TerminalTooSmall { needed: (TermInt, TermInt), actual: (TermInt, TermInt) },
}
