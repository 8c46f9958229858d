use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Node not found: {0}")]
    NodeNotFound(usize),

    #[error("Node {0} cannot hold children")]
    NotAContainer(usize),

    #[error("Invalid heading level {0} (expected 1..=6)")]
    InvalidHeadingLevel(u8),
}
