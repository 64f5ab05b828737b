use thiserror::Error;

use crate::utils::allocator::BodyHandle;

/// Errors surfaced by the physics core.
///
/// Degenerate collisions between two immovable bodies are not represented
/// here: they are an expected configuration and are skipped silently by the
/// solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhysicsError {
    /// A setter received a NaN or infinite value. The previous value is kept.
    #[error("non-finite value for {quantity}")]
    InvalidState { quantity: &'static str },

    /// A handle whose body has been destroyed was passed to the engine.
    #[error("stale body handle (index {index}, generation {generation})")]
    StaleHandle { index: usize, generation: u32 },
}

impl PhysicsError {
    pub fn stale(handle: BodyHandle) -> Self {
        Self::StaleHandle {
            index: handle.index(),
            generation: handle.generation(),
        }
    }
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
