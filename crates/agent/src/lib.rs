//! Turn orchestration for the physics tutor.
//!
//! Each turn runs a fixed pipeline:
//!
//! 1. **Classify** the query against the syllabus
//! 2. **Retrieve** supporting fragments from the vector index
//! 3. **Compose** a system preamble from session state
//! 4. **Call the model**, executing any tools it requests
//! 5. **Finalize** on the first text answer and update the interaction log

pub mod composer;
pub mod error;
pub mod finalizer;
pub mod instruction;
pub mod phase;
pub mod tutor;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use composer::{compose_preamble, inject_preamble};
pub use error::AgentError;
pub use finalizer::{TurnSignal, finalize};
pub use fisibot_tools::classifier::{ClassificationPrompt, ClassifyError, classify_query};
pub use instruction::{AGENT_NAME, BASE_INSTRUCTION};
pub use phase::TurnPhase;
pub use tutor::{TurnOutcome, TutorAgent};
