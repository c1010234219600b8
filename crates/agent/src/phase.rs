//! Turn state machine.
//!
//! `Idle → Classifying → Retrieving → Composing → ModelCall → Finalizing → Idle`.
//! `ModelCall → ModelCall` is allowed while the model is calling tools.

use serde::Serialize;
use std::fmt;

use crate::error::AgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    Classifying,
    Retrieving,
    Composing,
    ModelCall,
    Finalizing,
}

impl TurnPhase {
    fn successor(self) -> TurnPhase {
        match self {
            Self::Idle => Self::Classifying,
            Self::Classifying => Self::Retrieving,
            Self::Retrieving => Self::Composing,
            Self::Composing => Self::ModelCall,
            Self::ModelCall => Self::Finalizing,
            Self::Finalizing => Self::Idle,
        }
    }

    /// Move to `next`, rejecting anything but the successor (or a tool loop).
    pub fn advance(&mut self, next: TurnPhase) -> Result<(), AgentError> {
        let tool_loop = *self == Self::ModelCall && next == Self::ModelCall;
        if next != self.successor() && !tool_loop {
            return Err(AgentError::InvalidTransition { from: *self, to: next });
        }
        tracing::trace!(from = %self, to = %next, "phase");
        *self = next;
        Ok(())
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Classifying => "classifying",
            Self::Retrieving => "retrieving",
            Self::Composing => "composing",
            Self::ModelCall => "model_call",
            Self::Finalizing => "finalizing",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle() {
        let mut phase = TurnPhase::Idle;
        for next in [
            TurnPhase::Classifying,
            TurnPhase::Retrieving,
            TurnPhase::Composing,
            TurnPhase::ModelCall,
            TurnPhase::ModelCall,
            TurnPhase::Finalizing,
            TurnPhase::Idle,
        ] {
            phase.advance(next).unwrap();
        }
        assert_eq!(phase, TurnPhase::Idle);
    }

    #[test]
    fn backward_transition_rejected() {
        let mut phase = TurnPhase::Composing;
        let err = phase.advance(TurnPhase::Retrieving).unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidTransition { from: TurnPhase::Composing, to: TurnPhase::Retrieving }
        ));
        assert_eq!(phase, TurnPhase::Composing);
    }

    #[test]
    fn skipping_rejected() {
        let mut phase = TurnPhase::Idle;
        assert!(phase.advance(TurnPhase::ModelCall).is_err());
        assert!(phase.advance(TurnPhase::Idle).is_err());
    }
}
