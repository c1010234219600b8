//! Decides when a model response ends the turn.

use fisibot_core::message::{Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSignal {
    /// The model produced its answer; stop the turn.
    Finished,
    /// Keep going (tool results pending, or no text yet).
    Continue,
}

/// `Finished` iff the message is the model's and carries non-blank text.
/// Content is not modified.
pub fn finalize(message: &Message) -> TurnSignal {
    if message.role == Role::Assistant && !message.content.trim().is_empty() {
        TurnSignal::Finished
    } else {
        TurnSignal::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fisibot_core::message::MessageToolCall;

    #[test]
    fn assistant_text_finishes() {
        assert_eq!(finalize(&Message::assistant("El efecto Doppler...")), TurnSignal::Finished);
    }

    #[test]
    fn tool_only_message_continues() {
        let msg = Message::tool_request(vec![MessageToolCall {
            id: "c".into(),
            name: "buscar_documentos".into(),
            arguments: "{}".into(),
        }]);
        assert_eq!(finalize(&msg), TurnSignal::Continue);
    }

    #[test]
    fn whitespace_and_other_roles_continue() {
        assert_eq!(finalize(&Message::assistant("  \n")), TurnSignal::Continue);
        assert_eq!(finalize(&Message::user("hola")), TurnSignal::Continue);
        assert_eq!(finalize(&Message::tool_result("c", "{}")), TurnSignal::Continue);
    }
}
