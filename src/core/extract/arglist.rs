use crate::core::catalog::{ExtractedMessage, MessageSink, Position};
use crate::core::flags::FlagContext;
use crate::core::keywords::CallShape;
use crate::core::scan::SharedComment;

/// Decode the bytes of a string literal. Invalid UTF-8 is replaced and
/// reported at `position`.
pub fn decode_literal(text: &[u8], position: &Position) -> String {
    match String::from_utf8(text.to_vec()) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(
                "{}: string literal is not valid UTF-8; invalid bytes replaced",
                position
            );
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

#[derive(Debug, Clone)]
struct Argument {
    text: String,
    context: FlagContext,
    position: Position,
    comment: Option<SharedComment>,
}

/// Collects the literal arguments of one keyword call and assembles them
/// into a message once the call is closed.
///
/// An accumulator without a shape belongs to a call of something that is not
/// a keyword and drops whatever it is given.
#[derive(Debug, Default)]
pub struct ArgumentAccumulator {
    shape: Option<CallShape>,
    msgid: Option<Argument>,
    plural: Option<Argument>,
    context: Option<Argument>,
}

impl ArgumentAccumulator {
    pub fn new(shape: Option<CallShape>) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    pub fn unbound() -> Self {
        Self::default()
    }

    /// Record a literal seen as argument `arg`. Only the first literal of
    /// each slot counts.
    pub fn remember(
        &mut self,
        arg: usize,
        text: &[u8],
        context: FlagContext,
        position: Position,
        comment: Option<SharedComment>,
    ) {
        let Some(shape) = self.shape else {
            return;
        };

        let slot = if arg == shape.msgid {
            &mut self.msgid
        } else if shape.plural == Some(arg) {
            &mut self.plural
        } else if shape.context == Some(arg) {
            &mut self.context
        } else {
            return;
        };

        if slot.is_none() {
            *slot = Some(Argument {
                text: decode_literal(text, &position),
                context,
                position,
                comment,
            });
        }
    }

    /// Close the call after `argc` arguments and emit its message, if the
    /// call matched the shape.
    pub fn finish(self, argc: usize, sink: &mut dyn MessageSink) {
        let Some(shape) = self.shape else {
            return;
        };
        if shape.total.is_some_and(|total| total != argc) {
            return;
        }
        let Some(msgid) = self.msgid else {
            return;
        };
        if shape.plural.is_some() && self.plural.is_none() {
            return;
        }
        if shape.context.is_some() && self.context.is_none() {
            return;
        }

        let format = match &self.plural {
            Some(plural) => msgid.context.is_format.merge(plural.context.is_format),
            None => msgid.context.is_format,
        };

        sink.remember(ExtractedMessage {
            context: self.context.map(|c| c.text),
            msgid: msgid.text,
            plural: self.plural.map(|p| p.text),
            position: msgid.position,
            format,
            comment: msgid.comment,
        });
    }
}
