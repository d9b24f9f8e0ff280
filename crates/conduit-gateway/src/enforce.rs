//! Mandated leading instruction, required by the backend for this
//! credential class

use crate::protocol::anthropic::{MessagesRequest, SystemBlock, SystemPrompt};

/// Instruction text the backend requires as the first system segment
pub const MANDATED_INSTRUCTION: &str = "You are Claude Code, Anthropic's official CLI for Claude.";

/// Guarantee the request's system list begins with the mandated text
///
/// Normalizes the system field first (absent becomes an empty list, a bare
/// string becomes a single segment) and prepends the mandated segment
/// unless it is already in place. Idempotent: applying it twice equals
/// applying it once. Runs exactly once per call, after translation and
/// before dispatch.
pub fn enforce(request: &mut MessagesRequest) {
    let mut blocks = match request.system.take() {
        None => Vec::new(),
        Some(SystemPrompt::Text(text)) => vec![SystemBlock::text(text)],
        Some(SystemPrompt::Blocks(blocks)) => blocks,
    };

    let already_compliant = matches!(
        blocks.first(),
        Some(SystemBlock::Text { text }) if text == MANDATED_INSTRUCTION
    );

    if !already_compliant {
        blocks.insert(0, SystemBlock::text(MANDATED_INSTRUCTION));
    }

    request.system = Some(SystemPrompt::Blocks(blocks));
}
