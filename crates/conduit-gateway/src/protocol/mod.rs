//! Wire format types for both sides of the translation

pub mod anthropic;
pub mod openai;
