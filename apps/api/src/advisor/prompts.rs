// Prompt constants for the generative career advisor.
// The canonical input is embedded verbatim: no prompt-injection sanitization
// is applied, which is a documented limitation of the advisor contract.

/// System persona fixed for every advisor exchange.
pub const ADVISOR_SYSTEM_PROMPT: &str = "You are a helpful career advisor assistant.";

/// User message template; `{input}` is replaced with the canonical input.
pub const ADVISOR_USER_TEMPLATE: &str = "Suggest suitable career paths based on: {input}";
