use serde::{Deserialize, Serialize};

/// Characters per estimated token when the backend reports no usage.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Rough token estimate from character count, rounded up.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.len() as u64).div_ceil(CHARS_PER_TOKEN)
}

/// Per-call token usage, raw from the backend.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Estimate usage from prompt/response text when the backend gave none.
    pub fn estimated(input: &str, output: &str) -> Self {
        Self {
            input_tokens: estimate_tokens(input),
            output_tokens: estimate_tokens(output),
        }
    }
}

/// Run-level accumulated totals, incremented per completed task.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedTokens {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub task_count: u32,
}

impl AccumulatedTokens {
    pub fn accumulate(&mut self, usage: TokenUsage) {
        self.total_input_tokens += usage.input_tokens;
        self.total_output_tokens += usage.output_tokens;
        self.task_count += 1;
    }

    pub fn total(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }
}
