//! Fixed prompts for the LLM-backed tools

use assistant_core::{PromptTemplate, Result};

/// Placeholder both tool templates substitute
pub const QUESTION_VARIABLE: &str = "question";

pub const MATH_PROMPT: &str = "
You are a helpful and accurate math expert. Carefully solve the following math problem step-by-step and return the final answer at the end.

Question: {{ question }}

Answer:
";

pub const REASONING_PROMPT: &str = "
You are an agent tasked with solving users' logical or reasoning-based questions. Logically arrive at the solution and provide a detailed explanation, step-by-step and point-wise.

Question: {{ question }}

Answer:
";

/// # Errors
///
/// Only if the constant above is edited into an invalid template.
pub fn math_template() -> Result<PromptTemplate> {
    PromptTemplate::new(MATH_PROMPT, [QUESTION_VARIABLE])
}

/// # Errors
///
/// Only if the constant above is edited into an invalid template.
pub fn reasoning_template() -> Result<PromptTemplate> {
    PromptTemplate::new(REASONING_PROMPT, [QUESTION_VARIABLE])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_render_question_line() {
        let math = math_template().unwrap().format("2+2").unwrap();
        assert!(math.contains("Question: 2+2\n\nAnswer:"));
        assert!(math.contains("math expert"));

        let logic = reasoning_template().unwrap().format("Is every square a rectangle?").unwrap();
        assert!(logic.contains("Question: Is every square a rectangle?"));
        assert!(logic.contains("point-wise"));
    }
}
