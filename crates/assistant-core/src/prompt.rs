//! Prompt Templates
//!
//! Tera templates with `{{ name }}` placeholders. Values are inserted
//! verbatim; templates are never HTML-escaped.

use std::collections::HashMap;

use tera::{Context, Tera};

use crate::error::{AgentError, Result};

const TEMPLATE_NAME: &str = "prompt";

/// A template whose placeholders are checked against declared variables
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    tera: Tera,
    input_variables: Vec<String>,
}

/// Flatten a tera error and its causes into one message
fn template_error(err: &tera::Error) -> AgentError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    AgentError::Template(message)
}

impl PromptTemplate {
    /// Build a template, verifying it uses exactly the declared variables
    ///
    /// # Errors
    ///
    /// Fails when the template does not parse, references an undeclared
    /// variable, or never uses a declared one.
    pub fn new<I, S>(template: impl AsRef<str>, input_variables: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut input_variables: Vec<String> = input_variables.into_iter().map(Into::into).collect();
        input_variables.sort();
        input_variables.dedup();

        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, template.as_ref())
            .map_err(|e| template_error(&e))?;
        let prompt = Self {
            tera,
            input_variables,
        };

        // Every placeholder must be declared
        let all: HashMap<&str, &str> = prompt.input_variables.iter().map(|v| (v.as_str(), "")).collect();
        prompt.render(&all).map_err(|e| {
            AgentError::Template(format!(
                "template uses variables other than {:?} ({e})",
                prompt.input_variables
            ))
        })?;

        // Every declared variable must be used
        for name in &prompt.input_variables {
            let without: HashMap<&str, &str> = prompt
                .input_variables
                .iter()
                .filter(|v| *v != name)
                .map(|v| (v.as_str(), ""))
                .collect();
            if prompt.render(&without).is_ok() {
                return Err(AgentError::Template(format!(
                    "declared variable '{name}' is not used by the template"
                )));
            }
        }

        Ok(prompt)
    }

    /// Declared variables, sorted
    #[must_use]
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Substitute every placeholder verbatim
    ///
    /// # Errors
    ///
    /// Fails when a variable used by the template has no value.
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String> {
        let context = Context::from_serialize(values).map_err(|e| template_error(&e))?;
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| template_error(&e))
    }

    /// Render a single-variable template
    ///
    /// # Errors
    ///
    /// Fails when the template declares anything other than one variable.
    pub fn format(&self, value: &str) -> Result<String> {
        let [name] = self.input_variables.as_slice() else {
            return Err(AgentError::Template(format!(
                "format() needs exactly one variable, template has {}",
                self.input_variables.len()
            )));
        };
        self.render(&HashMap::from([(name.as_str(), value)]))
    }
}
