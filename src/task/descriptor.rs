// src/task/descriptor.rs

use crate::errors::DecodeError;

const PROGRAM_KEY: &str = "program:";
const PARAMETERS_KEY: &str = "parameters:";

/// What to run for one task: a program and the argument string appended to
/// it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    program: String,
    parameters: String,
}

impl TaskDescriptor {
    pub fn new(program: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            parameters: parameters.into(),
        }
    }

    /// Parse the text of a task file.
    ///
    /// Only lines starting with `program:` or `parameters:` are records; any
    /// other line is ignored. When a key repeats, the last occurrence wins.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let mut program = None;
        let mut parameters = None;

        for line in text.lines() {
            if let Some(value) = line.strip_prefix(PROGRAM_KEY) {
                program = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix(PARAMETERS_KEY) {
                parameters = Some(value.trim().to_string());
            }
        }

        let program = program.ok_or(DecodeError::MissingField("program"))?;
        let parameters = parameters.ok_or(DecodeError::MissingField("parameters"))?;

        if program.is_empty() {
            return Err(DecodeError::EmptyProgram);
        }

        Ok(Self { program, parameters })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    /// The full command line handed to the shell.
    pub fn command_line(&self) -> String {
        if self.parameters.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.parameters)
        }
    }
}
