// Terminal version of the questionnaire.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::info;

use crate::form::{FormField, FormInput};

/// Asks every question in form order. An empty line skips the question;
/// end of input stops early and keeps what was answered.
pub fn run_interview<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<FormInput> {
    let mut form = FormInput::new();
    let mut section = "";

    for field in FormField::ALL {
        if field.section() != section {
            section = field.section();
            writeln!(output, "\n== {} ==", section)?;
        }
        write!(output, "{}\n> ", field.question())?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            info!("Input closed before all questions were answered");
            break;
        }
        let answer = answer.trim();
        if !answer.is_empty() {
            form.set(field, answer);
        }
    }

    Ok(form)
}
