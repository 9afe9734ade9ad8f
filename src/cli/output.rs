//! Result printing for the `calc` binary.

use std::io::{self, Write};

use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::calculator::CalcNode;
use crate::diagnostics::render_errors;
use crate::errors::ErrorReport;
use crate::input::Input;
use crate::parser::ParseResult;

/// Machine-readable outcome of one expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub input: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub errors: Vec<ErrorReport>,
}

impl Evaluation {
    pub fn new(text: &str, result: &ParseResult<CalcNode>) -> Self {
        let value = if result.success {
            result.root.as_ref().map(CalcNode::eval)
        } else {
            None
        };
        Self {
            input: text.to_string(),
            success: result.success,
            value,
            errors: result.reports(),
        }
    }
}

pub fn write_json(out: &mut dyn Write, evaluation: &Evaluation) -> io::Result<()> {
    serde_json::to_writer(&mut *out, evaluation)?;
    writeln!(out)
}

/// `value` on success, otherwise the rendered errors.
pub fn write_text(
    out: &mut dyn WriteColor,
    input: &Input,
    result: &ParseResult<CalcNode>,
) -> io::Result<()> {
    if !result.success {
        return render_errors(out, &result.errors, input);
    }
    match result.root.as_ref().map(CalcNode::eval) {
        Some(value) => writeln!(out, "{value}"),
        None => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            writeln!(out, "no value")?;
            out.reset()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Calculator;

    #[test]
    fn test_json_omits_value_on_failure() {
        let calc = Calculator::new().unwrap();
        let evaluation = Evaluation::new("(", &calc.parse("("));
        let mut out = Vec::new();
        write_json(&mut out, &evaluation).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("value").is_none());
        assert_eq!(json["errors"][0]["kind"], "syntax");
    }
}
