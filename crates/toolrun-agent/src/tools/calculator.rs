//! Calculator tool — evaluates arithmetic expressions.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?
//! primary := number | '(' expr ')'
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::base::{ParamSpec, ParamType, RetryableError, Tool};

/// Deepest nesting of parentheses and unary signs accepted.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Deserialize)]
pub struct CalculatorArgs {
    pub expression: String,
}

/// Evaluates expressions like `"(12 + 3) * 4 / 5"`.
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    type Args = CalculatorArgs;

    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports + - * / % ^, unary minus, and parentheses."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "expression",
            ParamType::String,
            "The expression to evaluate, e.g. \"(2 + 3) * 4\"",
        )]
    }

    async fn call(&self, args: CalculatorArgs) -> Result<String> {
        // Evaluation errors are reported back to the model.
        let value = evaluate(&args.expression)
            .map_err(|e| RetryableError::new(format!("cannot evaluate '{}': {e}", args.expression)))?;
        Ok(format_number(value))
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64> {
    let mut parser = Parser {
        chars: expression.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        bail!("unexpected '{c}' at position {}", parser.pos);
    }
    if !value.is_finite() {
        bail!("result is not a finite number");
    }
    Ok(value)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<f64>) -> Result<f64> {
        if self.depth >= MAX_DEPTH {
            bail!("expression nested too deeply");
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        value
    }

    /// Consume `c` if it is the next non-blank character.
    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') {
                value *= self.unary()?;
            } else if self.eat('/') {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    bail!("division by zero");
                }
                value /= rhs;
            } else if self.eat('%') {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    bail!("modulo by zero");
                }
                value %= rhs;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<f64> {
        if self.eat('-') {
            Ok(-self.nested(Self::unary)?)
        } else if self.eat('+') {
            self.nested(Self::unary)
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Result<f64> {
        let base = self.primary()?;
        if self.eat('^') {
            let exponent = self.nested(Self::unary)?;
            Ok(base.powf(exponent))
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> Result<f64> {
        if self.eat('(') {
            let value = self.nested(Self::expr)?;
            if !self.eat(')') {
                bail!("missing closing parenthesis");
            }
            return Ok(value);
        }

        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        if start == self.pos {
            match self.peek() {
                Some(c) => bail!("unexpected '{c}' at position {}", self.pos),
                None => bail!("unexpected end of expression"),
            }
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| anyhow::anyhow!("invalid number '{literal}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("17 % 5").unwrap(), 2.0);
        assert_eq!(evaluate("7 / 2").unwrap(), 3.5);
    }

    #[test]
    fn test_unary_and_power() {
        assert_eq!(evaluate("-3 + 5").unwrap(), 2.0);
        assert_eq!(evaluate("-(2 + 3)").unwrap(), -5.0);
        assert_eq!(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(evaluate("2 ^ -1").unwrap(), 0.5);
    }

    #[test]
    fn test_errors() {
        assert!(evaluate("1 / 0").unwrap_err().to_string().contains("division by zero"));
        assert!(evaluate("5 % 0").is_err());
        assert!(evaluate("(1 + 2").unwrap_err().to_string().contains("parenthesis"));
        assert!(evaluate("2 +").unwrap_err().to_string().contains("end of expression"));
        assert!(evaluate("2 $ 3").unwrap_err().to_string().contains("'$'"));
        assert!(evaluate("1.2.3").unwrap_err().to_string().contains("invalid number"));
        assert!(evaluate("").is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let err = evaluate(&parens).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"));

        let signs = format!("{}1", "-".repeat(100_000));
        assert!(evaluate(&signs).unwrap_err().to_string().contains("nested too deeply"));

        let powers = format!("2{}", "^1".repeat(100_000));
        assert!(evaluate(&powers).unwrap_err().to_string().contains("nested too deeply"));

        let ok = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(evaluate(&ok).unwrap(), 1.0);
        assert_eq!(evaluate("--3").unwrap(), 3.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(3.5), "3.5");
    }

    #[tokio::test]
    async fn test_call_formats_result() {
        let out = CalculatorTool
            .call(CalculatorArgs {
                expression: "2+2".into(),
            })
            .await
            .unwrap();
        assert_eq!(out, "4");
    }

    #[tokio::test]
    async fn test_call_error_is_retryable() {
        let err = CalculatorTool
            .call(CalculatorArgs {
                expression: "1/0".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is::<RetryableError>());
        assert!(err.to_string().contains("division by zero"));
    }

    #[tokio::test]
    async fn test_call_deep_nesting_is_retryable() {
        let err = CalculatorTool
            .call(CalculatorArgs {
                expression: format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000)),
            })
            .await
            .unwrap_err();
        assert!(err.is::<RetryableError>());
        assert!(err.to_string().contains("nested too deeply"));
    }
}
