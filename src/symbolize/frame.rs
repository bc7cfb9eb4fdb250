//! Stack trace line parsing

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// `    at handler (https://cdn.shop/app.min.js:1:2345)` or `    at https://cdn.shop/app.min.js:1:2345`
static V8_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*at (?:(?P<func>.+?) \()?(?P<file>[^()\s]+?):(?P<line>\d+):(?P<col>\d+)\)?\s*$")
        .expect("valid V8 frame regex")
});

// `handler@https://cdn.shop/app.min.js:1:2345`
static GECKO_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<func>[^@\s]*)@(?P<file>\S+?):(?P<line>\d+):(?P<col>\d+)\s*$")
        .expect("valid Gecko frame regex")
});

/// Position in minified code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackFrame {
    pub function: Option<String>,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// One line of a stack trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackLine {
    Frame(StackFrame),
    /// Message or frame in a format we do not parse
    Text(String),
}

impl StackFrame {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = V8_FRAME
            .captures(line)
            .or_else(|| GECKO_FRAME.captures(line))?;

        Some(Self {
            function: caps
                .name("func")
                .map(|m| m.as_str().to_string())
                .filter(|f| !f.is_empty()),
            file: caps.name("file")?.as_str().to_string(),
            line: caps.name("line")?.as_str().parse().ok()?,
            column: caps.name("col")?.as_str().parse().ok()?,
        })
    }
}

/// Split a raw stack into parsed frames and pass-through text lines
pub fn parse_stack(stack: &str) -> Vec<StackLine> {
    stack
        .lines()
        .map(|line| match StackFrame::parse(line) {
            Some(frame) => StackLine::Frame(frame),
            None => StackLine::Text(line.to_string()),
        })
        .collect()
}
