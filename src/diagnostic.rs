//! Severity-tagged messages produced while interpreting instructions.

use std::fmt::{self, Display};

use serde::Serialize;

use crate::units::{Volume, VOLUME_EPSILON, format_decimal};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Recorded, but the instruction still applies.
    Warn,
    /// The instruction is not applied.
    Err,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warn => "warn",
            Severity::Err => "err",
        })
    }
}

/// Rendered as `(err) Aspirate: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub instruction: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn is_err(&self) -> bool {
        self.severity == Severity::Err
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}: {}", self.severity, self.instruction, self.message)
    }
}

/// Ordered record of every diagnostic, with a cursor for polling.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
    polled: usize,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(diagnostics);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn since(&self, mark: usize) -> &[Diagnostic] {
        self.entries.get(mark..).unwrap_or_default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Err)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Warn)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Next diagnostic not yet handed out by `poll`.
    pub fn poll(&mut self) -> Option<Diagnostic> {
        let next = self.entries.get(self.polled).cloned();
        if next.is_some() {
            self.polled += 1;
        }
        next
    }
}

struct Entry {
    severity: Severity,
    message: String,
    prefixed: bool,
}

/// Collects the diagnostics of a single instruction before they are committed to the log.
///
/// Messages added with [`err`](Report::err)/[`warn`](Report::warn) receive the context
/// prefix (e.g. `While aspirating 100ul of water to head 0 channel 0 - `), which may be set
/// after the messages have been gathered.
pub struct Report {
    instruction: &'static str,
    prefix: String,
    entries: Vec<Entry>,
}

impl Report {
    pub fn new(instruction: &'static str) -> Self {
        Self {
            instruction,
            prefix: String::new(),
            entries: Vec::new(),
        }
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    fn push(&mut self, severity: Severity, message: String, prefixed: bool) {
        self.entries.push(Entry {
            severity,
            message,
            prefixed,
        });
    }

    pub fn err(&mut self, message: impl Display) {
        self.push(Severity::Err, message.to_string(), true);
    }

    pub fn warn(&mut self, message: impl Display) {
        self.push(Severity::Warn, message.to_string(), true);
    }

    /// An error that never carries the context prefix.
    pub fn err_bare(&mut self, message: impl Display) {
        self.push(Severity::Err, message.to_string(), false);
    }

    pub fn warn_bare(&mut self, message: impl Display) {
        self.push(Severity::Warn, message.to_string(), false);
    }

    /// Add an unprefixed error unless the same message was already reported.
    pub fn err_once(&mut self, message: impl Display) {
        let message = message.to_string();
        if !self.entries.iter().any(|e| e.message == message) {
            self.push(Severity::Err, message, false);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Err)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        let Self {
            instruction,
            prefix,
            entries,
        } = self;

        entries
            .into_iter()
            .map(|e| Diagnostic {
                severity: e.severity,
                instruction,
                message: if e.prefixed {
                    format!("{prefix}{}", e.message)
                } else {
                    e.message
                },
            })
            .collect()
    }
}

/// Comma-join displayable items.
pub fn join<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// One value when all agree, otherwise every value in braces: `5` or `{5,5,2}`.
pub fn summarize<T: Display>(values: &[T], same: impl Fn(&T, &T) -> bool) -> String {
    match values.split_first() {
        None => String::new(),
        Some((first, rest)) if rest.iter().all(|v| same(first, v)) => first.to_string(),
        Some(_) => format!("{{{}}}", join(values)),
    }
}

/// `100ul` or `{50,60}ul`.
pub fn volume_summary(volumes: &[Volume]) -> String {
    let numbers: Vec<f64> = volumes.iter().map(|v| v.as_ul()).collect();
    let rendered: Vec<String> = numbers.iter().map(|v| format_decimal(*v, 3)).collect();
    match numbers.split_first() {
        None => "0ul".to_string(),
        Some((first, rest)) if rest.iter().all(|v| (v - first).abs() <= VOLUME_EPSILON) => {
            format!("{}ul", rendered[0])
        }
        Some(_) => format!("{{{}}}ul", rendered.join(",")),
    }
}

/// `channel 0` or `channels 0,1`.
pub fn channel_list(channels: &[usize]) -> String {
    plural("channel", channels)
}

/// `well A1` or `wells A1,B1`.
pub fn plural<T: Display>(noun: &str, items: &[T]) -> String {
    match items {
        [single] => format!("{noun} {single}"),
        _ => format!("{noun}s {}", join(items)),
    }
}
