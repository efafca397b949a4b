//! IEEE 1364 value change dump parser.
//!
//! VCD is a whitespace-separated token format: several commands may share a
//! line and one `$keyword ... $end` section may span many. The input is
//! tokenized with line tracking, the header region builds the signal table,
//! and the value-change region appends [`ValueChange`]s per identifier code.

use std::collections::HashMap;

use serde::Deserialize;
use tracecmp_common::{Logic, LogicVec};
use tracing::{debug, warn};

use crate::error::{ParseErrorKind, TraceError};
use crate::timescale::Timescale;
use crate::trace::{IdCode, Signal, Trace, ValueChange, Waveform};

/// What to do when one identifier is assigned twice at the same time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the parse with [`ParseErrorKind::DuplicateChange`].
    #[default]
    Reject,
    /// Keep only the later assignment.
    LastWins,
}

/// Options controlling how strictly a trace is parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParseOptions {
    /// Handling of same-time reassignments.
    pub duplicate_changes: DuplicatePolicy,
}

/// Parses a complete value change dump held in memory.
///
/// Invalid UTF-8 (occasionally found in `$comment` text) is replaced rather
/// than rejected.
///
/// # Errors
///
/// Returns [`TraceError::Parse`] naming the offending line for malformed
/// declarations or time markers, undeclared identifiers, time reversals, and
/// duplicate changes; [`TraceError::Format`] when `$enddefinitions` is missing.
pub fn parse_trace(input: &[u8], options: &ParseOptions) -> Result<Trace, TraceError> {
    let text = String::from_utf8_lossy(input);
    parse_str(&text, options)
}

/// Parses a complete value change dump from text.
///
/// # Errors
///
/// See [`parse_trace`].
pub fn parse_str(text: &str, options: &ParseOptions) -> Result<Trace, TraceError> {
    let mut tokens = Tokens::new(text);
    let mut builder = TraceBuilder::new(options);
    let mut in_definitions = true;

    while let Some(tok) = tokens.next() {
        if let Some(keyword) = tok.text.strip_prefix('$') {
            let keyword = keyword.to_ascii_lowercase();
            match keyword.as_str() {
                "end" => {}
                "dumpvars" | "dumpall" | "dumpon" | "dumpoff" if !in_definitions => {}
                "enddefinitions" => {
                    section_body(&mut tokens, &keyword, tok.line)?;
                    in_definitions = false;
                }
                _ if in_definitions => {
                    let body = section_body(&mut tokens, &keyword, tok.line)?;
                    builder.declaration(&keyword, &body, tok.line)?;
                }
                _ => {
                    section_body(&mut tokens, &keyword, tok.line)?;
                }
            }
            continue;
        }

        if in_definitions {
            return Err(TraceError::at(
                tok.line,
                ParseErrorKind::UnexpectedHeaderToken(tok.text.to_string()),
            ));
        }

        builder.value_change(tok, &mut tokens)?;
    }

    if in_definitions && !builder.signals.is_empty() {
        return Err(TraceError::Format("missing $enddefinitions".to_string()));
    }

    let trace = builder.finish();
    debug!(
        signals = trace.signals().len(),
        ids = trace.id_count(),
        changes = trace.change_count(),
        timescale = %trace.timescale(),
        "parsed trace"
    );
    Ok(trace)
}

/// A whitespace-delimited token and the line it starts on.
#[derive(Clone, Copy, Debug)]
struct Token<'a> {
    text: &'a str,
    line: usize,
}

struct Tokens<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self {
        Self { rest: src, line: 1 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let start = self.rest.find(|c: char| !c.is_whitespace())?;
        self.line += self.rest[..start].matches('\n').count();
        let rest = &self.rest[start..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.rest = &rest[end..];
        Some(Token {
            text: &rest[..end],
            line: self.line,
        })
    }
}

/// Collects the tokens of a `$keyword` section up to (not including) `$end`.
fn section_body<'a>(
    tokens: &mut Tokens<'a>,
    keyword: &str,
    line: usize,
) -> Result<Vec<&'a str>, TraceError> {
    let mut body = Vec::new();
    for tok in tokens.by_ref() {
        if tok.text.eq_ignore_ascii_case("$end") {
            return Ok(body);
        }
        body.push(tok.text);
    }
    Err(TraceError::at(
        line,
        ParseErrorKind::Unterminated(keyword.to_string()),
    ))
}

struct TraceBuilder<'o> {
    options: &'o ParseOptions,
    timescale: Timescale,
    date: Option<String>,
    version: Option<String>,
    scope: Vec<String>,
    signals: Vec<Signal>,
    waveforms: Vec<Waveform>,
    by_id: HashMap<IdCode, usize>,
    by_key: HashMap<String, usize>,
    current_time: u64,
}

impl<'o> TraceBuilder<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            timescale: Timescale::default(),
            date: None,
            version: None,
            scope: Vec::new(),
            signals: Vec::new(),
            waveforms: Vec::new(),
            by_id: HashMap::new(),
            by_key: HashMap::new(),
            current_time: 0,
        }
    }

    fn finish(self) -> Trace {
        Trace {
            timescale: self.timescale,
            date: self.date,
            version: self.version,
            signals: self.signals,
            waveforms: self.waveforms,
            by_id: self.by_id,
            by_key: self.by_key,
        }
    }

    /// Handles one header section.
    fn declaration(&mut self, keyword: &str, body: &[&str], line: usize) -> Result<(), TraceError> {
        match keyword {
            "timescale" => {
                let text = body.join(" ");
                self.timescale = Timescale::parse(&text)
                    .ok_or_else(|| TraceError::at(line, ParseErrorKind::InvalidTimescale(text)))?;
            }
            "date" => self.date = Some(body.join(" ")),
            "version" => self.version = Some(body.join(" ")),
            "scope" => {
                // "<type> <name>", tolerate a bare name
                let name = match body {
                    [_, name, ..] | [name] => *name,
                    [] => {
                        return Err(TraceError::at(
                            line,
                            ParseErrorKind::InvalidScope(String::new()),
                        ))
                    }
                };
                self.scope.push(name.to_string());
            }
            "upscope" => {
                if self.scope.pop().is_none() {
                    return Err(TraceError::at(line, ParseErrorKind::UnbalancedUpscope));
                }
            }
            "var" => self.var(body, line)?,
            _ => {
                // $comment and vendor extensions
            }
        }
        Ok(())
    }

    /// `$var <type> <width> <id> <reference> [<bit-select>] $end`
    fn var(&mut self, body: &[&str], line: usize) -> Result<(), TraceError> {
        let [var_type, width, id, reference, select @ ..] = body else {
            return Err(TraceError::at(
                line,
                ParseErrorKind::InvalidVar(body.join(" ")),
            ));
        };
        let width: u32 = width
            .parse()
            .ok()
            .filter(|&w| w > 0)
            .ok_or_else(|| TraceError::at(line, ParseErrorKind::InvalidWidth(width.to_string())))?;

        let mut name = self.scope.join(".");
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(reference);
        for part in select {
            name.push_str(part);
        }

        let id = IdCode(id.to_string());
        let key = name.to_lowercase();
        let idx = self.signals.len();

        let waveform = match self.by_id.get(&id) {
            Some(&w) => {
                if self.waveforms[w].width != width {
                    warn!(
                        id = %id,
                        signal = %name,
                        declared = width,
                        kept = self.waveforms[w].width,
                        "alias declared with a different width"
                    );
                }
                w
            }
            None => {
                self.waveforms.push(Waveform {
                    width,
                    changes: Vec::new(),
                    aliases: Vec::new(),
                });
                self.by_id.insert(id.clone(), self.waveforms.len() - 1);
                self.waveforms.len() - 1
            }
        };
        self.waveforms[waveform].aliases.push(idx);

        if self.by_key.contains_key(&key) {
            warn!(signal = %name, line, "signal name declared twice (ignoring case); keeping the first");
        } else {
            self.by_key.insert(key.clone(), idx);
        }

        self.signals.push(Signal {
            name,
            key,
            id,
            width,
            var_type: var_type.to_string(),
        });
        Ok(())
    }

    /// Handles one token of the value-change region.
    fn value_change(&mut self, tok: Token<'_>, tokens: &mut Tokens<'_>) -> Result<(), TraceError> {
        let text = tok.text;
        let invalid = || TraceError::at(tok.line, ParseErrorKind::InvalidValueChange(text.to_string()));

        if let Some(time) = text.strip_prefix('#') {
            let time: u64 = time.parse().map_err(|_| {
                TraceError::at(tok.line, ParseErrorKind::InvalidTimestamp(text.to_string()))
            })?;
            if time < self.current_time {
                return Err(TraceError::at(
                    tok.line,
                    ParseErrorKind::TimeReversal {
                        time,
                        current: self.current_time,
                    },
                ));
            }
            self.current_time = time;
            return Ok(());
        }

        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return Err(invalid());
        };

        match first {
            'b' | 'B' => {
                let value = LogicVec::from_binary_str(chars.as_str())
                    .filter(|v| !v.is_empty())
                    .ok_or_else(invalid)?;
                let id = tokens.next().ok_or_else(invalid)?;
                self.assign(id.text, value, id.line)
            }
            'r' | 'R' | 's' | 'S' => {
                let id = tokens.next().ok_or_else(invalid)?;
                self.waveform_index(id.text, id.line)?;
                debug!(id = id.text, time = self.current_time, "skipping non-logic value change");
                Ok(())
            }
            _ => {
                let level = Logic::from_char(first).ok_or_else(invalid)?;
                let id = chars.as_str();
                if id.is_empty() {
                    return Err(invalid());
                }
                self.assign(id, LogicVec::filled(1, level), tok.line)
            }
        }
    }

    fn waveform_index(&self, id: &str, line: usize) -> Result<usize, TraceError> {
        self.by_id
            .get(&IdCode(id.to_string()))
            .copied()
            .ok_or_else(|| TraceError::at(line, ParseErrorKind::UndeclaredIdentifier(id.to_string())))
    }

    /// Records `value` for `id` at the current time, fitted to the declared width.
    fn assign(&mut self, id: &str, value: LogicVec, line: usize) -> Result<(), TraceError> {
        let w = self.waveform_index(id, line)?;
        let waveform = &mut self.waveforms[w];
        let value = fit_to_width(value, waveform.width);
        let time = self.current_time;

        match waveform.changes.last_mut() {
            Some(last) if last.time == time => match self.options.duplicate_changes {
                DuplicatePolicy::Reject => {
                    return Err(TraceError::at(
                        line,
                        ParseErrorKind::DuplicateChange {
                            id: id.to_string(),
                            time,
                        },
                    ));
                }
                DuplicatePolicy::LastWins => last.value = value,
            },
            _ => waveform.changes.push(ValueChange::new(time, value)),
        }
        Ok(())
    }
}

/// Extends or truncates a value to the declared width.
///
/// Short values are left-extended with `0`, or with `x`/`z` when their
/// leftmost bit is `x`/`z`. Long values keep their low bits.
fn fit_to_width(value: LogicVec, width: u32) -> LogicVec {
    if value.width() == width {
        return value;
    }
    let fill = value
        .msb()
        .map(Logic::extension_fill)
        .unwrap_or(Logic::Zero);
    value.resized(width, fill)
}
