// src/stages/include.rs

//! `@@include('fragment.html', {"key": "value"})` resolution.
//!
//! References resolve against a fixed fragment directory. Fragments are
//! expanded recursively; inside a fragment, `@@key` is replaced by the value
//! of `key` in the include context (dotted keys look into nested objects).
//! Unknown `@@key` markers are left as they are.
//!
//! An unresolvable reference fails the whole record: partial pages are never
//! written, so the previous output stays in place.

use std::path::PathBuf;
use std::sync::Arc;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::{AssetflowError, Result};
use crate::fs::FileSystem;
use crate::pipeline::{FileRecord, Stage};

/// Marker prefix shared by includes and context variables.
pub const PREFIX: &str = "@@";

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("unresolved include {reference:?} (looked for {path:?})")]
    Unresolved { reference: String, path: PathBuf },

    #[error("malformed include marker at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    #[error("invalid include context: {0}")]
    Context(#[from] serde_json::Error),

    #[error("include cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// One parsed `@@include(...)` call.
struct IncludeCall {
    reference: String,
    context: Map<String, Value>,
    /// Bytes consumed after the opening `@@include(`, including the `)`.
    consumed: usize,
}

pub struct TemplateInclude {
    fs: Arc<dyn FileSystem>,
    base: PathBuf,
    marker: Regex,
    variable: Regex,
}

impl std::fmt::Debug for TemplateInclude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateInclude")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl TemplateInclude {
    pub fn new(fs: Arc<dyn FileSystem>, base: impl Into<PathBuf>) -> Result<Self> {
        let marker = Regex::new(&format!(r"{PREFIX}include\(\s*")).map_err(anyhow::Error::from)?;
        let variable = Regex::new(&format!(r"{PREFIX}([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)"))
            .map_err(anyhow::Error::from)?;
        Ok(Self {
            fs,
            base: base.into(),
            marker,
            variable,
        })
    }

    /// Resolve every include in a top-level document.
    pub fn resolve(&self, text: &str) -> std::result::Result<String, IncludeError> {
        let mut stack = Vec::new();
        self.expand(text, &Map::new(), &mut stack)
    }

    fn expand(
        &self,
        text: &str,
        context: &Map<String, Value>,
        stack: &mut Vec<PathBuf>,
    ) -> std::result::Result<String, IncludeError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut offset = 0;

        while let Some(m) = self.marker.find(rest) {
            out.push_str(&rest[..m.start()]);
            let args = &rest[m.end()..];
            let call = parse_call(args, offset + m.end())?;

            let path = self.base.join(&call.reference);
            if stack.contains(&path) {
                let mut chain: Vec<String> =
                    stack.iter().map(|p| p.display().to_string()).collect();
                chain.push(path.display().to_string());
                return Err(IncludeError::Cycle(chain));
            }

            let fragment =
                self.fs
                    .read_to_string(&path)
                    .map_err(|_| IncludeError::Unresolved {
                        reference: call.reference.clone(),
                        path: path.clone(),
                    })?;

            let mut scope = context.clone();
            scope.extend(call.context);
            let fragment = self.substitute(&fragment, &scope);

            stack.push(path);
            let expanded = self.expand(&fragment, &scope, stack)?;
            stack.pop();

            out.push_str(&expanded);
            let advance = m.end() + call.consumed;
            rest = &rest[advance..];
            offset += advance;
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Replace `@@key` markers whose key is present in `context`.
    fn substitute(&self, text: &str, context: &Map<String, Value>) -> String {
        if context.is_empty() {
            return text.to_string();
        }
        self.variable
            .replace_all(text, |caps: &Captures<'_>| {
                let key = &caps[1];
                if key == "include" {
                    return caps[0].to_string();
                }
                match lookup(context, key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) => String::new(),
                    Some(other) => other.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

fn lookup<'a>(context: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut value = context.get(parts.next()?)?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

/// Parse `'path'` or `"path", {json}` followed by `)`.
///
/// `at` is the byte offset of `args` in the enclosing document, for errors.
fn parse_call(args: &str, at: usize) -> std::result::Result<IncludeCall, IncludeError> {
    let malformed = |pos: usize, reason| IncludeError::Malformed {
        offset: at + pos,
        reason,
    };

    let quote = match args.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(malformed(0, "expected a quoted fragment path")),
    };
    let close = args[1..]
        .find(quote)
        .ok_or_else(|| malformed(0, "unterminated fragment path"))?;
    let reference = args[1..1 + close].to_string();
    let mut pos = close + 2;

    pos += leading_ws(&args[pos..]);
    let mut context = Map::new();
    if args[pos..].starts_with(',') {
        pos += 1;
        pos += leading_ws(&args[pos..]);

        let mut stream = serde_json::Deserializer::from_str(&args[pos..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => context = map,
            Some(Ok(_)) => return Err(malformed(pos, "include context must be a JSON object")),
            Some(Err(err)) => return Err(IncludeError::Context(err)),
            None => return Err(malformed(pos, "missing include context")),
        }
        pos += stream.byte_offset();
        pos += leading_ws(&args[pos..]);
    }

    if !args[pos..].starts_with(')') {
        return Err(malformed(pos, "expected `)`"));
    }

    Ok(IncludeCall {
        reference,
        context,
        consumed: pos + 1,
    })
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

impl Stage for TemplateInclude {
    fn name(&self) -> &'static str {
        "include"
    }

    fn apply(&self, mut record: FileRecord) -> Result<FileRecord> {
        let text = std::str::from_utf8(&record.contents)
            .map_err(|e| AssetflowError::stage(self.name(), &record.path, e.to_string()))?;
        let resolved = self
            .resolve(text)
            .map_err(|e| AssetflowError::stage(self.name(), &record.path, e.to_string()))?;
        record.contents = resolved.into_bytes();
        Ok(record)
    }
}
