use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

use regex::Regex;

use crate::registry::{Institution, PaletteRegistry};

/// How many other-institution names are listed in the instructions.
const MAX_LISTED_NAMES: usize = 10;

/// Env vars handed to an external rewriting command.
pub const INSTRUCTIONS_ENV: &str = "REBRAND_INSTRUCTIONS";
pub const MODEL_ENV: &str = "REBRAND_MODEL";

#[derive(Debug, thiserror::Error)]
pub enum PolishError {
    #[error("failed to run text rewriter {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("text rewriter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("text rewriter returned no content")]
    EmptyResponse,
    #[error("text rewriter returned non-UTF-8 output")]
    InvalidUtf8,
    #[error("invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Rewrites references to other institutions inside HTML. Best effort:
/// callers keep their own input when this fails.
pub trait TextRewriter {
    fn polish(&self, html: &str, target: &Institution, model: &str) -> Result<String, PolishError>;
}

/// Drop a Markdown code fence wrapped around model output.
pub fn strip_code_fences(text: &str) -> String {
    let mut body = text;
    if let Some(rest) = body.strip_prefix("```html") {
        body = rest;
    }
    if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim().to_string()
}

/// Instructions for a language-model rewriter targeting `target`.
pub fn instructions_for(registry: &PaletteRegistry, target: &Institution) -> String {
    let others: Vec<&str> = registry
        .institutions()
        .iter()
        .filter(|inst| inst.id != target.id)
        .flat_map(|inst| [inst.short_name(), inst.full_name.as_str()])
        .take(MAX_LISTED_NAMES)
        .collect();

    format!(
        "You edit Canvas LMS HTML.\n\
         1. Replace references to other institutions with {full} (or {short} for short references).\n\
         2. Keep the HTML valid.\n\
         3. Keep every existing style, attribute and element.\n\
         4. Change nothing except institution names.\n\
         Names to replace: {names}\n\
         Return only the updated HTML, without explanations or code fences.",
        full = target.full_name,
        short = target.short_name(),
        names = others.join(", "),
    )
}

/// Offline rewriter that swaps other institutions' full names and short
/// codes for the target's.
#[derive(Debug, Clone)]
pub struct NameSwap {
    names: Vec<(String, String, String)>,
}

impl NameSwap {
    pub fn new(registry: &PaletteRegistry) -> Self {
        Self {
            names: registry
                .institutions()
                .iter()
                .map(|inst| {
                    (
                        inst.id.to_string(),
                        inst.short_name().to_string(),
                        inst.full_name.clone(),
                    )
                })
                .collect(),
        }
    }

    fn replacements<'a>(&'a self, target: &'a Institution) -> HashMap<&'a str, &'a str> {
        let mut map = HashMap::new();
        for (id, short, full) in &self.names {
            if id.as_str() == target.id.as_str() {
                continue;
            }
            map.insert(full.as_str(), target.full_name.as_str());
            map.insert(short.as_str(), target.short_name());
        }
        map
    }
}

impl TextRewriter for NameSwap {
    fn polish(&self, html: &str, target: &Institution, _model: &str) -> Result<String, PolishError> {
        let map = self.replacements(target);
        if map.is_empty() || html.is_empty() {
            return Ok(html.to_string());
        }

        let mut needles: Vec<&str> = map.keys().copied().collect();
        // Longest first so a full name wins over any name it contains.
        needles.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = needles
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\b(?:{alternation})\b"))?;

        Ok(pattern
            .replace_all(html, |caps: &regex::Captures| {
                let found = &caps[0];
                map.get(found).copied().unwrap_or(found).to_string()
            })
            .into_owned())
    }
}

/// Pipes HTML through an external program, such as a wrapper around a
/// hosted language model. The instructions and model name travel in
/// [`INSTRUCTIONS_ENV`] and [`MODEL_ENV`].
#[derive(Debug, Clone)]
pub struct CommandRewriter {
    program: String,
    args: Vec<String>,
    instructions: HashMap<String, String>,
}

impl CommandRewriter {
    pub fn new(registry: &PaletteRegistry, program: impl Into<String>, args: Vec<String>) -> Self {
        let instructions = registry
            .institutions()
            .iter()
            .map(|inst| (inst.id.to_string(), instructions_for(registry, inst)))
            .collect();
        Self {
            program: program.into(),
            args,
            instructions,
        }
    }
}

impl TextRewriter for CommandRewriter {
    fn polish(&self, html: &str, target: &Institution, model: &str) -> Result<String, PolishError> {
        if html.is_empty() {
            return Ok(String::new());
        }
        let instructions = self
            .instructions
            .get(target.id.as_str())
            .map(String::as_str)
            .unwrap_or_default();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(INSTRUCTIONS_ENV, instructions)
            .env(MODEL_ENV, model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PolishError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let writer = child.stdin.take().map(|mut stdin| {
            let input = html.to_string();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });
        let output = child
            .wait_with_output()
            .map_err(|source| PolishError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if let Some(writer) = writer {
            // A program that exits without reading stdin is judged by its output.
            let _ = writer.join();
        }

        if !output.status.success() {
            return Err(PolishError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let text = String::from_utf8(output.stdout).map_err(|_| PolishError::InvalidUtf8)?;
        let text = strip_code_fences(&text);
        if text.is_empty() {
            return Err(PolishError::EmptyResponse);
        }
        Ok(text)
    }
}
