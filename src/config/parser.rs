// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/config/parser.rs
//!
//! Remap rule file parser
//!
//! This module parses rule files into a [`Config`]. It handles:
//! - `remap FROM => TARGET, TARGET, ...` statements
//! - `window class_only|class_not = LIST { ... }` scope blocks
//! - `define NAME = "template"` named commands, called as `@NAME "arg"`
//! - Variable substitution (`$term`)
//! - Comments and whitespace
//! - Line numbers for error reporting
//!
//! # Architecture
//! The parser uses nom combinators for each statement kind. It performs
//! two-pass parsing:
//! 1. First pass: Collect variable and command definitions
//! 2. Second pass: Parse statements with variable substitution
//!
//! Any error aborts the whole load, so a half-valid rule set never exists.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map, opt, value},
    error::{Error as NomError, ErrorKind},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Parser,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::core::expression::{self, ExpressionError};
use crate::core::scope::{ClassPattern, Scope, WindowScope};
use crate::core::types::{Remap, Target};

/// Placeholder replaced by the call argument in `define` templates
pub const ARG_PLACEHOLDER: &str = "{arg}";

/// Parse errors with line number context
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Parse error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    #[error("Invalid key expression on line {line}: {source}")]
    InvalidExpression {
        line: usize,
        #[source]
        source: ExpressionError,
    },

    #[error("Undefined variable '${variable}' on line {line}")]
    UndefinedVariable { variable: String, line: usize },

    #[error("Undefined command '@{name}' on line {line}")]
    UndefinedCommand { name: String, line: usize },

    #[error("Invalid class pattern '{pattern}' on line {line}: {message}")]
    InvalidPattern {
        pattern: String,
        line: usize,
        message: String,
    },

    #[error("Window block on line {line} opened inside another window block")]
    NestedWindow { line: usize },

    #[error("Unexpected '}}' on line {line}")]
    UnexpectedClose { line: usize },

    #[error("Window block opened on line {line} is never closed")]
    UnclosedWindow { line: usize },
}

/// Which class list a window block fills
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassRule {
    Only,
    Not,
}

/// A target as written, before key expressions are resolved
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawTarget {
    Key(String),
    Press(String),
    Release(String),
    Exec(String),
    Call { name: String, arg: Option<String> },
}

/// One parsed line
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Statement {
    Remap { from: String, targets: Vec<RawTarget> },
    Define { name: String, template: String },
    WindowOpen { rule: ClassRule, classes: Vec<String> },
    WindowClose,
}

/// Parse a complete rule file
///
/// # Example
/// ```
/// use keyremap::config::parser::parse_config;
///
/// let config = parse_config("remap C-b => Left\n").unwrap();
/// assert_eq!(config.len(), 1);
/// ```
pub fn parse_config(content: &str) -> Result<Config, ParseError> {
    // First pass: Collect variable and command definitions
    let variables = collect_variables(content)?;
    let commands = collect_commands(content, &variables)?;

    // Second pass: Parse statements with variable substitution
    let mut config = Config::new();
    let mut open_block: Option<(usize, Scope)> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1; // Human-readable numbers start at 1

        let line_trimmed = line.trim();
        if line_trimmed.is_empty()
            || line_trimmed.starts_with('#')
            || line_trimmed.starts_with('$')
        {
            continue;
        }

        let substituted = substitute_variables(line_trimmed, &variables).map_err(|variable| {
            ParseError::UndefinedVariable {
                variable,
                line: line_num,
            }
        })?;

        let statement = parse_statement(&substituted).map_err(|e| ParseError::InvalidSyntax {
            line: line_num,
            message: describe_nom_error(&substituted, e),
        })?;

        match statement {
            Statement::Define { .. } => {} // collected in the first pass
            Statement::WindowOpen { rule, classes } => {
                if open_block.is_some() {
                    return Err(ParseError::NestedWindow { line: line_num });
                }
                let scope = build_scope(rule, &classes, line_num)?;
                open_block = Some((line_num, Scope::Window(scope)));
            }
            Statement::WindowClose => {
                if open_block.take().is_none() {
                    return Err(ParseError::UnexpectedClose { line: line_num });
                }
            }
            Statement::Remap { from, targets } => {
                let remap = build_remap(&from, &targets, &commands, line_num)?;
                let scope = open_block
                    .as_ref()
                    .map(|(_, scope)| scope.clone())
                    .unwrap_or(Scope::AnyWindow);
                debug!(line = line_num, %remap, %scope, "parsed remap");
                config.add_remap(scope, remap);
            }
        }
    }

    if let Some((line, _)) = open_block {
        return Err(ParseError::UnclosedWindow { line });
    }

    Ok(config)
}

/// Collect variable definitions from a rule file
///
/// Rule files use variables like:
/// ```text
/// $term = urxvt
/// ```
///
/// Names are limited to ASCII letters, digits and `_`, the characters a
/// `$name` reference can contain.
///
/// Returns a HashMap mapping variable names to their values
pub fn collect_variables(contents: &str) -> Result<HashMap<String, String>, ParseError> {
    let mut variables = HashMap::new();

    for (line_num, line) in contents.lines().enumerate() {
        let line_trimmed = line.trim();

        // Variable definition format: $name = value
        if line_trimmed.starts_with('$') {
            if let Some(equals_pos) = line_trimmed.find('=') {
                let var_name = line_trimmed[1..equals_pos].trim();
                if !is_variable_name(var_name) {
                    return Err(ParseError::InvalidSyntax {
                        line: line_num + 1,
                        message: format!(
                            "invalid variable name '${}' (use letters, digits and '_')",
                            var_name
                        ),
                    });
                }
                let var_value = line_trimmed[equals_pos + 1..].trim().to_string();
                variables.insert(var_name.to_string(), var_value);
            }
        }
    }

    Ok(variables)
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Collect `define` statements into the named-command table
fn collect_commands(
    contents: &str,
    variables: &HashMap<String, String>,
) -> Result<HashMap<String, String>, ParseError> {
    let mut commands = HashMap::new();

    for (line_num, line) in contents.lines().enumerate() {
        let line_num = line_num + 1;
        let line_trimmed = line.trim();
        if !line_trimmed.starts_with("define") {
            continue;
        }

        let substituted = substitute_variables(line_trimmed, variables).map_err(|variable| {
            ParseError::UndefinedVariable {
                variable,
                line: line_num,
            }
        })?;

        match parse_statement(&substituted) {
            Ok(Statement::Define { name, template }) => {
                commands.insert(name, template);
            }
            Ok(_) => {} // e.g. a key named "define..." in some other statement
            Err(e) => {
                return Err(ParseError::InvalidSyntax {
                    line: line_num,
                    message: describe_nom_error(&substituted, e),
                })
            }
        }
    }

    Ok(commands)
}

/// Substitute variables in a line
///
/// Replaces `$name` with its value. Text inside double quotes is left alone
/// so shell commands keep their own `$HOME` and `$(...)`. Returns the name
/// of the first undefined variable as the error.
pub fn substitute_variables(
    line: &str,
    variables: &HashMap<String, String>,
) -> Result<String, String> {
    let mut result = String::with_capacity(line.len());
    let mut chars = line.char_indices().peekable();
    let mut in_quotes = false;

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' if in_quotes => {
                result.push(c);
                if let Some((_, escaped)) = chars.next() {
                    result.push(escaped);
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                result.push(c);
            }
            '$' if !in_quotes => {
                let start = idx + 1;
                let mut end = start;
                while let Some(&(i, n)) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        end = i + n.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                if end == start {
                    result.push('$');
                    continue;
                }
                let name = &line[start..end];
                match variables.get(name) {
                    Some(value) => result.push_str(value),
                    None => return Err(name.to_string()),
                }
            }
            _ => result.push(c),
        }
    }

    Ok(result)
}

/// Parse one non-empty, non-comment line into a statement
pub fn parse_statement(input: &str) -> Result<Statement, nom::Err<NomError<&str>>> {
    let (_, statement) = all_consuming(delimited(
        space0,
        alt((
            parse_remap,
            parse_define,
            parse_window_open,
            value(Statement::WindowClose, char('}')),
        )),
        space0,
    ))
    .parse(input)?;
    Ok(statement)
}

/// Parse `remap FROM => TARGETS`
pub fn parse_remap(input: &str) -> IResult<&str, Statement> {
    let (input, _) = (tag("remap"), space1).parse(input)?;
    let (input, from) = key_token(input)?;
    let (input, _) = (space1, tag("=>"), space0).parse(input)?;
    let (input, targets) = parse_targets(input)?;

    Ok((
        input,
        Statement::Remap {
            from: from.to_string(),
            targets,
        },
    ))
}

/// Parse `define NAME = "template"`
pub fn parse_define(input: &str) -> IResult<&str, Statement> {
    let (input, _) = (tag("define"), space1).parse(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = (space0, char('='), space0).parse(input)?;
    let (input, template) = quoted_string(input)?;

    Ok((
        input,
        Statement::Define {
            name: name.to_string(),
            template,
        },
    ))
}

/// Parse `window class_only = a, b {` or `window class_not = a {`
///
/// The class list runs up to the final `{`, so regex entries may contain
/// braces of their own.
pub fn parse_window_open(input: &str) -> IResult<&str, Statement> {
    let (input, _) = (tag("window"), space1).parse(input)?;
    let (input, rule) = alt((
        value(ClassRule::Only, tag("class_only")),
        value(ClassRule::Not, tag("class_not")),
    ))
    .parse(input)?;
    let (input, _) = (space0, char('='), space0).parse(input)?;

    let trimmed = input.trim_end();
    let list = trimmed
        .strip_suffix('{')
        .ok_or_else(|| nom::Err::Error(NomError::new(input, ErrorKind::Char)))?;

    let classes = split_class_list(list);
    if classes.is_empty() {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::SeparatedList)));
    }

    Ok(("", Statement::WindowOpen { rule, classes }))
}

/// Parse a comma-separated target list
pub fn parse_targets(input: &str) -> IResult<&str, Vec<RawTarget>> {
    separated_list1((space0, char(','), space0), parse_target).parse(input)
}

/// Parse one target
///
/// Formats supported:
/// - `Left`, `C-x` (full key input)
/// - `press Shift_L`, `release Shift_L`
/// - `exec "command"`
/// - `@name` or `@name "arg"`
pub fn parse_target(input: &str) -> IResult<&str, RawTarget> {
    alt((
        map(preceded((tag("exec"), space1), quoted_string), RawTarget::Exec),
        map(preceded((tag("press"), space1), key_token), |k| {
            RawTarget::Press(k.to_string())
        }),
        map(preceded((tag("release"), space1), key_token), |k| {
            RawTarget::Release(k.to_string())
        }),
        map(
            (
                preceded(char('@'), identifier),
                opt(preceded(space1, quoted_string)),
            ),
            |(name, arg)| RawTarget::Call {
                name: name.to_string(),
                arg,
            },
        ),
        map(key_token, |k| RawTarget::Key(k.to_string())),
    ))
    .parse(input)
}

/// A key expression token: everything up to whitespace or a comma
fn key_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ',')(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

/// A double-quoted string with `\"`, `\\` and `\n` escapes
pub fn quoted_string(input: &str) -> IResult<&str, String> {
    let (rest, _) = char('"')(input)?;
    let mut result = String::new();
    let mut chars = rest.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Ok((&rest[idx + 1..], result)),
            '\\' => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, other)) => result.push(other),
                None => break,
            },
            _ => result.push(c),
        }
    }

    Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)))
}

/// Split a class list on commas that are outside `/regex/` and quotes
pub fn split_class_list(input: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_regex = false;
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '/' if !in_quotes && (in_regex || current.trim().is_empty()) => {
                in_regex = !in_regex;
                current.push(c);
            }
            '"' if !in_regex => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_regex && !in_quotes => {
                items.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    items.push(current.trim().to_string());

    items.into_iter().filter(|item| !item.is_empty()).collect()
}

fn build_scope(
    rule: ClassRule,
    classes: &[String],
    line: usize,
) -> Result<WindowScope, ParseError> {
    let patterns = classes
        .iter()
        .map(|raw| build_pattern(raw, line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match rule {
        ClassRule::Only => WindowScope {
            class_only: patterns,
            class_not: Vec::new(),
        },
        ClassRule::Not => WindowScope {
            class_only: Vec::new(),
            class_not: patterns,
        },
    })
}

fn build_pattern(raw: &str, line: usize) -> Result<ClassPattern, ParseError> {
    if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
        let pattern = &raw[1..raw.len() - 1];
        return ClassPattern::regex(pattern).map_err(|e| ParseError::InvalidPattern {
            pattern: raw.to_string(),
            line,
            message: e.to_string(),
        });
    }

    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Ok(ClassPattern::exact(&raw[1..raw.len() - 1]));
    }

    Ok(ClassPattern::exact(raw))
}

fn build_remap(
    from: &str,
    targets: &[RawTarget],
    commands: &HashMap<String, String>,
    line: usize,
) -> Result<Remap, ParseError> {
    let stroke = |expr: &str| {
        expression::parse(expr).map_err(|source| ParseError::InvalidExpression { line, source })
    };

    let to = targets
        .iter()
        .map(|target| match target {
            RawTarget::Key(expr) => stroke(expr).map(Target::Input),
            RawTarget::Press(expr) => stroke(expr).map(Target::Press),
            RawTarget::Release(expr) => stroke(expr).map(Target::Release),
            RawTarget::Exec(command) => Ok(Target::Execute(command.clone())),
            RawTarget::Call { name, arg } => commands
                .get(name)
                .map(|template| {
                    Target::Execute(template.replace(ARG_PLACEHOLDER, arg.as_deref().unwrap_or("")))
                })
                .ok_or_else(|| ParseError::UndefinedCommand {
                    name: name.clone(),
                    line,
                }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Remap {
        from: stroke(from)?,
        to,
    })
}

fn describe_nom_error(line: &str, error: nom::Err<NomError<&str>>) -> String {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let column = line.len() - e.input.len() + 1;
            if e.input.is_empty() {
                format!("unexpected end of line (column {})", column)
            } else {
                format!("unexpected input at column {}: '{}'", column, e.input)
            }
        }
        nom::Err::Incomplete(_) => "incomplete statement".to_string(),
    }
}
