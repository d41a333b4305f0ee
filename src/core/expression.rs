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

//! src/core/expression.rs
//!
//! Key expression parser
//!
//! Turns a symbolic key description such as `C-M-Left` into a [`KeyStroke`].
//! The grammar is a run of modifier prefixes, each followed by `-`, and then
//! one base key token:
//! - `C` / `Ctrl` → Control
//! - `M` / `Alt` → Mod1
//! - `Shift` → Shift
//! - `Super` / `Win` → Mod4
//!
//! The base key resolves against the keysym table: `XF86XK_*` names verbatim,
//! single characters case-insensitively, everything else case-sensitively.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::value,
    multi::many0,
    sequence::terminated,
    IResult, Parser,
};
use thiserror::Error;

use crate::core::keysym::{self, EXTENDED_PREFIX};
use crate::core::types::{KeyStroke, Keysym, Modifier, ModifierMask};

/// Errors raised for malformed key expressions
#[derive(Debug, Error, PartialEq)]
pub enum ExpressionError {
    #[error("Empty key expression")]
    Empty,

    #[error("Missing base key in expression '{0}'")]
    MissingKey(String),

    #[error("Unknown key '{key}' in expression '{expression}'")]
    UnknownKey { key: String, expression: String },
}

/// Parses a key expression into a stroke
///
/// # Example
/// ```
/// use keyremap::core::expression::parse;
/// use keyremap::core::ModifierMask;
///
/// let stroke = parse("C-M-Left").unwrap();
/// assert_eq!(stroke.modifiers, ModifierMask::CONTROL | ModifierMask::MOD1);
/// assert_eq!(stroke, parse("M-C-Left").unwrap());
/// ```
pub fn parse(expression: &str) -> Result<KeyStroke, ExpressionError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let (base, modifiers) = split_modifiers(expression)
        .map_err(|_| ExpressionError::MissingKey(expression.to_string()))?;

    if base.is_empty() {
        return Err(ExpressionError::MissingKey(expression.to_string()));
    }

    let keysym = resolve_base(base).ok_or_else(|| ExpressionError::UnknownKey {
        key: base.to_string(),
        expression: expression.to_string(),
    })?;

    Ok(KeyStroke::new(keysym, ModifierMask::from_modifiers(modifiers)))
}

/// Strips every leading `MOD-` prefix, returning the rest and the modifiers
///
/// A token only counts as a modifier when the separator follows it, so bare
/// `C` or `Caps_Lock` stay base keys.
pub fn split_modifiers(input: &str) -> IResult<&str, Vec<Modifier>> {
    many0(terminated(modifier_token, char('-'))).parse(input)
}

/// One modifier alias. Longer aliases are tried first so `Ctrl` is never
/// read as `C` followed by `trl`.
pub fn modifier_token(input: &str) -> IResult<&str, Modifier> {
    alt((
        value(Modifier::Ctrl, tag("Ctrl")),
        value(Modifier::Ctrl, tag("C")),
        value(Modifier::Alt, tag("Alt")),
        value(Modifier::Alt, tag("M")),
        value(Modifier::Shift, tag("Shift")),
        value(Modifier::Super, tag("Super")),
        value(Modifier::Super, tag("Win")),
    ))
    .parse(input)
}

fn resolve_base(token: &str) -> Option<Keysym> {
    if token.starts_with(EXTENDED_PREFIX) {
        return keysym::lookup(token);
    }

    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => keysym::lookup_char(c),
        _ => keysym::lookup(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_stops_at_base_key() {
        let (rest, mods) = split_modifiers("C-Shift-Caps_Lock").unwrap();
        assert_eq!(rest, "Caps_Lock");
        assert_eq!(mods, vec![Modifier::Ctrl, Modifier::Shift]);
    }

    #[test]
    fn test_modifier_without_separator_is_base() {
        let (rest, mods) = split_modifiers("C").unwrap();
        assert_eq!(rest, "C");
        assert!(mods.is_empty());
    }
}
