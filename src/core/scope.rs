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

//! src/core/scope.rs
//!
//! Window scopes and class-based resolution
//!
//! A `WindowScope` restricts a group of remaps to windows whose class is in
//! `class_only`, or not in `class_not`. A scope with both lists empty is
//! inert. The `Scope::AnyWindow` sentinel bypasses resolution entirely and
//! always applies.

use regex::Regex;
use std::fmt;

/// One entry of a class list
///
/// Plain entries compare exactly. Entries written `/pattern/` in the config
/// are regular expressions.
#[derive(Clone, Debug)]
pub enum ClassPattern {
    Exact(String),
    Regex(Regex),
}

impl ClassPattern {
    pub fn exact(class: impl Into<String>) -> Self {
        ClassPattern::Exact(class.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(ClassPattern::Regex)
    }

    pub fn matches(&self, class: &str) -> bool {
        match self {
            ClassPattern::Exact(expected) => expected == class,
            ClassPattern::Regex(re) => re.is_match(class),
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, ClassPattern::Regex(_))
    }
}

impl PartialEq for ClassPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ClassPattern::Exact(a), ClassPattern::Exact(b)) => a == b,
            (ClassPattern::Regex(a), ClassPattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for ClassPattern {}

impl fmt::Display for ClassPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassPattern::Exact(class) => write!(f, "{}", class),
            ClassPattern::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Class-based window restriction
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WindowScope {
    pub class_only: Vec<ClassPattern>,
    pub class_not: Vec<ClassPattern>,
}

impl WindowScope {
    pub fn only<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class_only: classes.into_iter().map(ClassPattern::exact).collect(),
            class_not: Vec::new(),
        }
    }

    pub fn not<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class_only: Vec::new(),
            class_not: classes.into_iter().map(ClassPattern::exact).collect(),
        }
    }

    /// Whether this scope applies to a window of the given class
    ///
    /// `class_only` wins over `class_not` when both are set.
    pub fn matches(&self, window_class: &str) -> bool {
        if !self.class_only.is_empty() {
            self.class_only.iter().any(|p| p.matches(window_class))
        } else if !self.class_not.is_empty() {
            !self.class_not.iter().any(|p| p.matches(window_class))
        } else {
            false
        }
    }

    pub fn is_inert(&self) -> bool {
        self.class_only.is_empty() && self.class_not.is_empty()
    }
}

impl fmt::Display for WindowScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |patterns: &[ClassPattern]| {
            patterns
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        if !self.class_only.is_empty() {
            write!(f, "class_only = {}", join(&self.class_only))
        } else if !self.class_not.is_empty() {
            write!(f, "class_not = {}", join(&self.class_not))
        } else {
            write!(f, "(inert)")
        }
    }
}

/// Key of a rule group: the universal sentinel or a class-restricted scope
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scope {
    AnyWindow,
    Window(WindowScope),
}

impl Scope {
    /// Whether some window class could activate both scopes at once
    ///
    /// Regex entries are treated as able to match anything, so the answer
    /// errs toward reporting an overlap.
    pub fn may_overlap(&self, other: &Scope) -> bool {
        let (a, b) = match (self, other) {
            (Scope::AnyWindow, _) | (_, Scope::AnyWindow) => return true,
            (Scope::Window(a), Scope::Window(b)) => (a, b),
        };

        if a.is_inert() || b.is_inert() {
            return false;
        }
        if a == b {
            return true;
        }

        match (a.class_only.is_empty(), b.class_only.is_empty()) {
            // Both restricted to lists: need a shared class
            (false, false) => a.class_only.iter().any(|pa| {
                pa.is_regex()
                    || b.class_only.iter().any(|pb| pb.is_regex() || pa == pb)
            }),
            // One list against an exclusion: some listed class must survive it
            (false, true) => only_survives_not(&a.class_only, &b.class_not),
            (true, false) => only_survives_not(&b.class_only, &a.class_not),
            // Two exclusion lists always leave some class in common
            (true, true) => true,
        }
    }
}

fn only_survives_not(only: &[ClassPattern], not: &[ClassPattern]) -> bool {
    only.iter().any(|p| match p {
        ClassPattern::Regex(_) => true,
        ClassPattern::Exact(class) => !not.iter().any(|n| n.matches(class)),
    })
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::AnyWindow => write!(f, "any window"),
            Scope::Window(scope) => write!(f, "window {}", scope),
        }
    }
}

/// Returns every scope that matches `window_class`
///
/// The AnyWindow sentinel is not part of this resolution; callers include its
/// rules unconditionally. An empty class string is an ordinary value.
pub fn resolve<'a, I>(scopes: I, window_class: &str) -> Vec<&'a WindowScope>
where
    I: IntoIterator<Item = &'a WindowScope>,
{
    scopes
        .into_iter()
        .filter(|scope| scope.matches(window_class))
        .collect()
}
