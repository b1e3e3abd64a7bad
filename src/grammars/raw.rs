use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::ConvertResult;
use crate::grammars::common::Reference;

/// Capture groups of a rule, keyed by group index as text (`"0"`, `"1"`, ...).
///
/// Only the `name` of each captured rule is used by the converter.
///
/// # Examples
/// ```json
/// {
///   "1": { "name": "entity.name.function.js" },
///   "2": { "name": "punctuation.definition.parameters.begin.js" }
/// }
/// ```
pub type Captures = BTreeMap<String, RawRule>;

/// A single rule of a TextMate grammar, exactly as found in the JSON file.
///
/// Every field is optional here: which kind of rule this is gets decided by
/// [`RawRule::pattern`]. An empty string is treated the same as a missing field.
///
/// # Examples
/// ```json
/// {
///   "name": "string.quoted.double.js",
///   "begin": "\"",
///   "end": "\"",
///   "beginCaptures": {
///     "0": { "name": "punctuation.definition.string.begin.js" }
///   },
///   "patterns": [
///     { "match": "\\\\.", "name": "constant.character.escape.js" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all(deserialize = "camelCase"))]
pub struct RawRule {
    /// Scope of the whole match for match rules, of the whole block for begin/end rules
    pub name: Option<String>,
    /// Scope of the inside of a begin/end block, without the delimiters
    pub content_name: Option<String>,
    #[serde(rename(deserialize = "match"))]
    pub match_: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    /// Only used to recognise `begin`/`while` rules, which have no end
    #[serde(rename(deserialize = "while"))]
    pub while_: Option<String>,
    /// Fallback for both sides when begin/end captures are not given
    pub captures: Captures,
    pub begin_captures: Captures,
    pub end_captures: Captures,
    pub patterns: Vec<RawRule>,
    /// - "#name": repository entry of this grammar
    /// - "source.lang": another grammar
    /// - "source.lang#name": repository entry of another grammar
    /// - "$self" / "$base"
    pub include: Option<String>,
    /// Grammars write either `true` or `1`
    #[serde(deserialize_with = "bool_or_int")]
    pub apply_end_pattern_last: bool,
}

fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
    }

    Ok(match BoolOrInt::deserialize(deserializer)? {
        BoolOrInt::Bool(b) => b,
        BoolOrInt::Int(i) => i != 0,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A begin/end rule, borrowed from its [`RawRule`].
#[derive(Debug, Clone, Copy)]
pub struct BeginEnd<'r> {
    pub name: Option<&'r str>,
    pub content_name: Option<&'r str>,
    pub begin: &'r str,
    /// `None` for rules that have no end, like `begin`/`while` rules
    pub end: Option<&'r str>,
    pub captures: &'r Captures,
    pub begin_captures: &'r Captures,
    pub end_captures: &'r Captures,
    pub patterns: &'r [RawRule],
    pub apply_end_pattern_last: bool,
}

/// A single line match rule, borrowed from its [`RawRule`].
#[derive(Debug, Clone, Copy)]
pub struct MatchRule<'r> {
    pub name: Option<&'r str>,
    pub pattern: &'r str,
    pub captures: &'r Captures,
}

/// The kinds of rule the converter knows about.
#[derive(Debug, Clone, Copy)]
pub enum Pattern<'r> {
    BeginEnd(BeginEnd<'r>),
    Match(MatchRule<'r>),
    Include(Reference<'r>),
}

impl RawRule {
    /// Decides what kind of rule this is.
    ///
    /// If several of `begin`, `match` and `include` are set, the first one in
    /// that order wins. Returns `None` if none of them are set.
    pub fn pattern(&self) -> Option<Pattern<'_>> {
        if let Some(begin) = non_empty(&self.begin) {
            Some(Pattern::BeginEnd(BeginEnd {
                name: non_empty(&self.name),
                content_name: non_empty(&self.content_name),
                begin,
                end: non_empty(&self.end),
                captures: &self.captures,
                begin_captures: &self.begin_captures,
                end_captures: &self.end_captures,
                patterns: &self.patterns,
                apply_end_pattern_last: self.apply_end_pattern_last,
            }))
        } else if let Some(pattern) = non_empty(&self.match_) {
            Some(Pattern::Match(MatchRule {
                name: non_empty(&self.name),
                pattern,
                captures: &self.captures,
            }))
        } else {
            non_empty(&self.include).map(|include| Pattern::Include(include.into()))
        }
    }

    /// The scope name of a rule used as a capture, if it has one
    pub fn capture_name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    /// A rule that only groups other patterns, like `{"patterns": [...]}`.
    pub fn is_container(&self) -> bool {
        self.pattern().is_none() && !self.patterns.is_empty()
    }

    /// How many begin/end rules are nested in this rule, itself included.
    pub fn nesting_depth(&self) -> usize {
        let children = self
            .patterns
            .iter()
            .map(RawRule::nesting_depth)
            .max()
            .unwrap_or(0);
        match self.pattern() {
            Some(Pattern::BeginEnd(_)) => children + 1,
            _ => children,
        }
    }
}

/// The different ways a repository entry can be written.
///
/// # Examples
/// ```json
/// {
///   "keywords": [
///     { "match": "\\bif\\b", "name": "keyword.control.if.js" }
///   ],
///   "expressions": {
///     "patterns": [
///       { "include": "#literals" }
///     ]
///   },
///   "string": { "name": "string.quoted.double.js", "begin": "\"", "end": "\"" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    /// Direct array of patterns (like `"keywords": [...]`)
    DirectArray(Vec<RawRule>),
    /// A single rule, which can also be a `{"patterns": [...]}` container
    Rule(RawRule),
}

impl RepositoryEntry {
    /// The pattern list this entry contributes to the repository index.
    ///
    /// Arrays and containers give their patterns, any other rule is a list of one.
    pub fn patterns(&self) -> &[RawRule] {
        match self {
            RepositoryEntry::DirectArray(rules) => rules,
            RepositoryEntry::Rule(rule) if rule.is_container() => &rule.patterns,
            RepositoryEntry::Rule(rule) => std::slice::from_ref(rule),
        }
    }
}

/// Top-level structure of a TextMate grammar
///
/// # Examples
/// ```json
/// {
///   "name": "JavaScript",
///   "scopeName": "source.js",
///   "fileTypes": ["js", "mjs"],
///   "firstLineMatch": "^#!.*\\bnode\\b",
///   "patterns": [
///     { "include": "#statements" }
///   ],
///   "repository": {
///     "statements": {
///       "patterns": [
///         { "include": "#keywords" }
///       ]
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all(deserialize = "camelCase"))]
pub struct RawGrammar {
    /// Human-readable name of the language
    pub name: String,
    /// Example: "source.js", "text.html.markdown"
    pub scope_name: String,
    pub comment: Option<String>,
    /// File extensions this grammar applies to
    pub file_types: Vec<String>,
    pub first_line_match: Option<String>,
    pub hide_from_user: bool,
    pub hidden: bool,
    /// Root patterns, compiled into the `main` context
    pub patterns: Vec<RawRule>,
    pub repository: BTreeMap<String, RepositoryEntry>,
}

impl RawGrammar {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConvertResult<Self> {
        let file = File::open(&path)?;
        let raw_grammar = serde_json::from_reader(BufReader::new(file))?;
        Ok(raw_grammar)
    }

    pub fn from_json_str(json: &str) -> ConvertResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The deepest begin/end nesting found in the root patterns or the repository.
    ///
    /// The converter recurses once per level and has no limit of its own,
    /// callers converting untrusted grammars should check this first.
    pub fn nesting_depth(&self) -> usize {
        self.patterns
            .iter()
            .chain(self.repository.values().flat_map(|e| e.patterns()))
            .map(RawRule::nesting_depth)
            .max()
            .unwrap_or(0)
    }
}
