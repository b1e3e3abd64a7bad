use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::ConvertResult;

/// Scopes of capture groups, keyed by group index
pub type CaptureScopes = BTreeMap<u32, String>;

/// A named, ordered list of entries: one place the highlighter can be in.
/// Entries are tried in order, first match wins.
pub type Context = Vec<Entry>;

/// One rule of a sublime-syntax context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Matches on a single line
    Match {
        pattern: String,
        scope: Option<String>,
        captures: CaptureScopes,
    },
    /// Matches and enters the owned context
    Push {
        pattern: String,
        scope: Option<String>,
        captures: CaptureScopes,
        push: Context,
    },
    /// Matches and leaves the current context
    Pop {
        pattern: String,
        scope: Option<String>,
        captures: CaptureScopes,
    },
    /// Pulls in the entries of another context, by name or `scope:` address
    Include(String),
    /// Scope of a whole pushed context, delimiters included
    MetaScope(String),
    /// Scope of the inside of a pushed context
    MetaContentScope(String),
}

impl Serialize for Entry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Entry::Match {
                pattern,
                scope,
                captures,
            }
            | Entry::Pop {
                pattern,
                scope,
                captures,
            }
            | Entry::Push {
                pattern,
                scope,
                captures,
                ..
            } => {
                map.serialize_entry("match", pattern)?;
                if let Some(scope) = scope {
                    map.serialize_entry("scope", scope)?;
                }
                if !captures.is_empty() {
                    map.serialize_entry("captures", captures)?;
                }
                match self {
                    Entry::Push { push, .. } => map.serialize_entry("push", push)?,
                    Entry::Pop { .. } => map.serialize_entry("pop", &true)?,
                    _ => {}
                }
            }
            Entry::Include(target) => map.serialize_entry("include", target)?,
            Entry::MetaScope(scope) => map.serialize_entry("meta_scope", scope)?,
            Entry::MetaContentScope(scope) => map.serialize_entry("meta_content_scope", scope)?,
        }
        map.end()
    }
}

/// A converted grammar in the sublime-syntax model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Syntax {
    pub name: String,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_line_match: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    /// Always has a `main` context
    pub contexts: BTreeMap<String, Context>,
}

impl Syntax {
    pub fn to_json(&self) -> ConvertResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the syntax as a `.sublime-syntax` file.
    pub fn to_yaml(&self) -> ConvertResult<String> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("%YAML 1.2\n---\n{body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::MAIN_CONTEXT;

    fn quoted_string_syntax() -> Syntax {
        let mut contexts = BTreeMap::new();
        contexts.insert(
            MAIN_CONTEXT.to_string(),
            vec![
                Entry::Push {
                    pattern: "\"".to_string(),
                    scope: None,
                    captures: CaptureScopes::new(),
                    push: vec![
                        Entry::MetaScope("string.quoted.double".to_string()),
                        Entry::Pop {
                            pattern: "\"".to_string(),
                            scope: None,
                            captures: CaptureScopes::new(),
                        },
                    ],
                },
                Entry::Match {
                    pattern: r"\b(if)\b".to_string(),
                    scope: Some("keyword.control".to_string()),
                    captures: CaptureScopes::from([(1, "keyword.if".to_string())]),
                },
                Entry::Include("scope:source.js".to_string()),
            ],
        );
        Syntax {
            name: "Test".to_string(),
            scope: "source.test".to_string(),
            contexts,
            ..Default::default()
        }
    }

    #[test]
    fn can_serialize_entries_to_json() {
        let out = quoted_string_syntax().to_json().unwrap();
        insta::assert_snapshot!(out, @r#"
        {
          "name": "Test",
          "scope": "source.test",
          "contexts": {
            "main": [
              {
                "match": "\"",
                "push": [
                  {
                    "meta_scope": "string.quoted.double"
                  },
                  {
                    "match": "\"",
                    "pop": true
                  }
                ]
              },
              {
                "match": "\\b(if)\\b",
                "scope": "keyword.control",
                "captures": {
                  "1": "keyword.if"
                }
              },
              {
                "include": "scope:source.js"
              }
            ]
          }
        }
        "#);
    }

    #[test]
    fn skips_absent_metadata() {
        let mut syntax = quoted_string_syntax();
        let out = syntax.to_json().unwrap();
        assert!(!out.contains("hidden"));
        assert!(!out.contains("file_extensions"));

        syntax.hidden = true;
        syntax.file_extensions = vec!["tst".to_string()];
        let out = syntax.to_json().unwrap();
        assert!(out.contains(r#""hidden": true"#));
        assert!(out.contains(r#""file_extensions": ["#));
    }

    #[test]
    fn can_render_sublime_syntax_yaml() {
        let out = quoted_string_syntax().to_yaml().unwrap();
        assert!(out.starts_with("%YAML 1.2\n---\n"));
        assert!(out.contains("name: Test\n"));
        assert!(out.contains("scope: source.test\n"));
        assert!(out.contains("meta_scope: string.quoted.double"));
        assert!(out.contains("pop: true"));
    }
}
