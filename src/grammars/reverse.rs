use std::collections::BTreeMap;

use crate::grammars::common::{MAIN_CONTEXT, reference_for_context};
use crate::grammars::raw::{Captures, RawGrammar, RawRule, RepositoryEntry};
use crate::grammars::sublime::{CaptureScopes, Entry, Syntax};

impl Syntax {
    /// Rebuilds a TextMate grammar that converts back into this syntax.
    ///
    /// Every context other than `main` becomes a `{"patterns": [...]}` repository entry.
    /// Meta scopes and pop entries only have a TextMate equivalent inside a pushed
    /// context: anywhere else they are dropped.
    pub fn to_raw_grammar(&self) -> RawGrammar {
        let repository = self
            .contexts
            .iter()
            .filter(|(name, _)| name.as_str() != MAIN_CONTEXT)
            .map(|(name, ctx)| {
                let container = RawRule {
                    patterns: raw_rules(ctx),
                    ..Default::default()
                };
                (name.clone(), RepositoryEntry::Rule(container))
            })
            .collect::<BTreeMap<_, _>>();

        RawGrammar {
            name: self.name.clone(),
            scope_name: self.scope.clone(),
            comment: self.comment.clone(),
            file_types: self.file_extensions.clone(),
            first_line_match: self.first_line_match.clone(),
            hidden: self.hidden,
            patterns: self
                .contexts
                .get(MAIN_CONTEXT)
                .map(|ctx| raw_rules(ctx))
                .unwrap_or_default(),
            repository,
            ..Default::default()
        }
    }
}

fn raw_rules(entries: &[Entry]) -> Vec<RawRule> {
    entries.iter().filter_map(raw_rule).collect()
}

fn raw_rule(entry: &Entry) -> Option<RawRule> {
    match entry {
        Entry::Match {
            pattern,
            scope,
            captures,
        } => Some(RawRule {
            match_: Some(pattern.clone()),
            name: scope.clone(),
            captures: raw_captures(None, captures),
            ..Default::default()
        }),
        Entry::Push {
            pattern,
            scope,
            captures,
            push,
        } => Some(raw_begin_end(pattern, scope.as_deref(), captures, push)),
        Entry::Include(target) => Some(RawRule {
            include: Some(reference_for_context(target).to_include()),
            ..Default::default()
        }),
        Entry::Pop { .. } | Entry::MetaScope(_) | Entry::MetaContentScope(_) => None,
    }
}

fn raw_begin_end(
    pattern: &str,
    scope: Option<&str>,
    captures: &CaptureScopes,
    mut body: &[Entry],
) -> RawRule {
    let mut rule = RawRule {
        begin: Some(pattern.to_string()),
        begin_captures: raw_captures(scope, captures),
        ..Default::default()
    };

    if let [Entry::MetaScope(name), rest @ ..] = body {
        rule.name = Some(name.clone());
        body = rest;
    }
    if let [Entry::MetaContentScope(content_name), rest @ ..] = body {
        rule.content_name = Some(content_name.clone());
        body = rest;
    }

    // a lone pop entry is read as "end first", both orders compile to the same body
    let (end, children) = match body {
        [end @ Entry::Pop { .. }, children @ ..] => (Some(end), children),
        [children @ .., end @ Entry::Pop { .. }] => {
            rule.apply_end_pattern_last = true;
            (Some(end), children)
        }
        children => (None, children),
    };

    if let Some(Entry::Pop {
        pattern,
        scope,
        captures,
    }) = end
    {
        rule.end = Some(pattern.clone());
        rule.end_captures = raw_captures(scope.as_deref(), captures);
    }
    rule.patterns = raw_rules(children);

    rule
}

/// The entry scope goes back to being capture group 0.
fn raw_captures(scope: Option<&str>, captures: &CaptureScopes) -> Captures {
    scope
        .map(|s| (0, s))
        .into_iter()
        .chain(captures.iter().map(|(index, name)| (*index, name.as_str())))
        .map(|(index, name)| {
            let capture = RawRule {
                name: Some(name.to_string()),
                ..Default::default()
            };
            (index.to_string(), capture)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::compiler::convert;

    const GRAMMAR: &str = include_str!("../fixtures/mini.tmLanguage.json");

    #[test]
    fn converting_twice_gives_the_same_syntax() {
        let raw = RawGrammar::from_json_str(GRAMMAR).unwrap();
        let first = convert(&raw);
        assert!(first.diagnostics.is_empty(), "{:?}", first.diagnostics);

        let second = convert(&first.syntax.to_raw_grammar());
        assert!(second.diagnostics.is_empty(), "{:?}", second.diagnostics);
        assert_eq!(first.syntax, second.syntax);
    }

    #[test]
    fn can_rebuild_a_begin_end_rule() {
        let body = vec![
            Entry::MetaScope("string.quoted".to_string()),
            Entry::MetaContentScope("string.content".to_string()),
            Entry::Match {
                pattern: r"\\.".to_string(),
                scope: Some("constant.character.escape".to_string()),
                captures: CaptureScopes::new(),
            },
            Entry::Pop {
                pattern: "'".to_string(),
                scope: Some("punctuation.end".to_string()),
                captures: CaptureScopes::new(),
            },
        ];
        let rule = raw_rule(&Entry::Push {
            pattern: "'".to_string(),
            scope: None,
            captures: CaptureScopes::from([(1, "punctuation.begin".to_string())]),
            push: body,
        })
        .unwrap();

        assert_eq!(rule.begin.as_deref(), Some("'"));
        assert_eq!(rule.end.as_deref(), Some("'"));
        assert_eq!(rule.name.as_deref(), Some("string.quoted"));
        assert_eq!(rule.content_name.as_deref(), Some("string.content"));
        assert!(rule.apply_end_pattern_last);
        assert_eq!(rule.patterns.len(), 1);
        assert_eq!(
            rule.begin_captures["1"].name.as_deref(),
            Some("punctuation.begin")
        );
        assert_eq!(
            rule.end_captures["0"].name.as_deref(),
            Some("punctuation.end")
        );
    }

    #[test]
    fn can_rebuild_includes() {
        let includes: Vec<_> = ["main", "$top_level_main", "strings", "scope:source.js#expr"]
            .into_iter()
            .map(|target| {
                raw_rule(&Entry::Include(target.to_string()))
                    .and_then(|r| r.include)
                    .unwrap()
            })
            .collect();
        assert_eq!(includes, vec!["$self", "$base", "#strings", "source.js#expr"]);
    }
}
