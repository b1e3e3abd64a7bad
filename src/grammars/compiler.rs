use std::collections::BTreeMap;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::grammars::common::{BASE_CONTEXT, MAIN_CONTEXT, Reference, external_syntax};
use crate::grammars::raw::{BeginEnd, Captures, MatchRule, Pattern, RawGrammar, RawRule};
use crate::grammars::sublime::{CaptureScopes, Context, Entry, Syntax};

/// Named pattern lists of a grammar, referenced by local includes.
#[derive(Debug, Clone, Default)]
pub struct Repository<'g>(BTreeMap<&'g str, &'g [RawRule]>);

impl<'g> Repository<'g> {
    pub fn from_raw_grammar(raw: &'g RawGrammar) -> Self {
        Self(
            raw.repository
                .iter()
                .map(|(name, entry)| (name.as_str(), entry.patterns()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&'g [RawRule]> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'g str, &'g [RawRule])> + '_ {
        self.0.iter().map(|(name, rules)| (*name, *rules))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of [`convert`]: the syntax and everything that went wrong on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub syntax: Syntax,
    pub diagnostics: Vec<Diagnostic>,
}

/// Converts a whole grammar, collecting diagnostics.
pub fn convert(raw: &RawGrammar) -> Conversion {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let syntax = convert_with(raw, &mut diagnostics);
    Conversion {
        syntax,
        diagnostics,
    }
}

/// Converts a whole grammar: the root patterns become `main` and every
/// repository entry becomes a context of the same name.
///
/// Never fails, a malformed grammar only produces diagnostics.
pub fn convert_with(raw: &RawGrammar, sink: &mut impl DiagnosticSink) -> Syntax {
    let repo = Repository::from_raw_grammar(raw);

    let mut contexts = BTreeMap::new();
    contexts.insert(
        MAIN_CONTEXT.to_string(),
        make_context(&raw.patterns, &repo, sink),
    );
    for (name, patterns) in repo.iter() {
        log::debug!("[convert] Compiling repository entry {name}");
        contexts.insert(name.to_string(), make_context(patterns, &repo, sink));
    }

    Syntax {
        name: raw.name.clone(),
        scope: raw.scope_name.clone(),
        comment: raw.comment.clone().filter(|c| !c.is_empty()),
        file_extensions: raw.file_types.clone(),
        first_line_match: raw.first_line_match.clone().filter(|m| !m.is_empty()),
        hidden: raw.hide_from_user || raw.hidden,
        contexts,
    }
}

/// Compiles a list of rules into a context, keeping their order.
pub fn make_context(
    patterns: &[RawRule],
    repo: &Repository<'_>,
    sink: &mut impl DiagnosticSink,
) -> Context {
    let mut ctx = Context::with_capacity(patterns.len());

    for rule in patterns {
        match rule.pattern() {
            Some(Pattern::BeginEnd(begin_end)) => {
                ctx.push(compile_begin_end(begin_end, repo, sink));
            }
            Some(Pattern::Match(match_rule)) => ctx.push(compile_match(match_rule, sink)),
            Some(Pattern::Include(reference)) => {
                if let Some(entry) = compile_include(reference, repo, sink) {
                    ctx.push(entry);
                }
            }
            None => sink.report(Diagnostic::UnrecognizedRuleShape),
        }
    }

    ctx
}

fn compile_begin_end(
    rule: BeginEnd<'_>,
    repo: &Repository<'_>,
    sink: &mut impl DiagnosticSink,
) -> Entry {
    // the shared captures are only formatted once, even if both sides fall back on them
    let shared = if !rule.captures.is_empty()
        && (rule.begin_captures.is_empty() || rule.end_captures.is_empty())
    {
        format_captures(rule.captures, sink)
    } else {
        CaptureScopes::new()
    };
    let begin_captures = if rule.begin_captures.is_empty() {
        shared.clone()
    } else {
        format_captures(rule.begin_captures, sink)
    };
    let end_captures = if rule.end_captures.is_empty() {
        shared
    } else {
        format_captures(rule.end_captures, sink)
    };

    let (begin_scope, begin_captures) = split_root_capture(begin_captures);
    let (end_scope, end_captures) = split_root_capture(end_captures);

    let end = match rule.end {
        Some(end) => end,
        None => {
            sink.report(Diagnostic::MissingEndPattern {
                begin: rule.begin.to_string(),
            });
            ""
        }
    };
    if end.contains("\\G") {
        sink.report(Diagnostic::InvalidEndAnchor {
            pattern: end.to_string(),
        });
    }
    let end_entry = Entry::Pop {
        pattern: end.to_string(),
        scope: end_scope,
        captures: end_captures,
    };

    let children = make_context(rule.patterns, repo, sink);

    Entry::Push {
        pattern: rule.begin.to_string(),
        scope: begin_scope,
        captures: begin_captures,
        push: push_body(
            rule.name,
            rule.content_name,
            end_entry,
            children,
            rule.apply_end_pattern_last,
        ),
    }
}

/// Assembles a pushed context: `[meta_scope?, meta_content_scope?, ...]` then the
/// pop entry before the children, or after them if `apply_end_last` is set.
fn push_body(
    name: Option<&str>,
    content_name: Option<&str>,
    end_entry: Entry,
    children: Context,
    apply_end_last: bool,
) -> Context {
    let meta = name
        .map(|n| Entry::MetaScope(n.to_string()))
        .into_iter()
        .chain(content_name.map(|c| Entry::MetaContentScope(c.to_string())));

    if apply_end_last {
        meta.chain(children).chain(Some(end_entry)).collect()
    } else {
        meta.chain(Some(end_entry)).chain(children).collect()
    }
}

fn compile_match(rule: MatchRule<'_>, sink: &mut impl DiagnosticSink) -> Entry {
    Entry::Match {
        pattern: rule.pattern.to_string(),
        scope: rule.name.map(str::to_string),
        captures: format_captures(rule.captures, sink),
    }
}

fn compile_include(
    reference: Reference<'_>,
    repo: &Repository<'_>,
    sink: &mut impl DiagnosticSink,
) -> Option<Entry> {
    let target = match reference {
        Reference::Local(name) => {
            if !repo.contains(name) {
                sink.report(Diagnostic::UnresolvedRepositoryReference {
                    name: name.to_string(),
                });
            }
            name.to_string()
        }
        Reference::Self_ => MAIN_CONTEXT.to_string(),
        Reference::Base => BASE_CONTEXT.to_string(),
        Reference::OtherComplete(scope) => external_syntax(scope, None),
        Reference::OtherSpecific(scope, context) => external_syntax(scope, Some(context)),
        Reference::Unknown(include) => {
            sink.report(Diagnostic::UnknownIncludeKind {
                include: include.to_string(),
            });
            return None;
        }
    };

    Some(Entry::Include(target))
}

/// Keeps the captures that are a plain scope on a numbered group.
fn format_captures(captures: &Captures, sink: &mut impl DiagnosticSink) -> CaptureScopes {
    let mut out = CaptureScopes::new();

    for (key, rule) in captures {
        let Some(name) = rule.capture_name() else {
            sink.report(Diagnostic::UnsupportedCaptureShape { key: key.clone() });
            continue;
        };
        let Ok(index) = key.parse::<u32>() else {
            sink.report(Diagnostic::NamedCaptureUnsupported { key: key.clone() });
            continue;
        };
        out.insert(index, name.to_string());
    }

    out
}

/// Group 0 is the whole match: it becomes the entry scope instead of a capture.
fn split_root_capture(mut captures: CaptureScopes) -> (Option<String>, CaptureScopes) {
    let root = captures.remove(&0);
    (root, captures)
}
