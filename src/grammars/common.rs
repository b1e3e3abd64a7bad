/// Name of the context holding the root patterns of a grammar
pub const MAIN_CONTEXT: &str = "main";

/// Context the embedding grammar exposes as its top level, target of `$base`
pub const BASE_CONTEXT: &str = "$top_level_main";

/// Prefix addressing another grammar by scope name in an include
pub const SCOPE_PREFIX: &str = "scope:";

/// per vscode-textmate:
///  Allowed values:
///  * Scope Name, e.g. `source.ts`
///  * Top level scope reference, e.g. `source.ts#entity.name.class`
///  * Relative scope reference, e.g. `#entity.name.class`
///  * self, e.g. `$self`
///  * base, e.g. `$base`
///
/// Anything else starting with `$` is `Unknown`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Reference<'a> {
    Self_,
    Base,
    Local(&'a str),
    OtherComplete(&'a str),
    OtherSpecific(&'a str, &'a str),
    Unknown(&'a str),
}

impl<'a> From<&'a str> for Reference<'a> {
    fn from(value: &'a str) -> Self {
        match value {
            "$self" => Self::Self_,
            "$base" => Self::Base,
            s if s.starts_with('#') => Self::Local(&s[1..]),
            s if s.starts_with('$') => Self::Unknown(s),
            s => match s.split_once('#') {
                Some((scope, rule)) => Self::OtherSpecific(scope, rule),
                None => Self::OtherComplete(s),
            },
        }
    }
}

impl Reference<'_> {
    /// The include text of this reference, as written in a TextMate grammar
    pub fn to_include(&self) -> String {
        match self {
            Self::Self_ => "$self".to_string(),
            Self::Base => "$base".to_string(),
            Self::Local(name) => format!("#{name}"),
            Self::OtherComplete(scope) => scope.to_string(),
            Self::OtherSpecific(scope, rule) => format!("{scope}#{rule}"),
            Self::Unknown(s) => s.to_string(),
        }
    }
}

/// Include target addressing another grammar, optionally one of its contexts
pub fn external_syntax(scope: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("{SCOPE_PREFIX}{scope}#{context}"),
        None => format!("{SCOPE_PREFIX}{scope}"),
    }
}

/// Maps the target of a sublime include back to the TextMate reference it came from.
pub fn reference_for_context(target: &str) -> Reference<'_> {
    match target {
        MAIN_CONTEXT => Reference::Self_,
        BASE_CONTEXT => Reference::Base,
        t => match t.strip_prefix(SCOPE_PREFIX) {
            Some(external) => match external.split_once('#') {
                Some((scope, rule)) => Reference::OtherSpecific(scope, rule),
                None => Reference::OtherComplete(external),
            },
            None => Reference::Local(t),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_references() {
        assert_eq!(Reference::from("$self"), Reference::Self_);
        assert_eq!(Reference::from("$base"), Reference::Base);
        assert_eq!(Reference::from("#strings"), Reference::Local("strings"));
        assert_eq!(Reference::from("$other"), Reference::Unknown("$other"));
        assert_eq!(
            Reference::from("source.python"),
            Reference::OtherComplete("source.python")
        );
        assert_eq!(
            Reference::from("source.python#string"),
            Reference::OtherSpecific("source.python", "string")
        );
        // only the first separator splits
        assert_eq!(
            Reference::from("source.a#b#c"),
            Reference::OtherSpecific("source.a", "b#c")
        );
    }

    #[test]
    fn can_format_external_syntax() {
        assert_eq!(
            external_syntax("source.python", Some("string")),
            "scope:source.python#string"
        );
        assert_eq!(external_syntax("source.python", None), "scope:source.python");
    }

    #[test]
    fn context_targets_map_back_to_references() {
        for include in ["$self", "$base", "#strings", "source.js", "source.js#expr"] {
            let target = match Reference::from(include) {
                Reference::Self_ => MAIN_CONTEXT.to_string(),
                Reference::Base => BASE_CONTEXT.to_string(),
                Reference::Local(name) => name.to_string(),
                Reference::OtherComplete(scope) => external_syntax(scope, None),
                Reference::OtherSpecific(scope, rule) => external_syntax(scope, Some(rule)),
                Reference::Unknown(_) => unreachable!(),
            };
            assert_eq!(reference_for_context(&target).to_include(), include);
        }
    }
}
