// Log statement strategies.
// Pure rendering rules for one logging framework: statement text, removal
// markers, and the import (if any) the rendered call needs to resolve.

use crate::domain::config::FrameworkId;
use crate::domain::grammar::Grammar;

/// Capability set of one logging framework. Implementations are stateless;
/// every method is a pure function over its arguments.
pub trait LogStrategy: Sync {
    /// One complete, grammar-terminated statement performing a diagnostic
    /// write of `message` tagged with `tag`.
    fn render_call(&self, tag: &str, message: &str, grammar: Grammar) -> String;

    /// Substrings identifying a previously inserted log of this strategy and
    /// tag. Always includes the tag text itself; frameworks with a
    /// distinguishing call prefix add it so removal does not match unrelated
    /// literal text.
    fn removal_markers(&self, tag: &str) -> Vec<String>;

    /// Fully qualified symbol the rendered call needs importable in the
    /// target file, if any.
    fn required_import(&self, grammar: Grammar) -> Option<&'static str>;
}

/// A value concatenated at the end of a Java-like message leaves an empty
/// trailing literal once the call template closes its quote. Collapse it so
/// the rendered statement reads like hand-written code.
fn collapse_empty_literal(call: String) -> String {
    call.replace(" + \"\"", "")
}

/// Builtin print. No import in either grammar.
pub struct PrintlnStrategy;

impl LogStrategy for PrintlnStrategy {
    fn render_call(&self, tag: &str, message: &str, grammar: Grammar) -> String {
        let call = match grammar {
            Grammar::JavaLike => format!("System.out.println(\"{}: {}\");", tag, message),
            Grammar::KotlinLike => format!("println(\"{}: {}\")", tag, message),
        };
        collapse_empty_literal(call)
    }

    fn removal_markers(&self, tag: &str) -> Vec<String> {
        vec![tag.to_string()]
    }

    fn required_import(&self, _grammar: Grammar) -> Option<&'static str> {
        None
    }
}

/// Tag-scoped Timber call. Same import in both grammars.
pub struct TimberStrategy;

impl LogStrategy for TimberStrategy {
    fn render_call(&self, tag: &str, message: &str, grammar: Grammar) -> String {
        let call = format!(
            "Timber.tag(\"{}\").d(\"{}\"){}",
            tag,
            message,
            grammar.terminator()
        );
        collapse_empty_literal(call)
    }

    fn removal_markers(&self, tag: &str) -> Vec<String> {
        vec![format!("Timber.tag(\"{}\")", tag), tag.to_string()]
    }

    fn required_import(&self, _grammar: Grammar) -> Option<&'static str> {
        Some("timber.log.Timber")
    }
}

/// Napier call with a named tag argument. Import only for the Kotlin-like
/// grammar, matching the framework's multiplatform packaging.
pub struct NapierStrategy;

impl LogStrategy for NapierStrategy {
    fn render_call(&self, tag: &str, message: &str, grammar: Grammar) -> String {
        let call = format!(
            "Napier.d(\"{}\", tag = \"{}\"){}",
            message,
            tag,
            grammar.terminator()
        );
        collapse_empty_literal(call)
    }

    fn removal_markers(&self, tag: &str) -> Vec<String> {
        vec![format!("tag = \"{}\"", tag), tag.to_string()]
    }

    fn required_import(&self, grammar: Grammar) -> Option<&'static str> {
        match grammar {
            Grammar::JavaLike => None,
            Grammar::KotlinLike => Some("io.github.aakira.napier.Napier"),
        }
    }
}

/// Select the strategy for a configured framework.
pub fn strategy_for(framework: FrameworkId) -> &'static dyn LogStrategy {
    match framework {
        FrameworkId::Println => &PrintlnStrategy,
        FrameworkId::Timber => &TimberStrategy,
        FrameworkId::Napier => &NapierStrategy,
    }
}
