/// Grammar Domain Module
///
/// Defines the source grammars Logweaver can transform.

use std::path::Path;

/// Source grammars supported by the injection and removal engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    JavaLike,
    KotlinLike,
}

impl Grammar {
    /// Parse grammar from string (CLI input).
    pub fn from_str(s: &str) -> Option<Grammar> {
        match s.to_lowercase().as_str() {
            "java" => Some(Grammar::JavaLike),
            "kotlin" | "kt" => Some(Grammar::KotlinLike),
            _ => None,
        }
    }

    /// Infer grammar from file extension.
    pub fn from_extension(ext: &str) -> Option<Grammar> {
        match ext.to_lowercase().as_str() {
            "java" => Some(Grammar::JavaLike),
            "kt" | "kts" => Some(Grammar::KotlinLike),
            _ => None,
        }
    }

    /// Infer grammar from a file path.
    pub fn from_path(path: &Path) -> Option<Grammar> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the display name of the grammar.
    pub fn name(&self) -> &'static str {
        match self {
            Grammar::JavaLike => "Java",
            Grammar::KotlinLike => "Kotlin",
        }
    }

    /// Statement terminator for the grammar.
    pub fn terminator(&self) -> &'static str {
        match self {
            Grammar::JavaLike => ";",
            Grammar::KotlinLike => "",
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::KotlinLike
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Grammar::from_str("java"), Some(Grammar::JavaLike));
        assert_eq!(Grammar::from_str("JAVA"), Some(Grammar::JavaLike));
        assert_eq!(Grammar::from_str("kotlin"), Some(Grammar::KotlinLike));
        assert_eq!(Grammar::from_str("kt"), Some(Grammar::KotlinLike));
        assert_eq!(Grammar::from_str("rust"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Grammar::from_extension("java"), Some(Grammar::JavaLike));
        assert_eq!(Grammar::from_extension("kt"), Some(Grammar::KotlinLike));
        assert_eq!(Grammar::from_extension("kts"), Some(Grammar::KotlinLike));
        assert_eq!(Grammar::from_extension("py"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Grammar::from_path(Path::new("src/Main.java")), Some(Grammar::JavaLike));
        assert_eq!(Grammar::from_path(Path::new("app/Main.kt")), Some(Grammar::KotlinLike));
        assert_eq!(Grammar::from_path(Path::new("script.sh")), None);
    }

    #[test]
    fn test_terminator() {
        assert_eq!(Grammar::JavaLike.terminator(), ";");
        assert_eq!(Grammar::KotlinLike.terminator(), "");
    }
}
