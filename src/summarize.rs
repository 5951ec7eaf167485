//! File summarization: a deterministic, bounded digest of each file, used as
//! the text that gets embedded.
//!
//! Files are classified by extension into a small closed set of
//! [`ContentKind`]s, each with its own rule:
//!
//! - **Code**: a classification line plus up to five declaration lines
//! - **Documentation**: a truncated raw excerpt
//! - **Structured data**: a fixed description
//! - **Other**: a generic description plus a short excerpt

use crate::models::Summary;

/// Upper bound on the length of any summary, in bytes.
pub const MAX_SUMMARY_BYTES: usize = 800;

const MAX_SIGNATURES: usize = 5;
const DOC_EXCERPT_BYTES: usize = 600;
const OTHER_EXCERPT_BYTES: usize = 300;

/// Line prefixes that mark a declaration worth surfacing.
const DECLARATION_PREFIXES: &[&str] = &[
    "def ",
    "async def ",
    "class ",
    "fn ",
    "pub fn ",
    "pub(crate) fn ",
    "async fn ",
    "pub async fn ",
    "struct ",
    "pub struct ",
    "enum ",
    "pub enum ",
    "trait ",
    "pub trait ",
    "impl ",
    "impl<",
    "function ",
    "async function ",
    "export ",
    "func ",
    "type ",
    "interface ",
    "module ",
    "const ",
    "public class ",
    "public interface ",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Code,
    Documentation,
    StructuredData,
    Other,
}

impl ContentKind {
    pub fn from_path(path: &str) -> Self {
        let filename = path.rsplit('/').next().unwrap_or(path).to_lowercase();
        if matches!(filename.as_str(), "readme" | "license") {
            return ContentKind::Documentation;
        }

        let ext = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "md" | "rst" | "txt" | "adoc" => ContentKind::Documentation,
            "json" | "yaml" | "yml" | "toml" | "xml" | "ini" | "cfg" | "conf" | "lock" => {
                ContentKind::StructuredData
            }
            "rs" | "py" | "js" | "mjs" | "cjs" | "ts" | "tsx" | "jsx" | "go" | "java" | "c"
            | "cpp" | "cc" | "h" | "hpp" | "cs" | "rb" | "php" | "swift" | "kt" | "kts"
            | "scala" | "lua" | "sh" | "bash" | "sql" | "vue" | "svelte" | "ex" | "exs" | "hs"
            | "dart" | "zig" | "proto" | "graphql" | "tf" => ContentKind::Code,
            _ => ContentKind::Other,
        }
    }
}

/// Summarize one file. Pure: the same input always yields the same summary.
pub fn summarize(path: &str, content: &str) -> Summary {
    let text = match ContentKind::from_path(path) {
        ContentKind::Code => summarize_code(path, content),
        ContentKind::Documentation => format!(
            "File: {path}\nSummary: Documentation.\n{}",
            truncate_to_char_boundary(content.trim(), DOC_EXCERPT_BYTES)
        ),
        ContentKind::StructuredData => {
            format!("File: {path}\nSummary: Structured configuration or data file.")
        }
        ContentKind::Other => format!(
            "File: {path}\nSummary: Project file.\n{}",
            truncate_to_char_boundary(content.trim(), OTHER_EXCERPT_BYTES)
        ),
    };

    Summary {
        path: path.to_string(),
        text: truncate_to_char_boundary(&text, MAX_SUMMARY_BYTES).to_string(),
    }
}

fn summarize_code(path: &str, content: &str) -> String {
    let signatures: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| is_declaration(line))
        .take(MAX_SIGNATURES)
        .collect();

    let mut text = format!(
        "File: {path}\nSummary: This file defines {}.",
        classify_code(content)
    );
    if !signatures.is_empty() {
        text.push_str(" Main declarations:\n");
        text.push_str(&signatures.join("\n"));
    }
    text
}

fn is_declaration(line: &str) -> bool {
    DECLARATION_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

fn classify_code(content: &str) -> &'static str {
    let has_line = |prefixes: &[&str]| {
        content
            .lines()
            .map(str::trim_start)
            .any(|line| prefixes.iter().any(|p| line.starts_with(p)))
    };

    if has_line(&["class ", "public class ", "struct ", "pub struct ", "interface "]) {
        "one or more type definitions"
    } else if has_line(&["def ", "fn ", "pub fn ", "function ", "func ", "async "]) {
        "function definitions"
    } else if has_line(&["import ", "use ", "from ", "require(", "#include"]) {
        "a module or script with imports"
    } else {
        "a general-purpose code file"
    }
}

/// Truncate `text` to at most `max` bytes on a UTF-8 char boundary.
pub fn truncate_to_char_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_from_path() {
        assert_eq!(ContentKind::from_path("src/main.rs"), ContentKind::Code);
        assert_eq!(ContentKind::from_path("app/Views.PY"), ContentKind::Code);
        assert_eq!(ContentKind::from_path("README.md"), ContentKind::Documentation);
        assert_eq!(ContentKind::from_path("LICENSE"), ContentKind::Documentation);
        assert_eq!(ContentKind::from_path("package.json"), ContentKind::StructuredData);
        assert_eq!(ContentKind::from_path("ci/deploy.yml"), ContentKind::StructuredData);
        assert_eq!(ContentKind::from_path("Dockerfile"), ContentKind::Other);
        assert_eq!(ContentKind::from_path("styles/site.css"), ContentKind::Other);
    }

    #[test]
    fn test_code_summary_extracts_declarations() {
        let source = "import os\n\nclass Widget:\n    def render(self):\n        pass\n\ndef build():\n    return Widget()\n";
        let summary = summarize("widgets/core.py", source);
        assert_eq!(summary.path, "widgets/core.py");
        assert!(summary.text.starts_with("File: widgets/core.py\n"));
        assert!(summary.text.contains("one or more type definitions"));
        assert!(summary.text.contains("class Widget:"));
        assert!(summary.text.contains("def render(self):"));
        assert!(summary.text.contains("def build():"));
        assert!(!summary.text.contains("return Widget()"));
    }

    #[test]
    fn test_code_summary_caps_declarations() {
        let source: String = (0..20).map(|i| format!("fn f{i}() {{}}\n")).collect();
        let summary = summarize("lib.rs", &source);
        assert!(summary.text.contains("fn f4()"));
        assert!(!summary.text.contains("fn f5()"));
        assert!(summary.text.contains("function definitions"));
    }

    #[test]
    fn test_code_without_declarations() {
        let summary = summarize("run.sh", "echo hello\n");
        assert!(summary.text.contains("a general-purpose code file"));
        assert!(!summary.text.contains("Main declarations"));
    }

    #[test]
    fn test_structured_data_is_fixed() {
        let a = summarize("config.json", "{\"a\": 1}");
        let b = summarize("config.json", "{\"completely\": \"different\"}");
        assert_eq!(a, b);
        assert!(!a.text.contains("completely"));
    }

    #[test]
    fn test_documentation_excerpt_is_truncated() {
        let body = "word ".repeat(1000);
        let summary = summarize("docs/guide.md", &body);
        assert!(summary.text.contains("Documentation"));
        assert!(summary.text.len() <= MAX_SUMMARY_BYTES);
        assert!(summary.text.len() < body.len());
    }

    #[test]
    fn test_summary_is_bounded_for_long_declarations() {
        let long_name = "x".repeat(400);
        let source: String = (0..5).map(|i| format!("def {long_name}{i}():\n")).collect();
        let summary = summarize("big.py", &source);
        assert!(summary.text.len() <= MAX_SUMMARY_BYTES);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let source = "pub fn a() {}\npub struct B;\n";
        assert_eq!(summarize("x.rs", source), summarize("x.rs", source));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "héllo wörld";
        let truncated = truncate_to_char_boundary(text, 2);
        assert_eq!(truncated, "h");
        assert_eq!(truncate_to_char_boundary("short", 100), "short");
    }
}
