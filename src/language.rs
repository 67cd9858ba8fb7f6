// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Map a file path to a language label by file extension
// role: engine/classifier
// inputs: Any text (empty strings, bare names and trailing dots included)
// outputs: A static, non-empty language label; "Other" when nothing matches
// invariants:
// - Total: never panics, never returns an empty label
// - Extension lookup is case-insensitive and uses only the final `.` component
// - A bare file named `Dockerfile` (any case) classifies as "Dockerfile"
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub const OTHER: &str = "Other";
pub const DOCKERFILE: &str = "Dockerfile";

/// Return the language label for a path.
pub fn classify(path: &str) -> &'static str {
  let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);

  if file_name.eq_ignore_ascii_case("dockerfile") {
    return DOCKERFILE;
  }

  let ext = match path.rfind('.') {
    Some(idx) => &path[idx + 1..],
    None => return OTHER,
  };

  if ext.is_empty() {
    return OTHER;
  }

  language_for_extension(&ext.to_ascii_lowercase()).unwrap_or(OTHER)
}

fn language_for_extension(ext: &str) -> Option<&'static str> {
  let label = match ext {
    // Web
    "js" | "jsx" => "JavaScript",
    "ts" | "tsx" => "TypeScript",
    "html" => "HTML",
    "css" => "CSS",
    "scss" => "SCSS",
    "sass" => "Sass",
    "less" => "Less",
    "vue" => "Vue",

    // Backend
    "py" => "Python",
    "rb" => "Ruby",
    "php" => "PHP",
    "java" => "Java",
    "kt" => "Kotlin",
    "scala" => "Scala",
    "go" => "Go",
    "rs" => "Rust",
    "c" => "C",
    "cpp" | "cc" | "cxx" => "C++",
    "h" => "C/C++ Header",
    "hpp" => "C++ Header",
    "cs" => "C#",
    "swift" => "Swift",

    // Scripting
    "sh" => "Shell",
    "bash" => "Bash",
    "zsh" => "Zsh",
    "pl" => "Perl",
    "lua" => "Lua",

    // Data
    "json" => "JSON",
    "xml" => "XML",
    "yaml" | "yml" => "YAML",
    "toml" => "TOML",
    "sql" => "SQL",

    // Markup
    "md" => "Markdown",
    "rst" => "reStructuredText",
    "tex" => "TeX",

    // Config
    "dockerfile" => DOCKERFILE,
    "gitignore" => "Git Config",
    "env" => "Environment",

    _ => return None,
  };

  Some(label)
}
