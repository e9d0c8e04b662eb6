use std::path::Path;

/// Extensions treated as markdown, compared case-insensitively.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Determines if a path refers to a markdown document.
pub fn is_markdown_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(extension) => {
            let ext_lower = extension.to_lowercase();
            MARKDOWN_EXTENSIONS.contains(&ext_lower.as_str())
        }
        None => false,
    }
}

/// Dotfiles and dot-directories are skipped by convention during scans.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}
