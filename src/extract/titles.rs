use crate::LoreboxError;
use std::path::Path;

/// Reads the ordered title queue, one title per line
///
/// Surrounding whitespace is trimmed and blank lines are dropped. Order and
/// duplicates are kept as written.
pub fn load_titles(path: &Path) -> Result<Vec<String>, LoreboxError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoreboxError::TitleQueue {
        path: path.display().to_string(),
        source,
    })?;

    Ok(parse_titles(&content))
}

pub fn parse_titles(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
