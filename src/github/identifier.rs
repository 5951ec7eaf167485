use crate::error::ContextError;
use crate::models::RepoKey;

/// Hosting domains whose URLs are accepted in place of a bare `owner/name`.
const KNOWN_HOSTS: &[&str] = &["www.github.com", "github.com"];

/// Parse a repository identifier: either `owner/name` or a URL such as
/// `https://github.com/owner/name`. Runs before any network access.
pub fn parse_repo_identifier(input: &str) -> Result<RepoKey, ContextError> {
    let trimmed = input.trim();
    let invalid = || ContextError::InvalidIdentifier(trimmed.to_string());

    let path = match strip_known_host(trimmed) {
        Some(rest) => rest
            .split(['?', '#'])
            .next()
            .unwrap_or_default(),
        None => trimmed,
    };

    let path = path.trim_matches('/');
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() != 2 {
        return Err(invalid());
    }

    let owner = parts[0];
    let name = parts[1].strip_suffix(".git").unwrap_or(parts[1]);
    if !is_valid_segment(owner) || !is_valid_segment(name) {
        return Err(invalid());
    }

    Ok(RepoKey::new(owner, name))
}

/// Return the path after a known hosting domain, if the input names one.
/// Scheme and host compare case-insensitively.
fn strip_known_host(input: &str) -> Option<&str> {
    let without_scheme = strip_prefix_ignore_case(input, "https://")
        .or_else(|| strip_prefix_ignore_case(input, "http://"))
        .unwrap_or(input);

    KNOWN_HOSTS.iter().find_map(|host| {
        let rest = strip_prefix_ignore_case(without_scheme, host)?;
        // "github.company.com" must not match "github.com"
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    })
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &input[prefix.len()..])
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
