//! Repository name derivation.

use url::Url;

/// Derive the directory name for a repository URL.
///
/// Takes the last path segment and strips a `.git` suffix. Handles
/// `https://host/org/repo(.git)`, scp-style `git@host:org/repo.git` and
/// plain paths.
pub fn repo_name_from_url(url: &str) -> anyhow::Result<String> {
    let trimmed = url.trim().trim_end_matches('/');

    let segment = match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(str::to_string),
        _ => trimmed
            .rsplit(['/', ':', '\\'])
            .next()
            .map(str::to_string),
    };

    let segment = segment
        .ok_or_else(|| anyhow::anyhow!("Invalid repository URL: no path segment in '{}'", url))?;
    let name = segment.strip_suffix(".git").unwrap_or(&segment);

    if name.is_empty() {
        anyhow::bail!("Invalid repository URL: empty name in '{}'", url);
    }

    Ok(name.to_string())
}
