//! Release source templates
//!
//! Binary plugins publish a download source such as
//! `https://example.com/{{ release }}/step-{{ os }}-{{ arch }}.zst`.
//! Placeholders are filled from the host platform and the plugin ref
//! before the URL reaches the download producer.

use crate::error::{StepError, StepResult};

/// Release name for a plugin ref: the tag for `refs/tags/<tag>`, else `latest`
pub fn release_name(git_ref: &str) -> &str {
    git_ref.strip_prefix("refs/tags/").unwrap_or("latest")
}

/// Host OS in Go naming (`linux`, `darwin`, `windows`)
pub fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Host architecture in Go naming (`amd64`, `arm64`, `386`)
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    }
}

/// Expand `{{ os }}`, `{{ arch }}` and `{{ release }}` in `template`
pub fn expand_source(template: &str, git_ref: &str) -> StepResult<String> {
    expand_with(template, |name| match name {
        "os" => Some(host_os().to_string()),
        "arch" => Some(host_arch().to_string()),
        "release" => Some(release_name(git_ref).to_string()),
        _ => None,
    })
}

fn expand_with<F>(template: &str, lookup: F) -> StepResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let invalid = |reason: String| StepError::SourceTemplate {
        template: template.to_string(),
        reason,
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| invalid("unclosed '{{'".to_string()))?;

        let name = after[..end].trim();
        let value =
            lookup(name).ok_or_else(|| invalid(format!("unknown placeholder '{}'", name)))?;
        out.push_str(&value);
        rest = &after[end + 2..];
    }

    if rest.contains("}}") {
        return Err(invalid("unmatched '}}'".to_string()));
    }
    out.push_str(rest);
    Ok(out)
}
