//! `ARCHFLAGS` parsing for macOS cross-compilation.

use std::sync::LazyLock;

use regex::Regex;

use super::errors::ResolveError;

static ARCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-arch\s+(\S+)").expect("ARCHFLAGS pattern is valid"));

/// Extract the architectures named by `-arch <name>` pairs.
///
/// Other tokens are ignored. An `-arch` with no name after it, or with
/// another flag in its place, is an error.
pub fn parse_archflags(flags: &str) -> Result<Vec<String>, ResolveError> {
    let mut archs = Vec::new();

    for cap in ARCH_RE.captures_iter(flags) {
        let name = &cap[1];
        if name.starts_with('-') {
            return Err(ResolveError::MalformedArchFlags(flags.to_string()));
        }
        archs.push(name.to_string());
    }

    let arch_flags = flags.split_whitespace().filter(|t| *t == "-arch").count();
    if arch_flags != archs.len() {
        return Err(ResolveError::MalformedArchFlags(flags.to_string()));
    }

    Ok(archs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_archs() {
        let archs = parse_archflags("-arch x86_64 -arch arm64").unwrap();
        assert_eq!(archs, vec!["x86_64", "arm64"]);
    }

    #[test]
    fn test_ignores_other_tokens() {
        let archs = parse_archflags("-O2 -arch arm64 -g").unwrap();
        assert_eq!(archs, vec!["arm64"]);
        assert!(parse_archflags("").unwrap().is_empty());
        assert!(parse_archflags("-O2").unwrap().is_empty());
    }

    #[test]
    fn test_dangling_arch_is_malformed() {
        assert!(matches!(
            parse_archflags("-arch x86_64 -arch"),
            Err(ResolveError::MalformedArchFlags(_))
        ));
        assert!(matches!(
            parse_archflags("-arch -arch arm64"),
            Err(ResolveError::MalformedArchFlags(_))
        ));
    }
}
