//! Outbound path rewriting.
//!
//! # Inputs
//! - original path: the full path the client requested, e.g. `/things/car`
//! - mount-relative path: what is left after the host router stripped the
//!   mount point, e.g. `/car` for a proxy mounted at `/things`
//!
//! Both carry their query string, which passes through untouched.

/// How the outbound path is derived from the inbound one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RewritePolicy {
    /// Forward the mount-relative path.
    #[default]
    Default,
    /// Forward the original full path.
    NoTrim,
    /// Strip one leading occurrence of the prefix from the mount-relative path.
    TrimPrefix(String),
}

impl RewritePolicy {
    /// Compute the outbound path-and-query.
    pub fn outbound_path(&self, original: &str, mount_relative: &str) -> String {
        let path = match self {
            RewritePolicy::Default => mount_relative,
            RewritePolicy::NoTrim => original,
            RewritePolicy::TrimPrefix(prefix) => mount_relative
                .strip_prefix(prefix.as_str())
                .unwrap_or(mount_relative),
        };
        ensure_leading_slash(path)
    }
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_prefix() {
        let policy = RewritePolicy::TrimPrefix("/things".into());
        assert_eq!(policy.outbound_path("/things/car", "/things/car"), "/car");
        assert_eq!(policy.outbound_path("/other/car", "/other/car"), "/other/car");
    }

    #[test]
    fn test_trim_prefix_only_at_start() {
        let policy = RewritePolicy::TrimPrefix("/things".into());
        assert_eq!(
            policy.outbound_path("/a/things/car", "/a/things/car"),
            "/a/things/car"
        );
        assert_eq!(
            policy.outbound_path("/things/things/car", "/things/things/car"),
            "/things/car"
        );
    }

    #[test]
    fn test_trim_prefix_whole_path() {
        let policy = RewritePolicy::TrimPrefix("/things".into());
        assert_eq!(policy.outbound_path("/things", "/things"), "/");
        assert_eq!(policy.outbound_path("/things?a=1", "/things?a=1"), "/?a=1");
    }

    #[test]
    fn test_no_trim_uses_original() {
        let policy = RewritePolicy::NoTrim;
        assert_eq!(policy.outbound_path("/things/car", "/car"), "/things/car");
    }

    #[test]
    fn test_default_uses_mount_relative() {
        let policy = RewritePolicy::Default;
        assert_eq!(policy.outbound_path("/things/car", "/car"), "/car");
        assert_eq!(policy.outbound_path("/things/car?x=1", "/car?x=1"), "/car?x=1");
    }
}
