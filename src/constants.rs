//! Common constants used throughout the kiln application.

/// Project descriptor written by `init` into the project root.
pub const PROJECT_FILE: &str = "kiln.yaml";

/// Optional glob list of template entries copied without substitution.
pub const VERBATIM_FILE: &str = ".verbatim";

/// Extra extension marking files rendered by the template engine.
pub const TEMPLATE_EXTENSION: &str = "j2";

/// Entries always copied byte-for-byte.
pub const DEFAULT_VERBATIM_PATTERNS: [&str; 6] =
    ["**/*.jar", "**/*.png", "**/*.jpg", "**/*.gif", "**/*.ico", "**/LICENSE*"];

/// How long `init` waits for the platform versions list.
pub const VERSIONS_TIMEOUT_SECS: u64 = 20;
