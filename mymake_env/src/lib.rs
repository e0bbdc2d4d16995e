#![forbid(unsafe_code)]

//! Environment variable names shared across mymake crates (library, binary,
//! tests and helpers).

/// Environment variable naming the rule file, overriding `MyMakefile`.
///
/// # Examples
///
/// ```
/// use mymake_env::RULE_FILE_ENV;
/// assert_eq!(RULE_FILE_ENV, "MYMAKE_FILE");
/// ```
pub const RULE_FILE_ENV: &str = "MYMAKE_FILE";

/// Environment variable naming the rule cache file, overriding `.mymake.cache`.
pub const CACHE_FILE_ENV: &str = "MYMAKE_CACHE";

/// Environment variable naming the shell used to run rule commands.
pub const SHELL_ENV: &str = "MYMAKE_SHELL";

/// Rule file read when none is given.
pub const DEFAULT_RULE_FILE: &str = "MyMakefile";

/// Rule cache written next to the rule file when none is given.
pub const DEFAULT_CACHE_FILE: &str = ".mymake.cache";

/// Shell used to run rule commands when none is given.
pub const DEFAULT_SHELL: &str = "/bin/sh";
