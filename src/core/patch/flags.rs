use std::path::Path;

use crate::core::install::REQUIRED_AGENT_JAR;

/// Prefix of every open-module flag.
pub const OPEN_MODULE_PREFIX: &str = "--add-opens";

/// Prefix of every agent flag.
pub const AGENT_PREFIX: &str = "-javaagent:";

/// The JVM flag lines this tool writes into options files.
///
/// Built once per process and shared by reference; `clear` removes only what
/// matches these values.
#[derive(Debug, Clone)]
pub struct OwnedFlags {
    open_module_lines: [&'static str; 2],
    agent_jar: &'static str,
    agent_token: &'static str,
}

impl Default for OwnedFlags {
    fn default() -> Self {
        Self {
            open_module_lines: [
                "--add-opens=java.base/jdk.internal.org.objectweb.asm=ALL-UNNAMED",
                "--add-opens=java.base/jdk.internal.org.objectweb.asm.tree=ALL-UNNAMED",
            ],
            agent_jar: REQUIRED_AGENT_JAR,
            agent_token: "jetbrains",
        }
    }
}

impl OwnedFlags {
    pub fn open_module_lines(&self) -> &[&'static str] {
        &self.open_module_lines
    }

    /// `-javaagent:<config_dir>/<jar>=<token>` with `config_dir` in forward-slash form.
    pub fn agent_line(&self, config_dir: &Path) -> String {
        format!(
            "{AGENT_PREFIX}{}/{}={}",
            to_slash(config_dir),
            self.agent_jar,
            self.agent_token
        )
    }

    /// `<jar>=<token>`, the part of the agent line that identifies it as ours.
    pub fn agent_marker(&self) -> String {
        format!("{}={}", self.agent_jar, self.agent_token)
    }

    /// The three lines appended by `apply`, in order.
    pub fn injected_lines(&self, config_dir: &Path) -> Vec<String> {
        let mut lines: Vec<String> = self
            .open_module_lines
            .iter()
            .map(|l| l.to_string())
            .collect();
        lines.push(self.agent_line(config_dir));
        lines
    }

    /// Whether `apply` strips this line before appending its own.
    pub fn is_managed_prefix(line: &[u8]) -> bool {
        let trimmed = line.trim_ascii();
        trimmed.starts_with(OPEN_MODULE_PREFIX.as_bytes())
            || trimmed.starts_with(AGENT_PREFIX.as_bytes())
    }

    /// Whether `clear` removes this line: an owned literal, or our agent.
    pub fn is_owned(&self, line: &[u8], marker: &[u8]) -> bool {
        let trimmed = line.trim_ascii();
        self.open_module_lines
            .iter()
            .any(|owned| owned.as_bytes() == trimmed)
            || (trimmed.starts_with(AGENT_PREFIX.as_bytes()) && contains(trimmed, marker))
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Forward-slash rendering on hosts whose separator differs; unchanged elsewhere.
fn to_slash(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        raw.into_owned()
    } else {
        raw.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
