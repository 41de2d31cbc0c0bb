use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::history::DEFAULT_HISTORY_DEPTH;

pub const DEFAULT_COMMENT_MARKER: &str = "//";
pub const DEFAULT_INDENT: &str = "\t";

/// Indentation unit used by tab commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Tab,
    Spaces(usize),
}

impl Indent {
    pub fn as_string(self) -> String {
        match self {
            Self::Tab => DEFAULT_INDENT.to_string(),
            Self::Spaces(n) => " ".repeat(n),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub comment_marker: Option<String>,
    pub history_depth: Option<usize>,
    pub indent: Option<Indent>,
    pub log_filter: Option<String>,
}

impl ConfigFlags {
    /// Merge, with values from `other` taking precedence.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            comment_marker: other
                .comment_marker
                .clone()
                .or_else(|| self.comment_marker.clone()),
            history_depth: other.history_depth.or(self.history_depth),
            indent: other.indent.or(self.indent),
            log_filter: other.log_filter.clone().or_else(|| self.log_filter.clone()),
        }
    }

    /// Resolve to concrete settings, filling in defaults.
    pub fn resolve(&self) -> EditorConfig {
        EditorConfig {
            comment_marker: self
                .comment_marker
                .clone()
                .unwrap_or_else(|| DEFAULT_COMMENT_MARKER.to_string()),
            history_depth: self.history_depth.unwrap_or(DEFAULT_HISTORY_DEPTH),
            indent: self.indent.map_or_else(|| DEFAULT_INDENT.to_string(), Indent::as_string),
        }
    }
}

/// Settings for an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub comment_marker: String,
    pub history_depth: usize,
    pub indent: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        ConfigFlags::default().resolve()
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("textedit").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("textedit")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("textedit").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("textedit")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".texteditrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(line_tokens)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Split an rc-file line into a flag and the rest of the line as its value.
/// A double-quoted value keeps its surrounding whitespace.
fn line_tokens(line: &str) -> Vec<String> {
    match line.split_once(char::is_whitespace) {
        Some((name, value)) => vec![name.to_string(), unquote(value.trim()).to_string()],
        None => vec![line.to_string()],
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# textedit defaults (saved with --save)".to_string());
    if let Some(marker) = &flags.comment_marker {
        lines.push(format!("--comment-marker \"{marker}\""));
    }
    if let Some(depth) = flags.history_depth {
        lines.push(format!("--history-depth {depth}"));
    }
    if let Some(indent) = flags.indent {
        let value = match indent {
            Indent::Tab => "tab".to_string(),
            Indent::Spaces(n) => n.to_string(),
        };
        lines.push(format!("--indent {value}"));
    }
    if let Some(filter) = &flags.log_filter {
        lines.push(format!("--log {filter}"));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from command-line style tokens, ignoring the rest.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => {
                (name, Some(unquote(value).to_string()))
            }
            _ => (token, None),
        };
        let known = matches!(
            name,
            "--comment-marker" | "--history-depth" | "--indent" | "--log"
        );
        if !known {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => Some(value),
            None => {
                i += 1;
                tokens.get(i).cloned()
            }
        };
        if let Some(value) = value {
            apply_flag(&mut flags, name, &value);
        }
        i += 1;
    }
    flags
}

fn apply_flag(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--comment-marker" => flags.comment_marker = Some(value.to_string()),
        "--history-depth" => {
            if let Ok(depth) = value.parse() {
                flags.history_depth = Some(depth);
            }
        }
        "--indent" => flags.indent = parse_indent(value),
        "--log" => flags.log_filter = Some(value.to_string()),
        _ => {}
    }
}

pub fn parse_indent(s: &str) -> Option<Indent> {
    match s {
        "tab" => Some(Indent::Tab),
        _ => s.parse().ok().filter(|n| *n > 0).map(Indent::Spaces),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "textedit",
            "--comment-marker",
            "#",
            "--history-depth=20",
            "--indent",
            "4",
            "--select",
            "0:3",
            "comment",
            "notes.txt",
        ]);
        let flags = parse_flag_tokens(&args);
        assert_eq!(flags.comment_marker.as_deref(), Some("#"));
        assert_eq!(flags.history_depth, Some(20));
        assert_eq!(flags.indent, Some(Indent::Spaces(4)));
        assert_eq!(flags.log_filter, None);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--history-depth", "lots", "--indent=0"]));
        assert_eq!(flags.history_depth, None);
        assert_eq!(flags.indent, None);
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let config = ConfigFlags::default().resolve();
        assert_eq!(config.comment_marker, "//");
        assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
        assert_eq!(config.indent, "\t");

        let config = ConfigFlags {
            indent: Some(Indent::Spaces(2)),
            ..ConfigFlags::default()
        }
        .resolve();
        assert_eq!(config.indent, "  ");
    }

    #[test]
    fn test_config_union_prefers_other() {
        let file = ConfigFlags {
            comment_marker: Some("#".to_string()),
            history_depth: Some(10),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            comment_marker: Some("--".to_string()),
            indent: Some(Indent::Tab),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert_eq!(merged.comment_marker.as_deref(), Some("--"));
        assert_eq!(merged.history_depth, Some(10));
        assert_eq!(merged.indent, Some(Indent::Tab));
    }

    #[test]
    fn test_comment_marker_with_spaces_survives_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        let flags = ConfigFlags {
            comment_marker: Some("# ".to_string()),
            ..ConfigFlags::default()
        };
        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        std::fs::write(&path, "--comment-marker \"-- \"\n--indent=2\n").unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded.comment_marker.as_deref(), Some("-- "));
        assert_eq!(loaded.indent, Some(Indent::Spaces(2)));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".texteditrc");
        let flags = ConfigFlags {
            comment_marker: Some(";;".to_string()),
            history_depth: Some(5),
            indent: Some(Indent::Spaces(2)),
            log_filter: Some("debug".to_string()),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }
}
