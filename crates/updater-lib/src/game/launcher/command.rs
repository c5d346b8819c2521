//! String helpers for rebuilding a launch command line

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker written in place of private values when a command is logged
pub const REDACTED: &str = "<censored>";

/// Flags whose value must never reach a log file
const PRIVATE_FLAGS: [&str; 5] = ["--username", "--accessToken", "--uuid", "--xuid", "--clientId"];

/// Properties pointing the loader at additional mods; recomputed on every relaunch
pub const OPTIONAL_MODS_PROPERTIES: [&str; 2] = ["-Dfabric.addMods=", "-Dloader.addMods="];

static PRIVATE_VALUE: Lazy<Regex> = Lazy::new(|| {
    let flags = PRIVATE_FLAGS
        .iter()
        .map(|f| regex::escape(f))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r#"("?(?:{})"?) ("[^"]*"|[^ ]+)"#, flags)).expect("valid regex")
});

/// Wrap in double quotes when the argument contains a space and is not quoted already
pub fn quote(argument: &str) -> String {
    if !argument.contains(' ') || is_quoted(argument) {
        return argument.to_string();
    }
    format!("\"{}\"", argument)
}

/// Wrap in double quotes unless already quoted
pub fn quote_always(argument: &str) -> String {
    if is_quoted(argument) {
        return argument.to_string();
    }
    format!("\"{}\"", argument)
}

fn is_quoted(argument: &str) -> bool {
    argument.len() >= 2 && argument.starts_with('"') && argument.ends_with('"')
}

/// Forward slashes everywhere so paths compare equal across platforms
pub fn format_path(text: &str) -> String {
    text.replace('\\', "/")
}

/// Remove every `property...` token from `command`. A quoted value may
/// contain spaces; an unquoted one ends at the next space.
pub fn remove_property(command: &str, property: &str) -> String {
    let mut result = command.to_string();
    while let Some(start) = result.find(property) {
        let value_start = start + property.len();
        let rest = &result[value_start..];
        let value_len = if rest.starts_with('"') {
            rest[1..].find('"').map(|i| i + 2).unwrap_or(rest.len())
        } else {
            rest.find(' ').unwrap_or(rest.len())
        };
        let mut end = value_start + value_len;
        // Swallow one separating space so tokens don't pile up
        if result[end..].starts_with(' ') {
            end += 1;
        }
        result.replace_range(start..end, "");
    }
    result.trim_end().to_string()
}

/// Strip the additional-mods properties a previous relaunch may have added
pub fn remove_optional_mods_properties(command: &str) -> String {
    OPTIONAL_MODS_PROPERTIES
        .iter()
        .fold(command.to_string(), |acc, property| remove_property(&acc, property))
}

/// Drop `--versionType <value>` from a launch argument list. Loaders append
/// their name to the version type on each launch, so carrying it over makes
/// the title screen read "Fabric/Fabric/...".
pub fn strip_version_type(arguments: &[String]) -> Vec<String> {
    let mut kept = Vec::with_capacity(arguments.len());
    let mut iter = arguments.iter();
    while let Some(arg) = iter.next() {
        if arg == "--versionType" {
            iter.next();
            continue;
        }
        kept.push(arg.clone());
    }
    kept
}

/// Replace the values of account-related flags with [`REDACTED`]. Only for
/// logging; the executed command keeps the real values.
pub fn censor_private_info(command: &str) -> String {
    PRIVATE_VALUE
        .replace_all(command, format!("$1 {}", REDACTED).as_str())
        .into_owned()
}

/// Join the non-empty parts with single spaces
pub fn join_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
