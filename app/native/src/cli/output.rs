//! CLI output formatting utilities.

use colored::Colorize;
use serde_json::Value;

use crate::modules::zoning::{Rect, Zone};

/// Prints a JSON value pretty-printed, with colors when stdout is a terminal.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
/// `colored` drops the escapes on its own when output is piped.
pub fn print_json(value: &Value) {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    println!("{out}");
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str(&"null".magenta().to_string()),
        Value::Bool(b) => out.push_str(&b.to_string().magenta().to_string()),
        Value::Number(n) => out.push_str(&n.to_string().yellow().to_string()),
        Value::String(s) => out.push_str(&quoted(s).green().to_string()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                separator(out, i, depth + 1);
                write_value(out, item, depth + 1);
            }
            newline(out, depth);
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                separator(out, i, depth + 1);
                out.push_str(&quoted(key).cyan().to_string());
                out.push_str(": ");
                write_value(out, item, depth + 1);
            }
            newline(out, depth);
            out.push('}');
        }
    }
}

fn separator(out: &mut String, index: usize, depth: usize) {
    if index > 0 {
        out.push(',');
    }
    newline(out, depth);
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    out.push_str(&"  ".repeat(depth));
}

fn quoted(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// Formats a rectangle as `WxH+X+Y`.
#[must_use]
pub fn format_rect(rect: &Rect) -> String {
    format!("{}x{}+{}+{}", rect.width, rect.height, rect.x, rect.y)
}

/// A zone's display name, or a placeholder for unnamed zones.
#[must_use]
pub fn zone_label(zone: &Zone) -> String {
    if zone.name.is_empty() { "(unnamed)".to_string() } else { zone.name.clone() }
}

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored check mark or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(value: &Value) -> String {
        colored::control::set_override(false);
        let mut out = String::new();
        write_value(&mut out, value, 0);
        out
    }

    #[test]
    fn test_json_layout_matches_serde_pretty() {
        let value = serde_json::json!({
            "zone": { "name": "left \"half\"", "x": 0 },
            "monitor": null,
            "hits": [true, 3],
            "empty": []
        });

        let expected = serde_json::to_string_pretty(&value).unwrap();
        assert_eq!(plain(&value), expected);
    }

    #[test]
    fn test_format_rect() {
        assert_eq!(format_rect(&Rect::new(-10, 20, 960, 1080)), "960x1080+-10+20");
    }

    #[test]
    fn test_zone_label_for_unnamed_zone() {
        assert_eq!(zone_label(&Zone::new("", 0, 0, 0, 1, 1)), "(unnamed)");
        assert_eq!(zone_label(&Zone::new("top", 0, 0, 0, 1, 1)), "top");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("hello", 1), "…");
        assert_eq!(truncate("zone 🌍 left", 7), "zone 🌍…");
    }

    #[test]
    fn test_format_bool() {
        assert!(format_bool(true).contains('✓'));
        assert!(format_bool(false).contains('✗'));
    }
}
