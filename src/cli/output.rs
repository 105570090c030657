use std::fmt::Display;

use colored::{ColoredString, Colorize};

/// Two-space indented status line: `  <symbol> <msg>`.
fn status_line(symbol: ColoredString, msg: impl Display) -> String {
    format!("  {symbol} {msg}")
}

pub fn success(msg: impl Display) {
    println!("{}", status_line("✓".green(), msg));
}

pub fn warning(msg: impl Display) {
    println!("{}", status_line("⚠".yellow(), msg));
}

/// Report a failed command on stderr.
pub fn error(err: impl Display) {
    eprintln!("{}", status_line("✗".red(), format_args!("Error: {err}")));
}

pub fn header(title: impl Display) {
    println!("\n{}", title.to_string().bold());
}

/// Print one `label: value` row with labels aligned.
pub fn field(label: &str, value: &str) {
    println!("  {:<13}{}", format!("{label}:").dimmed(), value);
}

/// Print one key in a listing. The default is marked with `*`.
pub fn key_line(is_default: bool, name: &str, kind: &str, detail: &str) {
    let marker = if is_default { "*".green() } else { " ".normal() };
    let name = if is_default { name.bold() } else { name.normal() };
    println!("  {marker} {name}  [{kind}]  {}", detail.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_indents_symbol_and_message() {
        colored::control::set_override(false);
        assert_eq!(
            status_line("✓".green(), "Added signing key: k"),
            "  ✓ Added signing key: k"
        );
        assert_eq!(
            status_line("✗".red(), format_args!("Error: {}", 42)),
            "  ✗ Error: 42"
        );
    }
}
