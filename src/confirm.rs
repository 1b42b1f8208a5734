//! Confirmation prompt for destructive operations.

use std::io::{BufRead, Write};

/// Ask `message` unless `assumed` (the `--yes` flag) already answered.
///
/// Only `y`/`yes` (case-insensitive) confirm; anything else, including EOF,
/// declines.
pub fn confirm_action(message: &str, assumed: bool) -> bool {
    if assumed {
        return true;
    }
    eprint!("{message} [y/N]: ");
    let _ = std::io::stderr().flush();

    let mut line = String::new();
    let stdin = std::io::stdin();
    if stdin.lock().read_line(&mut line).is_err() {
        return false;
    }
    parse_answer(&line)
}

fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_variants_confirm() {
        assert!(parse_answer("y"));
        assert!(parse_answer("YES"));
        assert!(parse_answer("  yes \n"));
    }

    #[test]
    fn everything_else_declines() {
        assert!(!parse_answer(""));
        assert!(!parse_answer("n"));
        assert!(!parse_answer("no"));
        assert!(!parse_answer("yep"));
    }

    #[test]
    fn assumed_flag_skips_the_prompt() {
        assert!(confirm_action("Delete?", true));
    }
}
