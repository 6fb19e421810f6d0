//! Line commands read from stdin while the stream plays.

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Raw host values; invalid ones fall back to defaults in the engine.
    Generate { size: f64, points: f64 },
    Quit,
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let cmd = match head {
        "generate" | "gen" => {
            let size = number(words.next(), "size")?;
            let points = number(words.next(), "points")?;
            Command::Generate { size, points }
        }
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command `{other}` (try `generate <size> <points>` or `quit`)"),
    };

    if let Some(extra) = words.next() {
        bail!("unexpected argument `{extra}`");
    }
    Ok(Some(cmd))
}

fn number(word: Option<&str>, what: &str) -> Result<f64> {
    let word = word.with_context(|| format!("missing {what}"))?;
    word.parse().with_context(|| format!("{what} `{word}` is not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate() {
        assert_eq!(
            parse_command("generate 1024 8").unwrap(),
            Some(Command::Generate { size: 1024.0, points: 8.0 })
        );
        // Host-style floats and out-of-range values pass through untouched.
        assert_eq!(
            parse_command("  gen -5 2.5 ").unwrap(),
            Some(Command::Generate { size: -5.0, points: 2.5 })
        );
    }

    #[test]
    fn parses_quit_and_blank() {
        assert_eq!(parse_command("quit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_command("generate 1024").is_err());
        assert!(parse_command("generate big 4").is_err());
        assert!(parse_command("generate 16 2 9").is_err());
        let err = parse_command("play").unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }
}
