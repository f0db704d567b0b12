//! Line-oriented scripts that drive a headless game.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use village_defence_core::Cell;

/// One instruction of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// `place <Kind> <x> <y>`
    Place { kind_name: String, cell: Cell },
    /// `remove <x> <y>`
    Remove { cell: Cell },
    /// `advance [days]`
    Advance { days: u32 },
    /// `show`
    Show,
    /// `inspect <x> <y>`
    Inspect { cell: Cell },
}

/// Reads and parses a script file.
pub(crate) fn load(path: &Path) -> Result<Vec<Step>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read script at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid script at {}", path.display()))
}

/// Parses script text. Blank lines and `#` comments are skipped.
pub(crate) fn parse(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let step = parse_line(line).with_context(|| format!("line {}: `{line}`", index + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_line(line: &str) -> Result<Step> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let step = match words.as_slice() {
        ["place", kind, x, y] => Step::Place {
            kind_name: (*kind).to_owned(),
            cell: parse_cell(x, y)?,
        },
        ["remove", x, y] => Step::Remove {
            cell: parse_cell(x, y)?,
        },
        ["advance"] => Step::Advance { days: 1 },
        ["advance", days] => Step::Advance {
            days: days
                .parse()
                .with_context(|| format!("`{days}` is not a day count"))?,
        },
        ["show"] => Step::Show,
        ["inspect", x, y] => Step::Inspect {
            cell: parse_cell(x, y)?,
        },
        [command, ..] => bail!("unknown or malformed command `{command}`"),
        [] => bail!("empty command"),
    };
    Ok(step)
}

fn parse_cell(x: &str, y: &str) -> Result<Cell> {
    let x = x
        .parse()
        .with_context(|| format!("`{x}` is not a coordinate"))?;
    let y = y
        .parse()
        .with_context(|| format!("`{y}` is not a coordinate"))?;
    Ok(Cell::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let steps = parse(
            "# opening\n\
             place LumberMill 3 -2\n\
             \n\
             remove 3 -2   # changed my mind\n\
             advance\n\
             advance 12\n\
             inspect 0 0\n\
             show\n",
        )
        .expect("valid script");

        assert_eq!(
            steps,
            vec![
                Step::Place {
                    kind_name: "LumberMill".to_owned(),
                    cell: Cell::new(3, -2),
                },
                Step::Remove {
                    cell: Cell::new(3, -2)
                },
                Step::Advance { days: 1 },
                Step::Advance { days: 12 },
                Step::Inspect { cell: Cell::ORIGIN },
                Step::Show,
            ]
        );
    }

    #[test]
    fn errors_name_the_offending_line() {
        let error = parse("show\nplace Farm one 2\n").unwrap_err();
        assert!(format!("{error:#}").contains("line 2"), "{error:#}");

        let error = parse("dance\n").unwrap_err();
        assert!(format!("{error:#}").contains("dance"), "{error:#}");

        assert!(parse("advance -3").is_err());
    }
}
