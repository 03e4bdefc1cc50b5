//! Commands typed at the `watch` prompt.

use derive_more::with_trait::Display;

pub const HELP: &str = "\
commands:
  run [START] [END]   start a scrape (dates are YYYY-MM-DD, optional)
  stop                stop the running scrape
  view [DATE]         show keywords for DATE or the selected date
  date DATE           select a date without loading it
  refresh             poll status and logs now
  help                show this text
  quit                leave the panel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run {
        start_date: Option<String>,
        end_date: Option<String>,
    },
    Stop,
    View(Option<String>),
    SelectDate(String),
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CommandError {
    #[display("empty input")]
    Empty,
    #[display("unknown command '{_0}', type 'help'")]
    Unknown(String),
    #[display("usage: {_0}")]
    Usage(&'static str),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let args: Vec<String> = words.map(str::to_string).collect();

    match head.to_lowercase().as_str() {
        "run" | "start" => {
            if args.len() > 2 {
                return Err(CommandError::Usage("run [START] [END]"));
            }
            let mut args = args.into_iter();
            Ok(Command::Run {
                start_date: args.next(),
                end_date: args.next(),
            })
        }
        "stop" => Ok(Command::Stop),
        "view" | "show" => match args.as_slice() {
            [] => Ok(Command::View(None)),
            [date] => Ok(Command::View(Some(date.clone()))),
            _ => Err(CommandError::Usage("view [DATE]")),
        },
        "date" => match args.as_slice() {
            [date] => Ok(Command::SelectDate(date.clone())),
            _ => Err(CommandError::Usage("date DATE")),
        },
        "refresh" | "r" => Ok(Command::Refresh),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_takes_up_to_two_dates() {
        assert_eq!(
            parse_command("run").unwrap(),
            Command::Run {
                start_date: None,
                end_date: None
            }
        );
        assert_eq!(
            parse_command("run 2024-06-01 2024-06-03").unwrap(),
            Command::Run {
                start_date: Some("2024-06-01".into()),
                end_date: Some("2024-06-03".into())
            }
        );
        assert_eq!(
            parse_command("run a b c"),
            Err(CommandError::Usage("run [START] [END]"))
        );
    }

    #[test]
    fn view_and_date() {
        assert_eq!(parse_command("  VIEW ").unwrap(), Command::View(None));
        assert_eq!(
            parse_command("view 2024-06-01").unwrap(),
            Command::View(Some("2024-06-01".into()))
        );
        assert_eq!(
            parse_command("date 2024-05-31").unwrap(),
            Command::SelectDate("2024-05-31".into())
        );
        assert!(parse_command("date").is_err());
    }

    #[test]
    fn unknown_and_empty_input() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("launch").unwrap_err().to_string(),
            "unknown command 'launch', type 'help'"
        );
        assert_eq!(parse_command("q").unwrap(), Command::Quit);
    }
}
