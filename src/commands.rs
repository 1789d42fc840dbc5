use std::path::PathBuf;

use anyhow::{bail, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start(Option<String>),
    Stop,
    Pause,
    Resume(Option<String>),
    Toggle(Option<String>),
    Lap,
    Reset,
    Status,
    Export(PathBuf),
    Import(PathBuf),
    Help,
    Quit,
}

/// Parse one input line. An empty line toggles, like the enter key on the
/// device did.
pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let label = || (!rest.is_empty()).then(|| rest.to_string());

    let cmd = match word.to_ascii_lowercase().as_str() {
        "" | "t" | "toggle" => Command::Toggle(label()),
        "s" | "start" => Command::Start(label()),
        "x" | "stop" => Command::Stop,
        "p" | "pause" => Command::Pause,
        "r" | "resume" => Command::Resume(label()),
        "l" | "lap" => Command::Lap,
        "reset" => Command::Reset,
        "?" | "status" => Command::Status,
        "export" | "import" if rest.is_empty() => bail!("{} needs a file path", word),
        "export" => Command::Export(PathBuf::from(rest)),
        "import" => Command::Import(PathBuf::from(rest)),
        "h" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => bail!("unknown command: {}", other),
    };
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_line_toggles() {
        assert_eq!(parse("").unwrap(), Command::Toggle(None));
        assert_eq!(parse("   \n").unwrap(), Command::Toggle(None));
    }

    #[test]
    fn test_labels() {
        assert_eq!(parse("start warm up").unwrap(), Command::Start(Some("warm up".into())));
        assert_eq!(parse("resume  set 2 ").unwrap(), Command::Resume(Some("set 2".into())));
        assert_eq!(parse("t cooldown").unwrap(), Command::Toggle(Some("cooldown".into())));
        assert_eq!(parse("START").unwrap(), Command::Start(None));
    }

    #[test]
    fn test_plain_commands() {
        assert_eq!(parse("stop").unwrap(), Command::Stop);
        assert_eq!(parse("p").unwrap(), Command::Pause);
        assert_eq!(parse("l").unwrap(), Command::Lap);
        assert_eq!(parse("reset").unwrap(), Command::Reset);
        assert_eq!(parse("?").unwrap(), Command::Status);
        assert_eq!(parse("q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_file_commands() {
        assert_eq!(
            parse("export /tmp/run.json").unwrap(),
            Command::Export(PathBuf::from("/tmp/run.json"))
        );
        assert_eq!(parse("import run.json").unwrap(), Command::Import(PathBuf::from("run.json")));
        assert!(parse("export").is_err());
    }

    #[test]
    fn test_unknown() {
        let err = parse("launch").unwrap_err();
        assert_eq!(err.to_string(), "unknown command: launch");
    }
}
