//! Line commands understood by the interactive front end.

use clap::{Args, Parser, Subcommand};

use crate::controller::FormState;
use crate::notifications::NotificationId;

pub const HELP: &str = "\
Commands:
  to <addresses>    set recipients (comma-separated)
  prompt <text>     describe the email to generate
  generate          generate a draft from the prompt
  draft <text>      replace the draft (use \\n for line breaks)
  send              send the draft to every recipient
  show              print the form
  dismiss <id>      dismiss a notification
  help              print this help
  quit              exit";

#[derive(Parser, Debug)]
#[command(multicall = true, disable_help_subcommand = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set recipients (comma-separated)
    To(Text),
    /// Describe the email to generate
    Prompt(Text),
    /// Replace the draft
    Draft(Text),
    #[command(alias = "g")]
    Generate,
    #[command(alias = "s")]
    Send,
    Show,
    #[command(alias = "d")]
    Dismiss { id: NotificationId },
    #[command(alias = "?")]
    Help,
    #[command(aliases = ["exit", "q"])]
    Quit,
}

/// Free text following a command word.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Text {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    words: Vec<String>,
}

impl Text {
    pub fn as_line(&self) -> String {
        self.words.join(" ")
    }

    /// The text with `\n` escapes turned into line breaks.
    pub fn unescaped(&self) -> String {
        self.as_line().replace("\\n", "\n")
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// The command word is case-insensitive; arguments are split on whitespace
/// and rejoined with single spaces.
pub fn parse_line(line: &str) -> Result<Option<Command>, clap::Error> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };

    let argv = std::iter::once(word.to_ascii_lowercase()).chain(words.map(str::to_string));
    Line::try_parse_from(argv).map(|line| Some(line.command))
}

/// Plain-text rendering of the form.
pub fn render(form: &FormState) -> String {
    let lane = |busy: bool| if busy { "busy" } else { "idle" };
    let mut out = format!(
        "Recipients: {}\nPrompt:     {}\nGenerate:   {}\nSend:       {}",
        form.recipients,
        form.prompt,
        lane(form.generating),
        lane(form.sending),
    );
    if form.editor_visible {
        out.push_str("\n--- draft ---\n");
        out.push_str(&form.draft);
        out.push_str("\n-------------");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &str) -> String {
        match parse_line(line).unwrap() {
            Some(Command::To(text) | Command::Prompt(text)) => text.as_line(),
            Some(Command::Draft(text)) => text.unescaped(),
            other => panic!("expected a text command, got {other:?}"),
        }
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(text_of("to  a@b.com, c@d.com "), "a@b.com, c@d.com");
        assert_eq!(text_of("prompt Write a thank-you note"), "Write a thank-you note");
        assert_eq!(text_of("prompt 20% off - say it twice"), "20% off - say it twice");
        assert_eq!(text_of("draft Hi,\\n\\nBye"), "Hi,\n\nBye");
        assert_eq!(text_of("to"), "");
    }

    #[test]
    fn parses_bare_commands_and_aliases() {
        assert_eq!(parse_line("GENERATE").unwrap(), Some(Command::Generate));
        assert_eq!(parse_line("g").unwrap(), Some(Command::Generate));
        assert_eq!(parse_line("s").unwrap(), Some(Command::Send));
        assert_eq!(parse_line("show").unwrap(), Some(Command::Show));
        assert_eq!(parse_line("?").unwrap(), Some(Command::Help));
        assert_eq!(parse_line("exit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_line("q").unwrap(), Some(Command::Quit));
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(parse_line("frobnicate now").is_err());
        assert!(parse_line("send extra").is_err());
    }

    #[test]
    fn dismiss_needs_an_id() {
        assert_eq!(
            parse_line("dismiss n-4").unwrap(),
            Some(Command::Dismiss {
                id: "n-4".parse().unwrap()
            })
        );
        assert_eq!(
            parse_line("d 9").unwrap(),
            Some(Command::Dismiss {
                id: "n-9".parse().unwrap()
            })
        );
        assert!(parse_line("dismiss soon").is_err());
        assert!(parse_line("dismiss").is_err());
    }

    #[test]
    fn render_hides_draft_until_editor_is_visible() {
        let mut form = FormState {
            draft: "Dear Sam".into(),
            ..FormState::default()
        };
        assert!(!render(&form).contains("Dear Sam"));

        form.editor_visible = true;
        assert!(render(&form).contains("Dear Sam"));
    }
}
