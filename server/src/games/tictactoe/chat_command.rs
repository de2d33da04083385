use common::games::tictactoe::Mark;

pub const HELP_TEXT: &str = "Commands: \
/x [name] - play as X, \
/o [name] - play as O, \
/n name - change your name, \
/n - list online users, \
/rank - show standings, \
/ai - play against the computer, \
/stop - stop playing against the computer, \
/check - show the round result, \
/reset - start over, \
/help - this message";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Reset,
    ClaimRole { mark: Mark, name: Option<&'a str> },
    Rename(&'a str),
    ListParticipants,
    Rank,
    ActivateAutomated,
    StopAutomated,
    Check,
    Help,
    Unknown(&'a str),
    Say(&'a str),
    Empty,
}

/// Splits on the first whitespace; the command word must match exactly.
pub fn parse_chat(text: &str) -> ChatCommand<'_> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ChatCommand::Empty;
    }
    if !trimmed.starts_with('/') {
        return ChatCommand::Say(trimmed);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };
    let argument = if rest.is_empty() { None } else { Some(rest) };

    match (word, argument) {
        ("/reset", None) => ChatCommand::Reset,
        ("/x", name) => ChatCommand::ClaimRole { mark: Mark::X, name },
        ("/o", name) => ChatCommand::ClaimRole { mark: Mark::O, name },
        ("/n", Some(name)) => ChatCommand::Rename(name),
        ("/n", None) | ("/u", None) => ChatCommand::ListParticipants,
        ("/rank", None) => ChatCommand::Rank,
        ("/ai", None) => ChatCommand::ActivateAutomated,
        ("/stop", None) => ChatCommand::StopAutomated,
        ("/check", None) => ChatCommand::Check,
        ("/help", None) => ChatCommand::Help,
        _ => ChatCommand::Unknown(word),
    }
}
