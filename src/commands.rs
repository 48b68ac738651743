use crate::telegram::Message;

/// A recognised bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/join`: register the sender
    Join,
    /// `/match`: run a pairing round
    Match,
    /// Any other command token
    Unknown(String),
}

impl Command {
    /// Parse a `/token[@bot]` prefix.
    ///
    /// Returns `None` when the text is not a command or is addressed to a
    /// different bot.
    pub fn parse(command_text: &str, bot_username: Option<&str>) -> Option<Self> {
        let body = command_text.strip_prefix('/')?;
        let (token, target) = match body.split_once('@') {
            Some((token, target)) => (token, Some(target)),
            None => (body, None),
        };

        if let (Some(target), Some(ours)) = (target, bot_username) {
            if !target.eq_ignore_ascii_case(ours) {
                return None;
            }
        }

        let command = match token.to_lowercase().as_str() {
            "start" | "join" => Command::Join,
            "match" => Command::Match,
            _ => Command::Unknown(token.to_string()),
        };

        Some(command)
    }

    /// Command carried by a message, `None` for ordinary chatter
    pub fn from_message(message: &Message, bot_username: Option<&str>) -> Option<Self> {
        Self::parse(message.command_text()?, bot_username)
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Join => "join",
            Command::Match => "match",
            Command::Unknown(token) => token,
        }
    }
}
