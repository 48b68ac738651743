//! User-facing notice texts.
//!
//! Every message the bot sends is produced here so that handlers only decide
//! *which* notice goes to *whom*.

use std::fmt;
use std::str::FromStr;

/// Language the bot speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(format!("Invalid BOT_LANGUAGE: {}. Must be one of: [\"ru\", \"en\"]", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notice catalogue for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn registered(&self) -> &'static str {
        match self.locale {
            Locale::Ru => "Вы успешно зарегистрированы в Random Coffee!",
            Locale::En => "You have successfully joined Random Coffee!",
        }
    }

    pub fn already_registered(&self) -> &'static str {
        match self.locale {
            Locale::Ru => "Вы уже зарегистрированы!",
            Locale::En => "You are already registered!",
        }
    }

    pub fn not_enough_participants(&self) -> &'static str {
        match self.locale {
            Locale::Ru => "Недостаточно участников для мэтчинга.",
            Locale::En => "Not enough participants to make matches.",
        }
    }

    /// Tells a participant who they were paired with
    pub fn partner(&self, username: &str) -> String {
        match self.locale {
            Locale::Ru => format!("Ваш партнёр для Random Coffee: @{}", username),
            Locale::En => format!("Your Random Coffee partner: @{}", username),
        }
    }

    pub fn no_partner(&self) -> &'static str {
        match self.locale {
            Locale::Ru => "К сожалению, не нашлось пары для вас в этом раунде.",
            Locale::En => "Sorry, there was no partner for you this round.",
        }
    }

    pub fn unknown_command(&self) -> &'static str {
        match self.locale {
            Locale::Ru => "Неизвестная команда",
            Locale::En => "Unknown command",
        }
    }

    pub fn failure(&self) -> &'static str {
        match self.locale {
            Locale::Ru => "Что-то пошло не так, попробуйте позже.",
            Locale::En => "Something went wrong, please try again later.",
        }
    }

    /// Stand-in when a partner has no username on file
    pub fn placeholder_name(&self) -> &'static str {
        match self.locale {
            Locale::Ru => "пользователь",
            Locale::En => "user",
        }
    }
}
