//! Slash command definitions and option helpers

use serenity::all::{CommandInteraction, CreateCommand, UserId};

use crate::error::BotError;

pub mod help;
pub mod link_discord;
pub mod minecraft;
pub mod nickname;
pub mod rules;
pub mod run_as;
pub mod verify;

/// Every slash command this bot registers on the guild
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        verify::definition(),
        link_discord::definition(),
        minecraft::definition(),
        nickname::definition(),
        rules::definition(),
        run_as::definition(),
        help::definition(),
    ]
}

/// Get a string option by name
pub(crate) fn str_option<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| option.value.as_str())
}

/// Get a required string option or fail
pub(crate) fn required_str_option<'a>(
    command: &'a CommandInteraction,
    name: &'static str,
) -> Result<&'a str, BotError> {
    str_option(command, name).ok_or(BotError::MissingOption(name))
}

/// Get a user option by name
pub(crate) fn user_option(command: &CommandInteraction, name: &str) -> Option<UserId> {
    command
        .data
        .options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| option.value.as_user_id())
}
