//! /run-as - operator-only act-as override
//!
//! With a user argument, subsequent commands from the operator resolve and
//! project as that user; without one, the operator's override is cleared.

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateInteractionResponse, CreateInteractionResponseMessage, Permissions,
};

use crate::bot::Bot;
use crate::error::BotResult;

use super::user_option;

pub fn definition() -> CreateCommand {
    CreateCommand::new("run-as")
        .description("For admin use only: run commands as another user")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(CreateCommandOption::new(
            CommandOptionType::User,
            "user",
            "The user to run commands as; omit to clear",
        ))
}

pub async fn run(bot: &Bot, ctx: &Context, command: &CommandInteraction) -> BotResult<()> {
    let operator = command.user.id.to_string();
    let registry = bot.services().run_as();

    let content = match user_option(command, "user") {
        Some(target) => {
            registry.set_override(operator, target.to_string());
            format!("Okay, your commands now run as <@{target}> until cleared.")
        }
        None => {
            registry.clear_override(&operator);
            "Override cleared; your commands run as yourself again.".to_string()
        }
    };

    let response = CreateInteractionResponseMessage::new()
        .content(content)
        .ephemeral(true);
    command
        .create_response(&ctx.http, CreateInteractionResponse::Message(response))
        .await?;
    Ok(())
}
