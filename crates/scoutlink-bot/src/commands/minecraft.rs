//! /minecraft - link a Minecraft username to the invoking account

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    EditInteractionResponse,
};

use scoutlink_core::{DomainError, UserDescriptor};
use scoutlink_service::{ServiceError, VerificationService};

use crate::bot::Bot;
use crate::error::BotResult;
use crate::member_sync;

use super::required_str_option;

pub fn definition() -> CreateCommand {
    CreateCommand::new("minecraft")
        .description("Link your Minecraft username")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "username",
                "Your Minecraft username",
            )
            .required(true),
        )
}

pub async fn run(bot: &Bot, ctx: &Context, command: &CommandInteraction) -> BotResult<()> {
    command.defer(&ctx.http).await?;

    let username = required_str_option(command, "username")?;
    let gate = UserDescriptor::by_discord(command.user.id.to_string());
    let service = VerificationService::new(bot.services());

    match service.ensure_rules_accepted(&gate).await {
        Ok(_) => {}
        Err(ServiceError::Domain(
            DomainError::UserDisagreesWithRules | DomainError::UserNotFound,
        )) => {
            command
                .edit_response(
                    &ctx.http,
                    EditInteractionResponse::new()
                        .content("Please read /rules and accept them first."),
                )
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let descriptor = gate.with_minecraft_fallback(username);
    service.link_minecraft_username(username, &descriptor).await?;

    command
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new().content("Linked your Minecraft username."),
        )
        .await?;

    member_sync::sync_after_command(bot, ctx, command).await;
    Ok(())
}
