//! /nickname - set the display name used instead of the registered first name

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
    CreateCommand::new("nickname")
        .description("Update your nickname")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "nickname", "Your new nickname")
                .required(true),
        )
}

pub async fn run(bot: &Bot, ctx: &Context, command: &CommandInteraction) -> BotResult<()> {
    command.defer(&ctx.http).await?;

    let nickname = required_str_option(command, "nickname")?;
    let descriptor = UserDescriptor::by_discord(command.user.id.to_string());
    let service = VerificationService::new(bot.services());

    match service.ensure_rules_accepted(&descriptor).await {
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

    service.set_nickname(nickname, &descriptor).await?;

    command
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new().content("Nickname updated."),
        )
        .await?;

    member_sync::sync_after_command(bot, ctx, command).await;
    Ok(())
}
