//! /verify - verify a scout membership and link it to the invoking account

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    EditInteractionResponse,
};

use scoutlink_core::traits::ScoutCredentials;
use scoutlink_core::UserDescriptor;
use scoutlink_service::VerificationService;
use tracing::info;

use crate::bot::Bot;
use crate::error::BotResult;
use crate::member_sync;

use super::{required_str_option, str_option};

pub fn definition() -> CreateCommand {
    CreateCommand::new("verify")
        .description("Verify your scout membership")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "rego",
                "Your membership number (checked against the registry)",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "firstname",
                "Your first name as registered",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "lastname",
                "Your last name as registered",
            )
            .required(true),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::String,
            "nickname",
            "Display name to use instead of your full first name",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::String,
            "minecraftusername",
            "Your Minecraft username",
        ))
}

pub async fn run(bot: &Bot, ctx: &Context, command: &CommandInteraction) -> BotResult<()> {
    command.defer(&ctx.http).await?;

    let rego = required_str_option(command, "rego")?;
    let credentials = ScoutCredentials {
        membership_number: rego.to_string(),
        firstname: required_str_option(command, "firstname")?.to_string(),
        lastname: required_str_option(command, "lastname")?.to_string(),
    };
    let descriptor =
        UserDescriptor::by_discord(command.user.id.to_string()).with_membership_fallback(rego);

    let service = VerificationService::new(bot.services());
    let record = match service.verify(&credentials, &descriptor).await {
        Ok((user, record)) => {
            info!(user_id = %user.id, "membership verified via Discord");
            record
        }
        Err(e) if e.is_member_not_verified() => {
            command
                .edit_response(
                    &ctx.http,
                    EditInteractionResponse::new().content(
                        "No current member matched those details. \
                         Check your membership number and name spelling, then try again.",
                    ),
                )
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(nickname) = str_option(command, "nickname") {
        service.set_nickname(nickname, &descriptor).await?;
    }
    if let Some(username) = str_option(command, "minecraftusername") {
        service.link_minecraft_username(username, &descriptor).await?;
    }

    // Running /verify counts as accepting the rules
    service.record_rule_acceptance(&descriptor).await?;

    command
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new().content(format!(
                "Verified: {}. Recording and linking now.",
                record.detail.member_status
            )),
        )
        .await?;

    member_sync::sync_after_command(bot, ctx, command).await;
    Ok(())
}
