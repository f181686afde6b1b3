//! /link-discord - attach this Discord account to a web-verified membership

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    EditInteractionResponse,
};

use scoutlink_service::VerificationService;

use crate::bot::Bot;
use crate::error::BotResult;
use crate::member_sync;

use super::required_str_option;

pub fn definition() -> CreateCommand {
    CreateCommand::new("link-discord")
        .description("Link your Discord account to a membership you verified on the website")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "rego",
                "Your membership number",
            )
            .required(true),
        )
}

pub async fn run(bot: &Bot, ctx: &Context, command: &CommandInteraction) -> BotResult<()> {
    command.defer(&ctx.http).await?;

    let rego = required_str_option(command, "rego")?;
    let discord_id = command.user.id.to_string();

    let service = VerificationService::new(bot.services());
    let user = service.link_discord(rego, &discord_id).await?;

    let message = match user {
        Some(user) if user.scout_member.is_some() => {
            "Linked! Your website verification now covers this Discord account."
        }
        _ => {
            "We couldn't find a verified membership under that number. \
             Verify on the website first, or run /verify here."
        }
    };
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(message))
        .await?;

    member_sync::sync_after_command(bot, ctx, command).await;
    Ok(())
}
