//! /help - command overview

use serenity::all::{
    CommandInteraction, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};

use crate::bot::Bot;
use crate::error::BotResult;

const HELP_TEXT: &str = "\
**Community helper**

`/verify rego firstname lastname` - link your scout membership to this Discord account
`/rules` - read the rules and accept them
`/link-discord rego` - link this account to a membership verified on the website
`/minecraft username` - link your Minecraft username
`/nickname nickname` - set the display name used instead of your full first name
`/help` - this message";

pub fn definition() -> CreateCommand {
    CreateCommand::new("help").description("Show help text")
}

pub async fn run(_bot: &Bot, ctx: &Context, command: &CommandInteraction) -> BotResult<()> {
    let response = CreateInteractionResponseMessage::new().content(HELP_TEXT);
    command
        .create_response(&ctx.http, CreateInteractionResponse::Message(response))
        .await?;
    Ok(())
}
