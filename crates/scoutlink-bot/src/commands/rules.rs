//! /rules - show the community rules and record acceptance
//!
//! The command replies with a link to the rules page and an accept button;
//! pressing the button records acceptance (creating the User if this is
//! their first contact) and re-projects their member presentation.

use serenity::all::{
    ButtonStyle, CommandInteraction, ComponentInteraction, Context, CreateActionRow, CreateButton,
    CreateCommand, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
};

use scoutlink_core::UserDescriptor;
use scoutlink_service::VerificationService;
use tracing::info;

use crate::bot::Bot;
use crate::error::BotResult;
use crate::member_sync;

/// Custom ID of the acceptance button
pub const ACCEPT_BUTTON_ID: &str = "rules-accept";

pub fn definition() -> CreateCommand {
    CreateCommand::new("rules").description("The rules to abide by while in this community")
}

pub async fn run(bot: &Bot, ctx: &Context, command: &CommandInteraction) -> BotResult<()> {
    let mut buttons = Vec::new();
    if let Some(url) = bot.rules_url() {
        buttons.push(CreateButton::new_link(url).label("Take me there"));
    }
    buttons.push(
        CreateButton::new(ACCEPT_BUTTON_ID)
            .label("I accept the rules")
            .style(ButtonStyle::Primary),
    );

    let response = CreateInteractionResponseMessage::new()
        .content("The community rules are on our website. Accept them below to get verified.")
        .components(vec![CreateActionRow::Buttons(buttons)]);
    command
        .create_response(&ctx.http, CreateInteractionResponse::Message(response))
        .await?;

    let descriptor = UserDescriptor::by_discord(command.user.id.to_string());
    let service = VerificationService::new(bot.services());
    if service.has_accepted_rules(&descriptor).await? {
        let followup = CreateInteractionResponseFollowup::new()
            .content("By the way, you have already accepted the rules.")
            .ephemeral(true);
        command.create_followup(&ctx.http, followup).await?;
    }

    Ok(())
}

/// Handle a press of the accept button
pub async fn accept(bot: &Bot, ctx: &Context, component: &ComponentInteraction) -> BotResult<()> {
    let descriptor = UserDescriptor::by_discord(component.user.id.to_string());
    let user = VerificationService::new(bot.services())
        .record_rule_acceptance(&descriptor)
        .await?;
    info!(user_id = %user.id, "rules accepted via button");

    let response = CreateInteractionResponseMessage::new()
        .content("Thanks for accepting our rules.")
        .ephemeral(true);
    component
        .create_response(&ctx.http, CreateInteractionResponse::Message(response))
        .await?;

    member_sync::sync_after_component(bot, ctx, component).await;
    Ok(())
}
