//! Guild member projection
//!
//! After any identity-changing interaction, the resolved User is projected
//! to a nickname and a managed-role set, and the live guild member is
//! brought in line. Only roles in `MANAGED_ROLES` are ever added or
//! removed. Permission failures are reported back to the user as ephemeral
//! follow-ups, never raised.

use serenity::all::{
    CommandInteraction, ComponentInteraction, Context, CreateInteractionResponseFollowup,
    EditMember, UserId,
};

use scoutlink_core::UserDescriptor;
use scoutlink_service::{Projector, MANAGED_ROLES};
use tracing::{error, warn};

use crate::bot::Bot;
use crate::error::BotResult;

/// Reconcile the guild member for the invoking (or acted-as) user
///
/// Returns user-facing warnings for the pieces that could not be applied.
pub async fn sync(bot: &Bot, ctx: &Context, invoker: UserId) -> BotResult<Vec<String>> {
    let descriptor = UserDescriptor::by_discord(invoker.to_string());
    let projection = Projector::new(bot.services()).project(&descriptor).await?;

    // Under an act-as override the projection may target another member
    let Some(discord_id) = projection
        .discord_id
        .as_deref()
        .and_then(|id| id.parse::<u64>().ok())
    else {
        return Ok(Vec::new());
    };
    let target = UserId::new(discord_id);
    let member = bot.guild_id().member(&ctx.http, target).await?;

    let mut warnings = Vec::new();

    if let Some(nickname) = &projection.nickname {
        if member.nick.as_deref() != Some(nickname.as_str()) {
            if let Err(e) = bot
                .guild_id()
                .edit_member(&ctx.http, target, EditMember::new().nickname(nickname))
                .await
            {
                warn!(error = %e, nickname, "failed to update nickname");
                warnings.push("I don't have permission to change your nickname.".to_string());
            }
        }
    }

    let guild_roles = bot.guild_id().roles(&ctx.http).await?;
    for (role_id, role) in &guild_roles {
        if !MANAGED_ROLES.contains(&role.name.as_str()) {
            continue;
        }
        let should_have = projection.roles.iter().any(|r| r == &role.name);
        let has = member.roles.contains(role_id);

        let result = if should_have && !has {
            member.add_role(&ctx.http, *role_id).await
        } else if !should_have && has {
            member.remove_role(&ctx.http, *role_id).await
        } else {
            continue;
        };
        if let Err(e) = result {
            warn!(error = %e, role = %role.name, "failed to reconcile role");
            warnings.push("I don't have permission to change your roles.".to_string());
            break;
        }
    }

    Ok(warnings)
}

/// Sync after a slash command, reporting problems as ephemeral follow-ups
pub async fn sync_after_command(bot: &Bot, ctx: &Context, command: &CommandInteraction) {
    match sync(bot, ctx, command.user.id).await {
        Ok(warnings) => {
            for warning in warnings {
                let followup = CreateInteractionResponseFollowup::new()
                    .content(warning)
                    .ephemeral(true);
                if let Err(e) = command.create_followup(&ctx.http, followup).await {
                    error!(error = %e, "failed to deliver sync warning");
                }
            }
        }
        Err(e) => error!(error = %e, "member sync failed"),
    }
}

/// Sync after a button press, reporting problems as ephemeral follow-ups
pub async fn sync_after_component(bot: &Bot, ctx: &Context, component: &ComponentInteraction) {
    match sync(bot, ctx, component.user.id).await {
        Ok(warnings) => {
            for warning in warnings {
                let followup = CreateInteractionResponseFollowup::new()
                    .content(warning)
                    .ephemeral(true);
                if let Err(e) = component.create_followup(&ctx.http, followup).await {
                    error!(error = %e, "failed to deliver sync warning");
                }
            }
        }
        Err(e) => error!(error = %e, "member sync failed"),
    }
}
