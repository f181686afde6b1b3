//! Gateway client and interaction dispatch
//!
//! Connects to the Discord gateway, registers the guild's slash commands on
//! ready, and routes command and button interactions to their handlers. A
//! handler error never crashes the dispatcher; the user gets an ephemeral
//! follow-up with an opaque reference token instead.

use std::sync::Arc;

use serenity::all::{
    Client, Context, CreateInteractionResponseFollowup, EventHandler, GatewayIntents, GuildId,
    Interaction, Ready,
};
use serenity::async_trait;

use scoutlink_common::{AppConfig, AppError};
use scoutlink_core::SnowflakeGenerator;
use scoutlink_db::{create_pool, PgUserRepository};
use scoutlink_extranet::ExtranetClient;
use scoutlink_service::{RunAsRegistry, ServiceContext, ServiceContextBuilder};
use tracing::{error, info};

use crate::commands;

/// Shared bot state handed to every interaction handler
pub struct Bot {
    services: ServiceContext,
    guild_id: GuildId,
    rules_url: Option<String>,
}

impl Bot {
    /// Create a new Bot
    pub fn new(services: ServiceContext, guild_id: GuildId, rules_url: Option<String>) -> Self {
        Self {
            services,
            guild_id,
            rules_url,
        }
    }

    /// Get the service context
    pub fn services(&self) -> &ServiceContext {
        &self.services
    }

    /// Get the guild this bot manages
    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Get the configured rules page URL, if any
    pub fn rules_url(&self) -> Option<&str> {
        self.rules_url.as_deref()
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "Logged in to Discord");

        match self
            .guild_id
            .set_commands(&ctx.http, commands::definitions())
            .await
        {
            Ok(registered) => info!(count = registered.len(), "Slash commands registered"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                let result = match command.data.name.as_str() {
                    "verify" => commands::verify::run(self, &ctx, &command).await,
                    "link-discord" => commands::link_discord::run(self, &ctx, &command).await,
                    "minecraft" => commands::minecraft::run(self, &ctx, &command).await,
                    "nickname" => commands::nickname::run(self, &ctx, &command).await,
                    "rules" => commands::rules::run(self, &ctx, &command).await,
                    "run-as" => commands::run_as::run(self, &ctx, &command).await,
                    "help" => commands::help::run(self, &ctx, &command).await,
                    _ => Ok(()),
                };

                if let Err(e) = result {
                    error!(command = %command.data.name, error = %e, "Command failed");
                    let followup = CreateInteractionResponseFollowup::new()
                        .content(e.user_message())
                        .ephemeral(true);
                    if let Err(e) = command.create_followup(&ctx.http, followup).await {
                        error!(error = %e, "Failed to deliver error follow-up");
                    }
                }
            }
            Interaction::Component(component)
                if component.data.custom_id == commands::rules::ACCEPT_BUTTON_ID =>
            {
                if let Err(e) = commands::rules::accept(self, &ctx, &component).await {
                    error!(error = %e, "Rules acceptance failed");
                    let followup = CreateInteractionResponseFollowup::new()
                        .content(e.user_message())
                        .ephemeral(true);
                    if let Err(e) = component.create_followup(&ctx.http, followup).await {
                        error!(error = %e, "Failed to deliver error follow-up");
                    }
                }
            }
            _ => {}
        }
    }
}

/// Initialize dependencies and build the bot state
pub async fn create_bot(config: &AppConfig) -> Result<Bot, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = scoutlink_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    scoutlink_db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let user_repo = Arc::new(PgUserRepository::new(pool));
    let verifier = Arc::new(ExtranetClient::new(&config.extranet)?);
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));
    let run_as = Arc::new(RunAsRegistry::from_config(&config.run_as));

    let services = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .verifier(verifier)
        .snowflake_generator(snowflake_generator)
        .run_as(run_as)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(Bot::new(
        services,
        GuildId::new(config.discord.guild_id),
        config.discord.rules_url.clone(),
    ))
}

/// Run the bot until the gateway connection ends
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let token = config.discord.token.clone();
    let bot = create_bot(&config).await?;

    let mut client = Client::builder(&token, GatewayIntents::GUILDS)
        .event_handler(bot)
        .await
        .map_err(|e| AppError::Config(format!("Failed to build Discord client: {e}")))?;

    client
        .start()
        .await
        .map_err(|e| AppError::ExternalService(format!("Discord gateway error: {e}")))?;

    Ok(())
}
