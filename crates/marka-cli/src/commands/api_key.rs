//! API key management command
//!
//! Creates API keys programmatically with a specified role scope.
//! Useful for automation and CI/CD pipelines.

use clap::Args;
use colored::Colorize;
use marka_auth::{ApiKeyService, CreateApiKeyRequest, CreateUserRequest, UserService};
use tracing::debug;

/// Output format for the API key command
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors and formatting
    #[default]
    Text,
    /// JSON output for automation and scripting
    Json,
}

#[derive(Args)]
pub struct ApiKeyCommand {
    /// Database connection URL
    #[arg(long, env = "MARKA_DATABASE_URL")]
    pub database_url: String,

    /// Name for the API key (for identification)
    #[arg(long)]
    pub name: String,

    /// Username of the user owning the key; created when missing
    #[arg(long)]
    pub username: String,

    /// Email address, required when the user does not exist yet
    #[arg(long)]
    pub email: Option<String>,

    /// Role scope for the key
    /// Valid scopes: role:admin, role:manager, role:employee, role:client, role:user
    #[arg(long, default_value = "role:admin")]
    pub role: String,

    /// Expiration in days (default: 365 days / 1 year)
    #[arg(long)]
    pub expires_in_days: Option<i64>,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

impl ApiKeyCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        debug!("Creating API key with role: {}", self.role);

        let rt = tokio::runtime::Runtime::new()?;
        let db = rt
            .block_on(marka_database::establish_connection(&self.database_url))
            .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

        let user_service = UserService::new(db.clone());

        // Find the owning user, provisioning it when missing
        let user = rt.block_on(async {
            match user_service
                .get_user_by_username(&self.username)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to look up user: {}", e))?
            {
                Some(user) => Ok(user),
                None => {
                    let email = self.email.clone().ok_or_else(|| {
                        anyhow::anyhow!(
                            "User '{}' does not exist; pass --email to create it",
                            self.username
                        )
                    })?;

                    debug!("Creating user '{}' for the API key", self.username);
                    user_service
                        .create_user(CreateUserRequest {
                            auth_id: format!("cli:{}", self.username),
                            email,
                            username: self.username.clone(),
                            roles: Some(vec![self.role.clone()]),
                        })
                        .await
                        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))
                }
            }
        })?;

        debug!(
            "Creating API key for user: {} (id: {})",
            user.username, user.id
        );

        let expires_at = self
            .expires_in_days
            .map(|days| chrono::Utc::now() + chrono::Duration::days(days));

        let api_key_service = ApiKeyService::new(db.clone());

        let request = CreateApiKeyRequest {
            name: self.name.clone(),
            role: Some(self.role.clone()),
            scopes: None,
            expires_at,
        };

        let response = rt
            .block_on(api_key_service.create_api_key(user.id, request))
            .map_err(|e| anyhow::anyhow!("Failed to create API key: {}", e))?;

        match self.output_format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "id": response.id,
                    "name": response.name,
                    "api_key": response.api_key,
                    "key_prefix": response.key_prefix,
                    "role": response.role,
                    "scopes": response.scopes,
                    "user_id": user.id,
                    "username": user.username,
                    "expires_at": response.expires_at,
                    "created_at": response.created_at,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!();
                println!(
                    "{}",
                    "   API key created successfully!".bright_white().bold()
                );
                println!();
                println!(
                    "{:>12} {}",
                    "Name:".bright_white().bold(),
                    response.name.bright_cyan()
                );
                println!(
                    "{:>12} {}",
                    "Role:".bright_white().bold(),
                    response.role.as_deref().unwrap_or("inherited").bright_cyan()
                );
                println!(
                    "{:>12} {}",
                    "User:".bright_white().bold(),
                    user.username.bright_cyan()
                );
                if let Some(expires) = response.expires_at {
                    println!(
                        "{:>12} {}",
                        "Expires:".bright_white().bold(),
                        expires
                            .format("%Y-%m-%d %H:%M:%S UTC")
                            .to_string()
                            .bright_cyan()
                    );
                }
                println!();
                println!(
                    "{:>12} {}",
                    "API Key:".bright_white().bold(),
                    response.api_key.bright_yellow().bold()
                );
                println!();
                println!(
                    "{}",
                    "IMPORTANT: Save this API key now!".bright_yellow().bold()
                );
                println!(
                    "{}",
                    "This is the only time it will be displayed.".bright_white()
                );
                println!();
            }
        }

        Ok(())
    }
}
