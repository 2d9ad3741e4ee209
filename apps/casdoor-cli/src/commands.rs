use anyhow::{Context, Result};
use casdoor_sdk::{CasdoorClient, User, UsersApi};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct NameArgs {
    /// User name within the configured organization
    pub name: String,
}

#[derive(Args)]
pub struct FileArgs {
    /// JSON file holding the user record
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct RedirectArgs {
    #[arg(long)]
    pub redirect_uri: String,
}

#[derive(Args)]
pub struct SignupArgs {
    /// Use the password signup form instead of the OAuth flow
    #[arg(long)]
    pub password: bool,
    #[arg(long, default_value = "")]
    pub redirect_uri: String,
}

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub state: String,
}

#[derive(Args)]
pub struct ParseTokenArgs {
    pub token: String,
}

pub async fn list(client: &CasdoorClient) -> Result<String> {
    let users = client.get_users().await.context("failed to list users")?;
    tracing::info!(count = users.len(), "fetched users");
    Ok(serde_json::to_string_pretty(&users)?)
}

pub async fn get(client: &CasdoorClient, args: &NameArgs) -> Result<String> {
    let user = client
        .get_user(&args.name)
        .await
        .with_context(|| format!("failed to fetch user '{}'", args.name))?;
    match user {
        Some(user) => Ok(serde_json::to_string_pretty(&user)?),
        None => anyhow::bail!("user '{}' not found", args.name),
    }
}

pub async fn add(client: &CasdoorClient, args: &FileArgs) -> Result<String> {
    let user = read_user(&args.file)?;
    let added = client.add_user(&user).await.context("failed to add user")?;
    Ok(outcome("added", &user, added))
}

pub async fn update(client: &CasdoorClient, args: &FileArgs) -> Result<String> {
    let user = read_user(&args.file)?;
    let updated = client
        .update_user(&user)
        .await
        .context("failed to update user")?;
    Ok(outcome("updated", &user, updated))
}

pub async fn delete(client: &CasdoorClient, args: &NameArgs) -> Result<String> {
    let user = User::new(client.config().organization_name(), args.name.as_str());
    let deleted = client
        .delete_user(&user)
        .await
        .context("failed to delete user")?;
    Ok(outcome("deleted", &user, deleted))
}

pub async fn token(client: &CasdoorClient, args: &TokenArgs) -> Result<String> {
    let token = client
        .get_oauth_token(&args.code, &args.state)
        .await
        .context("token exchange failed")?;
    Ok(token.access_token)
}

pub fn parse_token(client: &CasdoorClient, args: &ParseTokenArgs) -> Result<String> {
    let claims = client
        .parse_jwt_token(&args.token)
        .context("token rejected")?;
    Ok(serde_json::to_string_pretty(&claims)?)
}

fn read_user(path: &Path) -> Result<User> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid user record", path.display()))
}

fn outcome(verb: &str, user: &User, changed: bool) -> String {
    if changed {
        format!("{verb} {}/{}", user.owner, user.name)
    } else {
        format!("no change: {}/{} was not {verb}", user.owner, user.name)
    }
}
