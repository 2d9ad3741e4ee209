mod commands;
mod logging;

use anyhow::{Context, Result};
use casdoor_sdk::{AuthConfig, CasdoorClient};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Manage users of a Casdoor organization
#[derive(Parser)]
#[command(name = "casdoor")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML configuration file (`CASDOOR__*` variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all users of the organization
    List,
    /// Show one user
    Get(commands::NameArgs),
    /// Create a user from a JSON file
    Add(commands::FileArgs),
    /// Replace a user from a JSON file
    Update(commands::FileArgs),
    /// Delete a user
    Delete(commands::NameArgs),
    /// Print the signin URL for a redirect target
    SigninUrl(commands::RedirectArgs),
    /// Print the signup URL
    SignupUrl(commands::SignupArgs),
    /// Exchange an authorization code for tokens
    Token(commands::TokenArgs),
    /// Verify a JWT and print its claims
    ParseToken(commands::ParseTokenArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = AuthConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let client = CasdoorClient::new(config).context("failed to build Casdoor client")?;

    let output = match cli.command {
        Commands::List => commands::list(&client).await?,
        Commands::Get(args) => commands::get(&client, &args).await?,
        Commands::Add(args) => commands::add(&client, &args).await?,
        Commands::Update(args) => commands::update(&client, &args).await?,
        Commands::Delete(args) => commands::delete(&client, &args).await?,
        Commands::SigninUrl(args) => client.signin_url(&args.redirect_uri),
        Commands::SignupUrl(args) => client.signup_url(args.password, &args.redirect_uri),
        Commands::Token(args) => commands::token(&client, &args).await?,
        Commands::ParseToken(args) => commands::parse_token(&client, &args)?,
    };

    println!("{output}");
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_and_subcommand() {
        let cli = Cli::try_parse_from(["casdoor", "-vv", "--config", "casdoor.yaml", "get", "alice"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("casdoor.yaml")));
        assert!(matches!(cli.command, Commands::Get(ref args) if args.name == "alice"));
    }

    #[test]
    fn add_requires_a_file() {
        assert!(Cli::try_parse_from(["casdoor", "add"]).is_err());
        let cli = Cli::try_parse_from(["casdoor", "add", "--file", "user.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Add(_)));
    }

    #[test]
    fn signup_url_defaults_to_oauth_flow() {
        let cli = Cli::try_parse_from([
            "casdoor",
            "signup-url",
            "--redirect-uri",
            "https://app.example.com/cb",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::SignupUrl(ref args) if !args.password));
    }
}
