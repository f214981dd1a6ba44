use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use console::{Closed, ProfilesScreen, Table};
use opsdesk_sdk::{CredentialType, ParseEnumError, Platform};
use opsdesk_utils::SecretString;

use super::team::loaded_rows;
use crate::context::{Console, cancel_on_ctrl_c};

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// List cloud provider profiles of the selected company
    List,
    /// Create a profile
    Add(AddArgs),
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Cloud platform; only GCP is offered
    #[arg(long, default_value = "GCP", value_parser = selectable_platform)]
    platform: Platform,
    /// Defaults to the platform's first credential type
    #[arg(long)]
    credential_type: Option<CredentialType>,
    /// JSON credential document (plain or base64)
    #[arg(long, conflicts_with = "credential_file", required_unless_present = "credential_file")]
    credential_data: Option<String>,
    /// Read the credential document from a file
    #[arg(long)]
    credential_file: Option<PathBuf>,
}

fn selectable_platform(value: &str) -> Result<Platform, String> {
    let platform: Platform = value.parse().map_err(|e: ParseEnumError| e.to_string())?;
    if Platform::selectable().contains(&platform) {
        Ok(platform)
    } else {
        Err(format!("{} is not available", platform.display_name()))
    }
}

pub async fn run(console: &Console, company: Option<&str>, command: ProfileCommand) -> Result<()> {
    console.select_company(company).await?;
    let mut screen = ProfilesScreen::new(console.api.clone(), console.companies.context());
    cancel_on_ctrl_c(screen.cancellation_token());

    match command {
        ProfileCommand::List => {
            screen.refresh().await;
            list(&screen)
        }
        ProfileCommand::Add(args) => add(&mut screen, args).await,
    }
}

fn list(screen: &ProfilesScreen) -> Result<()> {
    let rows = loaded_rows(screen.state())?;
    if rows.is_empty() {
        println!("No profiles");
        return Ok(());
    }
    let mut table = Table::new([
        "ID",
        "NAME",
        "PLATFORM",
        "CREDENTIAL TYPE",
        "DESCRIPTION",
        "CREATED BY",
        "CREATED",
        "UPDATED",
    ]);
    for row in rows {
        table.push([
            row.id.as_str(),
            row.name.as_str(),
            row.platform.as_str(),
            row.credential_type.as_str(),
            row.description.as_str(),
            row.created_by.as_str(),
            row.created_at.as_str(),
            row.updated_at.as_str(),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}

async fn add(screen: &mut ProfilesScreen, args: AddArgs) -> Result<()> {
    let credential_data = match (args.credential_data, &args.credential_file) {
        (Some(data), _) => data,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => String::new(),
    };

    let mut modal = screen.add_profile_modal();
    modal.open();
    let form = modal.form_mut();
    form.name = args.name;
    form.description = args.description;
    form.set_platform(args.platform);
    if let Some(credential_type) = args.credential_type {
        form.credential_type = Some(credential_type);
    }
    form.credential_data = SecretString::new(credential_data);

    let created = modal.submit().await.context("profile not created")?;
    if let Some(profile) = &created {
        println!("Created profile {} ({})", profile.name, profile.id);
    }
    screen.profile_created(Closed::Submitted(created)).await;
    if let Some(toast) = screen.toast() {
        println!("{}", toast.message);
    }
    Ok(())
}
