use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use console::{Closed, ScreenState, Table, TeamScreen};
use opsdesk_utils::SecretString;

use crate::context::{Console, cancel_on_ctrl_c};

#[derive(Subcommand)]
pub enum TeamCommand {
    /// List members of the selected company
    List,
    /// Create a user and add it to the team
    Add(AddArgs),
    /// Change name or role of a member
    Edit(EditArgs),
    /// Remove a member from the team
    Remove(RemoveArgs),
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    /// Initial password, at least 6 characters
    #[arg(long)]
    password: String,
    /// Access level, e.g. admin or viewer
    #[arg(long)]
    role: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Member (access) id as shown by `team list`
    member_id: String,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    role: Option<String>,
}

#[derive(Args)]
pub struct RemoveArgs {
    member_id: String,
    /// Confirm the removal
    #[arg(long)]
    yes: bool,
}

pub async fn run(console: &Console, company: Option<&str>, command: TeamCommand) -> Result<()> {
    console.select_company(company).await?;
    let mut screen = TeamScreen::new(console.api.clone(), console.companies.context());
    cancel_on_ctrl_c(screen.cancellation_token());
    screen.refresh().await;

    match command {
        TeamCommand::List => list(&screen),
        TeamCommand::Add(args) => add(&mut screen, args).await,
        TeamCommand::Edit(args) => edit(&mut screen, args).await,
        TeamCommand::Remove(args) => remove(&mut screen, &args).await,
    }
}

fn list(screen: &TeamScreen) -> Result<()> {
    let rows = loaded_rows(screen.state())?;
    if rows.is_empty() {
        println!("No team members");
        return Ok(());
    }
    let mut table = Table::new(["ID", "NAME", "ROLE", "EMAIL"]);
    for row in rows {
        table.push([
            row.id.as_str(),
            row.name.as_str(),
            row.role.as_str(),
            row.email.as_str(),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}

async fn add(screen: &mut TeamScreen, args: AddArgs) -> Result<()> {
    let mut modal = screen.add_member_modal();
    modal.open().await;
    let form = modal.form_mut();
    form.first_name = args.first_name;
    form.last_name = args.last_name;
    form.email = args.email;
    form.password = SecretString::new(args.password);
    form.level = args.role;

    let access = modal.submit().await.context("member not added")?;
    println!("Added {} ({})", access.user.display_name(), access.id);
    screen.member_added(Closed::Submitted(access)).await;
    Ok(())
}

async fn edit(screen: &mut TeamScreen, args: EditArgs) -> Result<()> {
    let mut modal = screen
        .edit_member_modal(&args.member_id)
        .with_context(|| format!("no team member with id '{}'", args.member_id))?;
    modal.open().await;
    let form = modal.form_mut();
    if let Some(first_name) = args.first_name {
        form.first_name = first_name;
    }
    if let Some(last_name) = args.last_name {
        form.last_name = last_name;
    }
    if let Some(role) = args.role {
        form.level = role;
    }

    let access = modal.submit().await.context("member not updated")?;
    println!("Updated {} ({})", access.user.display_name(), access.level.label());
    screen.member_updated(Closed::Submitted(access)).await;
    Ok(())
}

async fn remove(screen: &mut TeamScreen, args: &RemoveArgs) -> Result<()> {
    let confirmation = screen
        .request_delete(&args.member_id)
        .with_context(|| format!("no team member with id '{}'", args.member_id))?;
    if !args.yes {
        println!("{}", confirmation.message());
        anyhow::bail!("not removed; re-run with --yes to confirm");
    }
    screen
        .confirm_delete(confirmation)
        .await
        .context("member not removed")?;
    if let Some(toast) = screen.toast() {
        println!("{}", toast.message);
    }
    Ok(())
}

/// Rows of a finished fetch, or the fetch error.
pub fn loaded_rows<T>(state: &ScreenState<T>) -> Result<&[T]> {
    match state {
        ScreenState::Ready(rows) => Ok(rows.as_slice()),
        ScreenState::Failed(message) => anyhow::bail!("{message}"),
        ScreenState::Idle => anyhow::bail!("no company selected"),
        ScreenState::Loading => anyhow::bail!("interrupted"),
    }
}
