pub mod auth;
pub mod profiles;
pub mod team;

use anyhow::Result;

use console::{NAV_ITEMS, Table};

use crate::config::AppConfig;
use crate::context::Console;

pub fn nav() {
    let mut table = Table::new(["MENU", "PATH"]);
    for item in &NAV_ITEMS {
        table.push([item.label, item.path]);
    }
    print!("{}", table.render());
}

pub async fn companies(console: &Console, preferred: Option<&str>) -> Result<()> {
    let selected = console.select_company(preferred).await?;
    let mut table = Table::new(["", "ID", "NAME", "DESCRIPTION"]);
    let companies = console.companies.context().companies();
    for company in companies.as_slice() {
        let marker = if company.id == selected.id { "*" } else { "" };
        table.push([
            marker,
            company.id.as_str(),
            company.name.as_str(),
            company.description.as_deref().unwrap_or(opsdesk_sdk::EMPTY_CELL),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}

pub fn print_config(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}

pub fn check(config: &AppConfig) -> Result<()> {
    config.validate()?;
    if config.oidc.is_none() {
        tracing::warn!("no oidc section; only offline commands will work");
    }
    println!("Configuration is valid");
    Ok(())
}
