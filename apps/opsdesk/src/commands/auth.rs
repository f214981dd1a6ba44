use anyhow::{Context, Result};

use opsdesk_auth::{IdentitySession, OidcSession};

pub async fn login(session: &OidcSession) -> Result<()> {
    session
        .signin_redirect()
        .await
        .context("failed to start sign-in")?;
    println!("After signing in, run: opsdesk callback '<redirect URL>'");
    Ok(())
}

pub async fn callback(session: &OidcSession, url: &str) -> Result<()> {
    session
        .complete_signin(url)
        .await
        .context("failed to complete sign-in")?;
    let who = session
        .claims()
        .and_then(|c| c.email.or(c.name).or(c.sub))
        .unwrap_or_else(|| "unknown user".to_owned());
    println!("Signed in as {who}");
    Ok(())
}

pub async fn logout(session: &OidcSession) -> Result<()> {
    session.signout_redirect().await.context("failed to sign out")?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(session: &OidcSession) {
    if !session.is_authenticated() {
        println!("Not signed in");
        return;
    }
    let claims = session.claims().unwrap_or_default();
    let field = |value: Option<String>| value.unwrap_or_else(|| "-".to_owned());
    println!("Name:    {}", field(claims.name));
    println!("Email:   {}", field(claims.email));
    println!("Subject: {}", field(claims.sub));
    match session.expires_at() {
        Some(at) if session.id_token().is_none() => {
            println!("Expires: {at} (expired, refreshed on next request)");
        }
        Some(at) => println!("Expires: {at}"),
        None => {}
    }
}
