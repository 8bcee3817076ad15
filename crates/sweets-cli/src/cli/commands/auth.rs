//! Auth command handlers.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use secrecy::SecretString;
use sweets_core::View;
use sweets_core::config::paths;
use sweets_core::session::{NewAccount, Session};

use crate::app::App;

/// Reads one line from stdin, prompting on stderr when interactive.
fn read_secret(prompt: &str) -> Result<SecretString> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("{prompt}: ");
        io::stderr().flush()?;
    }

    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    Ok(SecretString::from(
        line.trim_end_matches(['\r', '\n']).to_string(),
    ))
}

pub async fn register(app: &mut App, username: String, email: String) -> Result<()> {
    let password = read_secret("Password")?;
    let password_confirmation = read_secret("Confirm password")?;

    let account = NewAccount {
        username,
        email,
        password,
        password_confirmation,
    };
    let view = app.session().register(&account).await?;

    println!("✓ Account created for {}", account.username);
    app.navigate(view).await
}

pub async fn login(app: &mut App, username: &str) -> Result<()> {
    let password = read_secret("Password")?;
    let view = app.session().login(username, &password).await?;

    if view == View::Inventory {
        println!("✓ Logged in as {username}");
    }
    app.navigate(view).await
}

pub async fn logout(app: &mut App) -> Result<()> {
    let was_authenticated = app.session().is_authenticated();
    let view = app.session().logout();

    if was_authenticated {
        println!("✓ Logged out");
        println!(
            "  Credential removed from: {}",
            paths::credentials_path().display()
        );
    } else {
        println!("Not logged in (no credential found).");
    }
    app.navigate(view).await
}

pub fn status(app: &App) {
    match app.session().session() {
        Session::Authenticated(credential) => {
            println!("Authenticated (token: {})", credential.masked());
        }
        Session::Anonymous => println!("Anonymous"),
    }
    println!("Server: {}", app.session().api().base_url());
}
