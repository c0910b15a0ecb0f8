//! Login, registration and logout.

use std::io::{self, Write};

use qkart_storefront::views;

use super::{CommandError, Context};

/// `qkart login -u <username> [-p <password>]`
pub async fn login(
    ctx: &Context,
    username: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let [password] = read_passwords(password, ["Password: "]).await?;

    let Some(session) = ctx.login_page().login(username, &password).await else {
        return Err(CommandError::Unsuccessful("login failed"));
    };

    let mut out = io::stdout().lock();
    write!(out, "Logged in as {}", session.username().unwrap_or(username))?;
    if let Some(balance) = session.balance() {
        write!(out, " (wallet balance {balance})")?;
    }
    writeln!(out)?;
    Ok(())
}

/// `qkart register -u <username> [-p <password>]`
pub async fn register(
    ctx: &Context,
    username: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let [password, confirm] =
        read_passwords(password, ["Password: ", "Confirm password: "]).await?;

    if ctx
        .register_page()
        .register(username, &password, &confirm)
        .await
    {
        Ok(())
    } else {
        Err(CommandError::Unsuccessful("registration failed"))
    }
}

/// `qkart logout`
pub fn logout(ctx: &Context) -> Result<(), CommandError> {
    views::logout(ctx.store(), ctx.notifications(), ctx.history())?;
    Ok(())
}

/// Passwords from the terminal with echo off, unless one was given on the
/// command line.
async fn read_passwords<const N: usize>(
    given: Option<String>,
    labels: [&'static str; N],
) -> io::Result<[String; N]> {
    tokio::task::spawn_blocking(move || {
        collect_passwords(given, labels, |label| rpassword::prompt_password(label))
    })
    .await
    .map_err(io::Error::other)?
}

/// One password per label: the given value for each, or one prompt each.
fn collect_passwords<const N: usize>(
    given: Option<String>,
    labels: [&str; N],
    mut prompt: impl FnMut(&str) -> io::Result<String>,
) -> io::Result<[String; N]> {
    let mut passwords: [String; N] = std::array::from_fn(|_| String::new());
    for (password, label) in passwords.iter_mut().zip(labels) {
        *password = match &given {
            Some(given) => given.clone(),
            None => prompt(label)?,
        };
    }
    Ok(passwords)
}
