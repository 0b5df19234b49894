//! Account commands: login, register, logout, whoami

use crate::client::DocaiClient;
use crate::error::{DocaiError, Result};
use colored::Colorize;
use dialoguer::Password;

/// Returns the supplied password or asks for one on the terminal.
fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let entered = Password::new().with_prompt("Password").interact()?;
    Ok(entered)
}

fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(DocaiError::InvalidInput("username is empty".to_string()).into());
    }
    Ok(())
}

/// Logs in and stores the credential.
pub async fn login(client: &DocaiClient, username: &str, password: Option<String>) -> Result<()> {
    validate_username(username)?;
    let password = resolve_password(password)?;
    client.login(username, &password).await?;
    println!("{}", format!("Logged in as {}", username).green());
    Ok(())
}

/// Registers an account and stores the credential.
pub async fn register(
    client: &DocaiClient,
    username: &str,
    password: Option<String>,
) -> Result<()> {
    validate_username(username)?;
    let password = resolve_password(password)?;
    client.register(username, &password).await?;
    println!("{}", format!("Registered and logged in as {}", username).green());
    Ok(())
}

/// Forgets the stored credential.
pub fn logout(client: &DocaiClient) -> Result<()> {
    client.logout()?;
    println!("{}", "Logged out".green());
    Ok(())
}

/// Prints the account behind the stored credential.
pub async fn whoami(client: &DocaiClient) -> Result<()> {
    let profile = client.whoami().await?;
    println!("{} (id {})", profile.username.bold(), profile.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplied_password_skips_prompt() {
        assert_eq!(resolve_password(Some("pw".to_string())).unwrap(), "pw");
    }

    #[test]
    fn test_blank_username_rejected() {
        assert!(validate_username("  ").is_err());
        assert!(validate_username("ada").is_ok());
    }
}
