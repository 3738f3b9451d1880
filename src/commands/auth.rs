//! Account and navigation command handlers

use colored::Colorize;

use crate::api::{ApiClient, User};
use crate::error::{Result, VoxdashError};
use crate::routes::{guard, Navigation, Route};
use crate::store::KeyValueStore;

/// Log in and print the resulting user
///
/// # Errors
///
/// Returns the login error when credentials are rejected or the API is down
pub async fn login<S: KeyValueStore>(
    client: &ApiClient<S>,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let user = client.login(username, password).await?;
    match &user {
        Some(user) => println!("{} Logged in as {}", "✓".green(), user.username.cyan()),
        None => println!(
            "{} Logged in, but the user profile could not be loaded",
            "!".yellow()
        ),
    }
    Ok(user)
}

/// Create an account
///
/// # Errors
///
/// Returns the API error when the account cannot be created
pub async fn register<S: KeyValueStore>(
    client: &ApiClient<S>,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    let user = client.register(username, email, password).await?;
    println!(
        "{} Registered {} (id {}); log in to continue",
        "✓".green(),
        user.username.cyan(),
        user.id
    );
    Ok(user)
}

/// Forget stored tokens
///
/// # Errors
///
/// Returns error if the store rejects a removal
pub fn logout<S: KeyValueStore>(client: &ApiClient<S>) -> Result<()> {
    client.logout()?;
    println!("{} Logged out", "✓".green());
    Ok(())
}

/// Print the logged-in user
///
/// # Errors
///
/// Returns `VoxdashError::Authentication` when nobody is logged in, or the
/// API error from loading the profile
pub async fn whoami<S: KeyValueStore>(client: &ApiClient<S>) -> Result<User> {
    if !client.is_logged_in() {
        return Err(VoxdashError::Authentication("Not logged in".to_string()).into());
    }
    let user = client.current_user().await?;
    println!("\nCurrent User\n");
    println!("ID:        {}", user.id);
    println!("Username:  {}", user.username);
    println!("Email:     {}", user.email.as_deref().unwrap_or("-"));
    println!();
    Ok(user)
}

/// Resolve a path through the route guard and print the outcome
///
/// # Errors
///
/// Returns `VoxdashError::Config` when the path names no known route
pub fn navigate<S: KeyValueStore>(client: &ApiClient<S>, path: &str) -> Result<Navigation> {
    let target = Route::from_path(path).ok_or_else(|| {
        VoxdashError::Config(format!(
            "Unknown route '{}'; known routes: {}",
            path,
            Route::ALL.map(Route::path).join(", ")
        ))
    })?;

    let outcome = guard(target, client.is_logged_in());
    match outcome {
        Navigation::Proceed(route) => println!("{} {}", "→".green(), route),
        Navigation::Redirect(route) => {
            println!("{} {} (redirected from {})", "↪".yellow(), route, target)
        }
    }
    Ok(outcome)
}
