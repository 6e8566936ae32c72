use anyhow::Result;
use carepoint_auth::{Credentials, Requester, SessionView, SignInFlow, SignInOutcome};
use colored::Colorize;

use crate::app::App;
use crate::cli::SignInArgs;
use crate::commands::pages;
use crate::output::print_success;

pub async fn sign_in(app: &App, args: &SignInArgs) -> Result<()> {
    let landing = pages::landing_page(&app.config().routes, args.next.as_deref());
    if app.pages.find(landing).is_none() {
        anyhow::bail!("Unknown page: {landing}. Run `carepoint pages` to list pages");
    }
    let exchange = app.exchange()?;
    let credentials = Credentials::new(args.email.clone(), args.password.clone());
    let requester = Requester::new();

    // Success and failure notices are printed by the exchange itself.
    let outcome = SignInFlow::new(&exchange, &app.session)
        .run(&credentials, &requester.handle())
        .await
        .map_err(|e| anyhow::anyhow!("Sign-in failed ({})", e.category()))?;

    match outcome {
        SignInOutcome::Committed {
            identity,
            persist_error,
        } => {
            if let Some(email) = &identity.email {
                println!("{}: {}", "Account".cyan(), email);
            }
            if let Some(e) = persist_error {
                println!(
                    "{} session could not be saved ({e}); it ends with this command",
                    "!".yellow()
                );
            }
            pages::open(app, landing)?;
        }
        SignInOutcome::Discarded => {}
    }
    Ok(())
}

pub fn sign_out(app: &App) -> Result<()> {
    if !app.session.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    app.session.sign_out()?;
    print_success("Signed out");
    Ok(())
}

pub fn whoami(app: &App, profile: &str) -> Result<()> {
    println!("{}: {}", "Profile".cyan(), profile);
    match app.session.token() {
        Some(token) => {
            println!("{}: {}", "Status".cyan(), "signed in".green());
            println!("{}: {}", "Token".cyan(), token.preview());
        }
        None => {
            println!("{}: {}", "Status".cyan(), "signed out".red());
            println!("Run `carepoint sign-in --email <EMAIL>` to start a session.");
        }
    }
    if let Some(jar) = &app.config().cookie.jar_path {
        println!("{}: {}", "Cookie jar".cyan(), jar.display());
    }
    Ok(())
}
