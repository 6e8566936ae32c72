mod app;
mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use app::App;
use cli::{Cli, Commands, ConfigCommands};
use config::ConfigDir;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    let profile = &cli.profile;
    let config_dir = ConfigDir::home()?;

    match &cli.command {
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => show_config(&config_dir, profile)?,
            ConfigCommands::Set(set_args) => {
                let mut cfg = config_dir.load_profile(profile)?;
                config::set_key(&mut cfg, &set_args.key, &set_args.value)?;
                config_dir.save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
        Commands::SignIn(args) => {
            let app = load_app(&cli, &config_dir)?;
            commands::auth::sign_in(&app, args).await?;
        }
        Commands::SignOut => commands::auth::sign_out(&load_app(&cli, &config_dir)?)?,
        Commands::Whoami => commands::auth::whoami(&load_app(&cli, &config_dir)?, profile)?,
        Commands::Open(args) => commands::pages::open(&load_app(&cli, &config_dir)?, &args.page)?,
        Commands::Pages => commands::pages::list(&load_app(&cli, &config_dir)?),
    }

    Ok(())
}

fn load_app(cli: &Cli, config_dir: &ConfigDir) -> Result<App> {
    let mut cfg = config_dir.load_profile(&cli.profile)?;
    config::apply_overrides(&mut cfg, cli.api_key.as_deref(), cli.idp_url.as_deref());
    tracing::debug!(profile = %cli.profile, endpoint = %cfg.identity.endpoint, "Loaded profile");
    Ok(App::from_config(cfg))
}

fn show_config(config_dir: &ConfigDir, profile: &str) -> Result<()> {
    let cfg = config_dir.load_profile(profile)?;
    println!("{}: {}", "Profile".cyan(), profile);
    println!("{}: {}", "Endpoint".cyan(), cfg.identity.endpoint);
    let api_key = if cfg.identity.api_key.is_empty() {
        "(not set)"
    } else {
        "(set)"
    };
    println!("{}: {}", "API key".cyan(), api_key);
    println!(
        "{}: {}",
        "Timeout".cyan(),
        humantime::format_duration(cfg.identity.request_timeout)
    );
    println!("{}: {}", "Cookie".cyan(), cfg.cookie.name);
    if let Some(jar) = &cfg.cookie.jar_path {
        println!("{}: {}", "Cookie jar".cyan(), jar.display());
    }
    println!("{}: {}", "Sign-in page".cyan(), cfg.routes.sign_in);
    println!("{}: {}", "After sign-in".cyan(), cfg.routes.after_sign_in);
    println!("{}: {}", "Config dir".cyan(), config_dir.root().display());
    Ok(())
}
