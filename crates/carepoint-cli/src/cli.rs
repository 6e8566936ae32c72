use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "carepoint")]
#[command(about = "CarePoint CLI: sign in and open protected pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config profile name
    #[arg(short, long, global = true, env = "CAREPOINT_PROFILE", default_value = "default")]
    pub profile: String,

    /// Identity provider API key (overrides the profile)
    #[arg(long, global = true, env = "CAREPOINT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Identity provider base URL (overrides the profile)
    #[arg(long, global = true, env = "CAREPOINT_IDP_URL")]
    pub idp_url: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    SignIn(SignInArgs),
    /// Sign out (remove the session cookie)
    SignOut,
    /// Show the current session
    Whoami,
    /// Open a page; protected pages require a session
    Open(OpenArgs),
    /// List known pages
    Pages,
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct SignInArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,
    /// Account password
    #[arg(long, env = "CAREPOINT_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Page to open after signing in (defaults to routes.after_sign_in)
    #[arg(long)]
    pub next: Option<String>,
}

#[derive(clap::Args)]
pub struct OpenArgs {
    /// Page path (e.g. /appointments)
    pub page: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key (endpoint, api_key, allow_http, timeout, cookie_name, jar_path, sign_in, after_sign_in)
    pub key: String,
    /// Value
    pub value: String,
}
