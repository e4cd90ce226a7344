use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "restate")]
#[command(about = "Browse Restate property listings and manage your account")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name holding the Appwrite configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, register, and manage the current session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Browse property listings
    #[command(alias = "props")]
    Properties {
        #[command(subcommand)]
        command: PropertyCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email and password
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account and request a verification email
    Register {
        #[arg(long, value_name = "NAME")]
        name: String,
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign out the current session
    Logout,
    /// Show the signed-in user
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Confirm an email address from a verification link
    Verify {
        /// Full verification link (restate://verify-email?userId=..&secret=..)
        #[arg(long, value_name = "URL", conflicts_with_all = ["user_id", "secret"])]
        link: Option<String>,
        #[arg(long, value_name = "ID", requires = "secret")]
        user_id: Option<String>,
        #[arg(long, value_name = "SECRET", requires = "user_id")]
        secret: Option<String>,
    },
    /// Print the URL that starts an OAuth2 login in a browser
    OauthUrl {
        /// OAuth2 provider (google, apple, github, facebook)
        #[arg(long, default_value = "google")]
        provider: String,
        /// Where the provider should redirect after login
        #[arg(long, value_name = "URL", default_value = "restate://oauth")]
        redirect: String,
    },
    /// Finish an OAuth2 login from the redirect URL
    OauthComplete {
        /// Redirect URL containing userId and secret
        callback_url: String,
    },
}

#[derive(Subcommand)]
pub enum PropertyCommands {
    /// Show the first listings ever published
    Latest {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List listings, newest first
    List {
        /// Property type to match ("All" for every type)
        #[arg(long, default_value = "All")]
        filter: String,
        /// Text searched in name, address, and type
        #[arg(short, long, default_value = "")]
        query: String,
        /// Maximum number of listings
        #[arg(short, long)]
        limit: Option<usize>,
        /// Number of listings to skip
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single listing
    Get {
        /// Document id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Appwrite API endpoint
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
        #[arg(long, value_name = "ID")]
        project_id: Option<String>,
        #[arg(long, value_name = "ID")]
        database_id: Option<String>,
        #[arg(long, value_name = "ID")]
        properties_collection_id: Option<String>,
        #[arg(long, value_name = "ID")]
        galleries_collection_id: Option<String>,
        #[arg(long, value_name = "ID")]
        reviews_collection_id: Option<String>,
        #[arg(long, value_name = "ID")]
        agents_collection_id: Option<String>,
        /// Link target for verification emails
        #[arg(long, value_name = "URL")]
        verification_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the effective configuration for a profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
