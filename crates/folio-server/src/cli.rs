//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use folio_common::models::{JobStatus, MessageFilter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Portfolio content management over Appwrite", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database, collections, and buckets, then write .env.local
    Setup(SetupArgs),

    /// Run the public HTTP API
    Serve,

    /// Manage portfolio projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Read and triage contact messages
    Messages {
        #[command(subcommand)]
        command: MessageCommand,
    },

    /// Job application tracker
    Jobs {
        #[command(subcommand)]
        command: JobCommand,
    },

    /// CV documents
    Cvs {
        #[command(subcommand)]
        command: CvCommand,
    },

    /// Account sessions
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Appwrite endpoint including /v1
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Appwrite project ID
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,

    /// Server API key with databases and storage scopes
    #[arg(long, value_name = "KEY", env = "APPWRITE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Where to write the dashboard environment file
    #[arg(long, value_name = "PATH", default_value = ".env.local")]
    pub env_file: PathBuf,

    /// Also write the API key (as FOLIO__APPWRITE__API_KEY) to the env file
    #[arg(long)]
    pub save_key: bool,

    /// Fail instead of prompting for missing values
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects, newest first
    List {
        /// Case-insensitive filter on name, description, and technologies
        #[arg(long)]
        search: Option<String>,

        /// Only featured projects
        #[arg(long)]
        featured: bool,
    },

    /// Add a project with its images
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// Technology tag (repeatable)
        #[arg(long = "tech", value_name = "TAG")]
        technologies: Vec<String>,

        #[arg(long, value_name = "URL")]
        github_url: Option<String>,

        #[arg(long, value_name = "URL")]
        live_url: Option<String>,

        #[arg(long)]
        featured: bool,

        /// Cover image file
        #[arg(long, value_name = "PATH")]
        cover: Option<PathBuf>,

        /// Gallery image file (repeatable, kept in order)
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,
    },

    /// Delete a project and its images
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MessageCommand {
    /// List messages in one inbox view
    List {
        #[arg(long, default_value = "all", value_parser = parse_filter)]
        filter: MessageFilter,

        #[arg(long)]
        search: Option<String>,
    },

    /// Mark a message read (or unread)
    Read {
        id: String,

        #[arg(long)]
        unread: bool,
    },

    /// Archive a message (or restore it)
    Archive {
        id: String,

        #[arg(long)]
        restore: bool,
    },

    /// Delete a message permanently
    Delete {
        id: String,
    },

    /// Keep the inbox fresh, fetching at most once per poll interval
    Watch,
}

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// Show the Kanban board
    Board,

    /// Counts per status
    Stats,

    /// Track a new application
    Add {
        #[arg(long)]
        company: String,

        #[arg(long)]
        position: String,

        #[arg(long, default_value = "wishlist", value_parser = parse_status)]
        status: JobStatus,

        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// ID of the CV sent with the application
        #[arg(long, value_name = "CV_ID")]
        cv: Option<String>,
    },

    /// Move an application to another column
    Move {
        id: String,

        #[arg(value_parser = parse_status)]
        status: JobStatus,
    },

    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CvCommand {
    List,

    /// Upload a PDF, Word, or text CV
    Upload {
        name: String,

        path: PathBuf,
    },

    /// Make a CV the default
    Default {
        id: String,
    },

    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Check credentials by opening and closing a session
    Login {
        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

fn parse_filter(s: &str) -> Result<MessageFilter, String> {
    s.parse()
}

fn parse_status(s: &str) -> Result<JobStatus, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_job_move() {
        let cli = Cli::try_parse_from(["folio", "jobs", "move", "abc", "interview"]).unwrap();
        match cli.command {
            Command::Jobs { command: JobCommand::Move { id, status } } => {
                assert_eq!(id, "abc");
                assert_eq!(status, JobStatus::Interview);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(Cli::try_parse_from(["folio", "jobs", "move", "abc", "ghosted"]).is_err());
    }

    #[test]
    fn message_filter_defaults_to_all() {
        let cli = Cli::try_parse_from(["folio", "messages", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Messages { command: MessageCommand::List { filter: MessageFilter::All, .. } }
        ));
    }

    #[test]
    fn repeatable_project_images() {
        let cli = Cli::try_parse_from([
            "folio", "projects", "add", "--name", "Demo", "--description", "Desc",
            "--tech", "Rust", "--tech", "Axum", "--image", "a.png", "--image", "b.png",
        ])
        .unwrap();
        let Command::Projects { command: ProjectCommand::Add { technologies, images, .. } } =
            cli.command
        else {
            panic!("expected projects add");
        };
        assert_eq!(technologies, vec!["Rust", "Axum"]);
        assert_eq!(images.len(), 2);
    }
}
