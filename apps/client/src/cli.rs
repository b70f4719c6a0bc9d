//! Command-line interface for the headless client.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "career-client")]
#[command(about = "Headless driver for the career recommendation dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a resume and analyse the extracted profile
    Upload {
        /// Resume file (PDF, DOC, DOCX or TXT, at most 5MB)
        path: PathBuf,
    },

    /// Analyse a manually entered profile
    Analyze {
        /// Comma-separated skills
        #[arg(short, long, default_value = "")]
        skills: String,

        /// Comma-separated interests
        #[arg(short, long, default_value = "")]
        interests: String,

        /// Highest education level
        #[arg(short, long, default_value = "")]
        education: String,

        /// Years of experience
        #[arg(short, long, default_value = "")]
        years: String,
    },

    /// Feedback history
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },

    /// Search live job listings for a set of skills and interests
    Jobs {
        /// Comma-separated skills
        #[arg(short, long, default_value = "")]
        skills: String,

        /// Comma-separated interests
        #[arg(short, long, default_value = "")]
        interests: String,
    },

    /// Score a password the way the registration form does
    Strength { password: String },
}

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// List submitted feedback
    List,
    /// Delete one feedback entry
    Delete { id: String },
}
