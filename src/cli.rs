use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "igrelay")]
#[command(author, version, about = "Telegram bot that relays Instagram posts, reels and IGTV videos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Resolve a link and print its media references without downloading
    Resolve {
        /// Instagram post, reel or IGTV link
        url: String,

        /// Print the references as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
