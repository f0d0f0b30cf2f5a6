use clap::{Parser, Subcommand};

#[derive(Subcommand, Clone, PartialEq, Eq, Debug)]
pub enum Command {
    /// Open the interactive feed (default)
    Feed,
    /// Print your own posts
    Mine,
    /// Print the posts you liked
    Liked,
    /// Print a page of your deleted posts
    Deleted {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,
    },
    /// Restore a deleted post
    Restore { id: String },
    /// Comment on one of your own or liked posts; opens $EDITOR without text
    Comment { id: String, text: Option<String> },
    /// Delete one of your posts
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Store a session token for later runs
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Forget the stored session
    Logout,
}

#[derive(Parser, Debug, Default)]
#[command(
    about = concat!(env!("CARGO_CRATE_NAME"), " - terminal client for a social feed"),
)]
pub struct Flags {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Flags {
    /// Parse from `std::env::args_os()`, exit on error.
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_feed() {
        let flags = Flags::try_parse_from(["feedtui"]).unwrap();
        assert_eq!(flags.command(), Command::Feed);
        assert!(!flags.verbose);
    }

    #[test]
    fn deleted_takes_pagination() {
        let flags = Flags::try_parse_from(["feedtui", "deleted", "--page", "2", "--limit", "5"]).unwrap();
        assert_eq!(flags.command(), Command::Deleted { page: 2, limit: Some(5) });
    }

    #[test]
    fn zero_page_is_rejected() {
        assert!(Flags::try_parse_from(["feedtui", "deleted", "--page", "0"]).is_err());
    }

    #[test]
    fn delete_with_yes() {
        let flags = Flags::try_parse_from(["feedtui", "-v", "delete", "p1", "--yes"]).unwrap();
        assert!(flags.verbose);
        assert_eq!(flags.command(), Command::Delete { id: "p1".into(), yes: true });
    }
}
