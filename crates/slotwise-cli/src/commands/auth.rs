use clap::Subcommand;
use slotwise_core::integrations::GoogleCalendar;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a Google Calendar access token in the OS keyring
    SetToken {
        /// OAuth access token with calendar scope
        token: String,
    },
    /// Remove the stored token
    Clear,
    /// Check whether a token is available
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::SetToken { token } => {
            let token = token.trim();
            if token.is_empty() {
                return Err("token must not be empty".into());
            }
            GoogleCalendar::store_token(token)?;
            println!("Google token stored");
        }
        AuthAction::Clear => {
            GoogleCalendar::clear_token()?;
            println!("Google token removed");
        }
        AuthAction::Status => {
            println!(
                "{}",
                if GoogleCalendar::has_token() {
                    "authenticated"
                } else {
                    "not authenticated"
                }
            );
        }
    }
    Ok(())
}
