use clap::Subcommand;
use kettle_core::storage::Database;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Show recorded kettle messages, newest first
    Show {
        /// Maximum number of messages
        #[arg(short, long)]
        limit: Option<u32>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all recorded messages
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HistoryAction::Show { limit, json } => {
            let messages = db.messages(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&messages)?);
            } else {
                for record in &messages {
                    println!(
                        "{:>5}  {}  {}",
                        record.id,
                        record.date.as_deref().unwrap_or("-"),
                        record.message
                    );
                }
            }
        }
        HistoryAction::Clear => {
            let removed = db.clear()?;
            println!("removed {removed} messages");
        }
    }
    Ok(())
}
