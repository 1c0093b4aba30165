use clap::Subcommand;
use curfew_core::PreferenceRepository;

use super::open_preferences;

#[derive(Subcommand)]
pub enum RulesAction {
    /// List rules, longest lead time first
    List,
    /// Add a rule
    Add {
        /// Minutes before curfew start
        minutes: u32,
        /// Notification text (generated when omitted)
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Change an existing rule
    Edit {
        /// Current lead time of the rule
        minutes: u32,
        /// New lead time
        #[arg(long)]
        to: Option<u32>,
        /// New notification text
        #[arg(long)]
        message: Option<String>,
    },
    /// Delete a rule
    Remove {
        minutes: u32,
    },
    /// Enable a rule
    Enable {
        minutes: u32,
    },
    /// Disable a rule
    Disable {
        minutes: u32,
    },
}

pub fn run(action: RulesAction) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = open_preferences()?;
    let mut rules = prefs.load_rules();

    match action {
        RulesAction::List => {
            println!("{}", serde_json::to_string_pretty(&rules.sorted_desc())?);
            return Ok(());
        }
        RulesAction::Add { minutes, message } => {
            rules.add(minutes, &message)?;
            eprintln!("Rule added: {minutes} min");
        }
        RulesAction::Edit {
            minutes,
            to,
            message,
        } => {
            let current = rules
                .get(minutes)
                .ok_or_else(|| format!("no rule for {minutes} minutes before curfew"))?;
            let message = message.unwrap_or_else(|| current.message.clone());
            let new_minutes = to.unwrap_or(minutes);
            rules.edit(minutes, new_minutes, &message)?;
            eprintln!("Rule updated: {new_minutes} min");
        }
        RulesAction::Remove { minutes } => {
            rules.remove(minutes)?;
            eprintln!("Rule removed: {minutes} min");
        }
        RulesAction::Enable { minutes } => {
            rules.set_enabled(minutes, true)?;
            eprintln!("Rule enabled: {minutes} min");
        }
        RulesAction::Disable { minutes } => {
            rules.set_enabled(minutes, false)?;
            eprintln!("Rule disabled: {minutes} min");
        }
    }

    prefs.save_rules(&rules)?;
    Ok(())
}
