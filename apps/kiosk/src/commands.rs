//! Line commands typed at the kiosk prompt.

use shared::{
    domain::{Category, Cents, DrinkOption, Mood},
    error::OptionError,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskCommand {
    Category(Category),
    Option(DrinkOption),
    Sweetness(i32),
    Ice(i32),
    Shots(i32),
    Addon { name: String, price: Cents },
    DropAddon(String),
    Mood(Mood),
    Name(String),
    Phone(String),
    Pickup(String),
    Next,
    Back,
    Review,
    Confirm,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("type a command, or 'help'")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' needs a value")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a whole number")]
    InvalidNumber(String),
    #[error(transparent)]
    Option(#[from] OptionError),
}

pub const HELP: &str = "\
commands:
  category <token>        pick a drink family (e.g. latte, cold-brew)
  size <small|medium|large>
  milk <whole|skim|oat|almond|soy>
  sweetness <0-100>       ice <0-100>
  shots <+N|-N>           adjust espresso shots (0-5)
  addon <name> <price>    drop <name>
  mood <energetic|relaxing|focus>
  name <text>             phone <text>
  pickup <asap|30min|1hour|2hours|custom>
  next  back  review  confirm  help  quit";

pub fn parse_command(line: &str) -> Result<KioskCommand, CommandError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let verb = verb.to_ascii_lowercase();
    let command = match verb.as_str() {
        "" => return Err(CommandError::Empty),
        "category" => KioskCommand::Category(Category::new(required("category", rest)?)?),
        "size" | "milk" => {
            KioskCommand::Option(DrinkOption::parse(&verb, required("option", rest)?)?)
        }
        "sweetness" => KioskCommand::Sweetness(number("sweetness", rest)?),
        "ice" => KioskCommand::Ice(number("ice", rest)?),
        "shots" => KioskCommand::Shots(number("shots", rest)?),
        "addon" => {
            let (name, price) = required("addon", rest)?
                .rsplit_once(char::is_whitespace)
                .ok_or(CommandError::MissingArgument("addon price"))?;
            KioskCommand::Addon {
                name: name.trim().to_string(),
                price: Cents::parse_decimal(price)?,
            }
        }
        "drop" => KioskCommand::DropAddon(required("drop", rest)?.to_string()),
        "mood" => KioskCommand::Mood(required("mood", rest)?.parse()?),
        "name" => KioskCommand::Name(rest.to_string()),
        "phone" => KioskCommand::Phone(rest.to_string()),
        "pickup" => KioskCommand::Pickup(required("pickup", rest)?.to_string()),
        "next" => KioskCommand::Next,
        "back" => KioskCommand::Back,
        "review" => KioskCommand::Review,
        "confirm" => KioskCommand::Confirm,
        "help" | "?" => KioskCommand::Help,
        "quit" | "exit" => KioskCommand::Quit,
        _ => return Err(CommandError::Unknown(verb.clone())),
    };
    Ok(command)
}

fn required<'a>(what: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(what))
    } else {
        Ok(rest)
    }
}

fn number(what: &'static str, rest: &str) -> Result<i32, CommandError> {
    let raw = required(what, rest)?;
    raw.trim_start_matches('+')
        .parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}
