use std::{fmt, iter::Sum, ops::Add, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::OptionError;

/// Price of every drink before size surcharge and add-ons.
pub const BASE_PRICE: Cents = Cents(599);

/// Drink families offered on the storefront menu.
pub const MENU_CATEGORIES: &[&str] = &[
    "espresso",
    "latte",
    "cappuccino",
    "cold-brew",
    "mocha",
    "matcha",
];

/// Money in whole cents so totals add up exactly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Cents(pub u32);

impl Cents {
    /// Largest amount `parse_decimal` accepts for a single price.
    pub const MAX_PRICE: Cents = Cents(100_000);

    /// Parses a non-negative decimal amount with at most two fraction digits ("0.5", "1.25", "2"),
    /// up to [`Cents::MAX_PRICE`].
    pub fn parse_decimal(raw: &str) -> Result<Self, OptionError> {
        let invalid = || OptionError::InvalidPrice(raw.to_string());
        let raw_trimmed = raw.trim().trim_start_matches('$');
        let (whole, fraction) = match raw_trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw_trimmed, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: u32 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u32>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Cents)
            .filter(|amount| *amount <= Self::MAX_PRICE)
            .ok_or_else(invalid)
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents(0), Add::add)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Drink family, kept as the hyphenated menu token (e.g. `cold-brew`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    pub fn new(token: impl Into<String>) -> Result<Self, OptionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(OptionError::EmptyCategory);
        }
        Ok(Self(token))
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn display_name(&self) -> String {
        format_text(&self.0)
    }
}

impl FromStr for Category {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    pub fn key(self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }

    pub fn surcharge(self) -> Cents {
        match self {
            Size::Small => Cents(0),
            Size::Medium => Cents(100),
            Size::Large => Cents(200),
        }
    }
}

impl FromStr for Size {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Size::Small),
            "medium" => Ok(Size::Medium),
            "large" => Ok(Size::Large),
            other => Err(OptionError::UnknownValue {
                option: "size".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilkType {
    #[default]
    Whole,
    Skim,
    Oat,
    Almond,
    Soy,
}

impl MilkType {
    pub fn key(self) -> &'static str {
        match self {
            MilkType::Whole => "whole",
            MilkType::Skim => "skim",
            MilkType::Oat => "oat",
            MilkType::Almond => "almond",
            MilkType::Soy => "soy",
        }
    }
}

impl FromStr for MilkType {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whole" => Ok(MilkType::Whole),
            "skim" => Ok(MilkType::Skim),
            "oat" => Ok(MilkType::Oat),
            "almond" => Ok(MilkType::Almond),
            "soy" => Ok(MilkType::Soy),
            other => Err(OptionError::UnknownValue {
                option: "milk".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// One of the mutually exclusive option groups on the customize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrinkOption {
    Size(Size),
    Milk(MilkType),
}

impl DrinkOption {
    /// Resolves an `(option, value)` pair as carried by the option buttons.
    pub fn parse(option: &str, value: &str) -> Result<Self, OptionError> {
        match option {
            "size" => value.parse().map(DrinkOption::Size),
            "milk" => value.parse().map(DrinkOption::Milk),
            other => Err(OptionError::UnknownOption(other.to_string())),
        }
    }
}

/// Moods offered on the wizard's mood step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Energetic,
    Relaxing,
    Focus,
}

impl Mood {
    pub const ALL: [Mood; 3] = [Mood::Energetic, Mood::Relaxing, Mood::Focus];

    pub fn key(self) -> &'static str {
        match self {
            Mood::Energetic => "energetic",
            Mood::Relaxing => "relaxing",
            Mood::Focus => "focus",
        }
    }
}

impl FromStr for Mood {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.key() == s)
            .ok_or_else(|| OptionError::UnknownValue {
                option: "mood".to_string(),
                value: s.to_string(),
            })
    }
}

/// Pickup slots offered by the contact step's select box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickupTime {
    Asap,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    Custom,
}

impl PickupTime {
    pub const ALL: [PickupTime; 5] = [
        PickupTime::Asap,
        PickupTime::ThirtyMinutes,
        PickupTime::OneHour,
        PickupTime::TwoHours,
        PickupTime::Custom,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PickupTime::Asap => "asap",
            PickupTime::ThirtyMinutes => "30min",
            PickupTime::OneHour => "1hour",
            PickupTime::TwoHours => "2hours",
            PickupTime::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PickupTime::Asap => "ASAP (15 min)",
            PickupTime::ThirtyMinutes => "30 minutes",
            PickupTime::OneHour => "1 hour",
            PickupTime::TwoHours => "2 hours",
            PickupTime::Custom => "Custom time",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        PickupTime::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    pub name: String,
    pub price: Cents,
}

/// Turns a hyphenated token into space-separated capitalized words: `cold-brew` -> `Cold Brew`.
pub fn format_text(token: &str) -> String {
    token
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display text for a pickup key; unknown keys pass through unchanged.
pub fn format_pickup_time(key: &str) -> String {
    PickupTime::from_key(key)
        .map(|slot| slot.label().to_string())
        .unwrap_or_else(|| key.to_string())
}
