//! Terminal adapter: applies kiosk commands to the wizard and prints what changed.

use std::io::Write;

use anyhow::Result;
use client_core::{
    ContactField, OrderSubmitter, ReviewSummary, SubmitError, WizardController, WizardStep,
};
use shared::domain::{format_text, Cents, DrinkOption, MENU_CATEGORIES};

use crate::commands::{KioskCommand, HELP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Done,
}

pub struct OrderSession {
    controller: WizardController,
    submitter: Box<dyn OrderSubmitter>,
}

impl OrderSession {
    pub fn new(controller: WizardController, submitter: Box<dyn OrderSubmitter>) -> Self {
        Self {
            controller,
            submitter,
        }
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn write_prompt(&self, out: &mut impl Write) -> Result<()> {
        let view = self.controller.view();
        writeln!(
            out,
            "\n[step {} of 5 | {}%] {}",
            view.step.position(),
            view.progress_percent,
            step_title(view.step)
        )?;
        match view.step {
            WizardStep::Category => {
                writeln!(out, "  menu: {}", MENU_CATEGORIES.join(", "))?;
                if let Some(category) = self.controller.draft().category() {
                    writeln!(out, "  selected: {}", category.display_name())?;
                }
            }
            WizardStep::Customize => {
                let draft = self.controller.draft();
                writeln!(
                    out,
                    "  size {} | milk {} | sweetness {}% | ice {}% | shots {}",
                    draft.size().key(),
                    draft.milk().key(),
                    draft.sweetness(),
                    draft.ice(),
                    draft.shots()
                )?;
            }
            WizardStep::Mood => writeln!(out, "  moods: energetic, relaxing, focus")?,
            WizardStep::Contact => {
                writeln!(out, "  pickup: asap, 30min, 1hour, 2hours, custom")?
            }
            WizardStep::Review => write_review(out, &self.controller.review())?,
            WizardStep::Success => {}
        }

        let mut actions = Vec::new();
        if view.show_previous {
            actions.push("back");
        }
        if view.show_next {
            actions.push("next");
        }
        if view.show_confirm {
            actions.push("confirm");
        }
        if !actions.is_empty() {
            writeln!(out, "  ({})", actions.join(" / "))?;
        }
        Ok(())
    }

    pub async fn handle(&mut self, command: KioskCommand, out: &mut impl Write) -> Result<Flow> {
        if is_edit(&command) && self.controller.step() == WizardStep::Review {
            writeln!(out, "Your order is ready for review; type 'back' to change it.")?;
            return Ok(Flow::Continue);
        }

        match command {
            KioskCommand::Category(category) => {
                writeln!(out, "Category: {}", category.display_name())?;
                self.controller.select_category(category);
            }
            KioskCommand::Option(option) => {
                self.controller.set_option(option);
                match option {
                    DrinkOption::Size(size) => writeln!(out, "Size: {}", format_text(size.key()))?,
                    DrinkOption::Milk(milk) => writeln!(out, "Milk: {}", format_text(milk.key()))?,
                }
            }
            KioskCommand::Sweetness(value) => {
                let stored = self.controller.set_sweetness(value);
                writeln!(out, "Sweetness: {stored}%")?;
            }
            KioskCommand::Ice(value) => {
                let stored = self.controller.set_ice(value);
                writeln!(out, "Ice: {stored}%")?;
            }
            KioskCommand::Shots(delta) => {
                let before = self.controller.draft().shots();
                let after = self.controller.adjust_shots(delta);
                if before == after && delta != 0 {
                    writeln!(out, "Shots stay at {after} (0-5)")?;
                } else {
                    writeln!(out, "Shots: {after}")?;
                }
            }
            KioskCommand::Addon { name, price } => {
                self.controller.toggle_addon(&name, price, true);
                writeln!(out, "Added {} (+{price})", format_text(&name))?;
            }
            KioskCommand::DropAddon(name) => {
                self.controller.toggle_addon(&name, Cents(0), false);
                writeln!(out, "Removed {}", format_text(&name))?;
            }
            KioskCommand::Mood(mood) => match self.controller.select_mood(mood) {
                Some(advisory) => {
                    writeln!(out, "AI recommendation: {}", advisory.text)?;
                    writeln!(
                        out,
                        "Adjusted to {} shots, {}% sweetness.",
                        advisory.shots, advisory.sweetness
                    )?;
                }
                None => writeln!(out, "Your order can no longer be changed.")?,
            },
            KioskCommand::Name(value) => {
                self.controller.set_contact_field(ContactField::Name, value)
            }
            KioskCommand::Phone(value) => {
                self.controller.set_contact_field(ContactField::Phone, value)
            }
            KioskCommand::Pickup(value) => {
                self.controller.set_contact_field(ContactField::PickupTime, value)
            }
            KioskCommand::Next => match self.controller.advance() {
                Ok(_) => self.write_prompt(out)?,
                Err(failure) => {
                    for error in &failure.errors {
                        writeln!(out, "! {error}")?;
                    }
                }
            },
            KioskCommand::Back => {
                self.controller.retreat();
                self.write_prompt(out)?;
            }
            KioskCommand::Review => write_review(out, &self.controller.review())?,
            KioskCommand::Confirm => return self.confirm(out).await,
            KioskCommand::Help => writeln!(out, "{HELP}")?,
            KioskCommand::Quit => return Ok(Flow::Done),
        }
        Ok(Flow::Continue)
    }

    async fn confirm(&mut self, out: &mut impl Write) -> Result<Flow> {
        match self.controller.submit_order(self.submitter.as_ref()).await {
            Ok(confirmation) => {
                writeln!(
                    out,
                    "\nOrder confirmed! Your order number is #{}.",
                    confirmation.display_number
                )?;
                writeln!(out, "We'll have it ready for pickup.")?;
                Ok(Flow::Done)
            }
            Err(SubmitError::Rejected(err)) => {
                writeln!(out, "! Could not place your order: {err:#}")?;
                writeln!(out, "  type 'confirm' to try again")?;
                Ok(Flow::Continue)
            }
            Err(err) => {
                writeln!(out, "! {err}")?;
                Ok(Flow::Continue)
            }
        }
    }
}

fn is_edit(command: &KioskCommand) -> bool {
    !matches!(
        command,
        KioskCommand::Next
            | KioskCommand::Back
            | KioskCommand::Review
            | KioskCommand::Confirm
            | KioskCommand::Help
            | KioskCommand::Quit
    )
}

fn step_title(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Category => "Choose your drink",
        WizardStep::Customize => "Customize it",
        WizardStep::Mood => "How are you feeling?",
        WizardStep::Contact => "Your details",
        WizardStep::Review => "Review your order",
        WizardStep::Success => "Order placed",
    }
}

pub fn write_review(out: &mut impl Write, review: &ReviewSummary) -> Result<()> {
    let rows = [
        ("Drink", review.category.as_str()),
        ("Size", review.size.as_str()),
        ("Milk", review.milk.as_str()),
        ("Sweetness", review.sweetness.as_str()),
        ("Ice", review.ice.as_str()),
        ("Shots", review.shots.as_str()),
        ("Add-ons", review.addons.as_str()),
        ("Mood", review.mood.as_str()),
        ("Name", review.name.as_str()),
        ("Phone", review.phone.as_str()),
        ("Pickup", review.pickup.as_str()),
    ];
    for (label, value) in rows {
        writeln!(out, "  {label:<10} {value}")?;
    }
    writeln!(out, "  {:<10} {}", "Total", review.total)?;
    Ok(())
}
