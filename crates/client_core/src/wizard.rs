//! Order wizard: the in-progress draft, step gating, pricing, and the review/view snapshots
//! handed to whatever renders the wizard.

use rand::Rng;
use shared::{
    domain::{
        format_pickup_time, format_text, Addon, Category, Cents, DrinkOption, MilkType, Mood,
        Size, BASE_PRICE,
    },
    error::{ValidationError, ValidationFailure},
    protocol::{Customization, OrderPayload, OrderReceipt},
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::submission::{
    generate_order_number, OrderConfirmation, OrderSubmitter, PendingSubmission, SubmissionPolicy,
    SubmitError,
};

pub const TOTAL_STEPS: u8 = 5;
pub const MAX_SHOTS: u8 = 5;
pub const MAX_LEVEL: u8 = 100;
const PHONE_PLACEHOLDER: &str = "Not provided";
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Category,
    Customize,
    Mood,
    Contact,
    Review,
    Success,
}

impl WizardStep {
    /// 1-based position on the progress bar. Success shares the last slot.
    pub fn position(self) -> u8 {
        match self {
            WizardStep::Category => 1,
            WizardStep::Customize => 2,
            WizardStep::Mood => 3,
            WizardStep::Contact => 4,
            WizardStep::Review | WizardStep::Success => TOTAL_STEPS,
        }
    }

    fn next(self) -> Self {
        match self {
            WizardStep::Category => WizardStep::Customize,
            WizardStep::Customize => WizardStep::Mood,
            WizardStep::Mood => WizardStep::Contact,
            WizardStep::Contact | WizardStep::Review => WizardStep::Review,
            WizardStep::Success => WizardStep::Success,
        }
    }

    fn previous(self) -> Self {
        match self {
            WizardStep::Category | WizardStep::Customize => WizardStep::Category,
            WizardStep::Mood => WizardStep::Customize,
            WizardStep::Contact => WizardStep::Mood,
            WizardStep::Review => WizardStep::Contact,
            WizardStep::Success => WizardStep::Success,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Phone,
    PickupTime,
}

/// Shot/sweetness override applied when a mood is picked on step 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodAdvisory {
    pub mood: Mood,
    pub shots: u8,
    pub sweetness: u8,
    pub text: &'static str,
}

pub fn mood_advisory(mood: Mood) -> MoodAdvisory {
    match mood {
        Mood::Energetic => MoodAdvisory {
            mood,
            shots: 3,
            sweetness: 30,
            text: "Extra espresso shot, less sweetness, and a hint of vanilla for sustained energy.",
        },
        Mood::Relaxing => MoodAdvisory {
            mood,
            shots: 1,
            sweetness: 70,
            text: "Reduced caffeine, extra sweetness, and caramel for a soothing experience.",
        },
        Mood::Focus => MoodAdvisory {
            mood,
            shots: 2,
            sweetness: 50,
            text: "Balanced caffeine, medium sweetness, and mocha for enhanced concentration.",
        },
    }
}

/// The single in-progress order. Fields are private so the range invariants can't be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    category: Option<Category>,
    size: Size,
    milk: MilkType,
    sweetness: u8,
    ice: u8,
    shots: u8,
    addons: Vec<Addon>,
    mood: Option<Mood>,
    name: String,
    phone: String,
    pickup_time: String,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            category: None,
            size: Size::default(),
            milk: MilkType::default(),
            sweetness: 50,
            ice: 50,
            shots: 2,
            addons: Vec::new(),
            mood: None,
            name: String::new(),
            phone: String::new(),
            pickup_time: String::new(),
        }
    }
}

impl OrderDraft {
    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn milk(&self) -> MilkType {
        self.milk
    }

    pub fn sweetness(&self) -> u8 {
        self.sweetness
    }

    pub fn ice(&self) -> u8 {
        self.ice
    }

    pub fn shots(&self) -> u8 {
        self.shots
    }

    pub fn addons(&self) -> &[Addon] {
        &self.addons
    }

    pub fn mood(&self) -> Option<Mood> {
        self.mood
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn pickup_time(&self) -> &str {
        &self.pickup_time
    }

    pub fn base_price(&self) -> Cents {
        BASE_PRICE
    }

    fn set_option(&mut self, option: DrinkOption) {
        match option {
            DrinkOption::Size(size) => self.size = size,
            DrinkOption::Milk(milk) => self.milk = milk,
        }
    }

    fn set_sweetness(&mut self, value: i32) -> u8 {
        self.sweetness = clamp_level(value);
        self.sweetness
    }

    fn set_ice(&mut self, value: i32) -> u8 {
        self.ice = clamp_level(value);
        self.ice
    }

    /// Steps the shot count; a step that would leave `0..=MAX_SHOTS` is ignored.
    fn adjust_shots(&mut self, delta: i32) -> bool {
        let next = i32::from(self.shots) + delta;
        match u8::try_from(next) {
            Ok(next) if next <= MAX_SHOTS => {
                self.shots = next;
                true
            }
            _ => false,
        }
    }

    fn toggle_addon(&mut self, name: &str, price: Cents, enabled: bool) {
        let existing = self.addons.iter_mut().find(|addon| addon.name == name);
        match (existing, enabled) {
            (Some(addon), true) => addon.price = price,
            (None, true) => self.addons.push(Addon {
                name: name.to_string(),
                price,
            }),
            (Some(_), false) => self.addons.retain(|addon| addon.name != name),
            (None, false) => {}
        }
    }

    fn apply_mood(&mut self, advisory: &MoodAdvisory) {
        self.mood = Some(advisory.mood);
        self.shots = advisory.shots.min(MAX_SHOTS);
        self.sweetness = advisory.sweetness.min(MAX_LEVEL);
    }

    fn set_contact_field(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::Name => self.name = value,
            ContactField::Phone => self.phone = value,
            ContactField::PickupTime => self.pickup_time = value,
        }
    }

    /// Base price plus size surcharge plus every add-on. Never cached.
    pub fn compute_total(&self) -> Cents {
        self.base_price()
            + self.size.surcharge()
            + self.addons.iter().map(|addon| addon.price).sum::<Cents>()
    }

    pub fn coffee_type(&self) -> String {
        let category = self
            .category
            .as_ref()
            .map(Category::display_name)
            .unwrap_or_default();
        format!("{category} - {}", format_text(self.size.key()))
    }

    pub fn to_payload(&self, order_number: u32) -> OrderPayload {
        OrderPayload {
            name: self.name.clone(),
            phone: phone_or_placeholder(&self.phone),
            coffee_type: self.coffee_type(),
            customization: Customization {
                milk: self.milk.key().to_string(),
                sweetness: self.sweetness,
                ice: self.ice,
                shots: self.shots,
                addons: self.addons.iter().map(|addon| addon.name.clone()).collect(),
            },
            mood: self.mood.map(|mood| mood.key().to_string()).unwrap_or_default(),
            pickup_time: self.pickup_time.clone(),
            order_number,
        }
    }
}

fn clamp_level(value: i32) -> u8 {
    // Clamped into 0..=100 first, so the narrowing cannot truncate.
    value.clamp(0, i32::from(MAX_LEVEL)) as u8
}

fn phone_or_placeholder(phone: &str) -> String {
    if phone.is_empty() {
        PHONE_PLACEHOLDER.to_string()
    } else {
        phone.to_string()
    }
}

/// Checks the gate for leaving `step`. Pure: the controller owns displayed-error bookkeeping.
pub fn validate(draft: &OrderDraft, step: WizardStep) -> Result<(), ValidationFailure> {
    let mut errors = Vec::new();
    match step {
        WizardStep::Category => {
            if draft.category.is_none() {
                errors.push(ValidationError::MissingCategory);
            }
        }
        WizardStep::Mood => {
            if draft.mood.is_none() {
                errors.push(ValidationError::MissingMood);
            }
        }
        WizardStep::Contact => {
            if draft.name.trim().is_empty() {
                errors.push(ValidationError::MissingName);
            }
            if draft.pickup_time.is_empty() {
                errors.push(ValidationError::MissingPickupTime);
            }
        }
        WizardStep::Customize | WizardStep::Review | WizardStep::Success => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure {
            step: step.position(),
            errors,
        })
    }
}

/// Read-only rendering of the draft for the review step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub category: String,
    pub size: String,
    pub milk: String,
    pub sweetness: String,
    pub ice: String,
    pub shots: String,
    pub addons: String,
    pub mood: String,
    pub name: String,
    pub phone: String,
    pub pickup: String,
    pub total: Cents,
}

impl ReviewSummary {
    pub fn from_draft(draft: &OrderDraft) -> Self {
        let addons = if draft.addons.is_empty() {
            "None".to_string()
        } else {
            draft
                .addons
                .iter()
                .map(|addon| format_text(&addon.name))
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            category: draft
                .category
                .as_ref()
                .map(Category::display_name)
                .unwrap_or_default(),
            size: format_text(draft.size.key()),
            milk: format_text(draft.milk.key()),
            sweetness: format!("{}%", draft.sweetness),
            ice: format!("{}%", draft.ice),
            shots: draft.shots.to_string(),
            addons,
            mood: draft.mood.map(|m| format_text(m.key())).unwrap_or_default(),
            name: draft.name.clone(),
            phone: phone_or_placeholder(&draft.phone),
            pickup: format_pickup_time(&draft.pickup_time),
            total: draft.compute_total(),
        }
    }
}

/// Navigation state the view collaborator renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardView {
    pub step: WizardStep,
    pub progress_percent: u8,
    pub show_previous: bool,
    pub show_next: bool,
    pub show_confirm: bool,
    pub submitting: bool,
    pub errors: Vec<ValidationError>,
    pub order_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    StepChanged(WizardStep),
    DraftChanged,
    ValidationFailed(ValidationFailure),
    AdvisoryApplied(MoodAdvisory),
    SubmissionStarted { order_number: u32 },
    OrderCompleted(OrderConfirmation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmissionState {
    Idle,
    InFlight { order_number: u32 },
    Completed(OrderConfirmation),
}

/// Owns one wizard session: the draft, the step position and the submission guard.
pub struct WizardController {
    draft: OrderDraft,
    step: WizardStep,
    displayed_errors: Vec<ValidationError>,
    submission: SubmissionState,
    policy: SubmissionPolicy,
    events: broadcast::Sender<WizardEvent>,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new(SubmissionPolicy::default())
    }
}

impl WizardController {
    pub fn new(policy: SubmissionPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            draft: OrderDraft::default(),
            step: WizardStep::Category,
            displayed_errors: Vec::new(),
            submission: SubmissionState::Idle,
            policy,
            events,
        }
    }

    /// Starts a fresh session, optionally with the category picked from a menu button.
    pub fn open(policy: SubmissionPolicy, preselected: Option<Category>) -> Self {
        let mut controller = Self::new(policy);
        if let Some(category) = preselected {
            controller.draft.category = Some(category);
        }
        controller
    }

    /// Discards the draft and returns to step 1. Subscribers stay attached.
    pub fn reset(&mut self) {
        self.draft = OrderDraft::default();
        self.step = WizardStep::Category;
        self.displayed_errors.clear();
        self.submission = SubmissionState::Idle;
        self.emit(WizardEvent::DraftChanged);
        self.emit(WizardEvent::StepChanged(self.step));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn policy(&self) -> SubmissionPolicy {
        self.policy
    }

    pub fn displayed_errors(&self) -> &[ValidationError] {
        &self.displayed_errors
    }

    pub fn compute_total(&self) -> Cents {
        self.draft.compute_total()
    }

    pub fn review(&self) -> ReviewSummary {
        ReviewSummary::from_draft(&self.draft)
    }

    pub fn view(&self) -> WizardView {
        let progress_percent = match self.step {
            WizardStep::Success => 100,
            step => (u16::from(step.position()) * 100 / u16::from(TOTAL_STEPS)) as u8,
        };
        let order_number = match &self.submission {
            SubmissionState::Completed(confirmation) => Some(confirmation.display_number.clone()),
            _ => None,
        };

        WizardView {
            step: self.step,
            progress_percent,
            show_previous: !matches!(self.step, WizardStep::Category | WizardStep::Success),
            show_next: !matches!(self.step, WizardStep::Review | WizardStep::Success),
            show_confirm: self.step == WizardStep::Review,
            submitting: matches!(self.submission, SubmissionState::InFlight { .. }),
            errors: self.displayed_errors.clone(),
            order_number,
        }
    }

    fn emit(&self, event: WizardEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// The draft is frozen once the customer is on the review step or beyond.
    fn draft_locked(&self, operation: &str) -> bool {
        let locked = matches!(self.step, WizardStep::Review | WizardStep::Success);
        if locked {
            debug!(operation, step = ?self.step, "ignoring edit to read-only draft");
        }
        locked
    }

    pub fn select_category(&mut self, category: Category) {
        if self.draft_locked("select_category") {
            return;
        }
        self.draft.category = Some(category);
        self.emit(WizardEvent::DraftChanged);
    }

    pub fn set_option(&mut self, option: DrinkOption) {
        if self.draft_locked("set_option") {
            return;
        }
        self.draft.set_option(option);
        self.emit(WizardEvent::DraftChanged);
    }

    /// Stores `clamp(value, 0, 100)` and returns the stored value.
    pub fn set_sweetness(&mut self, value: i32) -> u8 {
        if self.draft_locked("set_sweetness") {
            return self.draft.sweetness;
        }
        let stored = self.draft.set_sweetness(value);
        self.emit(WizardEvent::DraftChanged);
        stored
    }

    pub fn set_ice(&mut self, value: i32) -> u8 {
        if self.draft_locked("set_ice") {
            return self.draft.ice;
        }
        let stored = self.draft.set_ice(value);
        self.emit(WizardEvent::DraftChanged);
        stored
    }

    /// Out-of-range requests are silently ignored. Returns the resulting shot count.
    pub fn adjust_shots(&mut self, delta: i32) -> u8 {
        if self.draft_locked("adjust_shots") {
            return self.draft.shots;
        }
        if self.draft.adjust_shots(delta) {
            self.emit(WizardEvent::DraftChanged);
        }
        self.draft.shots
    }

    pub fn toggle_addon(&mut self, name: &str, price: Cents, enabled: bool) {
        if self.draft_locked("toggle_addon") {
            return;
        }
        self.draft.toggle_addon(name, price, enabled);
        self.emit(WizardEvent::DraftChanged);
    }

    /// Records the mood and overwrites shots and sweetness with the advisory values,
    /// discarding earlier manual edits. Returns `None` once the draft is read-only.
    pub fn select_mood(&mut self, mood: Mood) -> Option<MoodAdvisory> {
        if self.draft_locked("select_mood") {
            return None;
        }
        let advisory = mood_advisory(mood);
        self.draft.apply_mood(&advisory);
        debug!(
            mood = mood.key(),
            shots = advisory.shots,
            sweetness = advisory.sweetness,
            "applied mood advisory"
        );
        self.emit(WizardEvent::AdvisoryApplied(advisory));
        self.emit(WizardEvent::DraftChanged);
        Some(advisory)
    }

    pub fn set_contact_field(&mut self, field: ContactField, value: impl Into<String>) {
        if self.draft_locked("set_contact_field") {
            return;
        }
        self.draft.set_contact_field(field, value.into());
        self.emit(WizardEvent::DraftChanged);
    }

    /// Moves one step forward if the current step validates. No-op on review and success.
    pub fn advance(&mut self) -> Result<WizardStep, ValidationFailure> {
        if self.step == WizardStep::Success {
            return Ok(self.step);
        }

        self.displayed_errors.clear();
        if let Err(failure) = validate(&self.draft, self.step) {
            debug!(step = failure.step, errors = ?failure.errors, "step validation failed");
            self.displayed_errors = failure.errors.clone();
            self.emit(WizardEvent::ValidationFailed(failure.clone()));
            return Err(failure);
        }

        let next = self.step.next();
        if next != self.step {
            self.step = next;
            self.emit(WizardEvent::StepChanged(next));
        }
        Ok(self.step)
    }

    /// Moves one step back, never below step 1. Success is terminal.
    pub fn retreat(&mut self) -> WizardStep {
        if matches!(self.submission, SubmissionState::InFlight { .. }) {
            return self.step;
        }
        let previous = self.step.previous();
        if previous != self.step {
            self.step = previous;
            self.emit(WizardEvent::StepChanged(previous));
        }
        self.step
    }

    /// Claims the single submission slot and builds the payload with a fresh local order number.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, SubmitError> {
        self.begin_submission_with(&mut rand::thread_rng())
    }

    pub fn begin_submission_with(
        &mut self,
        rng: &mut impl Rng,
    ) -> Result<PendingSubmission, SubmitError> {
        match &self.submission {
            SubmissionState::InFlight { .. } => return Err(SubmitError::InFlight),
            SubmissionState::Completed(_) => return Err(SubmitError::AlreadyCompleted),
            SubmissionState::Idle => {}
        }
        if self.step != WizardStep::Review {
            return Err(SubmitError::NotAtReview(self.step));
        }

        let order_number = generate_order_number(rng);
        let payload = self.draft.to_payload(order_number);
        self.submission = SubmissionState::InFlight { order_number };

        match serde_json::to_string_pretty(&payload) {
            Ok(body) => info!(order_number, payload = %body, "order confirmed"),
            Err(err) => warn!(order_number, error = %err, "order confirmed; payload not printable"),
        }
        self.emit(WizardEvent::SubmissionStarted { order_number });

        Ok(PendingSubmission {
            order_number,
            payload,
        })
    }

    /// Applies the network outcome. Under the masking policy every outcome completes the session.
    pub fn complete_submission(
        &mut self,
        pending: PendingSubmission,
        outcome: anyhow::Result<OrderReceipt>,
    ) -> Result<OrderConfirmation, SubmitError> {
        match &self.submission {
            SubmissionState::InFlight { order_number } if *order_number == pending.order_number => {}
            _ => return Err(SubmitError::NotInFlight),
        }

        let confirmation = match outcome {
            Ok(receipt) => {
                info!(
                    order_number = pending.order_number,
                    order_id = ?receipt.order_id,
                    "order accepted by intake endpoint"
                );
                OrderConfirmation::accepted(pending.order_number, receipt)
            }
            Err(err) if self.policy.mask_submission_errors => {
                error!(
                    order_number = pending.order_number,
                    error = %format!("{err:#}"),
                    "order submission error; showing local order number"
                );
                OrderConfirmation::local_only(pending.order_number)
            }
            Err(err) => {
                error!(
                    order_number = pending.order_number,
                    error = %format!("{err:#}"),
                    "order submission error"
                );
                self.submission = SubmissionState::Idle;
                return Err(SubmitError::Rejected(err));
            }
        };

        self.submission = SubmissionState::Completed(confirmation.clone());
        self.step = WizardStep::Success;
        self.displayed_errors.clear();
        self.emit(WizardEvent::StepChanged(WizardStep::Success));
        self.emit(WizardEvent::OrderCompleted(confirmation.clone()));
        Ok(confirmation)
    }

    pub async fn submit_order(
        &mut self,
        submitter: &dyn OrderSubmitter,
    ) -> Result<OrderConfirmation, SubmitError> {
        let pending = self.begin_submission()?;
        let outcome = submitter.submit(&pending.payload).await;
        self.complete_submission(pending, outcome)
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
