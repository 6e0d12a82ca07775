//! Storefront client logic: the order wizard controller, order submission, and the mood chat.

pub mod config;
pub mod mood;
pub mod submission;
pub mod wizard;

pub use config::{load_settings, ClientSettings};
pub use mood::{
    mood_suggestions, recommend, ChatMessage, ChatSender, DrinkRecommendation, MoodWidget,
    PendingReply,
};
pub use submission::{
    submit_shared, HttpOrderSubmitter, MissingOrderSubmitter, OrderConfirmation, OrderSubmitter,
    PendingSubmission, SubmissionPolicy, SubmitError,
};
pub use wizard::{
    mood_advisory, validate, ContactField, MoodAdvisory, OrderDraft, ReviewSummary,
    WizardController, WizardEvent, WizardStep, WizardView,
};
