//! Free-text mood chat: a fixed mood -> drink table and the message log it feeds.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrinkRecommendation {
    pub key: &'static str,
    pub drink: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
}

impl DrinkRecommendation {
    pub fn message(&self) -> String {
        format!(
            "{} Based on your mood, I recommend our {}! {}",
            self.emoji, self.drink, self.description
        )
    }
}

pub const DEFAULT_KEY: &str = "default";

// Order matters: the substring scan returns the first key that matches.
pub const RECOMMENDATIONS: &[DrinkRecommendation] = &[
    DrinkRecommendation {
        key: "tired",
        drink: "Neural Espresso Double Shot",
        description: "High-caffeine boost with smooth finish. Perfect for energy restoration.",
        emoji: "⚡",
    },
    DrinkRecommendation {
        key: "energetic",
        drink: "Iced AI Brew",
        description: "Light and refreshing cold brew to maintain your momentum.",
        emoji: "🚀",
    },
    DrinkRecommendation {
        key: "relaxed",
        drink: "Cloud Cappuccino",
        description: "Smooth, velvety foam for peaceful moments. Perfectly balanced.",
        emoji: "😌",
    },
    DrinkRecommendation {
        key: "focused",
        drink: "Quantum Latte",
        description: "Balanced caffeine with L-theanine for sustained concentration.",
        emoji: "🎯",
    },
    DrinkRecommendation {
        key: "stressed",
        drink: "Matcha Cloud",
        description: "Calming matcha blend with adaptogens to ease tension.",
        emoji: "🧘",
    },
    DrinkRecommendation {
        key: "happy",
        drink: "Cloud Mocha",
        description: "Indulgent chocolate-coffee blend to celebrate good vibes.",
        emoji: "😊",
    },
    DrinkRecommendation {
        key: "creative",
        drink: "Quantum Latte with Vanilla",
        description: "Smooth, inspiring blend to fuel your imagination.",
        emoji: "🎨",
    },
    DrinkRecommendation {
        key: DEFAULT_KEY,
        drink: "Cloud Cappuccino",
        description: "Our signature drink - perfect for any mood!",
        emoji: "☕",
    },
];

fn default_recommendation() -> &'static DrinkRecommendation {
    // The table literal above always ends with the default entry.
    &RECOMMENDATIONS[RECOMMENDATIONS.len() - 1]
}

/// Exact key match first, then the first key (in table order) that contains or is contained
/// by the normalized input, then the default entry.
pub fn recommend(mood_text: &str) -> &'static DrinkRecommendation {
    let normalized = mood_text.trim().to_lowercase();

    if let Some(exact) = RECOMMENDATIONS.iter().find(|rec| rec.key == normalized) {
        return exact;
    }

    RECOMMENDATIONS
        .iter()
        .find(|rec| normalized.contains(rec.key) || rec.key.contains(normalized.as_str()))
        .unwrap_or_else(default_recommendation)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub text: String,
}

/// Quick-pick mood words offered before the customer types anything.
pub fn mood_suggestions() -> impl Iterator<Item = &'static str> {
    RECOMMENDATIONS
        .iter()
        .map(|rec| rec.key)
        .filter(|key| *key != DEFAULT_KEY)
}

const CHAT_CAPACITY: usize = 64;

/// A logged user entry whose bot reply has not been shown yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    mood: String,
    delay: Duration,
}

impl PendingReply {
    pub fn mood(&self) -> &str {
        &self.mood
    }

    /// Waits out the display delay before the reply may be delivered.
    pub async fn ready(self) -> Self {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self
    }
}

/// Append-only chat log for the mood widget. The log is unbounded for the session.
#[derive(Debug, Clone)]
pub struct MoodWidget {
    messages: Vec<ChatMessage>,
    reply_delay: Duration,
    events: broadcast::Sender<ChatMessage>,
}

impl Default for MoodWidget {
    fn default() -> Self {
        Self::new(Duration::from_millis(800))
    }
}

impl MoodWidget {
    pub fn new(reply_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(CHAT_CAPACITY);
        Self {
            messages: Vec::new(),
            reply_delay,
            events,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Every message appended to the log from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.events.subscribe()
    }

    /// Logs the trimmed user entry right away. Blank input is ignored and returns `None`.
    pub fn post_user_message(&mut self, text: &str) -> Option<PendingReply> {
        let mood = text.trim();
        if mood.is_empty() {
            return None;
        }
        self.push(ChatSender::User, mood.to_string());
        Some(PendingReply {
            mood: mood.to_string(),
            delay: self.reply_delay,
        })
    }

    /// Appends the bot's recommendation for a posted entry.
    pub fn deliver_reply(&mut self, pending: PendingReply) -> &'static DrinkRecommendation {
        let recommendation = recommend(&pending.mood);
        debug!(mood = %pending.mood, key = recommendation.key, "mood recommendation");
        self.push(ChatSender::Bot, recommendation.message());
        recommendation
    }

    /// Posts the entry, waits the display delay, then delivers the reply.
    pub async fn submit_mood(&mut self, text: &str) -> Option<&'static DrinkRecommendation> {
        let pending = self.post_user_message(text)?.ready().await;
        Some(self.deliver_reply(pending))
    }

    fn push(&mut self, sender: ChatSender, text: String) {
        let message = ChatMessage { sender, text };
        self.messages.push(message.clone());
        // No subscribers is fine.
        let _ = self.events.send(message);
    }
}

#[cfg(test)]
#[path = "tests/mood_tests.rs"]
mod tests;
