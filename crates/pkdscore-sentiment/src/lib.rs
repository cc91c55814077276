//! Social media collectors and the emotion scorer.
//!
//! Collects top-level comments under the most viewed recent YouTube video
//! for a tag and the Wykop entry stream of a tag, and scores post text with
//! a Polish lexicon on a `0..=100` scale where 50 is neutral.

pub mod error;
pub mod scorer;
pub mod wykop;
pub mod youtube;

mod http;

pub use error::SentimentError;
pub use scorer::{emotion_score, lexicon_score, NEUTRAL_EMOTION};
pub use wykop::{clean_tag, StreamBudget, WykopClient, WykopEntry};
pub use youtube::{PublishWindow, VideoRef, YoutubeClient, YoutubeComment};
