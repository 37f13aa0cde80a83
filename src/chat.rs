//! WhatsApp chat-export reader.
//!
//! Two header styles are recognised:
//!
//! ```text
//! [7/31/25, 5:20:16 AM] ~ Dealer Name: text      (iOS)
//! 7/31/25, 5:20 PM - +1 (555) 010-2030: text     (Android)
//! ```
//!
//! Lines that do not start with a header continue the previous message.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;

const IMAGE_MARKER: &str = "image omitted";
/// Invisible direction marks WhatsApp sprinkles into exports.
const DIRECTION_MARKS: &[char] = &['\u{200e}', '\u{200f}'];

static IOS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<date>\d{1,2}/\d{1,2}/\d{2,4}),\s*(?P<time>\d{1,2}:\d{2}(?::\d{2})?\s*[AaPp][Mm])\]\s*(?P<sender>[^:]+?):\s?(?P<text>.*)$",
    )
    .expect("valid ios header regex")
});
static ANDROID_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<date>\d{1,2}/\d{1,2}/\d{2,4}),\s*(?P<time>\d{1,2}:\d{2}(?::\d{2})?\s*[AaPp][Mm])\s+-\s+(?P<sender>[^:]+?):\s?(?P<text>.*)$",
    )
    .expect("valid android header regex")
});
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s()\-]{7,}$").expect("valid phone regex"));

/// One message from a dealer group export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealerMessage {
    pub timestamp: NaiveDateTime,
    /// Display name, or the phone number when the sender has no saved name.
    pub sender: String,
    pub phone: Option<String>,
    pub text: String,
    pub has_image: bool,
}

pub async fn read_export(path: impl AsRef<Path>) -> Result<Vec<DealerMessage>> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let messages = parse_export(&content);
    info!(
        "Parsed {} messages with text from {}",
        messages.len(),
        path.as_ref().display()
    );
    Ok(messages)
}

/// Parse a whole export. Headers with an unreadable date or time are
/// skipped together with their continuation lines; the rest of the export
/// is still read.
pub fn parse_export(content: &str) -> Vec<DealerMessage> {
    let mut messages = Vec::new();
    let mut current: Option<DealerMessage> = None;
    let mut skipping = false;

    for raw_line in content.lines() {
        let line = raw_line.trim_start_matches(DIRECTION_MARKS);
        let caps = IOS_HEADER
            .captures(line)
            .or_else(|| ANDROID_HEADER.captures(line));

        match caps {
            Some(caps) => {
                if let Some(done) = current.take() {
                    push_message(&mut messages, done);
                }
                match header_to_message(&caps) {
                    Some(message) => {
                        current = Some(message);
                        skipping = false;
                    }
                    None => {
                        warn!(header = line, "skipping message with unreadable timestamp");
                        skipping = true;
                    }
                }
            }
            None if skipping => {}
            None => {
                if let Some(message) = current.as_mut() {
                    message.text.push('\n');
                    message.text.push_str(line);
                }
            }
        }
    }
    if let Some(done) = current.take() {
        push_message(&mut messages, done);
    }

    messages
}

fn header_to_message(caps: &Captures<'_>) -> Option<DealerMessage> {
    let timestamp = parse_timestamp(&caps["date"], &caps["time"])?;

    let sender = caps["sender"].trim().trim_start_matches('~').trim().to_string();
    let phone = PHONE.is_match(&sender).then(|| sender.clone());

    Some(DealerMessage {
        timestamp,
        sender,
        phone,
        text: caps["text"].to_string(),
        has_image: false,
    })
}

/// `m/d/yy` or `m/d/yyyy` plus `h:mm[:ss] AM|PM`. Two-digit years are 20xx.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let mut parts = date.split('/').map(|p| p.parse::<u32>().ok());
    let (month, day, year) = (parts.next()??, parts.next()??, parts.next()??);
    let year = if year < 100 { 2000 + year } else { year };
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;

    let time: String = time
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    let time = if time.ends_with("AM") || time.ends_with("PM") {
        let (clock, meridiem) = time.split_at(time.len() - 2);
        format!("{} {}", clock.trim_end(), meridiem)
    } else {
        time
    };
    let time = NaiveTime::parse_from_str(&time, "%I:%M:%S %p")
        .or_else(|_| NaiveTime::parse_from_str(&time, "%I:%M %p"))
        .ok()?;

    Some(date.and_time(time))
}

fn push_message(messages: &mut Vec<DealerMessage>, mut message: DealerMessage) {
    let cleaned: String = message.text.chars().filter(|c| !DIRECTION_MARKS.contains(c)).collect();
    message.has_image = cleaned.contains(IMAGE_MARKER);
    message.text = cleaned.replace(IMAGE_MARKER, "").trim().to_string();
    if !message.text.is_empty() {
        messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
[7/31/25, 5:20:16 AM] ~ Tony Watches: Sub 1680 tiffany dial $30000
full set, unpolished
[7/31/25, 5:21:02 AM] +1 (305) 555-0142: \u{200e}image omitted
[13/45/25, 5:22:00 AM] ~ Broken: GMT 1675 $18000
this line belongs to the broken message
[7/31/25, 5:23:40 PM] ~ Mike: \u{200e}image omitted GMT 16710 pepsi $15,500
";

    #[test]
    fn parses_ios_export() {
        let messages = parse_export(EXPORT);
        assert_eq!(messages.len(), 2);

        let first = &messages[0];
        assert_eq!(first.sender, "Tony Watches");
        assert_eq!(first.phone, None);
        assert_eq!(first.text, "Sub 1680 tiffany dial $30000\nfull set, unpolished");
        assert_eq!(
            first.timestamp,
            NaiveDate::from_ymd_opt(2025, 7, 31)
                .unwrap()
                .and_hms_opt(5, 20, 16)
                .unwrap()
        );

        let second = &messages[1];
        assert_eq!(second.sender, "Mike");
        assert!(second.has_image);
        assert_eq!(second.text, "GMT 16710 pepsi $15,500");
        assert_eq!(second.timestamp.time(), NaiveTime::from_hms_opt(17, 23, 40).unwrap());
    }

    #[test]
    fn bad_timestamp_drops_only_that_message() {
        let messages = parse_export(EXPORT);
        assert!(messages.iter().all(|m| m.sender != "Broken"));
        assert!(messages.iter().all(|m| !m.text.contains("broken message")));
    }

    #[test]
    fn parses_android_export_with_phone_sender() {
        let export = "8/2/2025, 9:05 PM - +44 7700 900123: Daytona 116500LN white $31,000\n";
        let messages = parse_export(export);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].phone.as_deref(), Some("+44 7700 900123"));
        assert_eq!(messages[0].sender, "+44 7700 900123");
        assert_eq!(messages[0].timestamp.time(), NaiveTime::from_hms_opt(21, 5, 0).unwrap());
    }

    #[test]
    fn narrow_space_before_meridiem() {
        let ts = parse_timestamp("7/31/25", "5:20:16\u{202f}AM").unwrap();
        assert_eq!(ts.time(), NaiveTime::from_hms_opt(5, 20, 16).unwrap());
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert!(parse_timestamp("2/30/25", "1:00 PM").is_none());
        assert!(parse_timestamp("7/31", "1:00 PM").is_none());
        assert!(parse_timestamp("7/31/25", "13:00 PM").is_none());
    }
}
