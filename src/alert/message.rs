//! Alert text for each channel kind.
//!
//! All timestamps come from the event, not from the moment of sending, so
//! every channel reports the same time for the same sighting.

use super::DetectionEvent;

pub const PUSH_TITLE: &str = "Security Alert";
pub const ATTACHMENT_NAME: &str = "detection.jpg";

pub fn email_subject(event: &DetectionEvent) -> String {
    format!("Security Alert: {} Human(s) Detected", event.count())
}

pub fn email_body(event: &DetectionEvent) -> String {
    format!(
        "Security Alert!\n\n\
         Time: {}\n\
         Number of humans detected: {}\n\n\
         Please check the attached image for details.\n\n\
         Sent from nightwatch\n",
        event.timestamp.format("%Y-%m-%d %H:%M:%S"),
        event.count()
    )
}

pub fn push_body(event: &DetectionEvent) -> String {
    format!(
        "Human detection alert! {} person(s) detected at {}",
        event.count(),
        event.timestamp.format("%H:%M:%S")
    )
}

pub fn chat_text(event: &DetectionEvent) -> String {
    format!(
        "\u{1F6A8} Security Alert!\n\n{} person(s) detected\nTime: {}",
        event.count(),
        event.timestamp.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BoundingBox, Detection};
    use chrono::{Local, TimeZone};

    fn event(count: usize) -> DetectionEvent {
        let detection = Detection {
            bbox: BoundingBox::new(0, 0, 60, 120),
            confidence: 0.8,
        };
        let timestamp = Local.with_ymd_and_hms(2026, 3, 14, 22, 5, 9).unwrap();
        DetectionEvent::new(vec![detection; count], timestamp, None)
    }

    #[test]
    fn email_mentions_count_and_time() {
        let ev = event(2);
        assert_eq!(email_subject(&ev), "Security Alert: 2 Human(s) Detected");
        let body = email_body(&ev);
        assert!(body.contains("Time: 2026-03-14 22:05:09"));
        assert!(body.contains("Number of humans detected: 2"));
    }

    #[test]
    fn push_body_uses_clock_time() {
        assert_eq!(
            push_body(&event(1)),
            "Human detection alert! 1 person(s) detected at 22:05:09"
        );
    }

    #[test]
    fn chat_text_starts_with_siren() {
        let text = chat_text(&event(3));
        assert!(text.starts_with('\u{1F6A8}'));
        assert!(text.contains("3 person(s) detected"));
        assert!(text.ends_with("Time: 2026-03-14 22:05:09"));
    }
}
