//! Terminal rendering of article timelines.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use feedlybd_ingest::Article;

const MINUTE_SECS: i64 = 60;
const HOUR_SECS: i64 = 60 * MINUTE_SECS;
const DAY_SECS: i64 = 24 * HOUR_SECS;

/// Human-friendly age of `published_at` (epoch ms) relative to `now`.
///
/// Anything under a week is relative ("5m ago", "3h ago", "2d ago"); older
/// timestamps print as a calendar date in `now`'s zone.
pub(crate) fn format_relative_time<Tz>(published_at: i64, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(published) = DateTime::from_timestamp_millis(published_at) else {
        return "unknown date".to_string();
    };

    let seconds = now
        .timestamp_millis()
        .saturating_sub(published_at)
        .div_euclid(1_000);

    if seconds < MINUTE_SECS {
        "just now".to_string()
    } else if seconds < HOUR_SECS {
        format!("{}m ago", seconds / MINUTE_SECS)
    } else if seconds < DAY_SECS {
        format!("{}h ago", seconds / HOUR_SECS)
    } else if seconds < 7 * DAY_SECS {
        format!("{}d ago", seconds / DAY_SECS)
    } else {
        published
            .with_timezone(&now.timezone())
            .format("%b %-d, %Y")
            .to_string()
    }
}

pub(crate) fn print_timeline<Tz>(articles: &[Article], now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if articles.is_empty() {
        println!("no articles");
        return;
    }
    for article in articles {
        println!(
            "{:>12}  [{}] {}",
            format_relative_time(article.published_at, now),
            article.source_title,
            article.title
        );
        if !article.summary.is_empty() {
            println!("{:>12}  {}", "", article.summary);
        }
        println!("{:>12}  {}", "", article.link);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    fn ago(seconds: i64) -> i64 {
        now().timestamp_millis() - seconds * 1_000
    }

    #[test]
    fn recent_is_just_now() {
        assert_eq!(format_relative_time(ago(0), &now()), "just now");
        assert_eq!(format_relative_time(ago(59), &now()), "just now");
    }

    #[test]
    fn future_timestamps_are_just_now() {
        assert_eq!(format_relative_time(ago(-3_600), &now()), "just now");
    }

    #[test]
    fn minutes_hours_and_days() {
        assert_eq!(format_relative_time(ago(60), &now()), "1m ago");
        assert_eq!(format_relative_time(ago(59 * 60), &now()), "59m ago");
        assert_eq!(format_relative_time(ago(3 * 3_600), &now()), "3h ago");
        assert_eq!(format_relative_time(ago(2 * 86_400), &now()), "2d ago");
        assert_eq!(format_relative_time(ago(7 * 86_400 - 1), &now()), "6d ago");
    }

    #[test]
    fn older_than_a_week_is_a_date() {
        assert_eq!(format_relative_time(ago(8 * 86_400), &now()), "May 2, 2024");
    }

    #[test]
    fn out_of_range_timestamp_is_unknown() {
        assert_eq!(format_relative_time(i64::MAX, &now()), "unknown date");
    }
}
