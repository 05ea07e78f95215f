//! Shared corpus fixtures.
#![allow(dead_code)]

use botnet_detector::comments::AuthorChannel;
use botnet_detector::Comment;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
}

pub fn at(secs: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(secs)
}

pub fn comment(id: &str, video: &str, author: &str, text: &str, secs: i64) -> Comment {
    Comment::new(id, video, author, text, at(secs))
}

pub const BOT_NAMES: [&str; 5] = [
    "user1234567",
    "user1234576",
    "user1234657",
    "user1234675",
    "user1234756",
];

const POLITICAL_TITLES: [&str; 5] = [
    "Trump and Biden clash before the election",
    "Democrat vs Republican: who wins the vote?",
    "Liberal and conservative policy explained",
    "Government shutdown politics tonight",
    "Election night vote count live",
];

/// Five accounts created two days before posting the same text on the same five
/// political videos, one minute apart.
pub fn bot_comments() -> Vec<Comment> {
    let created = base_time() - Duration::days(2);
    let mut out = Vec::new();
    for (b, name) in BOT_NAMES.iter().enumerate() {
        for (v, title) in POLITICAL_TITLES.iter().enumerate() {
            out.push(
                comment(
                    &format!("bot{b}-v{v}"),
                    &format!("pv{v}"),
                    name,
                    "Vote them all out now, this government has failed us",
                    v as i64 * 60,
                )
                .with_video(*title, "Political News Daily")
                .with_channel(AuthorChannel {
                    author_channel_created_at: Some(created),
                    author_subscriber_count: Some(0),
                    author_video_count: Some(0),
                    author_total_views: Some(0),
                }),
            );
        }
    }
    out
}

const OPENERS: [&str; 7] = [
    "Loved the sourdough segment,",
    "That sunset footage was gorgeous,",
    "My grandfather restored engines,",
    "The violin soundtrack gave chills,",
    "Our cat watched the birds,",
    "Recursion finally clicked today,",
    "The fjord bridge looked unreal,",
];

const MIDDLES: [&str; 11] = [
    "and my lentil curry",
    "though the chess endgame",
    "while the tide pools",
    "plus the museum tour",
    "yet the thunderstorm timelapse",
    "and the paper glider",
    "but the climbing shoes",
    "so the woodworking bench",
    "while my tomato garden",
    "though the library scene",
    "and the autumn hiking trail",
];

const ENDINGS: [&str; 13] = [
    "reminded me of school trips.",
    "deserves more attention honestly.",
    "needs a sequel someday.",
    "made my grandmother laugh.",
    "looked better than expected.",
    "was my favourite bit.",
    "taught me something new.",
    "felt oddly relaxing tonight.",
    "brought back childhood memories.",
    "sparked a long dinner debate.",
    "inspired our weekend plans.",
    "was surprisingly moving.",
    "kept my nephew quiet.",
];

/// Distinct sentence per index below 1001 (7 × 11 × 13).
fn human_line(index: usize) -> String {
    format!(
        "{} {} {}",
        OPENERS[index % OPENERS.len()],
        MIDDLES[index % MIDDLES.len()],
        ENDINGS[index % ENDINGS.len()]
    )
}

/// An established account posting varied comments on distinct videos. Evenings only,
/// a day or three apart with a month-long break after every fifth comment, so fifty
/// comments span about a year. Different `offset_days` give different sentences.
pub fn human_comments(author: &str, videos: usize, offset_days: i64) -> Vec<Comment> {
    let created = base_time() - Duration::days(900);
    let midnight = base_time() - Duration::hours(12);
    let mut day = offset_days;
    (0..videos)
        .map(|i| {
            if i > 0 {
                day += if i % 5 == 0 { 33 + i as i64 % 4 } else { 1 + i as i64 % 3 };
            }
            let when = midnight
                + Duration::days(day)
                + Duration::hours(18 + (3 * i as i64) % 5)
                + Duration::minutes((37 * i as i64 + 11) % 60)
                + Duration::seconds(1 + (13 * i as i64) % 59);
            Comment::new(
                format!("{author}-{i}"),
                format!("{author}-video{i}"),
                author,
                human_line(offset_days as usize * 60 + i),
                when,
            )
            .with_author_name(author.replace('_', " "))
            .with_likes(i as u64 % 4)
            .with_video(format!("Weekend vlog {i}"), format!("Channel {}", i % 5))
            .with_channel(AuthorChannel {
                author_channel_created_at: Some(created),
                ..AuthorChannel::default()
            })
        })
        .collect()
}

/// Five accounts with sequential handles posting one promotional comment each on the
/// same video within a minute. The texts differ only in punctuation and case.
pub fn promo_burst() -> Vec<Comment> {
    const TEXT: &str = "Huge giveaway today, grab free gift cards at promo-boost dot net";
    let variants = [
        format!("{TEXT}!"),
        format!("{TEXT}!!"),
        TEXT.to_string(),
        format!("{}!", TEXT.to_lowercase()),
        format!("{TEXT}!!!"),
    ];
    ["giftdrop_4471", "giftdrop_4472", "giftdrop_4473", "giftdrop_4475", "giftdrop_4476"]
        .iter()
        .zip(variants)
        .enumerate()
        .map(|(i, (name, text))| comment(&format!("promo{i}"), "v1", name, &text, 10 * i as i64 + 5))
        .collect()
}
