use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::post::Post;

/// Окно ранжирования: сколько времени назад отсчитывать от "сейчас".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RankingWindow {
    #[serde(rename = "1h")]
    LastHour,
    #[default]
    #[serde(rename = "1d")]
    LastDay,
    #[serde(rename = "1w")]
    LastWeek,
    #[serde(rename = "1m")]
    LastMonth,
}

impl RankingWindow {
    pub const ALL: [RankingWindow; 4] = [
        Self::LastHour,
        Self::LastDay,
        Self::LastWeek,
        Self::LastMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastHour => "1h",
            Self::LastDay => "1d",
            Self::LastWeek => "1w",
            Self::LastMonth => "1m",
        }
    }

    /// Фиксированная длительность окна. Месяц считается как 30 суток.
    pub fn offset(&self) -> Duration {
        match self {
            Self::LastHour => Duration::hours(1),
            Self::LastDay => Duration::hours(24),
            Self::LastWeek => Duration::days(7),
            Self::LastMonth => Duration::days(30),
        }
    }

    /// Начало окна относительно `now`.
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.offset()
    }
}

impl fmt::Display for RankingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingWindow {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1h" => Ok(Self::LastHour),
            "1d" => Ok(Self::LastDay),
            "1w" => Ok(Self::LastWeek),
            "1m" => Ok(Self::LastMonth),
            _ => Err(DomainError::Validation {
                field: "window",
                message: "must be one of 1h, 1d, 1w, 1m",
            }),
        }
    }
}

/// Стабильная сортировка по лайкам по убыванию: при равенстве сохраняется
/// исходный порядок хранилища.
pub fn sort_by_likes_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.likes.cmp(&a.likes));
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{RankingWindow, sort_by_likes_desc};
    use crate::domain::post::{Post, PostId};

    #[test]
    fn windows_parse_from_short_codes() {
        for window in RankingWindow::ALL {
            let parsed: RankingWindow = window.as_str().parse().expect("code must parse");
            assert_eq!(parsed, window);
        }
        assert!("2d".parse::<RankingWindow>().is_err());
    }

    #[test]
    fn month_window_is_thirty_days() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let start = RankingWindow::LastMonth.start_from(now);
        assert_eq!(now - start, Duration::days(30));
    }

    #[test]
    fn window_serializes_as_short_code() {
        let json = serde_json::to_string(&RankingWindow::LastWeek).expect("must serialize");
        assert_eq!(json, "\"1w\"");
    }

    #[test]
    fn sort_keeps_store_order_for_ties() {
        let mut posts = vec![post("a", 1), post("b", 5), post("c", 1), post("d", 5)];
        sort_by_likes_desc(&mut posts);
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    fn post(id: &str, likes: u64) -> Post {
        Post {
            id: PostId::new(id),
            text: "text".to_string(),
            image_url: None,
            locations: Vec::new(),
            location_names: Vec::new(),
            created_at: Utc::now(),
            likes,
            deleted: None,
        }
    }
}
