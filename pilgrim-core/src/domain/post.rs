use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateUrl;

use super::error::DomainError;

/// Непрозрачный идентификатор поста, назначаемый хранилищем.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PostId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Точка маршрута на карте.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Широта, градусы.
    pub lat: f64,
    /// Долгота, градусы.
    pub lng: f64,
}

impl GeoPoint {
    /// Создаёт точку, проверяя диапазоны координат.
    pub fn new(lat: f64, lng: f64) -> Result<Self, DomainError> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(DomainError::Validation {
                field: "lat",
                message: "must be within -90..90",
            });
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(DomainError::Validation {
                field: "lng",
                message: "must be within -180..180",
            });
        }
        Ok(())
    }
}

/// Пост с маршрутом паломничества.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub image_url: Option<String>,
    pub locations: Vec<GeoPoint>,
    /// По индексу совпадают с `locations`.
    pub location_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    /// `None` у документов, где поле не заполнено; такой пост не удалён.
    pub deleted: Option<bool>,
}

impl Post {
    /// `true`, если пост помечен удалённым.
    pub fn is_deleted(&self) -> bool {
        self.deleted == Some(true)
    }
}

/// Документ поста в том виде, в каком его отдаёт хранилище.
///
/// Необязательные поля допускают отсутствие; `TryFrom<PostDocument> for Post`
/// подставляет значения по умолчанию и отклоняет некорректные документы.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostDocument {
    pub id: String,
    pub text: String,
    pub image_url: Option<String>,
    pub locations: Vec<GeoPoint>,
    pub location_names: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub likes: Option<i64>,
    pub deleted: Option<bool>,
}

impl TryFrom<PostDocument> for Post {
    type Error = DomainError;

    fn try_from(doc: PostDocument) -> Result<Self, Self::Error> {
        let id = doc.id.trim();
        if id.is_empty() {
            return Err(DomainError::Validation {
                field: "id",
                message: "must not be empty",
            });
        }
        let text = normalize_text(&doc.text)?;
        let image_url = normalize_image_url(doc.image_url)?;
        validate_locations(&doc.locations, &doc.location_names)?;

        let created_at = doc.created_at.ok_or(DomainError::Validation {
            field: "createdAt",
            message: "must be set",
        })?;

        let likes = match doc.likes {
            None => 0,
            Some(value) => u64::try_from(value).map_err(|_| DomainError::Validation {
                field: "likes",
                message: "must be >= 0",
            })?,
        };

        Ok(Self {
            id: PostId::new(id),
            text,
            image_url,
            locations: doc.locations,
            location_names: doc.location_names,
            created_at,
            likes,
            deleted: doc.deleted,
        })
    }
}

pub(crate) fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation {
            field: "text",
            message: "must not be empty",
        });
    }
    Ok(text.to_string())
}

pub(crate) fn normalize_image_url(url: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(url) = url else {
        return Ok(None);
    };
    let url = url.trim().to_string();
    if url.is_empty() {
        return Ok(None);
    }
    let has_web_scheme = url.starts_with("http://") || url.starts_with("https://");
    if !has_web_scheme || !url.validate_url() {
        return Err(DomainError::Validation {
            field: "imageUrl",
            message: "must be an absolute http(s) URL",
        });
    }
    Ok(Some(url))
}

pub(crate) fn validate_locations(
    locations: &[GeoPoint],
    names: &[String],
) -> Result<(), DomainError> {
    if locations.len() != names.len() {
        return Err(DomainError::Validation {
            field: "locationNames",
            message: "must be index-aligned with locations",
        });
    }
    locations.iter().try_for_each(GeoPoint::validate)
}
