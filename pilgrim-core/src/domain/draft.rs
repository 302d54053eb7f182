use super::error::DomainError;
use super::post::{GeoPoint, normalize_text};

/// Точка маршрута с подписью.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub point: GeoPoint,
    pub name: String,
}

/// Изображение, которое нужно загрузить вместе с постом.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Черновик поста до публикации.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub text: String,
    pub image: Option<ImageUpload>,
    pub waypoints: Vec<Waypoint>,
}

impl PostDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Переименовывает точку маршрута. Пустое имя не допускается.
    pub fn rename_waypoint(&mut self, index: usize, name: &str) -> Result<(), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation {
                field: "name",
                message: "must not be empty",
            });
        }
        let waypoint = self
            .waypoints
            .get_mut(index)
            .ok_or_else(|| DomainError::NotFound(format!("waypoint index: {index}")))?;
        waypoint.name = name.to_string();
        Ok(())
    }

    pub fn remove_waypoint(&mut self, index: usize) -> Result<Waypoint, DomainError> {
        if index >= self.waypoints.len() {
            return Err(DomainError::NotFound(format!("waypoint index: {index}")));
        }
        Ok(self.waypoints.remove(index))
    }

    /// Проверяет, что черновик можно публиковать: текст не пустой и есть хотя бы одна точка.
    pub fn validate(self) -> Result<Self, DomainError> {
        let text = normalize_text(&self.text)?;
        if self.waypoints.is_empty() {
            return Err(DomainError::Validation {
                field: "locations",
                message: "at least one waypoint is required",
            });
        }
        Ok(Self { text, ..self })
    }
}

#[cfg(test)]
mod tests {
    use super::{PostDraft, Waypoint};
    use crate::domain::error::DomainError;
    use crate::domain::post::GeoPoint;

    fn draft_with_waypoint() -> PostDraft {
        let mut draft = PostDraft::new("  route  ");
        draft.waypoints.push(Waypoint {
            point: GeoPoint { lat: 26.2, lng: 127.7 },
            name: "Naha".to_string(),
        });
        draft
    }

    #[test]
    fn validate_trims_text() {
        let draft = draft_with_waypoint().validate().expect("draft must validate");
        assert_eq!(draft.text, "route");
    }

    #[test]
    fn validate_requires_waypoint() {
        let err = PostDraft::new("route")
            .validate()
            .expect_err("draft without waypoints must fail");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "locations",
                ..
            }
        ));
    }

    #[test]
    fn rename_waypoint_updates_label() {
        let mut draft = draft_with_waypoint();
        draft
            .rename_waypoint(0, "  Shuri Castle ")
            .expect("rename must succeed");
        assert_eq!(draft.waypoints[0].name, "Shuri Castle");
    }

    #[test]
    fn rename_waypoint_rejects_unknown_index_and_blank_name() {
        let mut draft = draft_with_waypoint();
        assert!(matches!(
            draft.rename_waypoint(3, "x"),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            draft.rename_waypoint(0, "  "),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn remove_waypoint_returns_removed_point() {
        let mut draft = draft_with_waypoint();
        let removed = draft.remove_waypoint(0).expect("remove must succeed");
        assert_eq!(removed.name, "Naha");
        assert!(draft.waypoints.is_empty());
    }
}
