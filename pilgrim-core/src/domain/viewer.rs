const GUEST_LIKES_KEY: &str = "guest_likes";

/// Кто смотрит ленту: авторизованный пользователь или гость.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Guest,
    User(String),
}

impl Viewer {
    /// Пустой или пробельный uid считается гостем.
    pub fn from_user_id(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim) {
            Some(uid) if !uid.is_empty() => Self::User(uid.to_string()),
            _ => Self::Guest,
        }
    }

    /// Ключ локального списка лайков: `likes_<uid>` или `guest_likes`.
    pub fn likes_key(&self) -> String {
        match self {
            Self::User(uid) => format!("likes_{uid}"),
            Self::Guest => GUEST_LIKES_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Viewer;

    #[test]
    fn likes_key_depends_on_authentication() {
        assert_eq!(Viewer::User("u42".to_string()).likes_key(), "likes_u42");
        assert_eq!(Viewer::Guest.likes_key(), "guest_likes");
    }

    #[test]
    fn blank_user_id_falls_back_to_guest() {
        assert_eq!(Viewer::from_user_id(Some("  ")), Viewer::Guest);
        assert_eq!(Viewer::from_user_id(None), Viewer::Guest);
        assert_eq!(
            Viewer::from_user_id(Some(" u1 ")),
            Viewer::User("u1".to_string())
        );
    }
}
