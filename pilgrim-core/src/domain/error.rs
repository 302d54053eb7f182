use thiserror::Error;

/// Ошибки доменного и прикладного слоя.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Нарушено правило валидации поля.
    #[error("validation failed for '{field}': {message}")]
    Validation {
        /// Имя поля.
        field: &'static str,
        /// Описание нарушения.
        message: &'static str,
    },

    /// Запись не найдена.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Запрос к хранилищу постов не выполнен (сеть, индекс, фильтр).
    #[error("store query failed: {0}")]
    Query(String),

    /// Не удалось загрузить изображение.
    #[error("image upload failed: {0}")]
    Upload(String),

    /// Локальный список лайков не читается или не сохраняется.
    #[error("local likes state is unusable: {0}")]
    LocalState(String),

    /// Прочие ошибки.
    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
