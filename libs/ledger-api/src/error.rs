/// Категория сбоя хранилища. Вызывающий ветвится по ней (retry, 504,
/// пропуск сообщения), а не по тексту ошибки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backend недоступен или соединение оборвалось посреди вызова.
    Unavailable,
    /// Backend отклонил запись (дубликат id, валидация, переполнение).
    WriteRejected,
    /// Операция не уложилась в deadline.
    Timeout,
    /// Сохранённый документ не удалось превратить обратно в запись.
    Decode,
    /// Неверная строка подключения или настройки backend'а. Постоянная ошибка.
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Unavailable => f.write_str("unavailable"),
            ErrorKind::WriteRejected => f.write_str("write rejected"),
            ErrorKind::Timeout => f.write_str("timeout"),
            ErrorKind::Decode => f.write_str("decode"),
            ErrorKind::Config => f.write_str("config"),
        }
    }
}

/// Ошибка любого метода [`DocumentStore`](crate::DocumentStore)
/// и store gateway.
#[derive(Clone)]
pub struct StoreError {
    kind: ErrorKind,
    message: String,
}

impl StoreError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, msg)
    }

    pub fn write_rejected(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::WriteRejected, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, msg)
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Добавить в начало сообщения упавшую операцию, kind сохраняется.
    pub fn with_context(self, context: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
        }
    }
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind() {
        let err = StoreError::timeout("exceeded 5s").with_context("insert");
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.message(), "insert: exceeded 5s");
        assert_eq!(err.to_string(), "timeout: insert: exceeded 5s");
    }
}
