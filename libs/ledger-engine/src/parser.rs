use std::ops::Range;

use ledger_api::{LedgerCode, ParsedMessage};

/// Минимальная длина payload, в которой есть оба поля фиксированной ширины.
pub const MIN_MESSAGE_LEN: usize = 7;

const METER: Range<usize> = 0..4;
const CODE: Range<usize> = 4..7;

/// Почему payload не стал записью.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("message too short ({len} bytes, need at least {MIN_MESSAGE_LEN})")]
    TooShort { len: usize },

    #[error("ledger code field '{field}' is not a base-10 integer")]
    MalformedLedgerCode { field: String },

    #[error("message is not valid UTF-8")]
    NotUtf8,
}

impl Rejection {
    /// Стабильная метка для логов.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::TooShort { .. } => "too_short",
            Rejection::MalformedLedgerCode { .. } => "malformed_ledger_code",
            Rejection::NotUtf8 => "not_utf8",
        }
    }
}

/// Разобрать сырой payload из bus на поля фиксированной ширины.
///
/// Байты 0..4 это meter, байты 4..7 это ledger code (три ASCII-цифры,
/// ведущие нули допустимы). Остальное попадает только в `raw_message`.
/// Чистая функция: без I/O и часов.
pub fn parse(raw: &[u8]) -> Result<ParsedMessage, Rejection> {
    if raw.len() < MIN_MESSAGE_LEN {
        return Err(Rejection::TooShort { len: raw.len() });
    }

    let code_field = &raw[CODE];
    if !code_field.iter().all(u8::is_ascii_digit) {
        return Err(Rejection::MalformedLedgerCode {
            field: String::from_utf8_lossy(code_field).into_owned(),
        });
    }

    let text = std::str::from_utf8(raw).map_err(|_| Rejection::NotUtf8)?;
    let ledger_code = code_field
        .iter()
        .fold(0, |acc: LedgerCode, d| acc * 10 + LedgerCode::from(d - b'0'));

    // Байт 4 это ASCII-цифра, значит 4 граница символа.
    Ok(ParsedMessage {
        ledger_meter: text[METER].to_string(),
        ledger_code,
        raw_message: text.to_string(),
    })
}
