//! Localized plain-text mail bodies.

use kwiki_core::language::Language;

/// Subject and body of a mail ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
}

/// Mail carrying a registration verification code.
pub fn auth_code(language: Language, code: &str, ttl_mins: i64) -> OutgoingMail {
    let (subject, body) = match language {
        Language::Ko => (
            "[K-Wiki] 인증 코드".to_string(),
            format!("인증 코드: {code}\n이 코드는 {ttl_mins}분 후에 만료됩니다."),
        ),
        Language::Ja => (
            "[K-Wiki] 認証コード".to_string(),
            format!("認証コード: {code}\nこのコードは{ttl_mins}分後に失効します。"),
        ),
        Language::En => (
            "[K-Wiki] Your verification code".to_string(),
            format!("Your verification code is {code}.\nIt expires in {ttl_mins} minutes."),
        ),
    };
    OutgoingMail { subject, body }
}

/// Mail sent instead of a code when the address is already registered.
pub fn registration_conflict(language: Language) -> OutgoingMail {
    let (subject, body) = match language {
        Language::Ko => (
            "[K-Wiki] 회원가입 시도 안내",
            "이 이메일 주소는 이미 등록되어 있습니다. 본인이 시도하지 않았다면 이 메일을 무시하세요.",
        ),
        Language::Ja => (
            "[K-Wiki] 登録試行のお知らせ",
            "このメールアドレスは既に登録されています。心当たりがない場合はこのメールを無視してください。",
        ),
        Language::En => (
            "[K-Wiki] Registration attempt",
            "This email address is already registered. If this was not you, ignore this mail.",
        ),
    };
    OutgoingMail {
        subject: subject.to_string(),
        body: body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_code_mail_contains_code_and_ttl() {
        for language in Language::ALL {
            let mail = auth_code(language, "042917", 15);
            assert!(mail.body.contains("042917"));
            assert!(mail.body.contains("15"));
            assert!(mail.subject.starts_with("[K-Wiki]"));
        }
    }

    #[test]
    fn conflict_mail_never_contains_a_code() {
        let mail = registration_conflict(Language::En);
        assert!(!mail.body.chars().any(|c| c.is_ascii_digit()));
    }
}
