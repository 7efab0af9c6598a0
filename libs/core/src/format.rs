use crate::Submission;
use time::OffsetDateTime;
use time::macros::format_description;

/// Escapes text for Telegram's HTML parse mode.
///
/// Telegram only understands `&lt;`, `&gt;`, `&amp;`, `&quot;` and numeric entities, so the single
/// quote is written as `&#39;`.
///
/// ```
/// use lead_core::escape_html;
///
/// assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"),
///            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
/// ```
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders `at` as `dd.mm.yyyy HH:MM:SS` in its own offset.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year] [hour]:[minute]:[second]");
    at.format(&format)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Builds the HTML notification posted to the Telegram chat.
///
/// ```
/// use lead_core::{format_notification, Submission};
/// use time::macros::datetime;
///
/// let text = format_notification(
///     &Submission::new("Ivan", "+7 999", "Moscow"),
///     datetime!(2024-03-01 15:04:05 +3),
/// );
/// assert!(text.contains("<b>Имя:</b> Ivan"));
/// assert!(text.ends_with("01.03.2024 15:04:05"));
/// ```
pub fn format_notification(submission: &Submission, submitted_at: OffsetDateTime) -> String {
    [
        "📩 <b>Новая заявка с лендинга</b>".to_string(),
        String::new(),
        format!("👤 <b>Имя:</b> {}", escape_html(&submission.name)),
        format!("📞 <b>Телефон:</b> {}", escape_html(&submission.phone)),
        format!("📍 <b>Адрес:</b> {}", escape_html(&submission.address)),
        format!(
            "🕒 <b>Время:</b> {}",
            escape_html(&format_timestamp(submitted_at))
        ),
    ]
    .join("\n")
}
