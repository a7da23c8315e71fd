//! Input sanitisation applied before any user-supplied value is persisted.
//!
//! Each function either returns a normalised value or fails with a
//! [`SanitizeError`] naming the violated constraint. HTML handling is
//! allow-list based: a small inline subset survives, everything else is
//! stripped or escaped so stored content is safe to render as markup later.

use url::Url;

/// Maximum length accepted for an email address (RFC 5321 transport limit).
pub const EMAIL_MAX: usize = 254;

/// Minimum and maximum digit counts for a phone number (E.164 shape).
pub const PHONE_MIN_DIGITS: usize = 7;
/// Maximum digit count for a phone number.
pub const PHONE_MAX_DIGITS: usize = 15;

/// Constraint violations reported by the sanitisers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    /// The value is empty once trimmed.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The value exceeds the permitted length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Permitted maximum length.
        max: usize,
    },
    /// The value does not match the required format.
    #[error("{field} is not in a recognised format")]
    Format {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl SanitizeError {
    /// Name of the field the violation applies to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } | Self::Format { field } => field,
        }
    }

    /// Short machine-readable code for the violated constraint.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "empty",
            Self::TooLong { .. } => "too_long",
            Self::Format { .. } => "format",
        }
    }
}

fn is_email_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
}

fn is_email_domain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-')
}

fn has_empty_or_edge_dot_labels(part: &str) -> bool {
    part.split('.')
        .any(|label| label.is_empty() || label.starts_with('-') || label.ends_with('-'))
}

/// Normalise an email address: trim, lowercase, and validate its shape.
///
/// Normalisation is idempotent: feeding the output back in returns the same
/// value.
///
/// # Examples
/// ```
/// use backend::domain::sanitize::sanitize_email;
///
/// let email = sanitize_email("  Donor@Example.ORG ").expect("valid email");
/// assert_eq!(email, "donor@example.org");
/// assert_eq!(sanitize_email(&email).expect("idempotent"), email);
/// ```
pub fn sanitize_email(raw: &str) -> Result<String, SanitizeError> {
    const FIELD: &str = "email";

    let email = raw.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(SanitizeError::Empty { field: FIELD });
    }
    if email.chars().count() > EMAIL_MAX {
        return Err(SanitizeError::TooLong {
            field: FIELD,
            max: EMAIL_MAX,
        });
    }

    let mut parts = email.splitn(2, '@');
    let (local, domain) = match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => (local, domain),
        _ => return Err(SanitizeError::Format { field: FIELD }),
    };

    let local_ok = !local.is_empty()
        && local.chars().count() <= 64
        && local.chars().all(is_email_local_char)
        && !local.starts_with('.')
        && !local.ends_with('.');
    let domain_ok = domain.contains('.')
        && domain.chars().all(is_email_domain_char)
        && !has_empty_or_edge_dot_labels(domain);

    if !local_ok || !domain_ok || domain.contains('@') {
        return Err(SanitizeError::Format { field: FIELD });
    }

    Ok(email)
}

/// Normalise a phone number to E.164 shape: optional leading `+`, digits
/// only, separators stripped.
///
/// # Examples
/// ```
/// use backend::domain::sanitize::sanitize_phone;
///
/// let phone = sanitize_phone("+91 (80) 1234-5678").expect("valid phone");
/// assert_eq!(phone, "+918012345678");
/// ```
pub fn sanitize_phone(raw: &str) -> Result<String, SanitizeError> {
    const FIELD: &str = "phone";

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SanitizeError::Empty { field: FIELD });
    }

    let mut normalised = String::with_capacity(trimmed.len());
    for (index, c) in trimmed.chars().enumerate() {
        match c {
            '+' if index == 0 => normalised.push('+'),
            '0'..='9' => normalised.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(SanitizeError::Format { field: FIELD }),
        }
    }

    let digits = normalised.chars().filter(char::is_ascii_digit).count();
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        return Err(SanitizeError::Format { field: FIELD });
    }

    Ok(normalised)
}

fn escape_into(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

/// Normalise free text: trim, drop control characters, escape HTML
/// metacharacters, and enforce a caller-supplied length bound.
///
/// The length bound applies to the input before escaping so a value near the
/// limit is not rejected merely because escaping expanded it.
pub fn sanitize_text(
    field: &'static str,
    raw: &str,
    max_len: usize,
) -> Result<String, SanitizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SanitizeError::Empty { field });
    }
    if trimmed.chars().count() > max_len {
        return Err(SanitizeError::TooLong {
            field,
            max: max_len,
        });
    }

    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if c.is_control() && c != '\n' && c != '\t' {
            continue;
        }
        escape_into(&mut out, c);
    }
    Ok(out)
}

/// Inline tags that survive [`sanitize_html`].
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "br", "em", "i", "li", "ol", "p", "strong", "u", "ul",
];

fn is_allowed_tag(name: &str) -> bool {
    ALLOWED_TAGS.contains(&name)
}

/// Extract a safe `href` value from an `<a>` tag body, if present.
///
/// Only absolute `http`/`https` URLs survive; everything else (including
/// `javascript:` and scheme-relative forms) is dropped.
fn safe_href(attrs: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let start = lower.find("href=")?;
    let tail: String = attrs.chars().skip(start + 5).collect();
    let mut chars = tail.chars();
    let quote = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value: String = chars.take_while(|&c| c != quote).collect();
    let parsed = Url::parse(&value).ok()?;
    matches!(parsed.scheme(), "http" | "https").then_some(value)
}

/// Parsed shape of a single `<...>` token.
struct TagToken {
    name: String,
    attrs: String,
    closing: bool,
}

fn parse_tag(body: &str) -> Option<TagToken> {
    let body = body.trim();
    let (closing, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, body),
    };
    let body = body.strip_suffix('/').unwrap_or(body);
    let mut name = String::new();
    let mut rest = String::new();
    let mut in_name = true;
    for c in body.chars() {
        if in_name && (c.is_ascii_alphanumeric()) {
            name.push(c.to_ascii_lowercase());
        } else {
            in_name = false;
            rest.push(c);
        }
    }
    if name.is_empty() {
        return None;
    }
    Some(TagToken {
        name,
        attrs: rest,
        closing,
    })
}

fn emit_tag(out: &mut String, tag: &TagToken) {
    if tag.closing {
        // Void elements have no closing form worth keeping.
        if tag.name != "br" {
            out.push_str("</");
            out.push_str(&tag.name);
            out.push('>');
        }
        return;
    }
    match tag.name.as_str() {
        "a" => match safe_href(&tag.attrs) {
            Some(href) => {
                out.push_str("<a href=\"");
                out.push_str(&href);
                out.push_str("\" rel=\"noopener\">");
            }
            None => out.push_str("<a>"),
        },
        name => {
            out.push('<');
            out.push_str(name);
            out.push('>');
        }
    }
}

/// Reduce HTML to an allow-listed inline subset.
///
/// Allowed tags keep their element (attributes are dropped, except a safe
/// `href` on `<a>`); disallowed tags are stripped while their text content
/// is kept, escaped. Unterminated markup is escaped rather than guessed at.
///
/// # Examples
/// ```
/// use backend::domain::sanitize::sanitize_html;
///
/// let clean = sanitize_html("<p>In <b>memory</b> of <script>alert(1)</script>Nan</p>");
/// assert_eq!(clean, "<p>In <b>memory</b> of alert(1)Nan</p>");
/// ```
#[must_use]
pub fn sanitize_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '<' {
            escape_into(&mut out, c);
            continue;
        }

        let mut body = String::new();
        let mut terminated = false;
        for tag_char in chars.by_ref() {
            if tag_char == '>' {
                terminated = true;
                break;
            }
            body.push(tag_char);
        }

        if !terminated {
            // Trailing "<rest" never closed: escape it all as text.
            escape_into(&mut out, '<');
            for tail_char in body.chars() {
                escape_into(&mut out, tail_char);
            }
            break;
        }

        match parse_tag(&body) {
            Some(tag) if is_allowed_tag(&tag.name) => emit_tag(&mut out, &tag),
            // Disallowed or malformed tags are stripped; their inner text
            // flows through the outer loop untouched.
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Donor@Example.org", "donor@example.org")]
    #[case("  padded@example.org  ", "padded@example.org")]
    #[case("first.last+tag@sub.example.co", "first.last+tag@sub.example.co")]
    fn email_normalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_email(raw).expect("valid email"), expected);
    }

    #[rstest]
    #[case("no-at-sign.example.org")]
    #[case("two@@example.org")]
    #[case("@example.org")]
    #[case("user@")]
    #[case("user@nodot")]
    #[case("user@-bad.example.org")]
    #[case(".leading@example.org")]
    fn email_rejects_malformed(#[case] raw: &str) {
        assert!(sanitize_email(raw).is_err());
    }

    #[rstest]
    fn email_is_idempotent() {
        let once = sanitize_email(" Donor@Example.ORG ").expect("valid email");
        let twice = sanitize_email(&once).expect("still valid");
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case("+91 (80) 1234-5678", "+918012345678")]
    #[case("080.1234.5678", "08012345678")]
    fn phone_normalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_phone(raw).expect("valid phone"), expected);
    }

    #[rstest]
    #[case("12345")]
    #[case("+1234567890123456")]
    #[case("call-me-maybe")]
    #[case("12+345678")]
    fn phone_rejects_malformed(#[case] raw: &str) {
        assert!(sanitize_phone(raw).is_err());
    }

    #[rstest]
    fn text_escapes_markup_and_drops_control_characters() {
        let cleaned =
            sanitize_text("body", "  hello <world> & \u{7}friends  ", 100).expect("valid text");
        assert_eq!(cleaned, "hello &lt;world&gt; &amp; friends");
    }

    #[rstest]
    fn text_enforces_length_before_escaping() {
        let raw = "<".repeat(10);
        assert!(sanitize_text("body", &raw, 10).is_ok());
        assert_eq!(
            sanitize_text("body", &raw, 9).expect_err("too long").code(),
            "too_long"
        );
    }

    #[rstest]
    #[case("plain text", "plain text")]
    #[case("<b>bold</b>", "<b>bold</b>")]
    #[case("<B>bold</B>", "<b>bold</b>")]
    #[case("<script>alert(1)</script>hi", "alert(1)hi")]
    #[case("<p onclick=\"x()\">hi</p>", "<p>hi</p>")]
    #[case("five < six", "five &lt; six")]
    #[case("<img src=x onerror=alert(1)>", "")]
    fn html_keeps_allow_list_only(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_html(raw), expected);
    }

    #[rstest]
    fn html_keeps_safe_links_and_drops_unsafe_ones() {
        assert_eq!(
            sanitize_html("<a href=\"https://example.org/give\">give</a>"),
            "<a href=\"https://example.org/give\" rel=\"noopener\">give</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\"javascript:alert(1)\">give</a>"),
            "<a>give</a>"
        );
    }

    #[rstest]
    fn html_escapes_unterminated_markup() {
        assert_eq!(sanitize_html("text <b unclosed"), "text &lt;b unclosed");
    }
}
