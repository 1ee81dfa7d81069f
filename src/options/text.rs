//! 基础文本清理，与语义校验相互独立

use serde_json::Value;

use crate::validation::is_email_local_char;

/// 去除标签、孤立的 `<` 转义、去掉百分号编码、合并空白并去掉首尾空白
pub fn sanitize_text_field(value: &str) -> String {
    let stripped = strip_tags(value);
    let decoded = strip_percent_octets(&stripped);

    decoded
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 仅保留邮箱地址允许的字符
pub fn sanitize_email(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| *c == '@' || is_email_local_char(*c))
        .collect()
}

/// 去掉空白与控制字符；形如域名的值补全 http 协议
pub fn esc_url_raw(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| {
            !c.is_whitespace() && !c.is_control() && !matches!(*c, '<' | '>' | '"' | '\\' | '`')
        })
        .collect();

    if cleaned.is_empty() {
        return cleaned;
    }

    let has_scheme = cleaned.contains(':');
    let looks_like_host = !cleaned.starts_with(['/', '#', '?']) && cleaned.contains('.');
    if !has_scheme && looks_like_host {
        format!("http://{}", cleaned)
    } else {
        cleaned
    }
}

/// 标量转文本；数组、对象和 null 视为空
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        _ => String::new(),
    }
}

fn strip_tags(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '<' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some(next) if next.is_ascii_alphabetic() || matches!(*next, '/' | '!' | '?') => {
                // 跳过整个标签；未闭合时丢弃剩余内容
                for inner in chars.by_ref() {
                    if inner == '>' {
                        break;
                    }
                }
            }
            _ => out.push_str("&lt;"),
        }
    }

    out
}

fn strip_percent_octets(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            i += 3;
            continue;
        }
        let ch = value[i..].chars().next().unwrap_or_default();
        out.push(ch);
        i += ch.len_utf8().max(1);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_text_field() {
        assert_eq!(sanitize_text_field("  hello   world \n"), "hello world");
        assert_eq!(sanitize_text_field("<b>bold</b> text"), "bold text");
        assert_eq!(sanitize_text_field("<script>alert(1)</script>x"), "alert(1)x");
        assert_eq!(sanitize_text_field("a < b"), "a &lt; b");
        assert_eq!(sanitize_text_field("name%20here"), "namehere");
        assert_eq!(sanitize_text_field("tab\tseparated"), "tab separated");
        assert_eq!(sanitize_text_field("unclosed <div class="), "unclosed");
        assert_eq!(sanitize_text_field("Bad_Name!"), "Bad_Name!");
    }

    #[test]
    fn test_sanitize_text_field_keeps_multibyte() {
        assert_eq!(sanitize_text_field(" 电影日记 "), "电影日记");
        assert_eq!(sanitize_text_field("100%"), "100%");
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(sanitize_email(" someone@example.com "), "someone@example.com");
        assert_eq!(sanitize_email("some one@exa mple.com"), "someone@example.com");
        assert_eq!(sanitize_email("<a>@b.com"), "a@b.com");
    }

    #[test]
    fn test_esc_url_raw() {
        assert_eq!(
            esc_url_raw(" https://letterboxd.com/user/ "),
            "https://letterboxd.com/user/"
        );
        assert_eq!(esc_url_raw("letterboxd.com/user"), "http://letterboxd.com/user");
        assert_eq!(esc_url_raw("https://exa mple.com"), "https://example.com");
        assert_eq!(esc_url_raw("/relative/path"), "/relative/path");
        assert_eq!(esc_url_raw("   "), "");
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("abc")), "abc");
        assert_eq!(scalar_text(&json!(50)), "50");
        assert_eq!(scalar_text(&json!(true)), "1");
        assert_eq!(scalar_text(&json!(false)), "");
        assert_eq!(scalar_text(&json!(null)), "");
        assert_eq!(scalar_text(&json!(["a"])), "");
    }
}
