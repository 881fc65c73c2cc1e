//! Live reload script injection.

use crate::utils::mime::is_html;

/// Inject the reload script tag when serving HTML with live reload on.
pub fn maybe_inject_reload(body: Vec<u8>, content_type: &str, reload: bool) -> Vec<u8> {
    if reload && is_html(content_type) {
        inject_reload_script(&body)
    } else {
        body
    }
}

/// Insert the script before the last `</body>`, or append when missing.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let script = crate::embed::serve::script_tag();
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script_bytes);
    result.extend_from_slice(&content[pos..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::serve::script_tag;
    use crate::utils::mime::types::{CSS, HTML};

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>x</p></BODY></html>".to_vec();
        let out = String::from_utf8(maybe_inject_reload(html, HTML, true)).unwrap();
        assert_eq!(
            out,
            format!("<html><body><p>x</p>{}</BODY></html>", script_tag())
        );
    }

    #[test]
    fn test_inject_appends_without_body() {
        let out = maybe_inject_reload(b"<p>fragment</p>".to_vec(), HTML, true);
        assert!(String::from_utf8(out).unwrap().ends_with(&script_tag()));
    }

    #[test]
    fn test_no_injection_for_other_types_or_disabled() {
        let css = b".a{}".to_vec();
        assert_eq!(maybe_inject_reload(css.clone(), CSS, true), css);

        let html = b"<body></body>".to_vec();
        assert_eq!(maybe_inject_reload(html.clone(), HTML, false), html);
    }
}
