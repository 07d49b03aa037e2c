//! Plain-text rendering of message bodies

/// Wrap width for converted HTML bodies
const BODY_WIDTH: usize = 120;

/// Render a message body for the text archive. HTML bodies are
/// converted to plain text; whitespace is tidied either way.
pub fn render_body(content: &str, is_html: bool) -> String {
    let text = if is_html {
        html2text::from_read(content.as_bytes(), BODY_WIDTH)
    } else {
        content.to_string()
    };
    normalize_whitespace(&text)
}

/// Trim line ends, drop runs of blank lines down to one blank line and
/// collapse horizontal whitespace runs.
fn normalize_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_pending = false;

    for line in text.lines() {
        let collapsed = collapse_spaces(line.trim());
        if collapsed.is_empty() {
            blank_pending = !lines.is_empty();
            continue;
        }
        if blank_pending {
            lines.push(String::new());
            blank_pending = false;
        }
        lines.push(collapsed);
    }

    lines.join("\n")
}

fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last_was_space = false;
    for c in line.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_markup_is_stripped() {
        let html = "<html><body><p>Sehr geehrte Damen   und Herren,</p><p>anbei die Rechnung.</p></body></html>";
        let text = render_body(html, true);
        assert!(!text.contains('<'));
        assert!(text.contains("Sehr geehrte Damen und Herren,"));
        assert!(text.contains("anbei die Rechnung."));
    }

    #[test]
    fn test_entities_are_decoded() {
        let text = render_body("<p>Tom &amp; Jerry, &#8364; 42,00</p>", true);
        assert!(text.contains("Tom & Jerry, € 42,00"));
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(render_body("AT&T <direkt>", false), "AT&T <direkt>");
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let text = "Zeile 1\n\n\n\nZeile 2\n   \nZeile 3";
        assert_eq!(render_body(text, false), "Zeile 1\n\nZeile 2\n\nZeile 3");
    }
}
