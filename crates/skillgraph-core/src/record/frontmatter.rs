//! Splitting file text into the YAML header and the body.

use super::RecordError;

const DELIMITER: &str = "---";

/// Split `raw` into `(yaml, body)`.
///
/// Returns `Ok(None)` when the text does not open with a `---` line.
pub(super) fn split(raw: &str) -> Result<Option<(&str, &str)>, RecordError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let Some(first_end) = text.find('\n') else {
        // A lone `---` with nothing after it never closes.
        return if is_delimiter(text) {
            Err(RecordError::UnterminatedFrontMatter)
        } else {
            Ok(None)
        };
    };

    if !is_delimiter(&text[..first_end]) {
        return Ok(None);
    }

    let header_start = first_end + 1;
    let mut line_start = header_start;

    while line_start <= text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(text.len());

        if is_delimiter(&text[line_start..line_end]) {
            let yaml = &text[header_start..line_start];
            let body = text.get(line_end + 1..).unwrap_or("");
            return Ok(Some((yaml, body)));
        }

        if line_end == text.len() {
            break;
        }
        line_start = line_end + 1;
    }

    Err(RecordError::UnterminatedFrontMatter)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}
