/// Reduce a parser message to the line a client may see.
///
/// Parsers append source locations, offsets and type paths after a line
/// break (`"Unexpected token\n at [Source: ...; line: 3, column: 8]"`).
/// Only the first line survives, trimmed. A message without a line break
/// is returned as is.
pub fn strip_location(message: &str) -> &str {
    match message.find(['\n', '\r']) {
        Some(end) => message[..end].trim(),
        None => message,
    }
}
