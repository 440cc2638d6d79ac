//! String formatting utilities.
//!
//! Provides helpers for shortening hashes in log output and for escaping
//! user-supplied text before it is placed into HTML.

/// Utility function to truncate a hex string for display purposes.
///
/// Shows only the first 10 characters followed by ".." for longer strings,
/// which keeps the `0x` prefix plus four bytes of a hash.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Escapes the characters that are significant in HTML text and attributes.
pub fn escape_html(input: &str) -> String {
	let mut escaped = String::with_capacity(input.len());
	for c in input.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			_ => escaped.push(c),
		}
	}
	escaped
}
