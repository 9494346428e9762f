//! Credential checks shared by the WiFi and bot adapters.

/// Every byte is in `0x20..=0x7E` (space through tilde).
pub(super) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Safe to splice verbatim into one URL path segment: non-empty,
/// printable, and free of separators that would end the segment.
pub(super) fn is_path_segment_safe(s: &str) -> bool {
    !s.is_empty() && is_printable_ascii(s) && !s.contains(['/', ' ', '?', '#', '%'])
}
