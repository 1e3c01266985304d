//! Hostname derivation from the configured template.

use core::fmt::Write as _;

use heapless::String;

use super::config::{HOSTNAME_FALLBACK_TEMPLATE, HOSTNAME_MAX};


/// Room for the template plus a fully expanded decimal device id.
const EXPANDED_MAX: usize = HOSTNAME_MAX + 10;

/// Turns `template` into a protocol-legal hostname.
///
/// The first `%u` in the template is replaced with the decimal device id.
/// The result is then filtered: ASCII alphanumerics pass through, runs of
/// the separator set (space `_` `-` `+` `!` `?` `*`) collapse to a single
/// hyphen, everything else is dropped. A leading separator run contributes
/// nothing and trailing hyphens are stripped. If nothing survives, the
/// fixed fallback template is used instead, so the result is never empty.
pub fn sanitize(template: &str, device_id: u32) -> String<HOSTNAME_MAX> {
    let result = filter(&expand(template, device_id));
    if result.is_empty() {
        // The fallback expands to alphanumerics and one separator, so a
        // second pass cannot come up empty again.
        return filter(&expand(HOSTNAME_FALLBACK_TEMPLATE, device_id));
    }
    result
}

fn expand(template: &str, device_id: u32) -> String<EXPANDED_MAX> {
    let mut out = String::new();
    let mut substituted = false;
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !substituted && bytes[i] == b'%' && bytes.get(i + 1) == Some(&b'u') {
            let _ = write!(out, "{}", device_id);
            substituted = true;
            i += 2;
            continue;
        }
        if out.push(bytes[i] as char).is_err() {
            break;
        }
        i += 1;
    }
    out
}

fn filter(candidate: &str) -> String<HOSTNAME_MAX> {
    let mut out = String::new();
    let mut pending_separator = false;
    for ch in candidate.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() && out.push('-').is_err() {
                break;
            }
            pending_separator = false;
            if out.push(ch).is_err() {
                break;
            }
        } else if matches!(ch, ' ' | '_' | '-' | '+' | '!' | '?' | '*') {
            pending_separator = true;
        }
        // Any other character is dropped without leaving a hyphen behind.
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
