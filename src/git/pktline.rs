// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Git pkt-line parsing for smart-HTTP ref advertisements.
//!
//! `GET <repo>/info/refs?service=git-upload-pack` answers with a stream of
//! pkt-lines: four hex digits giving the line length (header included) followed
//! by the payload. `0000` is a flush packet. The first ref line carries the
//! capability list after a NUL byte.

use thiserror::Error;

/// A ref advertised by a remote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvertisedRef {
    pub object_id: String,
    /// Full ref name, e.g. `refs/heads/master`
    pub name: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PktLineError {
    #[error("invalid pkt-line length at offset {offset}")]
    InvalidLength { offset: usize },

    #[error("truncated pkt-line at offset {offset}: expected {expected} bytes")]
    Truncated { offset: usize, expected: usize },

    #[error("pkt-line at offset {offset} is not a ref advertisement")]
    Malformed { offset: usize },
}

/// Parse a smart-HTTP ref advertisement body.
///
/// # Errors
///
/// Returns [`PktLineError`] if the body is not a well-formed pkt-line stream.
pub fn parse_ref_advertisement(body: &[u8]) -> Result<Vec<AdvertisedRef>, PktLineError> {
    let mut refs = Vec::new();
    let mut offset = 0;

    while offset < body.len() {
        let header = body
            .get(offset..offset + 4)
            .ok_or(PktLineError::Truncated {
                offset,
                expected: 4,
            })?;
        let length = std::str::from_utf8(header)
            .ok()
            .and_then(|h| usize::from_str_radix(h, 16).ok())
            .ok_or(PktLineError::InvalidLength { offset })?;

        // flush, delimiter and response-end packets carry no payload
        if length <= 2 {
            offset += 4;
            continue;
        }
        if length < 4 {
            return Err(PktLineError::InvalidLength { offset });
        }

        let payload = body
            .get(offset + 4..offset + length)
            .ok_or(PktLineError::Truncated {
                offset,
                expected: length,
            })?;
        let line_offset = offset;
        offset += length;

        let line = String::from_utf8_lossy(payload);
        let line = line.trim_end_matches('\n');

        if line.starts_with("# service=") || line.starts_with("version ") {
            continue;
        }

        let line = line.split('\0').next().unwrap_or_default();
        let (object_id, name) = line
            .split_once(' ')
            .ok_or(PktLineError::Malformed {
                offset: line_offset,
            })?;

        if !is_object_id(object_id) {
            return Err(PktLineError::Malformed {
                offset: line_offset,
            });
        }

        // empty repositories advertise only capabilities
        if name == "capabilities^{}" {
            continue;
        }

        refs.push(AdvertisedRef {
            object_id: object_id.to_string(),
            name: name.to_string(),
        });
    }

    Ok(refs)
}

/// Parse `git ls-remote` output (`<oid>\t<ref>` per line).
#[must_use]
pub fn parse_ls_remote(output: &str) -> Vec<AdvertisedRef> {
    output
        .lines()
        .filter_map(|line| {
            let (object_id, name) = line.split_once('\t')?;
            is_object_id(object_id).then(|| AdvertisedRef {
                object_id: object_id.to_string(),
                name: name.trim().to_string(),
            })
        })
        .collect()
}

/// Returns `true` if `git_ref` names an advertised branch or tag.
///
/// Accepts short names (`master`, `v1.0`) and full names (`refs/heads/master`).
#[must_use]
pub fn has_ref(refs: &[AdvertisedRef], git_ref: &str) -> bool {
    let branch = format!("refs/heads/{git_ref}");
    let tag = format!("refs/tags/{git_ref}");
    refs.iter()
        .any(|r| r.name == git_ref || r.name == branch || r.name == tag)
}

fn is_object_id(candidate: &str) -> bool {
    matches!(candidate.len(), 40 | 64) && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "pktline_tests.rs"]
mod pktline_tests;
