/// HTTP byte-range resolution
///
/// Parses a `Range` header against a known resource length into concrete
/// byte ranges. Malformed individual specs are skipped rather than failing
/// the whole header; an empty result means the caller must answer 416.
/// A concrete byte range within a resource
///
/// Both bounds are inclusive; `end` is always below the resource length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// The full extent of a resource, for whole-file delivery
    pub fn whole(resource_length: u64) -> Option<Self> {
        if resource_length == 0 {
            return None;
        }
        Some(Self {
            start: 0,
            end: resource_length - 1,
        })
    }

    /// `Content-Range` header value for a 206 response
    pub fn content_range(&self, resource_length: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, resource_length)
    }
}

/// Resolve a `Range` header value into concrete ranges
///
/// Supports `start-end`, `start-` (open end), and `-suffix` specs, in a
/// comma-separated list. Only the first resolved range is served; the rest
/// are accepted syntactically for compatibility.
pub fn resolve_byte_ranges(header: &str, resource_length: u64) -> Vec<ByteRange> {
    let Some(spec_list) = header.strip_prefix("bytes=") else {
        return Vec::new();
    };

    spec_list
        .split(',')
        .filter_map(|spec| resolve_spec(spec.trim(), resource_length))
        .collect()
}

fn resolve_spec(spec: &str, resource_length: u64) -> Option<ByteRange> {
    let (start_part, end_part) = spec.split_once('-')?;

    if start_part.is_empty() {
        // Suffix form: "-N" addresses the last N bytes
        let suffix: u64 = end_part.parse().ok()?;
        if suffix == 0 || suffix > resource_length {
            return None;
        }
        return Some(ByteRange {
            start: resource_length - suffix,
            end: resource_length - 1,
        });
    }

    let start: u64 = start_part.parse().ok()?;
    if start >= resource_length {
        return None;
    }

    let end = if end_part.is_empty() {
        resource_length - 1
    } else {
        let end: u64 = end_part.parse().ok()?;
        if end < start || end >= resource_length {
            return None;
        }
        end
    };

    Some(ByteRange { start, end })
}
