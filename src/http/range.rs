//! Single byte-range support (RFC 9110 `Range: bytes=...`)

/// Outcome of interpreting a `Range` header against a file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// No usable range: send the whole file
    Full,
    /// Inclusive byte span to send with 206
    Partial { start: u64, end: u64 },
    /// Syntactically valid but outside the file: 416
    Unsatisfiable,
}

impl ByteRange {
    /// Number of bytes a partial response carries
    pub const fn len(self) -> u64 {
        match self {
            Self::Partial { start, end } => end - start + 1,
            Self::Full | Self::Unsatisfiable => 0,
        }
    }
}

/// Interpret a `Range` header.
///
/// Only a single `bytes` range is honoured. Other units, multiple ranges and
/// malformed values fall back to the full body.
pub fn parse_range(header: Option<&str>, size: u64) -> ByteRange {
    let Some(ranges) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return ByteRange::Full;
    };
    if ranges.contains(',') {
        return ByteRange::Full;
    }
    let Some((first, last)) = ranges.split_once('-') else {
        return ByteRange::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        // Suffix form: last N bytes
        return match last.parse::<u64>() {
            Ok(0) => ByteRange::Unsatisfiable,
            Ok(_) if size == 0 => ByteRange::Unsatisfiable,
            Ok(n) => ByteRange::Partial {
                start: size.saturating_sub(n),
                end: size - 1,
            },
            Err(_) => ByteRange::Full,
        };
    }

    let Ok(start) = first.parse::<u64>() else {
        return ByteRange::Full;
    };
    let end = if last.is_empty() {
        None
    } else {
        match last.parse::<u64>() {
            Ok(end) if end < start => return ByteRange::Full,
            Ok(end) => Some(end),
            Err(_) => return ByteRange::Full,
        }
    };

    if start >= size {
        return ByteRange::Unsatisfiable;
    }
    ByteRange::Partial {
        start,
        end: end.map_or(size - 1, |e| e.min(size - 1)),
    }
}
