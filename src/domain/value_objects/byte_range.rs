use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Range not satisfiable for a resource of {size} bytes")]
    NotSatisfiable { size: u64 },
}

/// Inclusive byte range `start..=end` within a resource of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64, size: u64) -> Result<Self, RangeError> {
        if start > end || end >= size {
            return Err(RangeError::NotSatisfiable { size });
        }
        Ok(Self { start, end })
    }

    /// Parse a `Range` header of the form `bytes=start-end` or `bytes=start-`.
    ///
    /// Returns `Ok(None)` when the header does not follow that syntax, in
    /// which case the caller serves the full resource. Only the first range
    /// of a comma-separated list is considered.
    pub fn parse(header: &str, size: u64) -> Result<Option<Self>, RangeError> {
        let Some(spec) = header.trim().strip_prefix("bytes=") else {
            return Ok(None);
        };
        let first = spec.split(',').next().unwrap_or_default().trim();
        let Some((start, end)) = first.split_once('-') else {
            return Ok(None);
        };
        let (start, end) = (start.trim(), end.trim());

        if !is_digits(start) || !(end.is_empty() || is_digits(end)) {
            return Ok(None);
        }

        // Offsets beyond u64 can never be satisfied.
        let start: u64 = start
            .parse()
            .map_err(|_| RangeError::NotSatisfiable { size })?;
        let end: u64 = if end.is_empty() {
            size.checked_sub(1)
                .ok_or(RangeError::NotSatisfiable { size })?
        } else {
            end.parse()
                .map_err(|_| RangeError::NotSatisfiable { size })?
        };

        Self::new(start, end, size).map(Some)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` header for this range.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_closed_range() {
        let range = ByteRange::parse("bytes=0-99", 100).unwrap().unwrap();
        assert_eq!((range.start(), range.end()), (0, 99));
        assert_eq!(range.len(), 100);
        assert_eq!(range.content_range(100), "bytes 0-99/100");
    }

    #[test]
    fn test_parse_open_range_defaults_to_last_byte() {
        let range = ByteRange::parse("bytes=40-", 100).unwrap().unwrap();
        assert_eq!((range.start(), range.end()), (40, 99));
        assert_eq!(range.len(), 60);
    }

    #[test]
    fn test_parse_single_byte() {
        let range = ByteRange::parse("bytes=99-99", 100).unwrap().unwrap();
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn test_parse_first_of_multiple_ranges() {
        let range = ByteRange::parse("bytes=0-9, 20-29", 100).unwrap().unwrap();
        assert_eq!((range.start(), range.end()), (0, 9));
    }

    #[test]
    fn test_start_at_size_not_satisfiable() {
        assert_eq!(
            ByteRange::parse("bytes=100-", 100),
            Err(RangeError::NotSatisfiable { size: 100 })
        );
    }

    #[test]
    fn test_end_past_size_not_satisfiable() {
        assert!(ByteRange::parse("bytes=0-100", 100).is_err());
    }

    #[test]
    fn test_inverted_range_not_satisfiable() {
        assert!(ByteRange::parse("bytes=50-10", 100).is_err());
    }

    #[test]
    fn test_empty_resource_not_satisfiable() {
        assert!(ByteRange::parse("bytes=0-", 0).is_err());
        assert!(ByteRange::parse("bytes=0-0", 0).is_err());
    }

    #[test]
    fn test_overflowing_offset_not_satisfiable() {
        assert!(ByteRange::parse("bytes=99999999999999999999999-", 100).is_err());
    }

    #[test]
    fn test_unrecognized_syntax_is_ignored() {
        for header in ["items=0-10", "bytes=-500", "bytes=abc-", "bytes=5", "bytes=1-x"] {
            assert_eq!(ByteRange::parse(header, 1000), Ok(None), "{header}");
        }
    }
}
