use crate::version::error::VersionError;

/// Fewest segments a strictly validated version may have ("1.2").
pub const MIN_VERSION_SEGMENTS: usize = 2;
/// Most segments a strictly validated version may have ("1.2.3.4").
pub const MAX_VERSION_SEGMENTS: usize = 4;

/// How strictly [`is_version`] judges a candidate string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Shape only: digits and non-adjacent dots, a digit at both ends.
    Lenient,
    /// Segment count bounds enforced, but a bare integer ("5") is accepted.
    CountWithStandaloneNumber,
    /// Segment count bounds enforced.
    CountStrict,
}

impl ValidationMode {
    /// The strict mode matching the "treat a standalone number as a version"
    /// per-program flag.
    pub fn strict(treat_standalone_number_as_version: bool) -> Self {
        if treat_standalone_number_as_version {
            ValidationMode::CountWithStandaloneNumber
        } else {
            ValidationMode::CountStrict
        }
    }
}

/// Returns whether `candidate` is a well-formed version string under `mode`.
///
/// The empty string is never a version. Every dot-delimited token must parse
/// as a non-negative integer in all modes.
pub fn is_version(candidate: &str, mode: ValidationMode) -> bool {
    if candidate.is_empty() {
        return false;
    }
    let bytes = candidate.as_bytes();
    if mode == ValidationMode::CountWithStandaloneNumber
        && bytes.iter().all(|b| b.is_ascii_digit())
    {
        return candidate.parse::<u64>().is_ok();
    }
    if !bytes[0].is_ascii_digit() || !bytes[bytes.len() - 1].is_ascii_digit() {
        return false;
    }
    let mut previous = 0u8;
    for &b in bytes {
        if !b.is_ascii_digit() && b != b'.' {
            return false;
        }
        if b == b'.' && previous == b'.' {
            return false;
        }
        previous = b;
    }
    if mode != ValidationMode::Lenient {
        let dots = bytes.iter().filter(|&&b| b == b'.').count();
        if !(MIN_VERSION_SEGMENTS - 1..=MAX_VERSION_SEGMENTS - 1).contains(&dots) {
            return false;
        }
    }
    candidate.split('.').all(|token| token.parse::<u64>().is_ok())
}

/// Returns whether `new_version` is strictly newer than `old_version`.
///
/// Both inputs must pass strict validation (relaxed to accept bare integers
/// when `treat_standalone_number_as_version` is set). The version with fewer
/// segments is right-padded with zero segments before the numeric comparison,
/// so "1.2" and "1.2.0" compare equal and a bare "5" compares as "5.0".
pub fn is_version_newer(
    new_version: &str,
    old_version: &str,
    treat_standalone_number_as_version: bool,
) -> Result<bool, VersionError> {
    let mode = ValidationMode::strict(treat_standalone_number_as_version);
    let mut new_segments = parse_segments(new_version, mode)?;
    let mut old_segments = parse_segments(old_version, mode)?;

    let count = new_segments.len().max(old_segments.len());
    new_segments.resize(count, 0);
    old_segments.resize(count, 0);

    Ok(new_segments > old_segments)
}

/// Re-serializes `version` so its segment count lies within
/// `min_segments..=max_segments`.
///
/// A version with at most `min_segments` segments is right-padded with ".0";
/// a longer one is truncated to `max_segments`, and with
/// `drop_trailing_zeros` set, trailing zero segments are stripped down to
/// (never below) `min_segments`. Each kept segment is re-rendered as an
/// integer, so leading zeros inside segments disappear. The empty string
/// normalizes as a zero version ("0.0" for a minimum of two segments).
pub fn normalize_and_trim_version(
    version: &str,
    min_segments: usize,
    max_segments: usize,
    drop_trailing_zeros: bool,
) -> Result<String, VersionError> {
    let bounds = MIN_VERSION_SEGMENTS..=MAX_VERSION_SEGMENTS;
    if !bounds.contains(&min_segments) || !bounds.contains(&max_segments) || min_segments > max_segments
    {
        return Err(VersionError::SegmentBoundsOutOfRange {
            min: min_segments,
            max: max_segments,
        });
    }
    if !version.is_empty() && !is_version(version, ValidationMode::Lenient) {
        return Err(VersionError::InvalidVersion(version.to_string()));
    }

    let segments: Vec<u64> = if version.is_empty() {
        vec![0]
    } else {
        version
            .split('.')
            .map(|token| token.parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|_| VersionError::InvalidVersion(version.to_string()))?
    };

    let mut kept = segments.len();
    if kept <= min_segments {
        let mut normalized = join_segments(&segments);
        for _ in segments.len()..min_segments {
            normalized.push_str(".0");
        }
        return Ok(normalized);
    }

    kept = kept.min(max_segments);
    if drop_trailing_zeros {
        while kept > min_segments && segments[kept - 1] == 0 {
            kept -= 1;
        }
    }
    Ok(join_segments(&segments[..kept]))
}

fn parse_segments(version: &str, mode: ValidationMode) -> Result<Vec<u64>, VersionError> {
    if !is_version(version, mode) {
        return Err(VersionError::InvalidVersion(version.to_string()));
    }
    version
        .split('.')
        .map(|token| token.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|_| VersionError::InvalidVersion(version.to_string()))
}

fn join_segments(segments: &[u64]) -> String {
    let mut rendered = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i != 0 {
            rendered.push('.');
        }
        rendered.push_str(&segment.to_string());
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2", true)]
    #[case("1.2.3", true)]
    #[case("1.2.3.4", true)]
    #[case("", false)]
    #[case("1", false)] // one segment is below the minimum
    #[case("1.2.3.4.5", false)] // five segments exceed the maximum
    #[case("1..2", false)]
    #[case(".1.2", false)]
    #[case("1.2.", false)]
    #[case("a.b", false)]
    #[case("1.2a", false)]
    fn is_version_enforces_segment_bounds_in_strict_mode(
        #[case] candidate: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_version(candidate, ValidationMode::CountStrict), expected);
    }

    #[rstest]
    #[case("5", true)] // bare integer is accepted in this mode
    #[case("1.2", true)]
    #[case("", false)]
    #[case("1.2.3.4.5", false)]
    #[case("00a", false)]
    fn is_version_accepts_standalone_numbers_when_relaxed(
        #[case] candidate: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            is_version(candidate, ValidationMode::CountWithStandaloneNumber),
            expected
        );
    }

    #[rstest]
    #[case("1", true)] // lenient mode has no segment-count bounds
    #[case("1.2.3.4.5.6", true)]
    #[case("1..2", false)]
    #[case("1.2.", false)]
    fn is_version_checks_shape_only_in_lenient_mode(
        #[case] candidate: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_version(candidate, ValidationMode::Lenient), expected);
    }

    #[rstest]
    #[case("1.3", "1.2.9", true)]
    #[case("1.2.9", "1.3", false)]
    #[case("1.2", "1.2.0", false)] // equal after right-padding
    #[case("1.2.0", "1.2", false)]
    #[case("1.10", "1.9", true)] // numeric, not lexicographic
    #[case("2.0.0.1", "2.0", true)]
    fn is_version_newer_compares_numerically(
        #[case] new_version: &str,
        #[case] old_version: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            is_version_newer(new_version, old_version, false).unwrap(),
            expected
        );
    }

    #[test]
    fn standalone_number_is_right_padded_before_comparison() {
        // "2" becomes "2.0" and wins over "1.9"
        assert!(is_version_newer("2", "1.9", true).unwrap());
        // "2" vs "1.9.5": still zero-right-padded, never left-padded
        assert!(is_version_newer("2", "1.9.5", true).unwrap());
        assert!(!is_version_newer("2", "2.0.0", true).unwrap());
    }

    #[test]
    fn is_version_newer_rejects_invalid_inputs() {
        assert!(matches!(
            is_version_newer("1", "1.2", false),
            Err(VersionError::InvalidVersion(_))
        ));
        assert!(matches!(
            is_version_newer("1.2", "one.two", false),
            Err(VersionError::InvalidVersion(_))
        ));
    }

    #[rstest]
    #[case("1", 2, 4, false, "1.0")]
    #[case("1.2.0.0", 2, 4, true, "1.2")]
    #[case("1.2.0.0", 2, 4, false, "1.2.0.0")]
    #[case("1.2.3.4.5", 2, 4, false, "1.2.3.4")] // truncated to the maximum
    #[case("1.0.0", 3, 4, true, "1.0.0")] // never trimmed below the minimum
    #[case("01.002", 2, 4, false, "1.2")] // segments re-rendered as integers
    #[case("", 2, 4, false, "0.0")]
    fn normalize_and_trim_version_applies_segment_bounds(
        #[case] version: &str,
        #[case] min: usize,
        #[case] max: usize,
        #[case] drop_zeros: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(
            normalize_and_trim_version(version, min, max, drop_zeros).unwrap(),
            expected
        );
    }

    #[rstest]
    #[case(1, 4)]
    #[case(2, 5)]
    #[case(4, 2)] // min above max
    fn normalize_and_trim_version_rejects_bad_bounds(#[case] min: usize, #[case] max: usize) {
        assert!(matches!(
            normalize_and_trim_version("1.2", min, max, false),
            Err(VersionError::SegmentBoundsOutOfRange { .. })
        ));
    }

    #[test]
    fn normalize_and_trim_version_rejects_malformed_input() {
        assert!(matches!(
            normalize_and_trim_version("1..2", 2, 4, false),
            Err(VersionError::InvalidVersion(_))
        ));
    }
}
