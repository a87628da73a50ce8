// Unit tests for domain models and time parsing

#[cfg(test)]
mod tests {
    use crate::domain::model::*;

    #[test]
    fn test_parse_timestamp_clock_forms() {
        assert_eq!(parse_timestamp("2:32"), Some(152));
        assert_eq!(parse_timestamp("1:02:30"), Some(3750));
        assert_eq!(parse_timestamp("0:00"), Some(0));
    }

    #[test]
    fn test_parse_timestamp_hms_suffix() {
        assert_eq!(parse_timestamp("00H08M10S"), Some(490));
        assert_eq!(parse_timestamp("8M10S"), Some(490));
        assert_eq!(parse_timestamp("45s"), Some(45));
        assert_eq!(parse_timestamp("1h"), Some(3600));
    }

    #[test]
    fn test_parse_timestamp_bare_seconds() {
        assert_eq!(parse_timestamp("152"), Some(152));
        assert_eq!(parse_timestamp(" 203 "), Some(203));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("abc"), None);
        assert_eq!(parse_timestamp("1:2:3:4"), None);
        assert_eq!(parse_timestamp("10S8M"), None);
        assert_eq!(parse_timestamp("-5"), None);
    }

    #[test]
    fn test_parse_timestamp_rejects_out_of_range_values() {
        // Values past u32 seconds must parse to None, never overflow
        assert_eq!(parse_timestamp("1193047:00:00"), None);
        assert_eq!(parse_timestamp("9999999999:00"), None);
        assert_eq!(parse_timestamp("18446744073709551615H"), None);
        assert_eq!(parse_timestamp("99999999999999999999S"), None);
        // The largest representable clock time still parses
        assert_eq!(parse_timestamp("1193046:00:00"), Some(1_193_046 * 3600));
    }

    #[test]
    fn test_parse_range_clock_form() {
        let segment = parse_range("2:32-3:23").unwrap();
        assert_eq!((segment.start, segment.end), (152, 203));
        assert_eq!(segment.len_seconds(), 51);
    }

    #[test]
    fn test_parse_range_hms_form() {
        let segment = parse_range("00H08M10S-00H09M20S").unwrap();
        assert_eq!((segment.start, segment.end), (490, 560));
        assert_eq!(segment.len_seconds(), 70);
    }

    #[test]
    fn test_parse_range_bare_seconds_and_word_delimiter() {
        let segment = parse_range("152-203").unwrap();
        assert_eq!((segment.start, segment.end), (152, 203));

        let segment = parse_range("2:32 to 3:23").unwrap();
        assert_eq!((segment.start, segment.end), (152, 203));
    }

    #[test]
    fn test_parse_range_fallback_scan() {
        // Surrounding prose is ignored when two time-like tokens are found
        let segment = parse_range("please cut from 2:32 until 3:23 thanks").unwrap();
        assert_eq!((segment.start, segment.end), (152, 203));
    }

    #[test]
    fn test_parse_range_rejects_end_not_after_start() {
        assert!(parse_range("3:23-2:32").is_none());
        assert!(parse_range("152-152").is_none());
    }

    #[test]
    fn test_parse_range_rejects_too_few_tokens() {
        assert!(parse_range("2:32").is_none());
        assert!(parse_range("just words").is_none());
        assert!(parse_range("").is_none());
    }

    #[test]
    fn test_segment_validation() {
        assert!(Segment::new(10, 10).is_none());
        assert!(Segment::new(10, 5).is_none());
        let segment = Segment::new(0, 20).unwrap();
        assert_eq!(segment.len_seconds(), 20);
    }

    #[test]
    fn test_segment_display() {
        let segment = Segment::new(152, 203).unwrap();
        assert_eq!(segment.to_string(), "2:32-3:23");
        let long = Segment::new(3750, 3800).unwrap();
        assert_eq!(long.to_string(), "1:02:30-1:03:20");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "0:00");
        assert_eq!(format_hms(152), "2:32");
        assert_eq!(format_hms(3750), "1:02:30");
    }

    #[test]
    fn test_quality_option_label() {
        let q = QualityOption::new("137", 1080, "mp4");
        assert_eq!(q.label, "1080p (mp4)");
        let unknown = QualityOption::new("best", 0, "webm");
        assert_eq!(unknown.label, "best (webm)");
    }
}
