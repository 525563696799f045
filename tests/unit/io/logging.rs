//! Tests for log filter selection

#[cfg(test)]
mod tests {
    use gridrule::io::logging::{filter_directive, init_tracing};

    // Tests each verbosity level maps to a filter directive
    // Verified by shifting the verbosity mapping by one
    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(0, false), "warn");
        assert_eq!(filter_directive(1, false), "info");
        assert_eq!(filter_directive(2, false), "debug");
        assert_eq!(filter_directive(3, false), "trace");
        assert_eq!(filter_directive(9, false), "trace");
    }

    // Tests quiet wins over verbosity
    #[test]
    fn test_quiet_wins() {
        assert_eq!(filter_directive(0, true), "error");
        assert_eq!(filter_directive(3, true), "error");
    }

    // Tests only the first subscriber installation succeeds
    #[test]
    fn test_init_once() {
        let _ = init_tracing(0, true);
        assert!(!init_tracing(0, true), "A global subscriber installs at most once");
    }
}
