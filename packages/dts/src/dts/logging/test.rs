// Logging Tests
//
// Tests for the logging module.

#[cfg(test)]
mod tests {
    use crate::dts::logging::*;

    mod log_level_tests {
        use super::*;

        #[test]
        fn should_have_correct_ordering() {
            assert!(LogLevel::Debug < LogLevel::Info);
            assert!(LogLevel::Info < LogLevel::Warn);
            assert!(LogLevel::Warn < LogLevel::Error);
        }
    }

    mod tracing_logger_tests {
        use super::*;

        #[test]
        fn should_check_level_enabled() {
            let logger = TracingLogger::new(LogLevel::Warn);

            assert!(!logger.is_enabled(LogLevel::Debug));
            assert!(!logger.is_enabled(LogLevel::Info));
            assert!(logger.is_enabled(LogLevel::Warn));
            assert!(logger.is_enabled(LogLevel::Error));
        }

        #[test]
        fn should_default_to_info() {
            assert_eq!(TracingLogger::default().level(), LogLevel::Info);
        }
    }

    mod capturing_logger_tests {
        use super::*;

        #[test]
        fn should_record_messages_by_level() {
            let logger = CapturingLogger::new();
            logger.info("emitting");
            logger.warn("skipped /outside/a.d.ts");

            assert_eq!(logger.messages().len(), 2);
            assert_eq!(logger.at(LogLevel::Warn), vec!["skipped /outside/a.d.ts"]);
        }
    }

    mod null_logger_tests {
        use super::*;

        #[test]
        fn should_not_log_anything() {
            let logger = NullLogger::new();

            logger.debug("debug message");
            logger.error("error message");
            assert_eq!(logger.level(), LogLevel::Error);
        }
    }
}
