/// Evaluates `$code` and records how long it took in the histogram `$metric`.
///
/// `$code` may be an `.await` expression; the timer also records when the
/// enclosing future is dropped mid-way.
#[macro_export]
macro_rules! timed {
    ($metric:expr, $code:expr) => {{
        let timer = $metric.start_timer();
        let result = $code;
        timer.observe_duration();
        result
    }};
}
