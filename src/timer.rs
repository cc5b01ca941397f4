//! A restartable timer with pluggable clock and stop handler.

use std::fmt;
use std::time::{Duration, Instant};

/// A source of the current time, as an offset from some fixed origin
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

impl<F> Clock for F
where
    F: Fn() -> Duration + Send + Sync,
{
    fn now(&self) -> Duration {
        self()
    }
}

/// Monotonic clock measuring from the moment it was created
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

type StopHandler = Box<dyn Fn(&Timer, &[&str]) + Send + Sync>;

/// Measures time between `start` and `stop`
///
/// A timer starts running as soon as it is built. [`stop`](Self::stop) may be
/// called any number of times; each call records the current time and runs
/// the stop handler, if one is set.
///
/// # Examples
///
/// ```
/// use sovran_multimethod::timer::Timer;
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// let ticks = Mutex::new(vec![Duration::from_secs(30), Duration::from_secs(9), Duration::from_secs(1)]);
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let mut timer = Timer::builder()
///     .name("loader")
///     .clock(move || ticks.lock().unwrap().pop().unwrap_or_default())
///     .on_stop(move |timer, args| {
///         sink.lock().unwrap().push(format!("{} {} {:?}", timer.name().unwrap_or("?"), args.join(" "), timer.elapsed()));
///     })
///     .build();
///
/// timer.stop(&["load", "finished"]);
/// timer.stop(&["parse", "finished"]);
/// assert_eq!(*seen.lock().unwrap(), vec!["loader load finished 8s", "loader parse finished 29s"]);
/// ```
pub struct Timer {
    name: Option<String>,
    clock: Box<dyn Clock>,
    on_stop: Option<StopHandler>,
    started_at: Duration,
    stopped_at: Option<Duration>,
}

impl Timer {
    /// Creates and starts an unnamed timer on the monotonic clock
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates and starts a named timer on the monotonic clock
    pub fn named(name: impl Into<String>) -> Self {
        Self::builder().name(name).build()
    }

    pub fn builder() -> TimerBuilder {
        TimerBuilder::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Reads the timer's clock
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    pub fn stopped_at(&self) -> Option<Duration> {
        self.stopped_at
    }

    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Time between start and the last stop, or start and now while running
    ///
    /// While running, every call reads the clock again.
    pub fn elapsed(&self) -> Duration {
        let end = match self.stopped_at {
            Some(stopped_at) => stopped_at,
            None => self.now(),
        };
        end.saturating_sub(self.started_at)
    }

    /// Restarts the timer: resets the start time and clears the stop time
    pub fn start(&mut self) {
        self.started_at = self.now();
        self.stopped_at = None;
    }

    /// Records the current time as the stop time and runs the stop handler
    ///
    /// Returns the elapsed time up to this stop.
    pub fn stop(&mut self, args: &[&str]) -> Duration {
        self.stopped_at = Some(self.now());
        let timer = &*self;
        if let Some(on_stop) = &timer.on_stop {
            on_stop(timer, args);
        }
        timer.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("name", &self.name)
            .field("started_at", &self.started_at)
            .field("stopped_at", &self.stopped_at)
            .finish()
    }
}

/// Configures a [`Timer`]
#[derive(Default)]
pub struct TimerBuilder {
    name: Option<String>,
    clock: Option<Box<dyn Clock>>,
    on_stop: Option<StopHandler>,
}

impl TimerBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the default [`MonotonicClock`]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Called with the timer and the stop arguments after every `stop`
    pub fn on_stop<F>(mut self, on_stop: F) -> Self
    where
        F: Fn(&Timer, &[&str]) + Send + Sync + 'static,
    {
        self.on_stop = Some(Box::new(on_stop));
        self
    }

    /// Reports every `stop` through a [`MessageCallback`]
    pub fn on_stop_message(self, callback: MessageCallback) -> Self {
        self.on_stop(move |timer, args| callback.call(timer, args))
    }

    /// Builds the timer and starts it
    pub fn build(self) -> Timer {
        let mut timer = Timer {
            name: self.name,
            clock: self
                .clock
                .unwrap_or_else(|| Box::new(MonotonicClock::new()) as Box<dyn Clock>),
            on_stop: self.on_stop,
            started_at: Duration::ZERO,
            stopped_at: None,
        };
        timer.start();
        timer
    }
}

type MessageSink = Box<dyn Fn(&str) + Send + Sync>;

/// Stop handler that formats a message from a template
///
/// Placeholders:
///
/// - `{name}`: the timer name, `timer` if unnamed
/// - `{elapsed}`: elapsed seconds
/// - `{args}`: the stop arguments joined with the separator
/// - `{args[N]}`: the N-th stop argument, empty if absent
///
/// Unknown placeholders are copied through. Messages go to `tracing` at info
/// level unless another sink is set.
///
/// ```
/// use sovran_multimethod::timer::{MessageCallback, Timer};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// let messages = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&messages);
/// let callback = MessageCallback::new()
///     .template("{args[0]} at {elapsed}s ({args})")
///     .separator("+")
///     .sink(move |m| sink.lock().unwrap().push(m.to_string()));
///
/// let mut timer = Timer::builder()
///     .clock(|| Duration::from_millis(1500))
///     .on_stop_message(callback)
///     .build();
/// timer.stop(&["loaded", "ok"]);
///
/// assert_eq!(*messages.lock().unwrap(), vec!["loaded at 0s (loaded+ok)"]);
/// ```
pub struct MessageCallback {
    template: String,
    separator: String,
    sink: MessageSink,
}

impl MessageCallback {
    pub const DEFAULT_TEMPLATE: &'static str = "{name}: {elapsed}s {args}";

    pub fn new() -> Self {
        Self {
            template: Self::DEFAULT_TEMPLATE.to_string(),
            separator: " ".to_string(),
            sink: Box::new(|message: &str| tracing::info!("{}", message)),
        }
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.sink = Box::new(sink);
        self
    }

    /// Formats the message for `timer` and `args`
    pub fn format(&self, timer: &Timer, args: &[&str]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            out.push_str(&rest[..open]);
            match self.expand(&rest[open + 1..close], timer, args) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[open..=close]),
            }
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Formats the message and hands it to the sink
    pub fn call(&self, timer: &Timer, args: &[&str]) {
        (self.sink)(&self.format(timer, args));
    }

    fn expand(&self, placeholder: &str, timer: &Timer, args: &[&str]) -> Option<String> {
        match placeholder {
            "name" => Some(timer.name().unwrap_or("timer").to_string()),
            "elapsed" => Some(timer.elapsed().as_secs_f64().to_string()),
            "args" => Some(args.join(&self.separator)),
            _ => {
                let index = placeholder
                    .strip_prefix("args[")?
                    .strip_suffix(']')?
                    .parse::<usize>()
                    .ok()?;
                Some(args.get(index).copied().unwrap_or_default().to_string())
            }
        }
    }
}

impl Default for MessageCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageCallback")
            .field("template", &self.template)
            .field("separator", &self.separator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn scripted(seconds: &[f64]) -> impl Clock {
        let ticks: Mutex<VecDeque<Duration>> =
            Mutex::new(seconds.iter().map(|s| Duration::from_secs_f64(*s)).collect());
        move || ticks.lock().unwrap().pop_front().expect("clock ran out of ticks")
    }

    #[test]
    fn test_started_on_build() {
        let timer = Timer::builder().clock(scripted(&[1.0])).build();
        assert_eq!(timer.started_at(), Duration::from_secs(1));
        assert_eq!(timer.stopped_at(), None);
        assert!(timer.is_running());
    }

    #[test]
    fn test_elapsed_reads_clock_while_running() {
        let timer = Timer::builder().clock(scripted(&[1.0, 5.0, 9.5])).build();
        assert_eq!(timer.elapsed(), Duration::from_secs(4));
        assert_eq!(timer.elapsed(), Duration::from_secs_f64(8.5));
    }

    #[test]
    fn test_elapsed_is_fixed_once_stopped() {
        let mut timer = Timer::builder().clock(scripted(&[1.0, 5.0])).build();
        assert_eq!(timer.stop(&[]), Duration::from_secs(4));
        assert_eq!(timer.elapsed(), Duration::from_secs(4));
        assert_eq!(timer.elapsed(), Duration::from_secs(4));
    }

    #[test]
    fn test_each_stop_records_time() {
        let mut timer = Timer::builder().clock(scripted(&[1.0, 5.0, 9.5])).build();
        timer.stop(&[]);
        let first = timer.stopped_at();
        timer.stop(&[]);
        let second = timer.stopped_at();
        assert_eq!(
            vec![first, second],
            vec![Some(Duration::from_secs(5)), Some(Duration::from_secs_f64(9.5))]
        );
    }

    #[test]
    fn test_start_resets() {
        let mut timer = Timer::builder().clock(scripted(&[10.0, 20.0, 30.0])).build();
        timer.stop(&[]);
        assert_eq!(timer.stopped_at(), Some(Duration::from_secs(20)));
        timer.start();
        assert_eq!(timer.started_at(), Duration::from_secs(30));
        assert_eq!(timer.stopped_at(), None);
    }

    #[test]
    fn test_stop_passes_timer_and_args() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let mut timer = Timer::builder()
            .name("TheTimer")
            .clock(scripted(&[1.0, 5.0]))
            .on_stop(move |timer, args| {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                sink.lock()
                    .unwrap()
                    .push((timer.name().map(str::to_string), args, timer.stopped_at()));
            })
            .build();

        timer.stop(&["arg1", "arg2"]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![(
                Some("TheTimer".to_string()),
                vec!["arg1".to_string(), "arg2".to_string()],
                Some(Duration::from_secs(5))
            )]
        );
    }

    #[test]
    fn test_default_timer() {
        let timer = Timer::named("thetimer");
        assert_eq!(timer.name(), Some("thetimer"));
        assert!(timer.is_running());
        assert_eq!(Timer::default().name(), None);
    }

    #[test]
    fn test_message_format() {
        let timer = Timer::builder()
            .name("MyTimer")
            .clock(scripted(&[1.0, 3.5]))
            .build();
        let callback = MessageCallback::new()
            .template("{name}: {args} or {args[0]}, {args[1]}{args[7]} took {elapsed}s")
            .separator("+");
        assert_eq!(
            callback.format(&timer, &["arg1", "arg2"]),
            "MyTimer: arg1+arg2 or arg1, arg2 took 2.5s"
        );
    }

    #[test]
    fn test_message_format_leaves_unknown_text() {
        let timer = Timer::builder().clock(scripted(&[0.0])).build();
        let callback = MessageCallback::new().template("{name} {unknown} {open");
        assert_eq!(callback.format(&timer, &[]), "timer {unknown} {open");
    }
}
