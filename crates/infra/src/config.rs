use chrono::Duration;
use chrono_tz::Tz;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Zone in which timed occurrences and reminder instants are anchored.
    /// All-day occurrences always anchor to UTC calendar dates.
    pub reminder_timezone: Tz,
    /// Webhook endpoint the prompt sink delivers to. Optional here so that
    /// tests and tooling can build a context without a delivery surface.
    pub prompt_webhook_url: Option<String>,
    /// Interval between scheduling ticks.
    pub sync_interval: std::time::Duration,
    /// How far back a token-less full sync reaches. Items older than this
    /// window are never mirrored.
    pub full_sync_lookback: Duration,
    /// How far ahead the hydrator re-checks events against the rule set.
    pub hydration_lookahead: Duration,
    /// Arrangement occurrences are only prompted once their start is
    /// within this window.
    pub arrangement_ping_window: Duration,
    /// Hard throttle between prompt deliveries for one occurrence.
    pub prompt_throttle: Duration,
    /// How long a snooze (explicit or arrangement self-snooze) defers
    /// re-selection.
    pub snooze_duration: Duration,
    /// Wall-clock hour in the reminder zone at which all-day reminder
    /// instants are pinned, avoiding day-boundary rounding ambiguity.
    pub all_day_reference_hour: u32,
}

const DEFAULT_REMINDER_TIMEZONE: &str = "America/New_York";
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 5 * 60;

impl Config {
    pub fn new() -> Self {
        let reminder_timezone = match std::env::var("REMINDER_TIMEZONE") {
            Ok(name) => match name.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given REMINDER_TIMEZONE: {} is not a valid IANA zone, falling back to the default: {}.",
                        name, DEFAULT_REMINDER_TIMEZONE
                    );
                    chrono_tz::America::New_York
                }
            },
            Err(_) => chrono_tz::America::New_York,
        };

        let sync_interval_secs = match std::env::var("SYNC_INTERVAL_SECS") {
            Ok(secs) => match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(
                        "The given SYNC_INTERVAL_SECS: {} is not valid, falling back to the default: {}.",
                        secs, DEFAULT_SYNC_INTERVAL_SECS
                    );
                    DEFAULT_SYNC_INTERVAL_SECS
                }
            },
            Err(_) => DEFAULT_SYNC_INTERVAL_SECS,
        };

        Self {
            reminder_timezone,
            prompt_webhook_url: std::env::var("PROMPT_WEBHOOK_URL").ok(),
            sync_interval: std::time::Duration::from_secs(sync_interval_secs),
            full_sync_lookback: Duration::days(30),
            hydration_lookahead: Duration::days(90),
            arrangement_ping_window: Duration::days(3),
            prompt_throttle: Duration::days(1),
            snooze_duration: Duration::days(1),
            all_day_reference_hour: 12,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
