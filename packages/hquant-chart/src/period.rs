use core::fmt;

/// Bucket width for display re-aggregation, in seconds.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    secs: i64,
}

impl fmt::Debug for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Period({}s)", self.secs)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [(i64, &str); 4] = [(604_800, "w"), (86_400, "d"), (3_600, "h"), (60, "m")];
        for (size, unit) in UNITS {
            if self.secs % size == 0 {
                return write!(f, "{}{}", self.secs / size, unit);
            }
        }
        write!(f, "{}s", self.secs)
    }
}

impl Period {
    /// `None` unless `secs > 0`.
    pub fn from_secs(secs: i64) -> Option<Self> {
        (secs > 0).then_some(Self { secs })
    }

    #[inline]
    pub fn as_secs(&self) -> i64 {
        self.secs
    }

    /// Parses `"30s"`, `"15m"`, `"4h"`, `"1d"`, `"1w"`. A bare number is seconds.
    pub fn parse(s: &str) -> Result<Self, &'static str> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty period");
        }
        let digits_end = s
            .char_indices()
            .find(|(_, ch)| !ch.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        if digits_end == 0 {
            return Err("missing number");
        }
        let n: i64 = s[..digits_end].parse().map_err(|_| "invalid number")?;
        if n <= 0 {
            return Err("period must be > 0");
        }
        let unit = s[digits_end..].trim().to_ascii_lowercase();
        let scale = match unit.as_str() {
            "" | "s" => 1,
            "m" => 60,
            "h" => 3_600,
            "d" => 86_400,
            "w" => 604_800,
            _ => return Err("unsupported unit (use s/m/h/d/w)"),
        };
        let secs = n.checked_mul(scale).ok_or("period overflows")?;
        Ok(Self { secs })
    }

    /// `floor(time / secs) * secs`, also for times before the epoch.
    /// Saturates at `i64::MIN` when the floor is not representable.
    #[inline]
    pub fn bucket_start(&self, time: i64) -> i64 {
        time.div_euclid(self.secs).saturating_mul(self.secs)
    }
}
