//! Time types shared by the persisted records
use chrono::{DateTime, NaiveTime, TimeZone, Timelike, Utc};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

// Ordered by instant. `Utc` itself has no ordering, so these can't be derived.
impl<T: TimeZone + Eq> PartialOrd for TimeStamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TimeZone + Eq> Ord for TimeStamp<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self::from)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// A wall-clock time of day, e.g. a closing or pickup time.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn new(hour: u32, min: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, min, 0).map(Self)
    }
    pub fn to_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(value: NaiveTime) -> Self {
        Self(value)
    }
}

// stored as whole seconds since midnight
impl<C> minicbor::Encode<C> for ClockTime {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.u32(self.0.num_seconds_from_midnight())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for ClockTime {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let secs = d.u32()?;

        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
            .map(ClockTime)
            .ok_or(minicbor::decode::Error::message(
                "seconds since midnight out of range",
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn timestamps_sort_by_instant() {
        let earlier = TimeStamp::new_with(2024, 5, 1, 18, 0, 0).unwrap();
        let later = TimeStamp::new_with(2024, 5, 1, 18, 0, 1).unwrap();

        assert!(earlier < later);
        assert_eq!(earlier.cmp(&earlier.clone()), std::cmp::Ordering::Equal);

        let mut stamps = vec![earlier.clone(), later.clone()];
        stamps.sort_by(|a, b| b.cmp(a));
        assert_eq!(stamps, vec![later, earlier]);
    }

    #[test]
    fn clock_time_rejects_out_of_range() {
        assert!(ClockTime::new(24, 0).is_none());
        assert!(ClockTime::new(21, 30).is_some());
    }

    #[test]
    fn clock_time_decode_rejects_a_day_overflow() {
        let encoding = minicbor::to_vec(86_400u32).unwrap();
        assert!(minicbor::decode::<ClockTime>(&encoding).is_err());
    }
}
