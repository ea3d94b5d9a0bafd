//! Local time <-> UTC conversion driven by a `LocalTimeDescriptor`.

use anyhow::anyhow;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use allot_types::LocalTimeDescriptor;

const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

pub fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn offset_of(descriptor: &LocalTimeDescriptor<'_>) -> anyhow::Result<FixedOffset> {
    FixedOffset::east_opt(descriptor.utc_offset_in_seconds())
        .ok_or_else(|| anyhow!("offset {} out of range", descriptor.utc_offset_in_seconds()))
}

pub fn local_to_utc(
    local: NaiveDateTime,
    descriptor: &LocalTimeDescriptor<'_>,
) -> anyhow::Result<DateTime<Utc>> {
    let offset = offset_of(descriptor)?;
    let local = offset
        .from_local_datetime(&local)
        .single()
        .ok_or_else(|| anyhow!("{local} is not representable at offset {offset}"))?;
    Ok(local.with_timezone(&Utc))
}

pub fn utc_to_local(
    utc: NaiveDateTime,
    descriptor: &LocalTimeDescriptor<'_>,
) -> anyhow::Result<DateTime<FixedOffset>> {
    let offset = offset_of(descriptor)?;
    Ok(Utc.from_utc_datetime(&utc).with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_core::alloc::TestAllocator;

    #[test]
    fn new_york_and_rome_in_july() {
        let ta = TestAllocator::new("zones");
        let new_york = LocalTimeDescriptor::try_new_in(-14_400, true, "EDT", &ta).unwrap();
        let rome = LocalTimeDescriptor::try_new_in(7_200, true, "CEST", &ta).unwrap();
        let local = parse_naive("2010-07-20T11:00:00").unwrap();

        let utc = local_to_utc(local, &new_york).unwrap();
        assert_eq!(utc.to_rfc3339(), "2010-07-20T15:00:00+00:00");

        let in_rome = utc_to_local(utc.naive_utc(), &rome).unwrap();
        assert_eq!(in_rome.to_rfc3339(), "2010-07-20T17:00:00+02:00");
    }

    #[test]
    fn accepts_space_separated_input() {
        assert!(parse_naive("2010-07-20 11:00:00").is_some());
        assert!(parse_naive("July 20th").is_none());
    }
}
