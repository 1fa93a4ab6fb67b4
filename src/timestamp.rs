use time::OffsetDateTime;

/// The current UTC time, formatted by [`format`].
pub fn now() -> String {
    format(OffsetDateTime::now_utc())
}

/// Formats `moment` as `YYYY-MM-DDTHH:MM:SS`, followed by `.ffffff`
/// when the microsecond part is non-zero. The offset is not written.
pub fn format(moment: OffsetDateTime) -> String {
    let seconds = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        moment.year(),
        u8::from(moment.month()),
        moment.day(),
        moment.hour(),
        moment.minute(),
        moment.second()
    );

    match moment.microsecond() {
        0 => seconds,
        micros => format!("{}.{:06}", seconds, micros),
    }
}
