use time::OffsetDateTime;

pub trait TimeProvider: Clone + Send + Sync + 'static {
    /// Current instant, already shifted to the wall-clock offset quiet hours
    /// are evaluated in.
    fn now(&self) -> OffsetDateTime;
}
