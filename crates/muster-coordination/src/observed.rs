//! Version-counted response snapshots.

/// A response snapshot paired with a version counter.
///
/// The version starts at 0 and increments every time the payload is
/// replaced, so a polling consumer detects change by comparing the version
/// against its own last-seen copy. Consumers must compare with `!=`, not an
/// ordering: the counter wraps at `u64::MAX` and a snapshot kind may be
/// reset, and strict inequality is the correct test under the
/// increments-on-every-update contract either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observed<T> {
    version: u64,
    payload: T,
}

impl<T> Observed<T> {
    /// Current version. 0 until the first update.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Current payload. Default-initialized until the first update.
    pub fn get(&self) -> &T {
        &self.payload
    }

    /// Replace the payload and bump the version.
    ///
    /// Only the owner of the snapshot should call this; consumers hold
    /// shared references and never mutate.
    pub fn replace(&mut self, payload: T) {
        self.version = self.version.wrapping_add(1);
        self.payload = payload;
    }
}
