//! UID to username resolution with caching.

use ahash::AHashMap as HashMap;
use nix::unistd::{Uid, User};

/// Caches user-database lookups keyed by numeric UID.
///
/// Unresolvable UIDs cache as the empty string, so a UID missing from the
/// user database costs one lookup per run, not one per process.
#[derive(Debug, Default)]
pub struct UserCache {
    names: HashMap<u32, String>,
}

impl UserCache {
    pub fn new() -> UserCache {
        UserCache::default()
    }

    /// Returns the username for `uid`, or "" when it cannot be resolved.
    pub fn name(&mut self, uid: u32) -> &str {
        self.names
            .entry(uid)
            .or_insert_with(|| match User::from_uid(Uid::from_raw(uid)) {
                Ok(Some(user)) => user.name,
                _ => String::new(),
            })
    }

    /// Username of the effective user running this process.
    pub fn current(&mut self) -> String {
        self.name(Uid::effective().as_raw()).to_string()
    }
}
