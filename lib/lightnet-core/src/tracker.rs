//! Tracked header replay.
//!
//! A [`HeaderTracker`] keeps, per tracking group, the response headers whose
//! name contains the group's read-key, and sends them back with every later
//! request of the same group. It is a restricted, allow-listed stand-in for a
//! cookie jar.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::response::HeaderMap;
use crate::{KeyValueStore, Request, Result, TrackHeader};

/// Store namespace holding every group mapping.
pub const TRACKER_NAMESPACE: &str = "lightnet";

/// Separator used to join multi-valued headers before persistence.
pub const HEADER_DELIMITER: &str = ";";

/// Persisted name → value mapping of one tracking group.
pub type TrackedHeaders = BTreeMap<String, String>;

/// Store key of a group mapping.
#[must_use]
pub fn group_key(group: &str) -> String {
    format!("TRACK_HEADER_{group}")
}

/// Replays and captures tracked headers through a [`KeyValueStore`].
///
/// `apply` and `capture` are serialized by one lock per tracker, so a
/// capture never interleaves with a concurrent load of the same mapping.
/// Store failures are logged and otherwise ignored: tracking never fails a
/// call.
#[derive(Debug)]
pub struct HeaderTracker {
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl HeaderTracker {
    /// Create a tracker persisting through `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Set the persisted headers of the tracking group on `request`.
    ///
    /// Replayed headers replace same-named headers already on the request.
    /// No-op when tracking is off or nothing was persisted for the group.
    pub fn apply<B>(&self, request: &mut Request<B>, tracking: Option<&TrackHeader>) {
        let Some(tracking) = tracking else {
            return;
        };

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let headers = match self.load(tracking.group()) {
            Ok(headers) => headers,
            Err(e) => {
                warn!(group = tracking.group(), error = %e, "cannot load tracked headers");
                return;
            }
        };

        if headers.is_empty() {
            return;
        }
        debug!(
            url = %request.url(),
            group = tracking.group(),
            ?headers,
            "replaying tracked headers"
        );
        for (name, value) in headers {
            request.set_header(name, value);
        }
    }

    /// Persist the tracked headers of a successful response.
    ///
    /// Keeps the headers whose lowercase name contains the lowercase
    /// read-key, joins their values with `;` and replaces the group mapping
    /// with the result (even when empty).
    pub fn capture(&self, headers: &HeaderMap, tracking: Option<&TrackHeader>) {
        let Some(tracking) = tracking else {
            return;
        };

        let read_key = tracking.read_key().to_lowercase();
        let tracked: TrackedHeaders = headers
            .iter()
            .filter(|(name, _)| name.to_lowercase().contains(&read_key))
            .map(|(name, values)| (name.clone(), values.join(HEADER_DELIMITER)))
            .collect();

        debug!(group = tracking.group(), headers = ?tracked, "capturing tracked headers");

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.save(tracking.group(), &tracked) {
            warn!(group = tracking.group(), error = %e, "cannot save tracked headers");
        }
    }

    /// Load the persisted mapping of `group`; empty when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or holds a malformed mapping.
    pub fn load(&self, group: &str) -> Result<TrackedHeaders> {
        match self.store.get(TRACKER_NAMESPACE, &group_key(group))? {
            Some(json) if !json.is_empty() => crate::from_json(json.as_bytes()),
            _ => Ok(TrackedHeaders::new()),
        }
    }

    /// Replace the persisted mapping of `group`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store fails.
    pub fn save(&self, group: &str, headers: &TrackedHeaders) -> Result<()> {
        let json = serde_json::to_string(headers)?;
        self.store.set(TRACKER_NAMESPACE, &group_key(group), &json)
    }
}
