use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// An open page or window that issues resource requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    /// Version of the worker currently in control, if any.
    active: Option<String>,
    /// Each open client and the version controlling it.
    clients: BTreeMap<ClientId, Option<String>>,
}

/// Open clients and which worker version controls each of them.
///
/// Shared between the page side (opening and closing clients) and the
/// worker (claiming them). Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register a newly opened client. It starts out controlled by the active
    /// version, if there is one.
    pub fn open(&self) -> ClientId {
        let mut registry = self.lock();
        let id = ClientId(registry.next_id);
        registry.next_id += 1;
        let controller = registry.active.clone();
        registry.clients.insert(id, controller);
        id
    }

    pub fn close(&self, id: ClientId) -> bool {
        self.lock().clients.remove(&id).is_some()
    }

    /// Make `version` the active controller of every open client.
    /// Returns the number of clients that changed controller.
    pub fn claim(&self, version: &str) -> usize {
        let mut registry = self.lock();
        registry.active = Some(version.to_string());

        let mut changed = 0;
        for controller in registry.clients.values_mut() {
            if controller.as_deref() != Some(version) {
                *controller = Some(version.to_string());
                changed += 1;
            }
        }
        changed
    }

    pub fn controller(&self, id: ClientId) -> Option<String> {
        self.lock().clients.get(&id).cloned().flatten()
    }

    pub fn active_version(&self) -> Option<String> {
        self.lock().active.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().clients.is_empty()
    }
}
