//! An ACL store wrapper that records every call.

use std::sync::Mutex;

use effright_core::{Grant, TargetType};
use effright_store::{AclStore, Result, TargetEntry};

/// One call made against a [`RecordingAclStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclCall {
    Grants {
        target_type: TargetType,
        target: String,
    },
    Add {
        target_type: TargetType,
        target: String,
        grants: Vec<Grant>,
    },
    Remove {
        target_type: TargetType,
        target: String,
        grants: Vec<Grant>,
    },
}

impl AclCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, AclCall::Grants { .. })
    }
}

/// Wraps an [`AclStore`], logging calls before forwarding them.
pub struct RecordingAclStore<S> {
    inner: S,
    calls: Mutex<Vec<AclCall>>,
}

impl<S: AclStore> RecordingAclStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn record(&self, call: AclCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    pub fn calls(&self) -> Vec<AclCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl<S: AclStore> AclStore for RecordingAclStore<S> {
    fn grants(&self, target: &TargetEntry) -> Result<Vec<Grant>> {
        self.record(AclCall::Grants {
            target_type: target.target_type,
            target: target.name.clone(),
        });
        self.inner.grants(target)
    }

    fn add_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<()> {
        self.record(AclCall::Add {
            target_type: target.target_type,
            target: target.name.clone(),
            grants: grants.to_vec(),
        });
        self.inner.add_grants(target, grants)
    }

    fn remove_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<Vec<Grant>> {
        self.record(AclCall::Remove {
            target_type: target.target_type,
            target: target.name.clone(),
            grants: grants.to_vec(),
        });
        self.inner.remove_grants(target, grants)
    }
}
