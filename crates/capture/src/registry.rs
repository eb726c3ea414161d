//! Tracked-type registry
//!
//! Maps each subject type to its exclusion policy and capture toggle. A type
//! is registered once; later registrations are ignored and the first policy
//! stays in force.

use distlog_core::SubjectType;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::policy::ExclusionPolicy;
use crate::toggle::CaptureToggle;

/// Capture settings for one subject type
#[derive(Debug, Default)]
pub struct TrackedType {
    /// Fields kept out of the log
    pub policy: ExclusionPolicy,
    /// Enable flag and suspension depth
    pub toggle: CaptureToggle,
}

/// All tracked types for one process
#[derive(Debug, Default)]
pub struct CaptureRegistry {
    types: RwLock<HashMap<SubjectType, Arc<TrackedType>>>,
}

impl CaptureRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subject_type`; returns false if it was already tracked
    pub fn register(&self, subject_type: impl Into<SubjectType>, policy: ExclusionPolicy) -> bool {
        let subject_type = subject_type.into();
        let mut types = self.types.write();
        if types.contains_key(&subject_type) {
            warn!(subject_type = %subject_type, "Type already tracked, keeping first policy");
            return false;
        }
        debug!(subject_type = %subject_type, excluded = ?policy.excluded(), "Tracking type");
        types.insert(
            subject_type,
            Arc::new(TrackedType {
                policy,
                toggle: CaptureToggle::new(),
            }),
        );
        true
    }

    /// Settings for `subject_type`, if tracked
    pub fn get(&self, subject_type: &SubjectType) -> Option<Arc<TrackedType>> {
        self.types.read().get(subject_type).cloned()
    }

    /// Whether `subject_type` is tracked
    pub fn is_tracked(&self, subject_type: &SubjectType) -> bool {
        self.types.read().contains_key(subject_type)
    }

    /// Tracked types, sorted by name
    pub fn types(&self) -> Vec<SubjectType> {
        let mut types: Vec<_> = self.types.read().keys().cloned().collect();
        types.sort();
        types
    }
}
