//! Built-in analytics provider registry
//!
//! The registry is a static, data-driven table of call shapes rather than a
//! hierarchy of provider types: adding a provider is a data change. It is
//! built once at startup, validated, and passed by reference into the
//! matcher, so there is no shared mutable state across concurrent scans.

use crate::error::{Result, TrackScanError};

/// Destination name for the `dataLayer.push({...})` shape, which is matched
/// as a distinct pattern outside the descriptor table
pub const GTM_PROVIDER: &str = "gtm";

/// Destination name for caller-supplied custom tracking functions
pub const CUSTOM_PROVIDER: &str = "custom";

/// How a provider's calls appear in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallShape {
    /// Bare function invocation, e.g. `gtag('event', ...)`
    Function { function_name: &'static str },

    /// Method call on a known object, e.g. `analytics.track(...)`.
    /// Several object aliases may resolve to the same provider
    /// (e.g. `mParticle` / `mparticle`).
    Member {
        method_name: &'static str,
        object_names: &'static [&'static str],
    },
}

/// Where a provider's calls carry the event name and the properties object
///
/// Argument positions are fixed per provider, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentRule {
    /// Event name and properties at fixed positions; calls with fewer than
    /// `min_args` arguments are not tracking calls for this provider
    Positional {
        event: usize,
        props: usize,
        min_args: usize,
    },

    /// Snowplow's `tracker.track(buildStructEvent({ action: ..., ... }))`:
    /// the struct object's `action` key is the event name and is removed
    /// from the property set
    StructEvent,
}

/// Immutable description of one provider's call shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub name: &'static str,
    pub shape: CallShape,
    pub args: ArgumentRule,
}

const DEFAULT_ARGS: ArgumentRule = ArgumentRule::Positional {
    event: 0,
    props: 1,
    min_args: 2,
};

const BUILTIN_PROVIDERS: &[ProviderDescriptor] = &[
    ProviderDescriptor {
        name: "googleanalytics",
        shape: CallShape::Function {
            function_name: "gtag",
        },
        // gtag('event', 'event_name', { properties })
        args: ArgumentRule::Positional {
            event: 1,
            props: 2,
            min_args: 3,
        },
    },
    ProviderDescriptor {
        name: "segment",
        shape: CallShape::Member {
            method_name: "track",
            object_names: &["analytics"],
        },
        args: DEFAULT_ARGS,
    },
    ProviderDescriptor {
        name: "mixpanel",
        shape: CallShape::Member {
            method_name: "track",
            object_names: &["mixpanel"],
        },
        args: DEFAULT_ARGS,
    },
    ProviderDescriptor {
        name: "amplitude",
        shape: CallShape::Member {
            method_name: "track",
            object_names: &["amplitude"],
        },
        args: DEFAULT_ARGS,
    },
    ProviderDescriptor {
        name: "rudderstack",
        shape: CallShape::Member {
            method_name: "track",
            object_names: &["rudderanalytics"],
        },
        args: DEFAULT_ARGS,
    },
    ProviderDescriptor {
        name: "posthog",
        shape: CallShape::Member {
            method_name: "capture",
            object_names: &["posthog"],
        },
        args: DEFAULT_ARGS,
    },
    ProviderDescriptor {
        name: "heap",
        shape: CallShape::Member {
            method_name: "track",
            object_names: &["heap"],
        },
        args: DEFAULT_ARGS,
    },
    ProviderDescriptor {
        name: "pendo",
        shape: CallShape::Member {
            method_name: "track",
            object_names: &["pendo"],
        },
        args: DEFAULT_ARGS,
    },
    ProviderDescriptor {
        name: "datadog",
        shape: CallShape::Member {
            method_name: "addAction",
            object_names: &["DD_RUM", "datadogRum"],
        },
        args: DEFAULT_ARGS,
    },
    ProviderDescriptor {
        name: "mparticle",
        shape: CallShape::Member {
            method_name: "logEvent",
            object_names: &["mParticle", "mparticle"],
        },
        // mParticle.logEvent('event_name', mParticle.EventType.X, { properties })
        args: ArgumentRule::Positional {
            event: 0,
            props: 2,
            min_args: 3,
        },
    },
    ProviderDescriptor {
        name: "snowplow",
        shape: CallShape::Member {
            method_name: "track",
            object_names: &["tracker"],
        },
        args: ArgumentRule::StructEvent,
    },
];

/// Validated, immutable lookup table over provider descriptors
///
/// Exposes the two query paths the matcher needs: by bare function name and
/// by (method name, object name) pair.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Build a registry, rejecting descriptors that claim the same bare
    /// function name or the same (method name, object name) pair.
    ///
    /// Ambiguous claims are a construction-time error, raised before any
    /// scan starts.
    pub fn new(descriptors: Vec<ProviderDescriptor>) -> Result<Self> {
        let mut function_names: Vec<&str> = Vec::new();
        let mut member_pairs: Vec<(&str, &str)> = Vec::new();

        for descriptor in &descriptors {
            match &descriptor.shape {
                CallShape::Function { function_name } => {
                    if function_names.contains(function_name) {
                        return Err(TrackScanError::RegistryConflict {
                            message: format!(
                                "function name '{}' claimed by more than one provider",
                                function_name
                            ),
                        });
                    }
                    function_names.push(function_name);
                }
                CallShape::Member {
                    method_name,
                    object_names,
                } => {
                    for object_name in *object_names {
                        let pair = (*method_name, *object_name);
                        if member_pairs.contains(&pair) {
                            return Err(TrackScanError::RegistryConflict {
                                message: format!(
                                    "member call '{}.{}' claimed by more than one provider",
                                    object_name, method_name
                                ),
                            });
                        }
                        member_pairs.push(pair);
                    }
                }
            }
        }

        Ok(Self { descriptors })
    }

    /// The built-in provider table
    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN_PROVIDERS.to_vec())
    }

    /// Look up a function-based provider by bare callee identifier
    pub fn by_function(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.descriptors.iter().find(|d| {
            matches!(&d.shape, CallShape::Function { function_name } if *function_name == name)
        })
    }

    /// Look up a member-based provider by object and method name
    pub fn by_member(&self, object_name: &str, method_name: &str) -> Option<&ProviderDescriptor> {
        self.descriptors.iter().find(|d| match &d.shape {
            CallShape::Member {
                method_name: method,
                object_names,
            } => *method == method_name && object_names.contains(&object_name),
            CallShape::Function { .. } => false,
        })
    }

    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }
}
