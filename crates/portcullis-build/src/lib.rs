//! Portcullis Build - lifecycle strategy for BuildConfig objects
//!
//! On create and update the strategy drops triggers of unknown type. On update it
//! also keeps `status.lastVersion` from moving backwards: a lower submitted value is
//! stale client data and is silently replaced by the stored one.

pub mod api;
pub mod strategy;
pub mod validation;

pub use api::{
    BuildConfig, BuildConfigSpec, BuildConfigStatus, BuildTriggerPolicy, BuildTriggerType,
    KNOWN_TRIGGER_TYPES,
};
pub use strategy::{BuildConfigStrategy, drop_unknown_triggers, get_attrs, matcher};
pub use validation::{validate_build_config, validate_build_config_update};
