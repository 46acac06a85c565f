//! The cookie-consent component of a static conference website. The site
//! itself is plain HTML; the one piece with real behavior is the banner
//! that asks visitors whether analytics tracking is OK, remembers the
//! answer, and forwards it to the third-party tracker. This crate is that
//! component, with every ambient browser global replaced by an injected
//! handle so the whole flow runs deterministically under test:
//!
//! 1. A decision is persisted as a [`crate::record::ConsentRecord`] (the
//!    answer, the policy version it was given under, and a timestamp) in a
//!    [`crate::store::Storage`] area (the browser's local storage, a file,
//!    or an in-memory fake).
//! 2. On each page load, [`crate::banner::ConsentBanner`] reads the store.
//!    A valid decision is silently forwarded to the analytics bridge; no
//!    decision (including one made under a superseded policy version)
//!    mounts the banner, and the visitor's click persists the answer and
//!    dismisses it.
//! 3. The tracker is an optional [`crate::bridge::AnalyticsBridge`]
//!    capability; when its script never loaded, consent changes are no-ops.
//!
//! Nothing in this component can fail in a user-visible way. Unavailable
//! storage, malformed records, and stale policy versions all degrade to
//! "ask again"; the only fallible operation in the crate is loading the
//! operator's [`crate::policy::Policy`] file.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod banner;
pub mod bridge;
pub mod location;
pub mod policy;
pub mod record;
pub mod store;
