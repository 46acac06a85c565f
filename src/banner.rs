//! The consent banner itself: the [`BannerSurface`] trait (the injected
//! document-mutation handle) and [`ConsentBanner`], the per-page-load state
//! machine that decides whether to prompt, records the user's choice, and
//! forwards it to the analytics bridge.
//!
//! The state machine, per page load:
//!
//! ```text
//! Init -> [read store] -> Decided(granted) -> bridge.set_consent(true); no banner
//!                      -> Decided(denied)  -> bridge.set_consent(false); no banner
//!                      -> Unknown          -> Shown -> (accept)  -> Decided(granted) + persist
//!                                                   -> (decline) -> Decided(denied)  + persist
//! ```
//!
//! `Shown` is the only transient state; `Decided` is terminal for the page
//! load.

use crate::bridge::AnalyticsBridge;
use crate::location::PageLocation;
use crate::record::ConsentState;
use crate::store::{ConsentStore, Storage};
use log::debug;

const PROMPT: &str =
    "We use cookies to understand how this site is used. Is that OK?";

/// What a mounted banner displays. The surface renders it however its host
/// document requires; the component only dictates content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BannerSpec {
    /// The prompt text shown beside the Accept and Decline actions.
    pub message: String,

    /// Href of the privacy-policy document, resolved for the current page
    /// location.
    pub privacy_policy_href: String,
}

/// The injected document-mutation handle. Mounts and removes the single
/// consent banner; the component guarantees `mount` is never called twice
/// without an intervening `unmount`.
pub trait BannerSurface {
    /// Adds the banner to the document.
    fn mount(&mut self, spec: &BannerSpec);

    /// Removes the banner element from the document. Removal, not hiding:
    /// a hidden element would still block interaction with the content
    /// underneath. An implementation may animate first, as long as the
    /// element ends up removed.
    fn unmount(&mut self);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Shown,
    Decided,
}

/// The consent component, constructed once per page load. Owns its storage,
/// surface, and (optional) bridge handles rather than reaching for ambient
/// globals, so the whole flow runs under test with in-memory fakes.
pub struct ConsentBanner<S, D, B> {
    store: ConsentStore<S>,
    surface: D,
    bridge: Option<B>,
    location: PageLocation,
    phase: Phase,
}

impl<S, D, B> ConsentBanner<S, D, B>
where
    S: Storage,
    D: BannerSurface,
    B: AnalyticsBridge,
{
    pub fn new(
        store: ConsentStore<S>,
        surface: D,
        bridge: Option<B>,
        location: PageLocation,
    ) -> ConsentBanner<S, D, B> {
        ConsentBanner {
            store,
            surface,
            bridge,
            location,
            phase: Phase::Init,
        }
    }

    /// Runs the entry transition. With a valid stored decision, forwards it
    /// to the bridge and shows nothing; otherwise mounts the banner.
    /// Idempotent: once the banner is mounted, or the page load has reached
    /// `Decided`, further calls do nothing.
    pub fn maybe_show(&mut self) {
        if self.phase != Phase::Init {
            return;
        }
        match self.store.read() {
            ConsentState::Granted => self.decide(true),
            ConsentState::Denied => self.decide(false),
            ConsentState::Unknown => {
                self.surface.mount(&BannerSpec {
                    message: PROMPT.to_owned(),
                    privacy_policy_href: self
                        .location
                        .privacy_policy_href(self.store.policy())
                        .to_owned(),
                });
                self.phase = Phase::Shown;
            }
        }
    }

    /// The user accepted tracking: persist, notify the bridge, dismiss.
    pub fn accept(&mut self) {
        self.settle(true)
    }

    /// The user declined tracking: persist, notify the bridge, dismiss.
    pub fn decline(&mut self) {
        self.settle(false)
    }

    /// Whether the banner is currently mounted.
    pub fn is_shown(&self) -> bool {
        self.phase == Phase::Shown
    }

    pub fn store(&self) -> &ConsentStore<S> {
        &self.store
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn bridge(&self) -> Option<&B> {
        self.bridge.as_ref()
    }

    fn settle(&mut self, granted: bool) {
        // Decided is terminal for the page load.
        if self.phase == Phase::Decided {
            return;
        }
        self.store.write(granted);
        if self.phase == Phase::Shown {
            self.surface.unmount();
        }
        self.decide(granted);
    }

    fn decide(&mut self, granted: bool) {
        self.phase = Phase::Decided;
        debug!(
            "consent {} for this page load",
            match granted {
                true => "granted",
                false => "denied",
            }
        );
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.set_consent(granted);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::policy::Policy;
    use crate::store::{Error as StorageError, MemoryStorage, Result as StorageResult};

    /// Counts mounts and tracks whether a banner element is currently in
    /// the document.
    #[derive(Default)]
    struct RecordingSurface {
        mounts: usize,
        active: Option<BannerSpec>,
    }

    impl BannerSurface for RecordingSurface {
        fn mount(&mut self, spec: &BannerSpec) {
            self.mounts += 1;
            self.active = Some(spec.clone());
        }

        fn unmount(&mut self) {
            self.active = None;
        }
    }

    /// Records every `set_consent` call.
    #[derive(Default)]
    struct RecordingBridge {
        calls: Vec<bool>,
    }

    impl AnalyticsBridge for RecordingBridge {
        fn set_consent(&mut self, granted: bool) {
            self.calls.push(granted);
        }
    }

    /// A storage area that fails every operation.
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable)
        }

        fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable)
        }

        fn remove(&mut self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable)
        }
    }

    type TestBanner<S> = ConsentBanner<S, RecordingSurface, RecordingBridge>;

    fn banner_over(storage: MemoryStorage) -> TestBanner<MemoryStorage> {
        ConsentBanner::new(
            ConsentStore::new(storage, Policy::default()),
            RecordingSurface::default(),
            Some(RecordingBridge::default()),
            PageLocation::SiteRoot,
        )
    }

    fn storage_with(value: &str) -> MemoryStorage {
        let mut storage = MemoryStorage::default();
        storage.set("cais-consent", value).unwrap();
        storage
    }

    #[test]
    fn test_no_record_mounts_once() {
        let mut banner = banner_over(MemoryStorage::default());
        banner.maybe_show();
        assert!(banner.is_shown());
        assert_eq!(banner.surface().mounts, 1);
        assert!(banner.bridge().unwrap().calls.is_empty());
    }

    #[test]
    fn test_stale_record_mounts_once() {
        let mut banner = banner_over(storage_with(
            r#"{"consent":true,"version":"0","timestamp":"2026-01-05T12:00:00Z"}"#,
        ));
        banner.maybe_show();
        assert!(banner.is_shown());
        assert_eq!(banner.surface().mounts, 1);
    }

    #[test]
    fn test_valid_record_skips_banner() {
        let mut banner = banner_over(storage_with(
            r#"{"consent":true,"version":"1","timestamp":"2026-01-05T12:00:00Z"}"#,
        ));
        banner.maybe_show();
        assert!(!banner.is_shown());
        assert_eq!(banner.surface().mounts, 0);
        assert_eq!(banner.bridge().unwrap().calls, vec![true]);
    }

    #[test]
    fn test_stored_decline_skips_banner() {
        let mut banner = banner_over(storage_with(
            r#"{"consent":false,"version":"1","timestamp":"2026-01-05T12:00:00Z"}"#,
        ));
        banner.maybe_show();
        assert!(!banner.is_shown());
        assert_eq!(banner.surface().mounts, 0);
        assert_eq!(banner.bridge().unwrap().calls, vec![false]);
    }

    #[test]
    fn test_maybe_show_idempotent_while_shown() {
        let mut banner = banner_over(MemoryStorage::default());
        banner.maybe_show();
        banner.maybe_show();
        assert_eq!(banner.surface().mounts, 1);
    }

    #[test]
    fn test_maybe_show_idempotent_after_decision() {
        let mut banner = banner_over(storage_with(
            r#"{"consent":true,"version":"1","timestamp":"2026-01-05T12:00:00Z"}"#,
        ));
        banner.maybe_show();
        banner.maybe_show();
        assert_eq!(banner.bridge().unwrap().calls, vec![true]);
    }

    #[test]
    fn test_accept_end_to_end() {
        let mut banner = banner_over(MemoryStorage::default());
        banner.maybe_show();
        banner.accept();
        assert!(banner.surface().active.is_none());
        assert_eq!(banner.bridge().unwrap().calls, vec![true]);
        assert_eq!(banner.store().read(), ConsentState::Granted);
    }

    #[test]
    fn test_decline_end_to_end() {
        let mut banner = banner_over(MemoryStorage::default());
        banner.maybe_show();
        banner.decline();
        assert!(banner.surface().active.is_none());
        assert_eq!(banner.bridge().unwrap().calls, vec![false]);
        assert_eq!(banner.store().read(), ConsentState::Denied);
    }

    #[test]
    fn test_decided_is_terminal() {
        let mut banner = banner_over(MemoryStorage::default());
        banner.maybe_show();
        banner.accept();
        banner.decline();
        banner.maybe_show();
        assert_eq!(banner.bridge().unwrap().calls, vec![true]);
        assert_eq!(banner.store().read(), ConsentState::Granted);
        assert_eq!(banner.surface().mounts, 1);
    }

    #[test]
    fn test_broken_storage_still_prompts_and_operates() {
        let mut banner = ConsentBanner::new(
            ConsentStore::new(BrokenStorage, Policy::default()),
            RecordingSurface::default(),
            Some(RecordingBridge::default()),
            PageLocation::SiteRoot,
        );
        banner.maybe_show();
        assert!(banner.is_shown());
        banner.accept();
        assert!(banner.surface().active.is_none());
        assert_eq!(banner.bridge().unwrap().calls, vec![true]);
    }

    #[test]
    fn test_missing_bridge_is_noop() {
        let mut banner: ConsentBanner<MemoryStorage, RecordingSurface, RecordingBridge> =
            ConsentBanner::new(
                ConsentStore::new(MemoryStorage::default(), Policy::default()),
                RecordingSurface::default(),
                None,
                PageLocation::SiteRoot,
            );
        banner.maybe_show();
        banner.accept();
        assert_eq!(banner.store().read(), ConsentState::Granted);
    }

    #[test]
    fn test_nested_location_href() {
        let mut banner = ConsentBanner::new(
            ConsentStore::new(MemoryStorage::default(), Policy::default()),
            RecordingSurface::default(),
            Some(RecordingBridge::default()),
            PageLocation::Nested,
        );
        banner.maybe_show();
        assert_eq!(
            banner.surface().active.as_ref().unwrap().privacy_policy_href,
            "../privacy-policy.html"
        );
    }

    #[test]
    fn test_root_location_href() {
        let mut banner = banner_over(MemoryStorage::default());
        banner.maybe_show();
        assert_eq!(
            banner.surface().active.as_ref().unwrap().privacy_policy_href,
            "privacy-policy.html"
        );
    }
}
