//! Share-link resolution.
//!
//! Cloud providers hand out share links that open a web viewer. Each
//! [`LinkResolver`] knows how to turn one provider's share links into URLs that
//! serve the raw file bytes.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::fmt::Debug;
use std::sync::Arc;

pub trait LinkResolver: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `url` is a share link of this provider.
    fn handles(&self, url: &str) -> bool;

    /// Direct-download URL for a share link. Does not validate the input.
    fn resolve(&self, share_url: &str) -> String;
}

const ONEDRIVE_SHARES_API: &str = "https://api.onedrive.com/v1.0/shares";

/// OneDrive short links (`https://1drv.ms/...`), resolved through the public
/// shares API. The share id is the link itself, URL-safe base64 encoded
/// without padding and prefixed with `u!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OneDriveResolver;

impl LinkResolver for OneDriveResolver {
    fn name(&self) -> &'static str {
        "onedrive"
    }

    fn handles(&self, url: &str) -> bool {
        url.contains("1drv")
    }

    fn resolve(&self, share_url: &str) -> String {
        let share_id = URL_SAFE_NO_PAD.encode(share_url.as_bytes());
        format!("{ONEDRIVE_SHARES_API}/u!{share_id}/root/content")
    }
}

/// Ordered set of resolvers; the first one that handles a URL wins.
#[derive(Clone, Debug)]
pub struct LinkResolvers {
    resolvers: Vec<Arc<dyn LinkResolver>>,
}

impl LinkResolvers {
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    pub fn with(mut self, resolver: impl LinkResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn resolver_for(&self, url: &str) -> Option<&dyn LinkResolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.handles(url))
            .map(|resolver| &**resolver)
    }

    /// Direct-download URL for `url`. URLs no resolver handles are returned
    /// unchanged.
    pub fn resolve(&self, url: &str) -> String {
        match self.resolver_for(url) {
            Some(resolver) => {
                let resolved = resolver.resolve(url);
                tracing::debug!(resolver = resolver.name(), %url, %resolved, "Resolved share link");
                resolved
            }
            None => url.to_string(),
        }
    }
}

impl Default for LinkResolvers {
    fn default() -> Self {
        Self::empty().with(OneDriveResolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, load_config};
    use url::Url;

    #[test]
    fn test_onedrive_resolve_known_link() {
        let resolved =
            OneDriveResolver.resolve("https://1drv.ms/u/s!As2ibEui13xml4JKELeEITUmX0WUHQ?e=kp6Yw9");

        assert_eq!(
            resolved,
            "https://api.onedrive.com/v1.0/shares/u!aHR0cHM6Ly8xZHJ2Lm1zL3UvcyFBczJpYkV1aTEzeG1sNEpLRUxlRUlUVW1YMFdVSFE_ZT1rcDZZdzk/root/content"
        );
    }

    #[test]
    fn test_onedrive_resolve_substitutes_url_safe_alphabet() {
        // Standard base64 of these bytes contains both '+' and '/' and ends in padding
        let input = "https://1drv.ms/u/s!>>>???";
        let standard = base64::engine::general_purpose::STANDARD.encode(input);
        assert!(standard.contains('+') || standard.contains('/'));

        let expected = standard
            .replace('/', "_")
            .replace('+', "-")
            .trim_end_matches('=')
            .to_string();
        assert_eq!(
            OneDriveResolver.resolve(input),
            format!("{ONEDRIVE_SHARES_API}/u!{expected}/root/content")
        );
    }

    #[test]
    fn test_resolved_builtin_manifest_urls_are_well_formed() {
        let config = load_config(None, &ConfigOverrides::default()).unwrap();
        let resolvers = LinkResolvers::default();

        for entry in config.manifest.iter() {
            let resolved = resolvers.resolve(&entry.url);
            let parsed = Url::parse(&resolved).expect("resolved URL should parse");
            assert_eq!(parsed.host_str(), Some("api.onedrive.com"));

            let share_id = resolved
                .strip_prefix(&format!("{ONEDRIVE_SHARES_API}/u!"))
                .and_then(|rest| rest.strip_suffix("/root/content"))
                .expect("resolved URL should follow the shares API layout");
            assert!(!share_id.contains('/'), "{share_id}");
            assert!(!share_id.contains('+'), "{share_id}");
            assert!(!share_id.ends_with('='), "{share_id}");
        }
    }

    #[test]
    fn test_onedrive_handles_any_url_mentioning_1drv() {
        assert!(OneDriveResolver.handles("https://1drv.ms/u/s!abc"));
        assert!(OneDriveResolver.handles("https://example.com/1drv/file.bin"));
        assert!(!OneDriveResolver.handles("https://example.com/file.bin"));
        assert!(!OneDriveResolver.handles("not a url"));
    }

    #[test]
    fn test_unhandled_urls_pass_through() {
        let resolvers = LinkResolvers::default();
        let url = "https://example.com/files/model.bin";
        assert_eq!(resolvers.resolve(url), url);
        assert!(resolvers.resolver_for(url).is_none());
    }

    #[derive(Debug)]
    struct MirrorResolver;

    impl LinkResolver for MirrorResolver {
        fn name(&self) -> &'static str {
            "mirror"
        }

        fn handles(&self, url: &str) -> bool {
            url.starts_with("mirror://")
        }

        fn resolve(&self, share_url: &str) -> String {
            share_url.replacen("mirror://", "https://mirror.example.com/", 1)
        }
    }

    #[test]
    fn test_additional_resolvers_can_be_registered() {
        let resolvers = LinkResolvers::default().with(MirrorResolver);

        assert_eq!(
            resolvers.resolve("mirror://glove.txt.gz"),
            "https://mirror.example.com/glove.txt.gz"
        );
        assert_eq!(
            resolvers.resolver_for("https://1drv.ms/u/s!abc").map(|r| r.name()),
            Some("onedrive")
        );
    }
}
