//! Destination selection: default, exact name, or unique prefix.

use std::collections::BTreeMap;

use crate::config::{DestinationProfile, DropConfig};
use crate::error::{AmbiguousDestination, DropError};

/// Pick exactly one profile.
///
/// - No request: the profile named `default_name` (config error if unset or unknown).
/// - Exact name match wins, even when it is also a prefix of other names.
/// - Otherwise the request must be a prefix of exactly one name (case-sensitive).
pub fn resolve<'a>(
    requested: Option<&str>,
    profiles: &'a BTreeMap<String, DestinationProfile>,
    default_name: Option<&str>,
) -> Result<&'a DestinationProfile, DropError> {
    let Some(requested) = requested else {
        let default_name = default_name.ok_or_else(|| {
            DropError::config("no destination given and no default 'destination' configured")
        })?;
        return profiles.get(default_name).ok_or_else(|| {
            DropError::config(format!(
                "default destination '{}' is not defined",
                default_name
            ))
        });
    };

    if let Some(profile) = profiles.get(requested) {
        return Ok(profile);
    }

    let mut matches: Vec<&DestinationProfile> = profiles
        .iter()
        .filter(|(name, _)| name.starts_with(requested))
        .map(|(_, profile)| profile)
        .collect();

    match matches.len() {
        0 => Err(DropError::AmbiguousDestination(AmbiguousDestination::NoMatch {
            requested: requested.to_string(),
        })),
        1 => Ok(matches.remove(0)),
        _ => Err(DropError::AmbiguousDestination(
            AmbiguousDestination::MultipleMatches {
                requested: requested.to_string(),
                candidates: matches.iter().map(|p| p.name.clone()).collect(),
            },
        )),
    }
}

/// Convenience wrapper over [`resolve`] for a loaded config.
pub fn resolve_in<'a>(
    requested: Option<&str>,
    config: &'a DropConfig,
) -> Result<&'a DestinationProfile, DropError> {
    let profile = resolve(
        requested,
        &config.profiles,
        config.default_destination.as_deref(),
    )?;
    tracing::debug!(
        requested = requested.unwrap_or("<default>"),
        destination = %profile.name,
        "resolved destination"
    );
    Ok(profile)
}

/// Destination names in sorted order, flagging the configured default.
pub fn list_destinations(config: &DropConfig) -> Vec<(&str, bool)> {
    config
        .profiles
        .keys()
        .map(|name| {
            let is_default = config.default_destination.as_deref() == Some(name.as_str());
            (name.as_str(), is_default)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::HashAlgorithm;

    fn profiles(names: &[&str]) -> BTreeMap<String, DestinationProfile> {
        names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    DestinationProfile {
                        name: name.to_string(),
                        remote_server: format!("{}.example", name),
                        remote_dir: "/srv".to_string(),
                        url_prefix: format!("https://{}.example/", name),
                        file_mode: 0o644,
                        hash_length: 8,
                        hash_algorithm: HashAlgorithm::Sha1,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn exact_match_beats_prefix_ambiguity() {
        let p = profiles(&["home", "home2"]);
        assert_eq!(resolve(Some("home2"), &p, None).unwrap().name, "home2");
        assert_eq!(resolve(Some("home"), &p, None).unwrap().name, "home");
    }

    #[test]
    fn unique_prefix_resolves() {
        let p = profiles(&["alpha", "beta"]);
        assert_eq!(resolve(Some("a"), &p, None).unwrap().name, "alpha");
        assert_eq!(resolve(Some("be"), &p, None).unwrap().name, "beta");
    }

    #[test]
    fn shared_prefix_is_ambiguous() {
        let p = profiles(&["alpha", "alpine"]);
        match resolve(Some("al"), &p, None) {
            Err(DropError::AmbiguousDestination(AmbiguousDestination::MultipleMatches {
                requested,
                candidates,
            })) => {
                assert_eq!(requested, "al");
                assert_eq!(candidates, vec!["alpha".to_string(), "alpine".to_string()]);
            }
            other => panic!("expected MultipleMatches, got {:?}", other),
        }
    }

    #[test]
    fn no_match_is_reported() {
        let p = profiles(&["alpha", "beta"]);
        assert!(matches!(
            resolve(Some("zzz"), &p, Some("alpha")),
            Err(DropError::AmbiguousDestination(AmbiguousDestination::NoMatch { .. }))
        ));
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let p = profiles(&["Home"]);
        assert!(resolve(Some("ho"), &p, None).is_err());
        assert_eq!(resolve(Some("Ho"), &p, None).unwrap().name, "Home");
    }

    #[test]
    fn default_is_used_when_nothing_requested() {
        let p = profiles(&["alpha", "beta"]);
        assert_eq!(resolve(None, &p, Some("beta")).unwrap().name, "beta");
    }

    #[test]
    fn missing_or_unknown_default_is_config_error() {
        let p = profiles(&["alpha"]);
        assert!(matches!(resolve(None, &p, None), Err(DropError::Config(_))));
        assert!(matches!(
            resolve(None, &p, Some("gone")),
            Err(DropError::Config(ref m)) if m.contains("gone")
        ));
    }

    #[test]
    fn empty_request_matches_everything() {
        let p = profiles(&["alpha", "beta"]);
        assert!(matches!(
            resolve(Some(""), &p, None),
            Err(DropError::AmbiguousDestination(AmbiguousDestination::MultipleMatches { .. }))
        ));
        let single = profiles(&["only"]);
        assert_eq!(resolve(Some(""), &single, None).unwrap().name, "only");
    }

    #[test]
    fn listing_flags_default() {
        let config = DropConfig {
            default_destination: Some("beta".to_string()),
            profiles: profiles(&["beta", "alpha"]),
        };
        assert_eq!(
            list_destinations(&config),
            vec![("alpha", false), ("beta", true)]
        );
        assert_eq!(resolve_in(None, &config).unwrap().name, "beta");
    }
}
