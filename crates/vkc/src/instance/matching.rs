//! Matching of requested capability names against what the platform
//! reported.

use std::ffi::{c_char, CStr, CString};

use super::capability::{Capability, CapabilityKind, CapabilitySet};
use crate::{Error, Result};

/// The requested names found in a [`CapabilitySet`].
///
/// Every name is an owned copy, so a match may outlive the set it was
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityMatch {
    kind: CapabilityKind,
    names: Vec<CString>,
}

impl CapabilityMatch {
    /// Finds the `requested` names in `set`.
    ///
    /// Every record of the set is compared with every requested name,
    /// in set order, and each exact (case-sensitive) hit is copied.
    /// Duplicated names in either list therefore produce duplicated
    /// matches.
    ///
    /// Fails if the set or the request is empty, and if nothing
    /// matched, in which case the unavailable names and the available
    /// ones are logged.
    pub fn new<T, S>(set: &CapabilitySet<T>, requested: &[S]) -> Result<Self>
    where
        T: Capability,
        S: AsRef<CStr>,
    {
        if set.is_empty() {
            log::error!("Can't match {}s against an empty set.", set.kind());
            return Err(Error::InvalidArgument("the capability set is empty"));
        }
        if requested.is_empty() {
            log::error!("No {}s were requested for matching.", set.kind());
            return Err(Error::InvalidArgument("no capability names were requested"));
        }

        let kind = set.kind();
        let mut names: Vec<CString> = Vec::new();
        for property in set.properties() {
            let name = property.capability_name();
            for wanted in requested {
                if wanted.as_ref() != name {
                    continue;
                }
                names.try_reserve(1).map_err(|source| {
                    log::error!("Couldn't allocate the matched {kind} names: {source}");
                    Error::Allocation {
                        what: "matched capability names",
                        source,
                    }
                })?;
                names.push(name.to_owned());
            }
        }

        if names.is_empty() {
            log::error!("No requested {kind}s were available:");
            for wanted in requested {
                log::error!("  - {:?}", wanted.as_ref());
            }
            log::info!("Available {kind}s:");
            for name in set.names() {
                log::info!("  - {name:?}");
            }
            return Err(Error::NoMatch {
                kind,
                requested: requested
                    .iter()
                    .map(|n| n.as_ref().to_string_lossy().into_owned())
                    .collect(),
            });
        }

        names.shrink_to_fit();
        log::debug!("Matched {} {kind}s.", names.len());
        for (i, name) in names.iter().enumerate() {
            log::debug!("i={i}, name={name:?}");
        }

        Ok(Self { kind, names })
    }

    /// The kind of the matched capabilities.
    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// The matched names, in the order they were found.
    pub fn names(&self) -> &[CString] {
        &self.names
    }

    /// The number of matched names. Never zero.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`: an empty match is never constructed.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns `true` if `name` was matched.
    pub fn contains(&self, name: &CStr) -> bool {
        self.names.iter().any(|n| n.as_c_str() == name)
    }

    /// Returns pointers to the names, valid for as long as `self` is,
    /// suitable for `pp_enabled_*_names`.
    pub fn as_ptrs(&self) -> Vec<*const c_char> {
        self.names.iter().map(|name| name.as_ptr()).collect()
    }
}

/// Converts UTF-8 names to C strings.
pub(crate) fn convert_slice_of_strings_to_cstrings(data: &[String]) -> Result<Vec<CString>> {
    data.iter()
        .map(|name| CString::new(name.as_str()).map_err(|_| Error::InvalidName(name.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{extension, layer};
    use crate::ErrorKind;
    use ash::vk;

    fn layers(names: &[&str]) -> CapabilitySet<vk::LayerProperties> {
        CapabilitySet::new(names.iter().copied().map(layer).collect())
    }

    fn brute_force(available: &[&str], requested: &[&str]) -> usize {
        available
            .iter()
            .map(|a| requested.iter().filter(|r| r == &a).count())
            .sum()
    }

    #[test]
    fn subset_is_matched() {
        let set = layers(&["A", "B"]);
        let matched = CapabilityMatch::new(&set, &[c"A", c"C"]).unwrap();
        assert_eq!(matched.kind(), CapabilityKind::Layer);
        assert_eq!(matched.names(), [c"A".to_owned()]);
        assert_eq!(matched.len(), 1);
        assert!(!matched.is_empty());
    }

    #[test]
    fn nothing_matched_is_a_failure() {
        let set = layers(&["A"]);
        let error = CapabilityMatch::new(&set, &[c"Z"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Empty);
        match error {
            Error::NoMatch { kind, requested } => {
                assert_eq!(kind, CapabilityKind::Layer);
                assert_eq!(requested, ["Z"]);
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn empty_arguments_are_rejected() {
        let set = layers(&["A"]);
        let none: [&CStr; 0] = [];
        let error = CapabilityMatch::new(&set, &none).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Precondition);

        let error = CapabilityMatch::new(&layers(&[]), &[c"A"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let set = layers(&["VK_LAYER_KHRONOS_validation"]);
        assert!(CapabilityMatch::new(&set, &[c"vk_layer_khronos_validation"]).is_err());
        assert!(CapabilityMatch::new(&set, &[c"VK_LAYER_KHRONOS"]).is_err());
    }

    #[test]
    fn order_follows_the_set() {
        let set = layers(&["C", "A", "B"]);
        let matched = CapabilityMatch::new(&set, &[c"A", c"B", c"C"]).unwrap();
        assert_eq!(
            matched.names(),
            [c"C".to_owned(), c"A".to_owned(), c"B".to_owned()]
        );
    }

    #[test]
    fn count_equals_pairwise_hits() {
        let cases: &[(&[&str], &[&str])] = &[
            (&["A", "B"], &["A", "C"]),
            (&["A", "B", "C"], &["C", "B", "A"]),
            (&["A", "A", "B"], &["A"]),
            (&["A", "B"], &["B", "B", "B"]),
            (&["A", "A"], &["A", "A"]),
            (&["X", "Y", "Z"], &["Y", "Q", "Z", "Y"]),
        ];
        for (available, requested) in cases {
            let set = layers(available);
            let requested_c: Vec<CString> =
                requested.iter().map(|r| CString::new(*r).unwrap()).collect();
            let matched = CapabilityMatch::new(&set, &requested_c).unwrap();
            assert_eq!(
                matched.len(),
                brute_force(available, requested),
                "{available:?} / {requested:?}"
            );
            for name in matched.names() {
                assert!(set.contains(name));
            }
        }
    }

    #[test]
    fn names_are_copies() {
        let set = CapabilitySet::new(vec![extension("VK_KHR_surface", 25)]);
        let matched = CapabilityMatch::new(&set, &[c"VK_KHR_surface"]).unwrap();
        let record = set.properties()[0].extension_name.as_ptr();
        assert_ne!(matched.names()[0].as_ptr(), record);

        // Mutating the set leaves the match alone.
        let mut properties = set.properties().to_vec();
        properties[0].extension_name[0] = b'X' as c_char;
        let mutated = CapabilitySet::new(properties);
        assert_eq!(matched.names()[0].as_c_str(), c"VK_KHR_surface");
        assert!(!mutated.contains(c"VK_KHR_surface"));
    }

    #[test]
    fn match_outlives_the_set() {
        let set = layers(&["A", "B"]);
        let matched = CapabilityMatch::new(&set, &[c"B"]).unwrap();
        drop(set);
        assert_eq!(matched.names(), [c"B".to_owned()]);
        let pointers = matched.as_ptrs();
        assert_eq!(pointers.len(), 1);
        assert_eq!(unsafe { CStr::from_ptr(pointers[0]) }, c"B");
    }

    #[test]
    fn strings_to_cstrings() {
        let names = vec!["VK_KHR_surface".to_owned(), "VK_EXT_debug_utils".to_owned()];
        let converted = convert_slice_of_strings_to_cstrings(&names).unwrap();
        assert_eq!(converted[1].as_c_str(), c"VK_EXT_debug_utils");

        let error = convert_slice_of_strings_to_cstrings(&["a\0b".to_owned()]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Precondition);
    }
}
