//! Section resolution: which [`PermissionSet`] applies to an endpoint.

use crate::{Access, PermissionSet, SectionRights, SectionSpec};

/// Resolve the effective permissions for `spec` within one app's rights.
///
/// Returns `None` when none of the named sections is granted at all.
///
/// For grouped endpoints, `read` and `write` are resolved independently: each
/// takes the token list of the section whose broadest token ranks strictly
/// highest (earlier sections win ties). A group is therefore as permissive as
/// its most permissive member.
pub fn resolve_sections(rights: &SectionRights, spec: &SectionSpec) -> Option<PermissionSet> {
    match spec {
        SectionSpec::Single(name) => rights.get(name).cloned(),
        SectionSpec::Many(names) => broadest(rights, names),
    }
}

fn broadest(rights: &SectionRights, names: &[String]) -> Option<PermissionSet> {
    let mut found = false;
    let mut read = Broadest::default();
    let mut write = Broadest::default();

    for set in names.iter().filter_map(|name| rights.get(name)) {
        found = true;
        read.offer(&set.read);
        write.offer(&set.write);
    }

    found.then(|| PermissionSet::new(read.into_access(), write.into_access()))
}

#[derive(Default)]
struct Broadest<'a> {
    // `None` (no access) ranks below every granted list.
    rank: Option<u8>,
    access: Option<&'a Access>,
}

impl<'a> Broadest<'a> {
    fn offer(&mut self, candidate: &'a Access) {
        let rank = candidate.highest_rank();
        if rank > self.rank {
            self.rank = rank;
            self.access = Some(candidate);
        }
    }

    fn into_access(self) -> Access {
        self.access.cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rights() -> SectionRights {
        SectionRights::new()
            .with_section("a", PermissionSet::new(Access::scopes(["own"]), Access::scopes(["group"])))
            .with_section("b", PermissionSet::new(Access::scopes(["all"]), Access::None))
            .with_section("c", PermissionSet::new(Access::scopes(["-"]), Access::scopes(["own"])))
            .with_section("d", PermissionSet::new(Access::scopes(["account"]), Access::scopes(["group", "-"])))
    }

    fn many(names: &[&str]) -> SectionSpec {
        SectionSpec::Many(names.iter().map(|n| n.to_string()).collect())
    }

    #[test]
    fn single_section_is_looked_up_directly() {
        let resolved = resolve_sections(&rights(), &SectionSpec::Single("a".into())).unwrap();
        assert_eq!(resolved.read, Access::scopes(["own"]));
        assert!(resolve_sections(&rights(), &SectionSpec::Single("zz".into())).is_none());
    }

    #[test]
    fn read_and_write_are_resolved_independently() {
        let resolved = resolve_sections(&rights(), &many(&["a", "b"])).unwrap();
        assert_eq!(resolved.read, Access::scopes(["all"]));
        assert_eq!(resolved.write, Access::scopes(["group"]));
    }

    #[test]
    fn ties_keep_the_first_section() {
        // a.write = ["group"], d.write = ["group", "-"]: both rank 3.
        let resolved = resolve_sections(&rights(), &many(&["a", "d"])).unwrap();
        assert_eq!(resolved.write, Access::scopes(["group"]));

        let resolved = resolve_sections(&rights(), &many(&["d", "a"])).unwrap();
        assert_eq!(resolved.write, Access::scopes(["group", "-"]));
    }

    #[test]
    fn any_granted_list_beats_no_access() {
        let resolved = resolve_sections(&rights(), &many(&["b", "c"])).unwrap();
        assert_eq!(resolved.write, Access::scopes(["own"]));

        let only_b = resolve_sections(&rights(), &many(&["b"])).unwrap();
        assert_eq!(only_b.write, Access::None);
    }

    #[test]
    fn unknown_sections_in_a_group_are_skipped() {
        let resolved = resolve_sections(&rights(), &many(&["zz", "c"])).unwrap();
        assert_eq!(resolved.read, Access::scopes(["-"]));
        assert!(resolve_sections(&rights(), &many(&["zz", "yy"])).is_none());
    }
}
