//! Admin DN helpers

/// Build the admin bind DN for a bare username under `root`
pub fn admin_dn(user: &str, root: &str) -> String {
    format!("cn={},{}", user, root)
}

/// Reduce a full admin DN (`cn=<name>,<root>`) to its bare username.
///
/// The image wants a bare name in `LDAP_ADMIN_USERNAME`, but callers often
/// pass the DN they will bind with. Anything that is not a `cn=` entry
/// directly under `root` is returned unchanged.
pub fn normalize_admin_user(user: &str, root: &str) -> String {
    let trimmed = user.trim();
    let Some(prefix) = trimmed.get(..3) else {
        return trimmed.to_string();
    };
    if !prefix.eq_ignore_ascii_case("cn=") {
        return trimmed.to_string();
    }

    let rest = &trimmed[3..];
    let suffix = format!(",{}", root);
    if rest.len() <= suffix.len() {
        return trimmed.to_string();
    }

    let split = rest.len() - suffix.len();
    match (rest.get(..split), rest.get(split..)) {
        (Some(name), Some(tail))
            if tail.eq_ignore_ascii_case(&suffix)
                && !name.contains(',')
                && !name.trim().is_empty() =>
        {
            name.trim().to_string()
        }
        _ => trimmed.to_string(),
    }
}
