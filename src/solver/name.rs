//! Record naming.
//!
//! Record names are restricted to lower-case alphanumerics and `-`, without a trailing `-`.
//! Every other character folds to `-`, so distinct domains can map to the same name (e.g.
//! `a_b.example.com` and `a.b.example.com`). Such collisions are accepted.

/// Prefix of every derived record name.
pub const RECORD_NAME_PREFIX: &str = "acme-";

/// Map a domain to the name of the record that carries its challenge key.
///
/// ```
/// use recordcrab::solver::name::derive_record_name;
///
/// assert_eq!(derive_record_name("Example.COM."), "acme-example-com");
/// ```
pub fn derive_record_name(fqdn: &str) -> String {
    let folded: String = fqdn
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '-',
        })
        .collect();
    format!("{RECORD_NAME_PREFIX}{}", folded.trim_end_matches('-'))
}

/// The DNS name a record is published under: the domain without its trailing dot.
pub fn published_name(fqdn: &str) -> &str {
    fqdn.strip_suffix('.').unwrap_or(fqdn)
}
