//! Delegated domain extraction from zone file lines

/// Reduces zone file lines to the names that carry NS records
///
/// Lines are expected in whitespace-delimited master format
/// (`name ttl class type rdata...`). Anything with fewer than four fields is
/// skipped, as is every record whose type is not `NS` (case-insensitive).
/// One trailing root-label dot is stripped from the name.
///
/// Deduplication is adjacency-based: a name is suppressed only when it equals
/// the previously emitted one. Zone files list records sorted by owner, so
/// this collapses repeated NS lines of the same delegation while keeping
/// memory constant.
///
/// Each instance holds the state of one stream; use one extractor per zone file.
#[derive(Debug, Default)]
pub struct DomainExtractor {
    last_domain: Option<String>,
    emitted: u64,
}

impl DomainExtractor {
    /// Create an extractor with no previous domain
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one line (without its line terminator)
    ///
    /// Returns the normalized domain, newline-terminated, when the line should
    /// be emitted.
    pub fn process_line(&mut self, line: &str) -> Option<String> {
        let mut fields = line.split_whitespace();
        let name = fields.next()?;
        let record_type = fields.nth(2)?;

        if !record_type.eq_ignore_ascii_case("ns") {
            return None;
        }

        let domain = name.strip_suffix('.').unwrap_or(name);
        if self.last_domain.as_deref() == Some(domain) {
            return None;
        }

        self.last_domain = Some(domain.to_string());
        self.emitted += 1;
        Some(format!("{domain}\n"))
    }

    /// Number of domains emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(lines: &[&str]) -> String {
        let mut extractor = DomainExtractor::new();
        lines
            .iter()
            .filter_map(|line| extractor.process_line(line))
            .collect()
    }

    #[test]
    fn emits_ns_owner_names() {
        let out = extract(&[
            "example.com. 3600 IN NS ns1.example.com.",
            "example.com. 3600 IN NS ns2.example.com.",
            "other.com. 3600 IN NS ns1.other.com.",
        ]);
        assert_eq!(out, "example.com\nother.com\n");
    }

    #[test]
    fn dedup_is_adjacency_only() {
        let out = extract(&[
            "a.com. 3600 IN NS ns1.a.com.",
            "b.com. 3600 IN NS ns1.b.com.",
            "a.com. 3600 IN NS ns2.a.com.",
        ]);
        assert_eq!(out, "a.com\nb.com\na.com\n");
    }

    #[test]
    fn discarded_lines_do_not_break_adjacency() {
        // The A record is dropped before dedup, so the NS lines stay adjacent
        let out = extract(&[
            "a.com. 3600 IN NS ns1.a.com.",
            "a.com. 3600 IN A 192.0.2.1",
            "a.com. 3600 IN NS ns2.a.com.",
        ]);
        assert_eq!(out, "a.com\n");
    }

    #[test]
    fn type_match_is_case_insensitive() {
        let out = extract(&[
            "a.com. 3600 in ns ns1.a.com.",
            "b.com. 3600 IN Ns ns1.b.com.",
            "c.com. 3600 IN A 192.0.2.1",
            "d.com. 3600 IN MX 10 mail.d.com.",
            "e.com. 3600 IN nsec3 1 0 0 -",
        ]);
        assert_eq!(out, "a.com\nb.com\n");
    }

    #[test]
    fn strips_exactly_one_trailing_dot() {
        assert_eq!(extract(&["example.com. 60 IN NS ns."]), "example.com\n");
        assert_eq!(extract(&["example.com 60 IN NS ns."]), "example.com\n");
        assert_eq!(extract(&["example.com.. 60 IN NS ns."]), "example.com.\n");
    }

    #[test]
    fn short_lines_are_discarded() {
        let out = extract(&[
            "",
            "   ",
            "com.",
            "com. 86400",
            "com. 86400 IN",
            "; comment line here",
        ]);
        assert_eq!(out, "");
    }

    #[test]
    fn tolerates_tabs_and_surrounding_whitespace() {
        let out = extract(&["  net.\t172800\tin\tns\ta.gtld-servers.net.  "]);
        assert_eq!(out, "net\n");
    }

    #[test]
    fn counts_emitted_domains() {
        let mut extractor = DomainExtractor::new();
        for line in [
            "a.com. 1 IN NS x.",
            "a.com. 1 IN NS y.",
            "b.com. 1 IN NS x.",
        ] {
            extractor.process_line(line);
        }
        assert_eq!(extractor.emitted(), 2);
    }
}
