//! Node-name collections with compressed range notation.
//!
//! `node[01-08]` and `["node01", ..., "node08"]` are interchangeable on
//! the wire; natively a hostlist is always held expanded, in source order.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hostlist {
    names: Vec<String>,
}

impl Hostlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a compressed range expression, e.g. `node[01-08],login0`.
    ///
    /// Top-level commas separate expressions; a single bracket pair per
    /// expression holds comma-separated numbers or zero-padded ranges.
    pub fn from_ranged(expr: &str) -> Result<Self, String> {
        let mut names = Vec::new();
        for part in split_outside_brackets(expr) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            expand_expression(part, &mut names)?;
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for Hostlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(","))
    }
}

/// Split on commas that are not inside a bracket group.
fn split_outside_brackets(expr: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in expr.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&expr[start..]);
    parts
}

fn expand_expression(expr: &str, out: &mut Vec<String>) -> Result<(), String> {
    let Some(open) = expr.find('[') else {
        out.push(expr.to_string());
        return Ok(());
    };
    let close = expr
        .rfind(']')
        .ok_or_else(|| format!("unclosed bracket in hostlist expression {expr:?}"))?;
    if close < open {
        return Err(format!("malformed bracket in hostlist expression {expr:?}"));
    }
    let prefix = &expr[..open];
    let suffix = &expr[close + 1..];
    for item in expr[open + 1..close].split(',') {
        let item = item.trim();
        if let Some((lo, hi)) = item.split_once('-') {
            let width = lo.len();
            let lo_n: u64 = lo
                .parse()
                .map_err(|_| format!("bad range start {lo:?} in {expr:?}"))?;
            let hi_n: u64 = hi
                .parse()
                .map_err(|_| format!("bad range end {hi:?} in {expr:?}"))?;
            if hi_n < lo_n {
                return Err(format!("inverted range {item:?} in {expr:?}"));
            }
            for n in lo_n..=hi_n {
                out.push(format!("{prefix}{n:0width$}{suffix}"));
            }
        } else {
            let width = item.len();
            let n: u64 = item
                .parse()
                .map_err(|_| format!("bad index {item:?} in {expr:?}"))?;
            out.push(format!("{prefix}{n:0width$}{suffix}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_names() {
        let hl = Hostlist::from_ranged("alpha,beta").unwrap();
        assert_eq!(hl.names().to_vec(), vec!["alpha".to_string(), "beta".into()]);
    }

    #[test]
    fn test_zero_padded_range() {
        let hl = Hostlist::from_ranged("node[01-03]").unwrap();
        assert_eq!(
            hl.names().to_vec(),
            vec!["node01".to_string(), "node02".into(), "node03".into()]
        );
    }

    #[test]
    fn test_mixed_items_and_suffix() {
        let hl = Hostlist::from_ranged("rack[1-2,5]a").unwrap();
        assert_eq!(
            hl.names().to_vec(),
            vec!["rack1a".to_string(), "rack2a".into(), "rack5a".into()]
        );
    }

    #[test]
    fn test_range_with_trailing_plain() {
        let hl = Hostlist::from_ranged("node[01-02],login0").unwrap();
        assert_eq!(
            hl.names().to_vec(),
            vec!["node01".to_string(), "node02".into(), "login0".into()]
        );
    }

    #[test]
    fn test_errors() {
        assert!(Hostlist::from_ranged("node[01-").is_err());
        assert!(Hostlist::from_ranged("node[03-01]").is_err());
        assert!(Hostlist::from_ranged("node[ab]").is_err());
    }

    #[test]
    fn test_position_lookup() {
        let hl = Hostlist::from_ranged("node[01-08]").unwrap();
        assert_eq!(hl.get(0), Some("node01"));
        assert_eq!(hl.get(7), Some("node08"));
        assert_eq!(hl.get(8), None);
    }
}
