use anyhow::{Result, bail};
use equine_core::seed_from_label;
use std::collections::HashMap;

const DEFAULT_SEED: u64 = 1337;

/// Seed metadata used for scenario runs and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub label: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, label: None }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self {
            seed: seed_from_label(label),
            label: Some(label.to_string()),
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        match &self.label {
            Some(label) => format!("{label} ({})", self.seed),
            None => self.seed.to_string(),
        }
    }
}

fn is_label(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Resolve CLI seed tokens into canonical seeds.
///
/// Supports literal integers and textual labels such as `mare-42`, which are
/// hashed to a stable numeric seed. Duplicates collapse onto the first entry.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if is_label(token) {
            pending.push(SeedInfo::from_label(token));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for info in pending {
        if let Some(&existing) = index.get(&info.seed) {
            if let Some(entry) = deduped.get_mut(existing)
                && entry.label.is_none()
                && info.label.is_some()
            {
                *entry = info;
            }
        } else {
            index.insert(info.seed, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(deduped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn resolves_numeric_and_labels() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "mare-42"])).unwrap();
        assert!(seeds.iter().any(|s| s.seed == 42 && s.label.is_none()));
        assert!(seeds.iter().any(|s| s.seed == 7 && s.label.is_none()));
        assert!(seeds.iter().any(|s| {
            s.label.as_deref() == Some("mare-42") && s.seed == seed_from_label("mare-42")
        }));
    }

    #[test]
    fn duplicates_collapse() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "5", "mare", "mare"])).unwrap();
        assert_eq!(seeds.len(), 2);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        let seeds = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(DEFAULT_SEED)]);
    }

    #[test]
    fn rejects_tokens_with_punctuation() {
        assert!(resolve_seed_inputs(&tokens(&["mare 42!"])).is_err());
    }

    #[test]
    fn display_includes_label() {
        let info = SeedInfo::from_label("stud");
        assert!(info.display().starts_with("stud ("));
        assert_eq!(SeedInfo::from_numeric(3).display(), "3");
    }
}
