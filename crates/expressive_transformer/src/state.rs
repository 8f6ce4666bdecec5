//! Mutable state threaded through a single lowering pass.

use expressive_core::intern::Atom;

/// Seed of the synthetic-name generator.
const RANDOM_VAR_SEED: &str = "abcdoajfioaj";

/// Bookkeeping for `cond` lowering.
#[derive(Debug, Clone)]
pub struct TransformerState {
    /// Names bound by the matcher currently being lowered, in binding
    /// order. `None` marks a binding with no source name.
    pub vars: Vec<Option<Atom>>,
    random_var: String,
}

impl TransformerState {
    pub fn new() -> Self {
        Self {
            vars: Vec::new(),
            random_var: RANDOM_VAR_SEED.to_string(),
        }
    }

    #[inline]
    pub fn add_var(&mut self, name: Option<Atom>) {
        self.vars.push(name);
    }

    /// Hand over the bindings collected so far and start a new arm.
    #[inline]
    pub fn take_vars(&mut self) -> Vec<Option<Atom>> {
        std::mem::take(&mut self.vars)
    }

    /// Produce the next synthetic name.
    ///
    /// Every character of the previous name is shifted up by one code point.
    pub fn random_var(&mut self) -> &str {
        self.random_var = self
            .random_var
            .chars()
            .map(|ch| char::from_u32(ch as u32 + 1).unwrap_or(ch))
            .collect();
        &self.random_var
    }
}

impl Default for TransformerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_var_shifts_every_char() {
        let mut state = TransformerState::new();
        assert_eq!(state.random_var(), "bcdepbkgjpbk");
        assert_eq!(state.random_var(), "cdefqclhkqcl");
    }

    #[test]
    fn test_take_vars_resets() {
        let mut state = TransformerState::new();
        state.add_var(None);
        assert_eq!(state.take_vars(), vec![None]);
        assert!(state.vars.is_empty());
    }
}
