//! named rules - a set of compiled expressions keyed by name
//!
//! rules come from the `rules` table of the config file. every rule is
//! compiled up front, so a broken rule is reported before any data is read.

use std::collections::BTreeMap;

use serde::Serialize;
use strsim::levenshtein;
use thiserror::Error;

use crate::expr::{ExprError, Expression, Resolver, TokenizeError};

const LOG_TARGET: &str = "filterexpr::rules";

/// maximum edit distance for "did you mean" suggestions
pub const SUGGESTION_THRESHOLD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule '{name}': {source}")]
    Compile {
        name: String,
        #[source]
        source: TokenizeError,
    },

    #[error("unknown rule '{name}'")]
    Unknown {
        name: String,
        suggestions: Vec<String>,
    },
}

/// result of running one rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub name: String,
    pub result: Result<bool, ExprError>,
}

impl RuleOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.result, Ok(true))
    }

    pub fn to_data(&self) -> RuleOutcomeData {
        match &self.result {
            Ok(verdict) => RuleOutcomeData {
                name: self.name.clone(),
                verdict: *verdict,
                error: None,
            },
            Err(e) => RuleOutcomeData {
                name: self.name.clone(),
                verdict: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// serializable form of a [`RuleOutcome`]
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcomeData {
    pub name: String,
    pub verdict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, Expression>,
}

impl RuleSet {
    /// compile every `(name, source)` pair; stops at the first broken rule
    pub fn compile<I, K, V>(rules: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut compiled = BTreeMap::new();
        for (name, source) in rules {
            let name = name.into();
            let expression = match Expression::compile(source.as_ref()) {
                Ok(e) => e,
                Err(source) => return Err(RuleError::Compile { name, source }),
            };
            compiled.insert(name, expression);
        }
        log::debug!(target: LOG_TARGET, "compiled {} rule(s)", compiled.len());
        Ok(Self { rules: compiled })
    }

    pub fn get(&self, name: &str) -> Option<&Expression> {
        self.rules.get(name)
    }

    /// like [`RuleSet::get`], but an unknown name carries close matches
    pub fn find(&self, name: &str) -> Result<&Expression, RuleError> {
        self.rules.get(name).ok_or_else(|| RuleError::Unknown {
            name: name.to_string(),
            suggestions: self.suggest(name),
        })
    }

    /// rule names within [`SUGGESTION_THRESHOLD`] edits of `name`, closest first
    pub fn suggest(&self, name: &str) -> Vec<String> {
        suggest_names(self.rules.keys(), name)
    }

    /// rule names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// execute every rule in name order
    pub fn evaluate<R: Resolver + ?Sized>(&self, resolver: &R) -> Vec<RuleOutcome> {
        self.rules
            .iter()
            .map(|(name, expression)| outcome(name, expression, resolver))
            .collect()
    }

    /// execute only the named rules, in the order given
    pub fn evaluate_selected<R, S>(
        &self,
        names: &[S],
        resolver: &R,
    ) -> Result<Vec<RuleOutcome>, RuleError>
    where
        R: Resolver + ?Sized,
        S: AsRef<str>,
    {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.find(name)
                    .map(|expression| outcome(name, expression, resolver))
            })
            .collect()
    }

    /// names of the rules whose verdict is true
    pub fn matching<R: Resolver + ?Sized>(&self, resolver: &R) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|(_, expression)| matches!(expression.execute(resolver), Ok(true)))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// candidates within [`SUGGESTION_THRESHOLD`] edits of `name`, closest first
pub fn suggest_names<'a, I>(candidates: I, name: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let query = name.to_lowercase();
    let mut close: Vec<(&String, usize)> = candidates
        .into_iter()
        .map(|candidate| (candidate, levenshtein(&query, &candidate.to_lowercase())))
        .filter(|(_, distance)| *distance <= SUGGESTION_THRESHOLD)
        .collect();

    // stable, so ties keep the candidates' order
    close.sort_by_key(|(_, distance)| *distance);
    close.into_iter().map(|(name, _)| name.clone()).collect()
}

fn outcome<R: Resolver + ?Sized>(name: &str, expression: &Expression, resolver: &R) -> RuleOutcome {
    let result = expression.execute(resolver);
    if let Err(e) = &result {
        log::debug!(target: LOG_TARGET, "rule '{}' failed: {}", name, e);
    }
    RuleOutcome {
        name: name.to_string(),
        result,
    }
}
