//! Principal Factory: deduplicates principals by compiler-options
//! fingerprint so workspaces sharing a config share state, and their import
//! graphs connect naturally across workspace boundaries.

use std::collections::{HashMap, hash_map::DefaultHasher};
use std::hash::{Hash, Hasher};

use crate::parser::SourceParser;
use crate::principal::Principal;

/// A stand-in for a richer "tsconfig"-style options bag: path-rewrite rules
/// plus the list of compiler plugin identifiers in effect. Two workspaces
/// whose canonicalised options fingerprint match share a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompilerOptions {
    pub path_rewrites: Vec<(String, String)>,
    pub compilers: Vec<String>,
}

impl CompilerOptions {
    /// Canonicalises before hashing so semantically-equivalent but
    /// textually-different configs (different ordering) collide.
    fn fingerprint(&self) -> u64 {
        let mut path_rewrites = self.path_rewrites.clone();
        path_rewrites.sort();
        let mut compilers = self.compilers.clone();
        compilers.sort();

        let mut hasher = DefaultHasher::new();
        path_rewrites.hash(&mut hasher);
        compilers.hash(&mut hasher);
        hasher.finish()
    }
}

pub struct PrincipalFactory<P: SourceParser + Clone> {
    parser_template: P,
    principals: HashMap<u64, Principal<P>>,
}

impl<P: SourceParser + Clone> PrincipalFactory<P> {
    pub fn new(parser_template: P) -> Self {
        Self {
            parser_template,
            principals: HashMap::new(),
        }
    }

    pub fn get_principal(&mut self, compiler_options: &CompilerOptions) -> &mut Principal<P> {
        let fingerprint = compiler_options.fingerprint();
        self.principals
            .entry(fingerprint)
            .or_insert_with(|| Principal::new(self.parser_template.clone()))
    }

    pub fn principals_mut(&mut self) -> impl Iterator<Item = &mut Principal<P>> {
        self.principals.values_mut()
    }

    pub fn principals(&self) -> impl Iterator<Item = &Principal<P>> {
        self.principals.values()
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}
