//! Per-host segment trie with correct backtracking.
//!
//! Supports the full literal / `:param` / `*wildcard` segment grammar, with
//! per-node priority literal > parameter > wildcard and proper
//! restore-on-backtrack semantics for overlapping parameter names.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;

use crate::compiler::meta::RouteMeta;

/// Stack-allocated capture list: `(name, value)` pairs in capture order.
/// Duplicate names are *not* deduplicated here; last-write-wins is resolved
/// by the caller via [`get_param`], mirroring the hot-path `ParamVec`
/// convention this crate already uses.
pub type ParamVec = SmallVec<[(String, String); 8]>;

/// Return the last-captured value for `name` (last-write-wins).
pub fn get_param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params.iter().rfind(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

struct ParamChild {
    name: String,
    node: TrieNode,
}

struct WildcardChild {
    name: String,
    node: TrieNode,
}

#[derive(Default)]
struct TrieNode {
    literal_children: HashMap<String, TrieNode>,
    param_child: Option<Box<ParamChild>>,
    wildcard_child: Option<Box<WildcardChild>>,
    handlers: HashMap<Method, Arc<RouteMeta>>,
}

/// A conflicting parameter/wildcard name at the same trie position.
pub struct NameConflict {
    pub existing: String,
    pub new: String,
}

impl TrieNode {
    fn insert(
        &mut self,
        segments: &[crate::compiler::meta::Segment],
        method: Method,
        meta: Arc<RouteMeta>,
    ) -> Result<(), NameConflict> {
        use crate::compiler::meta::Segment;

        let Some(first) = segments.first() else {
            self.handlers.insert(method, meta);
            return Ok(());
        };
        let rest = &segments[1..];

        match first {
            Segment::Literal(s) => self
                .literal_children
                .entry(s.clone())
                .or_default()
                .insert(rest, method, meta),
            Segment::Param(name) => {
                let child = self.param_child.get_or_insert_with(|| {
                    Box::new(ParamChild {
                        name: name.clone(),
                        node: TrieNode::default(),
                    })
                });
                if &child.name != name {
                    return Err(NameConflict {
                        existing: child.name.clone(),
                        new: name.clone(),
                    });
                }
                child.node.insert(rest, method, meta)
            }
            Segment::Wildcard(name) => {
                let child = self.wildcard_child.get_or_insert_with(|| {
                    Box::new(WildcardChild {
                        name: name.clone(),
                        node: TrieNode::default(),
                    })
                });
                if &child.name != name {
                    return Err(NameConflict {
                        existing: child.name.clone(),
                        new: name.clone(),
                    });
                }
                child.node.insert(rest, method, meta)
            }
        }
    }

    fn search(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
    ) -> Option<Arc<RouteMeta>> {
        if segments.is_empty() {
            if let Some(meta) = self.handlers.get(method) {
                if constraints_satisfied(meta, params) {
                    return Some(Arc::clone(meta));
                }
            }
            // A wildcard can legally match zero trailing segments too, so
            // fall through to the wildcard branch below even here.
        } else {
            let segment = segments[0];
            let rest = &segments[1..];

            // Literal segments are stored lowercased at compile time (see
            // `compiler::compile::parse_segments`); the incoming segment is
            // lowercased only for this lookup key, never for what gets
            // captured into `params` below.
            if let Some(child) = self.literal_children.get(&segment.to_lowercase()) {
                if let Some(meta) = child.search(rest, method, params) {
                    return Some(meta);
                }
            }

            if let Some(param) = &self.param_child {
                params.push((param.name.clone(), segment.to_string()));
                let found = param.node.search(rest, method, params);
                if found.is_some() {
                    return found;
                }
                params.pop();
            }
        }

        if let Some(wildcard) = &self.wildcard_child {
            // Try capturing 0..=segments.len() trailing segments, longest
            // (greedy) first since a catch-all is almost always terminal.
            for take in (0..=segments.len()).rev() {
                let captured = segments[..take].join("/");
                let remaining = &segments[take..];
                params.push((wildcard.name.clone(), captured));
                let found = wildcard.node.search(remaining, method, params);
                if found.is_some() {
                    return found;
                }
                params.pop();
            }
        }

        None
    }
}

fn constraints_satisfied(meta: &RouteMeta, params: &ParamVec) -> bool {
    for (param_name, regex) in &meta.constraints {
        match get_param(params, param_name) {
            Some(value) if regex.is_match(value) => {}
            _ => return false,
        }
    }
    true
}

/// A single host's compiled trie.
#[derive(Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails if a `:param`/`*wildcard` segment at a given trie position was
    /// previously bound to a different capture name (e.g. `/team/:id` and
    /// `/team/:team_id` can't coexist, since both occupy the same
    /// parameter-child slot on the `team` node).
    pub fn insert(
        &mut self,
        segments: &[crate::compiler::meta::Segment],
        method: Method,
        meta: Arc<RouteMeta>,
    ) -> Result<(), NameConflict> {
        self.root.insert(segments, method, meta)
    }

    /// `path` must already be normalized (leading `/` optional, no empty
    /// segments expected beyond a bare `/`).
    pub fn search(&self, method: &Method, path: &str) -> Option<(Arc<RouteMeta>, ParamVec)> {
        let segments: Vec<&str> = path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        self.search_segments(&segments, method)
    }

    /// Same as [`Trie::search`] but takes already-split segments, so a
    /// caller holding a cached split (see
    /// [`crate::router::normalize::SegmentCacheHandle`]) avoids re-splitting
    /// the path on every request.
    pub fn search_segments(&self, segments: &[&str], method: &Method) -> Option<(Arc<RouteMeta>, ParamVec)> {
        let mut params = ParamVec::new();
        let meta = self.root.search(segments, method, &mut params)?;
        Some((meta, params))
    }
}
