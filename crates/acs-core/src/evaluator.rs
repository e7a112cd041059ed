// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Permission evaluation: URI pattern matching and the
//! explicit-deny-wins, most-specific-match-first decision algorithm.

use crate::error::Result;
use crate::graph::EntityGraph;
use crate::types::{EntityId, EvaluationOutcome, Permission, Resource, Verb};

/// Specificity class used to order candidate matches before precedence is
/// applied. Lower sorts first (more specific).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Specificity {
    Exact,
    /// Fewer wildcard/parameter segments sort before more.
    Parameterized(std::cmp::Reverse<u32>),
    Wildcard(u32),
}

/// Does `pattern` match `uri`? Segments are compared literal-for-literal,
/// `{name}` matches exactly one segment, and a trailing `*` matches one or
/// more remaining segments.
pub fn matches(pattern: &str, uri: &str) -> bool {
    let pattern_segs: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let uri_segs: Vec<&str> = uri.split('/').filter(|s| !s.is_empty()).collect();

    let mut pi = 0;
    let mut ui = 0;
    while pi < pattern_segs.len() {
        let p = pattern_segs[pi];
        if p == "*" {
            return ui < uri_segs.len();
        }
        if ui >= uri_segs.len() {
            return false;
        }
        if p.starts_with('{') && p.ends_with('}') {
            // parameter segment: matches any single non-empty segment
        } else if p != uri_segs[ui] {
            return false;
        }
        pi += 1;
        ui += 1;
    }
    pi == pattern_segs.len() && ui == uri_segs.len()
}

fn specificity(pattern: &str) -> Specificity {
    let segs: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    if segs.last().map(|s| *s == "*").unwrap_or(false) {
        return Specificity::Wildcard(segs.len() as u32);
    }
    let param_count = segs.iter().filter(|s| s.starts_with('{')).count() as u32;
    if param_count == 0 {
        Specificity::Exact
    } else {
        Specificity::Parameterized(std::cmp::Reverse(param_count))
    }
}

/// Resolves `(entity_id, verb, uri, scheme)` permission queries against an
/// [`EntityGraph`].
pub struct PermissionEvaluator;

impl PermissionEvaluator {
    /// Evaluate whether `entity_id` may perform `verb` against `uri` under
    /// `scheme`.
    ///
    /// Algorithm:
    /// 1. Among every resource whose `uri_pattern` matches `uri`, select the
    ///    single most specific one (exact, then parameterized by descending
    ///    parameter count, then wildcard by ascending prefix length). Ties
    ///    within a specificity class are broken arbitrarily — the graph
    ///    rejects ambiguous patterns at creation time, not here.
    /// 2. Collect `entity_id`'s direct permissions against that resource,
    ///    plus every ancestor's (BFS via [`EntityGraph::ancestors`]).
    /// 3. An explicit deny held by any member of that chain wins over any
    ///    grant; if no deny and no grant is held, the entity is denied
    ///    access — a resource with no matching permission is a fail-closed
    ///    `Denied`, not an indeterminate result.
    pub fn evaluate(graph: &EntityGraph, entity_id: EntityId, uri: &str, verb: Verb, scheme: &str) -> Result<EvaluationOutcome> {
        // Validate the entity exists; propagates NotFound.
        graph.get_entity(entity_id)?;

        let best = graph
            .all_resources()
            .filter(|r| matches(&r.uri_pattern, uri))
            .map(|r| (r, specificity(&r.uri_pattern)))
            .min_by_key(|(_, s)| *s);

        let Some((resource, _)) = best else {
            tracing::debug!(entity_id, uri, "fail-closed: no resource pattern matches");
            return Ok(EvaluationOutcome::NoMatch { reason: format!("no resource pattern matches '{uri}'") });
        };

        let mut chain = vec![entity_id];
        chain.extend(graph.ancestors(entity_id));

        let mut grant_hit: Option<(&Permission, EntityId)> = None;
        let mut deny_hit: Option<(&Permission, EntityId)> = None;

        for &holder in &chain {
            for permission in graph.direct_permissions(holder, resource.id) {
                if permission.verb != verb || permission.scheme != scheme {
                    continue;
                }
                if permission.deny {
                    deny_hit.get_or_insert((permission, holder));
                } else if permission.grant {
                    grant_hit.get_or_insert((permission, holder));
                }
            }
        }

        if let Some((_, holder)) = deny_hit {
            return Ok(EvaluationOutcome::Denied {
                reason: format!("explicit deny held by entity {holder} for verb {verb:?}"),
                inherited_from: if holder == entity_id { None } else { Some(holder) },
                inheritance_chain: chain,
            });
        }
        if let Some((_, holder)) = grant_hit {
            return Ok(EvaluationOutcome::Allowed {
                reason: format!("explicit grant held by entity {holder} for verb {verb:?}"),
                inherited_from: if holder == entity_id { None } else { Some(holder) },
                inheritance_chain: chain,
            });
        }

        tracing::debug!(entity_id, uri, resource_id = resource.id, ?verb, "fail-closed: no permission found on best-matching resource");
        Ok(EvaluationOutcome::Denied {
            reason: format!("no permission found for entity {entity_id} on resource {} for verb {verb:?}", resource.id),
            inherited_from: None,
            inheritance_chain: chain,
        })
    }
}
