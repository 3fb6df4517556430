// src/config/validate.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{JobEntry, Manifest, RawManifest};
use crate::errors::{JobrunError, Result};
use crate::job::JobRecord;

impl TryFrom<RawManifest> for Manifest {
    type Error = JobrunError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_raw_manifest(&raw)?;

        let roots = root_names(&raw)
            .into_iter()
            .map(|name| build_record(name, &raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Manifest {
            pool_size: raw.pool_size,
            roots,
        })
    }
}

fn validate_raw_manifest(raw: &RawManifest) -> Result<()> {
    ensure_has_jobs(raw)?;
    validate_pool_size(raw)?;
    validate_references(raw)?;
    validate_single_ownership(raw)?;
    validate_graph(raw)?;
    Ok(())
}

fn ensure_has_jobs(raw: &RawManifest) -> Result<()> {
    if raw.job.is_empty() {
        return Err(JobrunError::ManifestError(
            "manifest must contain at least one [job.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_pool_size(raw: &RawManifest) -> Result<()> {
    if raw.pool_size == 0 {
        return Err(JobrunError::ManifestError(
            "pool_size must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_references(raw: &RawManifest) -> Result<()> {
    for (name, entry) in raw.job.iter() {
        for referenced in references_of(entry) {
            if !raw.job.contains_key(referenced) {
                return Err(JobrunError::ManifestError(format!(
                    "job '{name}' references unknown job '{referenced}'"
                )));
            }
            if referenced == name {
                return Err(JobrunError::ManifestError(format!(
                    "job '{name}' cannot reference itself"
                )));
            }
        }
    }
    Ok(())
}

/// Every entry may be consumed by at most one referencing job: the
/// scheduler's bookkeeping is an ownership tree, not a shared graph.
fn validate_single_ownership(raw: &RawManifest) -> Result<()> {
    let mut referenced_by: BTreeMap<&str, &str> = BTreeMap::new();

    for (name, entry) in raw.job.iter() {
        for referenced in references_of(entry) {
            if let Some(previous) = referenced_by.insert(referenced, name) {
                return Err(JobrunError::ManifestError(format!(
                    "job '{referenced}' is referenced more than once (by '{previous}' and '{name}')"
                )));
            }
        }
    }
    Ok(())
}

fn validate_graph(raw: &RawManifest) -> Result<()> {
    // Edge direction: referenced -> referrer, so a topological sort fails
    // exactly when the references form a cycle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in raw.job.keys() {
        graph.add_node(name.as_str());
    }

    for (name, entry) in raw.job.iter() {
        for referenced in references_of(entry) {
            graph.add_edge(referenced, name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(JobrunError::GraphCycle(format!(
            "cycle detected in job references involving job '{}'",
            cycle.node_id()
        ))),
    }
}

fn references_of(entry: &JobEntry) -> impl Iterator<Item = &str> {
    entry
        .depends_on
        .iter()
        .map(String::as_str)
        .chain(entry.target.as_deref())
}

/// Entries no other entry references; these are handed to `schedule`.
fn root_names(raw: &RawManifest) -> Vec<&str> {
    let referenced: Vec<&str> = raw
        .job
        .values()
        .flat_map(references_of)
        .collect();

    raw.job
        .keys()
        .map(String::as_str)
        .filter(|name| !referenced.contains(name))
        .collect()
}

/// Recursively turn an entry and everything it references into a job
/// record subtree. Termination is guaranteed by the cycle check above.
fn build_record(name: &str, raw: &RawManifest) -> Result<JobRecord> {
    let entry = raw
        .job
        .get(name)
        .ok_or_else(|| JobrunError::ManifestError(format!("job '{name}' is not defined")))?;

    let target = entry
        .target
        .as_deref()
        .map(|t| build_record(t, raw).map(Box::new))
        .transpose()?;
    let depends_on = entry
        .depends_on
        .iter()
        .map(|dep| build_record(dep, raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(JobRecord {
        job_id: name.to_string(),
        parent_id: None,
        start_at: entry.start_at.clone(),
        max_working_time: entry.max_working_time,
        max_retries: entry.max_retries,
        tries: 0,
        target,
        depends_on,
        class_name: entry.kind.clone(),
        params: entry.params.clone(),
    })
}
