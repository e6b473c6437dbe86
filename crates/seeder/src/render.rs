//! Pure rendering of issue bodies and dependency annotations.
//!
//! No side effects and no I/O: the same specification and the same
//! resolution-map snapshot always produce the same text. The creation pass
//! relies on this when it renders each entry against the map *as it stands*
//! mid-pass — a dependency created earlier in the pass renders as a concrete
//! `#N` reference, one not yet created renders as a placeholder carrying the
//! local key so a human reader can still identify intent.

use std::fmt::Write as _;

use crate::catalog::Specification;
use crate::identifiers::IssueNumber;
use crate::resolution::ResolutionMap;

/// Renders the issue body for `spec` against a snapshot of the resolution map.
///
/// Sections, in fixed order: background, task checklist, done-criteria
/// checklist, dependency list, notes footer. An empty dependency set renders
/// an explicit "none" line, never an empty section.
pub fn render_body(spec: &Specification, resolved: &ResolutionMap) -> String {
    let mut body = String::new();

    let _ = writeln!(body, "## Background");
    let _ = writeln!(body, "{}", spec.purpose);

    let _ = writeln!(body, "\n## Tasks");
    for task in &spec.tasks {
        let _ = writeln!(body, "- [ ] {task}");
    }

    let _ = writeln!(body, "\n## Done criteria");
    for criterion in &spec.done_criteria {
        let _ = writeln!(body, "- [ ] {criterion}");
    }

    let _ = writeln!(body, "\n## Dependencies");
    if spec.depends_on.is_empty() {
        let _ = writeln!(body, "- none");
    } else {
        for dependency in &spec.depends_on {
            match resolved.get(dependency) {
                Some(issue) => {
                    let _ = writeln!(body, "- #{issue}");
                }
                None => {
                    let _ = writeln!(body, "- (not yet created: `{dependency}`)");
                }
            }
        }
    }

    let _ = writeln!(body, "\n## Notes");
    let _ = writeln!(body, "- Seeded automatically by issue-seeder.");

    body
}

/// Renders the annotation comment listing fully resolved dependencies.
///
/// Issued by the annotation pass once every catalog entry has an issue
/// number, so the listing is ground truth even for bodies that carried
/// placeholders.
pub fn render_annotation(issues: &[IssueNumber]) -> String {
    let refs: Vec<String> = issues.iter().map(|issue| format!("#{issue}")).collect();
    format!("Depends on: {}", refs.join(", "))
}
